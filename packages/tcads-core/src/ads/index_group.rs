/// Reserved ADS Index Groups used to access the PLC's symbol table,
/// data-type table, and the batched "sum" commands.
///
/// Values match the Beckhoff ADS specification. A raw index group that
/// doesn't match one of the named variants (e.g. a PLC-defined memory area)
/// is carried in [`ReservedIndexGroup::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedIndexGroup {
    /// `ADSIGRP_SYM_HNDBYNAME` — write a path, read back a handle (0xF003).
    SymbolHandleByName,
    /// `ADSIGRP_SYM_VALBYNAME` — read/write a value addressed by path, in one round-trip (0xF004).
    SymbolValueByName,
    /// `ADSIGRP_SYM_VALBYHND` — read/write a value addressed by handle (0xF005).
    SymbolValueByHandle,
    /// `ADSIGRP_SYM_RELEASEHND` — release a handle created via [`SymbolHandleByName`](Self::SymbolHandleByName) (0xF006).
    SymbolReleaseHandle,
    /// `ADSIGRP_SYM_INFOBYNAME` — a single symbol's info, addressed by path (0xF007).
    SymbolInfoByName,
    /// `ADSIGRP_SYM_VERSION` — the PLC's symbol-version counter (0xF008).
    SymbolVersion,
    /// `ADSIGRP_SYM_INFOBYNAMEEX` — a single symbol's info, extended layout (0xF009).
    SymbolInfoByNameEx,
    /// `ADSIGRP_SYM_DOWNLOAD` — download (replace) the symbol table (0xF00C).
    SymbolDownload,
    /// `ADSIGRP_SYM_UPLOAD` — the full symbol table (0xF00B).
    SymbolUpload,
    /// `ADSIGRP_SYM_UPLOADINFO2` — counts/lengths preceding a [`SymbolUpload`](Self::SymbolUpload) (0xF00F).
    SymbolUploadInfo,
    /// `ADSIGRP_SYM_DT_INFOBYNAMEEX` — a single data type's info, by name (0xF00A).
    DataTypeInfoByNameEx,
    /// `ADSIGRP_SYM_DT_UPLOAD` — the full data-type table (0xF00D).
    DataTypeUpload,
    /// `ADSIGRP_SYM_DT_UPLOADINFO` — counts/lengths preceding a [`DataTypeUpload`](Self::DataTypeUpload) (0xF00E).
    DataTypeUploadInfo,
    /// Batched read: N × (group, offset, size) in, N × (error, data) out (0xF080).
    SumCommandRead,
    /// Batched write: N × (group, offset, size, data) in, N × error out (0xF081).
    SumCommandWrite,
    /// Batched handle creation (0xF082).
    SumCommandReadEx,
    /// Batched handle release (0xF083).
    SumCommandReadEx2,
    /// Batched read-write: N × (group, offset, readSize, writeSize, data) in (0xF084).
    SumCommandReadWrite,
    /// A raw index group not named above (e.g. a PLC memory area or user-defined range).
    Unknown(u32),
}

impl ReservedIndexGroup {
    /// Returns `true` for every variant except [`Unknown`](Self::Unknown).
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<u32> for ReservedIndexGroup {
    fn from(val: u32) -> Self {
        match val {
            0xF003 => Self::SymbolHandleByName,
            0xF004 => Self::SymbolValueByName,
            0xF005 => Self::SymbolValueByHandle,
            0xF006 => Self::SymbolReleaseHandle,
            0xF007 => Self::SymbolInfoByName,
            0xF008 => Self::SymbolVersion,
            0xF009 => Self::SymbolInfoByNameEx,
            0xF00A => Self::DataTypeInfoByNameEx,
            0xF00B => Self::SymbolUpload,
            0xF00C => Self::SymbolDownload,
            0xF00D => Self::DataTypeUpload,
            0xF00E => Self::DataTypeUploadInfo,
            0xF00F => Self::SymbolUploadInfo,
            0xF080 => Self::SumCommandRead,
            0xF081 => Self::SumCommandWrite,
            0xF082 => Self::SumCommandReadEx,
            0xF083 => Self::SumCommandReadEx2,
            0xF084 => Self::SumCommandReadWrite,
            n => Self::Unknown(n),
        }
    }
}

impl From<ReservedIndexGroup> for u32 {
    fn from(val: ReservedIndexGroup) -> Self {
        match val {
            ReservedIndexGroup::SymbolHandleByName => 0xF003,
            ReservedIndexGroup::SymbolValueByName => 0xF004,
            ReservedIndexGroup::SymbolValueByHandle => 0xF005,
            ReservedIndexGroup::SymbolReleaseHandle => 0xF006,
            ReservedIndexGroup::SymbolInfoByName => 0xF007,
            ReservedIndexGroup::SymbolVersion => 0xF008,
            ReservedIndexGroup::SymbolInfoByNameEx => 0xF009,
            ReservedIndexGroup::DataTypeInfoByNameEx => 0xF00A,
            ReservedIndexGroup::SymbolUpload => 0xF00B,
            ReservedIndexGroup::SymbolDownload => 0xF00C,
            ReservedIndexGroup::DataTypeUpload => 0xF00D,
            ReservedIndexGroup::DataTypeUploadInfo => 0xF00E,
            ReservedIndexGroup::SymbolUploadInfo => 0xF00F,
            ReservedIndexGroup::SumCommandRead => 0xF080,
            ReservedIndexGroup::SumCommandWrite => 0xF081,
            ReservedIndexGroup::SumCommandReadEx => 0xF082,
            ReservedIndexGroup::SumCommandReadEx2 => 0xF083,
            ReservedIndexGroup::SumCommandReadWrite => 0xF084,
            ReservedIndexGroup::Unknown(n) => n,
        }
    }
}
