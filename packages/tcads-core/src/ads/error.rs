#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsError {
    #[error("Buffer too small for ADS Header: expected {expected}, found {found}")]
    HeaderBufferTooSmall { expected: usize, found: usize },

    #[error("Buffer too small for {item}: expected {expected}, found {found}")]
    InvalidBufferSize {
        item: &'static str,
        expected: usize,
        found: usize,
    },
    /// Invalid command format or content
    #[error("Invalid ADS command: {0}")]
    InvalidCommand(#[from] AdsCommandError),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsHeaderError {
    #[error("Unexpected length: expected {expected} bytes, got {got} bytes")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsReturnCodeError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StateFlagError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsCommandError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsStateError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsDeviceVersionError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsNotificationHandleError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsTransModeError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum WindowsFileTimeError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsStringError {
    #[error("value contains characters that cannot be represented in Windows-1252")]
    EncodingError,
    #[error("string too long: capacity for {expected} bytes, got {got}")]
    TooLong { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsWStringError {
    #[error("string too long: capacity for {expected} UTF-16 units, got {got}")]
    TooLong { expected: usize, got: usize },
    #[error("buffer length must be a multiple of 2, got {0}")]
    OddLength(usize),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SymbolInfoError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
    #[error("symbol record truncated before its declared entry length")]
    Truncated,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DataTypeError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
    #[error("data type record truncated before its declared entry length")]
    Truncated,
}
