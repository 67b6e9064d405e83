use super::error::AdsCommandError;

/// ADS Command Identifiers.
///
/// Identifies which of the nine ADS commands a packet carries, at the ADS
/// layer (as opposed to [`AmsCommand`](crate::ams::AmsCommand), which
/// identifies packets at the TCP/router layer).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum AdsCommand {
    /// Reads the name and version of an ADS device.
    AdsReadDeviceInfo = 1,
    /// Reads data from an ADS device.
    AdsRead = 2,
    /// Writes data to an ADS device.
    AdsWrite = 3,
    /// Reads the ADS state and the device state of an ADS device.
    AdsReadState = 4,
    /// Changes the ADS state and the device state of an ADS device.
    AdsWriteControl = 5,
    /// Registers a notification on an ADS device.
    AdsAddDeviceNotification = 6,
    /// Removes a previously registered notification.
    AdsDeleteDeviceNotification = 7,
    /// Unsolicited notification sample pushed by the server.
    AdsDeviceNotification = 8,
    /// Writes data to, then reads data from, an ADS device in one round-trip.
    AdsReadWrite = 9,
    /// A command id not defined by the ADS specification.
    Unknown(u16),
}

impl AdsCommand {
    /// The length of the ADS Command in bytes.
    pub const LENGTH: usize = 2;

    /// Creates a new `AdsCommand` from a 2-byte array (Little Endian).
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self::from(bytes)
    }

    /// Converts the command to a 2-byte array (Little Endian).
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        (*self).into()
    }

    /// Tries to parse an `AdsCommand` from a byte slice.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AdsCommandError> {
        bytes.try_into()
    }
}

impl From<u16> for AdsCommand {
    fn from(val: u16) -> Self {
        match val {
            1 => Self::AdsReadDeviceInfo,
            2 => Self::AdsRead,
            3 => Self::AdsWrite,
            4 => Self::AdsReadState,
            5 => Self::AdsWriteControl,
            6 => Self::AdsAddDeviceNotification,
            7 => Self::AdsDeleteDeviceNotification,
            8 => Self::AdsDeviceNotification,
            9 => Self::AdsReadWrite,
            n => Self::Unknown(n),
        }
    }
}

impl From<AdsCommand> for u16 {
    fn from(val: AdsCommand) -> Self {
        match val {
            AdsCommand::AdsReadDeviceInfo => 1,
            AdsCommand::AdsRead => 2,
            AdsCommand::AdsWrite => 3,
            AdsCommand::AdsReadState => 4,
            AdsCommand::AdsWriteControl => 5,
            AdsCommand::AdsAddDeviceNotification => 6,
            AdsCommand::AdsDeleteDeviceNotification => 7,
            AdsCommand::AdsDeviceNotification => 8,
            AdsCommand::AdsReadWrite => 9,
            AdsCommand::Unknown(n) => n,
        }
    }
}

impl From<[u8; Self::LENGTH]> for AdsCommand {
    fn from(bytes: [u8; Self::LENGTH]) -> Self {
        u16::from_le_bytes(bytes).into()
    }
}

impl From<AdsCommand> for [u8; AdsCommand::LENGTH] {
    fn from(command: AdsCommand) -> Self {
        u16::from(command).to_le_bytes()
    }
}

impl TryFrom<&[u8]> for AdsCommand {
    type Error = AdsCommandError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() < Self::LENGTH {
            return Err(AdsCommandError::UnexpectedLength {
                expected: Self::LENGTH,
                got: bytes.len(),
            });
        }
        Ok(Self::from([bytes[0], bytes[1]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_conversion() {
        assert_eq!(AdsCommand::from(2), AdsCommand::AdsRead);
        assert_eq!(u16::from(AdsCommand::AdsReadWrite), 9);
        assert_eq!(AdsCommand::from(0xBEEF), AdsCommand::Unknown(0xBEEF));
    }

    #[test]
    fn test_command_bytes_roundtrip() {
        for cmd in [
            AdsCommand::AdsReadDeviceInfo,
            AdsCommand::AdsRead,
            AdsCommand::AdsWrite,
            AdsCommand::AdsReadState,
            AdsCommand::AdsWriteControl,
            AdsCommand::AdsAddDeviceNotification,
            AdsCommand::AdsDeleteDeviceNotification,
            AdsCommand::AdsDeviceNotification,
            AdsCommand::AdsReadWrite,
        ] {
            assert_eq!(AdsCommand::from_bytes(cmd.to_bytes()), cmd);
        }
    }

    #[test]
    fn test_try_from_slice_rejects_short_buffer() {
        assert!(AdsCommand::try_from_slice(&[2]).is_err());
    }
}
