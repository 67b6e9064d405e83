use super::error::{
    AdsAddDeviceNotificationRequestError, AdsDeleteDeviceNotificationRequestError,
    AdsReadRequestError, AdsReadWriteRequestError, AdsWriteControlRequestError,
    AdsWriteRequestError,
};
use crate::ads::{AdsState, AdsTransMode, IndexGroup, IndexOffset, NotificationHandle};
use std::time::Duration;

/// 100ns ticks per Rust's nanosecond-precision [`Duration`].
const TICKS_PER_NANOS: u64 = 100;

fn duration_to_ticks(d: Duration) -> u32 {
    (d.as_nanos() / TICKS_PER_NANOS as u128) as u32
}

fn ticks_to_duration(ticks: u32) -> Duration {
    Duration::from_nanos(ticks as u64 * TICKS_PER_NANOS)
}

/// Payload of an `AdsRead` request: read `length` bytes at `index_group`/`index_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdsReadRequest {
    index_group: IndexGroup,
    index_offset: IndexOffset,
    length: u32,
}

impl AdsReadRequest {
    pub const LENGTH: usize = 12;

    pub fn new(index_group: IndexGroup, index_offset: IndexOffset, length: u32) -> Self {
        Self {
            index_group,
            index_offset,
            length,
        }
    }

    pub fn index_group(&self) -> IndexGroup {
        self.index_group
    }

    pub fn index_offset(&self) -> IndexOffset {
        self.index_offset
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.into()
    }

    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self::from(bytes)
    }

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AdsReadRequestError> {
        bytes.try_into()
    }
}

impl From<&AdsReadRequest> for [u8; AdsReadRequest::LENGTH] {
    fn from(value: &AdsReadRequest) -> Self {
        let mut buf = [0u8; AdsReadRequest::LENGTH];
        buf[0..4].copy_from_slice(&value.index_group.to_le_bytes());
        buf[4..8].copy_from_slice(&value.index_offset.to_le_bytes());
        buf[8..12].copy_from_slice(&value.length.to_le_bytes());
        buf
    }
}

impl From<[u8; Self::LENGTH]> for AdsReadRequest {
    fn from(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            index_group: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            index_offset: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            length: u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
        }
    }
}

impl TryFrom<&[u8]> for AdsReadRequest {
    type Error = AdsReadRequestError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != Self::LENGTH {
            return Err(AdsReadRequestError::UnexpectedLength {
                expected: Self::LENGTH,
                got: bytes.len(),
            });
        }
        let arr: [u8; Self::LENGTH] = bytes.try_into().unwrap();
        Ok(Self::from(arr))
    }
}

/// Header of an `AdsWrite` request: write `length` bytes at `index_group`/`index_offset`.
/// The data itself is appended to the frame payload after this header, not carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdsWriteRequest {
    index_group: IndexGroup,
    index_offset: IndexOffset,
    length: u32,
}

impl AdsWriteRequest {
    pub const LENGTH: usize = 12;

    pub fn new(index_group: IndexGroup, index_offset: IndexOffset, length: u32) -> Self {
        Self {
            index_group,
            index_offset,
            length,
        }
    }

    pub fn index_group(&self) -> IndexGroup {
        self.index_group
    }

    pub fn index_offset(&self) -> IndexOffset {
        self.index_offset
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.into()
    }

    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self::from(bytes)
    }

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AdsWriteRequestError> {
        bytes.try_into()
    }
}

impl From<&AdsWriteRequest> for [u8; AdsWriteRequest::LENGTH] {
    fn from(value: &AdsWriteRequest) -> Self {
        let mut buf = [0u8; AdsWriteRequest::LENGTH];
        buf[0..4].copy_from_slice(&value.index_group.to_le_bytes());
        buf[4..8].copy_from_slice(&value.index_offset.to_le_bytes());
        buf[8..12].copy_from_slice(&value.length.to_le_bytes());
        buf
    }
}

impl From<[u8; Self::LENGTH]> for AdsWriteRequest {
    fn from(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            index_group: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            index_offset: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            length: u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
        }
    }
}

impl TryFrom<&[u8]> for AdsWriteRequest {
    type Error = AdsWriteRequestError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != Self::LENGTH {
            return Err(AdsWriteRequestError::UnexpectedLength {
                expected: Self::LENGTH,
                got: bytes.len(),
            });
        }
        let arr: [u8; Self::LENGTH] = bytes.try_into().unwrap();
        Ok(Self::from(arr))
    }
}

/// Header of an `AdsReadWrite` request: write `write_length` bytes, then read back
/// `read_length` bytes, in one round-trip. Write data follows this header in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdsReadWriteRequest {
    index_group: IndexGroup,
    index_offset: IndexOffset,
    read_length: u32,
    write_length: u32,
}

impl AdsReadWriteRequest {
    pub const LENGTH: usize = 16;

    pub fn new(
        index_group: IndexGroup,
        index_offset: IndexOffset,
        read_length: u32,
        write_length: u32,
    ) -> Self {
        Self {
            index_group,
            index_offset,
            read_length,
            write_length,
        }
    }

    pub fn index_group(&self) -> IndexGroup {
        self.index_group
    }

    pub fn index_offset(&self) -> IndexOffset {
        self.index_offset
    }

    pub fn read_length(&self) -> u32 {
        self.read_length
    }

    pub fn write_length(&self) -> u32 {
        self.write_length
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.into()
    }

    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self::from(bytes)
    }

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AdsReadWriteRequestError> {
        bytes.try_into()
    }
}

impl From<&AdsReadWriteRequest> for [u8; AdsReadWriteRequest::LENGTH] {
    fn from(value: &AdsReadWriteRequest) -> Self {
        let mut buf = [0u8; AdsReadWriteRequest::LENGTH];
        buf[0..4].copy_from_slice(&value.index_group.to_le_bytes());
        buf[4..8].copy_from_slice(&value.index_offset.to_le_bytes());
        buf[8..12].copy_from_slice(&value.read_length.to_le_bytes());
        buf[12..16].copy_from_slice(&value.write_length.to_le_bytes());
        buf
    }
}

impl From<[u8; Self::LENGTH]> for AdsReadWriteRequest {
    fn from(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            index_group: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            index_offset: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            read_length: u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
            write_length: u32::from_le_bytes(bytes[12..16].try_into().unwrap()),
        }
    }
}

impl TryFrom<&[u8]> for AdsReadWriteRequest {
    type Error = AdsReadWriteRequestError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != Self::LENGTH {
            return Err(AdsReadWriteRequestError::UnexpectedLength {
                expected: Self::LENGTH,
                got: bytes.len(),
            });
        }
        let arr: [u8; Self::LENGTH] = bytes.try_into().unwrap();
        Ok(Self::from(arr))
    }
}

/// Header of an `AdsWriteControl` request: changes the ADS/device state.
/// Optional data follows this header in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdsWriteControlRequest {
    ads_state: AdsState,
    device_state: u16,
    length: u32,
}

impl AdsWriteControlRequest {
    pub const LENGTH: usize = 8;

    pub fn new(ads_state: AdsState, device_state: u16, length: u32) -> Self {
        Self {
            ads_state,
            device_state,
            length,
        }
    }

    pub fn ads_state(&self) -> AdsState {
        self.ads_state
    }

    pub fn device_state(&self) -> u16 {
        self.device_state
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.into()
    }

    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self::from(bytes)
    }

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AdsWriteControlRequestError> {
        bytes.try_into()
    }
}

impl From<&AdsWriteControlRequest> for [u8; AdsWriteControlRequest::LENGTH] {
    fn from(value: &AdsWriteControlRequest) -> Self {
        let mut buf = [0u8; AdsWriteControlRequest::LENGTH];
        buf[0..2].copy_from_slice(&value.ads_state.to_bytes());
        buf[2..4].copy_from_slice(&value.device_state.to_le_bytes());
        buf[4..8].copy_from_slice(&value.length.to_le_bytes());
        buf
    }
}

impl From<[u8; Self::LENGTH]> for AdsWriteControlRequest {
    fn from(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            ads_state: AdsState::from_bytes(bytes[0..2].try_into().unwrap()),
            device_state: u16::from_le_bytes(bytes[2..4].try_into().unwrap()),
            length: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
        }
    }
}

impl TryFrom<&[u8]> for AdsWriteControlRequest {
    type Error = AdsWriteControlRequestError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != Self::LENGTH {
            return Err(AdsWriteControlRequestError::UnexpectedLength {
                expected: Self::LENGTH,
                got: bytes.len(),
            });
        }
        let arr: [u8; Self::LENGTH] = bytes.try_into().unwrap();
        Ok(Self::from(arr))
    }
}

/// Payload of an `AdsAddDeviceNotification` request: subscribes to changes at
/// `index_group`/`index_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdsAddDeviceNotificationRequest {
    index_group: IndexGroup,
    index_offset: IndexOffset,
    length: u32,
    transmission_mode: AdsTransMode,
    max_delay: Duration,
    cycle_time: Duration,
    reserved: [u8; 16],
}

impl AdsAddDeviceNotificationRequest {
    pub const LENGTH: usize = 40;

    pub fn new(
        index_group: IndexGroup,
        index_offset: IndexOffset,
        length: u32,
        transmission_mode: AdsTransMode,
        max_delay: Duration,
        cycle_time: Duration,
    ) -> Self {
        Self {
            index_group,
            index_offset,
            length,
            transmission_mode,
            max_delay,
            cycle_time,
            reserved: [0; 16],
        }
    }

    pub fn index_group(&self) -> IndexGroup {
        self.index_group
    }

    pub fn index_offset(&self) -> IndexOffset {
        self.index_offset
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn transmission_mode(&self) -> AdsTransMode {
        self.transmission_mode
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn cycle_time(&self) -> Duration {
        self.cycle_time
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.into()
    }

    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self::from(bytes)
    }

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AdsAddDeviceNotificationRequestError> {
        bytes.try_into()
    }
}

impl From<&AdsAddDeviceNotificationRequest> for [u8; AdsAddDeviceNotificationRequest::LENGTH] {
    fn from(value: &AdsAddDeviceNotificationRequest) -> Self {
        let mut buf = [0u8; AdsAddDeviceNotificationRequest::LENGTH];
        buf[0..4].copy_from_slice(&value.index_group.to_le_bytes());
        buf[4..8].copy_from_slice(&value.index_offset.to_le_bytes());
        buf[8..12].copy_from_slice(&value.length.to_le_bytes());
        buf[12..16].copy_from_slice(&value.transmission_mode.to_bytes());
        buf[16..20].copy_from_slice(&duration_to_ticks(value.max_delay).to_le_bytes());
        buf[20..24].copy_from_slice(&duration_to_ticks(value.cycle_time).to_le_bytes());
        buf[24..40].copy_from_slice(&value.reserved);
        buf
    }
}

impl From<[u8; Self::LENGTH]> for AdsAddDeviceNotificationRequest {
    fn from(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            index_group: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            index_offset: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            length: u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
            transmission_mode: AdsTransMode::from_bytes(bytes[12..16].try_into().unwrap()),
            max_delay: ticks_to_duration(u32::from_le_bytes(bytes[16..20].try_into().unwrap())),
            cycle_time: ticks_to_duration(u32::from_le_bytes(bytes[20..24].try_into().unwrap())),
            reserved: bytes[24..40].try_into().unwrap(),
        }
    }
}

impl TryFrom<&[u8]> for AdsAddDeviceNotificationRequest {
    type Error = AdsAddDeviceNotificationRequestError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != Self::LENGTH {
            return Err(AdsAddDeviceNotificationRequestError::UnexpectedLength {
                expected: Self::LENGTH,
                got: bytes.len(),
            });
        }
        let arr: [u8; Self::LENGTH] = bytes.try_into().unwrap();
        Ok(Self::from(arr))
    }
}

/// Payload of an `AdsDeleteDeviceNotification` request: cancels a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdsDeleteDeviceNotificationRequest {
    handle: NotificationHandle,
}

impl AdsDeleteDeviceNotificationRequest {
    pub const LENGTH: usize = 4;

    pub fn new(handle: NotificationHandle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> NotificationHandle {
        self.handle
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.into()
    }

    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self::from(bytes)
    }

    pub fn try_from_slice(
        bytes: &[u8],
    ) -> Result<Self, AdsDeleteDeviceNotificationRequestError> {
        bytes.try_into()
    }
}

impl From<&AdsDeleteDeviceNotificationRequest>
    for [u8; AdsDeleteDeviceNotificationRequest::LENGTH]
{
    fn from(value: &AdsDeleteDeviceNotificationRequest) -> Self {
        value.handle.to_bytes()
    }
}

impl From<[u8; Self::LENGTH]> for AdsDeleteDeviceNotificationRequest {
    fn from(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            handle: NotificationHandle::from_bytes(bytes),
        }
    }
}

impl TryFrom<&[u8]> for AdsDeleteDeviceNotificationRequest {
    type Error = AdsDeleteDeviceNotificationRequestError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != Self::LENGTH {
            return Err(AdsDeleteDeviceNotificationRequestError::UnexpectedLength {
                expected: Self::LENGTH,
                got: bytes.len(),
            });
        }
        let arr: [u8; Self::LENGTH] = bytes.try_into().unwrap();
        Ok(Self::from(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_request_roundtrip() {
        let req = AdsReadRequest::new(0x4020, 0, 4);
        let bytes = req.to_bytes();
        assert_eq!(AdsReadRequest::from_bytes(bytes), req);
        assert_eq!(AdsReadRequest::try_from_slice(&bytes).unwrap(), req);
    }

    #[test]
    fn test_write_request_roundtrip() {
        let req = AdsWriteRequest::new(0x4020, 10, 8);
        let bytes = req.to_bytes();
        assert_eq!(AdsWriteRequest::from_bytes(bytes), req);
    }

    #[test]
    fn test_read_write_request_roundtrip() {
        let req = AdsReadWriteRequest::new(0xF080, 0, 100, 50);
        let bytes = req.to_bytes();
        assert_eq!(AdsReadWriteRequest::from_bytes(bytes), req);
    }

    #[test]
    fn test_write_control_request_roundtrip() {
        let req = AdsWriteControlRequest::new(AdsState::Run, 0, 0);
        let bytes = req.to_bytes();
        assert_eq!(AdsWriteControlRequest::from_bytes(bytes), req);
    }

    #[test]
    fn test_add_device_notification_request_roundtrip() {
        let req = AdsAddDeviceNotificationRequest::new(
            0x4020,
            0,
            4,
            AdsTransMode::ClientOnChange,
            Duration::from_millis(0),
            Duration::from_millis(100),
        );
        let bytes = req.to_bytes();
        let parsed = AdsAddDeviceNotificationRequest::from_bytes(bytes);
        assert_eq!(parsed.index_group(), 0x4020);
        assert_eq!(parsed.transmission_mode(), AdsTransMode::ClientOnChange);
        assert_eq!(parsed.cycle_time(), Duration::from_millis(100));
    }

    #[test]
    fn test_delete_device_notification_request_roundtrip() {
        let req = AdsDeleteDeviceNotificationRequest::new(NotificationHandle::new(42));
        let bytes = req.to_bytes();
        assert_eq!(
            AdsDeleteDeviceNotificationRequest::from_bytes(bytes).handle(),
            NotificationHandle::new(42)
        );
    }

    #[test]
    fn test_try_from_slice_rejects_wrong_length() {
        assert!(matches!(
            AdsReadRequest::try_from_slice(&[0; 4]),
            Err(AdsReadRequestError::UnexpectedLength {
                expected: 12,
                got: 4
            })
        ));
    }
}
