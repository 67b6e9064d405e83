use super::error::{
    AdsAddDeviceNotificationResponseError, AdsDeviceInfoResponseError,
    AdsDeviceNotificationStreamHeaderError, AdsNotificationSampleHeaderError,
    AdsReadResponseError, AdsStampHeaderError, AdsWriteResponseError,
};
use crate::ads::{AdsDeviceVersion, AdsReturnCode, AdsState, AdsString, NotificationHandle, WindowsFileTime};

/// Payload of an `AdsRead`/`AdsReadWrite` response header. The read data itself
/// follows this header in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdsReadResponse {
    result: AdsReturnCode,
    length: u32,
}

impl AdsReadResponse {
    pub const LENGTH: usize = 8;

    pub fn new(result: AdsReturnCode, length: u32) -> Self {
        Self { result, length }
    }

    pub fn result(&self) -> AdsReturnCode {
        self.result
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

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AdsReadResponseError> {
        bytes.try_into()
    }
}

impl From<&AdsReadResponse> for [u8; AdsReadResponse::LENGTH] {
    fn from(value: &AdsReadResponse) -> Self {
        let mut buf = [0u8; AdsReadResponse::LENGTH];
        buf[0..4].copy_from_slice(&value.result.to_bytes());
        buf[4..8].copy_from_slice(&value.length.to_le_bytes());
        buf
    }
}

impl From<[u8; Self::LENGTH]> for AdsReadResponse {
    fn from(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            result: AdsReturnCode::from_bytes(bytes[0..4].try_into().unwrap()),
            length: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
        }
    }
}

impl TryFrom<&[u8]> for AdsReadResponse {
    type Error = AdsReadResponseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != Self::LENGTH {
            return Err(AdsReadResponseError::UnexpectedLength {
                expected: Self::LENGTH,
                got: bytes.len(),
            });
        }
        let arr: [u8; Self::LENGTH] = bytes.try_into().unwrap();
        Ok(Self::from(arr))
    }
}

/// `AdsReadWrite` shares its response header layout with `AdsRead`.
pub type AdsReadWriteResponse = AdsReadResponse;

/// Payload of an `AdsWrite` response: just the result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdsWriteResponse {
    result: AdsReturnCode,
}

impl AdsWriteResponse {
    pub const LENGTH: usize = 4;

    pub fn new(result: AdsReturnCode) -> Self {
        Self { result }
    }

    pub fn result(&self) -> AdsReturnCode {
        self.result
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.into()
    }

    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self::from(bytes)
    }

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AdsWriteResponseError> {
        bytes.try_into()
    }
}

impl From<&AdsWriteResponse> for [u8; AdsWriteResponse::LENGTH] {
    fn from(value: &AdsWriteResponse) -> Self {
        value.result.to_bytes()
    }
}

impl From<[u8; Self::LENGTH]> for AdsWriteResponse {
    fn from(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            result: AdsReturnCode::from_bytes(bytes),
        }
    }
}

impl TryFrom<&[u8]> for AdsWriteResponse {
    type Error = AdsWriteResponseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != Self::LENGTH {
            return Err(AdsWriteResponseError::UnexpectedLength {
                expected: Self::LENGTH,
                got: bytes.len(),
            });
        }
        let arr: [u8; Self::LENGTH] = bytes.try_into().unwrap();
        Ok(Self::from(arr))
    }
}

/// `AdsWriteControl` and `AdsDeleteDeviceNotification` both respond with just
/// a result code, identical in shape to [`AdsWriteResponse`].
pub type AdsWriteControlResponse = AdsWriteResponse;
pub type AdsDeleteDeviceNotificationResponse = AdsWriteResponse;

/// Payload of an `AdsReadState` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdsReadStateResponse {
    result: AdsReturnCode,
    ads_state: AdsState,
    device_state: u16,
}

impl AdsReadStateResponse {
    pub const LENGTH: usize = 8;

    pub fn new(result: AdsReturnCode, ads_state: AdsState, device_state: u16) -> Self {
        Self {
            result,
            ads_state,
            device_state,
        }
    }

    pub fn result(&self) -> AdsReturnCode {
        self.result
    }

    pub fn ads_state(&self) -> AdsState {
        self.ads_state
    }

    pub fn device_state(&self) -> u16 {
        self.device_state
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.into()
    }

    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self::from(bytes)
    }
}

impl From<&AdsReadStateResponse> for [u8; AdsReadStateResponse::LENGTH] {
    fn from(value: &AdsReadStateResponse) -> Self {
        let mut buf = [0u8; AdsReadStateResponse::LENGTH];
        buf[0..4].copy_from_slice(&value.result.to_bytes());
        buf[4..6].copy_from_slice(&value.ads_state.to_bytes());
        buf[6..8].copy_from_slice(&value.device_state.to_le_bytes());
        buf
    }
}

impl From<[u8; Self::LENGTH]> for AdsReadStateResponse {
    fn from(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            result: AdsReturnCode::from_bytes(bytes[0..4].try_into().unwrap()),
            ads_state: AdsState::from_bytes(bytes[4..6].try_into().unwrap()),
            device_state: u16::from_le_bytes(bytes[6..8].try_into().unwrap()),
        }
    }
}

/// Payload of an `AdsReadDeviceInfo` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdsDeviceInfoResponse {
    result: AdsReturnCode,
    version: AdsDeviceVersion,
    device_name: AdsString<16>,
}

impl AdsDeviceInfoResponse {
    pub const LENGTH: usize = 24;

    pub fn new(result: AdsReturnCode, version: AdsDeviceVersion, device_name: AdsString<16>) -> Self {
        Self {
            result,
            version,
            device_name,
        }
    }

    pub fn result(&self) -> AdsReturnCode {
        self.result
    }

    pub fn version(&self) -> AdsDeviceVersion {
        self.version
    }

    pub fn device_name(&self) -> &AdsString<16> {
        &self.device_name
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.into()
    }

    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self::from(bytes)
    }

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AdsDeviceInfoResponseError> {
        bytes.try_into()
    }
}

impl From<&AdsDeviceInfoResponse> for [u8; AdsDeviceInfoResponse::LENGTH] {
    fn from(value: &AdsDeviceInfoResponse) -> Self {
        let mut buf = [0u8; AdsDeviceInfoResponse::LENGTH];
        buf[0..4].copy_from_slice(&value.result.to_bytes());
        buf[4..8].copy_from_slice(&value.version.to_bytes());
        buf[8..24].copy_from_slice(value.device_name.as_bytes());
        buf
    }
}

impl From<[u8; Self::LENGTH]> for AdsDeviceInfoResponse {
    fn from(bytes: [u8; Self::LENGTH]) -> Self {
        let name_bytes: [u8; 16] = bytes[8..24].try_into().unwrap();
        Self {
            result: AdsReturnCode::from_bytes(bytes[0..4].try_into().unwrap()),
            version: AdsDeviceVersion::from_bytes(bytes[4..8].try_into().unwrap()),
            device_name: AdsString::from(name_bytes),
        }
    }
}

impl TryFrom<&[u8]> for AdsDeviceInfoResponse {
    type Error = AdsDeviceInfoResponseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != Self::LENGTH {
            return Err(AdsDeviceInfoResponseError::UnexpectedLength {
                expected: Self::LENGTH,
                got: bytes.len(),
            });
        }
        let arr: [u8; Self::LENGTH] = bytes.try_into().unwrap();
        Ok(Self::from(arr))
    }
}

/// Payload of an `AdsAddDeviceNotification` response: the assigned handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdsAddDeviceNotificationResponse {
    result: AdsReturnCode,
    handle: NotificationHandle,
}

impl AdsAddDeviceNotificationResponse {
    pub const LENGTH: usize = 8;

    pub fn new(result: AdsReturnCode, handle: NotificationHandle) -> Self {
        Self { result, handle }
    }

    pub fn result(&self) -> AdsReturnCode {
        self.result
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

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AdsAddDeviceNotificationResponseError> {
        bytes.try_into()
    }
}

impl From<&AdsAddDeviceNotificationResponse> for [u8; AdsAddDeviceNotificationResponse::LENGTH] {
    fn from(value: &AdsAddDeviceNotificationResponse) -> Self {
        let mut buf = [0u8; AdsAddDeviceNotificationResponse::LENGTH];
        buf[0..4].copy_from_slice(&value.result.to_bytes());
        buf[4..8].copy_from_slice(&value.handle.to_bytes());
        buf
    }
}

impl From<[u8; Self::LENGTH]> for AdsAddDeviceNotificationResponse {
    fn from(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            result: AdsReturnCode::from_bytes(bytes[0..4].try_into().unwrap()),
            handle: NotificationHandle::from_bytes(bytes[4..8].try_into().unwrap()),
        }
    }
}

impl TryFrom<&[u8]> for AdsAddDeviceNotificationResponse {
    type Error = AdsAddDeviceNotificationResponseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != Self::LENGTH {
            return Err(AdsAddDeviceNotificationResponseError::UnexpectedLength {
                expected: Self::LENGTH,
                got: bytes.len(),
            });
        }
        let arr: [u8; Self::LENGTH] = bytes.try_into().unwrap();
        Ok(Self::from(arr))
    }
}

/// Precedes a batch of [`AdsStampHeader`]s in an unsolicited `AdsDeviceNotification`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdsDeviceNotificationStreamHeader {
    length: u32,
    stamps: u32,
}

impl AdsDeviceNotificationStreamHeader {
    pub const LENGTH: usize = 8;

    pub fn new(length: u32, stamps: u32) -> Self {
        Self { length, stamps }
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn stamps(&self) -> u32 {
        self.stamps
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.into()
    }

    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self::from(bytes)
    }

    pub fn try_from_slice(
        bytes: &[u8],
    ) -> Result<Self, AdsDeviceNotificationStreamHeaderError> {
        bytes.try_into()
    }
}

impl From<&AdsDeviceNotificationStreamHeader> for [u8; AdsDeviceNotificationStreamHeader::LENGTH] {
    fn from(value: &AdsDeviceNotificationStreamHeader) -> Self {
        let mut buf = [0u8; AdsDeviceNotificationStreamHeader::LENGTH];
        buf[0..4].copy_from_slice(&value.length.to_le_bytes());
        buf[4..8].copy_from_slice(&value.stamps.to_le_bytes());
        buf
    }
}

impl From<[u8; Self::LENGTH]> for AdsDeviceNotificationStreamHeader {
    fn from(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            length: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            stamps: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
        }
    }
}

impl TryFrom<&[u8]> for AdsDeviceNotificationStreamHeader {
    type Error = AdsDeviceNotificationStreamHeaderError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != Self::LENGTH {
            return Err(AdsDeviceNotificationStreamHeaderError::UnexpectedLength {
                expected: Self::LENGTH,
                got: bytes.len(),
            });
        }
        let arr: [u8; Self::LENGTH] = bytes.try_into().unwrap();
        Ok(Self::from(arr))
    }
}

/// Precedes a batch of [`AdsNotificationSampleHeader`]s within one [`AdsDeviceNotificationStreamHeader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdsStampHeader {
    timestamp: WindowsFileTime,
    samples: u32,
}

impl AdsStampHeader {
    pub const LENGTH: usize = 12;

    pub fn new(timestamp: WindowsFileTime, samples: u32) -> Self {
        Self { timestamp, samples }
    }

    pub fn timestamp(&self) -> WindowsFileTime {
        self.timestamp
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.into()
    }

    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self::from(bytes)
    }

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AdsStampHeaderError> {
        bytes.try_into()
    }
}

impl From<&AdsStampHeader> for [u8; AdsStampHeader::LENGTH] {
    fn from(value: &AdsStampHeader) -> Self {
        let mut buf = [0u8; AdsStampHeader::LENGTH];
        buf[0..8].copy_from_slice(&value.timestamp.to_bytes());
        buf[8..12].copy_from_slice(&value.samples.to_le_bytes());
        buf
    }
}

impl From<[u8; Self::LENGTH]> for AdsStampHeader {
    fn from(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            timestamp: WindowsFileTime::from_bytes(bytes[0..8].try_into().unwrap()),
            samples: u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
        }
    }
}

impl TryFrom<&[u8]> for AdsStampHeader {
    type Error = AdsStampHeaderError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != Self::LENGTH {
            return Err(AdsStampHeaderError::UnexpectedLength {
                expected: Self::LENGTH,
                got: bytes.len(),
            });
        }
        let arr: [u8; Self::LENGTH] = bytes.try_into().unwrap();
        Ok(Self::from(arr))
    }
}

/// Precedes each notification sample's raw data within one [`AdsStampHeader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdsNotificationSampleHeader {
    handle: NotificationHandle,
    sample_size: u32,
}

impl AdsNotificationSampleHeader {
    pub const LENGTH: usize = 8;

    pub fn new(handle: NotificationHandle, sample_size: u32) -> Self {
        Self {
            handle,
            sample_size,
        }
    }

    pub fn handle(&self) -> NotificationHandle {
        self.handle
    }

    pub fn sample_size(&self) -> u32 {
        self.sample_size
    }

    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        self.into()
    }

    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self::from(bytes)
    }

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AdsNotificationSampleHeaderError> {
        bytes.try_into()
    }
}

impl From<&AdsNotificationSampleHeader> for [u8; AdsNotificationSampleHeader::LENGTH] {
    fn from(value: &AdsNotificationSampleHeader) -> Self {
        let mut buf = [0u8; AdsNotificationSampleHeader::LENGTH];
        buf[0..4].copy_from_slice(&value.handle.to_bytes());
        buf[4..8].copy_from_slice(&value.sample_size.to_le_bytes());
        buf
    }
}

impl From<[u8; Self::LENGTH]> for AdsNotificationSampleHeader {
    fn from(bytes: [u8; Self::LENGTH]) -> Self {
        Self {
            handle: NotificationHandle::from_bytes(bytes[0..4].try_into().unwrap()),
            sample_size: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
        }
    }
}

impl TryFrom<&[u8]> for AdsNotificationSampleHeader {
    type Error = AdsNotificationSampleHeaderError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != Self::LENGTH {
            return Err(AdsNotificationSampleHeaderError::UnexpectedLength {
                expected: Self::LENGTH,
                got: bytes.len(),
            });
        }
        let arr: [u8; Self::LENGTH] = bytes.try_into().unwrap();
        Ok(Self::from(arr))
    }
}
