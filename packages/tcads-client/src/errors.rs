use crate::convert::TypeError;
use tcads_core::ads::{AdsReturnCode, DataTypeError, SymbolInfoError};
use tcads_core::io::FrameReadError;
use thiserror::Error;

/// Errors produced while assembling or parsing an AMS/ADS frame.
///
/// Produced by [`tcads_core::io::tokio::AmsReader`]: a short read just means
/// "not yet a whole frame", an unrecognised command code means the stream
/// has desynchronised, and an implausibly large advertised length is
/// rejected before an allocation is attempted.
pub use tcads_core::io::FrameError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("network error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("target returned ADS error: {code}")]
    Ads { code: AdsReturnCode },

    #[error("operation timed out")]
    Timeout,

    #[error("client is not connected")]
    NotConnected,

    #[error("connection was lost while the request was in flight")]
    Disconnected,

    #[error("symbol not found: {name}")]
    SymbolNotFound { name: String },

    #[error("type conversion error: {0}")]
    Type(#[from] TypeError),

    #[error("unexpected response type")]
    UnexpectedResponse,

    #[error("symbol table decode error: {0}")]
    SymbolDecode(#[from] SymbolInfoError),

    #[error("data type table decode error: {0}")]
    DataTypeDecode(#[from] DataTypeError),

    #[error("unknown data type: {name}")]
    UnknownDataType { name: String },
}

impl From<FrameReadError> for ClientError {
    /// Flattens the transport/decode split in [`FrameReadError`] back onto this
    /// crate's existing `Io`/`Frame` variants.
    fn from(err: FrameReadError) -> Self {
        match err {
            FrameReadError::Io(err) => Self::Io(err),
            FrameReadError::Frame(err) => Self::Frame(err),
        }
    }
}

impl ClientError {
    /// Builds the appropriate error for a non-OK ADS return code, distinguishing
    /// the well-known "symbol not found" code (0x710) from any other ADS error.
    pub fn from_return_code(code: AdsReturnCode, symbol_name: Option<&str>) -> Option<Self> {
        match (code, symbol_name) {
            (AdsReturnCode::Ok, _) => None,
            (AdsReturnCode::AdsErrDeviceSymbolNotFound, Some(name)) => Some(Self::SymbolNotFound {
                name: name.to_string(),
            }),
            (code, _) => Some(Self::Ads { code }),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_code_is_not_an_error() {
        assert!(ClientError::from_return_code(AdsReturnCode::Ok, None).is_none());
    }

    #[test]
    fn test_symbol_not_found_maps_to_named_variant() {
        let err =
            ClientError::from_return_code(AdsReturnCode::AdsErrDeviceSymbolNotFound, Some("Foo"))
                .unwrap();
        assert!(matches!(err, ClientError::SymbolNotFound { name } if name == "Foo"));
    }

    #[test]
    fn test_other_code_maps_to_ads_variant() {
        let err =
            ClientError::from_return_code(AdsReturnCode::AdsErrDeviceSrvNotSupp, None).unwrap();
        assert!(matches!(err, ClientError::Ads { .. }));
    }
}
