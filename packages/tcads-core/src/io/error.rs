use crate::ams::AmsCommand;
use thiserror::Error;

/// Errors produced while decoding an AMS/TCP frame, as opposed to a failure
/// of the underlying transport itself.
///
/// Grounded on the frame layer's decode invariants: a short read just means
/// "not yet a whole frame" (the stream closed mid-header or mid-payload), an
/// AMS/TCP command code outside the known set means the stream has lost
/// frame alignment, and an implausibly large advertised length is rejected
/// before an allocation is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame incomplete: need {needed} more bytes")]
    TooShort { needed: usize },
    #[error("frame desync: unrecognised AMS/TCP command code")]
    Desync,
    #[error("oversize frame: {len} bytes exceeds the {max} byte cap")]
    Oversize { len: usize, max: usize },
}

impl FrameError {
    /// Rejects an advertised payload length above `max`.
    pub(crate) fn check_len(len: usize, max: usize) -> Result<(), Self> {
        if len > max {
            Err(Self::Oversize { len, max })
        } else {
            Ok(())
        }
    }

    /// Rejects an AMS/TCP command code that doesn't decode to a known
    /// router- or ADS-level command: the command field doubles as the
    /// header's framing marker, so an [`AmsCommand::Unknown`] here means the
    /// byte stream is no longer aligned on a frame boundary.
    pub(crate) fn check_command(command: AmsCommand) -> Result<(), Self> {
        if matches!(command, AmsCommand::Unknown(_)) {
            Err(Self::Desync)
        } else {
            Ok(())
        }
    }
}

/// Either a transport failure or a frame decode failure, as surfaced by the
/// buffering [`AmsReader`](crate::io::tokio::AmsReader)s.
#[derive(Error, Debug)]
pub enum FrameReadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Frame(#[from] FrameError),
}
