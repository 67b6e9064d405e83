/// Blocking (`std::io`/`std::net`) frame I/O.
pub mod blocking;
mod error;
pub mod frame;
/// Async (`tokio`) frame I/O.
pub mod tokio;

pub use error::{FrameError, FrameReadError};
pub use frame::{AMS_FRAME_MAX_LEN, AmsFrame};
