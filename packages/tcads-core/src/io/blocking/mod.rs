pub mod reader;
pub mod stream;
mod traits;
pub mod writer;

pub use reader::{AmsIncoming, AmsReader};
pub use stream::AmsStream;
pub use writer::AmsWriter;
