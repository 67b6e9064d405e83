use crate::ams::{AMS_TCP_HEADER_LEN, AmsTcpHeader};
use crate::io::error::{FrameError, FrameReadError};
use crate::io::frame::{AMS_FRAME_MAX_LEN, AmsFrame};
use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

/// A buffered reader specialised for parsing AMS frames from an asynchronous byte stream.
///
/// This struct wraps an underlying async reader in a [`BufReader`] to minimise system calls
/// when reading the 6-byte [AMS/TCP header](AmsTcpHeader) and the variable-length payload.
pub struct AmsReader<R: AsyncRead> {
    reader: BufReader<R>,
    max_frame_len: usize,
}

impl<R: AsyncRead + Unpin> AmsReader<R> {
    /// Creates a new AmsReader with [default buffering](BufReader::new) and the
    /// default [`AMS_FRAME_MAX_LEN`] cap.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            max_frame_len: AMS_FRAME_MAX_LEN,
        }
    }

    /// Creates a new AmsReader with a specific buffer capacity.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            max_frame_len: AMS_FRAME_MAX_LEN,
        }
    }

    /// Creates a new AmsReader with a custom oversize-frame cap, in place of
    /// the default [`AMS_FRAME_MAX_LEN`].
    pub fn with_max_frame_len(reader: R, max_frame_len: usize) -> Self {
        Self {
            reader: BufReader::new(reader),
            max_frame_len,
        }
    }

    /// Reads a single AMS frame from the underlying stream.
    ///
    /// This method performs the following steps:
    /// 1. Checks for EOF (returns `UnexpectedEof` if the stream is closed cleanly at the start).
    /// 2. Reads the 6-byte AMS/TCP header, reporting [`FrameError::TooShort`] instead of a bare
    ///    EOF if the stream closes partway through it.
    /// 3. Rejects a command code that doesn't decode to a known AMS/TCP command with
    ///    [`FrameError::Desync`] — the stream has lost frame alignment.
    /// 4. Validates the payload length against this reader's cap, returning
    ///    [`FrameError::Oversize`] rather than attempting the allocation.
    /// 5. Reads the exact payload size into a vector, again reporting
    ///    [`FrameError::TooShort`] on a mid-payload EOF.
    pub async fn read_frame(&mut self) -> Result<AmsFrame, FrameReadError> {
        if self.reader.fill_buf().await?.is_empty() {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }

        let mut header_buf = [0u8; AMS_TCP_HEADER_LEN];
        self.read_exact_or_too_short(&mut header_buf).await?;
        let header = AmsTcpHeader::from(header_buf);

        FrameError::check_command(header.command())?;

        let payload_len = header.length() as usize;
        FrameError::check_len(payload_len, self.max_frame_len)?;

        let mut payload = vec![0u8; payload_len];
        self.read_exact_or_too_short(&mut payload).await?;

        Ok(AmsFrame::from_parts(header, payload))
    }

    /// Like `read_exact`, but a mid-buffer EOF is reported as
    /// [`FrameError::TooShort`] rather than a bare `UnexpectedEof`: the peer
    /// closed the connection after starting a frame, not between frames.
    async fn read_exact_or_too_short(&mut self, buf: &mut [u8]) -> Result<(), FrameReadError> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.reader.read(&mut buf[filled..]).await?;
            if n == 0 {
                return Err(FrameError::TooShort {
                    needed: buf.len() - filled,
                }
                .into());
            }
            filled += n;
        }
        Ok(())
    }

    /// Consumes this AmsReader, returning the underlying reader.
    ///
    /// # Note
    ///
    /// Any leftover data in the internal buffer is lost.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ams::AmsCommand;
    use std::time::Duration;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn read_fragmented_frame() {
        let header_part1 = [0x00, 0x10, 0x02]; // Command: 0x1000 (PortConnect), Length partial
        let header_part2 = [0x00, 0x00, 0x00]; // Length: 2 bytes
        let payload = [0xCA, 0xFE];

        let mut mock = Builder::new()
            .read(&header_part1)
            .wait(Duration::from_millis(10)) // Simulate network lag
            .read(&header_part2)
            .read(&payload)
            .build();

        let mut reader = AmsReader::new(&mut mock);
        let frame = reader
            .read_frame()
            .await
            .expect("Should assemble fragmented frame");

        assert_eq!(frame.header().command(), AmsCommand::PortConnect);
        assert_eq!(frame.payload(), &payload);
    }

    #[tokio::test]
    async fn test_clean_eof() {
        let mut mock = Builder::new().build(); // Empty stream
        let mut reader = AmsReader::new(&mut mock);

        let err = reader.read_frame().await.unwrap_err();

        assert!(matches!(err, FrameReadError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[tokio::test]
    async fn test_dirty_eof_in_header_reports_too_short() {
        // Scenario: connection drops partway through the header, not between frames.
        let partial_header = [0x00, 0x10]; // Only 2 of 6 bytes
        let mut mock = Builder::new().read(&partial_header).build();
        let mut reader = AmsReader::new(&mut mock);

        let err = reader.read_frame().await.unwrap_err();

        assert!(matches!(
            err,
            FrameReadError::Frame(FrameError::TooShort { needed: 4 })
        ));
    }

    #[tokio::test]
    async fn test_unknown_command_reports_desync() {
        // Command 0x4242 doesn't decode to any known AMS/TCP command.
        let header = [0x42, 0x42, 0x00, 0x00, 0x00, 0x00];
        let mut mock = Builder::new().read(&header).build();
        let mut reader = AmsReader::new(&mut mock);

        let err = reader.read_frame().await.unwrap_err();

        assert!(matches!(err, FrameReadError::Frame(FrameError::Desync)));
    }

    #[tokio::test]
    async fn test_payload_too_large() {
        let mut header = [0u8; AMS_TCP_HEADER_LEN];
        let bad_len = (AMS_FRAME_MAX_LEN as u32 + 1).to_le_bytes();
        header[2..6].copy_from_slice(&bad_len);

        let mut mock = Builder::new().read(&header).build();
        let mut reader = AmsReader::new(&mut mock);

        let err = reader.read_frame().await.unwrap_err();
        assert!(matches!(
            err,
            FrameReadError::Frame(FrameError::Oversize { len, max })
                if len == AMS_FRAME_MAX_LEN + 1 && max == AMS_FRAME_MAX_LEN
        ));
    }

    #[tokio::test]
    async fn test_with_max_frame_len_caps_below_default() {
        let mut header = [0u8; AMS_TCP_HEADER_LEN];
        header[2..6].copy_from_slice(&100u32.to_le_bytes());
        let mut mock = Builder::new().read(&header).build();
        let mut reader = AmsReader::with_max_frame_len(&mut mock, 64);

        let err = reader.read_frame().await.unwrap_err();
        assert!(matches!(
            err,
            FrameReadError::Frame(FrameError::Oversize { len: 100, max: 64 })
        ));
    }
}
