use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ProtocolError;
use crate::resp::{codec, Reply};

/// Largest frame buffered by default before the peer is treated as hostile.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 512 * 1024 * 1024;

/// Pulls bytes from an async transport until the codec sees one whole frame.
pub struct FrameReader<R> {
    reader: R,
    buf: BytesMut,
    scanner: codec::FrameScanner,
    max_frame_bytes: usize,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_limit(reader, DEFAULT_MAX_FRAME_BYTES)
    }

    pub fn with_limit(reader: R, max_frame_bytes: usize) -> Self {
        Self {
            reader,
            buf: BytesMut::with_capacity(4096),
            scanner: codec::FrameScanner::new(),
            max_frame_bytes,
        }
    }

    /// Read the next reply frame. `Ok(None)` means the peer closed cleanly
    /// between frames.
    pub async fn read_frame(&mut self) -> Result<Option<Reply>, ProtocolError> {
        loop {
            if !self.buf.is_empty() {
                // Only build the reply once the scanner has seen all of it.
                if let Some(len) = self.scanner.scan(&self.buf)? {
                    let (reply, _) = codec::decode(&self.buf[..len])?;
                    self.buf.advance(len);
                    return Ok(Some(reply));
                }
                if self.buf.len() > self.max_frame_bytes {
                    return Err(ProtocolError::FrameTooLarge(self.max_frame_bytes));
                }
            }

            let n = self.reader.read_buf(&mut self.buf).await?;
            if n == 0 {
                if self.buf.is_empty() {
                    return Ok(None); // EOF
                }
                return Err(ProtocolError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed mid-frame",
                )));
            }
        }
    }

    /// Read a command (array of bulk strings).
    pub async fn read_command(&mut self) -> Result<Option<Vec<Vec<u8>>>, ProtocolError> {
        let Some(frame) = self.read_frame().await? else {
            return Ok(None);
        };

        match frame {
            Reply::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Reply::BulkString(data) => Ok(data),
                    _ => Err(ProtocolError::ExpectedCommand),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            _ => Err(ProtocolError::ExpectedCommand),
        }
    }
}
