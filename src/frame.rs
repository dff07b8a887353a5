//! Length-prefixed message framing for the TCP transport.
//!
//! Each request or response travels as one frame: a 4-byte big-endian byte
//! count followed by that many bytes of envelope data.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::HproseError;

/// Upper bound on a single frame, guarding against hostile length prefixes.
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Reads length-prefixed frames from an `AsyncRead` stream.
pub struct FrameReader<R> {
    reader: R,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads one complete frame body.
    pub async fn read_frame(&mut self) -> Result<BytesMut, HproseError> {
        let mut header = [0u8; 4];
        self.reader.read_exact(&mut header).await?;
        let len = u32::from_be_bytes(header) as usize;

        if len > MAX_FRAME_SIZE {
            return Err(HproseError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("frame of {len} bytes exceeds limit of {MAX_FRAME_SIZE}"),
            )));
        }

        let mut body = BytesMut::with_capacity(len);
        body.resize(len, 0);
        self.reader.read_exact(&mut body[..]).await?;
        Ok(body)
    }
}

/// Writes length-prefixed frames to an `AsyncWrite` stream.
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one complete frame: 4-byte length header plus body.
    pub async fn write_frame(&mut self, data: &[u8]) -> Result<(), HproseError> {
        let len = u32::try_from(data.len()).map_err(|_| {
            HproseError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "frame too large for 4-byte length prefix",
            ))
        })?;
        self.writer.write_all(&len.to_be_bytes()).await?;
        self.writer.write_all(data).await?;
        Ok(())
    }

    /// Flushes the underlying writer.
    pub async fn flush(&mut self) -> Result<(), HproseError> {
        self.writer.flush().await?;
        Ok(())
    }
}
