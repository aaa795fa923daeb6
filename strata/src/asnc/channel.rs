use std::io::ErrorKind;

use async_trait::async_trait;

use crate::prelude::*;

/// Size of the scratch buffer used by [`AsyncByteChannel::read_to_end`].
const READ_TO_END_CHUNK: usize = 8192;

/// <sup>[`async`](crate::asnc)</sup>
/// Suspending byte channel.
///
/// Mirrors [`ByteChannel`](crate::sync::ByteChannel): the same outcomes, the same close
/// semantics, the same errors. Operations yield to the scheduler while outstanding.
///
/// Dropping an outstanding operation future cancels it. Whether the backend operation is aborted or
/// completed in background depends on the implementation, in both cases the channel stays usable.
#[async_trait]
pub trait AsyncByteChannel: Send {
    /// Reads up to `buf.len()` bytes.
    async fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome>;

    /// Writes bytes from `buf`, returns the amount of accepted bytes.
    async fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Pushes buffered bytes down the chain.
    async fn flush(&mut self) -> Result<()>;

    /// Closes the channel and everything it wraps, idempotent.
    async fn close(&mut self) -> Result<()>;

    /// Returns `true` once the channel is closed.
    fn is_closed(&self) -> bool;

    /// Information about the backend at the bottom of the chain.
    fn info(&self) -> &ChannelInfo;

    /// Writes the entire buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] of [`ErrorKind::WriteZero`] kind, if channel stops accepting bytes.
    async fn write_all(&mut self, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            let written = self.write(buf).await?;
            match written {
                0 => {
                    return Err(Error::from(std::io::Error::new(
                        ErrorKind::WriteZero,
                        "channel accepted no bytes",
                    )))
                }
                n => buf = &buf[n..],
            }
        }
        Ok(())
    }

    /// Reads until the end of stream, appending bytes to `out`.
    ///
    /// Returns the amount of bytes read.
    async fn read_to_end(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        let start = out.len();
        let mut chunk = vec![0u8; READ_TO_END_CHUNK];
        loop {
            let outcome = self.read(&mut chunk).await?;
            match outcome {
                ReadOutcome::Data(n) => out.extend_from_slice(&chunk[..n]),
                ReadOutcome::EndOfStream => return Ok(out.len() - start),
            }
        }
    }

    /// Fills the entire buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] of [`ErrorKind::UnexpectedEof`] kind, if the stream ends before the
    /// buffer is filled.
    async fn read_exact(&mut self, mut buf: &mut [u8]) -> Result<()> {
        while !buf.is_empty() {
            let outcome = self.read(buf).await?;
            match outcome {
                ReadOutcome::Data(n) => buf = &mut buf[n..],
                ReadOutcome::EndOfStream => {
                    return Err(Error::from(std::io::Error::new(
                        ErrorKind::UnexpectedEof,
                        "stream ended before the buffer was filled",
                    )))
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<C: AsyncByteChannel + ?Sized> AsyncByteChannel for Box<C> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        (**self).read(buf).await
    }

    async fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write(buf).await
    }

    async fn flush(&mut self) -> Result<()> {
        (**self).flush().await
    }

    async fn close(&mut self) -> Result<()> {
        (**self).close().await
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }

    fn info(&self) -> &ChannelInfo {
        (**self).info()
    }
}
