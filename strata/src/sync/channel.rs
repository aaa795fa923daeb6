use std::io::{ErrorKind, SeekFrom};

use crate::prelude::*;

/// Size of the scratch buffer used by [`ByteChannel::read_to_end`].
const READ_TO_END_CHUNK: usize = 8192;

/// <sup>[`sync`](crate::sync)</sup>
/// Blocking byte channel.
///
/// A minimal readable, writable, and closable byte stream. Leaf channels talk to a backend
/// ([`MemoryChannel`](super::MemoryChannel), [`FileChannel`](super::FileChannel),
/// [`TcpChannel`](super::TcpChannel)), decorators wrap exactly one inner channel and add one
/// capability while keeping this contract.
///
/// # Contract
///
/// * [`read`](ByteChannel::read) places between `0` and `buf.len()` bytes into `buf`, or returns
///   [`ReadOutcome::EndOfStream`] when no more bytes will ever be available. A read into an empty
///   buffer returns `Data(0)` and never touches the backend.
/// * [`write`](ByteChannel::write) returns the amount of accepted bytes which may be less than
///   requested. Use [`write_all`](ByteChannel::write_all) to loop until everything is accepted.
/// * [`close`](ByteChannel::close) releases resources. It is idempotent: closing a closed channel
///   succeeds and does nothing. All other operations on a closed channel fail with
///   [`Error::Closed`].
/// * Any error from `read` or `write` is terminal for the channel.
pub trait ByteChannel {
    /// Reads up to `buf.len()` bytes.
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome>;

    /// Writes bytes from `buf`, returns the amount of accepted bytes.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Pushes buffered bytes down the chain.
    fn flush(&mut self) -> Result<()>;

    /// Closes the channel and everything it wraps.
    ///
    /// If pending data can't be flushed, the underlying resources are released anyway and the
    /// flush error is returned.
    fn close(&mut self) -> Result<()>;

    /// Returns `true` once the channel is closed.
    fn is_closed(&self) -> bool;

    /// Information about the backend at the bottom of the chain.
    fn info(&self) -> &ChannelInfo;

    /// Writes the entire buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] of [`ErrorKind::WriteZero`] kind, if channel stops accepting bytes.
    fn write_all(&mut self, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            match self.write(buf)? {
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
    fn read_to_end(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        let start = out.len();
        let mut chunk = vec![0u8; READ_TO_END_CHUNK];
        loop {
            match self.read(&mut chunk)? {
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
    fn read_exact(&mut self, mut buf: &mut [u8]) -> Result<()> {
        while !buf.is_empty() {
            match self.read(buf)? {
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

/// <sup>[`sync`](crate::sync)</sup>
/// Byte channel with random access.
///
/// Implemented only by backends that support repositioning (memory and files) and by decorators
/// that can keep their state consistent across a seek. Network channels are never [`Seekable`].
pub trait Seekable: ByteChannel {
    /// Moves the position, returns the new position from the start of the stream.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64>;

    /// Moves the position to the start of the stream.
    fn rewind(&mut self) -> Result<()> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Current position from the start of the stream.
    fn position(&mut self) -> Result<u64> {
        self.seek(SeekFrom::Current(0))
    }
}

impl<C: ByteChannel + ?Sized> ByteChannel for Box<C> {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }

    fn info(&self) -> &ChannelInfo {
        (**self).info()
    }
}

impl<C: Seekable + ?Sized> Seekable for Box<C> {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        (**self).seek(pos)
    }
}

/// Resolves a seek target against a stream of `len` bytes at position `current`.
pub(super) fn resolve_seek(pos: SeekFrom, current: u64, len: u64) -> Result<u64> {
    let target = match pos {
        SeekFrom::Start(offset) => Some(offset),
        SeekFrom::End(offset) => len.checked_add_signed(offset),
        SeekFrom::Current(offset) => current.checked_add_signed(offset),
    };
    target.ok_or_else(|| {
        Error::from(std::io::Error::new(
            ErrorKind::InvalidInput,
            "invalid seek to a negative or overflowing position",
        ))
    })
}
