use std::io::SeekFrom;

use crate::core::utils::Closer;
use crate::sync::channel::resolve_seek;
use crate::sync::{ByteChannel, Seekable};

use crate::prelude::*;

/// <sup>[`sync`](crate::sync)</sup>
/// In-memory byte channel.
///
/// Holds a growable buffer and a position. Writes overwrite bytes at the position and extend the
/// buffer past its end. Reads start at the position, so data written by a session has to be
/// rewound (see [`Seekable::rewind`]) or handed over by [`MemoryChannel::into_bytes`] before it
/// can be read back.
///
/// Closing a memory channel forbids further I/O, but the bytes remain accessible.
///
/// # Usage
///
/// ```rust
/// use strata::sync::prelude::*;
///
/// let mut channel = MemoryChannel::new();
/// channel.write_all(b"abc").unwrap();
/// channel.rewind().unwrap();
///
/// let mut buf = [0u8; 8];
/// assert_eq!(channel.read(&mut buf).unwrap(), ReadOutcome::Data(3));
/// assert_eq!(channel.read(&mut buf).unwrap(), ReadOutcome::EndOfStream);
/// ```
#[derive(Debug)]
pub struct MemoryChannel {
    data: Vec<u8>,
    pos: usize,
    info: ChannelInfo,
    state: Closer,
}

impl MemoryChannel {
    /// Creates an empty channel.
    pub fn new() -> Self {
        Self::from_bytes(Vec::new())
    }

    /// Creates a channel positioned at the start of `bytes`.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            data: bytes.into(),
            pos: 0,
            info: ChannelInfo::Memory,
            state: Closer::new(),
        }
    }

    /// Stored bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Consumes the channel and returns stored bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Amount of stored bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<u8>> for MemoryChannel {
    fn from(value: Vec<u8>) -> Self {
        Self::from_bytes(value)
    }
}

impl ByteChannel for MemoryChannel {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        self.state.ensure_open()?;
        if buf.is_empty() {
            return Ok(ReadOutcome::Data(0));
        }
        if self.pos >= self.data.len() {
            return Ok(ReadOutcome::EndOfStream);
        }

        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;

        Ok(ReadOutcome::Data(n))
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.state.ensure_open()?;

        let end = self.pos + buf.len();
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(buf);
        self.pos = end;

        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.state.ensure_open()
    }

    fn close(&mut self) -> Result<()> {
        if self.state.close() {
            log::trace!("[{}] closed with {} bytes", self.info, self.data.len());
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    fn info(&self) -> &ChannelInfo {
        &self.info
    }
}

impl Seekable for MemoryChannel {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.state.ensure_open()?;

        let target = resolve_seek(pos, self.pos as u64, self.data.len() as u64)?;
        self.pos = usize::try_from(target).map_err(|_| {
            Error::from(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "seek position exceeds addressable memory",
            ))
        })?;

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_read_returns_no_bytes() {
        let mut channel = MemoryChannel::from_bytes(b"data".to_vec());
        assert_eq!(channel.read(&mut []).unwrap(), ReadOutcome::Data(0));
        assert_eq!(channel.position().unwrap(), 0);
    }

    #[test]
    fn end_of_stream_is_not_an_error() {
        let mut channel = MemoryChannel::new();
        let mut buf = [0u8; 4];
        assert_eq!(channel.read(&mut buf).unwrap(), ReadOutcome::EndOfStream);
        assert_eq!(channel.read(&mut buf).unwrap(), ReadOutcome::EndOfStream);
    }

    #[test]
    fn writes_overwrite_then_extend() {
        let mut channel = MemoryChannel::from_bytes(b"hello".to_vec());
        channel.seek(SeekFrom::Start(3)).unwrap();
        channel.write_all(b"p me").unwrap();
        assert_eq!(channel.as_bytes(), b"help me");

        channel.seek(SeekFrom::End(2)).unwrap();
        channel.write_all(b"!").unwrap();
        assert_eq!(channel.as_bytes(), b"help me\0\0!");
    }

    #[test]
    fn negative_seek_is_rejected() {
        let mut channel = MemoryChannel::from_bytes(b"abc".to_vec());
        let err = channel.seek(SeekFrom::Current(-1)).unwrap_err();
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::InvalidInput));
    }

    #[test]
    fn closed_channel_rejects_io_but_keeps_bytes() {
        let mut channel = MemoryChannel::from_bytes(b"abc".to_vec());
        channel.close().unwrap();
        channel.close().unwrap();

        assert!(channel.is_closed());
        assert!(matches!(channel.read(&mut [0u8; 1]), Err(Error::Closed)));
        assert!(matches!(channel.write(b"x"), Err(Error::Closed)));
        assert_eq!(channel.into_bytes(), b"abc");
    }
}
