use std::io::{Read, Seek, SeekFrom, Write};

use crate::sync::{ByteChannel, Seekable};

use crate::prelude::*;

/// <sup>[`sync`](crate::sync)</sup>
/// Exposes a [`ByteChannel`] as [`std::io::Read`] and [`std::io::Write`].
///
/// [`Seekable`] channels are also exposed as [`std::io::Seek`]. Channel errors are converted to
/// [`std::io::Error`] with a matching [`ErrorKind`](std::io::ErrorKind): corrupt data becomes
/// `InvalidData`, a closed channel becomes `NotConnected`.
///
/// Dropping the adapter drops (and therefore closes) the channel. Use [`IoAdapter::into_inner`] to
/// get the channel back.
///
/// # Usage
///
/// ```rust
/// use std::io::{Read, Write};
/// use strata::sync::prelude::*;
///
/// let mut adapter = IoAdapter::new(MemoryChannel::new());
/// write!(adapter, "{} + {}", 2, 2).unwrap();
///
/// let mut channel = adapter.into_inner();
/// channel.rewind().unwrap();
///
/// let mut text = String::new();
/// IoAdapter::new(channel).read_to_string(&mut text).unwrap();
/// assert_eq!(text, "2 + 2");
/// ```
#[derive(Debug)]
pub struct IoAdapter<C: ByteChannel> {
    channel: C,
}

impl<C: ByteChannel> IoAdapter<C> {
    /// Wraps a channel.
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Returns the wrapped channel.
    pub fn into_inner(self) -> C {
        self.channel
    }
}

impl<C: ByteChannel> Read for IoAdapter<C> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.channel.read(buf)? {
            ReadOutcome::Data(n) => Ok(n),
            ReadOutcome::EndOfStream => Ok(0),
        }
    }
}

impl<C: ByteChannel> Write for IoAdapter<C> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(self.channel.write(buf)?)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(self.channel.flush()?)
    }
}

impl<C: Seekable> Seek for IoAdapter<C> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        Ok(self.channel.seek(pos)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{CompressionChannel, MemoryChannel};
    use std::io::ErrorKind;

    #[test]
    fn io_copy_through_adapters() {
        let mut source = IoAdapter::new(MemoryChannel::from_bytes(b"copied bytes".to_vec()));
        let mut target = IoAdapter::new(MemoryChannel::new());

        let copied = std::io::copy(&mut source, &mut target).unwrap();
        assert_eq!(copied, 12);
        assert_eq!(target.into_inner().as_bytes(), b"copied bytes");
    }

    #[test]
    fn seek_is_forwarded() {
        let mut adapter = IoAdapter::new(MemoryChannel::from_bytes(b"0123456789".to_vec()));
        adapter.seek(SeekFrom::End(-3)).unwrap();

        let mut tail = String::new();
        adapter.read_to_string(&mut tail).unwrap();
        assert_eq!(tail, "789");
    }

    #[test]
    fn corrupt_data_becomes_invalid_data() {
        let channel = CompressionChannel::decompressor(
            MemoryChannel::from_bytes(b"definitely not zlib".to_vec()),
            CompressionOptions::default(),
        );
        let mut adapter = IoAdapter::new(channel);

        let err = adapter.read_to_end(&mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}
