use std::io::SeekFrom;

use crate::core::consts::DEFAULT_BLOCK_SIZE;
use crate::core::utils::Closer;
use crate::sync::{ByteChannel, Seekable};

use crate::prelude::*;

/// <sup>[`sync`](crate::sync)</sup>
/// Decorator that turns many small reads and writes into few block-sized calls.
///
/// Owns a single buffer of `block_size` bytes which holds either read-ahead or pending writes,
/// never both:
///
/// * Reads are served from the read-ahead. When it is exhausted, the buffer is refilled by one
///   inner read. Reads into a buffer of at least `block_size` bytes bypass the read-ahead.
/// * Writes are accumulated and reach the inner channel when the buffer is full, on
///   [`flush`](ByteChannel::flush), or on [`close`](ByteChannel::close). Writes of at least
///   `block_size` bytes into an empty buffer are passed through in `block_size` blocks.
/// * A read flushes pending writes first. A write while unread read-ahead is present is rejected
///   with [`Error::InvalidOperation`] since the inner position is already past it. Seekable chains
///   can [`seek`](Seekable::seek) to drop the read-ahead.
///
/// # Usage
///
/// ```rust
/// use strata::sync::prelude::*;
///
/// let mut channel = BufferedChannel::with_block_size(4, MemoryChannel::new()).unwrap();
/// channel.write_all(b"ab").unwrap();
/// assert_eq!(channel.pending_write(), 2);
///
/// channel.rewind().unwrap();
/// let mut buf = [0u8; 2];
/// channel.read_exact(&mut buf).unwrap();
/// assert_eq!(&buf, b"ab");
/// ```
#[derive(Debug)]
pub struct BufferedChannel<C: ByteChannel> {
    inner: Option<C>,
    buf: Box<[u8]>,
    pos: usize,
    filled: usize,
    pending: usize,
    info: ChannelInfo,
    state: Closer,
}

impl<C: ByteChannel> BufferedChannel<C> {
    /// Wraps a channel with the default block size of 8192 bytes.
    pub fn new(inner: C) -> Self {
        Self::build(DEFAULT_BLOCK_SIZE, inner)
    }

    /// Wraps a channel with a custom block size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] for a zero block size.
    pub fn with_block_size(block_size: usize, inner: C) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::InvalidOperation("block size must be positive"));
        }
        Ok(Self::build(block_size, inner))
    }

    fn build(block_size: usize, inner: C) -> Self {
        Self {
            info: inner.info().clone(),
            inner: Some(inner),
            buf: vec![0u8; block_size].into_boxed_slice(),
            pos: 0,
            filled: 0,
            pending: 0,
            state: Closer::new(),
        }
    }

    /// Buffer capacity in bytes.
    pub fn block_size(&self) -> usize {
        self.buf.len()
    }

    /// Amount of read-ahead bytes not yet consumed.
    pub fn buffered_read(&self) -> usize {
        self.filled - self.pos
    }

    /// Amount of written bytes not yet passed to the inner channel.
    pub fn pending_write(&self) -> usize {
        self.pending
    }

    /// Flushes pending writes and returns the inner channel without closing it.
    ///
    /// Unread read-ahead is discarded.
    pub fn into_inner(mut self) -> Result<C> {
        self.state.ensure_open()?;
        self.flush_buffer()?;
        self.state.close();
        self.inner.take().ok_or(Error::Closed)
    }

    fn inner_mut(&mut self) -> Result<&mut C> {
        self.state.ensure_open()?;
        self.inner.as_mut().ok_or(Error::Closed)
    }

    fn flush_buffer(&mut self) -> Result<()> {
        if self.pending == 0 {
            return Ok(());
        }

        let inner = self.inner.as_mut().ok_or(Error::Closed)?;
        inner.write_all(&self.buf[..self.pending])?;
        log::trace!("[{}] flushed block of {} bytes", self.info, self.pending);
        self.pending = 0;

        Ok(())
    }

    fn discard_read_ahead(&mut self) {
        self.pos = 0;
        self.filled = 0;
    }
}

impl<C: ByteChannel> ByteChannel for BufferedChannel<C> {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        self.state.ensure_open()?;
        if buf.is_empty() {
            return Ok(ReadOutcome::Data(0));
        }
        self.flush_buffer()?;

        if self.pos < self.filled {
            let n = buf.len().min(self.filled - self.pos);
            buf[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
            self.pos += n;
            return Ok(ReadOutcome::Data(n));
        }

        self.discard_read_ahead();
        if buf.len() >= self.buf.len() {
            return self.inner_mut()?.read(buf);
        }

        let inner = self.inner.as_mut().ok_or(Error::Closed)?;
        match inner.read(&mut self.buf)? {
            ReadOutcome::Data(filled) => {
                let n = buf.len().min(filled);
                buf[..n].copy_from_slice(&self.buf[..n]);
                self.filled = filled;
                self.pos = n;
                Ok(ReadOutcome::Data(n))
            }
            ReadOutcome::EndOfStream => Ok(ReadOutcome::EndOfStream),
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.state.ensure_open()?;
        if self.pos < self.filled {
            return Err(Error::InvalidOperation(
                "write while unread read-ahead is buffered",
            ));
        }
        self.discard_read_ahead();

        let capacity = self.buf.len();
        let mut accepted = 0;
        while accepted < buf.len() {
            let remaining = &buf[accepted..];

            if self.pending == 0 && remaining.len() >= capacity {
                self.inner_mut()?.write_all(&remaining[..capacity])?;
                accepted += capacity;
                continue;
            }

            let n = remaining.len().min(capacity - self.pending);
            self.buf[self.pending..self.pending + n].copy_from_slice(&remaining[..n]);
            self.pending += n;
            accepted += n;

            if self.pending == capacity {
                self.flush_buffer()?;
            }
        }

        Ok(accepted)
    }

    fn flush(&mut self) -> Result<()> {
        self.state.ensure_open()?;
        self.flush_buffer()?;
        self.inner_mut()?.flush()
    }

    fn close(&mut self) -> Result<()> {
        if !self.state.close() {
            return Ok(());
        }

        let Some(inner) = self.inner.as_mut() else {
            return Ok(());
        };

        let flushed = if self.pending > 0 {
            inner.write_all(&self.buf[..self.pending])
        } else {
            Ok(())
        };
        self.pending = 0;
        self.pos = 0;
        self.filled = 0;

        let closed = inner.close();
        log::trace!("[{}] buffered channel closed", self.info);

        flushed.and(closed)
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    fn info(&self) -> &ChannelInfo {
        &self.info
    }
}

impl<C: Seekable> Seekable for BufferedChannel<C> {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.state.ensure_open()?;
        self.flush_buffer()?;

        let unread = (self.filled - self.pos) as i64;
        let pos = match pos {
            SeekFrom::Current(offset) => SeekFrom::Current(offset.saturating_sub(unread)),
            pos => pos,
        };
        self.discard_read_ahead();

        self.inner_mut()?.seek(pos)
    }
}

impl<C: ByteChannel> Drop for BufferedChannel<C> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("[{}] error while closing on drop: {err:?}", self.info);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::ProbeChannel;
    use crate::sync::MemoryChannel;

    #[test]
    fn small_writes_are_coalesced() {
        let probe_channel = ProbeChannel::new();
        let probe = probe_channel.probe();
        let mut channel = BufferedChannel::with_block_size(4, probe_channel).unwrap();

        channel.write_all(b"ab").unwrap();
        assert_eq!(probe.writes(), 0);
        channel.write_all(b"cd").unwrap();
        assert_eq!(probe.writes(), 1);
        channel.write_all(b"e").unwrap();
        channel.flush().unwrap();

        assert_eq!(probe.writes(), 2);
        assert_eq!(probe.flushes(), 1);
        assert_eq!(probe.written(), b"abcde");
    }

    #[test]
    fn block_sized_writes_pass_through() {
        let probe_channel = ProbeChannel::new();
        let probe = probe_channel.probe();
        let mut channel = BufferedChannel::with_block_size(4, probe_channel).unwrap();
        channel.write_all(b"abcd").unwrap();
        assert_eq!(probe.writes(), 1);
        assert_eq!(channel.pending_write(), 0);

        let probe_channel = ProbeChannel::new();
        let probe = probe_channel.probe();
        let mut channel = BufferedChannel::with_block_size(4, probe_channel).unwrap();
        channel.write_all(b"abcde").unwrap();
        assert_eq!(probe.writes(), 1);
        assert_eq!(channel.pending_write(), 1);

        channel.close().unwrap();
        assert_eq!(probe.writes(), 2);
        assert_eq!(probe.written(), b"abcde");
    }

    #[test]
    fn small_reads_are_served_from_read_ahead() {
        let probe_channel = ProbeChannel::with_input(b"hello world".to_vec());
        let probe = probe_channel.probe();
        let mut channel = BufferedChannel::with_block_size(4, probe_channel).unwrap();

        let mut buf = [0u8; 2];
        channel.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"he");
        channel.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ll");
        assert_eq!(probe.reads(), 1);

        channel.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"o ");
        assert_eq!(probe.reads(), 2);
        assert_eq!(channel.buffered_read(), 2);
    }

    #[test]
    fn large_reads_bypass_buffer() {
        let probe_channel = ProbeChannel::with_input(b"hello world".to_vec());
        let probe = probe_channel.probe();
        let mut channel = BufferedChannel::with_block_size(4, probe_channel).unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(channel.read(&mut buf).unwrap(), ReadOutcome::Data(8));
        assert_eq!(&buf, b"hello wo");
        assert_eq!(probe.reads(), 1);
        assert_eq!(channel.buffered_read(), 0);
    }

    #[test]
    fn zero_block_size_is_rejected() {
        let result = BufferedChannel::with_block_size(0, MemoryChannel::new());
        assert!(matches!(result, Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn write_over_read_ahead_is_rejected() {
        let mut channel = BufferedChannel::with_block_size(
            4,
            ProbeChannel::with_input(b"0123456789".to_vec()),
        )
        .unwrap();

        let mut buf = [0u8; 1];
        channel.read_exact(&mut buf).unwrap();

        let err = channel.write(b"x").unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
        assert!(!err.is_terminal());

        channel.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"1");
    }

    #[test]
    fn seek_accounts_for_read_ahead() {
        let mut channel =
            BufferedChannel::with_block_size(4, MemoryChannel::from_bytes(b"0123456789".to_vec()))
                .unwrap();

        let mut buf = [0u8; 1];
        channel.read_exact(&mut buf).unwrap();
        assert_eq!(channel.position().unwrap(), 1);

        channel.write_all(b"x").unwrap();
        let bytes = channel.into_inner().unwrap().into_bytes();
        assert_eq!(bytes, b"0x23456789");
    }

    #[test]
    fn close_releases_inner_even_if_flush_fails() {
        let probe_channel = ProbeChannel::new().fail_on_write();
        let probe = probe_channel.probe();
        let mut channel = BufferedChannel::new(probe_channel);

        channel.write_all(b"lost").unwrap();
        let err = channel.close().unwrap_err();
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::BrokenPipe));
        assert_eq!(probe.closes(), 1);

        channel.close().unwrap();
        assert!(matches!(channel.write(b"x"), Err(Error::Closed)));
    }

    #[test]
    fn drop_flushes_and_closes() {
        let probe_channel = ProbeChannel::new();
        let probe = probe_channel.probe();

        {
            let mut channel = BufferedChannel::new(probe_channel);
            channel.write_all(b"tail").unwrap();
        }

        assert_eq!(probe.written(), b"tail");
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn into_inner_keeps_inner_open() {
        let probe_channel = ProbeChannel::new();
        let probe = probe_channel.probe();

        let mut channel = BufferedChannel::new(probe_channel);
        channel.write_all(b"data").unwrap();
        let inner = channel.into_inner().unwrap();

        assert!(!inner.is_closed());
        assert_eq!(probe.written(), b"data");
        assert_eq!(probe.closes(), 0);
    }
}
