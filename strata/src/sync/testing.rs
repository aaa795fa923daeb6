//! # Instrumented channels for tests
//!
//! [`ProbeChannel`] is an in-memory leaf channel which records every call it receives into a shared
//! [`Probe`]. The probe stays accessible after the channel was moved into a chain of decorators, so
//! tests can observe what a decorator actually sends down the chain.
//!
//! Available with `test_utils` feature.

use std::io::ErrorKind;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::utils::{Closable, Closer};
use crate::sync::ByteChannel;

use crate::prelude::*;

/// Shared record of calls received by a [`ProbeChannel`].
#[derive(Clone, Debug)]
pub struct Probe {
    inner: Arc<ProbeState>,
    state: Closable,
}

#[derive(Debug, Default)]
struct ProbeState {
    reads: AtomicUsize,
    writes: AtomicUsize,
    flushes: AtomicUsize,
    closes: AtomicUsize,
    written: Mutex<Vec<u8>>,
}

impl Probe {
    /// Amount of reads which reached the channel.
    pub fn reads(&self) -> usize {
        self.inner.reads.load(Ordering::Acquire)
    }

    /// Amount of writes which reached the channel.
    pub fn writes(&self) -> usize {
        self.inner.writes.load(Ordering::Acquire)
    }

    /// Amount of flushes which reached the channel.
    pub fn flushes(&self) -> usize {
        self.inner.flushes.load(Ordering::Acquire)
    }

    /// Amount of close calls that actually closed the channel (`0` or `1`).
    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::Acquire)
    }

    /// Returns `true` if the channel is closed.
    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Copy of all bytes accepted by the channel.
    pub fn written(&self) -> Vec<u8> {
        self.inner.written().clone()
    }
}

impl ProbeState {
    fn written(&self) -> MutexGuard<'_, Vec<u8>> {
        self.written
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// <sup>`test_utils`</sup>
/// Leaf channel which records calls into a shared [`Probe`].
///
/// # Usage
///
/// ```rust
/// use strata::sync::prelude::*;
/// use strata::sync::testing::ProbeChannel;
///
/// let channel = ProbeChannel::new().write_chunk(2);
/// let probe = channel.probe();
///
/// let mut buffered = BufferedChannel::new(channel);
/// buffered.write_all(b"abc").unwrap();
/// assert_eq!(probe.writes(), 0);
///
/// buffered.close().unwrap();
/// assert_eq!(probe.written(), b"abc");
/// assert_eq!(probe.writes(), 2);
/// assert_eq!(probe.closes(), 1);
/// ```
#[derive(Debug)]
pub struct ProbeChannel {
    input: Vec<u8>,
    pos: usize,
    read_chunk: usize,
    write_chunk: usize,
    fail_on_write: bool,
    fail_on_flush: bool,
    probe: Probe,
    info: ChannelInfo,
    state: Closer,
}

impl ProbeChannel {
    /// Creates a channel without input.
    pub fn new() -> Self {
        Self::with_input(Vec::new())
    }

    /// Creates a channel which serves `input` to readers.
    pub fn with_input(input: impl Into<Vec<u8>>) -> Self {
        let state = Closer::new();
        Self {
            input: input.into(),
            pos: 0,
            read_chunk: usize::MAX,
            write_chunk: usize::MAX,
            fail_on_write: false,
            fail_on_flush: false,
            probe: Probe {
                inner: Arc::new(ProbeState::default()),
                state: state.to_closable(),
            },
            info: ChannelInfo::custom("probe"),
            state,
        }
    }

    /// Limits the amount of bytes returned by a single read.
    pub fn read_chunk(mut self, read_chunk: usize) -> Self {
        self.read_chunk = read_chunk.max(1);
        self
    }

    /// Limits the amount of bytes accepted by a single write.
    pub fn write_chunk(mut self, write_chunk: usize) -> Self {
        self.write_chunk = write_chunk.max(1);
        self
    }

    /// Makes every write fail with [`ErrorKind::BrokenPipe`].
    pub fn fail_on_write(mut self) -> Self {
        self.fail_on_write = true;
        self
    }

    /// Makes every flush fail with [`ErrorKind::BrokenPipe`].
    pub fn fail_on_flush(mut self) -> Self {
        self.fail_on_flush = true;
        self
    }

    /// Shared record of calls.
    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }

    fn broken_pipe() -> Error {
        Error::from(std::io::Error::new(ErrorKind::BrokenPipe, "probe failure"))
    }
}

impl Default for ProbeChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteChannel for ProbeChannel {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        self.state.ensure_open()?;
        self.probe.inner.reads.fetch_add(1, Ordering::AcqRel);

        if buf.is_empty() {
            return Ok(ReadOutcome::Data(0));
        }
        if self.pos >= self.input.len() {
            return Ok(ReadOutcome::EndOfStream);
        }

        let n = buf
            .len()
            .min(self.read_chunk)
            .min(self.input.len() - self.pos);
        buf[..n].copy_from_slice(&self.input[self.pos..self.pos + n]);
        self.pos += n;

        Ok(ReadOutcome::Data(n))
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.state.ensure_open()?;
        self.probe.inner.writes.fetch_add(1, Ordering::AcqRel);

        if self.fail_on_write {
            return Err(Self::broken_pipe());
        }

        let n = buf.len().min(self.write_chunk);
        self.probe.inner.written().extend_from_slice(&buf[..n]);

        Ok(n)
    }

    fn flush(&mut self) -> Result<()> {
        self.state.ensure_open()?;
        self.probe.inner.flushes.fetch_add(1, Ordering::AcqRel);

        if self.fail_on_flush {
            return Err(Self::broken_pipe());
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.state.close() {
            self.probe.inner.closes.fetch_add(1, Ordering::AcqRel);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_records_calls() {
        let mut channel = ProbeChannel::with_input(b"abcdef".to_vec())
            .read_chunk(4)
            .write_chunk(3);
        let probe = channel.probe();

        let mut buf = [0u8; 8];
        assert_eq!(channel.read(&mut buf).unwrap(), ReadOutcome::Data(4));
        assert_eq!(channel.read(&mut buf).unwrap(), ReadOutcome::Data(2));
        assert_eq!(channel.read(&mut buf).unwrap(), ReadOutcome::EndOfStream);

        assert_eq!(channel.write(b"12345").unwrap(), 3);
        channel.flush().unwrap();
        channel.close().unwrap();
        channel.close().unwrap();

        assert_eq!(probe.reads(), 3);
        assert_eq!(probe.writes(), 1);
        assert_eq!(probe.flushes(), 1);
        assert_eq!(probe.closes(), 1);
        assert_eq!(probe.written(), b"123");
        assert!(probe.is_closed());
    }

    #[test]
    fn probe_failures() {
        let mut channel = ProbeChannel::new().fail_on_write().fail_on_flush();
        assert_eq!(
            channel.write(b"x").unwrap_err().io_kind(),
            Some(ErrorKind::BrokenPipe)
        );
        assert_eq!(
            channel.flush().unwrap_err().io_kind(),
            Some(ErrorKind::BrokenPipe)
        );
    }
}
