use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::asnc::AsyncByteChannel;
use crate::core::utils::{Closable, Closer};
use crate::sync::ByteChannel;

use crate::prelude::*;

/// Blocking call executed by a worker.
enum Call {
    Read(usize),
    Write(Vec<u8>),
    Flush,
    Close,
}

/// Result of a blocking call.
enum Completion {
    Read(Vec<u8>, ReadOutcome),
    Written(usize),
    Done,
}

impl Call {
    fn apply<C: ByteChannel>(self, channel: &mut C) -> Result<Completion> {
        match self {
            Call::Read(len) => {
                let mut data = vec![0u8; len];
                let outcome = channel.read(&mut data)?;
                data.truncate(outcome.bytes());
                Ok(Completion::Read(data, outcome))
            }
            Call::Write(data) => channel.write(&data).map(Completion::Written),
            Call::Flush => channel.flush().map(|_| Completion::Done),
            Call::Close => channel.close().map(|_| Completion::Done),
        }
    }
}

/// Where the wrapped channel currently is.
enum Slot<C> {
    Idle(C),
    Busy(JoinHandle<(C, Result<Completion>)>),
    Lost,
}

/// <sup>[`async`](crate::asnc)</sup>
/// Exposes a blocking [`ByteChannel`] as an [`AsyncByteChannel`].
///
/// Every call on the wrapped channel runs on a blocking worker
/// ([`spawn_blocking`](tokio::task::spawn_blocking)), so the caller task yields while the call is
/// outstanding. The wrapped channel moves to the worker for the duration of the call and comes back
/// once the call completes.
///
/// # Cancellation
///
/// A blocking call can't be aborted. When the [`CancellationToken`] of the adapter is cancelled
/// while a call is outstanding, the operation returns [`Error::Cancelled`] immediately, and the
/// call keeps running in background. The same happens when the operation future is dropped. The next
/// operation waits for the abandoned call, discards its result, and proceeds. Bytes read by an
/// abandoned call are lost.
///
/// A cancelled token stays cancelled: all further operations fail with [`Error::Cancelled`] until a
/// fresh token is set by [`AsyncAdapter::set_cancellation_token`]. Closing is never cancelled.
///
/// # Dropping
///
/// A dropped adapter closes the wrapped channel on a blocking worker. If a call is still outstanding,
/// the channel is closed after the call completes. Outside of Tokio runtime an idle channel is closed
/// in place, while a channel held by an outstanding call can't be reclaimed and is only dropped.
///
/// # Usage
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")] async fn main() {
/// use strata::asnc::prelude::*;
///
/// let mut channel = AsyncAdapter::new(MemoryChannel::from_bytes(b"async".to_vec()));
///
/// let mut content = Vec::new();
/// channel.read_to_end(&mut content).await.unwrap();
/// assert_eq!(content, b"async");
///
/// channel.close().await.unwrap();
/// # }
/// ```
pub struct AsyncAdapter<C: ByteChannel + Send + 'static> {
    slot: Slot<C>,
    cancel: CancellationToken,
    info: ChannelInfo,
    state: Closer,
}

impl<C: ByteChannel + Send + 'static> std::fmt::Debug for AsyncAdapter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = match self.slot {
            Slot::Idle(_) => "idle",
            Slot::Busy(_) => "busy",
            Slot::Lost => "lost",
        };
        f.debug_struct("AsyncAdapter")
            .field("slot", &slot)
            .field("info", &self.info)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<C: ByteChannel + Send + 'static> AsyncAdapter<C> {
    /// Wraps a blocking channel.
    pub fn new(channel: C) -> Self {
        Self::with_cancellation(channel, CancellationToken::new())
    }

    /// Wraps a blocking channel, outstanding operations are cancelled by `cancel`.
    pub fn with_cancellation(channel: C, cancel: CancellationToken) -> Self {
        Self {
            info: channel.info().clone(),
            slot: Slot::Idle(channel),
            cancel,
            state: Closer::new(),
        }
    }

    /// Token that cancels outstanding operations.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Replaces the cancellation token.
    pub fn set_cancellation_token(&mut self, cancel: CancellationToken) {
        self.cancel = cancel;
    }

    /// Returns a read-only view of the close state.
    pub fn closable(&self) -> Closable {
        self.state.to_closable()
    }

    /// Returns `true` while a call (possibly abandoned) is running on a worker.
    pub fn is_busy(&self) -> bool {
        matches!(self.slot, Slot::Busy(_))
    }

    /// Waits for an outstanding call and returns the wrapped channel without closing it.
    pub async fn into_inner(mut self) -> Result<C> {
        self.state.ensure_open()?;
        if let Err(err) = self.join().await {
            log::debug!("[{}] discarded result of an abandoned call: {err}", self.info);
        }
        self.state.close();

        match std::mem::replace(&mut self.slot, Slot::Lost) {
            Slot::Idle(channel) => Ok(channel),
            _ => Err(Self::lost()),
        }
    }

    fn lost() -> Error {
        Error::from(std::io::Error::other("channel was lost by a failed worker"))
    }

    /// Waits for the outstanding call, if any, and returns its result.
    async fn join(&mut self) -> Result<Option<Completion>> {
        let Slot::Busy(handle) = &mut self.slot else {
            return Ok(None);
        };

        match handle.await {
            Ok((channel, result)) => {
                self.slot = Slot::Idle(channel);
                result.map(Some)
            }
            Err(err) => {
                log::error!("[{}] worker failed: {err}", self.info);
                self.slot = Slot::Lost;
                Err(Self::lost())
            }
        }
    }

    /// Waits for the outstanding call unless the operation is cancelled.
    async fn complete(&mut self) -> Result<Option<Completion>> {
        let cancel = self.cancel.clone();
        tokio::select! {
            biased;
            joined = self.join() => joined,
            _ = cancel.cancelled() => {
                log::debug!("[{}] outstanding operation cancelled", self.info);
                Err(Error::Cancelled)
            }
        }
    }

    async fn run(&mut self, call: Call) -> Result<Completion> {
        self.state.ensure_open()?;
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if self.is_busy() {
            match self.complete().await {
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(err) => {
                    log::debug!("[{}] discarded result of an abandoned call: {err}", self.info)
                }
                Ok(_) => log::trace!("[{}] discarded result of an abandoned call", self.info),
            }
        }

        let Slot::Idle(mut channel) = std::mem::replace(&mut self.slot, Slot::Lost) else {
            return Err(Self::lost());
        };
        self.slot = Slot::Busy(tokio::task::spawn_blocking(move || {
            let result = call.apply(&mut channel);
            (channel, result)
        }));

        self.complete().await?.ok_or_else(Self::lost)
    }

    fn unexpected(completion: Completion) -> Error {
        let name = match completion {
            Completion::Read(..) => "read",
            Completion::Written(_) => "write",
            Completion::Done => "flush or close",
        };
        Error::from(std::io::Error::other(format!(
            "worker returned a result of unexpected {name} call"
        )))
    }
}

#[async_trait]
impl<C: ByteChannel + Send + 'static> AsyncByteChannel for AsyncAdapter<C> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        self.state.ensure_open()?;
        if buf.is_empty() {
            return Ok(ReadOutcome::Data(0));
        }

        match self.run(Call::Read(buf.len())).await? {
            Completion::Read(data, outcome) => {
                buf[..data.len()].copy_from_slice(&data);
                Ok(outcome)
            }
            completion => Err(Self::unexpected(completion)),
        }
    }

    async fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match self.run(Call::Write(buf.to_vec())).await? {
            Completion::Written(n) => Ok(n),
            completion => Err(Self::unexpected(completion)),
        }
    }

    async fn flush(&mut self) -> Result<()> {
        match self.run(Call::Flush).await? {
            Completion::Done => Ok(()),
            completion => Err(Self::unexpected(completion)),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if !self.state.close() {
            return Ok(());
        }

        if let Err(err) = self.join().await {
            log::debug!("[{}] discarded result of an abandoned call: {err}", self.info);
        }

        let Slot::Idle(mut channel) = std::mem::replace(&mut self.slot, Slot::Lost) else {
            return Ok(());
        };
        self.slot = Slot::Busy(tokio::task::spawn_blocking(move || {
            let result = Call::Close.apply(&mut channel);
            (channel, result)
        }));

        let closed = self.join().await.map(|_| ());
        log::debug!("[{}] async adapter closed", self.info);
        closed
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    fn info(&self) -> &ChannelInfo {
        &self.info
    }
}

impl<C: ByteChannel + Send + 'static> Drop for AsyncAdapter<C> {
    fn drop(&mut self) {
        if !self.state.close() {
            return;
        }

        let info = self.info.clone();
        match std::mem::replace(&mut self.slot, Slot::Lost) {
            Slot::Idle(channel) => match Handle::try_current() {
                Ok(handle) => {
                    handle.spawn_blocking(move || close_on_drop(channel, &info));
                }
                Err(_) => close_on_drop(channel, &info),
            },
            Slot::Busy(call) => match Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        match call.await {
                            Ok((channel, _)) => {
                                let closed = tokio::task::spawn_blocking(move || {
                                    close_on_drop(channel, &info)
                                });
                                if let Err(err) = closed.await {
                                    log::error!("close worker failed: {err}");
                                }
                            }
                            Err(err) => log::error!("[{info}] worker failed: {err}"),
                        }
                    });
                }
                Err(_) => log::warn!(
                    "[{info}] dropped outside of runtime during an outstanding call, channel is not closed"
                ),
            },
            Slot::Lost => {}
        }
    }
}

/// Closes a channel released by a dropped adapter.
fn close_on_drop<C: ByteChannel>(mut channel: C, info: &ChannelInfo) {
    if let Err(err) = channel.close() {
        log::warn!("[{info}] error while closing on drop: {err:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::ProbeChannel;
    use crate::sync::{BufferedChannel, MemoryChannel};
    use std::io::SeekFrom;
    use std::time::Duration;

    /// Channel with slow reads.
    struct SlowChannel {
        inner: ProbeChannel,
        delay: Duration,
    }

    impl ByteChannel for SlowChannel {
        fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
            std::thread::sleep(self.delay);
            self.inner.read(buf)
        }

        fn write(&mut self, buf: &[u8]) -> Result<usize> {
            self.inner.write(buf)
        }

        fn flush(&mut self) -> Result<()> {
            self.inner.flush()
        }

        fn close(&mut self) -> Result<()> {
            self.inner.close()
        }

        fn is_closed(&self) -> bool {
            self.inner.is_closed()
        }

        fn info(&self) -> &ChannelInfo {
            self.inner.info()
        }
    }

    #[tokio::test]
    async fn adapter_round_trip() {
        let mut channel = AsyncAdapter::new(BufferedChannel::new(MemoryChannel::new()));
        channel.write_all(b"suspended").await.unwrap();
        channel.flush().await.unwrap();

        let mut memory = channel.into_inner().await.unwrap().into_inner().unwrap();
        crate::sync::Seekable::seek(&mut memory, SeekFrom::Start(0)).unwrap();

        let mut channel = AsyncAdapter::new(memory);
        let mut content = Vec::new();
        channel.read_to_end(&mut content).await.unwrap();
        assert_eq!(content, b"suspended");
    }

    #[tokio::test]
    async fn zero_sized_read_does_not_reach_inner() {
        let inner = ProbeChannel::with_input(b"data".to_vec());
        let probe = inner.probe();
        let mut channel = AsyncAdapter::new(inner);

        assert_eq!(
            channel.read(&mut []).await.unwrap(),
            ReadOutcome::Data(0)
        );
        assert_eq!(probe.reads(), 0);
    }

    #[tokio::test]
    async fn cancelled_read_discards_result() {
        let cancel = CancellationToken::new();
        let inner = SlowChannel {
            inner: ProbeChannel::with_input(b"abcdef".to_vec()),
            delay: Duration::from_millis(200),
        };
        let mut channel = AsyncAdapter::with_cancellation(inner, cancel.clone());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let mut buf = [0u8; 3];
        let err = channel.read(&mut buf).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert!(channel.is_busy());

        let err = channel.read(&mut buf).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));

        channel.set_cancellation_token(CancellationToken::new());
        channel.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"def");
        assert!(!channel.is_busy());
    }

    #[tokio::test]
    async fn close_is_idempotent_and_reaches_inner() {
        let inner = ProbeChannel::new();
        let probe = inner.probe();
        let mut channel = AsyncAdapter::new(inner);
        let closable = channel.closable();

        channel.write_all(b"bytes").await.unwrap();
        channel.close().await.unwrap();
        channel.close().await.unwrap();

        assert!(closable.is_closed());
        assert_eq!(probe.closes(), 1);
        assert_eq!(probe.written(), b"bytes");
        assert!(matches!(channel.write(b"late").await, Err(Error::Closed)));
    }

    #[test]
    fn drop_outside_runtime_closes_inner() {
        let inner = ProbeChannel::new();
        let probe = inner.probe();

        drop(AsyncAdapter::new(inner));

        assert_eq!(probe.closes(), 1);
    }

    async fn wait_for_closes(probe: &crate::sync::testing::Probe, expected: usize) {
        for _ in 0..100 {
            if probe.closes() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("channel was not closed, closes: {}", probe.closes());
    }

    #[tokio::test]
    async fn drop_inside_runtime_closes_inner() {
        let inner = ProbeChannel::new();
        let probe = inner.probe();

        drop(AsyncAdapter::new(inner));

        wait_for_closes(&probe, 1).await;
    }

    #[tokio::test]
    async fn drop_during_abandoned_call_closes_inner() {
        let cancel = CancellationToken::new();
        let inner = ProbeChannel::with_input(b"abcdef".to_vec());
        let probe = inner.probe();
        let mut channel = AsyncAdapter::with_cancellation(
            SlowChannel {
                inner,
                delay: Duration::from_millis(100),
            },
            cancel.clone(),
        );

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let err = channel.read(&mut [0u8; 3]).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert!(channel.is_busy());

        drop(channel);
        assert_eq!(probe.closes(), 0);

        wait_for_closes(&probe, 1).await;
    }
}
