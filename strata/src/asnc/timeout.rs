use std::future::Future;
use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;

use crate::asnc::AsyncByteChannel;

use crate::prelude::*;

/// <sup>[`async`](crate::asnc)</sup>
/// Decorator that limits the duration of every read, write, and flush.
///
/// An operation that does not complete in time is dropped and fails with [`Error::Io`] of
/// [`ErrorKind::TimedOut`] kind. Closing is not limited.
///
/// # Usage
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")] async fn main() {
/// use std::time::Duration;
/// use strata::asnc::prelude::*;
///
/// let (_client, server) = tokio::io::duplex(64);
/// let server = TokioChannel::new(server, ChannelInfo::custom("server"));
/// let mut server = TimeoutChannel::new(server, Duration::from_millis(10));
///
/// let err = server.read(&mut [0u8; 4]).await.unwrap_err();
/// assert_eq!(err.io_kind(), Some(std::io::ErrorKind::TimedOut));
/// # }
/// ```
#[derive(Debug)]
pub struct TimeoutChannel<C: AsyncByteChannel> {
    inner: C,
    timeout: Duration,
}

impl<C: AsyncByteChannel> TimeoutChannel<C> {
    /// Wraps a channel, operations are limited by `timeout`.
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Operation time limit.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Changes operation time limit.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Returns the wrapped channel.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

async fn limit<T>(
    timeout: Duration,
    operation: &'static str,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(Error::from(std::io::Error::new(
            ErrorKind::TimedOut,
            format!("{operation} timed out after {timeout:?}"),
        ))),
    }
}

#[async_trait]
impl<C: AsyncByteChannel> AsyncByteChannel for TimeoutChannel<C> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        limit(self.timeout, "read", self.inner.read(buf)).await
    }

    async fn write(&mut self, buf: &[u8]) -> Result<usize> {
        limit(self.timeout, "write", self.inner.write(buf)).await
    }

    async fn flush(&mut self) -> Result<()> {
        limit(self.timeout, "flush", self.inner.flush()).await
    }

    async fn close(&mut self) -> Result<()> {
        self.inner.close().await
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    fn info(&self) -> &ChannelInfo {
        self.inner.info()
    }
}
