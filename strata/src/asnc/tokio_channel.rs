use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::sync::CancellationToken;

use crate::asnc::AsyncByteChannel;
use crate::core::utils::Closer;

use crate::prelude::*;

/// <sup>[`async`](crate::asnc)</sup>
/// Byte channel over a native Tokio stream.
///
/// Works with anything that implements [`AsyncRead`] and [`AsyncWrite`]: files, TCP streams,
/// in-memory [`duplex`](tokio::io::duplex) pipes. Operations are cancelled by dropping them, so
/// cancelling the [`CancellationToken`] aborts an outstanding operation directly and returns
/// [`Error::Cancelled`].
///
/// # Usage
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")] async fn main() {
/// use strata::asnc::prelude::*;
///
/// let (client, server) = tokio::io::duplex(64);
/// let mut client = TokioChannel::new(client, ChannelInfo::custom("client"));
/// let mut server = TokioChannel::new(server, ChannelInfo::custom("server"));
///
/// client.write_all(b"ping").await.unwrap();
/// client.close().await.unwrap();
///
/// let mut received = Vec::new();
/// server.read_to_end(&mut received).await.unwrap();
/// assert_eq!(received, b"ping");
/// # }
/// ```
#[derive(Debug)]
pub struct TokioChannel<S: AsyncRead + AsyncWrite + Unpin + Send> {
    stream: S,
    cancel: CancellationToken,
    info: ChannelInfo,
    state: Closer,
}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> TokioChannel<S> {
    /// Wraps a stream described by `info`.
    pub fn new(stream: S, info: ChannelInfo) -> Self {
        Self {
            stream,
            cancel: CancellationToken::new(),
            info,
            state: Closer::new(),
        }
    }

    /// Sets the token that cancels outstanding operations.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels outstanding operations.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns the wrapped stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    fn check(&self) -> Result<()> {
        self.state.ensure_open()?;
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

impl TokioChannel<File> {
    /// Opens a file according to [`OpenMode`].
    pub async fn open(path: impl Into<PathBuf>, mode: OpenMode) -> Result<Self> {
        let path: PathBuf = path.into();
        mode.validate(path.as_path())?;

        let file = OpenOptions::from(mode.to_options())
            .open(path.as_path())
            .await?;
        let info = ChannelInfo::File { path, mode };
        log::debug!("[{info}] opened");

        Ok(Self::new(file, info))
    }
}

impl TokioChannel<TcpStream> {
    /// Connects to a remote address.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let channel = Self::from_stream(stream)?;
        log::debug!("[{}] connected", channel.info);
        Ok(channel)
    }

    /// Wraps an already connected stream.
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        let peer_addr = stream.peer_addr()?;
        Ok(Self::new(stream, ChannelInfo::Tcp { peer_addr }))
    }
}

#[async_trait]
impl<S: AsyncRead + AsyncWrite + Unpin + Send> AsyncByteChannel for TokioChannel<S> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        self.check()?;
        if buf.is_empty() {
            return Ok(ReadOutcome::Data(0));
        }

        let cancel = self.cancel.clone();
        let n = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            read = self.stream.read(buf) => read?,
        };

        Ok(match n {
            0 => ReadOutcome::EndOfStream,
            n => ReadOutcome::Data(n),
        })
    }

    async fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.check()?;

        let cancel = self.cancel.clone();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            written = self.stream.write(buf) => Ok(written?),
        }
    }

    async fn flush(&mut self) -> Result<()> {
        self.check()?;

        let cancel = self.cancel.clone();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            flushed = self.stream.flush() => Ok(flushed?),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if !self.state.close() {
            return Ok(());
        }

        let result = match self.stream.shutdown().await {
            Err(err) if err.kind() == ErrorKind::NotConnected => Ok(()),
            result => result.map_err(Error::from),
        };
        log::debug!("[{}] closed", self.info);

        result
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
    use std::time::Duration;

    #[tokio::test]
    async fn duplex_round_trip() {
        let (client, server) = tokio::io::duplex(8);
        let mut client = TokioChannel::new(client, ChannelInfo::custom("client"));
        let mut server = TokioChannel::new(server, ChannelInfo::custom("server"));

        let writer = tokio::spawn(async move {
            client.write_all(b"longer than the pipe").await.unwrap();
            client.close().await.unwrap();
            client
        });

        let mut received = Vec::new();
        server.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"longer than the pipe");

        let client = writer.await.unwrap();
        assert!(client.is_closed());
    }

    #[tokio::test]
    async fn cancellation_aborts_pending_read() {
        let cancel = CancellationToken::new();
        let (_client, server) = tokio::io::duplex(8);
        let mut server =
            TokioChannel::new(server, ChannelInfo::custom("server")).with_cancellation(cancel.clone());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let err = server.read(&mut [0u8; 4]).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn file_round_trip() {
        let path = std::env::temp_dir().join("strata_tokio_file_round_trip.bin");

        let mut writer = TokioChannel::open(path.as_path(), OpenMode::Create)
            .await
            .unwrap();
        writer.write_all(b"tokio file").await.unwrap();
        writer.close().await.unwrap();

        let mut reader = TokioChannel::open(path.as_path(), OpenMode::Open)
            .await
            .unwrap();
        let mut content = Vec::new();
        reader.read_to_end(&mut content).await.unwrap();
        assert_eq!(content, b"tokio file");
        assert!(matches!(reader.info(), ChannelInfo::File { .. }));

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let path = std::env::temp_dir().join("strata_tokio_file_missing.bin");
        let err = TokioChannel::open(path, OpenMode::Open).await.unwrap_err();
        assert_eq!(err.io_kind(), Some(ErrorKind::NotFound));
    }
}
