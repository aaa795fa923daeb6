use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use crate::core::utils::net::resolve_socket_addr;
use crate::core::utils::Closer;
use crate::sync::ByteChannel;

use crate::prelude::*;

/// <sup>[`sync`](crate::sync)</sup>
/// Byte channel over a TCP stream.
///
/// TCP channels are never [`Seekable`](super::Seekable). A read returns
/// [`ReadOutcome::EndOfStream`] once the peer has shut down its writing half.
///
/// # Usage
///
/// ```rust,no_run
/// use strata::sync::prelude::*;
///
/// let mut channel = TcpChannel::connect("127.0.0.1:5600").unwrap();
/// channel.write_all(b"ping").unwrap();
///
/// let mut reply = [0u8; 4];
/// channel.read_exact(&mut reply).unwrap();
/// ```
#[derive(Debug)]
pub struct TcpChannel {
    stream: TcpStream,
    info: ChannelInfo,
    state: Closer,
}

impl TcpChannel {
    /// Connects to a remote address.
    ///
    /// When the address resolves to several socket addresses, IPv4 ones are preferred.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let addr = resolve_socket_addr(addr)?;
        let stream = TcpStream::connect(addr)?;
        log::debug!("[tcp:{addr}] connected");
        Self::from_stream(stream)
    }

    /// Wraps an already connected stream, for example, one accepted by a
    /// [`TcpListener`](std::net::TcpListener).
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        let peer_addr = stream.peer_addr()?;
        Ok(Self {
            stream,
            info: ChannelInfo::Tcp { peer_addr },
            state: Closer::new(),
        })
    }
}

impl ByteChannel for TcpChannel {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        self.state.ensure_open()?;
        if buf.is_empty() {
            return Ok(ReadOutcome::Data(0));
        }

        loop {
            match self.stream.read(buf) {
                Ok(0) => return Ok(ReadOutcome::EndOfStream),
                Ok(n) => return Ok(ReadOutcome::Data(n)),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.state.ensure_open()?;

        loop {
            match self.stream.write(buf) {
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.state.ensure_open()?;
        self.stream.flush().map_err(Error::from)
    }

    fn close(&mut self) -> Result<()> {
        if !self.state.close() {
            return Ok(());
        }

        let flushed = self.stream.flush();
        match self.stream.shutdown(Shutdown::Both) {
            Err(err) if err.kind() != ErrorKind::NotConnected => {
                log::debug!("[{}] shutdown failed: {err:?}", self.info);
            }
            _ => log::debug!("[{}] closed", self.info),
        }

        flushed.map_err(Error::from)
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    fn info(&self) -> &ChannelInfo {
        &self.info
    }
}

impl Drop for TcpChannel {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("[{}] error while closing on drop: {err:?}", self.info);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn tcp_channel_echo() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut channel = TcpChannel::from_stream(stream).unwrap();
            let mut received = Vec::new();
            channel.read_to_end(&mut received).unwrap();
            channel.write_all(&received).unwrap();
            channel.close().unwrap();
        });

        let mut client = TcpChannel::connect(addr).unwrap();
        assert!(matches!(client.info(), ChannelInfo::Tcp { peer_addr } if *peer_addr == addr));
        client.write_all(b"echo").unwrap();
        client.stream.shutdown(Shutdown::Write).unwrap();

        let mut reply = Vec::new();
        client.read_to_end(&mut reply).unwrap();
        assert_eq!(reply, b"echo");

        client.close().unwrap();
        assert!(matches!(client.write(b"late"), Err(Error::Closed)));

        server.join().unwrap();
    }
}
