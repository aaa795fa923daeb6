use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::core::io::OpenMode;

/// <sup>[`serde`](https://serde.rs)</sup>
/// Describes the backend at the bottom of a channel chain.
///
/// Decorators report the information of the channel they wrap, so the outermost channel of a chain
/// always describes where the bytes actually go.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelInfo {
    /// In-memory buffer.
    Memory,
    /// Local file.
    File {
        /// File path.
        path: PathBuf,
        /// Mode the file was opened with.
        mode: OpenMode,
    },
    /// TCP stream.
    Tcp {
        /// Address of the remote peer.
        peer_addr: SocketAddr,
    },
    /// Custom backend.
    Custom {
        /// Name of the custom backend.
        name: String,
    },
}

impl ChannelInfo {
    /// Creates info for a custom backend.
    pub fn custom(name: impl Into<String>) -> Self {
        ChannelInfo::Custom { name: name.into() }
    }

    /// Returns `true` for backends that support random access.
    pub fn is_random_access(&self) -> bool {
        matches!(self, ChannelInfo::Memory | ChannelInfo::File { .. })
    }
}

impl Display for ChannelInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelInfo::Memory => write!(f, "memory"),
            ChannelInfo::File { path, mode } => write!(f, "file:{} ({mode:?})", path.display()),
            ChannelInfo::Tcp { peer_addr } => write!(f, "tcp:{peer_addr}"),
            ChannelInfo::Custom { name } => write!(f, "custom:{name}"),
        }
    }
}
