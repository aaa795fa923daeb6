//! # Common imports for blocking API

pub use crate::prelude::*;

pub use crate::sync::{
    BufferedChannel, ByteChannel, CompressionChannel, FileChannel, IoAdapter, MemoryChannel,
    Seekable, TcpChannel, TextChannel,
};
