//! # Default settings

/// Default block size of a buffered channel.
pub const DEFAULT_BLOCK_SIZE: usize = 8192;

/// Default amount of bytes a text channel requests from its inner channel per read.
pub const DEFAULT_TEXT_CHUNK_SIZE: usize = 4096;

/// Default amount of compressed bytes a decompressor requests from its inner channel per read.
pub const DEFAULT_COMPRESSION_CHUNK_SIZE: usize = 8192;

/// Default compression level.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Maximum compression level.
pub const MAX_COMPRESSION_LEVEL: u32 = 9;
