use std::fmt::{Display, Formatter};

use crate::core::consts::{
    DEFAULT_COMPRESSION_CHUNK_SIZE, DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL,
};

/// <sup>[`serde`](https://serde.rs)</sup>
/// Deflate-family framing.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Zlib framing ([RFC 1950](https://www.rfc-editor.org/rfc/rfc1950)) with Adler-32 checksum
    /// (default value).
    #[default]
    Zlib,
    /// Gzip framing ([RFC 1952](https://www.rfc-editor.org/rfc/rfc1952)) with CRC-32 checksum and
    /// size trailer.
    Gzip,
    /// Raw deflate stream ([RFC 1951](https://www.rfc-editor.org/rfc/rfc1951)) without framing.
    Deflate,
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Zlib => f.write_str("zlib"),
            Algorithm::Gzip => f.write_str("gzip"),
            Algorithm::Deflate => f.write_str("deflate"),
        }
    }
}

/// Direction of a compression channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Bytes written to the channel are compressed.
    Compress,
    /// Bytes read from the channel are decompressed.
    Decompress,
}

/// <sup>[`serde`](https://serde.rs)</sup>
/// Compression level from `0` (store only) to `9` (best compression).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u32);

impl Level {
    /// Creates a level, values above `9` are lowered to `9`.
    pub fn new(level: u32) -> Self {
        Self(level.min(MAX_COMPRESSION_LEVEL))
    }

    /// No compression, deflate "stored" blocks only.
    pub fn none() -> Self {
        Self(0)
    }

    /// Fastest compression.
    pub fn fast() -> Self {
        Self(1)
    }

    /// Best compression.
    pub fn best() -> Self {
        Self(MAX_COMPRESSION_LEVEL)
    }

    /// Numeric value.
    pub fn level(&self) -> u32 {
        self.0
    }
}

impl Default for Level {
    fn default() -> Self {
        Self(DEFAULT_COMPRESSION_LEVEL)
    }
}

/// <sup>[`serde`](https://serde.rs)</sup>
/// Compression channel settings.
///
/// # Usage
///
/// ```rust
/// use strata::core::io::{Algorithm, CompressionOptions, Level};
///
/// let options = CompressionOptions::new()
///     .algorithm(Algorithm::Gzip)
///     .level(Level::best());
///
/// assert_eq!(options.level.level(), 9);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompressionOptions {
    /// Framing.
    pub algorithm: Algorithm,
    /// Compression level, ignored by decompressors.
    pub level: Level,
    /// Amount of compressed bytes requested from the inner channel per read.
    pub chunk_size: usize,
}

impl CompressionOptions {
    /// Creates default options: zlib framing, level `6`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets framing.
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets compression level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets read chunk size, values below one byte are raised to one.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            level: Level::default(),
            chunk_size: DEFAULT_COMPRESSION_CHUNK_SIZE,
        }
    }
}

impl From<Algorithm> for CompressionOptions {
    fn from(value: Algorithm) -> Self {
        Self::default().algorithm(value)
    }
}
