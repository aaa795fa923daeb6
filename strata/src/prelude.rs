//! # Basic imports

pub use crate::errors::{EncodingError, Error, Result};

pub use crate::core::io::{
    Algorithm, ChannelInfo, CompressionOptions, Direction, Encoding, Level, LineEnding, OpenMode,
    ReadOutcome, TextOptions,
};
