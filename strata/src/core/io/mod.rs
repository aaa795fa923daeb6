//! # Core I/O abstractions
//!
//! This module contains abstractions common to all API modes.
//!
//! ## API modes
//!
//! Blocking API lives in [`sync`](crate::sync) module, and marked with
//! <sup>[`sync`](crate::sync)</sup>.
//!
//! Suspending API is based on [Tokio](https://crates.io/crates/tokio) runtime, lives in
//! [`asnc`](crate::asnc) module, and marked with <sup>[`async`](crate::asnc)</sup>.

mod channel_info;
mod compression;
mod encoding;
mod open_mode;
mod outcome;

pub use channel_info::ChannelInfo;
pub use compression::{Algorithm, CompressionOptions, Direction, Level};
pub use encoding::{Decoder, Encoding, LineEnding, TextOptions};
pub use open_mode::OpenMode;
pub use outcome::ReadOutcome;
