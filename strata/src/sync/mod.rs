//! # Strata blocking API
//!
//! Blocking API is built around the [`ByteChannel`] trait. Leaf channels talk to a backend:
//!
//! * Memory: [`MemoryChannel`]
//! * File: [`FileChannel`] (opened according to [`OpenMode`](crate::core::io::OpenMode))
//! * TCP: [`TcpChannel`]
//!
//! Decorators wrap exactly one inner channel and own it. Each decorator is a [`ByteChannel`] itself,
//! so chains compose to arbitrary depth:
//!
//! * [`BufferedChannel`] turns small reads and writes into block-sized transfers.
//! * [`TextChannel`] translates between text and bytes of a particular
//!   [`Encoding`](crate::core::io::Encoding).
//! * [`CompressionChannel`] compresses on write or decompresses on read.
//!
//! Closing a decorator closes the whole chain exactly once. Every channel is also closed when
//! dropped, and [`using`] provides scoped access with explicit error reporting.
//!
//! Random access is a separate capability: [`Seekable`] is implemented by memory and file channels,
//! and by buffered channels over them.
//!
//! ## Interoperability
//!
//! [`IoAdapter`] exposes any channel as [`std::io::Read`] and [`std::io::Write`].

mod buffered;
mod channel;
pub mod compression;
mod file;
mod io_bridge;
mod memory;
pub mod prelude;
mod scope;
mod tcp;
mod text;

#[cfg(any(test, feature = "test_utils"))]
pub mod testing;

pub use buffered::BufferedChannel;
pub use channel::{ByteChannel, Seekable};
#[doc(inline)]
pub use compression::CompressionChannel;
pub use file::FileChannel;
pub use io_bridge::IoAdapter;
pub use memory::MemoryChannel;
pub use scope::using;
pub use tcp::TcpChannel;
pub use text::{Lines, TextChannel};
