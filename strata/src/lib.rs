//! # Strata
//!
//! Composable byte channels written in Rust. Strata provides a uniform read / write / close
//! contract for byte sources and sinks, and decorators that each add one capability on top of it:
//!
//! * buffering ([`BufferedChannel`](sync::BufferedChannel)),
//! * text decoding and encoding ([`TextChannel`](sync::TextChannel)),
//! * zlib, gzip, and raw deflate compression ([`CompressionChannel`](sync::CompressionChannel)),
//! * suspending access from async code ([`AsyncAdapter`](asnc::AsyncAdapter)).
//!
//! Callers construct the innermost channel (memory, file, socket), wrap zero or more decorators
//! around it, and use the outermost channel. Closing a decorator closes the whole chain exactly
//! once.
//!
//! ```rust
//! # #[cfg(feature = "sync")] {
//! use strata::sync::prelude::*;
//!
//! let mut writer = TextChannel::new(BufferedChannel::new(MemoryChannel::new()));
//! writer.write_text("Hello, World!").unwrap();
//! let bytes = writer.into_inner().unwrap().into_inner().unwrap().into_bytes();
//!
//! let mut reader = TextChannel::new(BufferedChannel::new(MemoryChannel::from_bytes(bytes)));
//! assert_eq!(reader.read_all().unwrap(), "Hello, World!");
//! # }
//! ```
//!
//! Check the [playbook](crate::docs) for a detailed walk through.
//!
//! # Features
#![doc = document_features::document_features!()]
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod core;
pub mod docs;
pub mod errors;
pub mod prelude;

#[cfg(feature = "sync")]
pub mod sync;

#[cfg(feature = "async")]
pub mod asnc;
