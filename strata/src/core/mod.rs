//! # API-independent abstractions
//!
//! Types shared by the blocking ([`sync`](crate::sync)) and suspending ([`asnc`](crate::asnc))
//! channel families: backend descriptions, read outcomes, text and compression settings, and close
//! state tracking.

pub mod consts;
pub mod io;
pub mod utils;
