//! # Common imports for suspending API

pub use crate::sync::prelude::*;

pub use crate::asnc::{AsyncAdapter, AsyncByteChannel, TimeoutChannel, TokioChannel};
