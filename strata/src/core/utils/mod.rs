//! Common utils.

pub mod closable;
pub(crate) mod net;

#[doc(inline)]
pub use closable::{Closable, Closer};
