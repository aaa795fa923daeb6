//! # Close state of channels
//!
//! Every channel owns a [`Closer`]. The closer flips to the closed state exactly once, either by
//! [`Closer::close`] or when it goes out of scope. Observers that must not own the channel (for
//! example, workers executing blocking calls on behalf of an async adapter) receive a read-only
//! [`Closable`] view of the same state.

use std::sync::atomic::AtomicBool;
use std::sync::{atomic, Arc};

use crate::prelude::*;

/// Close state owned by a channel.
///
/// [`Closer`] is intentionally not [`Clone`]: a channel has exactly one owner. Read-only access to
/// the state is provided by [`Closable`] which can be obtained by [`Closer::to_closable`].
///
/// # Usage
///
/// ```rust
/// use strata::core::utils::Closer;
///
/// let mut closer = Closer::new();
/// let closable = closer.to_closable();
///
/// assert!(closer.close());
/// assert!(!closer.close());
///
/// assert!(closable.is_closed());
/// ```
#[derive(Debug)]
#[must_use]
pub struct Closer(Arc<AtomicBool>);

impl Closer {
    /// Creates an open close state.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Returns an instance of [`Closable`], a read-only accessor to the internal state.
    pub fn to_closable(&self) -> Closable {
        Closable(self.0.clone())
    }

    /// Closes the state.
    ///
    /// Returns `true` only for the call that performed the transition. Channels use this to run
    /// their release logic exactly once.
    pub fn close(&mut self) -> bool {
        !self.0.swap(true, atomic::Ordering::AcqRel)
    }

    /// Returns `true` if closed.
    pub fn is_closed(&self) -> bool {
        self.0.load(atomic::Ordering::Acquire)
    }

    /// Returns [`Error::Closed`] if closed.
    pub fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        Ok(())
    }
}

impl Default for Closer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Closer {
    fn drop(&mut self) {
        self.close();
    }
}

/// Read-only access to a close state.
///
/// [`Closable`] can be obtained by [`Closer::to_closable`]. It becomes closed when the closer is
/// closed or dropped.
#[derive(Clone, Debug)]
#[must_use]
pub struct Closable(Arc<AtomicBool>);

impl Closable {
    /// Returns `true` if closed.
    pub fn is_closed(&self) -> bool {
        self.0.load(atomic::Ordering::Acquire)
    }
}
