//! # Strata suspending API
//!
//! Suspending API is built around the [`AsyncByteChannel`] trait and requires Tokio runtime.
//!
//! * [`AsyncAdapter`] exposes any blocking [`ByteChannel`](crate::sync::ByteChannel), including a
//!   whole chain of decorators, as a suspending channel. Blocking calls run on Tokio blocking
//!   workers.
//! * [`TokioChannel`] is a native suspending channel over Tokio files, sockets, and pipes.
//! * [`TimeoutChannel`] limits the duration of operations of any suspending channel.
//!
//! Outstanding operations of [`AsyncAdapter`] and [`TokioChannel`] can be cancelled with a
//! [`CancellationToken`](tokio_util::sync::CancellationToken), in which case they fail with
//! [`Error::Cancelled`](crate::errors::Error::Cancelled).

mod adapter;
mod channel;
pub mod prelude;
mod timeout;
mod tokio_channel;

pub use adapter::AsyncAdapter;
pub use channel::AsyncByteChannel;
pub use timeout::TimeoutChannel;
pub use tokio_channel::TokioChannel;
