//! # Strata errors
//!
//! All fallible operations return [`Result`] with a single [`Error`] type. The taxonomy is shared
//! by blocking and suspending channels, so decorators propagate inner errors unchanged.

use std::io::ErrorKind;

use crate::core::io::Encoding;

/// Common result type returned by all Strata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Strata error.
///
/// Any error returned from a read or write is terminal for the channel that returned it. The only
/// exception is [`Error::InvalidOperation`], which signals misuse and leaves the channel intact.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Operation on a channel that has been closed.
    #[error("channel is closed")]
    Closed,
    /// Backend fault: disk full, connection reset, and similar I/O errors.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed or truncated compressed input.
    #[error("corrupt compressed data: {0}")]
    CorruptData(String),
    /// Bytes are invalid for the configured encoding, or text can't be represented in it.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// Asynchronous operation was cancelled while outstanding.
    #[error("operation cancelled")]
    Cancelled,
    /// Operation is not supported by the channel in its current configuration.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
}

impl Error {
    /// Returns `true` if the channel that produced this error must be discarded.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Error::InvalidOperation(_))
    }

    /// Returns [`ErrorKind`] of the underlying I/O error if this is an [`Error::Io`].
    pub fn io_kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Io(err) => Some(err.kind()),
            _ => None,
        }
    }
}

impl From<Error> for std::io::Error {
    fn from(value: Error) -> Self {
        match value {
            Error::Io(err) => err,
            Error::Closed => std::io::Error::new(ErrorKind::NotConnected, Error::Closed),
            err @ (Error::CorruptData(_) | Error::Encoding(_)) => {
                std::io::Error::new(ErrorKind::InvalidData, err)
            }
            err @ Error::InvalidOperation(_) => std::io::Error::new(ErrorKind::Unsupported, err),
            Error::Cancelled => std::io::Error::other(Error::Cancelled),
        }
    }
}

/// Text can't be decoded from, or encoded to, the configured [`Encoding`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid {encoding} data at offset {offset}: {reason}")]
pub struct EncodingError {
    /// Encoding in use.
    pub encoding: Encoding,
    /// Byte offset in the stream (decoding) or in the text being written (encoding).
    pub offset: u64,
    /// What went wrong.
    pub reason: String,
}

impl EncodingError {
    pub(crate) fn new(encoding: Encoding, offset: u64, reason: impl Into<String>) -> Self {
        Self {
            encoding,
            offset,
            reason: reason.into(),
        }
    }
}
