use crate::sync::ByteChannel;

use crate::prelude::*;

/// <sup>[`sync`](crate::sync)</sup>
/// Runs `f` with a channel and closes the channel afterward.
///
/// The channel is closed whether `f` succeeds or not. If both `f` and closing fail, the error
/// returned by `f` is reported and the close error is logged.
///
/// # Usage
///
/// ```rust
/// use strata::sync::prelude::*;
/// use strata::sync::using;
///
/// let text = using(
///     TextChannel::new(MemoryChannel::from_bytes(b"scoped".to_vec())),
///     |channel| channel.read_all(),
/// )
/// .unwrap();
///
/// assert_eq!(text, "scoped");
/// ```
pub fn using<C, T, F>(mut channel: C, f: F) -> Result<T>
where
    C: ByteChannel,
    F: FnOnce(&mut C) -> Result<T>,
{
    let result = f(&mut channel);
    let closed = channel.close();

    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            log::warn!("[{}] error while closing: {close_err:?}", channel.info());
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::ProbeChannel;
    use crate::sync::BufferedChannel;

    #[test]
    fn channel_is_closed_on_success() {
        let inner = ProbeChannel::new();
        let probe = inner.probe();

        let written = using(BufferedChannel::new(inner), |channel| {
            channel.write_all(b"scoped")?;
            Ok(6)
        })
        .unwrap();

        assert_eq!(written, 6);
        assert_eq!(probe.written(), b"scoped");
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn channel_is_closed_on_failure() {
        let inner = ProbeChannel::new();
        let probe = inner.probe();

        let result: Result<()> = using(inner, |_| Err(Error::InvalidOperation("failed")));

        assert!(matches!(result, Err(Error::InvalidOperation("failed"))));
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn close_error_is_reported() {
        let inner = ProbeChannel::new().fail_on_write();
        let probe = inner.probe();

        let result = using(BufferedChannel::new(inner), |channel| {
            channel.write_all(b"pending")
        });

        assert_eq!(
            result.unwrap_err().io_kind(),
            Some(std::io::ErrorKind::BrokenPipe)
        );
        assert_eq!(probe.closes(), 1);
    }

    #[test]
    fn closure_error_takes_precedence() {
        let inner = ProbeChannel::new().fail_on_write();

        let result = using(BufferedChannel::new(inner), |channel| {
            channel.write_all(b"pending")?;
            Err::<(), _>(Error::Cancelled)
        });

        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
