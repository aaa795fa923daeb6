/*!
# 📖 1.3. Asynchronous API

<em>[← Layering](crate::docs::a2__layering) | [Testing →](crate::docs::e1__testing)</em>

Suspending API is built around [`AsyncByteChannel`](crate::asnc::AsyncByteChannel). It is
available with `async` feature flag (enabled by default) and requires
[Tokio](https://tokio.rs) runtime.

## Adapter

Any blocking chain becomes a suspending channel when wrapped in
[`AsyncAdapter`](crate::asnc::AsyncAdapter). Blocking calls are executed by Tokio blocking workers:

```rust
use strata::asnc::prelude::*;
# #[tokio::main(flavor = "current_thread")]
# async fn main() -> Result<()> {

let chain = BufferedChannel::new(MemoryChannel::from_bytes(b"from a blocking chain".to_vec()));
let mut channel = AsyncAdapter::new(chain);

let mut content = Vec::new();
channel.read_to_end(&mut content).await?;
channel.close().await?;

assert_eq!(content, b"from a blocking chain");
# Ok(()) }
```

## Cancellation

Outstanding operations are cancelled by a
[`CancellationToken`](tokio_util::sync::CancellationToken). A blocking call can't be interrupted,
so the adapter returns [`Error::Cancelled`](crate::errors::Error::Cancelled) right away and
discards the result of the call once it completes. Native channels
([`TokioChannel`](crate::asnc::TokioChannel)) abort the operation itself.

```rust
use tokio_util::sync::CancellationToken;
use strata::asnc::prelude::*;
# #[tokio::main(flavor = "current_thread")]
# async fn main() {

let cancel = CancellationToken::new();
let (_client, server) = tokio::io::duplex(64);
let mut server = TokioChannel::new(server, ChannelInfo::custom("server"))
    .with_cancellation(cancel.clone());

cancel.cancel();
assert!(matches!(server.read(&mut [0u8; 8]).await, Err(Error::Cancelled)));
# }
```

## Timeouts

Time limits are a separate decorator, [`TimeoutChannel`](crate::asnc::TimeoutChannel). An operation
that takes too long fails with an I/O error of
[`TimedOut`](std::io::ErrorKind::TimedOut) kind.

<em>[← Layering](crate::docs::a2__layering) | [Testing →](crate::docs::e1__testing)</em>
 */
