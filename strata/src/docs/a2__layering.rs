/*!
# 📖 1.2. Layering

<em>[← Quickstart](crate::docs::a1__quickstart) | [Asynchronous API →](crate::docs::a3__async_api)</em>

## Channels

Every blocking channel implements [`ByteChannel`](crate::sync::ByteChannel):

* `read` places up to `buf.len()` bytes into the buffer and returns
  [`ReadOutcome::Data`](crate::core::io::ReadOutcome::Data), or returns
  [`ReadOutcome::EndOfStream`](crate::core::io::ReadOutcome::EndOfStream) when no more bytes will
  ever come. A partial read is not the end of stream.
* `write` returns the amount of accepted bytes, use `write_all` to write everything.
* `close` is idempotent. Operations on a closed channel fail with
  [`Error::Closed`](crate::errors::Error::Closed).

Random access is a separate capability provided by [`Seekable`](crate::sync::Seekable). Rewinding
a channel is always explicit:

```rust
use strata::sync::prelude::*;

let mut channel = MemoryChannel::new();
channel.write_all(b"written").unwrap();

// The position is at the end of written bytes
assert!(channel.read(&mut [0u8; 4]).unwrap().is_end_of_stream());

channel.rewind().unwrap();
assert_eq!(channel.read(&mut [0u8; 4]).unwrap(), ReadOutcome::Data(4));
```

## Decorators

A decorator owns exactly one inner channel and is a channel itself:

| Decorator                                                  | Capability                                   |
|------------------------------------------------------------|----------------------------------------------|
| [`BufferedChannel`](crate::sync::BufferedChannel)          | block-sized transfers for small reads/writes |
| [`TextChannel`](crate::sync::TextChannel)                  | text encoding, lines                         |
| [`CompressionChannel`](crate::sync::CompressionChannel)    | zlib, gzip, raw deflate                      |

Use `into_inner` (or [`CompressionChannel::finish`](crate::sync::CompressionChannel::finish)) to
complete pending work and get the inner channel back without closing it:

```rust
use strata::sync::prelude::*;

let options = CompressionOptions::from(Algorithm::Zlib);

let mut writer = TextChannel::new(CompressionChannel::compressor(MemoryChannel::new(), options));
writer.write_line("compressed text").unwrap();
let compressed = writer.into_inner().unwrap().finish().unwrap().into_bytes();

let mut reader = TextChannel::new(CompressionChannel::decompressor(
    MemoryChannel::from_bytes(compressed),
    options,
));
assert_eq!(reader.read_line().unwrap().as_deref(), Some("compressed text"));
```

## Scoped Access

Channels are closed when dropped, but errors at that point can only be logged. Use
[`using`](crate::sync::using) to get close errors reported:

```rust
use strata::sync::prelude::*;
use strata::sync::using;

let content = using(MemoryChannel::from_bytes(b"scoped".to_vec()), |channel| {
    let mut content = Vec::new();
    channel.read_to_end(&mut content)?;
    Ok(content)
})
.unwrap();

assert_eq!(content, b"scoped");
```

## Errors

All operations return [`Result`](crate::errors::Result) with a single
[`Error`](crate::errors::Error) type. Any error from a read or a write is terminal for the channel,
except [`Error::InvalidOperation`](crate::errors::Error::InvalidOperation) which reports misuse.
A decompressor that met corrupt input returns
[`Error::CorruptData`](crate::errors::Error::CorruptData) on every subsequent call.

If flushing fails during close, the underlying resources are released anyway and the flush error is
returned.

<em>[← Quickstart](crate::docs::a1__quickstart) | [Asynchronous API →](crate::docs::a3__async_api)</em>
 */
