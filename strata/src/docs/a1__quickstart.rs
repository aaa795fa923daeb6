/*!
# 📖 1.1. Quickstart

<em>[← Home](crate::docs) | [Layering →](crate::docs::a2__layering)</em>

## Install

Add Strata to your project dependencies:

```shell
cargo add strata
```

Blocking and suspending APIs are enabled by default. Use `--no-default-features --features sync`
if you don't need Tokio.

## A Glimpse

Let's write a compressed text file and read it back:

```rust,no_run
use strata::sync::prelude::*;
# fn main() -> Result<()> {
let path = "/tmp/strata_quickstart.txt.gz";
let options = CompressionOptions::from(Algorithm::Gzip);

let mut writer = TextChannel::new(
    BufferedChannel::new(
        CompressionChannel::compressor(
            FileChannel::open(path, OpenMode::Create)?,
            options,
        ),
    ),
);
writer.write_line("first line")?;
writer.write_line("second line")?;
writer.close()?;

let mut reader = TextChannel::new(
    BufferedChannel::new(
        CompressionChannel::decompressor(
            FileChannel::open(path, OpenMode::Open)?,
            options,
        ),
    ),
);
for line in reader.lines() {
    println!("{}", line?);
}
# Ok(()) }
```

The outermost channel is the one you talk to. Bytes flow from text through buffering and
compression down to the file on write, and back up on read.

Closing the text channel closes the whole chain: the buffer is flushed, the gzip trailer is written,
and the file is closed. Each step happens exactly once, even if you call `close` again or the
channel is dropped afterward.

<em>[← Home](crate::docs) | [Layering →](crate::docs::a2__layering)</em>
 */
