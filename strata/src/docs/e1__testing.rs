/*!
# 📖 2.1. Testing

<em>[← Home](crate::docs)</em>

Since we have two types of API and several feature flags, the proper testing could be cumbersome.
Here is the list of commands required to ensure that your changes pass the checks related to
testing.

Common tests:

```shell
cargo test --no-default-features --features sync --lib --tests --bins
cargo test --lib --tests --bins
cargo test --all-features --lib --tests --bins
```

Documentation tests:

```shell
cargo test --no-default-features --features test_utils --doc
cargo test --all-features --features test_utils --doc
```

Examples:

```shell
cargo test --all-features --examples
```

## Instrumented Channels

With `test_utils` feature flag, `strata::sync::testing` provides `ProbeChannel`, a leaf channel
that records calls into a shared `Probe`. The probe remains accessible after the channel was
moved into a chain:

```rust
# #[cfg(feature = "test_utils")] {
use strata::sync::prelude::*;
use strata::sync::testing::ProbeChannel;

let inner = ProbeChannel::new();
let probe = inner.probe();

let mut channel = BufferedChannel::with_block_size(4, inner).unwrap();
channel.write_all(b"abcd").unwrap();
assert_eq!(probe.writes(), 1);

drop(channel);
assert_eq!(probe.closes(), 1);
# }
```

<em>[← Home](crate::docs)</em>
 */
