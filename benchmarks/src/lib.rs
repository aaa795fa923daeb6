#[cfg(feature = "async")]
pub mod asnc;
#[cfg(feature = "buffering")]
pub mod buffering;
#[cfg(feature = "compression")]
pub mod compression;

use std::time::Duration;

/// Logs throughput of a finished benchmark.
pub fn report(name: &str, n_bytes: usize, duration: Duration) {
    let mb = n_bytes as f64 / (1024.0 * 1024.0);
    log::info!(
        "[{name}] {n_bytes} bytes in {}s ({:.2} MiB/s)",
        duration.as_secs_f32(),
        mb / duration.as_secs_f64().max(f64::EPSILON)
    );
}
