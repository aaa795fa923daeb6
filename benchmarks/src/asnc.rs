use std::time::SystemTime;

use strata::asnc::prelude::*;

use crate::report;

/// Writes records through an [`AsyncAdapter`] over a buffered compressing chain.
pub async fn benchmark_async_adapter(n_records: usize, record_size: usize) {
    let n_bytes = n_records * record_size;
    let record = vec![0x42u8; record_size];

    let mut channel = AsyncAdapter::new(BufferedChannel::new(CompressionChannel::compressor(
        MemoryChannel::new(),
        CompressionOptions::from(Algorithm::Zlib).level(Level::fast()),
    )));

    log::info!("[benchmark_async_adapter] started");
    let start = SystemTime::now();
    for _ in 0..n_records {
        if let Err(err) = channel.write_all(&record).await {
            log::error!("[benchmark_async_adapter] write error: {err:?}");
            break;
        }
    }
    channel.close().await.unwrap();
    let duration = start.elapsed().unwrap();

    report("benchmark_async_adapter", n_bytes, duration);
}
