#[cfg(feature = "async")]
use strata_benchmarks::asnc::benchmark_async_adapter;
#[cfg(feature = "buffering")]
use strata_benchmarks::buffering::benchmark_buffered_file;
#[cfg(feature = "compression")]
use strata_benchmarks::compression::benchmark_compression;

fn main() {
    // Setup logger
    env_logger::builder()
        .filter_level(log::LevelFilter::Info) // Suppress everything below `info` for third-party modules.
        .filter_module(env!("CARGO_PKG_NAME"), log::LevelFilter::Trace) // Allow everything from current package
        .init();

    #[cfg(feature = "buffering")]
    {
        log::info!("[benchmark_buffered_file]");
        benchmark_buffered_file(100_000, 64);
    }

    #[cfg(feature = "compression")]
    {
        log::info!("[benchmark_compression]");
        benchmark_compression(16 * 1024 * 1024, strata::core::io::Level::default());
    }

    #[cfg(feature = "async")]
    {
        log::info!("[benchmark_async_adapter]");
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(benchmark_async_adapter(10_000, 256));
    }
}
