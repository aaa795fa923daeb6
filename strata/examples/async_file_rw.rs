use std::fs::remove_file;
use std::path::PathBuf;
use std::time::Duration;

use strata::asnc::prelude::*;

const N_ITER: usize = 100;
const TIMEOUT: Duration = Duration::from_secs(5);

async fn run(path: PathBuf) -> Result<()> {
    let options = CompressionOptions::from(Algorithm::Zlib);

    // Blocking chain driven from async code
    let chain = TextChannel::new(BufferedChannel::new(CompressionChannel::compressor(
        FileChannel::open(path.as_path(), OpenMode::Create)?,
        options,
    )));
    let mut writer = TimeoutChannel::new(AsyncAdapter::new(chain), TIMEOUT);

    log::warn!("[writer] started");
    for i in 0..N_ITER {
        writer
            .write_all(format!("record #{i}\n").as_bytes())
            .await?;
    }
    writer.close().await?;
    log::warn!("[writer] finished");

    // Native Tokio file, decompressed by a blocking decorator on top of a memory copy
    let mut file = TokioChannel::open(path.as_path(), OpenMode::Open).await?;
    let mut compressed = Vec::new();
    file.read_to_end(&mut compressed).await?;
    file.close().await?;

    let mut reader = AsyncAdapter::new(TextChannel::new(CompressionChannel::decompressor(
        MemoryChannel::from_bytes(compressed),
        options,
    )));

    log::warn!("[reader] started");
    let mut content = Vec::new();
    reader.read_to_end(&mut content).await?;
    let text = String::from_utf8_lossy(&content);
    let n_records = text.lines().count();
    log::warn!("[reader] finished: {n_records} records");

    assert_eq!(n_records, N_ITER);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Setup logger
    env_logger::builder()
        .filter_level(log::LevelFilter::Info) // Suppress everything below `info` for third-party modules.
        .filter_module(env!("CARGO_PKG_NAME"), log::LevelFilter::Info) // Log level for current package
        .init();

    let path = PathBuf::from("/tmp/strata_async.bin");
    if path.exists() {
        remove_file(path.as_path()).unwrap();
    }
    run(path).await.unwrap();
}

#[cfg(test)]
#[tokio::test]
async fn async_file_rw() {
    let path = PathBuf::from("/tmp/strata_async_file_rw.bin");
    if path.exists() {
        remove_file(path.as_path()).unwrap();
    }
    let handler = tokio::spawn(async move {
        run(path).await.unwrap();
    });

    tokio::time::timeout(TIMEOUT, handler)
        .await
        .expect("[async_file_rw] test took too long")
        .unwrap();
}
