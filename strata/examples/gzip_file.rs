use std::fs::remove_file;
use std::path::{Path, PathBuf};

use strata::sync::prelude::*;

const N_BLOCKS: usize = 256;
const BLOCK_SIZE: usize = 4096;

fn block(i: usize) -> Vec<u8> {
    (0..BLOCK_SIZE).map(|j| ((i + j) % 64) as u8).collect()
}

fn run(path: &Path) -> Result<()> {
    let options = CompressionOptions::from(Algorithm::Gzip).level(Level::best());

    let mut writer = CompressionChannel::compressor(
        BufferedChannel::new(FileChannel::open(path, OpenMode::Create)?),
        options,
    );
    for i in 0..N_BLOCKS {
        writer.write_all(&block(i))?;
    }
    let total_in = writer.total_in();
    writer.close()?;

    let compressed = std::fs::metadata(path)?.len();
    log::warn!(
        "[writer] compressed {total_in} bytes into {compressed} ({:.1}%)",
        compressed as f64 * 100.0 / total_in as f64
    );

    let mut reader = CompressionChannel::decompressor(
        BufferedChannel::new(FileChannel::open(path, OpenMode::Open)?),
        options,
    );
    let mut buf = vec![0u8; BLOCK_SIZE];
    for i in 0..N_BLOCKS {
        reader.read_exact(&mut buf)?;
        assert_eq!(buf, block(i), "block #{i} differs");
    }
    assert!(reader.read(&mut buf)?.is_end_of_stream());
    log::warn!("[reader] verified {N_BLOCKS} blocks");

    Ok(())
}

fn main() {
    // Setup logger
    env_logger::builder()
        .filter_level(log::LevelFilter::Info) // Suppress everything below `info` for third-party modules.
        .filter_module(env!("CARGO_PKG_NAME"), log::LevelFilter::Info) // Log level for current package
        .init();

    let path = PathBuf::from("/tmp/strata_gzip_file.bin.gz");
    if path.exists() {
        remove_file(path.as_path()).unwrap();
    }
    run(path.as_path()).unwrap();
}

#[cfg(test)]
#[test]
fn gzip_file() {
    let path = PathBuf::from("/tmp/strata_gzip_file_test.bin.gz");
    if path.exists() {
        remove_file(path.as_path()).unwrap();
    }
    run(path.as_path()).unwrap();
}
