use std::time::SystemTime;

use strata::sync::prelude::*;

use crate::report;

fn payload(len: usize) -> Vec<u8> {
    // Text-like data: compressible but not trivially so
    (0..len)
        .map(|i| b"lorem ipsum dolor sit amet "[(i * 7 + i / 13) % 27])
        .collect()
}

/// Compresses and decompresses an in-memory payload with every supported algorithm.
pub fn benchmark_compression(len: usize, level: Level) {
    let data = payload(len);

    for algorithm in [Algorithm::Deflate, Algorithm::Zlib, Algorithm::Gzip] {
        let options = CompressionOptions::from(algorithm).level(level);

        let start = SystemTime::now();
        let mut compressor = CompressionChannel::compressor(MemoryChannel::new(), options);
        for chunk in data.chunks(64 * 1024) {
            compressor.write_all(chunk).unwrap();
        }
        let compressed = compressor.finish().unwrap().into_bytes();
        let compress_duration = start.elapsed().unwrap();

        let start = SystemTime::now();
        let mut decompressor = CompressionChannel::decompressor(
            BufferedChannel::new(MemoryChannel::from_bytes(compressed.as_slice())),
            options,
        );
        let mut restored = Vec::with_capacity(len);
        decompressor.read_to_end(&mut restored).unwrap();
        let decompress_duration = start.elapsed().unwrap();

        assert_eq!(restored.len(), data.len());
        log::info!(
            "[benchmark_compression] {algorithm}, level {}: ratio {:.3}",
            level.level(),
            compressed.len() as f64 / len as f64
        );
        report(
            &format!("benchmark_compression: {algorithm} compress"),
            len,
            compress_duration,
        );
        report(
            &format!("benchmark_compression: {algorithm} decompress"),
            len,
            decompress_duration,
        );
    }
}
