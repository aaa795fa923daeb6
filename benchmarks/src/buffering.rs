use std::fs::remove_file;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use strata::sync::prelude::*;

use crate::report;

fn prepare(name: &str) -> PathBuf {
    let path = PathBuf::from(format!("/tmp/strata_benchmarks_{name}.bin"));
    if Path::exists(path.as_path()) {
        remove_file(path.as_path()).unwrap();
    }
    path
}

fn write_records<C: ByteChannel>(channel: &mut C, n_records: usize, record_size: usize) {
    let record = vec![0x5au8; record_size];
    for _ in 0..n_records {
        channel.write_all(&record).unwrap();
    }
    channel.close().unwrap();
}

fn read_records<C: ByteChannel>(channel: &mut C, record_size: usize) -> usize {
    let mut record = vec![0u8; record_size];
    let mut total = 0;
    loop {
        match channel.read(&mut record).unwrap() {
            ReadOutcome::Data(n) => total += n,
            ReadOutcome::EndOfStream => break,
        }
    }
    channel.close().unwrap();
    total
}

/// Writes and reads back small records with and without a [`BufferedChannel`] in between.
pub fn benchmark_buffered_file(n_records: usize, record_size: usize) {
    let n_bytes = n_records * record_size;

    {
        let path = prepare("direct");
        let start = SystemTime::now();

        let mut writer = FileChannel::open(path.as_path(), OpenMode::Create).unwrap();
        write_records(&mut writer, n_records, record_size);
        let mut reader = FileChannel::open(path.as_path(), OpenMode::Open).unwrap();
        let n_read = read_records(&mut reader, record_size);

        let duration = start.elapsed().unwrap();
        assert_eq!(n_read, n_bytes);
        report("benchmark_buffered_file: direct", n_bytes * 2, duration);
    }

    {
        let path = prepare("buffered");
        let start = SystemTime::now();

        let mut writer =
            BufferedChannel::new(FileChannel::open(path.as_path(), OpenMode::Create).unwrap());
        write_records(&mut writer, n_records, record_size);
        let mut reader =
            BufferedChannel::new(FileChannel::open(path.as_path(), OpenMode::Open).unwrap());
        let n_read = read_records(&mut reader, record_size);

        let duration = start.elapsed().unwrap();
        assert_eq!(n_read, n_bytes);
        report("benchmark_buffered_file: buffered", n_bytes * 2, duration);
    }
}
