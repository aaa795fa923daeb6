use std::fs::remove_file;
use std::path::{Path, PathBuf};

use strata::sync::prelude::*;

const N_LINES: usize = 1000;

fn run(path: &Path) -> Result<()> {
    let mut writer = TextChannel::new(BufferedChannel::new(FileChannel::open(
        path,
        OpenMode::Create,
    )?));

    log::warn!("[writer] started");
    for i in 0..N_LINES {
        writer.write_line(&format!("line #{i}: héllo, wörld"))?;
    }
    writer.close()?;
    log::warn!("[writer] finished");

    let mut reader = TextChannel::new(BufferedChannel::new(FileChannel::open(
        path,
        OpenMode::Open,
    )?));

    log::warn!("[reader] started");
    let mut n_lines = 0;
    for line in reader.lines() {
        let line = line?;
        if n_lines % 100 == 0 {
            log::info!("[reader] {line}");
        }
        n_lines += 1;
    }
    log::warn!("[reader] finished: {n_lines} lines");

    assert_eq!(n_lines, N_LINES);
    Ok(())
}

fn main() {
    // Setup logger
    env_logger::builder()
        .filter_level(log::LevelFilter::Info) // Suppress everything below `info` for third-party modules.
        .filter_module(env!("CARGO_PKG_NAME"), log::LevelFilter::Info) // Log level for current package
        .init();

    let path = PathBuf::from("/tmp/strata_file_rw.txt");
    if path.exists() {
        remove_file(path.as_path()).unwrap();
    }
    run(path.as_path()).unwrap();
}

#[cfg(test)]
#[test]
fn file_rw() {
    let path = PathBuf::from("/tmp/strata_file_rw_test.txt");
    if path.exists() {
        remove_file(path.as_path()).unwrap();
    }
    run(path.as_path()).unwrap();
}
