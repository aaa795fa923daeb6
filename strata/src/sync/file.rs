use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::core::utils::Closer;
use crate::sync::{ByteChannel, Seekable};

use crate::prelude::*;

/// <sup>[`sync`](crate::sync)</sup>
/// Byte channel backed by a local file.
///
/// The file is opened according to [`OpenMode`]. A channel opened by [`OpenMode::Open`] can't
/// perform write actions and channels opened by write-only modes can't read.
///
/// # Usage
///
/// ```rust,no_run
/// use strata::sync::prelude::*;
///
/// let path = "/tmp/strata.bin";
///
/// let mut writer = FileChannel::open(path, OpenMode::Create).unwrap();
/// writer.write_all(b"payload").unwrap();
/// writer.close().unwrap();
///
/// let mut reader = FileChannel::open(path, OpenMode::Open).unwrap();
/// let mut content = Vec::new();
/// reader.read_to_end(&mut content).unwrap();
/// ```
#[derive(Debug)]
pub struct FileChannel {
    file: Option<File>,
    info: ChannelInfo,
    state: Closer,
}

impl FileChannel {
    /// Opens a file.
    ///
    /// Accepts as `path` anything that can be converted to [`PathBuf`]. For [`OpenMode::Open`]
    /// validates that file already exists and indeed is a file, for [`OpenMode::CreateNew`]
    /// validates that it does not exist.
    pub fn open(path: impl Into<PathBuf>, mode: OpenMode) -> Result<Self> {
        let path: PathBuf = path.into();

        mode.validate(path.as_path())?;

        let file = mode.to_options().open(path.as_path())?;
        let info = ChannelInfo::File { path, mode };
        log::debug!("[{info}] opened");

        Ok(Self {
            file: Some(file),
            info,
            state: Closer::new(),
        })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> Option<&Path> {
        match &self.info {
            ChannelInfo::File { path, .. } => Some(path.as_path()),
            _ => None,
        }
    }

    fn file(&mut self) -> Result<&mut File> {
        self.state.ensure_open()?;
        self.file.as_mut().ok_or(Error::Closed)
    }
}

impl ByteChannel for FileChannel {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        let file = self.file()?;
        if buf.is_empty() {
            return Ok(ReadOutcome::Data(0));
        }

        loop {
            match file.read(buf) {
                Ok(0) => return Ok(ReadOutcome::EndOfStream),
                Ok(n) => return Ok(ReadOutcome::Data(n)),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let file = self.file()?;

        loop {
            match file.write(buf) {
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.file()?.flush().map_err(Error::from)
    }

    fn close(&mut self) -> Result<()> {
        if !self.state.close() {
            return Ok(());
        }

        let flushed = match self.file.take() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        };
        log::debug!("[{}] closed", self.info);

        flushed.map_err(Error::from)
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    fn info(&self) -> &ChannelInfo {
        &self.info
    }
}

impl Seekable for FileChannel {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.file()?.seek(pos).map_err(Error::from)
    }
}

impl Drop for FileChannel {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("[{}] error while closing on drop: {err:?}", self.info);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::remove_file;

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("strata_file_{name}.bin"));
        if path.exists() {
            remove_file(path.as_path()).unwrap();
        }
        path
    }

    #[test]
    fn file_channel_round_trip() {
        let path = temp_path("round_trip");

        let mut writer = FileChannel::open(path.as_path(), OpenMode::Create).unwrap();
        writer.write_all(b"first line\n").unwrap();
        writer.close().unwrap();
        writer.close().unwrap();

        let mut appender = FileChannel::open(path.as_path(), OpenMode::Append).unwrap();
        appender.write_all(b"second line\n").unwrap();
        drop(appender);

        let mut reader = FileChannel::open(path.as_path(), OpenMode::Open).unwrap();
        let mut content = Vec::new();
        reader.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"first line\nsecond line\n");

        reader.rewind().unwrap();
        let mut head = [0u8; 5];
        reader.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"first");

        remove_file(path).unwrap();
    }

    #[test]
    fn open_mode_is_validated() {
        let path = temp_path("validated");

        let err = FileChannel::open(path.as_path(), OpenMode::Open).unwrap_err();
        assert_eq!(err.io_kind(), Some(ErrorKind::NotFound));

        FileChannel::open(path.as_path(), OpenMode::CreateNew)
            .unwrap()
            .close()
            .unwrap();
        let err = FileChannel::open(path.as_path(), OpenMode::CreateNew).unwrap_err();
        assert_eq!(err.io_kind(), Some(ErrorKind::AlreadyExists));

        let err = FileChannel::open(std::env::temp_dir(), OpenMode::Open).unwrap_err();
        assert_eq!(err.io_kind(), Some(ErrorKind::InvalidInput));

        remove_file(path).unwrap();
    }

    #[test]
    fn closed_file_channel_rejects_io() {
        let path = temp_path("closed");

        let mut channel = FileChannel::open(path.as_path(), OpenMode::ReadWrite).unwrap();
        channel.close().unwrap();

        assert!(matches!(channel.write(b"late"), Err(Error::Closed)));
        assert!(matches!(channel.read(&mut [0u8; 4]), Err(Error::Closed)));

        remove_file(path).unwrap();
    }
}
