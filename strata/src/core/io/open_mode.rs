use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use crate::prelude::*;

/// <sup>[`serde`](https://serde.rs)</sup>
/// Defines how a file backend is opened.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// Opens an existing file for reading (default value).
    #[default]
    Open,
    /// Creates a file for writing, truncating it if it exists.
    Create,
    /// Creates a file for writing, fails if it already exists.
    CreateNew,
    /// Opens a file for appending, creating it if missing.
    Append,
    /// Opens a file for reading and writing, creating it if missing.
    ReadWrite,
}

impl OpenMode {
    /// Returns `true` if the file is opened for reading.
    pub fn is_readable(&self) -> bool {
        matches!(self, OpenMode::Open | OpenMode::ReadWrite)
    }

    /// Returns `true` if the file is opened for writing.
    pub fn is_writable(&self) -> bool {
        !matches!(self, OpenMode::Open)
    }

    /// Returns `true` if the file must exist before opening.
    pub fn requires_existing(&self) -> bool {
        matches!(self, OpenMode::Open)
    }

    /// Returns `true` if the file must not exist before opening.
    pub fn requires_missing(&self) -> bool {
        matches!(self, OpenMode::CreateNew)
    }

    /// Translates this mode into [`OpenOptions`].
    ///
    /// Tokio file backends convert the result into `tokio::fs::OpenOptions`.
    pub fn to_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            OpenMode::Open => options.read(true),
            OpenMode::Create => options.write(true).create(true).truncate(true),
            OpenMode::CreateNew => options.write(true).create_new(true),
            OpenMode::Append => options.append(true).create(true),
            OpenMode::ReadWrite => options.read(true).write(true).create(true).truncate(false),
        };
        options
    }

    /// Checks that `path` is acceptable for this mode.
    ///
    /// For [`OpenMode::Open`] validates that file already exists and indeed is a file, for
    /// [`OpenMode::CreateNew`] validates that it does not exist.
    pub fn validate(&self, path: &Path) -> Result<()> {
        if self.requires_existing() {
            if !path.exists() {
                return Err(Error::from(std::io::Error::new(
                    ErrorKind::NotFound,
                    format!("file does not exist: {path:?}"),
                )));
            }

            if !path.is_file() {
                return Err(Error::from(std::io::Error::new(
                    ErrorKind::InvalidInput,
                    format!("not a file: {path:?}"),
                )));
            }
        }

        if self.requires_missing() && path.exists() {
            return Err(Error::from(std::io::Error::new(
                ErrorKind::AlreadyExists,
                format!("file already exists: {path:?}"),
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_and_write_capabilities() {
        assert!(OpenMode::Open.is_readable());
        assert!(!OpenMode::Open.is_writable());
        assert!(OpenMode::ReadWrite.is_readable());
        assert!(OpenMode::ReadWrite.is_writable());
        assert!(!OpenMode::Append.is_readable());
        assert!(OpenMode::Append.is_writable());
    }

    #[test]
    fn directories_are_not_opened_for_reading() {
        let err = OpenMode::Open.validate(&std::env::temp_dir()).unwrap_err();
        assert_eq!(err.io_kind(), Some(ErrorKind::InvalidInput));
        assert!(OpenMode::Create.validate(&std::env::temp_dir()).is_ok());
    }
}
