//! Persistent log file.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use vibewatch_traits::LogStore;

use crate::error::{HwError, Result};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Text log on a mounted filesystem. Opening truncates; every record is
/// flushed before `append_record` returns.
#[derive(Debug)]
pub struct FileLogStore {
    path: PathBuf,
    file: Option<BufWriter<File>>,
}

impl FileLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn try_open(&mut self) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                    HwError::StorageUnavailable(format!("{}: {e}", self.path.display()))
                }
                _ => HwError::Io(e),
            })?;
        self.file = Some(BufWriter::new(file));
        tracing::debug!(path = %self.path.display(), "log file opened");
        Ok(())
    }

    fn try_append(&mut self, text: &str) -> Result<()> {
        let w = self.file.as_mut().ok_or(HwError::LogNotOpen)?;
        w.write_all(text.as_bytes())?;
        w.flush()?;
        Ok(())
    }

    fn try_close(&mut self) -> Result<()> {
        if let Some(mut w) = self.file.take() {
            w.flush()?;
            w.get_ref().sync_all()?;
            tracing::debug!(path = %self.path.display(), "log file closed");
        }
        Ok(())
    }
}

impl LogStore for FileLogStore {
    fn open(&mut self) -> std::result::Result<(), BoxError> {
        Ok(self.try_open()?)
    }

    fn append_record(&mut self, text: &str) -> std::result::Result<(), BoxError> {
        Ok(self.try_append(text)?)
    }

    fn close(&mut self) -> std::result::Result<(), BoxError> {
        Ok(self.try_close()?)
    }
}

impl Drop for FileLogStore {
    fn drop(&mut self) {
        if let Err(e) = self.try_close() {
            tracing::warn!(error = %e, "log file close on drop failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_truncates_and_appends_flush() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Vib.txt");
        std::fs::write(&path, "stale").unwrap();

        let mut store = FileLogStore::new(&path);
        store.open().unwrap();
        store.append_record("xValue: 0.30\r\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "xValue: 0.30\r\n");
        store.close().unwrap();
        store.close().unwrap();
        assert!(!store.is_open());
    }

    #[test]
    fn missing_directory_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileLogStore::new(dir.path().join("no-such-mount").join("Vib.txt"));
        let err = store.open().unwrap_err();
        let hw = err.downcast_ref::<HwError>().unwrap();
        assert!(matches!(hw, HwError::StorageUnavailable(_)));
    }

    #[test]
    fn append_before_open_fails() {
        let mut store = FileLogStore::new("unused.txt");
        let err = store.append_record("x").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HwError>(),
            Some(HwError::LogNotOpen)
        ));
    }
}
