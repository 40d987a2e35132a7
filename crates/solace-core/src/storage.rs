//! Append-only flat-file access shared by the analytics log, journal and safety audit log.
//!
//! Writers hold an in-process mutex and an exclusive OS advisory lock for the whole
//! append, and emit each record with a single `write_all`. Readers take a shared lock,
//! so they see the file as of the last completed append.

use crate::error::{WellnessError, WellnessResult};
use fs4::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug)]
pub(crate) struct AppendFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl AppendFile {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Appends `record`, first writing `header` if the file is new or empty. The header
    /// check happens under the exclusive lock so two first-time writers cannot both add it.
    pub(crate) fn append(&self, header: Option<&str>, record: &str) -> WellnessResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| WellnessError::store(parent, e))?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        FileExt::lock_exclusive(&file).map_err(|e| self.io_err(e))?;
        let result = self.write_locked(&mut file, header, record);
        let unlocked = FileExt::unlock(&file).map_err(|e| self.io_err(e));
        result.and(unlocked)
    }

    fn write_locked(&self, file: &mut File, header: Option<&str>, record: &str) -> WellnessResult<()> {
        let is_empty = file.metadata().map_err(|e| self.io_err(e))?.len() == 0;
        let mut buf = String::with_capacity(record.len() + 64);
        if is_empty {
            if let Some(h) = header {
                buf.push_str(h);
            }
        }
        buf.push_str(record);
        file.write_all(buf.as_bytes()).map_err(|e| self.io_err(e))?;
        file.flush().map_err(|e| self.io_err(e))?;
        file.sync_data().map_err(|e| self.io_err(e))?;
        Ok(())
    }

    /// Whole-file read under a shared lock. `None` when the file does not exist yet.
    pub(crate) fn read_to_string(&self) -> WellnessResult<Option<String>> {
        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(e)),
        };
        FileExt::lock_shared(&file).map_err(|e| self.io_err(e))?;
        let mut raw = String::new();
        let read = file.read_to_string(&mut raw).map_err(|e| self.io_err(e));
        let unlocked = FileExt::unlock(&file).map_err(|e| self.io_err(e));
        read.and(unlocked)?;
        Ok(Some(raw))
    }

    fn io_err(&self, e: std::io::Error) -> WellnessError {
        WellnessError::store(&self.path, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let f = AppendFile::new(dir.path().join("nested").join("log.txt"));
        f.append(Some("h\n"), "a\n").unwrap();
        f.append(Some("h\n"), "b\n").unwrap();
        assert_eq!(f.read_to_string().unwrap().unwrap(), "h\na\nb\n");
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let f = AppendFile::new(dir.path().join("absent.txt"));
        assert!(f.read_to_string().unwrap().is_none());
        assert!(!f.exists());
    }
}
