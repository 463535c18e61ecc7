//! Ordinary file-system calls against a directory we can write ourselves.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use super::{BackendError, StorageBackend};

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectBackend;

impl DirectBackend {
    pub fn new() -> Self {
        Self
    }
}

impl StorageBackend for DirectBackend {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), BackendError> {
        fs::create_dir_all(path).map_err(|e| BackendError::io("mkdir", path, e))
    }

    fn exists(&self, path: &Path) -> Result<bool, BackendError> {
        fs::exists(path).map_err(|e| BackendError::io("stat", path, e))
    }

    fn is_non_empty_dir(&self, path: &Path) -> Result<bool, BackendError> {
        match fs::read_dir(path) {
            Ok(mut entries) => Ok(entries.next().is_some()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BackendError::io("list", path, e)),
        }
    }

    fn touch(&self, path: &Path) -> Result<(), BackendError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map(|_| ())
            .map_err(|e| BackendError::io("touch", path, e))
    }

    fn remove(&self, path: &Path) -> Result<(), BackendError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackendError::io("remove", path, e)),
        }
    }

    fn copy_file(&self, source: &Path, dest: &Path) -> Result<(), BackendError> {
        fs::copy(source, dest)
            .map(|_| ())
            .map_err(|e| BackendError::io("copy", dest, e))
    }

    fn write_stream(&self, source: &mut dyn Read, dest: &Path) -> Result<u64, BackendError> {
        let file = File::create(dest).map_err(|e| BackendError::io("create", dest, e))?;
        let mut writer = BufWriter::new(file);
        let written = io::copy(source, &mut writer).map_err(|e| BackendError::io("write", dest, e))?;
        let file = writer
            .into_inner()
            .map_err(|e| BackendError::io("write", dest, e.into_error()))?;
        file.sync_all().map_err(|e| BackendError::io("sync", dest, e))?;
        Ok(written)
    }

    fn read_file(&self, path: &Path) -> Result<Option<Vec<u8>>, BackendError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::io("read", path, e)),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), BackendError> {
        fs::rename(from, to).map_err(|e| BackendError::io("rename", to, e))
    }
}
