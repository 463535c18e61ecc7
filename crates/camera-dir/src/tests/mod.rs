use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use crate::{BackendError, DirectBackend, SharedDirectory, StorageBackend};

/// Shared directory on a fresh temp dir. The directory itself is not created.
fn test_dir() -> (TempDir, SharedDirectory) {
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    let dir = SharedDirectory::new(tmp.path().join("Camera1"), Arc::new(DirectBackend));
    (tmp, dir)
}

/// Direct backend that records every call and can refuse to remove files
/// whose name matches `deny_remove`.
#[derive(Default)]
struct RecordingBackend {
    ops: Mutex<Vec<String>>,
    deny_remove: Option<&'static str>,
}

impl RecordingBackend {
    fn denying_remove(name: &'static str) -> Self {
        Self {
            deny_remove: Some(name),
            ..Self::default()
        }
    }

    fn record(&self, op: &str, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.ops.lock().unwrap().push(format!("{op} {name}"));
    }

    fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }
}

impl StorageBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), BackendError> {
        self.record("mkdir", path);
        DirectBackend.create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> Result<bool, BackendError> {
        DirectBackend.exists(path)
    }

    fn is_non_empty_dir(&self, path: &Path) -> Result<bool, BackendError> {
        DirectBackend.is_non_empty_dir(path)
    }

    fn touch(&self, path: &Path) -> Result<(), BackendError> {
        self.record("touch", path);
        DirectBackend.touch(path)
    }

    fn remove(&self, path: &Path) -> Result<(), BackendError> {
        self.record("remove", path);
        if let Some(denied) = self.deny_remove {
            if path.file_name().is_some_and(|n| n == denied) {
                return Err(BackendError::io(
                    "remove",
                    path,
                    std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                ));
            }
        }
        DirectBackend.remove(path)
    }

    fn copy_file(&self, source: &Path, dest: &Path) -> Result<(), BackendError> {
        self.record("copy", dest);
        DirectBackend.copy_file(source, dest)
    }

    fn write_stream(&self, source: &mut dyn Read, dest: &Path) -> Result<u64, BackendError> {
        self.record("write", dest);
        DirectBackend.write_stream(source, dest)
    }

    fn read_file(&self, path: &Path) -> Result<Option<Vec<u8>>, BackendError> {
        DirectBackend.read_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), BackendError> {
        self.record("rename", to);
        DirectBackend.rename(from, to)
    }
}

mod flags;
mod settings;
#[cfg(unix)]
mod shell;
