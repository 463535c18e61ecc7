//! Storage backends: the file operations the shared directory needs.
//!
//! Two implementations exist. [`DirectBackend`] uses ordinary file-system
//! calls; [`PrivilegedShellBackend`] runs the equivalent shell commands
//! through an elevated helper (`su -c ...`) when the host process cannot
//! write the directory itself. Which one is active is decided once at
//! startup and injected into [`crate::SharedDirectory`].

mod direct;
mod shell;

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use direct::DirectBackend;
pub use shell::{PrivilegedShellBackend, shell_quote};

pub trait StorageBackend: Send + Sync {
    /// Short name for logs and status output.
    fn name(&self) -> &'static str;

    /// `mkdir -p`.
    fn create_dir_all(&self, path: &Path) -> Result<(), BackendError>;

    fn exists(&self, path: &Path) -> Result<bool, BackendError>;

    /// `Ok(false)` when the directory is missing or empty.
    fn is_non_empty_dir(&self, path: &Path) -> Result<bool, BackendError>;

    /// Create an empty file if absent. Existing content is left alone.
    fn touch(&self, path: &Path) -> Result<(), BackendError>;

    /// `rm -f`: a missing file is not an error.
    fn remove(&self, path: &Path) -> Result<(), BackendError>;

    fn copy_file(&self, source: &Path, dest: &Path) -> Result<(), BackendError>;

    /// Stream `source` into `dest`, truncating it. Returns the bytes written.
    fn write_stream(&self, source: &mut dyn Read, dest: &Path) -> Result<u64, BackendError>;

    /// Whole-file read. `Ok(None)` when the file does not exist.
    fn read_file(&self, path: &Path) -> Result<Option<Vec<u8>>, BackendError>;

    /// Replace `to` with `from`.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), BackendError>;

    fn write_file(&self, dest: &Path, contents: &[u8]) -> Result<u64, BackendError> {
        let mut reader = contents;
        self.write_stream(&mut reader, dest)
    }
}

/// Backend error type.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for privileged command: {0}")]
    Wait(#[source] io::Error),

    #[error("command failed ({status}): {output}")]
    CommandFailed { status: String, output: String },

    #[error("command timed out after {0:?}")]
    TimedOut(Duration),
}

impl BackendError {
    pub(crate) fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        BackendError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Missing permission, or the elevated helper could not be used at all.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            BackendError::Io { source, .. } => source.kind() == io::ErrorKind::PermissionDenied,
            BackendError::Launch { .. } => true,
            BackendError::CommandFailed { output, .. } => {
                let lower = output.to_lowercase();
                lower.contains("permission denied") || lower.contains("not permitted")
            }
            BackendError::Wait(_) | BackendError::TimedOut(_) => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            BackendError::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            BackendError::CommandFailed { output, .. } => {
                output.to_lowercase().contains("no such file")
            }
            _ => false,
        }
    }
}
