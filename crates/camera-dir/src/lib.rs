//! File-based control protocol shared with the camera hook module.
//!
//! The hook module never talks to us directly. It polls one flat directory
//! and reacts to what it finds there: the active media slots, presence flags
//! and `settings.conf`. [`SharedDirectory`] is the only write path into that
//! directory; every effect goes through a [`StorageBackend`].

pub mod backend;
pub mod flags;
pub mod media;
pub mod settings;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

pub use backend::{BackendError, DirectBackend, PrivilegedShellBackend, StorageBackend};
pub use flags::ControlFlag;
pub use media::{MediaKind, ReplaceMode};
pub use settings::{Settings, decode_settings, encode_settings};

/// Active substituted video.
pub const VIDEO_FILE: &str = "virtual.mp4";
/// Active substituted image.
pub const IMAGE_FILE: &str = "virtual.bmp";
/// Line-oriented `key=value` settings read by the hook module.
pub const SETTINGS_FILE: &str = "settings.conf";
/// Extension used for flag files (`disable.jpg`, `no_toast.jpg`, ...).
pub const DEFAULT_FLAG_EXTENSION: &str = "jpg";

/// Handle to the shared directory. Holds no state besides its configuration;
/// every call re-reads the file system.
#[derive(Clone)]
pub struct SharedDirectory {
    root: PathBuf,
    backend: Arc<dyn StorageBackend>,
    flag_extension: String,
    replace_mode: ReplaceMode,
}

impl SharedDirectory {
    pub fn new(root: impl Into<PathBuf>, backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            root: root.into(),
            backend,
            flag_extension: DEFAULT_FLAG_EXTENSION.to_string(),
            replace_mode: ReplaceMode::default(),
        }
    }

    pub fn with_flag_extension(mut self, extension: impl Into<String>) -> Self {
        self.flag_extension = extension.into();
        self
    }

    pub fn with_replace_mode(mut self, mode: ReplaceMode) -> Self {
        self.replace_mode = mode;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn replace_mode(&self) -> ReplaceMode {
        self.replace_mode
    }

    /// Path of a protocol file. Protocol files always live directly in the root.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Create the directory if it is missing. `Ok` means it exists afterwards.
    ///
    /// Permission failures, including an unusable elevated helper, come back
    /// as `AccessDenied`; anything else as `DirectoryUnavailable`.
    pub fn ensure_directory(&self) -> Result<(), StoreError> {
        if self.exists() {
            return Ok(());
        }
        self.backend.create_dir_all(&self.root).map_err(|e| {
            if e.is_permission_denied() {
                StoreError::AccessDenied(e)
            } else {
                StoreError::DirectoryUnavailable(e)
            }
        })?;
        info!(path = %self.root.display(), backend = self.backend.name(), "Created shared directory");
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.probe(&self.root)
    }

    /// Directory exists and contains at least one entry.
    pub fn is_populated(&self) -> bool {
        match self.backend.is_non_empty_dir(&self.root) {
            Ok(populated) => populated,
            Err(e) => {
                debug!(path = %self.root.display(), "Directory listing failed: {e}");
                false
            }
        }
    }

    /// Existence check that treats backend failures as absence.
    fn probe(&self, path: &Path) -> bool {
        match self.backend.exists(path) {
            Ok(found) => found,
            Err(e) => {
                debug!(path = %path.display(), "Existence check failed: {e}");
                false
            }
        }
    }
}

/// Store error type. The display string is the diagnostic surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Could not create output directory: {0}")]
    DirectoryUnavailable(#[source] BackendError),

    #[error("Could not open source file: {0}")]
    SourceUnreadable(String),

    #[error("Permission denied: {0}")]
    AccessDenied(#[source] BackendError),

    #[error("Copy failed: {0}")]
    WriteFailed(#[source] BackendError),

    #[error("Invalid settings entry: {0}")]
    InvalidSettings(String),

    #[error("Storage backend error: {0}")]
    Backend(#[from] BackendError),
}

impl StoreError {
    /// Split a failed write into the access-denied and io-failure categories.
    fn from_write(err: BackendError) -> Self {
        if err.is_permission_denied() {
            StoreError::AccessDenied(err)
        } else {
            StoreError::WriteFailed(err)
        }
    }
}

#[cfg(test)]
mod tests;
