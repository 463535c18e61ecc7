//! The control surface other processes call into.
//!
//! Every operation is synchronous and reports failure as `false`, an empty
//! string or an [`ImportOutcome`] reason. Diagnostics go to the log.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use camera_dir::{ControlFlag, MediaKind, Settings, SharedDirectory, StorageBackend, StoreError};
use media_validator::{MediaInfo, ValidationError};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::defaults::{KEY_HEIGHT, KEY_LAST_REFRESH, KEY_WIDTH};
use crate::config::validation::resolution_in_range;
use crate::config::{AppConfig, CameraSettings};

/// Result of a gated import.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportOutcome {
    Placed { path: PathBuf, info: MediaInfo },
    /// The file failed validation. The reason is user-correctable.
    Rejected { reason: String },
    /// Reading the source or writing the slot failed.
    Failed { reason: String },
}

impl ImportOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, ImportOutcome::Placed { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ImportOutcome::Placed { .. } => None,
            ImportOutcome::Rejected { reason } | ImportOutcome::Failed { reason } => Some(reason),
        }
    }
}

/// Snapshot of everything the hook module can see.
#[derive(Debug, Clone, Serialize)]
pub struct ControlStatus {
    pub directory: PathBuf,
    pub backend: &'static str,
    pub module_active: bool,
    pub enabled: bool,
    pub flags: BTreeMap<String, bool>,
    pub current_media: Option<PathBuf>,
    pub settings: BTreeMap<String, String>,
}

#[derive(Clone)]
pub struct ControlFacade {
    dir: SharedDirectory,
}

impl ControlFacade {
    pub fn new(dir: SharedDirectory) -> Self {
        Self { dir }
    }

    /// Build the facade over `backend` with the directory options in `config`.
    pub fn from_config(config: &AppConfig, backend: Arc<dyn StorageBackend>) -> Self {
        let dir = SharedDirectory::new(config.shared_dir.clone(), backend)
            .with_flag_extension(config.flag_extension.clone())
            .with_replace_mode(config.replace_mode);
        Self::new(dir)
    }

    pub fn directory(&self) -> &SharedDirectory {
        &self.dir
    }

    /// Heuristic: the directory exists and holds at least one entry.
    pub fn is_module_active(&self) -> bool {
        self.dir.is_populated()
    }

    /// Place the file at `path` into the slot its extension names.
    ///
    /// Only `.mp4` and `.bmp` are recognized; anything else is rejected
    /// without touching the shared directory.
    pub fn set_media_path(&self, path: &str) -> bool {
        let source = Path::new(path);
        let Some(kind) = MediaKind::from_path(source) else {
            warn!(path, "Unsupported media extension");
            return false;
        };
        let mime = mime_guess::from_path(source).first_raw();

        match media_validator::validate_file(kind, mime, source) {
            Ok(info) => debug!(?info, "Source validated"),
            // The controller may not be able to read what the elevated helper can.
            Err(ValidationError::Io(e)) => {
                debug!(path, "Skipping validation of unreadable source: {e}");
            }
            Err(e) => {
                warn!(path, "Media rejected: {e}");
                return false;
            }
        }

        self.report("set media", self.dir.put_media_file(kind, source).map(|_| ()))
    }

    /// Validate the file at `path` and stream it into the slot for `kind`.
    pub fn import_media(&self, kind: MediaKind, declared_mime: Option<&str>, path: &Path) -> ImportOutcome {
        match File::open(path) {
            Ok(file) => self.import_reader(kind, declared_mime, &mut BufReader::new(file)),
            Err(e) => {
                let err = StoreError::SourceUnreadable(e.to_string());
                warn!(path = %path.display(), "Import failed: {err}");
                ImportOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Validate `source`, rewind it, then stream it into the slot for `kind`.
    pub fn import_reader<R: Read + Seek>(
        &self,
        kind: MediaKind,
        declared_mime: Option<&str>,
        source: &mut R,
    ) -> ImportOutcome {
        let info = match media_validator::validate(kind, declared_mime, source) {
            Ok(info) => info,
            Err(ValidationError::Io(e)) => {
                let err = StoreError::SourceUnreadable(e.to_string());
                warn!(kind = %kind, "Import failed: {err}");
                return ImportOutcome::Failed {
                    reason: err.to_string(),
                };
            }
            Err(e) => {
                warn!(kind = %kind, "Media rejected: {e}");
                return ImportOutcome::Rejected {
                    reason: e.to_string(),
                };
            }
        };

        if let Err(e) = source.seek(SeekFrom::Start(0)) {
            return ImportOutcome::Failed {
                reason: StoreError::SourceUnreadable(e.to_string()).to_string(),
            };
        }

        match self.dir.put_media(kind, source) {
            Ok(path) => ImportOutcome::Placed { path, info },
            Err(e) => {
                warn!(kind = %kind, "Import failed: {e}");
                ImportOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Absolute path of the active media file, or `""` when there is none.
    pub fn get_current_media_path(&self) -> String {
        self.dir
            .current_media()
            .map(|p| std::path::absolute(&p).unwrap_or(p).display().to_string())
            .unwrap_or_default()
    }

    pub fn clear_media(&self) -> bool {
        self.report("clear media", self.dir.clear_media())
    }

    pub fn set_enabled(&self, enabled: bool) -> bool {
        self.report("set enabled", self.dir.set_flag(ControlFlag::Disabled, !enabled))
    }

    pub fn is_enabled(&self) -> bool {
        !self.dir.has_flag(ControlFlag::Disabled)
    }

    pub fn set_no_toast(&self, no_toast: bool) -> bool {
        self.report("set no-toast", self.dir.set_flag(ControlFlag::NoToast, no_toast))
    }

    pub fn set_private_dirs(&self, private: bool) -> bool {
        self.report("set private dirs", self.dir.set_flag(ControlFlag::PrivateDir, private))
    }

    pub fn set_flag(&self, flag: ControlFlag, present: bool) -> bool {
        self.report("set flag", self.dir.set_flag(flag, present))
    }

    /// Flip `flag`. Returns the new state, or `None` on failure.
    pub fn toggle_flag(&self, flag: ControlFlag) -> Option<bool> {
        match self.dir.toggle_flag(flag) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(flag = %flag, "Toggle failed: {e}");
                None
            }
        }
    }

    /// Merge `width`/`height` into the settings file.
    ///
    /// Out-of-range values are rejected before anything is read or written.
    pub fn set_resolution(&self, width: i64, height: i64) -> bool {
        if !resolution_in_range(width) || !resolution_in_range(height) {
            warn!(width, height, "Resolution out of range");
            return false;
        }
        let result = self.dir.update_settings(|s| {
            s.insert(KEY_WIDTH.into(), width.to_string());
            s.insert(KEY_HEIGHT.into(), height.to_string());
        });
        self.report("set resolution", result)
    }

    /// Stamp `last_refresh` so the hook module sees the settings file change.
    pub fn refresh(&self) -> bool {
        let now = chrono::Utc::now().timestamp_millis();
        let result = self.dir.update_settings(|s| {
            s.insert(KEY_LAST_REFRESH.into(), now.to_string());
        });
        self.report("refresh", result)
    }

    pub fn load_settings(&self) -> Settings {
        self.dir.load_settings()
    }

    pub fn camera_settings(&self) -> CameraSettings {
        CameraSettings::from_map(&self.dir.load_settings())
    }

    /// Write the whole settings screen: flags first, then the camera entries
    /// merged into `settings.conf`.
    pub fn apply_settings(&self, camera: &CameraSettings, enabled: bool, no_toast: bool) -> bool {
        if let Err(e) = camera.validate() {
            warn!("Invalid camera settings: {e}");
            return false;
        }
        let flags_ok = [
            self.set_enabled(enabled),
            self.set_no_toast(no_toast),
            self.set_private_dirs(camera.private_dirs),
        ]
        .into_iter()
        .all(|ok| ok);

        let entries = camera.to_map();
        let saved = self.report(
            "save camera settings",
            self.dir.update_settings(|s| s.extend(entries)),
        );
        flags_ok && saved
    }

    pub fn status(&self) -> ControlStatus {
        ControlStatus {
            directory: self.dir.root().to_path_buf(),
            backend: self.dir.backend_name(),
            module_active: self.is_module_active(),
            enabled: self.is_enabled(),
            flags: ControlFlag::ALL
                .into_iter()
                .map(|f| (f.stem().to_string(), self.dir.has_flag(f)))
                .collect(),
            current_media: self.dir.current_media(),
            settings: self.dir.load_settings().into_iter().collect(),
        }
    }

    fn report(&self, op: &str, result: Result<(), StoreError>) -> bool {
        match result {
            Ok(()) => {
                info!(op, "Control operation succeeded");
                true
            }
            Err(e) => {
                warn!(op, "Control operation failed: {e}");
                false
            }
        }
    }
}
