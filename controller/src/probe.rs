//! Startup choice between direct file access and the elevated shell.

use std::path::Path;
use std::sync::Arc;

use camera_dir::{DirectBackend, PrivilegedShellBackend, StorageBackend};
use tracing::{info, warn};

use crate::config::{AppConfig, BackendChoice};

const PROBE_FILE: &str = ".fakecam-probe";

/// Pick the storage backend once, according to `config.backend`.
pub fn select_backend(config: &AppConfig) -> Arc<dyn StorageBackend> {
    let direct = match config.backend {
        BackendChoice::Direct => true,
        BackendChoice::Shell => false,
        BackendChoice::Auto => has_direct_access(&config.shared_dir),
    };

    if direct {
        info!(dir = %config.shared_dir.display(), "Using direct file access");
        Arc::new(DirectBackend::new())
    } else {
        info!(
            program = %config.shell_program,
            timeout = ?config.shell_timeout,
            "Using privileged shell"
        );
        Arc::new(
            PrivilegedShellBackend::new(config.shell_program.clone())
                .with_timeout(config.shell_timeout),
        )
    }
}

/// Whether this process can create and delete files in `dir` itself.
pub fn has_direct_access(dir: &Path) -> bool {
    let backend = DirectBackend::new();
    let probe = dir.join(PROBE_FILE);
    let result = backend
        .create_dir_all(dir)
        .and_then(|()| backend.touch(&probe))
        .and_then(|()| backend.remove(&probe));
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(dir = %dir.display(), "No direct access to shared directory: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_writable_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("Camera1");
        assert!(has_direct_access(&dir));
        assert!(dir.is_dir());
        assert!(!dir.join(PROBE_FILE).exists());
    }

    #[test]
    fn test_probe_blocked_by_file() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        assert!(!has_direct_access(&blocker.join("Camera1")));
    }

    #[test]
    fn test_explicit_choice_skips_probe() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig {
            shared_dir: tmp.path().join("never-created"),
            backend: BackendChoice::Shell,
            ..AppConfig::default()
        };
        assert_eq!(select_backend(&config).name(), "privileged-shell");
        assert!(!config.shared_dir.exists());

        let config = AppConfig {
            backend: BackendChoice::Direct,
            ..config
        };
        assert_eq!(select_backend(&config).name(), "direct");
    }

    #[test]
    fn test_auto_prefers_direct() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig {
            shared_dir: tmp.path().to_path_buf(),
            ..AppConfig::default()
        };
        assert_eq!(select_backend(&config).name(), "direct");
    }
}
