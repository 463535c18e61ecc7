//! The store driven through the shell backend, with `sh` as the helper.

use std::fs;
use std::sync::Arc;

use crate::{ControlFlag, MediaKind, PrivilegedShellBackend, SharedDirectory, StoreError};

fn shell_dir(root: &std::path::Path) -> SharedDirectory {
    SharedDirectory::new(root.join("Camera 1's"), Arc::new(PrivilegedShellBackend::new("sh")))
}

#[test]
fn test_store_over_shell_backend() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = shell_dir(tmp.path());
    assert_eq!(dir.backend_name(), "privileged-shell");

    dir.ensure_directory().unwrap();
    assert!(dir.exists());

    dir.set_flag(ControlFlag::Disabled, true).unwrap();
    assert!(dir.has_flag(ControlFlag::Disabled));
    dir.set_flag(ControlFlag::Disabled, false).unwrap();
    assert!(!dir.has_flag(ControlFlag::Disabled));

    let dest = dir.put_media(MediaKind::Video, &mut &b"frames"[..]).unwrap();
    assert_eq!(fs::read(&dest).unwrap(), b"frames");
    assert_eq!(dir.current_media(), Some(dest));

    let mut settings = crate::Settings::new();
    settings.insert("width".into(), "1920".into());
    dir.save_settings(&settings).unwrap();
    assert_eq!(dir.load_settings(), settings);

    dir.clear_media().unwrap();
    assert_eq!(dir.current_media(), None);
}

#[test]
fn test_failed_helper_surfaces_as_access_denied() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = SharedDirectory::new(
        tmp.path(),
        Arc::new(PrivilegedShellBackend::new("/nonexistent/su")),
    );
    // Existence probes fail too, so the directory looks missing.
    let err = dir.set_flag(ControlFlag::NoToast, true).unwrap_err();
    assert!(matches!(err, StoreError::AccessDenied(_)));
    assert!(err.to_string().starts_with("Permission denied: "));
    assert!(err.to_string().contains("failed to launch /nonexistent/su"));
}
