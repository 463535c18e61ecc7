use std::sync::Arc;
use std::thread;

use super::{RecordingBackend, test_dir};
use crate::{ControlFlag, SharedDirectory};

#[test]
fn test_set_and_clear_flag() {
    let (_tmp, dir) = test_dir();
    assert!(!dir.has_flag(ControlFlag::Disabled));

    dir.set_flag(ControlFlag::Disabled, true).unwrap();
    assert!(dir.has_flag(ControlFlag::Disabled));
    assert!(dir.path_of("disable.jpg").exists());

    dir.set_flag(ControlFlag::Disabled, false).unwrap();
    assert!(!dir.has_flag(ControlFlag::Disabled));
}

#[test]
fn test_set_flag_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::default());
    let dir = SharedDirectory::new(tmp.path(), backend.clone());

    dir.set_flag(ControlFlag::NoToast, true).unwrap();
    dir.set_flag(ControlFlag::NoToast, true).unwrap();
    dir.set_flag(ControlFlag::NoToast, false).unwrap();
    dir.set_flag(ControlFlag::NoToast, false).unwrap();

    assert_eq!(backend.ops(), vec!["touch no_toast.jpg", "remove no_toast.jpg"]);
}

#[test]
fn test_flags_are_independent() {
    let (_tmp, dir) = test_dir();
    dir.set_flag(ControlFlag::NoToast, true).unwrap();
    dir.set_flag(ControlFlag::PrivateDir, true).unwrap();
    dir.set_flag(ControlFlag::NoToast, false).unwrap();

    assert!(!dir.has_flag(ControlFlag::NoToast));
    assert!(dir.has_flag(ControlFlag::PrivateDir));
    assert!(!dir.has_flag(ControlFlag::Disabled));
}

#[test]
fn test_custom_flag_extension() {
    let (_tmp, dir) = test_dir();
    let dir = dir.with_flag_extension("png");
    dir.set_flag(ControlFlag::PrivateDir, true).unwrap();
    assert!(dir.path_of("private_dir.png").exists());
}

#[test]
fn test_toggle_flag() {
    let (_tmp, dir) = test_dir();
    assert!(dir.toggle_flag(ControlFlag::NoToast).unwrap());
    assert!(dir.has_flag(ControlFlag::NoToast));
    assert!(!dir.toggle_flag(ControlFlag::NoToast).unwrap());
    assert!(!dir.has_flag(ControlFlag::NoToast));
}

/// Concurrent toggles race by design; the flag just has to end up in some
/// state without either caller failing.
#[test]
fn test_concurrent_toggles_end_in_some_state() {
    let (_tmp, dir) = test_dir();
    dir.ensure_directory().unwrap();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let dir = dir.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    let _ = dir.toggle_flag(ControlFlag::Disabled);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let state = dir.has_flag(ControlFlag::Disabled);
    assert_eq!(state, dir.path_of("disable.jpg").exists());
}
