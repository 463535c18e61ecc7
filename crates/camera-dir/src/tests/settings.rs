use std::fs;

use super::test_dir;
use crate::{SETTINGS_FILE, Settings, StoreError};

fn map(entries: &[(&str, &str)]) -> Settings {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_settings_round_trip() {
    let (_tmp, dir) = test_dir();
    let settings = map(&[("width", "1920"), ("height", "1080")]);
    dir.save_settings(&settings).unwrap();
    assert_eq!(dir.load_settings(), settings);
}

#[test]
fn test_missing_settings_file_is_empty() {
    let (_tmp, dir) = test_dir();
    assert!(dir.load_settings().is_empty());
}

#[test]
fn test_save_overwrites_without_merge() {
    let (_tmp, dir) = test_dir();
    dir.save_settings(&map(&[("width", "1920"), ("flip_front_camera", "true")]))
        .unwrap();
    dir.save_settings(&map(&[("height", "720")])).unwrap();
    assert_eq!(dir.load_settings(), map(&[("height", "720")]));
}

#[test]
fn test_load_skips_lines_without_separator() {
    let (_tmp, dir) = test_dir();
    dir.ensure_directory().unwrap();
    fs::write(
        dir.path_of(SETTINGS_FILE),
        "width=1280\nthis line is junk\nheight=720\n",
    )
    .unwrap();
    assert_eq!(
        dir.load_settings(),
        map(&[("width", "1280"), ("height", "720")])
    );
}

#[test]
fn test_update_settings_merges() {
    let (_tmp, dir) = test_dir();
    dir.save_settings(&map(&[("width", "1920"), ("flip_front_camera", "true")]))
        .unwrap();
    dir.update_settings(|s| {
        s.insert("width".into(), "640".into());
    })
    .unwrap();
    assert_eq!(
        dir.load_settings(),
        map(&[("width", "640"), ("flip_front_camera", "true")])
    );
}

#[test]
fn test_invalid_entry_leaves_file_untouched() {
    let (_tmp, dir) = test_dir();
    let good = map(&[("width", "1920")]);
    dir.save_settings(&good).unwrap();

    let err = dir.save_settings(&map(&[("bad=key", "1")])).unwrap_err();
    assert!(matches!(err, StoreError::InvalidSettings(_)));
    assert_eq!(dir.load_settings(), good);
}

#[test]
fn test_padded_value_is_refused() {
    let (_tmp, dir) = test_dir();
    let good = map(&[("name", "front")]);
    dir.save_settings(&good).unwrap();

    let err = dir.save_settings(&map(&[("name", " padded ")])).unwrap_err();
    assert!(matches!(err, StoreError::InvalidSettings(_)));
    assert_eq!(dir.load_settings(), good);
}
