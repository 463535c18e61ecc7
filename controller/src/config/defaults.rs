//! Camera setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Smallest output dimension accepted by `setResolution`.
pub const MIN_RESOLUTION: u32 = 1;
/// Largest output dimension accepted by `setResolution`.
pub const MAX_RESOLUTION: u32 = 4096;

pub const KEY_WIDTH: &str = "width";
pub const KEY_HEIGHT: &str = "height";
pub const KEY_FLIP: &str = "flip";
pub const KEY_AUDIO_SYNC: &str = "audio_sync";
pub const KEY_PRIVATE_DIRS: &str = "private_dirs";
/// Stamped by `refresh` so the hook module sees the file change.
pub const KEY_LAST_REFRESH: &str = "last_refresh";

type DefTuple = (&'static str, &'static str, &'static str);

const DEFS: &[DefTuple] = &[
    (KEY_WIDTH, "1920", "Output frame width in pixels"),
    (KEY_HEIGHT, "1080", "Output frame height in pixels"),
    (KEY_FLIP, "false", "Mirror frames for the front camera"),
    (KEY_AUDIO_SYNC, "false", "Keep video playback in step with audio"),
    (KEY_PRIVATE_DIRS, "false", "Use per-app media directories"),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
