//! Typed view of the camera entries in `settings.conf`.

use camera_dir::Settings;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::defaults::{
    KEY_AUDIO_SYNC, KEY_FLIP, KEY_HEIGHT, KEY_PRIVATE_DIRS, KEY_WIDTH, get_default,
};
use super::validation::validate_setting;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSettings {
    pub width: u32,
    pub height: u32,
    pub flip_front_camera: bool,
    pub audio_sync: bool,
    pub private_dirs: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            flip_front_camera: false,
            audio_sync: false,
            private_dirs: false,
        }
    }
}

impl CameraSettings {
    /// Read from a settings map. Missing or invalid entries fall back to defaults.
    pub fn from_map(map: &Settings) -> Self {
        let g = |key: &str| -> String {
            match map.get(key) {
                Some(v) if validate_setting(key, v).is_ok() => v.trim().to_string(),
                Some(v) => {
                    debug!(key, value = %v, "Ignoring invalid camera setting");
                    get_default(key).unwrap_or_default().to_string()
                }
                None => get_default(key).unwrap_or_default().to_string(),
            }
        };
        let defaults = Self::default();

        Self {
            width: g(KEY_WIDTH).parse().unwrap_or(defaults.width),
            height: g(KEY_HEIGHT).parse().unwrap_or(defaults.height),
            flip_front_camera: g(KEY_FLIP) == "true",
            audio_sync: g(KEY_AUDIO_SYNC) == "true",
            private_dirs: g(KEY_PRIVATE_DIRS) == "true",
        }
    }

    pub fn to_map(&self) -> Settings {
        [
            (KEY_WIDTH, self.width.to_string()),
            (KEY_HEIGHT, self.height.to_string()),
            (KEY_FLIP, self.flip_front_camera.to_string()),
            (KEY_AUDIO_SYNC, self.audio_sync.to_string()),
            (KEY_PRIVATE_DIRS, self.private_dirs.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// Check every entry against the setting rules.
    pub fn validate(&self) -> Result<(), String> {
        for (key, value) in self.to_map() {
            validate_setting(&key, &value).map_err(|e| format!("{key}: {e}"))?;
        }
        Ok(())
    }
}
