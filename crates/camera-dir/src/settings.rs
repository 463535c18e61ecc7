//! `settings.conf`: one `key=value` per line, rewritten whole on every save.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::{SETTINGS_FILE, SharedDirectory, StoreError};

pub type Settings = HashMap<String, String>;

/// Encode settings, sorted by key so repeated saves produce identical files.
pub fn encode_settings(settings: &Settings) -> String {
    let mut entries: Vec<_> = settings.iter().collect();
    entries.sort();
    entries
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode settings. Lines without `=` or with an empty key are skipped;
/// keys and values are trimmed; a later duplicate key wins.
pub fn decode_settings(text: &str) -> Settings {
    text.lines()
        .filter_map(|line| {
            let Some((key, value)) = line.split_once('=') else {
                if !line.trim().is_empty() {
                    debug!(line, "Skipping malformed settings line");
                }
                return None;
            };
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Reject entries that cannot survive an encode/decode round trip.
pub fn check_entry(key: &str, value: &str) -> Result<(), String> {
    if key.trim().is_empty() {
        return Err("empty key".into());
    }
    if key.trim() != key {
        return Err(format!("key {key:?} has surrounding whitespace"));
    }
    if key.contains(['=', '\n', '\r']) {
        return Err(format!("key {key:?} contains '=' or a line break"));
    }
    if value.contains(['\n', '\r']) {
        return Err(format!("value for {key:?} contains a line break"));
    }
    if value.trim() != value {
        return Err(format!("value for {key:?} has surrounding whitespace"));
    }
    Ok(())
}

impl SharedDirectory {
    /// Overwrite `settings.conf` with exactly `settings`. No merging.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        for (key, value) in settings {
            check_entry(key, value).map_err(StoreError::InvalidSettings)?;
        }
        self.ensure_directory()?;
        let path = self.path_of(SETTINGS_FILE);
        self.backend
            .write_file(&path, encode_settings(settings).as_bytes())
            .map_err(StoreError::from_write)?;
        info!(entries = settings.len(), "Settings saved");
        Ok(())
    }

    /// Parse `settings.conf`. Missing or unreadable files read as empty.
    pub fn load_settings(&self) -> Settings {
        let path = self.path_of(SETTINGS_FILE);
        match self.backend.read_file(&path) {
            Ok(Some(bytes)) => decode_settings(&String::from_utf8_lossy(&bytes)),
            Ok(None) => Settings::new(),
            Err(e) => {
                warn!(path = %path.display(), "Failed to read settings: {e}");
                Settings::new()
            }
        }
    }

    /// Load, apply `update`, save. Not atomic against other writers.
    pub fn update_settings(&self, update: impl FnOnce(&mut Settings)) -> Result<(), StoreError> {
        let mut settings = self.load_settings();
        update(&mut settings);
        self.save_settings(&settings)
    }
}
