//! Setting value validation.

use super::defaults::{
    KEY_AUDIO_SYNC, KEY_FLIP, KEY_HEIGHT, KEY_LAST_REFRESH, KEY_PRIVATE_DIRS, KEY_WIDTH,
    MAX_RESOLUTION, MIN_RESOLUTION,
};

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
/// Keys this controller does not know about are passed through.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        KEY_WIDTH | KEY_HEIGHT => validate_int_range(value, MIN_RESOLUTION, MAX_RESOLUTION)?,
        KEY_LAST_REFRESH => {
            value.parse::<i64>().map_err(|_| "must be a timestamp in milliseconds")?;
        }
        k if is_boolean_setting(k) => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        _ => {}
    }
    Ok(())
}

/// Range check shared with `setResolution`.
pub fn resolution_in_range(value: i64) -> bool {
    (i64::from(MIN_RESOLUTION)..=i64::from(MAX_RESOLUTION)).contains(&value)
}

fn validate_int_range(value: &str, min: u32, max: u32) -> Result<(), String> {
    let v: i64 = value.trim().parse().map_err(|_| "must be an integer")?;
    if v < i64::from(min) || v > i64::from(max) {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

fn is_boolean_setting(key: &str) -> bool {
    matches!(key, KEY_FLIP | KEY_AUDIO_SYNC | KEY_PRIVATE_DIRS)
}
