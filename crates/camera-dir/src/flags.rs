//! Control flags: booleans encoded as the presence of an empty file.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{SharedDirectory, StoreError};

/// A presence flag read by the hook module.
///
/// `Disabled` has inverted polarity: no file means the feature is on, so a
/// fresh directory is enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlFlag {
    Disabled,
    NoToast,
    PrivateDir,
}

impl ControlFlag {
    pub const ALL: [ControlFlag; 3] = [
        ControlFlag::Disabled,
        ControlFlag::NoToast,
        ControlFlag::PrivateDir,
    ];

    /// File stem in the shared directory.
    pub fn stem(self) -> &'static str {
        match self {
            ControlFlag::Disabled => "disable",
            ControlFlag::NoToast => "no_toast",
            ControlFlag::PrivateDir => "private_dir",
        }
    }

    pub fn file_name(self, extension: &str) -> String {
        format!("{}.{extension}", self.stem())
    }
}

impl fmt::Display for ControlFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

impl FromStr for ControlFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "disable" | "disabled" => Ok(ControlFlag::Disabled),
            "no_toast" => Ok(ControlFlag::NoToast),
            "private_dir" | "private_dirs" | "private_directories" => Ok(ControlFlag::PrivateDir),
            other => Err(format!("unknown flag: {other}")),
        }
    }
}

impl SharedDirectory {
    pub fn flag_path(&self, flag: ControlFlag) -> PathBuf {
        self.path_of(&flag.file_name(&self.flag_extension))
    }

    /// Create or delete the flag file. A no-op when already in that state.
    pub fn set_flag(&self, flag: ControlFlag, present: bool) -> Result<(), StoreError> {
        self.ensure_directory()?;
        let path = self.flag_path(flag);
        if self.probe(&path) == present {
            return Ok(());
        }
        let result = if present {
            self.backend.touch(&path)
        } else {
            self.backend.remove(&path)
        };
        result.map_err(StoreError::from_write)?;
        info!(flag = %flag, present, "Control flag updated");
        Ok(())
    }

    /// Pure existence check.
    pub fn has_flag(&self, flag: ControlFlag) -> bool {
        self.probe(&self.flag_path(flag))
    }

    /// Flip the flag and return its new state.
    ///
    /// Read-then-write with no locking: two concurrent togglers can both read
    /// the same state and leave the flag either way. The hook module only
    /// polls, so a lock here would not be visible to it anyway.
    pub fn toggle_flag(&self, flag: ControlFlag) -> Result<bool, StoreError> {
        let next = !self.has_flag(flag);
        self.set_flag(flag, next)?;
        Ok(next)
    }
}
