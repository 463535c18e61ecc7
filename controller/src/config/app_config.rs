//! Runtime configuration loaded from the environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use camera_dir::{DEFAULT_FLAG_EXTENSION, ReplaceMode};

/// Default shared directory polled by the hook module.
pub const DEFAULT_SHARED_DIR: &str = "/sdcard/DCIM/Camera1";
/// Default elevated helper, invoked as `su -c '<command>'`.
pub const DEFAULT_SHELL_PROGRAM: &str = "su";

/// Which storage backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendChoice {
    /// Probe direct access at startup, fall back to the shell.
    #[default]
    Auto,
    Direct,
    Shell,
}

impl FromStr for BackendChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(BackendChoice::Auto),
            "direct" => Ok(BackendChoice::Direct),
            "shell" | "su" | "privileged-shell" => Ok(BackendChoice::Shell),
            other => anyhow::bail!("unknown backend: {other} (expected auto, direct or shell)"),
        }
    }
}

impl fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendChoice::Auto => "auto",
            BackendChoice::Direct => "direct",
            BackendChoice::Shell => "shell",
        })
    }
}

/// Runtime configuration for the controller.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub shared_dir: PathBuf,
    pub backend: BackendChoice,
    pub shell_program: String,
    /// `None` waits forever on the elevated helper.
    pub shell_timeout: Option<Duration>,
    pub flag_extension: String,
    pub replace_mode: ReplaceMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            shared_dir: PathBuf::from(DEFAULT_SHARED_DIR),
            backend: BackendChoice::Auto,
            shell_program: DEFAULT_SHELL_PROGRAM.into(),
            shell_timeout: None,
            flag_extension: DEFAULT_FLAG_EXTENSION.into(),
            replace_mode: ReplaceMode::DeleteThenWrite,
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::load(|key| std::env::var(key).ok())
    }

    /// Load configuration through a key lookup. Empty values count as unset.
    pub fn load(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let g = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let backend = match g("FAKECAM_BACKEND") {
            Some(v) => v.parse()?,
            None => defaults.backend,
        };

        let shell_timeout = match g("FAKECAM_SHELL_TIMEOUT_SECS") {
            Some(v) => {
                let secs: u64 = v
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("FAKECAM_SHELL_TIMEOUT_SECS must be an integer: {v}"))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        let replace_mode = match g("FAKECAM_REPLACE_MODE").as_deref().map(str::trim) {
            None | Some("delete-then-write") => ReplaceMode::DeleteThenWrite,
            Some("staged") => ReplaceMode::Staged,
            Some(other) => anyhow::bail!("unknown replace mode: {other}"),
        };

        let flag_extension = g("FAKECAM_FLAG_EXT")
            .map(|v| v.trim().trim_start_matches('.').to_string())
            .unwrap_or(defaults.flag_extension);

        Ok(Self {
            shared_dir: g("FAKECAM_SHARED_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.shared_dir),
            backend,
            shell_program: g("FAKECAM_SHELL_PROGRAM").unwrap_or(defaults.shell_program),
            shell_timeout,
            flag_extension,
            replace_mode,
        })
    }
}
