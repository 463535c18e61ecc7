//! Configuration: where the shared directory is, how to reach it, and the
//! camera settings written to `settings.conf`.

pub mod app_config;
pub mod camera;
pub mod defaults;
pub mod validation;

pub use app_config::{AppConfig, BackendChoice};
pub use camera::CameraSettings;
