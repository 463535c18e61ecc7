pub mod config;
pub mod facade;
pub mod probe;

pub use config::{AppConfig, BackendChoice, CameraSettings};
pub use facade::{ControlFacade, ControlStatus, ImportOutcome};

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::debug!("No .env file found, using system environment variables");
}

/// Load config, pick the storage backend, build the facade.
pub fn init_foundation() -> Result<(AppConfig, ControlFacade), anyhow::Error> {
    load_dotenv();

    let config = AppConfig::from_env()?;
    let backend = probe::select_backend(&config);
    let facade = ControlFacade::from_config(&config, backend);

    tracing::info!(
        dir = %config.shared_dir.display(),
        backend = facade.directory().backend_name(),
        "Controller ready"
    );
    Ok((config, facade))
}
