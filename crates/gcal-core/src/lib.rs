pub mod config;
pub mod error;

pub use config::{
    AccountConfig, Config, EventsConfig, ServiceConfig, ValidationResult, EMAIL_ENV, PASSWORD_ENV,
};
pub use error::{AppError, AuthError, CalendarApiError, ConfigError, NetworkError, ReqwestErrorExt};

use anyhow::Result;

/// Initialize logging
///
/// Filter comes from `RUST_LOG`, defaulting to `info`. Output goes to stderr
/// so command output on stdout stays machine-readable.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    tracing::debug!("gcal core initialized");
    Ok(())
}
