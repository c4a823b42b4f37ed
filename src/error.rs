use thiserror::Error;

use crate::config::SettingsError;
use crate::orchestrator::RunError;
use crate::services::MessengerError;

/// Any failure that ends the process with a non-zero exit code
#[derive(Debug, Error)]
pub enum CoffeeError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Cannot create Slack client: {0}")]
    Client(#[from] MessengerError),

    #[error(transparent)]
    Run(#[from] RunError),
}
