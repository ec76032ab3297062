// errors.rs
use crate::config::ConfigError;
use crate::domain::layout::ApplyError;
use crate::domain::reconcile::ReconcileError;
use crate::domain::store::StoreError;
use crate::source::{FetchError, ParseError};

/// Everything a run can fail with. Variants before `Apply` are raised before
/// the store is touched.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to retrieve Airbnb reservations. {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Airbnb sent reservation {0} twice; nothing was changed")]
    DuplicateKey(String),
    #[error("Error updating reservations: {0}")]
    Apply(#[from] ApplyError),
    #[error("Database error: {0}")]
    Db(String),
    #[error("Another sync is already running ({0})")]
    Locked(String),
    #[error("Export failed: {0}")]
    Export(String),
}

impl From<ReconcileError> for SyncError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::DuplicateKey(code) => SyncError::DuplicateKey(code),
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        SyncError::Db(err.0)
    }
}

impl From<rusqlite::Error> for SyncError {
    fn from(err: rusqlite::Error) -> Self {
        SyncError::Db(err.to_string())
    }
}
