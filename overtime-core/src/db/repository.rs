use async_trait::async_trait;
use thiserror::Error;

use crate::models::{OvertimeSettings, StoredSettings};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Persistence for the user's [`OvertimeSettings`].
///
/// Only one settings record exists per store. Saving replaces it.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Returns [`RepositoryError::NotFound`] when nothing has been saved yet.
    async fn load_settings(&self) -> Result<StoredSettings, RepositoryError>;

    async fn save_settings(
        &self,
        settings: &OvertimeSettings,
    ) -> Result<StoredSettings, RepositoryError>;

    /// Removes the stored record. Clearing an empty store is not an error.
    async fn clear_settings(&self) -> Result<(), RepositoryError>;
}
