use std::str::FromStr;

use async_trait::async_trait;
use overtime_core::db::{DbConfig, RepositoryFactory};
use overtime_core::{RepositoryError, SettingsRepository};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::repository::SqliteSettingsRepository;

/// Connection options for a factory connection string.
///
/// * `:memory:` or `sqlite::memory:` opens an ephemeral database.
/// * A `sqlite:` URL is passed to sqlx unchanged.
/// * Anything else is a file path, created if missing.
fn connect_options(connection_string: &str) -> Result<SqliteConnectOptions, RepositoryError> {
    match connection_string {
        ":memory:" | "sqlite::memory:" => SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| RepositoryError::Configuration(e.to_string())),
        url if url.starts_with("sqlite:") => SqliteConnectOptions::from_str(url)
            .map_err(|e| RepositoryError::Configuration(format!("{}: {}", url, e))),
        path => Ok(SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)),
    }
}

fn is_memory(connection_string: &str) -> bool {
    connection_string.contains(":memory:")
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`overtime_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use overtime_core::db::RepositoryRegistry;
/// use overtime_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens the database and runs migrations.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn SettingsRepository>, RepositoryError> {
        let options = connect_options(&config.connection_string)?;
        // every pooled connection to :memory: would be its own database
        let max_connections = if is_memory(&config.connection_string) { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                RepositoryError::Connection(format!("{}: {}", config.connection_string, e))
            })?;

        let repo = SqliteSettingsRepository::new_with_pool(pool).await;
        repo.run_migrations().await?;
        Ok(Box::new(repo))
    }
}
