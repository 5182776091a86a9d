use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use super::repository::{RepositoryError, SettingsRepository};

/// Which settings store to open.
///
/// `backend` must match the [`RepositoryFactory::backend_name`] of a
/// registered factory. `connection_string` is handed to that factory as is.
///
/// | backend    | connection_string examples             |
/// |------------|----------------------------------------|
/// | `sqlite`   | `overtime.db`, `sqlite::memory:`       |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"sqlite"`).
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "overtime.db".to_string(),
        }
    }
}

/// One implementation per storage backend, registered with a
/// [`RepositoryRegistry`] at start-up.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Opens (or creates) the store and returns a ready repository.
    /// Implementations may run migrations here.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn SettingsRepository>, RepositoryError>;
}

/// [`RepositoryFactory`] instances keyed by backend name.
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers a backend factory, replacing any previous one with the same
    /// name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens a repository through the factory matching `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] if no factory is registered for
    ///   the requested backend.
    /// * Any error the chosen factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn SettingsRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        debug!(backend = %config.backend, "opening settings store");
        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use crate::models::{OvertimeSettings, StoredSettings};

    use super::{
        DbConfig, RepositoryError, RepositoryFactory, RepositoryRegistry, SettingsRepository,
    };

    // =========================================================================
    // test doubles
    // =========================================================================

    #[derive(Default)]
    struct MemoryRepository {
        stored: Mutex<Option<StoredSettings>>,
    }

    #[async_trait]
    impl SettingsRepository for MemoryRepository {
        async fn load_settings(&self) -> Result<StoredSettings, RepositoryError> {
            self.stored
                .lock()
                .map_err(|e| RepositoryError::Database(e.to_string()))?
                .clone()
                .ok_or(RepositoryError::NotFound)
        }

        async fn save_settings(
            &self,
            settings: &OvertimeSettings,
        ) -> Result<StoredSettings, RepositoryError> {
            let stored = StoredSettings {
                settings: settings.clone(),
                updated_at: Utc::now(),
            };
            *self
                .stored
                .lock()
                .map_err(|e| RepositoryError::Database(e.to_string()))? = Some(stored.clone());
            Ok(stored)
        }

        async fn clear_settings(&self) -> Result<(), RepositoryError> {
            *self
                .stored
                .lock()
                .map_err(|e| RepositoryError::Database(e.to_string()))? = None;
            Ok(())
        }
    }

    /// Flips `called` when `create` runs so tests can prove dispatch.
    struct MemoryFactory {
        name: &'static str,
        called: Arc<AtomicBool>,
    }

    #[async_trait]
    impl RepositoryFactory for MemoryFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }

        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn SettingsRepository>, RepositoryError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(Box::new(MemoryRepository::default()))
        }
    }

    struct FailingFactory;

    #[async_trait]
    impl RepositoryFactory for FailingFactory {
        fn backend_name(&self) -> &'static str {
            "failing"
        }

        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn SettingsRepository>, RepositoryError> {
            Err(RepositoryError::Connection("intentional failure".to_string()))
        }
    }

    fn memory_factory(name: &'static str) -> (Box<dyn RepositoryFactory>, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (
            Box::new(MemoryFactory {
                name,
                called: flag.clone(),
            }),
            flag,
        )
    }

    fn config(backend: &str) -> DbConfig {
        DbConfig {
            backend: backend.to_string(),
            connection_string: "x".to_string(),
        }
    }

    fn sample_settings() -> OvertimeSettings {
        OvertimeSettings {
            annual_salary: dec!(650000),
            table_code: 8115,
            tax_year: 2026,
            use_withholding_display: true,
        }
    }

    // =========================================================================
    // DbConfig / registration
    // =========================================================================

    #[test]
    fn dbconfig_default_is_sqlite_file() {
        let cfg = DbConfig::default();
        assert_eq!(cfg.backend, "sqlite");
        assert_eq!(cfg.connection_string, "overtime.db");
    }

    #[test]
    fn new_registry_has_no_backends() {
        assert!(RepositoryRegistry::new().available_backends().is_empty());
    }

    #[test]
    fn available_backends_is_sorted() {
        let mut reg = RepositoryRegistry::new();
        let (f1, _) = memory_factory("sqlite");
        let (f2, _) = memory_factory("memory");
        reg.register(f1);
        reg.register(f2);
        assert_eq!(reg.available_backends(), vec!["memory", "sqlite"]);
    }

    #[test]
    fn duplicate_registration_replaces_previous() {
        let mut reg = RepositoryRegistry::new();
        let (old, _) = memory_factory("sqlite");
        let (new, _) = memory_factory("sqlite");
        reg.register(old);
        reg.register(new);
        assert_eq!(reg.available_backends(), vec!["sqlite"]);
    }

    // =========================================================================
    // dispatch
    // =========================================================================

    #[tokio::test]
    async fn create_calls_only_matching_factory() {
        let mut reg = RepositoryRegistry::new();
        let (sqlite, sqlite_called) = memory_factory("sqlite");
        let (memory, memory_called) = memory_factory("memory");
        reg.register(sqlite);
        reg.register(memory);

        let result = reg.create(&config("sqlite")).await;

        assert!(result.is_ok(), "expected Ok, got {:#?}", result.err());
        assert!(sqlite_called.load(Ordering::SeqCst));
        assert!(!memory_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn configuration_error_names_requested_and_available_backends() {
        let mut reg = RepositoryRegistry::new();
        let (f, _) = memory_factory("sqlite");
        reg.register(f);

        match reg.create(&config("postgres")).await {
            Err(RepositoryError::Configuration(msg)) => {
                assert!(msg.contains("postgres"));
                assert!(msg.contains("sqlite"));
            }
            Err(other) => panic!("expected Configuration error, got {other:#?}"),
            Ok(_) => panic!("expected Configuration error, got a repository"),
        }
    }

    #[tokio::test]
    async fn create_propagates_factory_error() {
        let mut reg = RepositoryRegistry::new();
        reg.register(Box::new(FailingFactory));

        let result = reg.create(&config("failing")).await;

        assert!(matches!(
            result,
            Err(RepositoryError::Connection(msg)) if msg == "intentional failure"
        ));
    }

    // =========================================================================
    // repository contract through the trait object
    // =========================================================================

    #[tokio::test]
    async fn load_before_save_is_not_found() {
        let mut reg = RepositoryRegistry::new();
        let (f, _) = memory_factory("memory");
        reg.register(f);
        let repo = reg.create(&config("memory")).await.unwrap();

        assert_eq!(repo.load_settings().await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn save_then_load_then_clear() {
        let mut reg = RepositoryRegistry::new();
        let (f, _) = memory_factory("memory");
        reg.register(f);
        let repo = reg.create(&config("memory")).await.unwrap();

        let saved = repo.save_settings(&sample_settings()).await.unwrap();
        let loaded = repo.load_settings().await.unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.settings, sample_settings());

        repo.clear_settings().await.unwrap();
        assert_eq!(repo.load_settings().await, Err(RepositoryError::NotFound));
    }
}
