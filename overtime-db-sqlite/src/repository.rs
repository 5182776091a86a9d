use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use overtime_core::{OvertimeSettings, RepositoryError, SettingsRepository, StoredSettings};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::debug;

use crate::decimal::{decimal_to_text, get_decimal};

const ANNUAL_SALARY: &str = "annual_salary";
const TABLE_CODE: &str = "table_code";
const TAX_YEAR: &str = "tax_year";
const USE_WITHHOLDING_DISPLAY: &str = "use_withholding_display";

/// Settings stored as one `settings` row per field.
pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{}: {}", database_url, e)))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to run migrations: {}", e)))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn setting_rows(settings: &OvertimeSettings) -> [(&'static str, String); 4] {
    [
        (ANNUAL_SALARY, decimal_to_text(settings.annual_salary)),
        (TABLE_CODE, settings.table_code.to_string()),
        (TAX_YEAR, settings.tax_year.to_string()),
        (USE_WITHHOLDING_DISPLAY, settings.use_withholding_display.to_string()),
    ]
}

fn required<'r>(
    rows: &'r HashMap<String, &'r SqliteRow>,
    key: &str,
) -> Result<&'r SqliteRow, RepositoryError> {
    rows.get(key)
        .copied()
        .ok_or_else(|| RepositoryError::Database(format!("Setting '{}' is missing", key)))
}

fn get_text(
    row: &SqliteRow,
    key: &str,
) -> Result<String, RepositoryError> {
    row.try_get::<String, _>("value")
        .map_err(|e| RepositoryError::Database(format!("Failed to get '{}': {}", key, e)))
}

fn get_i32(
    row: &SqliteRow,
    key: &str,
) -> Result<i32, RepositoryError> {
    let text = get_text(row, key)?;
    text.trim().parse().map_err(|e| {
        RepositoryError::Database(format!("Invalid integer '{}' for '{}': {}", text, key, e))
    })
}

fn get_bool(
    row: &SqliteRow,
    key: &str,
) -> Result<bool, RepositoryError> {
    let text = get_text(row, key)?;
    text.trim().parse().map_err(|e| {
        RepositoryError::Database(format!("Invalid flag '{}' for '{}': {}", text, key, e))
    })
}

fn rows_to_settings(rows: &[SqliteRow]) -> Result<StoredSettings, RepositoryError> {
    if rows.is_empty() {
        return Err(RepositoryError::NotFound);
    }

    let mut by_key = HashMap::new();
    let mut updated_at: Option<DateTime<Utc>> = None;
    for row in rows {
        let key: String = row
            .try_get("key")
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        let stamp: DateTime<Utc> = row
            .try_get("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?;
        updated_at = Some(updated_at.map_or(stamp, |latest| latest.max(stamp)));
        by_key.insert(key, row);
    }

    let settings = OvertimeSettings {
        annual_salary: get_decimal(required(&by_key, ANNUAL_SALARY)?, "value")?,
        table_code: get_i32(required(&by_key, TABLE_CODE)?, TABLE_CODE)?,
        tax_year: get_i32(required(&by_key, TAX_YEAR)?, TAX_YEAR)?,
        use_withholding_display: get_bool(
            required(&by_key, USE_WITHHOLDING_DISPLAY)?,
            USE_WITHHOLDING_DISPLAY,
        )?,
    };

    Ok(StoredSettings {
        settings,
        updated_at: updated_at.unwrap_or_else(Utc::now),
    })
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepository {
    async fn load_settings(&self) -> Result<StoredSettings, RepositoryError> {
        let rows = sqlx::query("SELECT key, value, updated_at FROM settings")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows_to_settings(&rows)
    }

    async fn save_settings(
        &self,
        settings: &OvertimeSettings,
    ) -> Result<StoredSettings, RepositoryError> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        for (key, value) in setting_rows(settings) {
            sqlx::query(
                "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = excluded.updated_at",
            )
            .bind(key)
            .bind(value)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        debug!(table_code = settings.table_code, tax_year = settings.tax_year, "saved settings");

        self.load_settings().await
    }

    async fn clear_settings(&self) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM settings")
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }
}
