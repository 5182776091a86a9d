use std::str::FromStr;

use overtime_core::RepositoryError;
use rust_decimal::Decimal;
use sqlx::{Row, TypeInfo, ValueRef};

/// Get a decimal value from a row.
///
/// TEXT is parsed exactly. INTEGER and REAL are accepted for rows written by
/// hand with numeric literals.
pub fn get_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    let type_info = value_ref.type_info();
    let type_name = type_info.name();

    match type_name {
        "TEXT" => {
            let val: String = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get TEXT from '{}': {}", column, e))
            })?;
            parse_decimal(column, &val)
        }
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to get INTEGER from '{}': {}",
                    column, e
                ))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Parse a stored decimal string, naming `field` in the error.
pub fn parse_decimal(
    field: &str,
    value: &str,
) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(value.trim()).map_err(|e| {
        RepositoryError::Database(format!("Invalid decimal '{}' for '{}': {}", value, field, e))
    })
}

/// Canonical text form for storage; trailing zeros are dropped.
pub fn decimal_to_text(d: Decimal) -> String {
    d.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn setup_test_db() -> sqlx::sqlite::SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query(
            "CREATE TABLE test_decimals (
                id INTEGER PRIMARY KEY,
                int_value INTEGER,
                real_value REAL,
                text_value TEXT,
                blob_value BLOB
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");
        pool
    }

    async fn fetch(
        pool: &sqlx::sqlite::SqlitePool,
        insert: &str,
        column: &str,
    ) -> Result<Decimal, RepositoryError> {
        sqlx::query(insert)
            .execute(pool)
            .await
            .expect("Failed to insert test data");
        let row = sqlx::query(&format!("SELECT {column} FROM test_decimals WHERE id = 1"))
            .fetch_one(pool)
            .await
            .expect("Failed to fetch row");
        get_decimal(&row, column)
    }

    #[tokio::test]
    async fn test_get_decimal_from_text_is_exact() {
        let pool = setup_test_db().await;

        let result = fetch(
            &pool,
            "INSERT INTO test_decimals (id, text_value) VALUES (1, '123456.789012345678')",
            "text_value",
        )
        .await;

        assert_eq!(result, Ok(dec!(123456.789012345678)));
    }

    #[tokio::test]
    async fn test_get_decimal_from_integer() {
        let pool = setup_test_db().await;

        let result = fetch(
            &pool,
            "INSERT INTO test_decimals (id, int_value) VALUES (1, 650000)",
            "int_value",
        )
        .await;

        assert_eq!(result, Ok(dec!(650000)));
    }

    #[tokio::test]
    async fn test_get_decimal_from_real() {
        let pool = setup_test_db().await;

        let result = fetch(
            &pool,
            "INSERT INTO test_decimals (id, real_value) VALUES (1, 123.45)",
            "real_value",
        )
        .await;

        assert_eq!(result, Ok(dec!(123.45)));
    }

    #[tokio::test]
    async fn test_get_decimal_from_bad_text() {
        let pool = setup_test_db().await;

        let result = fetch(
            &pool,
            "INSERT INTO test_decimals (id, text_value) VALUES (1, 'not a number')",
            "text_value",
        )
        .await;

        assert!(matches!(result, Err(RepositoryError::Database(msg)) if msg.contains("not a number")));
    }

    #[tokio::test]
    async fn test_get_decimal_unexpected_type() {
        let pool = setup_test_db().await;

        let result = fetch(
            &pool,
            "INSERT INTO test_decimals (id, blob_value) VALUES (1, x'0102')",
            "blob_value",
        )
        .await;

        assert!(matches!(result, Err(RepositoryError::Database(msg)) if msg.starts_with("Unexpected type 'BLOB'")));
    }

    #[test]
    fn test_decimal_to_text_is_canonical() {
        assert_eq!(decimal_to_text(dec!(650000.00)), "650000");
        assert_eq!(decimal_to_text(dec!(7.50)), "7.5");
    }

    #[test]
    fn test_parse_decimal_names_field() {
        let err = parse_decimal("annual_salary", "x").unwrap_err();

        assert!(matches!(err, RepositoryError::Database(msg) if msg.contains("annual_salary")));
    }
}
