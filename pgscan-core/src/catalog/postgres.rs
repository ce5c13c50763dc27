//! PostgreSQL catalog reader.
//!
//! Tables come from `pg_catalog.pg_tables`, columns from
//! `information_schema.columns`. The pool is capped at a single connection,
//! so every catalog read runs serially on the same session.

use super::{CatalogReader, RowExt};
use crate::config::ConnectionConfig;
use crate::error::ScanError;
use crate::models::TableRef;
use crate::security::Credentials;
use crate::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

/// Schemas that never hold user tables.
const SYSTEM_SCHEMAS: &[&str] = &["pg_catalog", "information_schema"];

/// Prefix PostgreSQL reserves for its own schemas (`pg_toast`, `pg_temp_3`, ...).
const RESERVED_SCHEMA_PREFIX: &str = "pg_";

/// Returns true for schemas excluded from scanning.
///
/// # Example
/// ```rust
/// use pgscan_core::catalog::is_system_schema;
///
/// assert!(is_system_schema("pg_toast"));
/// assert!(!is_system_schema("public"));
/// ```
pub fn is_system_schema(schema: &str) -> bool {
    SYSTEM_SCHEMAS.contains(&schema) || schema.starts_with(RESERVED_SCHEMA_PREFIX)
}

/// Drops system schemas and numbers the remaining tables 1..=n in input order.
fn number_user_tables(rows: Vec<(String, String)>) -> Result<Vec<TableRef>> {
    let mut tables = Vec::with_capacity(rows.len());
    for (schema_name, table_name) in rows {
        if is_system_schema(&schema_name) {
            tracing::trace!("Skipping system table {}.{}", schema_name, table_name);
            continue;
        }
        let sequence_number = u32::try_from(tables.len() + 1).map_err(|_| {
            ScanError::configuration("table count exceeds the supported sequence range")
        })?;
        tables.push(TableRef {
            sequence_number,
            schema_name,
            table_name,
        });
    }
    Ok(tables)
}

/// Catalog reader over a single-connection PostgreSQL pool.
pub struct PgCatalog {
    pool: PgPool,
}

impl std::fmt::Debug for PgCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgCatalog")
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish()
    }
}

impl PgCatalog {
    /// Opens the catalog connection.
    ///
    /// # Security
    /// - Every session is switched to read-only transactions when
    ///   `config.read_only` is set (the default)
    /// - Credentials are handed to the driver and never logged
    ///
    /// # Errors
    /// Returns a connection error if the configuration is invalid or the
    /// server cannot be reached or rejects the login.
    pub async fn connect(config: &ConnectionConfig, credentials: &Credentials) -> Result<Self> {
        use sqlx::Executor;

        config.validate()?;

        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(credentials.username())
            .application_name(&config.application_name);
        if let Some(password) = credentials.password() {
            options = options.password(password);
        }
        if let Some(database) = &config.database {
            options = options.database(database);
        }

        let read_only = config.read_only;

        tracing::debug!("Connecting to {}", config);

        let pool = PgPoolOptions::new()
            // One connection keeps every catalog read on the same session
            .max_connections(1)
            .acquire_timeout(config.connect_timeout)
            .test_before_acquire(true)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    if read_only {
                        conn.execute("SET default_transaction_read_only = on")
                            .await?;
                    }
                    Ok(())
                })
            })
            .connect_with(options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to {}: {}", config, e);
                ScanError::connection_failed_to(config, e)
            })?;

        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Checks connectivity and access to the catalogs used for discovery.
    pub async fn test_connection(&self) -> Result<()> {
        let connectivity: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(ScanError::connection_failed)?;

        if connectivity != 1 {
            return Err(ScanError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM information_schema.columns LIMIT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ScanError::from_catalog_query("information_schema.columns", e))?;

        Ok(())
    }

    /// Closes the underlying pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl CatalogReader for PgCatalog {
    async fn list_tables(&self) -> Result<Vec<TableRef>> {
        tracing::debug!("Enumerating tables from pg_tables");

        let tables_query = r#"
            SELECT
                schemaname::text AS schema_name,
                tablename::text AS table_name
            FROM pg_catalog.pg_tables
            ORDER BY schemaname, tablename
        "#;

        let rows = sqlx::query(tables_query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to enumerate tables: {}", e);
                ScanError::from_catalog_query("pg_catalog.pg_tables", e)
            })?;

        let mut pairs = Vec::with_capacity(rows.len());
        for row in &rows {
            let schema_name: String = row.get_field("schema_name", Some("pg_tables"))?;
            let table_name: String = row.get_field("table_name", Some("pg_tables"))?;
            pairs.push((schema_name, table_name));
        }

        let tables = number_user_tables(pairs)?;
        tracing::info!("Discovered {} user tables", tables.len());
        Ok(tables)
    }

    async fn list_columns(&self, table: &TableRef) -> Result<Vec<String>> {
        let columns_query = r#"
            SELECT column_name::text AS column_name
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
        "#;

        let rows = sqlx::query(columns_query)
            .bind(&table.schema_name)
            .bind(&table.table_name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ScanError::from_catalog_query("information_schema.columns", e))?;

        let context = table.to_string();
        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            columns.push(row.get_field::<String>("column_name", Some(&context))?);
        }

        tracing::trace!("Table {} has {} columns", table, columns.len());
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(schema: &str, table: &str) -> (String, String) {
        (schema.to_string(), table.to_string())
    }

    #[test]
    fn test_system_schema_detection() {
        assert!(is_system_schema("pg_catalog"));
        assert!(is_system_schema("information_schema"));
        assert!(is_system_schema("pg_toast"));
        assert!(is_system_schema("pg_temp_3"));
        assert!(!is_system_schema("public"));
        assert!(!is_system_schema("pgx"));
        assert!(!is_system_schema("Information_Schema"));
        assert!(!is_system_schema("sales_pg_"));
    }

    #[test]
    fn test_number_user_tables_ranks_after_filtering() {
        let rows = vec![
            pair("information_schema", "sql_features"),
            pair("pg_catalog", "pg_class"),
            pair("public", "customers"),
            pair("public", "orders"),
            pair("sales", "Invoices"),
        ];

        let tables = number_user_tables(rows).unwrap();
        assert_eq!(
            tables,
            vec![
                TableRef::new(1, "public", "customers"),
                TableRef::new(2, "public", "orders"),
                TableRef::new(3, "sales", "Invoices"),
            ]
        );
    }

    #[tokio::test]
    async fn test_connect_error_names_target() {
        let config = ConnectionConfig::new("127.0.0.1".to_string())
            .with_port(1)
            .with_database("shop".to_string())
            .with_connect_timeout(std::time::Duration::from_secs(1));
        let credentials = Credentials::new("scanner".to_string(), Some("hunter2".to_string()));

        let err = PgCatalog::connect(&config, &credentials).await.unwrap_err();
        let message = err.to_string();

        assert!(matches!(err, ScanError::Connection { .. }));
        assert!(message.contains("127.0.0.1:1/shop"), "{}", message);
        assert!(!message.contains("hunter2"));
    }

    #[test]
    fn test_number_user_tables_empty() {
        let tables = number_user_tables(vec![pair("pg_catalog", "pg_class")]).unwrap();
        assert!(tables.is_empty());
    }
}
