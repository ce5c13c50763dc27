//! Row decoding helpers for catalog queries.

use crate::{Result, error::ScanError, models::MatchRecord};
use sqlx::{Row, postgres::PgRow};

/// Extension trait for extracting typed values from rows with consistent
/// error context.
///
/// # Example
/// ```rust,ignore
/// use pgscan_core::catalog::RowExt;
///
/// let name: String = row.get_field("table_name", Some("pg_tables"))?;
/// ```
pub trait RowExt {
    /// Extracts a typed field from the row, naming the field and source on failure.
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>;
}

impl RowExt for PgRow {
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        self.try_get(field_name)
            .map_err(|e| ScanError::parse_field(field_name, table_context, e))
    }
}

impl MatchRecord {
    /// Decodes one row of a `temp_scan_results_<n>` table.
    pub fn from_row(row: &PgRow) -> Result<Self> {
        let source = Some("scan results");
        Ok(Self {
            batch_number: row.get_field("batch_number", source)?,
            table_schema: row.get_field("table_schema", source)?,
            table_name: row.get_field("table_name", source)?,
            column_name: row.get_field("column_name", source)?,
            search_value: row.get_field("search_value", source)?,
            match_count: row.get_field("match_count", source)?,
            sample_data: row.get_field("sample_data", source)?,
        })
    }
}
