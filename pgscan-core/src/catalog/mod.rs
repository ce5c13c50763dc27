//! Catalog discovery: which tables exist and which columns they have.
//!
//! The [`CatalogReader`] trait is the seam between the generator and the
//! database. [`PgCatalog`] implements it against PostgreSQL system catalogs;
//! tests substitute an in-memory catalog.
//!
//! # Security Guarantees
//! - All catalog operations are read-only
//! - Credentials are never stored or logged

mod helpers;
mod postgres;

use crate::{Result, models::TableRef};
use async_trait::async_trait;

pub use helpers::RowExt;
pub use postgres::{PgCatalog, is_system_schema};

/// Read access to the catalog of the database being scanned.
///
/// # Object Safety
/// The trait is object-safe so the emitter can hold a `&dyn CatalogReader`.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Lists every user table ordered by `(schema_name, table_name)`, with
    /// `sequence_number` set to the 1-based rank in that order.
    ///
    /// # Errors
    /// Any failure here is fatal for the run.
    async fn list_tables(&self) -> Result<Vec<TableRef>>;

    /// Lists the table's column names in ordinal order.
    ///
    /// An empty list means the table vanished or is not visible. Callers
    /// treat an error the same way: skip the table and keep going.
    async fn list_columns(&self, table: &TableRef) -> Result<Vec<String>>;
}
