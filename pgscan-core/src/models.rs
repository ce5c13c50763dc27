//! Data model shared by the catalog reader, synthesizer and emitter.
//!
//! `TableRef` and column names are snapshots of the catalog taken at
//! generation time. Batches and scripts are pure derivations recomputed on
//! every run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A discovered table, numbered by its rank in `(schema, table)` order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    /// 1-based rank in discovery order
    pub sequence_number: u32,
    /// Schema as stored in the catalog, unquoted
    pub schema_name: String,
    /// Table name as stored in the catalog, unquoted
    pub table_name: String,
}

impl TableRef {
    /// Creates a new table reference.
    pub fn new(
        sequence_number: u32,
        schema_name: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            sequence_number,
            schema_name: schema_name.into(),
            table_name: table_name.into(),
        }
    }
}

/// Unquoted `schema.table`, for messages only. Never splice into SQL.
impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema_name, self.table_name)
    }
}

/// One (column, search term) unit of scanning work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanProbe {
    /// Table holding the column
    pub table: TableRef,
    /// Column name, unquoted
    pub column: String,
    /// Substring searched for
    pub term: String,
}

/// A contiguous slice of the discovered tables rendered into one script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// 1-based, in partition order
    pub batch_id: u32,
    /// Tables in discovery order
    pub tables: Vec<TableRef>,
    /// Sequence number of the first table
    pub start_seq: u32,
    /// Sequence number of the last table
    pub end_seq: u32,
}

impl Batch {
    /// Artifact file name, e.g. `batch_001_0001_0100.sql`.
    ///
    /// The zero padding keeps names in generation order when sorted lexically.
    pub fn file_name(&self, extension: &str) -> String {
        format!(
            "batch_{:03}_{:04}_{:04}.{}",
            self.batch_id, self.start_seq, self.end_seq, extension
        )
    }
}

/// `temp_scan_results_<batch_id>`; always a plain lower-case identifier.
pub fn result_table_name(batch_id: u32) -> String {
    format!("temp_scan_results_{}", batch_id)
}

/// Rendered script for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    /// Batch the script was rendered for
    pub batch_id: u32,
    /// Full script text
    pub content: String,
}

/// A row of the batch result table, as written by an executed script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Batch whose script recorded the match
    pub batch_number: i32,
    /// Schema of the matching table
    pub table_schema: String,
    /// Matching table
    pub table_name: String,
    /// Matching column
    pub column_name: String,
    /// Search term that matched
    pub search_value: String,
    /// Rows whose column contains the term
    pub match_count: i64,
    /// Largest matching value cast to text
    pub sample_data: Option<String>,
}
