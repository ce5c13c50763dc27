//! Core library for pgscan.
//!
//! Generates batched psql scripts that search every column of every user
//! table in a PostgreSQL database for a fixed set of substrings. The library
//! only reads the catalog; the generated scripts do the scanning when an
//! operator runs them.
//!
//! # Security Guarantees
//! - No credentials stored or logged in any data structures
//! - Catalog sessions are opened read-only
//! - Catalog-derived names and search terms reach generated SQL only as
//!   quoted literals or through `format('%I')` / `format('%L')`
//!
//! # Architecture
//! - [`catalog`] reads tables and columns behind the [`CatalogReader`] trait
//! - [`partition`] splits the table list into fixed-size batches
//! - [`synth`] turns a table's columns into isolated scan probes
//! - [`template`] substitutes one batch into the script template
//! - [`emitter`] drives the pipeline and writes one file per batch

pub mod catalog;
pub mod config;
pub mod emitter;
pub mod error;
pub mod logging;
pub mod models;
pub mod partition;
pub mod security;
pub mod synth;
pub mod template;

// Re-export commonly used types
pub use catalog::{CatalogReader, PgCatalog};
pub use config::{ConnectionConfig, ScanConfig};
pub use emitter::{BatchEmitter, EmittedBatch, GenerationPlan, GenerationReport};
pub use error::{Result, ScanError};
pub use models::{Batch, MatchRecord, ScanProbe, Script, TableRef};
pub use synth::ScanSynthesizer;
pub use template::{ScriptTemplate, TemplateSource};
