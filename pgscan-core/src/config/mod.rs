//! Configuration types.
//!
//! - `ScanConfig`: batch size, search terms, output location, template
//! - `ConnectionConfig`: catalog connection settings
//!
//! # Security
//! These structs intentionally do NOT store passwords or credentials.

mod connection;
mod scan;

pub use connection::ConnectionConfig;
pub use scan::{
    DEFAULT_BATCH_SIZE, DEFAULT_SAMPLE_DISPLAY_LENGTH, DEFAULT_SEARCH_TERMS, ScanConfig,
};
