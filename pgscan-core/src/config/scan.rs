//! Scan generation configuration.
//!
//! Holds the knobs that drive batch generation: how many tables go into a
//! script, which substrings the probes look for, and where the scripts land.

use crate::{Result, error::ScanError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of tables per generated script.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Default search terms ("order" and "delivery note").
pub const DEFAULT_SEARCH_TERMS: &[&str] = &["訂單", "出貨單"];

/// Default report display length for sample values.
pub const DEFAULT_SAMPLE_DISPLAY_LENGTH: u32 = 100;

/// Configuration for scan script generation.
///
/// # Example
/// ```rust
/// use pgscan_core::ScanConfig;
///
/// let config = ScanConfig::new()
///     .with_batch_size(50)
///     .with_search_terms(vec!["invoice".to_string()]);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.batch_size, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum number of tables per script
    pub batch_size: usize,
    /// Substrings every column is probed for, in probe order
    pub search_terms: Vec<String>,
    /// Directory the scripts are written to
    pub output_dir: PathBuf,
    /// File extension of the scripts, without the dot
    pub file_extension: String,
    /// External script template; the built-in one is used when absent
    pub template_path: Option<PathBuf>,
    /// Characters of `sample_data` shown in the match report
    pub sample_display_length: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            search_terms: DEFAULT_SEARCH_TERMS
                .iter()
                .map(|term| (*term).to_string())
                .collect(),
            output_dir: PathBuf::from("./batches"),
            file_extension: "sql".to_string(),
            template_path: None,
            sample_display_length: DEFAULT_SAMPLE_DISPLAY_LENGTH,
        }
    }
}

impl ScanConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file. Missing keys take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ScanError::io(format!("Failed to read config {}", path.display()), e)
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| ScanError::Serialization {
            context: format!("Invalid config file {}", path.display()),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Replaces the search terms.
    pub fn with_search_terms(mut self, search_terms: Vec<String>) -> Self {
        self.search_terms = search_terms;
        self
    }

    /// Sets the output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Sets the script file extension.
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    /// Sets an external template path.
    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    /// Sets the sample display length used by the match report.
    pub fn with_sample_display_length(mut self, length: u32) -> Self {
        self.sample_display_length = length;
        self
    }

    /// Validates configuration values.
    ///
    /// # Errors
    /// Returns a configuration error for a zero batch size, an empty or
    /// blank search term list, duplicate terms, or a malformed extension.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ScanError::configuration(
                "batch_size must be greater than 0",
            ));
        }

        if self.search_terms.is_empty() {
            return Err(ScanError::configuration(
                "at least one search term is required",
            ));
        }

        // An empty term would match every non-null value
        if self.search_terms.iter().any(|term| term.is_empty()) {
            return Err(ScanError::configuration("search terms cannot be empty"));
        }

        for (index, term) in self.search_terms.iter().enumerate() {
            if self.search_terms[..index].contains(term) {
                return Err(ScanError::configuration(format!(
                    "duplicate search term '{}'",
                    term
                )));
            }
        }

        if self.file_extension.is_empty()
            || !self
                .file_extension
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ScanError::configuration(
                "file_extension must be non-empty and alphanumeric",
            ));
        }

        if self.sample_display_length == 0 {
            return Err(ScanError::configuration(
                "sample_display_length must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.search_terms, vec!["訂單", "出貨單"]);
        assert_eq!(config.output_dir, PathBuf::from("./batches"));
        assert_eq!(config.file_extension, "sql");
        assert!(config.template_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(ScanConfig::new().with_batch_size(0).validate().is_err());
        assert!(ScanConfig::new().with_search_terms(vec![]).validate().is_err());
        assert!(
            ScanConfig::new()
                .with_search_terms(vec!["a".to_string(), String::new()])
                .validate()
                .is_err()
        );
        assert!(
            ScanConfig::new()
                .with_search_terms(vec!["a".to_string(), "a".to_string()])
                .validate()
                .is_err()
        );
        assert!(ScanConfig::new().with_file_extension("").validate().is_err());
        assert!(ScanConfig::new().with_file_extension("s/ql").validate().is_err());
        assert!(
            ScanConfig::new()
                .with_sample_display_length(0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_from_json_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"batch_size": 25, "search_terms": ["50%", "a_b"]}}"#).unwrap();

        let config = ScanConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.search_terms, vec!["50%", "a_b"]);
        assert_eq!(config.file_extension, "sql");
        assert_eq!(config.sample_display_length, 100);
    }

    #[test]
    fn test_from_json_file_rejects_invalid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"batch_size": 0}}"#).unwrap();
        let err = ScanConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ScanError::Configuration { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = ScanConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ScanError::Serialization { .. }));
    }

    #[test]
    fn test_from_json_file_missing_file() {
        let err = ScanConfig::from_json_file(Path::new("/nonexistent/pgscan.json")).unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
    }
}
