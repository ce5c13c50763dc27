//! Script templates and placeholder substitution.
//!
//! A template is plain psql text containing `{NAME}` placeholders.
//! Substitution is a single left-to-right pass: every occurrence of a known
//! placeholder is replaced, unknown braces are copied through, and replaced
//! values are never scanned again. A table named `{BATCH_NUMBER}` therefore
//! reaches the script untouched.

use crate::models::{Batch, Script};
use crate::{Result, error::ScanError};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Placeholders understood by [`ScriptTemplate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// Batch id; also names the batch's result table
    BatchNumber,
    /// Sequence number of the batch's first table
    StartSeq,
    /// Sequence number of the batch's last table
    EndSeq,
    /// Generation time
    Timestamp,
    /// Concatenated table scan blocks
    TableScanBlocks,
    /// Tables that survived column introspection
    TableCount,
    /// Display length for sample values in the match report
    SampleLength,
}

impl Placeholder {
    /// Every placeholder.
    pub const ALL: [Self; 7] = [
        Self::BatchNumber,
        Self::StartSeq,
        Self::EndSeq,
        Self::Timestamp,
        Self::TableScanBlocks,
        Self::TableCount,
        Self::SampleLength,
    ];

    /// Placeholders every template must contain.
    pub const REQUIRED: [Self; 5] = [
        Self::BatchNumber,
        Self::StartSeq,
        Self::EndSeq,
        Self::Timestamp,
        Self::TableScanBlocks,
    ];

    /// The literal token, braces included.
    pub const fn token(self) -> &'static str {
        match self {
            Self::BatchNumber => "{BATCH_NUMBER}",
            Self::StartSeq => "{START_SEQ}",
            Self::EndSeq => "{END_SEQ}",
            Self::Timestamp => "{TIMESTAMP}",
            Self::TableScanBlocks => "{TABLE_SCAN_BLOCKS}",
            Self::TableCount => "{TABLE_COUNT}",
            Self::SampleLength => "{SAMPLE_LENGTH}",
        }
    }

    /// Whether templates must contain this placeholder.
    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

/// Where a template's text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Compiled-in [`BUILTIN_TEMPLATE`]
    Builtin,
    /// Template read from this file
    File(PathBuf),
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin => write!(f, "built-in template"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Values substituted into a template for one batch.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Batch supplying id and sequence range
    pub batch: &'a Batch,
    /// Rendered table blocks
    pub scan_text: &'a str,
    /// Generation time, already formatted
    pub timestamp: &'a str,
    /// Tables that produced a block
    pub tables_scanned: usize,
    /// Characters of each sample shown in the report
    pub sample_display_length: u32,
}

impl RenderContext<'_> {
    fn value(&self, placeholder: Placeholder) -> Cow<'_, str> {
        match placeholder {
            Placeholder::BatchNumber => Cow::Owned(self.batch.batch_id.to_string()),
            Placeholder::StartSeq => Cow::Owned(self.batch.start_seq.to_string()),
            Placeholder::EndSeq => Cow::Owned(self.batch.end_seq.to_string()),
            Placeholder::Timestamp => Cow::Borrowed(self.timestamp),
            Placeholder::TableScanBlocks => Cow::Borrowed(self.scan_text),
            Placeholder::TableCount => Cow::Owned(self.tables_scanned.to_string()),
            Placeholder::SampleLength => Cow::Owned(self.sample_display_length.to_string()),
        }
    }
}

/// A validated script template.
#[derive(Debug, Clone)]
pub struct ScriptTemplate {
    text: String,
    source: TemplateSource,
}

impl ScriptTemplate {
    /// The built-in template.
    pub fn builtin() -> Self {
        Self {
            text: BUILTIN_TEMPLATE.to_string(),
            source: TemplateSource::Builtin,
        }
    }

    /// Wraps template text after checking the required placeholders.
    ///
    /// # Errors
    /// Returns a template error naming every missing required placeholder.
    pub fn from_text(text: impl Into<String>, source: TemplateSource) -> Result<Self> {
        let text = text.into();
        let missing = missing_placeholders(&text);
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|p| p.token()).collect();
            return Err(ScanError::template(format!(
                "{} is missing required placeholders: {}",
                source,
                names.join(", ")
            )));
        }
        Ok(Self { text, source })
    }

    /// Loads the template at `path`, falling back to the built-in template
    /// when no path is given or the file does not exist.
    ///
    /// # Errors
    /// Unreadable files and files missing required placeholders are errors.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::builtin());
        };

        match std::fs::read_to_string(path) {
            Ok(text) => {
                tracing::debug!("Using script template {}", path.display());
                Self::from_text(text, TemplateSource::File(path.to_path_buf()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "Template {} not found, using built-in template",
                    path.display()
                );
                Ok(Self::builtin())
            }
            Err(e) => Err(ScanError::io(
                format!("Failed to read template {}", path.display()),
                e,
            )),
        }
    }

    /// Where the template came from.
    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Raw template text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substitutes every placeholder in a single pass.
    pub fn render(&self, context: &RenderContext<'_>) -> Script {
        let mut rendered = String::with_capacity(self.text.len() + context.scan_text.len());
        let mut rest = self.text.as_str();

        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let candidate = &rest[open..];
            match Placeholder::ALL
                .iter()
                .find(|p| candidate.starts_with(p.token()))
            {
                Some(placeholder) => {
                    rendered.push_str(&context.value(*placeholder));
                    rest = &candidate[placeholder.token().len()..];
                }
                None => {
                    rendered.push('{');
                    rest = &candidate[1..];
                }
            }
        }
        rendered.push_str(rest);

        Script {
            batch_id: context.batch.batch_id,
            content: rendered,
        }
    }
}

/// Required placeholders absent from `text`.
pub fn missing_placeholders(text: &str) -> Vec<Placeholder> {
    Placeholder::REQUIRED
        .into_iter()
        .filter(|p| !text.contains(p.token()))
        .collect()
}

/// Template used when no external template is available.
pub const BUILTIN_TEMPLATE: &str = r#"-- ==================================================================================
-- PostgreSQL table scan batch script
-- Batch: {BATCH_NUMBER} (tables {START_SEQ} - {END_SEQ})
-- Generated: {TIMESTAMP}
-- ==================================================================================

\timing on
\pset border 2

\echo ''
\echo '=========================================='
\echo 'Starting batch {BATCH_NUMBER}'
\echo 'Table range: {START_SEQ} - {END_SEQ}'
\echo '=========================================='
\echo ''

DROP TABLE IF EXISTS temp_scan_results_{BATCH_NUMBER};
CREATE TEMP TABLE temp_scan_results_{BATCH_NUMBER} (
    batch_number INTEGER,
    table_schema TEXT,
    table_name TEXT,
    column_name TEXT,
    search_value TEXT,
    match_count BIGINT,
    sample_data TEXT
);

{TABLE_SCAN_BLOCKS}

\echo ''
\echo '=========================================='
\echo 'Batch {BATCH_NUMBER} scan complete'
\echo '=========================================='
\echo ''

SELECT
    batch_number AS "batch",
    format('%I.%I', table_schema, table_name) AS "table",
    column_name AS "column",
    search_value AS "search value",
    match_count AS "matching rows",
    LEFT(sample_data, {SAMPLE_LENGTH}) AS "sample"
FROM temp_scan_results_{BATCH_NUMBER}
WHERE match_count > 0
ORDER BY table_schema, table_name, column_name, search_value;

SELECT
    {TABLE_COUNT} AS "tables scanned",
    COUNT(DISTINCT format('%I.%I', table_schema, table_name)) AS "tables with matches",
    COUNT(*) FILTER (WHERE match_count > 0) AS "columns with matches",
    COALESCE(SUM(match_count), 0)::bigint AS "total matching rows"
FROM temp_scan_results_{BATCH_NUMBER};
"#;
