//! Scan-block synthesis.
//!
//! A table's scan work is first planned as plain [`ScanProbe`] values, one
//! per (search term, column) pair, then each probe is rendered into its own
//! anonymous PL/pgSQL block. Every block carries its own exception handler,
//! so a column that cannot be cast to text (or any other runtime failure)
//! only loses that one probe when the script runs.
//!
//! The synthesizer performs no I/O; it turns catalog snapshots into text.

mod sql;

pub use sql::{
    comment_text, contains_pattern, dollar_quote_tag, escape_like, psql_quote, qualified_name,
    quote_ident, quote_literal,
};

use crate::models::{ScanProbe, TableRef, result_table_name};

/// Base name for the dollar-quote tag around each probe body.
const DOLLAR_TAG_BASE: &str = "scan";

/// Rendered scan text for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock {
    /// Header comment, progress echo and one `DO` block per probe
    pub text: String,
    /// Number of `DO` blocks in `text`
    pub probe_count: usize,
}

/// Builds per-table scan blocks for a fixed set of search terms.
#[derive(Debug, Clone)]
pub struct ScanSynthesizer {
    search_terms: Vec<String>,
}

impl ScanSynthesizer {
    /// Creates a synthesizer probing for `search_terms`, in that order.
    pub fn new(search_terms: Vec<String>) -> Self {
        Self { search_terms }
    }

    /// Search terms in probe order.
    pub fn search_terms(&self) -> &[String] {
        &self.search_terms
    }

    /// Plans one probe per (term, column) pair: terms outer, columns inner.
    pub fn plan_probes(&self, table: &TableRef, columns: &[String]) -> Vec<ScanProbe> {
        let mut probes = Vec::with_capacity(self.search_terms.len() * columns.len());
        for term in &self.search_terms {
            for column in columns {
                probes.push(ScanProbe {
                    table: table.clone(),
                    column: column.clone(),
                    term: term.clone(),
                });
            }
        }
        probes
    }

    /// Renders the complete scan block for one table.
    pub fn render_table_block(
        &self,
        table: &TableRef,
        columns: &[String],
        batch_id: u32,
    ) -> TableBlock {
        let probes = self.plan_probes(table, columns);
        let qualified = qualified_name(&table.schema_name, &table.table_name);

        let mut lines = vec![
            format!(
                "-- table {}: {}",
                table.sequence_number,
                comment_text(&qualified)
            ),
            format!(
                "\\echo {}",
                psql_quote(&format!(
                    "scanning table {}: {} ...",
                    table.sequence_number, qualified
                ))
            ),
            String::new(),
        ];
        for probe in &probes {
            lines.push(render_probe(probe, batch_id));
            lines.push(String::new());
        }
        lines.push(String::new());

        TableBlock {
            text: lines.join("\n"),
            probe_count: probes.len(),
        }
    }
}

/// Renders one probe as a self-contained `DO` block.
///
/// The dynamic query receives the column, schema and table through `%I` and
/// the LIKE pattern through `%L`, so `format()` quotes them when the script
/// runs; every value written into the block itself is a quoted literal.
pub fn render_probe(probe: &ScanProbe, batch_id: u32) -> String {
    let schema = quote_literal(&probe.table.schema_name);
    let table = quote_literal(&probe.table.table_name);
    let column = quote_literal(&probe.column);
    let term = quote_literal(&probe.term);
    let pattern = quote_literal(&contains_pattern(&probe.term));
    let results = result_table_name(batch_id);

    let body = [
        "DECLARE".to_string(),
        "    v_count BIGINT;".to_string(),
        "    v_sample TEXT;".to_string(),
        "BEGIN".to_string(),
        "    EXECUTE format(".to_string(),
        "        'SELECT COUNT(*), MAX(%1$I::text) FROM %2$I.%3$I WHERE %1$I::text LIKE %4$L',"
            .to_string(),
        format!("        {}, {}, {}, {}", column, schema, table, pattern),
        "    ) INTO v_count, v_sample;".to_string(),
        "    IF v_count > 0 THEN".to_string(),
        format!(
            "        INSERT INTO {} (batch_number, table_schema, table_name, column_name, search_value, match_count, sample_data)",
            results
        ),
        format!(
            "        VALUES ({}, {}, {}, {}, {}, v_count, v_sample);",
            batch_id, schema, table, column, term
        ),
        format!(
            "        RAISE NOTICE '  match: %.% (column: %) - % rows', {}, {}, {}, v_count;",
            schema, table, column
        ),
        "    END IF;".to_string(),
        "EXCEPTION".to_string(),
        "    WHEN OTHERS THEN".to_string(),
        // Columns without a usable text cast land here
        format!(
            "        RAISE DEBUG 'skipped %.% (column: %): %', {}, {}, {}, SQLERRM;",
            schema, table, column
        ),
        "END".to_string(),
    ]
    .join("\n");

    let tag = dollar_quote_tag(&body, DOLLAR_TAG_BASE);
    format!(
        "-- column {}, term {}\nDO {}\n{}\n{};",
        comment_text(&quote_ident(&probe.column)),
        comment_text(&term),
        tag,
        body,
        tag
    )
}
