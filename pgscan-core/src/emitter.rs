//! Batch emitter: catalog -> probes -> template -> file, one batch at a time.
//!
//! All catalog reads happen sequentially through one [`CatalogReader`].
//! Tables whose columns cannot be read are skipped with a warning; a batch in
//! which every table was skipped still produces a script with an empty scan
//! section.

use crate::catalog::CatalogReader;
use crate::config::ScanConfig;
use crate::models::{Batch, Script, TableRef};
use crate::partition::partition;
use crate::synth::ScanSynthesizer;
use crate::template::{RenderContext, ScriptTemplate};
use crate::{Result, error::ScanError};
use std::path::PathBuf;

/// Timestamp format embedded in generated scripts.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn generation_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Tables discovered and how they were split.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    /// User tables in discovery order
    pub tables: Vec<TableRef>,
    /// Partition of `tables`, in batch id order
    pub batches: Vec<Batch>,
}

/// Scan text for one batch plus what went into it.
#[derive(Debug, Clone, Default)]
pub struct ScanSection {
    /// Concatenated table blocks, substituted for `{TABLE_SCAN_BLOCKS}`
    pub text: String,
    /// Tables that produced a block
    pub tables_scanned: usize,
    /// Probes across all blocks
    pub probe_count: usize,
    /// Tables left out because their columns could not be read
    pub skipped_tables: Vec<TableRef>,
}

/// Outcome of writing one batch script.
#[derive(Debug, Clone)]
pub struct EmittedBatch {
    /// Batch id, starting at 1
    pub batch_id: u32,
    /// Sequence number of the batch's first table
    pub start_seq: u32,
    /// Sequence number of the batch's last table
    pub end_seq: u32,
    /// Script file name, without directory
    pub file_name: String,
    /// Full path the script was written to
    pub path: PathBuf,
    /// Tables that produced a scan block
    pub tables_scanned: usize,
    /// Probes in the script
    pub probe_count: usize,
    /// Tables left out because their columns could not be read
    pub skipped_tables: Vec<TableRef>,
}

/// Result of a full generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// User tables discovered
    pub total_tables: usize,
    /// Written scripts in generation order
    pub batches: Vec<EmittedBatch>,
}

impl GenerationReport {
    /// File names in generation order.
    pub fn file_names(&self) -> Vec<&str> {
        self.batches.iter().map(|b| b.file_name.as_str()).collect()
    }
}

/// Drives script generation over a catalog.
pub struct BatchEmitter<'a> {
    catalog: &'a dyn CatalogReader,
    config: ScanConfig,
    synthesizer: ScanSynthesizer,
    template: ScriptTemplate,
}

impl std::fmt::Debug for BatchEmitter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchEmitter")
            .field("config", &self.config)
            .field("template", self.template.source())
            .finish()
    }
}

impl<'a> BatchEmitter<'a> {
    /// Validates `config` and loads its template.
    ///
    /// # Errors
    /// Returns a configuration or template error if either is invalid.
    pub fn new(catalog: &'a dyn CatalogReader, config: ScanConfig) -> Result<Self> {
        config.validate()?;
        let template = ScriptTemplate::load(config.template_path.as_deref())?;
        Ok(Self::with_template(catalog, config, template))
    }

    /// Uses an already loaded template.
    pub fn with_template(
        catalog: &'a dyn CatalogReader,
        config: ScanConfig,
        template: ScriptTemplate,
    ) -> Self {
        let synthesizer = ScanSynthesizer::new(config.search_terms.clone());
        Self {
            catalog,
            config,
            synthesizer,
            template,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Active template.
    pub fn template(&self) -> &ScriptTemplate {
        &self.template
    }

    /// Discovers tables and partitions them.
    ///
    /// # Errors
    /// Catalog failures are fatal and returned as-is.
    pub async fn plan(&self) -> Result<GenerationPlan> {
        let tables = self.catalog.list_tables().await?;
        let batches = partition(&tables, self.config.batch_size)?;
        Ok(GenerationPlan { tables, batches })
    }

    /// Builds the scan section of one batch, skipping unreadable tables.
    pub async fn build_scan_section(&self, batch: &Batch) -> ScanSection {
        let mut section = ScanSection::default();
        let mut blocks = Vec::with_capacity(batch.tables.len());

        for table in &batch.tables {
            let columns = match self.catalog.list_columns(table).await {
                Ok(columns) => columns,
                Err(e) => {
                    tracing::warn!("Cannot read columns of table {}: {}", table, e);
                    section.skipped_tables.push(table.clone());
                    continue;
                }
            };

            if columns.is_empty() {
                tracing::warn!(
                    "Table {} has no visible columns (dropped or inaccessible), skipping",
                    table
                );
                section.skipped_tables.push(table.clone());
                continue;
            }

            let block = self
                .synthesizer
                .render_table_block(table, &columns, batch.batch_id);
            tracing::trace!("Table {}: {} probes", table, block.probe_count);
            section.tables_scanned += 1;
            section.probe_count += block.probe_count;
            blocks.push(block.text);
        }

        section.text = blocks.join("\n");
        section
    }

    /// Renders one batch into a script without writing it.
    pub async fn render_batch(&self, batch: &Batch, timestamp: &str) -> (Script, ScanSection) {
        let section = self.build_scan_section(batch).await;
        let script = self.template.render(&RenderContext {
            batch,
            scan_text: &section.text,
            timestamp,
            tables_scanned: section.tables_scanned,
            sample_display_length: self.config.sample_display_length,
        });
        (script, section)
    }

    /// Renders one batch and writes it into the output directory.
    ///
    /// # Errors
    /// Returns an I/O error if the script cannot be written.
    pub async fn emit_batch(&self, batch: &Batch, timestamp: &str) -> Result<EmittedBatch> {
        let (script, section) = self.render_batch(batch, timestamp).await;

        let file_name = batch.file_name(&self.config.file_extension);
        let path = self.config.output_dir.join(&file_name);

        tokio::fs::write(&path, script.content.as_bytes())
            .await
            .map_err(|e| ScanError::io(format!("Failed to write {}", path.display()), e))?;

        tracing::info!(
            "Wrote {} ({} tables, {} probes, {} skipped)",
            file_name,
            section.tables_scanned,
            section.probe_count,
            section.skipped_tables.len()
        );

        Ok(EmittedBatch {
            batch_id: batch.batch_id,
            start_seq: batch.start_seq,
            end_seq: batch.end_seq,
            file_name,
            path,
            tables_scanned: section.tables_scanned,
            probe_count: section.probe_count,
            skipped_tables: section.skipped_tables,
        })
    }

    /// Emits every batch of `plan` in order, calling `on_batch` with the
    /// 1-based position after each file is written.
    ///
    /// # Errors
    /// Stops at the first write failure; files already written stay.
    pub async fn emit_all<F>(
        &self,
        plan: &GenerationPlan,
        mut on_batch: F,
    ) -> Result<GenerationReport>
    where
        F: FnMut(usize, &EmittedBatch),
    {
        let mut report = GenerationReport {
            total_tables: plan.tables.len(),
            batches: Vec::with_capacity(plan.batches.len()),
        };

        for (index, batch) in plan.batches.iter().enumerate() {
            let emitted = self.emit_batch(batch, &generation_timestamp()).await?;
            on_batch(index + 1, &emitted);
            report.batches.push(emitted);
        }

        Ok(report)
    }
}
