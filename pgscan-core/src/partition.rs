//! Batch partitioning of the discovered table list.

use crate::models::{Batch, TableRef};
use crate::{Result, error::ScanError};

/// Number of batches `total_tables` splits into.
pub fn batch_count(total_tables: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    total_tables.div_ceil(batch_size)
}

/// Splits `tables` into contiguous batches of at most `batch_size` tables.
///
/// Input order is preserved, the last batch may be short, and batch ids
/// start at 1. An empty table list yields no batches.
///
/// # Errors
/// Returns a configuration error when `batch_size` is zero.
///
/// # Example
/// ```rust
/// use pgscan_core::{TableRef, partition::partition};
///
/// let tables: Vec<TableRef> = (1..=5)
///     .map(|n| TableRef::new(n, "public", format!("t{}", n)))
///     .collect();
/// let batches = partition(&tables, 2).unwrap();
///
/// assert_eq!(batches.len(), 3);
/// assert_eq!((batches[2].start_seq, batches[2].end_seq), (5, 5));
/// ```
pub fn partition(tables: &[TableRef], batch_size: usize) -> Result<Vec<Batch>> {
    if batch_size == 0 {
        return Err(ScanError::configuration(
            "batch_size must be greater than 0",
        ));
    }

    let mut batches = Vec::with_capacity(batch_count(tables.len(), batch_size));
    for (index, chunk) in tables.chunks(batch_size).enumerate() {
        let batch_id = u32::try_from(index + 1)
            .map_err(|_| ScanError::configuration("batch count exceeds the supported range"))?;
        // chunks() never yields an empty slice
        let (Some(first), Some(last)) = (chunk.first(), chunk.last()) else {
            continue;
        };
        batches.push(Batch {
            batch_id,
            start_seq: first.sequence_number,
            end_seq: last.sequence_number,
            tables: chunk.to_vec(),
        });
    }

    tracing::debug!(
        "Partitioned {} tables into {} batches of up to {}",
        tables.len(),
        batches.len(),
        batch_size
    );

    Ok(batches)
}
