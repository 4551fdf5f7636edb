use std::fmt;
use std::path::Path;

use log::info;

use super::Dimension;
use crate::error::PipelineError;
use crate::input::{read_protein_table, ProteinTableColumns, ProteinTableRow};
use crate::store::{EvidenceStore, IsobaricQuant, StoreError};

/// Counts from one protein table import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Protein rows imported
    pub proteins: usize,
    /// Isobaric channels registered
    pub channels: usize,
    /// Dimension values stored, including missing ones
    pub values: usize,
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Import: {} proteins, {} channels, {} values",
            self.proteins, self.channels, self.values
        )
    }
}

/// Read a protein table file and store its values for `pool`
pub fn import_protein_table_file<P: AsRef<Path>>(
    store: &mut EvidenceStore,
    pool: &str,
    path: P,
    columns: &ProteinTableColumns,
) -> Result<ImportStats, PipelineError> {
    let path = path.as_ref();
    let rows = read_protein_table(path, columns)?;
    Ok(import_protein_table(
        store,
        pool,
        &path.display().to_string(),
        &rows,
        columns,
    )?)
}

/// Store the values of one pool's protein table.
///
/// Every accession must be a stored protein. Only the dimensions with a
/// configured column are stored.
pub fn import_protein_table(
    store: &mut EvidenceStore,
    pool: &str,
    file: &str,
    rows: &[ProteinTableRow],
    columns: &ProteinTableColumns,
) -> Result<ImportStats, StoreError> {
    store.store_pool(pool)?;
    let prottable_id = store.store_protein_table(pool, file)?;
    let mut stats = ImportStats {
        proteins: rows.len(),
        ..Default::default()
    };

    if !columns.isobaric_channels.is_empty() {
        let channels: Vec<(String, Option<String>)> = columns
            .isobaric_channels
            .iter()
            .map(|ch| (ch.clone(), columns.amount_psms_column(ch)))
            .collect();
        let channel_ids = store.store_quant_channels(prottable_id, &channels)?;
        let quants: Vec<IsobaricQuant> = rows
            .iter()
            .flat_map(|row| {
                row.channels
                    .iter()
                    .zip(&channel_ids)
                    .map(|(value, &channel_id)| IsobaricQuant {
                        accession: row.accession.clone(),
                        channel_id,
                        value: value.value,
                        amount_psms: value.amount_psms,
                    })
            })
            .collect();
        store.store_isobaric_quants(&quants)?;
        stats.channels = channel_ids.len();
        stats.values += quants.len();
    }

    let dimensions: [(Dimension, &Option<String>, fn(&ProteinTableRow) -> Option<f64>); 4] = [
        (Dimension::Precursor, &columns.precursor, |r| r.precursor),
        (Dimension::Probability, &columns.probability, |r| r.probability),
        (Dimension::Fdr, &columns.fdr, |r| r.fdr),
        (Dimension::Pep, &columns.pep, |r| r.pep),
    ];
    for (dimension, column, value) in dimensions {
        if column.is_none() {
            continue;
        }
        let values: Vec<(String, Option<f64>)> = rows
            .iter()
            .map(|row| (row.accession.clone(), value(row)))
            .collect();
        store.store_dimension_values(dimension, prottable_id, &values)?;
        stats.values += values.len();
    }

    info!("Pool {}: {}", pool, stats);
    Ok(stats)
}
