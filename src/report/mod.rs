//! # Protein Report
//!
//! Assembles the per-protein report from the evidence store and the
//! per-pool dimension tables.
//!
//! - [`QueryComposer`] turns the set of requested [`Dimension`]s into a
//!   [`QueryPlan`]: one left join per dimension and a [`ColumnMap`] giving
//!   the row position of every dimension field.
//! - [`ReportAssembler`] runs the plan, groups the consecutive rows of each
//!   accession and pivots them into `<pool>_<field>` columns. Every record
//!   has the full header's width; absent values are written as `NA`.
//! - [`TsvWriter`] writes the records as tab-separated text.
//!
//! Dimension values reach the store per pool through
//! [`import_protein_table`].
//!
//! ## Example
//!
//! ```rust
//! use protgroup::report::{ReportAssembler, ReportOptions};
//! use protgroup::store::EvidenceStore;
//!
//! let mut store = EvidenceStore::open_in_memory()?;
//! store.store_proteins(&["P1".to_string(), "P2".to_string()])?;
//! store.store_masters(&["P2".to_string()], &[])?;
//!
//! let assembler = ReportAssembler::new(&store, &ReportOptions::default())?;
//! assert_eq!(assembler.header(), ["Protein accession"]);
//!
//! let mut records = Vec::new();
//! assembler.for_each_record(|record| {
//!     records.push(record.to_vec());
//!     Ok(())
//! })?;
//! assert_eq!(records, vec![vec!["P2".to_string()]]);
//! # Ok::<(), protgroup::report::ReportError>(())
//! ```

mod dimension;
mod error;
mod import;
mod query;
mod writer;


pub use dimension::{Dimension, DimensionDescriptor};
pub use error::ReportError;
pub use import::{import_protein_table, import_protein_table_file, ImportStats};
pub use query::{ColumnMap, JoinClause, QueryComposer, QueryPlan, ACCESSION_INDEX};
pub use writer::TsvWriter;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io::Write;

use log::{info, warn};

use crate::grouping::sorted_group;
use crate::input::NA;
use crate::store::EvidenceStore;

/// Header of the protein data columns following the accession
pub const PROTEIN_DATA_HEADER: [&str; 5] = [
    "Description",
    "Coverage",
    "Evidence level",
    "Protein group content",
    "# Proteins",
];

/// What a report contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Dimensions to report per pool
    pub dimensions: BTreeSet<Dimension>,
    /// Add the protein data columns
    pub protein_data: bool,
    /// Report master proteins only
    pub masters_only: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            dimensions: BTreeSet::new(),
            protein_data: false,
            masters_only: true,
        }
    }
}

/// Counts from one report run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportStats {
    /// Query rows read
    pub rows_read: usize,
    /// Records emitted, one per protein
    pub proteins: usize,
    /// Cells written as `NA`
    pub missing_values: usize,
}

impl fmt::Display for ReportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Report: {} proteins from {} rows, {} NA cells",
            self.proteins, self.rows_read, self.missing_values
        )
    }
}

/// Drives a [`QueryPlan`] and pivots its rows into report records
pub struct ReportAssembler<'a> {
    store: &'a EvidenceStore,
    plan: QueryPlan,
    protein_data: bool,
    header: Vec<String>,
    /// pool → header key → output column
    positions: HashMap<String, HashMap<String, usize>>,
}

impl<'a> ReportAssembler<'a> {
    /// Compose the query and lay out the header for the pools and channels
    /// currently stored
    pub fn new(store: &'a EvidenceStore, options: &ReportOptions) -> Result<Self, ReportError> {
        let plan = options
            .dimensions
            .iter()
            .fold(QueryComposer::new(), |composer, &d| composer.with(d))
            .masters_only(options.masters_only)
            .compose();

        let mut header = vec!["Protein accession".to_string()];
        if options.protein_data {
            header.extend(PROTEIN_DATA_HEADER.iter().map(|h| h.to_string()));
        }

        let pools = store.pool_names()?;
        let channels = if options.dimensions.contains(&Dimension::Isobaric) {
            store.isobaric_channels()?
        } else {
            Vec::new()
        };
        let mut positions: HashMap<String, HashMap<String, usize>> = HashMap::new();
        for dimension in plan.dimensions() {
            if store.dimension_row_count(dimension)? == 0 {
                warn!("No {} values stored, reporting NA", dimension);
            }
            let desc = dimension.descriptor();
            for pool in &pools {
                let keys: Vec<&str> = if desc.keyed_by_channel {
                    channels
                        .iter()
                        .map(|(channel, _)| channel.as_str())
                        .chain(channels.iter().filter_map(|(_, amount)| amount.as_deref()))
                        .collect()
                } else {
                    vec![desc.header]
                };
                for key in keys {
                    positions
                        .entry(pool.clone())
                        .or_default()
                        .insert(key.to_string(), header.len());
                    header.push(format!("{pool}_{key}"));
                }
            }
        }

        Ok(Self {
            store,
            plan,
            protein_data: options.protein_data,
            header,
            positions,
        })
    }

    /// Report header
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// The composed query
    pub fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    /// Run the query and hand every assembled record to `emit`, in
    /// accession order
    pub fn for_each_record<F>(&self, mut emit: F) -> Result<ReportStats, ReportError>
    where
        F: FnMut(&[String]) -> Result<(), ReportError>,
    {
        let mut stats = ReportStats::default();
        let mut stmt = self.store.connection().prepare(&self.plan.sql())?;
        let mut rows = stmt.query([])?;
        let mut current: Option<Vec<String>> = None;

        while let Some(row) = rows.next()? {
            stats.rows_read += 1;
            let accession: String = row.get(ACCESSION_INDEX)?;
            let same = current
                .as_ref()
                .is_some_and(|record| record[ACCESSION_INDEX] == accession);
            if !same {
                if let Some(record) = current.take() {
                    self.emit(record, &mut emit, &mut stats)?;
                }
                current = Some(self.start_record(accession)?);
            }
            if let Some(record) = current.as_mut() {
                self.fill(row, record)?;
            }
        }
        if let Some(record) = current.take() {
            self.emit(record, &mut emit, &mut stats)?;
        }
        info!("{}", stats);
        Ok(stats)
    }

    /// Write the header and all records
    pub fn write_to<W: Write>(&self, writer: &mut TsvWriter<W>) -> Result<ReportStats, ReportError> {
        writer.write_header(&self.header)?;
        self.for_each_record(|record| writer.write_row(record))
    }

    fn emit<F>(
        &self,
        record: Vec<String>,
        emit: &mut F,
        stats: &mut ReportStats,
    ) -> Result<(), ReportError>
    where
        F: FnMut(&[String]) -> Result<(), ReportError>,
    {
        stats.proteins += 1;
        stats.missing_values += record.iter().filter(|v| *v == NA).count();
        emit(&record)
    }

    fn start_record(&self, accession: String) -> Result<Vec<String>, ReportError> {
        let mut record = vec![NA.to_string(); self.header.len()];
        if self.protein_data {
            let info = self.store.protein_info(&accession)?;
            if let Some(description) = info.description {
                record[1] = description;
            }
            if let Some(coverage) = info.coverage {
                record[2] = coverage.to_string();
            }
            if let Some(level) = info.evidence_level {
                record[3] = level.to_string();
            }
            if let Some(master) = self.store.master(&accession)? {
                let group = sorted_group(self.store, &master)?;
                record[5] = group.len().to_string();
                record[4] = group.join(",");
            }
        }
        record[ACCESSION_INDEX] = accession;
        Ok(record)
    }

    fn fill(&self, row: &rusqlite::Row<'_>, record: &mut [String]) -> Result<(), ReportError> {
        let map = &self.plan.column_map;
        for dimension in self.plan.dimensions() {
            let desc = dimension.descriptor();
            let (Some(pool_idx), Some(val_idx)) = (map.get(desc.pool_field), map.get(desc.value_field))
            else {
                continue;
            };
            let Some(pool) = row.get::<_, Option<String>>(pool_idx)? else {
                continue;
            };
            let Some(columns) = self.positions.get(&pool) else {
                continue;
            };

            if dimension == Dimension::Isobaric {
                let (Some(channel_idx), Some(field_idx), Some(psms_idx)) = (
                    map.get("channel"),
                    map.get("isoq_psmsfield"),
                    map.get("isoq_psms"),
                ) else {
                    continue;
                };
                if let Some(channel) = row.get::<_, Option<String>>(channel_idx)? {
                    let value: Option<f64> = row.get(val_idx)?;
                    set(record, columns.get(&channel), value.map(|v| v.to_string()));
                }
                if let Some(field) = row.get::<_, Option<String>>(field_idx)? {
                    let amount: Option<i64> = row.get(psms_idx)?;
                    set(record, columns.get(&field), amount.map(|n| n.to_string()));
                }
            } else {
                let value: Option<f64> = row.get(val_idx)?;
                set(record, columns.get(desc.header), value.map(|v| v.to_string()));
            }
        }
        Ok(())
    }
}

fn set(record: &mut [String], column: Option<&usize>, value: Option<String>) {
    if let (Some(&column), Some(value)) = (column, value) {
        record[column] = value;
    }
}
