//! # Protein Grouping
//!
//! Resolves PSM-level protein evidence into protein groups, in stages that
//! each complete before the next starts:
//!
//! 1. [`load_evidence`] stores proteins, peptides, PSMs and, for PSMs
//!    passing the confidence filter, the protein↔PSM evidence relation,
//!    then indexes it.
//! 2. [`GraphBuilder`] streams the PSM table again and yields, per PSM
//!    passing the confidence filter, its candidate proteins with their full
//!    peptide sets.
//! 3. [`MasterSelector`] keeps the candidates whose peptide set is not a
//!    proper subset of another candidate's and stores masters and PSM→master
//!    associations.
//! 4. [`assemble_group_content`] aggregates the members of each master's
//!    group.
//!
//! [`sort_group`] orders group members for presentation and
//! [`PsmTableAnnotator`] writes the groups back into the PSM table.
//!
//! ## Example
//!
//! ```rust
//! use protgroup::grouping::{group_proteins, load_evidence, GroupingOptions};
//! use protgroup::input::{PsmColumns, PsmTsvReader};
//! use protgroup::store::EvidenceStore;
//!
//! let tsv = "#SpecFile\tScanNum\tPeptide\tProtein\tMSGFScore\n\
//!            a\t1\tPEPA\tA;B\t10\n\
//!            a\t2\tPEPB\tA;B\t10\n\
//!            a\t3\tPEPC\tB\t10\n";
//! let columns = PsmColumns::default();
//! let mut store = EvidenceStore::open_in_memory()?;
//! load_evidence(&mut store, PsmTsvReader::from_reader(tsv.as_bytes(), &columns)?, None)?;
//! let stats = group_proteins(
//!     &mut store,
//!     PsmTsvReader::from_reader(tsv.as_bytes(), &columns)?,
//!     &GroupingOptions::default(),
//! )?;
//!
//! assert_eq!(stats.masters, 1);
//! assert_eq!(store.masters()?[0].accession, "B");
//! # Ok::<(), protgroup::PipelineError>(())
//! ```

mod content;
mod graph;
mod master;
mod psmtable;
mod sort;


pub use content::{assemble_group_content, group_content, sorted_group};
pub use graph::{EvidenceGraph, GraphBuilder, GraphStats, PsmEvidence};
pub use master::{select_masters, MasterSelector};
pub use psmtable::{PsmTableAnnotator, AMOUNT_HEADER, CONTENT_HEADER, MASTER_HEADER};
pub use sort::{sort_by_criteria, sort_group, GroupMember, SortCriterion, SortKey, DEFAULT_CRITERIA};

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use log::info;

use crate::error::PipelineError;
use crate::input::{ConfidenceFilter, InputError, PsmColumns, PsmRecord, PsmTsvReader};
use crate::store::{EvidenceStore, StoreError};

/// Number of PSM rows stored per transaction
pub const BATCH_SIZE: usize = 10_000;

/// Options of the grouping stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupingOptions {
    /// PSMs failing this filter take no part in grouping
    pub filter: Option<ConfidenceFilter>,
    /// Each row lists a single protein; a PSM's candidates are all proteins
    /// stored for its PSM id
    pub unrolled: bool,
}

/// Statistics from a completed grouping run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// PSM rows read
    pub rows_read: usize,
    /// Rows failing the confidence filter
    pub rows_filtered: usize,
    /// Passing rows without candidate proteins
    pub psms_without_candidates: usize,
    /// PSMs with more than one master
    pub psms_with_tied_masters: usize,
    /// Distinct masters
    pub masters: usize,
    /// Stored group content rows
    pub group_content_rows: usize,
}

impl fmt::Display for GroupingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Grouping: {} rows read, {} filtered, {} without proteins, {} masters \
             ({} PSMs tied), {} group content rows",
            self.rows_read,
            self.rows_filtered,
            self.psms_without_candidates,
            self.masters,
            self.psms_with_tied_masters,
            self.group_content_rows
        )
    }
}

/// Store the evidence of a PSM record stream in batches of
/// [`BATCH_SIZE`] and index it. Returns the number of evidence rows.
///
/// Rows failing `filter` keep their row number and PSM but store no
/// protein evidence, so grouping never sees their peptides.
pub fn load_evidence<I>(
    store: &mut EvidenceStore,
    records: I,
    filter: Option<&ConfidenceFilter>,
) -> Result<usize, PipelineError>
where
    I: IntoIterator<Item = Result<PsmRecord, InputError>>,
{
    let mut batch = Vec::with_capacity(BATCH_SIZE);
    let mut rows = 0;
    let mut evidence_rows = 0;
    for record in records {
        batch.push(record?);
        if batch.len() == BATCH_SIZE {
            rows += batch.len();
            evidence_rows += store_batch(store, &batch, filter)?;
            batch.clear();
        }
    }
    if !batch.is_empty() {
        rows += batch.len();
        evidence_rows += store_batch(store, &batch, filter)?;
    }
    store.index_evidence()?;
    info!("Loaded {} PSM rows, {} evidence rows", rows, evidence_rows);
    Ok(evidence_rows)
}

fn store_batch(
    store: &mut EvidenceStore,
    batch: &[PsmRecord],
    filter: Option<&ConfidenceFilter>,
) -> Result<usize, StoreError> {
    let proteins: BTreeSet<&String> = batch.iter().flat_map(|r| &r.proteins).collect();
    let proteins: Vec<String> = proteins.into_iter().cloned().collect();
    store.upsert_proteins(&proteins)?;
    store.store_psm_evidence(batch, filter)
}

/// Select masters over a PSM record stream and assemble group content.
///
/// The evidence of the stream must already be loaded.
pub fn group_proteins<I>(
    store: &mut EvidenceStore,
    records: I,
    options: &GroupingOptions,
) -> Result<GroupingStats, PipelineError>
where
    I: IntoIterator<Item = Result<PsmRecord, InputError>>,
{
    let mut selector = MasterSelector::new();
    let graph_stats = {
        let mut builder = GraphBuilder::new(
            store,
            records.into_iter(),
            options.filter.clone(),
            options.unrolled,
        );
        for evidence in builder.by_ref() {
            selector.add(&evidence?);
        }
        builder.stats()
    };
    selector.persist(store)?;
    let group_content_rows = assemble_group_content(store)?;

    let stats = GroupingStats {
        rows_read: graph_stats.rows_read,
        rows_filtered: graph_stats.rows_filtered,
        psms_without_candidates: graph_stats.without_candidates,
        psms_with_tied_masters: selector.tied_psms(),
        masters: selector.masters().len(),
        group_content_rows,
    };
    info!("{}", stats);
    Ok(stats)
}

/// Load a PSM table file and group its proteins.
///
/// The confidence filter's field is read from the table in addition to
/// `columns`.
pub fn group_psm_table<P: AsRef<Path>>(
    store: &mut EvidenceStore,
    psm_table: P,
    columns: &PsmColumns,
    options: &GroupingOptions,
) -> Result<GroupingStats, PipelineError> {
    let psm_table = psm_table.as_ref();
    let mut columns = columns.clone();
    if let Some(filter) = &options.filter {
        columns.confidence = Some(filter.field.clone());
    }
    load_evidence(
        store,
        PsmTsvReader::from_path(psm_table, &columns)?,
        options.filter.as_ref(),
    )?;
    group_proteins(store, PsmTsvReader::from_path(psm_table, &columns)?, options)
}
