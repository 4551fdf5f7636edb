//! # protgroup - Protein Group Resolution and Report Assembly
//!
//! `protgroup` post-processes peptide identification results into
//! protein-level reports. It collapses the candidate proteins of every PSM
//! into non-redundant master proteins, assembles the protein group of each
//! master, and joins per-pool quant, probability, FDR and PEP tables into a
//! single tab-separated protein report.
//!
//! ## Key Features
//!
//! - **SQLite Evidence Store**: proteins, PSMs, the protein↔PSM evidence
//!   relation, groups and per-pool values live in one file-backed store, so
//!   the evidence graph never has to fit in memory.
//!
//! - **Set-Subsumption Master Selection**: a candidate whose peptide set is
//!   a proper subset of another candidate's is dropped; candidates with
//!   equal peptide sets are kept as tied masters.
//!
//! - **Deterministic Group Ordering**: group members are ordered by a
//!   cascade of peptide count, PSM count, score and accession.
//!
//! - **Composable Report Queries**: each requested dimension adds one join
//!   and a fixed set of columns; absent values are written as `NA`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use protgroup::grouping::{group_psm_table, GroupingOptions};
//! use protgroup::input::PsmColumns;
//! use protgroup::report::{ReportAssembler, ReportOptions, TsvWriter};
//! use protgroup::store::EvidenceStore;
//!
//! let mut store = EvidenceStore::create("lookup.sqlite")?;
//! let stats = group_psm_table(
//!     &mut store,
//!     "psms.tsv",
//!     &PsmColumns::default(),
//!     &GroupingOptions::default(),
//! )?;
//! println!("{}", stats);
//!
//! let assembler = ReportAssembler::new(&store, &ReportOptions::default())?;
//! let mut writer = TsvWriter::from_path("proteins.tsv")?;
//! assembler.write_to(&mut writer)?;
//! writer.finish()?;
//! # Ok::<(), protgroup::PipelineError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`store`]: SQLite evidence store, schema and health check
//! - [`input`]: PSM table, protein table and FASTA readers
//! - [`grouping`]: graph building, master selection, group content and
//!   ordering, PSM table annotation
//! - [`coverage`]: sequence database backfill and sequence coverage
//! - [`report`]: query composition, report assembly and TSV output

#![warn(missing_docs)]

pub mod coverage;
mod error;
pub mod grouping;
pub mod input;
pub mod report;
pub mod store;

pub use error::PipelineError;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coverage::{backfill_coverage, backfill_from_fasta, sequence_coverage};
    pub use crate::grouping::{
        group_proteins, group_psm_table, load_evidence, sort_group, GroupMember,
        GroupingOptions, GroupingStats, MasterSelector, PsmTableAnnotator,
    };
    pub use crate::input::{
        ConfidenceFilter, FastaReader, ProteinTableColumns, PsmColumns, PsmRecord,
        PsmTsvReader, ScoreDirection,
    };
    pub use crate::report::{
        import_protein_table_file, Dimension, QueryComposer, ReportAssembler, ReportOptions,
        TsvWriter,
    };
    pub use crate::store::{EvidenceStore, StoreError};
    pub use crate::PipelineError;
}
