//! # Table Readers
//!
//! Typed readers for the inputs of the pipeline: PSM tables produced by the
//! search engine post-processing, per-pool protein tables carrying quant,
//! probability, FDR and PEP values, and the FASTA database the search ran
//! against.
//!
//! ```rust
//! use protgroup::input::{PsmColumns, PsmTsvReader};
//!
//! let tsv = "#SpecFile\tScanNum\tPeptide\tProtein\tMSGFScore\n\
//!            a.mzML\t10\tPEPTIDE\tsp|P1|A(pre=K,post=R);sp|P2|B\t42\n";
//! let mut reader = PsmTsvReader::from_reader(tsv.as_bytes(), &PsmColumns::default())?;
//! let psm = reader.next().unwrap()?;
//! assert_eq!(psm.proteins, vec!["sp|P1|A", "sp|P2|B"]);
//! # Ok::<(), protgroup::input::InputError>(())
//! ```

mod error;
mod fasta;
mod filter;
mod prottable;
mod psm;


pub use error::InputError;
pub use fasta::{FastaReader, FastaRecord};
pub use filter::{ConfidenceFilter, ScoreDirection};
pub use prottable::{
    read_protein_table, read_protein_table_from, ChannelValue, ProteinTableColumns,
    ProteinTableRow,
};
pub use psm::{parse_proteins, PsmColumns, PsmRecord, PsmTsvReader};

pub(crate) use psm::tsv_reader_builder;

/// Token for a missing value in input and output tables
pub const NA: &str = "NA";
