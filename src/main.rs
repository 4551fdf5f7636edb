//! # protgroup
//!
//! Command-line front end of the protein grouping pipeline.
//!
//! ## Usage
//!
//! ```bash
//! # Resolve protein groups and annotate the PSM table
//! protgroup group psms.tsv --store lookup.sqlite --fasta db.fasta --out psms_grouped.tsv
//!
//! # Import per-pool protein tables
//! protgroup load-table setA_proteins.tsv --store lookup.sqlite --pool setA --fdr q-value
//!
//! # Write the protein report
//! protgroup report --store lookup.sqlite --out proteins.tsv --fdr --protein-data
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::{dispatch, init_logging, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());
    dispatch(cli)
}
