use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod check;
mod group;
mod load;
mod report;

mod config;

pub use config::Config;

/// protgroup - Protein grouping and protein report assembly
#[derive(Parser)]
#[command(name = "protgroup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Confidence filter flags of the group command
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// PSM table column to filter on
    #[arg(long, value_name = "COLUMN")]
    pub confidence_field: Option<String>,

    /// Exclusive threshold of the confidence filter
    #[arg(long, value_name = "VALUE", requires = "confidence_field")]
    pub threshold: Option<f64>,

    /// Higher confidence values are better (default: lower is better)
    #[arg(long)]
    pub higher_is_better: bool,
}

/// Protein table column flags of the load-table command
#[derive(Args, Debug, Default)]
pub struct ProteinTableArgs {
    /// Accession column
    #[arg(long, value_name = "COLUMN")]
    pub accession_column: Option<String>,

    /// Isobaric channel columns, comma separated
    #[arg(long, value_name = "COLUMNS", value_delimiter = ',')]
    pub channels: Vec<String>,

    /// Suffix of each channel's quanted-PSM count column
    #[arg(long, value_name = "SUFFIX")]
    pub amount_psms_suffix: Option<String>,

    /// Precursor quant column
    #[arg(long, value_name = "COLUMN")]
    pub precursor: Option<String>,

    /// Protein probability column
    #[arg(long, value_name = "COLUMN")]
    pub probability: Option<String>,

    /// Protein FDR column
    #[arg(long, value_name = "COLUMN")]
    pub fdr: Option<String>,

    /// Protein PEP column
    #[arg(long, value_name = "COLUMN")]
    pub pep: Option<String>,
}

/// Dimension and layout flags of the report command
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Report isobaric quant per pool and channel
    #[arg(long)]
    pub isobaric: bool,

    /// Report precursor quant per pool
    #[arg(long)]
    pub precursor: bool,

    /// Report protein probability per pool
    #[arg(long)]
    pub probability: bool,

    /// Report protein FDR per pool
    #[arg(long)]
    pub fdr: bool,

    /// Report protein PEP per pool
    #[arg(long)]
    pub pep: bool,

    /// Add description, coverage, evidence level and group columns
    #[arg(long)]
    pub protein_data: bool,

    /// Report every protein instead of masters only
    #[arg(long)]
    pub all_proteins: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a PSM table, resolve protein groups and annotate the table
    Group {
        /// Input PSM table (tab separated)
        #[arg(value_name = "PSM_TSV")]
        input: PathBuf,

        /// Evidence store to create
        #[arg(short, long, value_name = "DB")]
        store: PathBuf,

        /// Write the PSM table with protein group columns here
        #[arg(short, long, value_name = "OUTPUT")]
        out: Option<PathBuf>,

        /// FASTA database for descriptions, evidence levels and coverage
        #[arg(long, value_name = "FASTA")]
        fasta: Option<PathBuf>,

        /// Rows list a single protein each; candidates come from the PSM id
        #[arg(long)]
        unrolled: bool,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Import one pool's protein table into the store
    LoadTable {
        /// Input protein table (tab separated)
        #[arg(value_name = "PROTEIN_TSV")]
        input: PathBuf,

        /// Evidence store
        #[arg(short, long, value_name = "DB")]
        store: PathBuf,

        /// Pool (sample set) name
        #[arg(short, long)]
        pool: String,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        #[command(flatten)]
        columns: ProteinTableArgs,
    },

    /// Write the protein report
    Report {
        /// Evidence store
        #[arg(short, long, value_name = "DB")]
        store: PathBuf,

        /// Output report file
        #[arg(short, long, value_name = "OUTPUT")]
        out: PathBuf,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Check an evidence store for missing stages and empty tables
    Check {
        /// Evidence store
        #[arg(short, long, value_name = "DB")]
        store: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Group {
            input,
            store,
            out,
            fasta,
            unrolled,
            config,
            filter,
        } => group::run(input, store, out, fasta, unrolled, config, filter),
        Commands::LoadTable {
            input,
            store,
            pool,
            config,
            columns,
        } => load::run(input, store, pool, config, columns),
        Commands::Report {
            store,
            out,
            config,
            report,
        } => report::run(store, out, config, report),
        Commands::Check { store, json } => check::run(store, json),
    }
}
