use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use protgroup::input::ProteinTableColumns;
use protgroup::report::import_protein_table_file;
use protgroup::store::EvidenceStore;

use super::{Config, ProteinTableArgs};

/// Import one pool's protein table into an existing evidence store
pub fn run(
    input: PathBuf,
    store_path: PathBuf,
    pool: String,
    config: Option<PathBuf>,
    args: ProteinTableArgs,
) -> Result<()> {
    let config = Config::load(config.as_deref())?;
    let columns = merge_columns(config.protein_table_columns(), args);

    info!("Protein table import");
    info!("====================");
    info!("Input: {}", input.display());
    info!("Store: {}", store_path.display());
    info!("Pool: {}", pool);

    let mut store = EvidenceStore::open(&store_path)
        .with_context(|| format!("Failed to open store: {}", store_path.display()))?;
    let stats = import_protein_table_file(&mut store, &pool, &input, &columns)
        .with_context(|| format!("Failed to import protein table {}", input.display()))?;
    println!("{}: {}", pool, stats);

    Ok(())
}

/// Command line column flags over configured columns
fn merge_columns(mut columns: ProteinTableColumns, args: ProteinTableArgs) -> ProteinTableColumns {
    if let Some(accession) = args.accession_column {
        columns.accession = accession;
    }
    if !args.channels.is_empty() {
        columns.isobaric_channels = args.channels;
    }
    columns.amount_psms_suffix = args.amount_psms_suffix.or(columns.amount_psms_suffix);
    columns.precursor = args.precursor.or(columns.precursor);
    columns.probability = args.probability.or(columns.probability);
    columns.fdr = args.fdr.or(columns.fdr);
    columns.pep = args.pep.or(columns.pep);
    columns
}
