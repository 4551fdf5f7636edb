use anyhow::{Context, Result};
use log::info;
use std::collections::BTreeSet;
use std::path::PathBuf;

use protgroup::report::{Dimension, ReportAssembler, ReportOptions, TsvWriter};
use protgroup::store::EvidenceStore;

use super::{Config, ReportArgs};

/// Write the protein report of an evidence store
pub fn run(
    store_path: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    args: ReportArgs,
) -> Result<()> {
    let config = Config::load(config.as_deref())?;
    let options = report_options(&config, &args);

    info!("Protein report");
    info!("==============");
    info!("Store: {}", store_path.display());
    info!("Output: {}", output.display());
    info!(
        "Dimensions: {}",
        options
            .dimensions
            .iter()
            .map(Dimension::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let store = EvidenceStore::open(&store_path)
        .with_context(|| format!("Failed to open store: {}", store_path.display()))?;
    let assembler = ReportAssembler::new(&store, &options)?;
    let mut writer = TsvWriter::from_path(&output)
        .with_context(|| format!("Failed to create output: {}", output.display()))?;
    let stats = assembler.write_to(&mut writer)?;
    writer.finish()?;
    println!("{}", stats);

    Ok(())
}

/// Flags add to the configured dimensions
fn report_options(config: &Config, args: &ReportArgs) -> ReportOptions {
    let mut dimensions: BTreeSet<Dimension> = config
        .report
        .dimensions
        .iter()
        .flatten()
        .copied()
        .collect();
    let flags = [
        (args.isobaric, Dimension::Isobaric),
        (args.precursor, Dimension::Precursor),
        (args.probability, Dimension::Probability),
        (args.fdr, Dimension::Fdr),
        (args.pep, Dimension::Pep),
    ];
    dimensions.extend(flags.iter().filter(|(on, _)| *on).map(|(_, dim)| *dim));

    ReportOptions {
        dimensions,
        protein_data: args.protein_data || config.report.protein_data.unwrap_or(false),
        masters_only: !(args.all_proteins || config.report.all_proteins.unwrap_or(false)),
    }
}
