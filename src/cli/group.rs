use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use protgroup::coverage::{backfill_coverage, backfill_from_fasta};
use protgroup::grouping::{group_psm_table, GroupingOptions, PsmTableAnnotator};
use protgroup::input::{ConfidenceFilter, FastaReader, ScoreDirection};
use protgroup::report::TsvWriter;
use protgroup::store::EvidenceStore;

use super::{Config, FilterArgs};

/// Load a PSM table, resolve protein groups and optionally annotate the table
pub fn run(
    input: PathBuf,
    store_path: PathBuf,
    output: Option<PathBuf>,
    fasta: Option<PathBuf>,
    unrolled: bool,
    config: Option<PathBuf>,
    filter_args: FilterArgs,
) -> Result<()> {
    let config = Config::load(config.as_deref())?;

    info!("Protein grouping");
    info!("================");
    info!("Input: {}", input.display());
    info!("Store: {}", store_path.display());

    let columns = config.psm_columns();
    let options = GroupingOptions {
        filter: confidence_filter(&config, filter_args)?,
        unrolled: unrolled || config.grouping.unrolled.unwrap_or(false),
    };
    if let Some(filter) = &options.filter {
        info!(
            "Confidence filter: {} {} {}",
            filter.field,
            match filter.direction {
                ScoreDirection::LowerIsBetter => "<",
                ScoreDirection::HigherIsBetter => ">",
            },
            filter.threshold
        );
    }

    let mut store = EvidenceStore::create(&store_path)
        .with_context(|| format!("Failed to create store: {}", store_path.display()))?;

    let stats = group_psm_table(&mut store, &input, &columns, &options)
        .with_context(|| format!("Failed to group proteins of {}", input.display()))?;
    println!("{}", stats);

    if let Some(fasta) = fasta {
        info!("Sequence database: {}", fasta.display());
        let reader = FastaReader::from_path(&fasta)
            .with_context(|| format!("Failed to open FASTA: {}", fasta.display()))?;
        let backfill = backfill_from_fasta(&mut store, reader)?;
        let covered = backfill_coverage(&mut store)?;
        println!(
            "Sequence database: {} of {} entries matched, {} proteins covered",
            backfill.proteins_matched, backfill.entries_read, covered
        );
    }

    if let Some(output) = output {
        let reader = BufReader::new(
            File::open(&input)
                .with_context(|| format!("Failed to open PSM table: {}", input.display()))?,
        );
        let mut writer = TsvWriter::from_path(&output)
            .with_context(|| format!("Failed to create output: {}", output.display()))?;
        let rows = PsmTableAnnotator::new(&store).annotate(reader, &columns.protein, &mut writer)?;
        writer.finish()?;
        println!("Annotated {} PSM rows: {}", rows, output.display());
    }

    Ok(())
}

/// Command line filter flags over the config's `[grouping]` table
fn confidence_filter(config: &Config, args: FilterArgs) -> Result<Option<ConfidenceFilter>> {
    let grouping = &config.grouping;
    let Some(field) = args.confidence_field.or_else(|| grouping.confidence_field.clone()) else {
        return Ok(None);
    };
    let threshold = args
        .threshold
        .or(grouping.confidence_threshold)
        .with_context(|| format!("Confidence field {} given without a threshold", field))?;
    let direction = if args.higher_is_better {
        ScoreDirection::HigherIsBetter
    } else {
        grouping.confidence_direction.unwrap_or_default()
    };
    Ok(Some(ConfidenceFilter::new(field, threshold, direction)))
}
