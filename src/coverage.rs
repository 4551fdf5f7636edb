//! Sequence database backfill: descriptions, evidence levels, sequences and
//! sequence coverage of the proteins in the evidence store.

use log::{debug, info};

use crate::error::PipelineError;
use crate::input::{FastaRecord, InputError};
use crate::store::{EvidenceStore, StoreError};

/// Counts from a FASTA backfill
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillStats {
    /// FASTA entries read
    pub entries_read: usize,
    /// Entries matching a stored protein
    pub proteins_matched: usize,
}

/// Store sequence, description and evidence level of every FASTA entry
/// whose accession is a stored protein. Other entries are skipped.
pub fn backfill_from_fasta<I>(
    store: &mut EvidenceStore,
    records: I,
) -> Result<BackfillStats, PipelineError>
where
    I: IntoIterator<Item = Result<FastaRecord, InputError>>,
{
    let mut stats = BackfillStats::default();
    let mut sequences = Vec::new();
    let mut descriptions = Vec::new();
    let mut levels = Vec::new();
    for record in records {
        let record = record?;
        stats.entries_read += 1;
        if store.protein_id(&record.accession)?.is_none() {
            continue;
        }
        stats.proteins_matched += 1;
        if let Some(description) = record.description {
            descriptions.push((record.accession.clone(), description));
        }
        if let Some(level) = record.evidence_level {
            levels.push((record.accession.clone(), level));
        }
        sequences.push((record.accession, record.sequence));
    }
    store.store_sequences(&sequences)?;
    store.store_descriptions(&descriptions)?;
    store.store_evidence_levels(&levels)?;
    info!(
        "Backfilled {} of {} database entries",
        stats.proteins_matched, stats.entries_read
    );
    Ok(stats)
}

/// Fraction of `sequence` covered by at least one occurrence of any of the
/// peptides. Non-letters are stripped from the peptides and lowercase
/// residues are matched as uppercase.
pub fn sequence_coverage<S: AsRef<str>>(sequence: &str, peptides: &[S]) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }
    let residues = sequence.as_bytes();
    let mut covered = vec![false; residues.len()];
    for peptide in peptides {
        let bare: Vec<u8> = peptide
            .as_ref()
            .bytes()
            .filter(u8::is_ascii_alphabetic)
            .map(|b| b.to_ascii_uppercase())
            .collect();
        if bare.is_empty() || bare.len() > residues.len() {
            continue;
        }
        for start in 0..=(residues.len() - bare.len()) {
            if residues[start..start + bare.len()] == bare[..] {
                covered[start..start + bare.len()].fill(true);
            }
        }
    }
    covered.iter().filter(|&&c| c).count() as f64 / residues.len() as f64
}

/// Compute and store the coverage of every protein with a stored sequence.
///
/// All coverages are computed before any is written. Returns the number of
/// proteins covered.
pub fn backfill_coverage(store: &mut EvidenceStore) -> Result<usize, StoreError> {
    let coverage: Vec<(String, f64)> = store
        .sequences_with_peptides()?
        .into_iter()
        .map(|(acc, sequence, peptides)| {
            let fraction = sequence_coverage(&sequence, &peptides);
            debug!("{}: coverage {:.3}", acc, fraction);
            (acc, fraction)
        })
        .collect();
    store.store_coverage(&coverage)?;
    info!("Stored sequence coverage of {} proteins", coverage.len());
    Ok(coverage.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::load_evidence;
    use crate::input::{FastaReader, PsmColumns, PsmTsvReader};

    const PSM_TABLE: &str = "\
#SpecFile\tScanNum\tPeptide\tProtein\tMSGFScore
a\t1\tPEPT\tP1\t10
a\t2\tDEK\tP1;P2\t20
a\t3\tM+15.995PEP\tP2\t30
";

    const FASTA: &str = "\
>P1 First protein PE=1
MPEPTIDEK
>P2 Second protein PE=3
MPEPDEK
>P9 Not identified
MKKKK
";

    fn loaded_store() -> EvidenceStore {
        let mut store = EvidenceStore::open_in_memory().unwrap();
        let reader = PsmTsvReader::from_reader(PSM_TABLE.as_bytes(), &PsmColumns::default());
        load_evidence(&mut store, reader.unwrap(), None).unwrap();
        store
    }

    #[test]
    fn test_sequence_coverage() {
        assert_eq!(sequence_coverage("MPEPTIDEK", &["PEPT"]), 4.0 / 9.0);
        assert_eq!(sequence_coverage("MPEPTIDEK", &["PEPT", "TIDEK"]), 8.0 / 9.0);
        assert_eq!(sequence_coverage("MPEPTIDEK", &["XYZ"]), 0.0);
        assert_eq!(sequence_coverage("", &["PEPT"]), 0.0);
    }

    #[test]
    fn test_coverage_counts_every_occurrence() {
        assert_eq!(sequence_coverage("PEPKPEP", &["PEP"]), 6.0 / 7.0);
    }

    #[test]
    fn test_coverage_strips_modifications() {
        assert_eq!(sequence_coverage("MPEPDEK", &["M+15.995PEP"]), 4.0 / 7.0);
        assert_eq!(sequence_coverage("MPEPDEK", &["M+15.995PEP", "dEK"]), 1.0);
    }

    #[test]
    fn test_backfill_from_fasta() {
        let mut store = loaded_store();
        let stats = backfill_from_fasta(&mut store, FastaReader::new(FASTA.as_bytes())).unwrap();

        assert_eq!(
            stats,
            BackfillStats {
                entries_read: 3,
                proteins_matched: 2,
            }
        );
        let info = store.protein_info("P2").unwrap();
        assert_eq!(info.description.as_deref(), Some("Second protein PE=3"));
        assert_eq!(info.evidence_level, Some(3.0));
        assert_eq!(info.coverage, None);
        assert_eq!(store.protein_id("P9").unwrap(), None);
    }

    #[test]
    fn test_backfill_coverage() {
        let mut store = loaded_store();
        backfill_from_fasta(&mut store, FastaReader::new(FASTA.as_bytes())).unwrap();

        assert_eq!(backfill_coverage(&mut store).unwrap(), 2);
        // P1: PEPT and DEK cover 7 of 9 residues
        assert_eq!(store.protein_info("P1").unwrap().coverage, Some(7.0 / 9.0));
        // P2: MPEP and DEK cover 7 of 7
        assert_eq!(store.protein_info("P2").unwrap().coverage, Some(1.0));
    }
}
