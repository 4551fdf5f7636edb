use std::collections::{HashMap, HashSet};

use log::debug;

use crate::error::PipelineError;
use crate::input::{ConfidenceFilter, InputError, PsmRecord};
use crate::store::{EvidenceStore, PeptideId, StoreError};
use crate::store::schema::PROTEIN_PSM;

/// Full peptide evidence set per protein accession
pub type EvidenceGraph = HashMap<String, HashSet<PeptideId>>;

/// Candidate proteins of one PSM and their peptide evidence
#[derive(Debug, Clone, PartialEq)]
pub struct PsmEvidence {
    /// Source row number
    pub rownr: u64,
    /// PSM identifier
    pub psm_id: String,
    /// Distinct candidate accessions, in input order
    pub candidates: Vec<String>,
    /// Peptide set of every candidate
    pub graph: EvidenceGraph,
}

/// Row counts of one graph building pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// Rows read from the PSM stream
    pub rows_read: usize,
    /// Rows failing the confidence filter
    pub rows_filtered: usize,
    /// Passing rows without any candidate protein
    pub without_candidates: usize,
}

/// Turns a PSM record stream into per-PSM candidate evidence, looking up
/// peptide sets in the evidence store.
///
/// Consecutive PSMs with the same candidate list reuse the previous
/// lookup.
pub struct GraphBuilder<'s, I> {
    store: &'s EvidenceStore,
    records: I,
    filter: Option<ConfidenceFilter>,
    unrolled: bool,
    last: Option<(Vec<String>, EvidenceGraph)>,
    stats: GraphStats,
}

impl<'s, I> GraphBuilder<'s, I>
where
    I: Iterator<Item = Result<PsmRecord, InputError>>,
{
    /// Build over a record stream. With `unrolled`, candidates are the
    /// proteins the store associates with the PSM id rather than those
    /// listed on the row.
    pub fn new(
        store: &'s EvidenceStore,
        records: I,
        filter: Option<ConfidenceFilter>,
        unrolled: bool,
    ) -> Self {
        Self {
            store,
            records,
            filter,
            unrolled,
            last: None,
            stats: GraphStats::default(),
        }
    }

    /// Counts so far
    pub fn stats(&self) -> GraphStats {
        self.stats
    }

    fn candidates(&self, record: &PsmRecord) -> Result<Vec<String>, StoreError> {
        if self.unrolled {
            return self.store.proteins_for_psm(&record.psm_id);
        }
        let mut seen = HashSet::with_capacity(record.proteins.len());
        Ok(record
            .proteins
            .iter()
            .filter(|acc| seen.insert(acc.as_str()))
            .cloned()
            .collect())
    }

    fn evidence_graph(&mut self, candidates: &[String]) -> Result<EvidenceGraph, StoreError> {
        if let Some((last_candidates, graph)) = &self.last {
            if last_candidates.as_slice() == candidates {
                return Ok(graph.clone());
            }
        }
        let graph = self.store.peptide_sets(candidates)?;
        if let Some(missing) = candidates.iter().find(|acc| !graph.contains_key(*acc)) {
            return Err(StoreError::integrity(PROTEIN_PSM, missing.as_str()));
        }
        self.last = Some((candidates.to_vec(), graph.clone()));
        Ok(graph)
    }

    fn build(&mut self, record: PsmRecord) -> Result<Option<PsmEvidence>, PipelineError> {
        if let Some(filter) = &self.filter {
            if !filter.passes(record.confidence) {
                debug!("Row {} fails the {} filter", record.rownr, filter.field);
                self.stats.rows_filtered += 1;
                return Ok(None);
            }
        }
        let candidates = self.candidates(&record)?;
        if candidates.is_empty() {
            debug!("Row {} has no candidate proteins", record.rownr);
            self.stats.without_candidates += 1;
            return Ok(None);
        }
        let graph = self.evidence_graph(&candidates)?;
        Ok(Some(PsmEvidence {
            rownr: record.rownr,
            psm_id: record.psm_id,
            candidates,
            graph,
        }))
    }
}

impl<'s, I> Iterator for GraphBuilder<'s, I>
where
    I: Iterator<Item = Result<PsmRecord, InputError>>,
{
    type Item = Result<PsmEvidence, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e.into())),
            };
            self.stats.rows_read += 1;
            match self.build(record) {
                Ok(Some(evidence)) => return Some(Ok(evidence)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
