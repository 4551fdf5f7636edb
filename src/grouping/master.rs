use std::collections::HashSet;

use log::{debug, info};

use super::graph::{EvidenceGraph, PsmEvidence};
use crate::store::{EvidenceStore, PeptideId, StoreError};

/// Masters among the candidates of one PSM.
///
/// A candidate is redundant when its peptide set is a proper subset of
/// another candidate's. All other candidates are masters, so candidates with
/// equal peptide sets are tied masters. A candidate missing from `graph` has
/// no evidence. Masters are returned in candidate order.
pub fn select_masters(candidates: &[String], graph: &EvidenceGraph) -> Vec<String> {
    let empty: HashSet<PeptideId> = HashSet::new();
    let peptides = |acc: &str| graph.get(acc).unwrap_or(&empty);
    candidates
        .iter()
        .filter(|p| {
            let p_peps = peptides(p.as_str());
            !candidates.iter().any(|q| {
                let q_peps = peptides(q.as_str());
                q != *p && p_peps.len() < q_peps.len() && p_peps.is_subset(q_peps)
            })
        })
        .cloned()
        .collect()
}

/// Accumulates masters and PSM→master associations over a PSM stream
#[derive(Debug, Default)]
pub struct MasterSelector {
    masters: Vec<String>,
    known: HashSet<String>,
    seen_psms: HashSet<String>,
    associations: Vec<(String, String)>,
    tied_psms: usize,
}

impl MasterSelector {
    /// Empty selector
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the masters of one PSM, returning them.
    ///
    /// Only the first row of a PSM is recorded; further rows of an unrolled
    /// PSM carry the same candidates.
    pub fn add(&mut self, evidence: &PsmEvidence) -> Vec<String> {
        let masters = select_masters(&evidence.candidates, &evidence.graph);
        if !self.seen_psms.insert(evidence.psm_id.clone()) {
            return masters;
        }
        if masters.len() > 1 {
            debug!(
                "PSM {} (row {}) has {} tied masters",
                evidence.psm_id,
                evidence.rownr,
                masters.len()
            );
            self.tied_psms += 1;
        }
        for master in &masters {
            if self.known.insert(master.clone()) {
                self.masters.push(master.clone());
            }
            self.associations
                .push((evidence.psm_id.clone(), master.clone()));
        }
        masters
    }

    /// Distinct masters in order of first selection
    pub fn masters(&self) -> &[String] {
        &self.masters
    }

    /// PSM id → master accession pairs
    pub fn associations(&self) -> &[(String, String)] {
        &self.associations
    }

    /// Number of PSMs with more than one master
    pub fn tied_psms(&self) -> usize {
        self.tied_psms
    }

    /// Store the master list and associations
    pub fn persist(&self, store: &mut EvidenceStore) -> Result<(), StoreError> {
        info!(
            "Selected {} masters, {} PSMs with tied masters",
            self.masters.len(),
            self.tied_psms
        );
        store.store_masters(&self.masters, &self.associations)
    }
}
