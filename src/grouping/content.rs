use std::collections::{BTreeMap, HashSet};

use log::info;

use super::sort::sort_group;
use crate::store::{EvidenceStore, GroupContentRow, Master, PeptideId, StoreError};

#[derive(Default)]
struct MemberAggregate<'a> {
    peptides: HashSet<PeptideId>,
    psms: HashSet<&'a str>,
    score: i64,
}

/// Group content rows of one master.
///
/// Members are the proteins sharing a PSM with the master, except the
/// master itself and proteins evidenced by a peptide the master is not.
/// Counts and score are taken over the master's PSMs only.
pub fn group_content(
    store: &EvidenceStore,
    master: &Master,
) -> Result<Vec<GroupContentRow>, StoreError> {
    let evidence = store.master_group_evidence(&master.accession)?;
    let excluded = store.proteins_with_missing_peptides(&master.accession)?;

    let mut members: BTreeMap<&str, MemberAggregate<'_>> = BTreeMap::new();
    for tuple in &evidence {
        if tuple.protein_acc == master.accession || excluded.contains(&tuple.protein_acc) {
            continue;
        }
        let aggregate = members.entry(tuple.protein_acc.as_str()).or_default();
        aggregate.peptides.insert(tuple.pep_id);
        aggregate.psms.insert(tuple.psm_id.as_str());
        aggregate.score += tuple.score as i64;
    }

    Ok(members
        .into_iter()
        .map(|(acc, aggregate)| GroupContentRow {
            protein_acc: acc.to_string(),
            master_id: master.master_id,
            peptide_count: aggregate.peptides.len() as i64,
            psm_count: aggregate.psms.len() as i64,
            protein_score: aggregate.score,
        })
        .collect())
}

/// Assemble and store the content of every stored master's group.
///
/// All groups are computed before the first row is written. Returns the
/// number of rows stored.
pub fn assemble_group_content(store: &mut EvidenceStore) -> Result<usize, StoreError> {
    let mut rows = Vec::new();
    for master in store.masters()? {
        rows.extend(group_content(store, &master)?);
    }
    let stored = store.store_protein_group_content(&rows)?;
    info!("Stored {} protein group content rows", stored);
    Ok(stored)
}

/// Master followed by its group members in sort order
pub fn sorted_group(store: &EvidenceStore, master: &Master) -> Result<Vec<String>, StoreError> {
    let members = sort_group(store.group_members(master.master_id)?);
    Ok(std::iter::once(master.accession.clone())
        .chain(members.into_iter().map(|m| m.accession))
        .collect())
}
