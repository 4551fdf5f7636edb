use std::collections::BTreeMap;
use std::fmt;

/// A protein group member with the aggregates it is ordered by
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMember {
    /// Protein accession
    pub accession: String,
    /// Distinct peptides shared with the master's evidence
    pub peptide_count: i64,
    /// Distinct PSMs shared with the master's evidence
    pub psm_count: i64,
    /// Summed integer PSM score
    pub score: i64,
    /// Sequence coverage fraction, if backfilled
    pub coverage: Option<f64>,
}

/// Partition key produced by one sort criterion
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    /// Every member falls into the same partition
    Constant,
    /// Numeric key
    Count(i64),
    /// Text key
    Text(String),
}

/// One level of the sort cascade
#[derive(Clone, Copy)]
pub struct SortCriterion {
    /// Name, for logs and tests
    pub name: &'static str,
    /// Partition key of a member
    pub key: fn(&GroupMember) -> SortKey,
    /// Order partitions by descending key
    pub descending: bool,
}

impl fmt::Debug for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortCriterion")
            .field("name", &self.name)
            .field("descending", &self.descending)
            .finish()
    }
}

fn by_peptide_count(member: &GroupMember) -> SortKey {
    SortKey::Count(member.peptide_count)
}

fn by_psm_count(member: &GroupMember) -> SortKey {
    SortKey::Count(member.psm_count)
}

fn by_score(member: &GroupMember) -> SortKey {
    SortKey::Count(member.score)
}

// No-op until coverage takes part in the ordering.
fn by_coverage(_member: &GroupMember) -> SortKey {
    SortKey::Constant
}

fn by_accession(member: &GroupMember) -> SortKey {
    SortKey::Text(member.accession.clone())
}

/// Peptide count, PSM count and score descending, coverage, then accession
/// ascending
pub const DEFAULT_CRITERIA: [SortCriterion; 5] = [
    SortCriterion {
        name: "peptide count",
        key: by_peptide_count,
        descending: true,
    },
    SortCriterion {
        name: "PSM count",
        key: by_psm_count,
        descending: true,
    },
    SortCriterion {
        name: "score",
        key: by_score,
        descending: true,
    },
    SortCriterion {
        name: "coverage",
        key: by_coverage,
        descending: true,
    },
    SortCriterion {
        name: "accession",
        key: by_accession,
        descending: false,
    },
];

/// Order group members by [`DEFAULT_CRITERIA`]
pub fn sort_group(members: Vec<GroupMember>) -> Vec<GroupMember> {
    sort_by_criteria(members, &DEFAULT_CRITERIA)
}

/// Partition `members` by the first criterion, order the partitions, and
/// order each partition by the remaining criteria
pub fn sort_by_criteria(members: Vec<GroupMember>, criteria: &[SortCriterion]) -> Vec<GroupMember> {
    let Some((criterion, rest)) = criteria.split_first() else {
        return members;
    };
    if members.len() < 2 {
        return members;
    }
    let mut partitions: BTreeMap<SortKey, Vec<GroupMember>> = BTreeMap::new();
    for member in members {
        partitions
            .entry((criterion.key)(&member))
            .or_default()
            .push(member);
    }
    let mut ordered: Vec<Vec<GroupMember>> = partitions.into_values().collect();
    if criterion.descending {
        ordered.reverse();
    }
    ordered
        .into_iter()
        .flat_map(|partition| sort_by_criteria(partition, rest))
        .collect()
}
