//! Property tests for master selection and group ordering

use proptest::prelude::*;
use protgroup::grouping::{select_masters, sort_group, EvidenceGraph, GroupMember};
use std::collections::{BTreeSet, HashSet};

/// Up to eight candidates, each with up to six peptides out of ten
fn candidate_graph() -> impl Strategy<Value = (Vec<String>, EvidenceGraph)> {
    prop::collection::vec(prop::collection::hash_set(0i64..10, 0..6), 1..8).prop_map(|sets| {
        let candidates: Vec<String> = (0..sets.len()).map(|i| format!("P{i}")).collect();
        let graph: EvidenceGraph = candidates.iter().cloned().zip(sets).collect();
        (candidates, graph)
    })
}

fn group_members() -> impl Strategy<Value = Vec<GroupMember>> {
    prop::collection::btree_set("[A-Z][0-9]{1,3}", 0..20).prop_flat_map(|accessions| {
        let n = accessions.len();
        (
            Just(accessions),
            prop::collection::vec((1i64..4, 1i64..6, -5i64..50), n),
        )
            .prop_map(|(accessions, keys): (BTreeSet<String>, Vec<(i64, i64, i64)>)| {
                accessions
                    .into_iter()
                    .zip(keys)
                    .map(|(accession, (peptide_count, psm_count, score))| GroupMember {
                        accession,
                        peptide_count,
                        psm_count,
                        score,
                        coverage: None,
                    })
                    .collect::<Vec<_>>()
            })
    })
}

fn is_proper_subset(a: &HashSet<i64>, b: &HashSet<i64>) -> bool {
    a.len() < b.len() && a.is_subset(b)
}

proptest! {
    /// No master's peptide set is a proper subset of another candidate's
    #[test]
    fn test_masters_are_not_subsumed((candidates, graph) in candidate_graph()) {
        let masters = select_masters(&candidates, &graph);
        for master in &masters {
            for other in &candidates {
                prop_assert!(!is_proper_subset(&graph[master], &graph[other]));
            }
        }
    }

    /// Every candidate left out is subsumed by some other candidate
    #[test]
    fn test_non_masters_are_subsumed((candidates, graph) in candidate_graph()) {
        let masters: HashSet<String> = select_masters(&candidates, &graph).into_iter().collect();
        prop_assert!(!masters.is_empty());
        for candidate in candidates.iter().filter(|c| !masters.contains(*c)) {
            prop_assert!(candidates
                .iter()
                .any(|other| is_proper_subset(&graph[candidate], &graph[other])));
        }
    }

    /// Sorting keeps every member exactly once and follows the cascade
    #[test]
    fn test_sort_is_ordered_permutation(members in group_members()) {
        let sorted = sort_group(members.clone());
        prop_assert_eq!(sorted.len(), members.len());

        let key = |m: &GroupMember| {
            (
                std::cmp::Reverse(m.peptide_count),
                std::cmp::Reverse(m.psm_count),
                std::cmp::Reverse(m.score),
                m.accession.clone(),
            )
        };
        for pair in sorted.windows(2) {
            prop_assert!(key(&pair[0]) < key(&pair[1]));
        }
    }

    /// The order does not depend on the input order
    #[test]
    fn test_sort_is_deterministic(members in group_members()) {
        let mut reversed = members.clone();
        reversed.reverse();
        prop_assert_eq!(sort_group(members), sort_group(reversed));
    }
}
