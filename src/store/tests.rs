use super::*;
use crate::input::{ConfidenceFilter, PsmRecord, ScoreDirection};
use crate::report::Dimension;
use tempfile::tempdir;

fn record(rownr: u64, psm_id: &str, peptide: &str, score: f64, proteins: &[&str]) -> PsmRecord {
    PsmRecord {
        rownr,
        psm_id: psm_id.to_string(),
        peptide: peptide.to_string(),
        score,
        confidence: None,
        proteins: proteins.iter().map(|p| p.to_string()).collect(),
    }
}

fn accessions(accs: &[&str]) -> Vec<String> {
    accs.iter().map(|a| a.to_string()).collect()
}

/// Proteins A, B, C; B carries one peptide A lacks and C shares it with B
fn evidence_store() -> EvidenceStore {
    let mut store = EvidenceStore::open_in_memory().unwrap();
    store.store_proteins(&accessions(&["A", "B", "C"])).unwrap();
    store
        .store_psm_evidence(
            &[
                record(0, "psm1", "PEPA", 10.0, &["A", "B"]),
                record(1, "psm2", "PEPB", 20.0, &["A", "B"]),
                record(2, "psm3", "PEPC", 30.0, &["B", "C"]),
            ],
            None,
        )
        .unwrap();
    store.index_evidence().unwrap();
    store
}

// ==================== Store Lifecycle Tests ====================

#[test]
fn test_create_store_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lookup.sqlite");

    let store = EvidenceStore::create(&path).unwrap();
    assert!(path.exists());
    assert_eq!(store.path(), Some(path.as_path()));
    assert_eq!(store.count(schema::PROTEINS).unwrap(), 0);
}

#[test]
fn test_create_existing_store_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lookup.sqlite");
    drop(EvidenceStore::create(&path).unwrap());

    let result = EvidenceStore::create(&path);
    assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
}

#[test]
fn test_reopen_keeps_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lookup.sqlite");
    {
        let mut store = EvidenceStore::create(&path).unwrap();
        store.store_proteins(&accessions(&["P1", "P2"])).unwrap();
    }

    let store = EvidenceStore::open(&path).unwrap();
    assert_eq!(store.count(schema::PROTEINS).unwrap(), 2);
}

#[test]
fn test_open_missing_store_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("typo.sqlite");

    let result = EvidenceStore::open(&path);
    assert!(matches!(result, Err(StoreError::NotFound(_))));
    assert!(!path.exists());
}

#[test]
fn test_count_unknown_table() {
    let store = EvidenceStore::open_in_memory().unwrap();
    assert!(store.count("sqlite_master; DROP TABLE proteins").is_err());
}

// ==================== Evidence Tests ====================

#[test]
fn test_duplicate_protein() {
    let mut store = EvidenceStore::open_in_memory().unwrap();
    store.store_proteins(&accessions(&["P1"])).unwrap();

    let err = store.store_proteins(&accessions(&["P2", "P1"])).unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { key, .. } if key == "P1"));
    // The failing batch is rolled back as a whole
    assert_eq!(store.count(schema::PROTEINS).unwrap(), 1);
}

#[test]
fn test_upsert_proteins() {
    let mut store = EvidenceStore::open_in_memory().unwrap();
    assert_eq!(store.upsert_proteins(&accessions(&["P1", "P2"])).unwrap(), 2);
    assert_eq!(store.upsert_proteins(&accessions(&["P2", "P3"])).unwrap(), 1);
    assert_eq!(store.count(schema::PROTEINS).unwrap(), 3);
}

#[test]
fn test_evidence_for_unknown_protein() {
    let mut store = EvidenceStore::open_in_memory().unwrap();
    store.store_proteins(&accessions(&["A"])).unwrap();

    let err = store
        .store_psm_evidence(&[record(0, "psm1", "PEPA", 1.0, &["A", "X"])], None)
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Integrity { table: schema::PROTEIN_PSM, ref key } if key == "X"
    ));
    assert_eq!(store.count(schema::PSMS).unwrap(), 0);
}

#[test]
fn test_store_psm_evidence() {
    let store = evidence_store();
    assert_eq!(store.count(schema::PSMS).unwrap(), 3);
    assert_eq!(store.count(schema::PEPTIDE_SEQUENCES).unwrap(), 3);
    assert_eq!(store.count(schema::PROTEIN_PSM).unwrap(), 6);
    assert!(store.has_index("protpsmid_index").unwrap());
    assert!(!store.has_index("psm_pg_index").unwrap());
}

#[test]
fn test_filtered_rows_store_no_evidence() {
    let mut store = EvidenceStore::open_in_memory().unwrap();
    store.store_proteins(&accessions(&["A", "B"])).unwrap();
    let mut records = vec![
        record(0, "psm1", "PEPA", 1.0, &["A", "B"]),
        record(1, "psm2", "PEPB", 1.0, &["B"]),
    ];
    records[0].confidence = Some(0.001);
    records[1].confidence = Some(0.5);
    let filter = ConfidenceFilter::new("QValue", 0.01, ScoreDirection::LowerIsBetter);

    let added = store.store_psm_evidence(&records, Some(&filter)).unwrap();

    assert_eq!(added, 2);
    assert_eq!(store.count(schema::PSMS).unwrap(), 2);
    assert_eq!(store.count(schema::PSMROWS).unwrap(), 2);
    assert!(store.proteins_for_psm("psm2").unwrap().is_empty());
    let sets = store.peptide_sets(&accessions(&["A", "B"])).unwrap();
    assert_eq!(sets["A"], sets["B"]);
}

#[test]
fn test_unrolled_rows_share_psm() {
    let mut store = EvidenceStore::open_in_memory().unwrap();
    store.store_proteins(&accessions(&["A", "B"])).unwrap();
    let added = store
        .store_psm_evidence(
            &[
                record(0, "psm1", "PEPA", 5.0, &["A"]),
                record(1, "psm1", "PEPA", 5.0, &["B"]),
                record(2, "psm1", "PEPA", 5.0, &["A"]),
            ],
            None,
        )
        .unwrap();

    assert_eq!(added, 2);
    assert_eq!(store.count(schema::PSMS).unwrap(), 1);
    assert_eq!(store.count(schema::PSMROWS).unwrap(), 3);
    assert_eq!(store.proteins_for_psm("psm1").unwrap(), vec!["A", "B"]);
}

#[test]
fn test_peptide_sets() {
    let store = evidence_store();
    let sets = store.peptide_sets(&accessions(&["A", "B", "C"])).unwrap();

    assert_eq!(sets["A"].len(), 2);
    assert_eq!(sets["B"].len(), 3);
    assert_eq!(sets["C"].len(), 1);
    assert!(sets["A"].is_subset(&sets["B"]));
    assert!(sets["C"].is_subset(&sets["B"]));
}

#[test]
fn test_peptide_sets_without_evidence() {
    let mut store = evidence_store();
    store.store_proteins(&accessions(&["D"])).unwrap();

    let sets = store.peptide_sets(&accessions(&["D"])).unwrap();
    assert!(sets.is_empty());
    assert!(store.peptide_sets(&[]).unwrap().is_empty());
}

#[test]
fn test_protein_info() {
    let mut store = evidence_store();
    store
        .store_descriptions(&[("A".to_string(), "Protein A".to_string())])
        .unwrap();
    store.store_coverage(&[("A".to_string(), 0.5)]).unwrap();
    store.store_evidence_levels(&[("A".to_string(), 1.0)]).unwrap();

    let info = store.protein_info("A").unwrap();
    assert_eq!(info.description.as_deref(), Some("Protein A"));
    assert_eq!(info.coverage, Some(0.5));
    assert_eq!(info.evidence_level, Some(1.0));

    assert_eq!(store.protein_info("B").unwrap(), ProteinInfo::default());
    assert!(matches!(
        store.protein_info("Z"),
        Err(StoreError::Integrity { .. })
    ));
}

#[test]
fn test_backfill_unknown_protein() {
    let mut store = evidence_store();
    let err = store
        .store_sequences(&[("Z".to_string(), "MPEPTIDE".to_string())])
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Integrity { table: schema::PROTEIN_SEQ, .. }
    ));
}

#[test]
fn test_sequences_with_peptides() {
    let mut store = evidence_store();
    store
        .store_sequences(&[
            ("A".to_string(), "PEPAPEPB".to_string()),
            ("C".to_string(), "KPEPC".to_string()),
        ])
        .unwrap();

    let mut rows = store.sequences_with_peptides().unwrap();
    for row in &mut rows {
        row.2.sort();
    }
    assert_eq!(
        rows,
        vec![
            ("A".to_string(), "PEPAPEPB".to_string(), accessions(&["PEPA", "PEPB"])),
            ("C".to_string(), "KPEPC".to_string(), accessions(&["PEPC"])),
        ]
    );
}

// ==================== Group Tests ====================

#[test]
fn test_store_masters() {
    let mut store = evidence_store();
    store
        .store_masters(
            &accessions(&["B"]),
            &[
                ("psm1".to_string(), "B".to_string()),
                ("psm2".to_string(), "B".to_string()),
                ("psm3".to_string(), "B".to_string()),
            ],
        )
        .unwrap();

    let masters = store.masters().unwrap();
    assert_eq!(masters.len(), 1);
    assert_eq!(masters[0].accession, "B");
    assert_eq!(store.master("B").unwrap(), Some(masters[0].clone()));
    assert_eq!(store.master("A").unwrap(), None);
    assert_eq!(store.masters_for_row(2).unwrap(), masters);
    assert!(store.masters_for_row(7).unwrap().is_empty());
    assert!(store.has_index("psm_pg_index").unwrap());
}

#[test]
fn test_store_masters_unknown_master() {
    let mut store = evidence_store();
    let err = store
        .store_masters(&accessions(&["B"]), &[("psm1".to_string(), "A".to_string())])
        .unwrap_err();

    assert!(matches!(err, StoreError::Integrity { ref key, .. } if key == "A"));
    assert_eq!(store.count(schema::PROTEIN_GROUP_MASTER).unwrap(), 0);
}

#[test]
fn test_master_group_evidence() {
    let store = evidence_store();
    let mut tuples = store.master_group_evidence("A").unwrap();
    tuples.sort_by(|a, b| (&a.protein_acc, &a.psm_id).cmp(&(&b.protein_acc, &b.psm_id)));

    let keys: Vec<(&str, &str)> = tuples
        .iter()
        .map(|t| (t.protein_acc.as_str(), t.psm_id.as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![("A", "psm1"), ("A", "psm2"), ("B", "psm1"), ("B", "psm2")]
    );
    assert_eq!(tuples[1].score, 20.0);
}

#[test]
fn test_proteins_with_missing_peptides() {
    let store = evidence_store();

    let missing = store.proteins_with_missing_peptides("A").unwrap();
    assert_eq!(missing.into_iter().collect::<Vec<_>>(), vec!["B"]);
    assert!(store.proteins_with_missing_peptides("B").unwrap().is_empty());
}

#[test]
fn test_group_members() {
    let mut store = evidence_store();
    store
        .store_masters(&accessions(&["B"]), &[("psm1".to_string(), "B".to_string())])
        .unwrap();
    let master_id = store.master("B").unwrap().unwrap().master_id;
    store.store_coverage(&[("A".to_string(), 0.25)]).unwrap();
    store
        .store_protein_group_content(&[
            GroupContentRow {
                protein_acc: "A".to_string(),
                master_id,
                peptide_count: 2,
                psm_count: 2,
                protein_score: 30,
            },
            GroupContentRow {
                protein_acc: "C".to_string(),
                master_id,
                peptide_count: 1,
                psm_count: 1,
                protein_score: 30,
            },
        ])
        .unwrap();

    let mut members = store.group_members(master_id).unwrap();
    members.sort_by(|a, b| a.accession.cmp(&b.accession));
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].coverage, Some(0.25));
    assert_eq!(members[1].coverage, None);
    assert_eq!(members[1].score, 30);
    assert!(store.group_members(master_id + 1).unwrap().is_empty());
}

// ==================== Pool Tests ====================

#[test]
fn test_store_pool_is_idempotent() {
    let mut store = EvidenceStore::open_in_memory().unwrap();
    let first = store.store_pool("setA").unwrap();
    let second = store.store_pool("setA").unwrap();
    store.store_pool("setB").unwrap();

    assert_eq!(first, second);
    assert_eq!(store.pool_names().unwrap(), vec!["setA", "setB"]);
}

#[test]
fn test_protein_table_unknown_pool() {
    let mut store = EvidenceStore::open_in_memory().unwrap();
    let err = store.store_protein_table("setA", "a.tsv").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Integrity { table: schema::BIOSETS, .. }
    ));
}

#[test]
fn test_dimension_values() {
    let mut store = evidence_store();
    store.store_pool("setA").unwrap();
    let table = store.store_protein_table("setA", "a.tsv").unwrap();

    store
        .store_dimension_values(
            Dimension::Fdr,
            table,
            &[("A".to_string(), Some(0.01)), ("B".to_string(), None)],
        )
        .unwrap();
    assert_eq!(store.dimension_row_count(Dimension::Fdr).unwrap(), 2);
    assert_eq!(store.dimension_row_count(Dimension::Pep).unwrap(), 0);
    assert!(store.has_index("protein_fdr_pacc_index").unwrap());

    let err = store
        .store_dimension_values(Dimension::Pep, table, &[("Z".to_string(), Some(0.1))])
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Integrity { table: schema::PROTEINS, ref key } if key == "Z"
    ));

    let err = store
        .store_dimension_values(Dimension::Isobaric, table, &[])
        .unwrap_err();
    assert!(matches!(err, StoreError::ChannelKeyed(_)));
}

#[test]
fn test_isobaric_channels() {
    let mut store = evidence_store();
    store.store_pool("setA").unwrap();
    store.store_pool("setB").unwrap();
    let table_a = store.store_protein_table("setA", "a.tsv").unwrap();
    let table_b = store.store_protein_table("setB", "b.tsv").unwrap();

    let ids = store
        .store_quant_channels(
            table_a,
            &[
                ("127".to_string(), Some("127_n".to_string())),
                ("126".to_string(), Some("126_n".to_string())),
            ],
        )
        .unwrap();
    store
        .store_quant_channels(table_b, &[("126".to_string(), None)])
        .unwrap();
    store
        .store_isobaric_quants(&[IsobaricQuant {
            accession: "A".to_string(),
            channel_id: ids[0],
            value: Some(1.5),
            amount_psms: Some(3),
        }])
        .unwrap();

    assert_eq!(
        store.isobaric_channels().unwrap(),
        vec![
            ("126".to_string(), Some("126_n".to_string())),
            ("127".to_string(), Some("127_n".to_string())),
        ]
    );
    assert_eq!(store.dimension_row_count(Dimension::Isobaric).unwrap(), 1);
}

// ==================== Check Tests ====================

#[test]
fn test_check_empty_store() {
    let store = EvidenceStore::open_in_memory().unwrap();
    let report = store.check().unwrap();

    assert!(report.has_failures());
    assert!(report.has_warnings());
    assert_eq!(report.store, ":memory:");
    assert_eq!(report.first_failed_stage(), Some(Stage::Evidence));
    let text = report.to_string();
    assert!(text.starts_with("Evidence store :memory:\n"));
    assert!(text.contains("Store incomplete at evidence, run `protgroup group`"));
}

#[test]
fn test_check_grouped_store() {
    let mut store = evidence_store();
    store
        .store_masters(&accessions(&["B"]), &[("psm1".to_string(), "B".to_string())])
        .unwrap();

    let report = store.check().unwrap();
    assert!(!report.has_failures());
    assert_eq!(report.first_failed_stage(), None);
    // Group content, backfill and dimension tables are all empty
    assert!(report.has_warnings());
    let content = report
        .checks
        .iter()
        .find(|c| c.name == schema::PROTEIN_GROUP_CONTENT)
        .unwrap();
    assert_eq!(content.stage, Stage::Grouping);
    assert_eq!(content.rows, Some(0));
    assert!(matches!(content.status, CheckStatus::Warning(_)));
    assert!(!report.to_string().contains("Store incomplete"));
}

#[test]
fn test_check_ungrouped_store() {
    let store = evidence_store();
    let report = store.check().unwrap();

    assert_eq!(report.first_failed_stage(), Some(Stage::Grouping));
    let lines: Vec<String> = report.to_string().lines().map(str::to_string).collect();
    assert!(lines.contains(&"evidence".to_string()));
    assert!(lines.iter().any(|l| l.contains("protein_psm") && l.contains("6  ok")));
    assert!(lines
        .iter()
        .any(|l| l.contains("protein_group_master") && l.contains("FAILED")));
}

#[test]
fn test_check_report_json() {
    let store = evidence_store();
    let report = store.check().unwrap();
    let json = serde_json::to_value(&report).unwrap();

    let checks = json["checks"].as_array().unwrap();
    assert_eq!(checks[0]["stage"], "evidence");
    assert_eq!(checks[0]["name"], "proteins");
    assert_eq!(checks[0]["rows"], 3);
    assert_eq!(checks[0]["status"], "ok");
    assert!(checks
        .iter()
        .any(|c| c["status"] == "failed" && c["message"].is_string()));
}
