//! End-to-end tests of the grouping and report pipeline
//!
//! Each test writes its inputs to a temporary directory and runs the stages
//! the way the command line does: group, backfill, annotate, import, report.

use protgroup::coverage::{backfill_coverage, backfill_from_fasta};
use protgroup::grouping::{group_psm_table, GroupingOptions, PsmTableAnnotator};
use protgroup::input::{FastaReader, ProteinTableColumns, PsmColumns};
use protgroup::report::{
    import_protein_table_file, Dimension, ReportAssembler, ReportOptions, TsvWriter,
};
use protgroup::store::{schema, EvidenceStore};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// PSM1 evidences A{p1,p2} and B{p1,p2,p3}, PSM2 evidences B, PSM3 C{p4}
const PSM_TABLE: &str = "\
#SpecFile\tScanNum\tPeptide\tProtein\tMSGFScore\tQValue
run1.mzML\t100\tPEPTIDEONE\tA;B\t55\t0.001
run1.mzML\t101\tPEPTIDETWO\tA;B\t40\t0.002
run1.mzML\t102\tPEPTIDETHREE\tB\t31\t0.003
run1.mzML\t103\tPEPTIDEFOUR\tC\t20\t0.004
run1.mzML\t104\tDECOYPEPTIDE\tD\t5\t0.5
";

const FASTA: &str = "\
>A Protein A OS=Homo sapiens PE=2
MPEPTIDEONEKPEPTIDETWOK
>B Protein B OS=Homo sapiens PE=1
MPEPTIDEONEKPEPTIDETWOKPEPTIDETHREEK
>C Protein C OS=Homo sapiens PE=1
PEPTIDEFOUR
>Z Unidentified OS=Homo sapiens PE=5
MKKK
";

const SET_A: &str = "\
Protein accession\t126\t127\tq-value
B\t100.0\t200.0\t0.001
C\t50.0\tNA\t0.01
";

const SET_B: &str = "\
Protein accession\t126\t127\tq-value
B\t110.0\t190.0\t0.002
";

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn grouping_options() -> GroupingOptions {
    GroupingOptions {
        filter: Some(protgroup::input::ConfidenceFilter::new(
            "QValue",
            0.01,
            protgroup::input::ScoreDirection::LowerIsBetter,
        )),
        unrolled: false,
    }
}

#[test]
fn test_subset_protein_grouping() {
    let dir = tempdir().unwrap();
    let psms = write(&dir, "psms.tsv", PSM_TABLE);
    let mut store = EvidenceStore::create(dir.path().join("lookup.sqlite")).unwrap();

    let stats = group_psm_table(&mut store, &psms, &PsmColumns::default(), &grouping_options())
        .unwrap();

    assert_eq!(stats.rows_read, 5);
    assert_eq!(stats.rows_filtered, 1);
    let masters: Vec<String> = store
        .masters()
        .unwrap()
        .into_iter()
        .map(|m| m.accession)
        .collect();
    assert_eq!(masters, vec!["B", "C"]);

    // A is never a master; B's group holds A with two peptides
    let b = store.master("B").unwrap().unwrap();
    let members = store.group_members(b.master_id).unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].accession, "A");
    assert_eq!(members[0].peptide_count, 2);
    assert_eq!(members[0].psm_count, 2);
    assert_eq!(members[0].score, 95);
}

#[test]
fn test_tied_masters() {
    let table = "\
#SpecFile\tScanNum\tPeptide\tProtein\tMSGFScore
run1.mzML\t1\tPEPTIDEONE\tX;Y\t10
run1.mzML\t2\tPEPTIDETWO\tX;Y\t10
";
    let dir = tempdir().unwrap();
    let psms = write(&dir, "psms.tsv", table);
    let mut store = EvidenceStore::open_in_memory().unwrap();

    let stats = group_psm_table(
        &mut store,
        &psms,
        &PsmColumns::default(),
        &GroupingOptions::default(),
    )
    .unwrap();

    assert_eq!(stats.masters, 2);
    assert_eq!(stats.psms_with_tied_masters, 2);
    let row_masters: Vec<String> = store
        .masters_for_row(0)
        .unwrap()
        .into_iter()
        .map(|m| m.accession)
        .collect();
    assert_eq!(row_masters, vec!["X", "Y"]);
    assert_eq!(store.count(schema::PSM_PROTEIN_GROUPS).unwrap(), 4);
}

#[test]
fn test_full_pipeline() {
    let dir = tempdir().unwrap();
    let psms = write(&dir, "psms.tsv", PSM_TABLE);
    let fasta = write(&dir, "db.fasta", FASTA);
    let set_a = write(&dir, "setA.tsv", SET_A);
    let set_b = write(&dir, "setB.tsv", SET_B);
    let store_path = dir.path().join("lookup.sqlite");
    let psm_out = dir.path().join("psms_grouped.tsv");
    let report_out = dir.path().join("proteins.tsv");
    let columns = PsmColumns::default();

    // Group
    {
        let mut store = EvidenceStore::create(&store_path).unwrap();
        group_psm_table(&mut store, &psms, &columns, &grouping_options()).unwrap();

        let backfill = backfill_from_fasta(&mut store, FastaReader::from_path(&fasta).unwrap())
            .unwrap();
        assert_eq!(backfill.entries_read, 4);
        // Z is not identified and D is not in the database
        assert_eq!(backfill.proteins_matched, 3);
        assert_eq!(backfill_coverage(&mut store).unwrap(), 3);

        let mut writer = TsvWriter::from_path(&psm_out).unwrap();
        let rows = PsmTableAnnotator::new(&store)
            .annotate(fs::File::open(&psms).unwrap(), &columns.protein, &mut writer)
            .unwrap();
        writer.finish().unwrap();
        assert_eq!(rows, 5);
    }

    let lines = read_lines(&psm_out);
    assert_eq!(lines.len(), 6);
    assert!(lines[0].contains("Protein\tMaster protein(s)\tProtein group(s) content"));
    assert!(lines[1].ends_with("A;B\tB\tB,A\t2\t55\t0.001"));
    assert!(lines[4].ends_with("C\tC\tC\t1\t20\t0.004"));
    assert!(lines[5].ends_with("D\tNA\tNA\tNA\t5\t0.5"));

    // Import pools into the reopened store
    {
        let mut store = EvidenceStore::open(&store_path).unwrap();
        let table_columns = ProteinTableColumns {
            isobaric_channels: vec!["126".to_string(), "127".to_string()],
            fdr: Some("q-value".to_string()),
            ..Default::default()
        };
        import_protein_table_file(&mut store, "setA", &set_a, &table_columns).unwrap();
        import_protein_table_file(&mut store, "setB", &set_b, &table_columns).unwrap();
    }

    // Report
    let store = EvidenceStore::open(&store_path).unwrap();
    let options = ReportOptions {
        dimensions: [Dimension::Isobaric, Dimension::Fdr].into_iter().collect(),
        protein_data: true,
        masters_only: true,
    };
    let assembler = ReportAssembler::new(&store, &options).unwrap();
    let mut writer = TsvWriter::from_path(&report_out).unwrap();
    let stats = assembler.write_to(&mut writer).unwrap();
    writer.finish().unwrap();
    assert_eq!(stats.proteins, 2);

    let lines = read_lines(&report_out);
    let header: Vec<&str> = lines[0].split('\t').collect();
    assert_eq!(
        header,
        vec![
            "Protein accession",
            "Description",
            "Coverage",
            "Evidence level",
            "Protein group content",
            "# Proteins",
            "setA_126",
            "setA_127",
            "setB_126",
            "setB_127",
            "setA_q-value",
            "setB_q-value",
        ]
    );
    let b: Vec<&str> = lines[1].split('\t').collect();
    assert_eq!(b[0], "B");
    assert_eq!(b[1], "Protein B OS=Homo sapiens PE=1");
    assert_eq!(b[3], "1");
    assert_eq!(b[4], "B,A");
    assert_eq!(b[5], "2");
    assert_eq!(&b[6..], ["100", "200", "110", "190", "0.001", "0.002"]);

    let c: Vec<&str> = lines[2].split('\t').collect();
    assert_eq!(c[0], "C");
    assert_eq!(c[2], "1");
    assert_eq!(&c[4..], ["C", "1", "50", "NA", "NA", "NA", "0.01", "NA"]);
    assert!(lines.iter().all(|l| l.split('\t').count() == header.len()));

    let report = store.check().unwrap();
    assert!(!report.has_failures());
}

#[test]
fn test_create_refuses_existing_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lookup.sqlite");
    drop(EvidenceStore::create(&path).unwrap());

    assert!(EvidenceStore::create(&path).is_err());
}

#[test]
fn test_import_unknown_protein_fails() {
    let dir = tempdir().unwrap();
    let psms = write(&dir, "psms.tsv", PSM_TABLE);
    let table = write(&dir, "setA.tsv", "Protein accession\tq-value\nNOPE\t0.1\n");
    let mut store = EvidenceStore::open_in_memory().unwrap();
    group_psm_table(
        &mut store,
        &psms,
        &PsmColumns::default(),
        &GroupingOptions::default(),
    )
    .unwrap();

    let columns = ProteinTableColumns {
        fdr: Some("q-value".to_string()),
        ..Default::default()
    };
    let result = import_protein_table_file(&mut store, "setA", &table, &columns);
    assert!(result.is_err());
}
