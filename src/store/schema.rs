//! Table layout of the evidence store.
//!
//! Identification tables are keyed by protein accession text, value tables
//! for the report dimensions are keyed by the numeric `pacc_id` of the
//! `proteins` table and by the protein table (and thereby the pool) the
//! values came from.

/// Proteins, one row per accession
pub const PROTEINS: &str = "proteins";
/// Protein sequences from the search database
pub const PROTEIN_SEQ: &str = "protein_seq";
/// Protein existence / evidence level
pub const PROTEIN_EVIDENCE: &str = "protein_evidence";
/// Sequence coverage fraction per protein
pub const PROTEIN_COVERAGE: &str = "protein_coverage";
/// Protein descriptions
pub const PROT_DESC: &str = "prot_desc";
/// Distinct peptide sequences
pub const PEPTIDE_SEQUENCES: &str = "peptide_sequences";
/// PSMs with their peptide and search engine score
pub const PSMS: &str = "psms";
/// Source table row number to PSM mapping
pub const PSMROWS: &str = "psmrows";
/// Protein to PSM evidence relation
pub const PROTEIN_PSM: &str = "protein_psm";
/// Master proteins
pub const PROTEIN_GROUP_MASTER: &str = "protein_group_master";
/// PSM to master association
pub const PSM_PROTEIN_GROUPS: &str = "psm_protein_groups";
/// Non-master members of each protein group
pub const PROTEIN_GROUP_CONTENT: &str = "protein_group_content";
/// Pools (sample sets)
pub const BIOSETS: &str = "biosets";
/// Protein tables, one per imported pool file
pub const PROTEIN_TABLES: &str = "protein_tables";
/// Isobaric quant channels per protein table
pub const PROTQUANT_CHANNELS: &str = "protquant_channels";
/// Isobaric quant values
pub const PROTEIN_ISO_QUANTED: &str = "protein_iso_quanted";
/// Precursor (MS1) quant values
pub const PROTEIN_PRECUR_QUANTED: &str = "protein_precur_quanted";
/// Protein probabilities
pub const PROTEIN_PROBABILITY: &str = "protein_probability";
/// Protein FDR (q-values)
pub const PROTEIN_FDR: &str = "protein_fdr";
/// Protein posterior error probabilities
pub const PROTEIN_PEP: &str = "protein_pep";

/// Connection settings applied to every opened store
pub(crate) const PRAGMAS: &str = "
PRAGMA foreign_keys = ON;
PRAGMA synchronous = OFF;
";

/// Table definitions. Only keys needed for referential integrity carry an
/// index here; lookup indexes are built after their bulk insert commits.
pub(crate) const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS proteins (
    pacc_id INTEGER PRIMARY KEY,
    protein_acc TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS protein_seq (
    protein_acc TEXT NOT NULL UNIQUE REFERENCES proteins(protein_acc),
    sequence TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS protein_evidence (
    protein_acc TEXT NOT NULL UNIQUE REFERENCES proteins(protein_acc),
    evidence_lvl REAL
);
CREATE TABLE IF NOT EXISTS protein_coverage (
    protein_acc TEXT NOT NULL UNIQUE REFERENCES proteins(protein_acc),
    coverage REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS prot_desc (
    protein_acc TEXT NOT NULL UNIQUE REFERENCES proteins(protein_acc),
    description TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS peptide_sequences (
    pep_id INTEGER PRIMARY KEY,
    sequence TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS psms (
    psm_id TEXT PRIMARY KEY,
    pep_id INTEGER NOT NULL REFERENCES peptide_sequences(pep_id),
    score REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS psmrows (
    rownr INTEGER PRIMARY KEY,
    psm_id TEXT NOT NULL REFERENCES psms(psm_id)
);
CREATE TABLE IF NOT EXISTS protein_psm (
    protein_acc TEXT NOT NULL REFERENCES proteins(protein_acc),
    psm_id TEXT NOT NULL REFERENCES psms(psm_id),
    UNIQUE(protein_acc, psm_id)
);
CREATE TABLE IF NOT EXISTS protein_group_master (
    master_id INTEGER PRIMARY KEY,
    protein_acc TEXT NOT NULL UNIQUE REFERENCES proteins(protein_acc)
);
CREATE TABLE IF NOT EXISTS psm_protein_groups (
    psm_id TEXT NOT NULL REFERENCES psms(psm_id),
    master_id INTEGER NOT NULL REFERENCES protein_group_master(master_id),
    UNIQUE(psm_id, master_id)
);
CREATE TABLE IF NOT EXISTS protein_group_content (
    protein_acc TEXT NOT NULL REFERENCES proteins(protein_acc),
    master_id INTEGER NOT NULL REFERENCES protein_group_master(master_id),
    peptide_count INTEGER NOT NULL,
    psm_count INTEGER NOT NULL,
    protein_score INTEGER NOT NULL,
    UNIQUE(protein_acc, master_id)
);
CREATE TABLE IF NOT EXISTS biosets (
    set_id INTEGER PRIMARY KEY,
    set_name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS protein_tables (
    prottable_id INTEGER PRIMARY KEY,
    set_id INTEGER NOT NULL REFERENCES biosets(set_id),
    prottable_file TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS protquant_channels (
    channel_id INTEGER PRIMARY KEY,
    prottable_id INTEGER NOT NULL REFERENCES protein_tables(prottable_id),
    channel_name TEXT NOT NULL,
    amount_psms_name TEXT,
    UNIQUE(prottable_id, channel_name)
);
CREATE TABLE IF NOT EXISTS protein_iso_quanted (
    pacc_id INTEGER NOT NULL REFERENCES proteins(pacc_id),
    channel_id INTEGER NOT NULL REFERENCES protquant_channels(channel_id),
    quantvalue REAL,
    amount_psms INTEGER
);
CREATE TABLE IF NOT EXISTS protein_precur_quanted (
    pacc_id INTEGER NOT NULL REFERENCES proteins(pacc_id),
    prottable_id INTEGER NOT NULL REFERENCES protein_tables(prottable_id),
    quantvalue REAL
);
CREATE TABLE IF NOT EXISTS protein_probability (
    pacc_id INTEGER NOT NULL REFERENCES proteins(pacc_id),
    prottable_id INTEGER NOT NULL REFERENCES protein_tables(prottable_id),
    probability REAL
);
CREATE TABLE IF NOT EXISTS protein_fdr (
    pacc_id INTEGER NOT NULL REFERENCES proteins(pacc_id),
    prottable_id INTEGER NOT NULL REFERENCES protein_tables(prottable_id),
    fdr REAL
);
CREATE TABLE IF NOT EXISTS protein_pep (
    pacc_id INTEGER NOT NULL REFERENCES proteins(pacc_id),
    prottable_id INTEGER NOT NULL REFERENCES protein_tables(prottable_id),
    pep REAL
);
";

/// Every table in creation order, checked by `count` and the health check
pub const ALL_TABLES: &[&str] = &[
    PROTEINS,
    PROTEIN_SEQ,
    PROTEIN_EVIDENCE,
    PROTEIN_COVERAGE,
    PROT_DESC,
    PEPTIDE_SEQUENCES,
    PSMS,
    PSMROWS,
    PROTEIN_PSM,
    PROTEIN_GROUP_MASTER,
    PSM_PROTEIN_GROUPS,
    PROTEIN_GROUP_CONTENT,
    BIOSETS,
    PROTEIN_TABLES,
    PROTQUANT_CHANNELS,
    PROTEIN_ISO_QUANTED,
    PROTEIN_PRECUR_QUANTED,
    PROTEIN_PROBABILITY,
    PROTEIN_FDR,
    PROTEIN_PEP,
];
