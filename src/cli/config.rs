//! TOML configuration file support.
//!
//! Column names and defaults shared between runs can live in a config file
//! instead of being repeated on every command line:
//!
//! ```toml
//! # protgroup.toml
//! [input]
//! psm_id_columns = ["#SpecFile", "ScanNum", "Peptide"]
//! protein_column = "Protein"
//! score_column = "MSGFScore"
//! isobaric_channels = ["126", "127", "128"]
//! amount_psms_suffix = " - # quanted PSMs"
//! fdr_column = "q-value"
//!
//! [grouping]
//! confidence_field = "QValue"
//! confidence_threshold = 0.01
//! confidence_direction = "lower-is-better"
//! unrolled = false
//!
//! [report]
//! dimensions = ["isobaric", "fdr"]
//! protein_data = true
//! ```
//!
//! Command line flags override config values.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use protgroup::input::{ProteinTableColumns, PsmColumns, ScoreDirection};
use protgroup::report::Dimension;

/// Root configuration structure for protgroup.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Input table column names.
    #[serde(default)]
    pub input: InputConfig,

    /// Settings for the group command.
    #[serde(default)]
    pub grouping: GroupingConfig,

    /// Settings for the report command.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Column names of the PSM and protein tables.
#[derive(Debug, Default, Deserialize)]
pub struct InputConfig {
    /// Columns joined into the PSM identifier.
    pub psm_id_columns: Option<Vec<String>>,

    /// PSM table protein column.
    pub protein_column: Option<String>,

    /// PSM table peptide column.
    pub peptide_column: Option<String>,

    /// PSM table score column.
    pub score_column: Option<String>,

    /// Protein table accession column.
    pub accession_column: Option<String>,

    /// Protein table isobaric channel columns.
    pub isobaric_channels: Option<Vec<String>>,

    /// Suffix of the quanted-PSM count column of each channel.
    pub amount_psms_suffix: Option<String>,

    /// Protein table precursor quant column.
    pub precursor_column: Option<String>,

    /// Protein table probability column.
    pub probability_column: Option<String>,

    /// Protein table FDR column.
    pub fdr_column: Option<String>,

    /// Protein table PEP column.
    pub pep_column: Option<String>,
}

/// Configuration for the group command.
#[derive(Debug, Default, Deserialize)]
pub struct GroupingConfig {
    /// PSM table column the confidence filter reads.
    pub confidence_field: Option<String>,

    /// Exclusive confidence threshold.
    pub confidence_threshold: Option<f64>,

    /// Whether low or high confidence values are better.
    pub confidence_direction: Option<ScoreDirection>,

    /// Rows list a single protein each.
    pub unrolled: Option<bool>,
}

/// Configuration for the report command.
#[derive(Debug, Default, Deserialize)]
pub struct ReportConfig {
    /// Dimensions reported per pool.
    pub dimensions: Option<Vec<Dimension>>,

    /// Add description, coverage, evidence level and group columns.
    pub protein_data: Option<bool>,

    /// Report every protein instead of masters only.
    pub all_proteins: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load a config file if one was given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// PSM table columns, configured values over defaults.
    pub fn psm_columns(&self) -> PsmColumns {
        let defaults = PsmColumns::default();
        let input = &self.input;
        PsmColumns {
            psm_id: input.psm_id_columns.clone().unwrap_or(defaults.psm_id),
            protein: input.protein_column.clone().unwrap_or(defaults.protein),
            peptide: input.peptide_column.clone().unwrap_or(defaults.peptide),
            score: input.score_column.clone().unwrap_or(defaults.score),
            confidence: None,
        }
    }

    /// Protein table columns, configured values over defaults.
    pub fn protein_table_columns(&self) -> ProteinTableColumns {
        let defaults = ProteinTableColumns::default();
        let input = &self.input;
        ProteinTableColumns {
            accession: input.accession_column.clone().unwrap_or(defaults.accession),
            isobaric_channels: input.isobaric_channels.clone().unwrap_or_default(),
            amount_psms_suffix: input.amount_psms_suffix.clone(),
            precursor: input.precursor_column.clone(),
            probability: input.probability_column.clone(),
            fdr: input.fdr_column.clone(),
            pep: input.pep_column.clone(),
        }
    }
}
