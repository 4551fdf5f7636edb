use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::psm::tsv_reader_builder;
use super::{InputError, NA};

/// Column names used to read one pool's protein table
#[derive(Debug, Clone, PartialEq)]
pub struct ProteinTableColumns {
    /// Protein accession column
    pub accession: String,
    /// Isobaric quant channel columns
    pub isobaric_channels: Vec<String>,
    /// Suffix appended to a channel column name to find its quanted-PSM
    /// count column, e.g. ` - # quanted PSMs`
    pub amount_psms_suffix: Option<String>,
    /// Precursor (MS1) quant column
    pub precursor: Option<String>,
    /// Protein probability column
    pub probability: Option<String>,
    /// Protein FDR / q-value column
    pub fdr: Option<String>,
    /// Protein posterior error probability column
    pub pep: Option<String>,
}

impl Default for ProteinTableColumns {
    fn default() -> Self {
        Self {
            accession: "Protein accession".to_string(),
            isobaric_channels: Vec::new(),
            amount_psms_suffix: None,
            precursor: None,
            probability: None,
            fdr: None,
            pep: None,
        }
    }
}

impl ProteinTableColumns {
    /// Name of the quanted-PSM count column of `channel`, if configured
    pub fn amount_psms_column(&self, channel: &str) -> Option<String> {
        self.amount_psms_suffix
            .as_ref()
            .map(|suffix| format!("{channel}{suffix}"))
    }
}

/// Isobaric value of one channel for one protein
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelValue {
    /// Quant value
    pub value: Option<f64>,
    /// Number of PSMs the value was computed from
    pub amount_psms: Option<i64>,
}

/// One protein row of a protein table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProteinTableRow {
    /// Protein accession
    pub accession: String,
    /// Values in the order of [`ProteinTableColumns::isobaric_channels`]
    pub channels: Vec<ChannelValue>,
    /// Precursor quant value
    pub precursor: Option<f64>,
    /// Protein probability
    pub probability: Option<f64>,
    /// Protein FDR
    pub fdr: Option<f64>,
    /// Protein PEP
    pub pep: Option<f64>,
}

/// Read a whole protein table
pub fn read_protein_table<P: AsRef<Path>>(
    path: P,
    columns: &ProteinTableColumns,
) -> Result<Vec<ProteinTableRow>, InputError> {
    read_protein_table_from(File::open(path)?, columns)
}

/// Read a whole protein table from any reader
pub fn read_protein_table_from<R: Read>(
    reader: R,
    columns: &ProteinTableColumns,
) -> Result<Vec<ProteinTableRow>, InputError> {
    let mut csv_reader = tsv_reader_builder().from_reader(reader);
    let header = csv_reader.headers()?.clone();
    let find = |name: &str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| InputError::MissingColumn(name.to_string()))
    };
    let optional = |name: &Option<String>| name.as_deref().map(find).transpose();

    let accession = find(&columns.accession)?;
    let channels = columns
        .isobaric_channels
        .iter()
        .map(|ch| {
            let amount = columns
                .amount_psms_column(ch)
                .map(|name| find(&name))
                .transpose()?;
            Ok((find(ch)?, amount))
        })
        .collect::<Result<Vec<_>, InputError>>()?;
    let precursor = optional(&columns.precursor)?;
    let probability = optional(&columns.probability)?;
    let fdr = optional(&columns.fdr)?;
    let pep = optional(&columns.pep)?;

    let mut rows = Vec::new();
    for (rownr, record) in csv_reader.records().enumerate() {
        let record = record?;
        let rownr = rownr as u64;
        let value = |idx: Option<usize>| -> Result<Option<f64>, InputError> {
            match idx {
                Some(idx) => parse_optional(&record, idx, rownr, &header),
                None => Ok(None),
            }
        };
        let accession = record.get(accession).unwrap_or("").trim();
        if accession.is_empty() {
            continue;
        }
        let channels = channels
            .iter()
            .map(|&(value_idx, amount_idx)| {
                Ok(ChannelValue {
                    value: value(Some(value_idx))?,
                    amount_psms: value(amount_idx)?.map(|n| n as i64),
                })
            })
            .collect::<Result<Vec<_>, InputError>>()?;
        rows.push(ProteinTableRow {
            accession: accession.to_string(),
            channels,
            precursor: value(precursor)?,
            probability: value(probability)?,
            fdr: value(fdr)?,
            pep: value(pep)?,
        });
    }
    Ok(rows)
}

fn parse_optional(
    record: &csv::StringRecord,
    idx: usize,
    rownr: u64,
    header: &csv::StringRecord,
) -> Result<Option<f64>, InputError> {
    let text = record.get(idx).unwrap_or("").trim();
    if text.is_empty() || text == NA {
        return Ok(None);
    }
    text.parse::<f64>()
        .map(Some)
        .map_err(|_| InputError::InvalidValue {
            row: rownr,
            column: header.get(idx).unwrap_or("").to_string(),
            value: text.to_string(),
        })
}
