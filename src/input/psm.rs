use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::InputError;

/// One row of a PSM table
#[derive(Debug, Clone, PartialEq)]
pub struct PsmRecord {
    /// Zero-based data row number, assigned before any filtering
    pub rownr: u64,
    /// PSM identifier, shared by all rows of an unrolled PSM
    pub psm_id: String,
    /// Peptide sequence
    pub peptide: String,
    /// Search engine score, summed into protein scores
    pub score: f64,
    /// Value of the confidence filter column, if one is configured
    pub confidence: Option<f64>,
    /// Candidate protein accessions listed on this row
    pub proteins: Vec<String>,
}

/// Column names used to read a PSM table
#[derive(Debug, Clone, PartialEq)]
pub struct PsmColumns {
    /// Columns whose values, joined by `_`, identify a PSM
    pub psm_id: Vec<String>,
    /// Protein accession(s) column, `;` separated
    pub protein: String,
    /// Peptide sequence column
    pub peptide: String,
    /// Search engine score column
    pub score: String,
    /// Confidence filter column
    pub confidence: Option<String>,
}

impl Default for PsmColumns {
    fn default() -> Self {
        Self {
            psm_id: vec![
                "#SpecFile".to_string(),
                "ScanNum".to_string(),
                "Peptide".to_string(),
            ],
            protein: "Protein".to_string(),
            peptide: "Peptide".to_string(),
            score: "MSGFScore".to_string(),
            confidence: None,
        }
    }
}

struct ColumnIndices {
    psm_id: Vec<usize>,
    protein: usize,
    peptide: usize,
    score: usize,
    confidence: Option<usize>,
}

impl ColumnIndices {
    fn resolve(header: &csv::StringRecord, columns: &PsmColumns) -> Result<Self, InputError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| InputError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            psm_id: columns
                .psm_id
                .iter()
                .map(|c| find(c.as_str()))
                .collect::<Result<_, _>>()?,
            protein: find(&columns.protein)?,
            peptide: find(&columns.peptide)?,
            score: find(&columns.score)?,
            confidence: columns.confidence.as_deref().map(find).transpose()?,
        })
    }
}

/// Streaming reader turning a tab-separated PSM table into [`PsmRecord`]s
pub struct PsmTsvReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    header: csv::StringRecord,
    indices: ColumnIndices,
    columns: PsmColumns,
    next_row: u64,
}

impl PsmTsvReader<File> {
    /// Open a PSM table file
    pub fn from_path<P: AsRef<Path>>(path: P, columns: &PsmColumns) -> Result<Self, InputError> {
        Self::from_reader(File::open(path)?, columns)
    }
}

impl<R: Read> PsmTsvReader<R> {
    /// Read a PSM table from any reader
    pub fn from_reader(reader: R, columns: &PsmColumns) -> Result<Self, InputError> {
        let mut csv_reader = tsv_reader_builder().from_reader(reader);
        let header = csv_reader.headers()?.clone();
        let indices = ColumnIndices::resolve(&header, columns)?;
        Ok(Self {
            records: csv_reader.into_records(),
            header,
            indices,
            columns: columns.clone(),
            next_row: 0,
        })
    }

    /// Header row of the table
    pub fn header(&self) -> &csv::StringRecord {
        &self.header
    }

    fn parse(&self, rownr: u64, record: &csv::StringRecord) -> Result<PsmRecord, InputError> {
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim();
        let psm_id = self
            .indices
            .psm_id
            .iter()
            .map(|&idx| cell(idx))
            .collect::<Vec<_>>()
            .join("_");
        let score_text = cell(self.indices.score);
        let score = score_text
            .parse::<f64>()
            .map_err(|_| InputError::InvalidValue {
                row: rownr,
                column: self.columns.score.clone(),
                value: score_text.to_string(),
            })?;
        Ok(PsmRecord {
            rownr,
            psm_id,
            peptide: cell(self.indices.peptide).to_string(),
            score,
            confidence: self
                .indices
                .confidence
                .and_then(|idx| cell(idx).parse::<f64>().ok()),
            proteins: parse_proteins(cell(self.indices.protein)),
        })
    }
}

impl<R: Read> Iterator for PsmTsvReader<R> {
    type Item = Result<PsmRecord, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };
        let rownr = self.next_row;
        self.next_row += 1;
        Some(self.parse(rownr, &record))
    }
}

/// Split a `;`-separated protein field into accessions.
///
/// Search engine decorations such as `(pre=K,post=R)` are removed.
pub fn parse_proteins(field: &str) -> Vec<String> {
    field
        .split(';')
        .map(|p| match p.find("(pre=") {
            Some(cut) => &p[..cut],
            None => p,
        })
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn tsv_reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .has_headers(true);
    builder
}
