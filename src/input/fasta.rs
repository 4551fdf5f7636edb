use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use super::InputError;

/// One protein entry of a FASTA sequence database
#[derive(Debug, Clone, PartialEq)]
pub struct FastaRecord {
    /// First whitespace-separated token of the header
    pub accession: String,
    /// Rest of the header line
    pub description: Option<String>,
    /// UniProt protein existence level (`PE=`) from the header
    pub evidence_level: Option<f64>,
    /// Concatenated sequence lines
    pub sequence: String,
}

impl FastaRecord {
    fn from_header(header: &str) -> Self {
        let header = header.trim();
        let (accession, description) = match header.split_once(char::is_whitespace) {
            Some((acc, rest)) => (acc, Some(rest.trim().to_string())),
            None => (header, None),
        };
        let evidence_level = description.as_deref().and_then(|d| {
            d.split_whitespace()
                .find_map(|token| token.strip_prefix("PE="))
                .and_then(|pe| pe.parse::<f64>().ok())
        });
        Self {
            accession: accession.to_string(),
            description,
            evidence_level,
            sequence: String::new(),
        }
    }
}

/// Streaming FASTA reader
pub struct FastaReader<R: BufRead> {
    lines: Lines<R>,
    current: Option<FastaRecord>,
}

impl FastaReader<BufReader<File>> {
    /// Open a FASTA file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, InputError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> FastaReader<R> {
    /// Read FASTA from any buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            current: None,
        }
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<FastaRecord, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => return Some(Err(e.into())),
                None => return self.current.take().map(Ok),
            };
            let line = line.trim_end();
            if let Some(header) = line.strip_prefix('>') {
                let finished = self.current.replace(FastaRecord::from_header(header));
                if let Some(record) = finished {
                    return Some(Ok(record));
                }
            } else if !line.is_empty() {
                match self.current.as_mut() {
                    Some(record) => record.sequence.push_str(line.trim()),
                    None => return Some(Err(InputError::InvalidFasta(line.to_string()))),
                }
            }
        }
    }
}
