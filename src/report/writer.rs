use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::ReportError;

/// Tab-separated writer for reports and annotated PSM tables
pub struct TsvWriter<W: Write> {
    inner: csv::Writer<W>,
    rows_written: usize,
}

impl TsvWriter<File> {
    /// Create (or truncate) an output file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        Ok(Self::from_writer(File::create(path)?))
    }
}

impl<W: Write> TsvWriter<W> {
    /// Write TSV to any writer
    pub fn from_writer(writer: W) -> Self {
        let inner = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Never)
            .flexible(false)
            .from_writer(writer);
        Self {
            inner,
            rows_written: 0,
        }
    }

    /// Write the header row
    pub fn write_header<I, T>(&mut self, header: I) -> Result<(), ReportError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.inner.write_record(header)?;
        Ok(())
    }

    /// Write one data row
    pub fn write_row<I, T>(&mut self, row: I) -> Result<(), ReportError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.inner.write_record(row)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Number of data rows written so far
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and return the underlying writer
    pub fn finish(self) -> Result<W, ReportError> {
        self.inner
            .into_inner()
            .map_err(|e| ReportError::IoError(e.into_error()))
    }
}
