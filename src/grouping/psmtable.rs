use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};

use log::info;

use super::content::sorted_group;
use crate::error::PipelineError;
use crate::input::{parse_proteins, tsv_reader_builder, InputError, NA};
use crate::report::TsvWriter;
use crate::store::{EvidenceStore, Master, StoreError};

/// Header of the masters column
pub const MASTER_HEADER: &str = "Master protein(s)";
/// Header of the group content column
pub const CONTENT_HEADER: &str = "Protein group(s) content";
/// Header of the matching protein count column
pub const AMOUNT_HEADER: &str = "Amount of matching proteins in group(s)";

/// Copies a PSM table, inserting the protein group columns after its
/// protein column
pub struct PsmTableAnnotator<'s> {
    store: &'s EvidenceStore,
    groups: HashMap<i64, Vec<String>>,
}

impl<'s> PsmTableAnnotator<'s> {
    /// Annotator reading groups from `store`
    pub fn new(store: &'s EvidenceStore) -> Self {
        Self {
            store,
            groups: HashMap::new(),
        }
    }

    /// Annotate every row of a PSM table. Rows are matched to stored PSMs
    /// by position. Returns the number of rows written.
    pub fn annotate<R: Read, W: Write>(
        &mut self,
        reader: R,
        protein_column: &str,
        writer: &mut TsvWriter<W>,
    ) -> Result<usize, PipelineError> {
        let mut csv_reader = tsv_reader_builder().from_reader(reader);
        let header = csv_reader.headers()?.clone();
        let protein_idx = header
            .iter()
            .position(|h| h.trim() == protein_column)
            .ok_or_else(|| InputError::MissingColumn(protein_column.to_string()))?;

        writer.write_header(insert_after(
            header.iter(),
            protein_idx,
            [MASTER_HEADER, CONTENT_HEADER, AMOUNT_HEADER],
        ))?;

        let mut annotated = 0;
        for (rownr, record) in csv_reader.records().enumerate() {
            let record = record?;
            let masters = self.store.masters_for_row(rownr as u64)?;
            let columns = if masters.is_empty() {
                [NA.to_string(), NA.to_string(), NA.to_string()]
            } else {
                annotated += 1;
                let proteins = parse_proteins(record.get(protein_idx).unwrap_or(""));
                self.columns(&masters, &proteins)?
            };
            let [master_col, content_col, amount_col] = &columns;
            writer.write_row(insert_after(
                record.iter(),
                protein_idx,
                [master_col.as_str(), content_col.as_str(), amount_col.as_str()],
            ))?;
        }
        info!(
            "Annotated {} of {} PSM rows with protein groups",
            annotated,
            writer.rows_written()
        );
        Ok(writer.rows_written())
    }

    fn columns(
        &mut self,
        masters: &[Master],
        proteins: &[String],
    ) -> Result<[String; 3], StoreError> {
        let own: HashSet<&str> = proteins.iter().map(String::as_str).collect();
        let mut contents = Vec::with_capacity(masters.len());
        let mut amounts = Vec::with_capacity(masters.len());
        for master in masters {
            let group = self.group(master)?;
            amounts.push(
                group
                    .iter()
                    .filter(|acc| own.contains(acc.as_str()))
                    .count()
                    .to_string(),
            );
            contents.push(group.join(","));
        }
        let names: Vec<&str> = masters.iter().map(|m| m.accession.as_str()).collect();
        Ok([names.join(";"), contents.join(";"), amounts.join(";")])
    }

    fn group(&mut self, master: &Master) -> Result<&Vec<String>, StoreError> {
        match self.groups.entry(master.master_id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(sorted_group(self.store, master)?)),
        }
    }
}

/// Fields of `row` with `extra` inserted after position `idx`
fn insert_after<'a>(
    row: impl Iterator<Item = &'a str>,
    idx: usize,
    extra: [&'a str; 3],
) -> Vec<&'a str> {
    let mut out = Vec::new();
    for (i, field) in row.enumerate() {
        out.push(field);
        if i == idx {
            out.extend(extra);
        }
    }
    out
}
