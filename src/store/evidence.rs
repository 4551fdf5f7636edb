use std::collections::{HashMap, HashSet};

use log::info;
use rusqlite::{params, params_from_iter, OptionalExtension};

use super::schema::{
    PEPTIDE_SEQUENCES, PROTEINS, PROTEIN_COVERAGE, PROTEIN_EVIDENCE, PROTEIN_PSM, PROTEIN_SEQ,
    PROT_DESC, PSMROWS, PSMS,
};
use super::{placeholders, EvidenceStore, StoreError};
use crate::input::{ConfidenceFilter, PsmRecord};

/// Row id of a distinct peptide sequence
pub type PeptideId = i64;

/// One (protein, peptide, score, PSM) evidence tuple
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceTuple {
    /// Protein accession
    pub protein_acc: String,
    /// Peptide of the PSM
    pub pep_id: PeptideId,
    /// PSM search engine score
    pub score: f64,
    /// PSM identifier
    pub psm_id: String,
}

/// Backfilled annotation of one protein
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProteinInfo {
    /// Description from the sequence database
    pub description: Option<String>,
    /// Sequence coverage fraction
    pub coverage: Option<f64>,
    /// Protein evidence level
    pub evidence_level: Option<f64>,
}

impl EvidenceStore {
    /// Insert protein accessions. An accession that is already stored is a
    /// [`StoreError::Duplicate`].
    pub fn store_proteins(&mut self, accessions: &[String]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO proteins(protein_acc) VALUES (?1)")?;
            for acc in accessions {
                stmt.execute([acc])
                    .map_err(|e| StoreError::from_row(e, PROTEINS, acc))?;
            }
        }
        tx.commit()?;
        Ok(accessions.len())
    }

    /// Insert protein accessions, skipping those already stored.
    ///
    /// Returns the number of newly stored proteins.
    pub fn upsert_proteins(&mut self, accessions: &[String]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO proteins(protein_acc) VALUES (?1)")?;
            for acc in accessions {
                inserted += stmt.execute([acc])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Store protein evidence levels
    pub fn store_evidence_levels(&mut self, levels: &[(String, f64)]) -> Result<(), StoreError> {
        self.store_protein_values(
            PROTEIN_EVIDENCE,
            "INSERT INTO protein_evidence(protein_acc, evidence_lvl) VALUES (?1, ?2)",
            levels,
        )
    }

    /// Store protein sequences
    pub fn store_sequences(&mut self, sequences: &[(String, String)]) -> Result<(), StoreError> {
        self.store_protein_values(
            PROTEIN_SEQ,
            "INSERT INTO protein_seq(protein_acc, sequence) VALUES (?1, ?2)",
            sequences,
        )
    }

    /// Store or overwrite protein descriptions
    pub fn store_descriptions(
        &mut self,
        descriptions: &[(String, String)],
    ) -> Result<(), StoreError> {
        self.store_protein_values(
            PROT_DESC,
            "INSERT OR REPLACE INTO prot_desc(protein_acc, description) VALUES (?1, ?2)",
            descriptions,
        )
    }

    /// Store or overwrite sequence coverage fractions
    pub fn store_coverage(&mut self, coverage: &[(String, f64)]) -> Result<(), StoreError> {
        self.store_protein_values(
            PROTEIN_COVERAGE,
            "INSERT OR REPLACE INTO protein_coverage(protein_acc, coverage) VALUES (?1, ?2)",
            coverage,
        )
    }

    fn store_protein_values<V: rusqlite::ToSql>(
        &mut self,
        table: &'static str,
        sql: &str,
        values: &[(String, V)],
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(sql)?;
            for (acc, value) in values {
                stmt.execute(params![acc, value])
                    .map_err(|e| StoreError::from_row(e, table, acc))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Store peptides, PSMs, source rows and the protein↔PSM evidence of a
    /// batch of PSM records.
    ///
    /// Every record gets its PSM and source row. Records failing `filter`
    /// get no evidence rows and so take no part in grouping. All proteins
    /// the records list must be stored beforehand. Rows of an unrolled PSM
    /// share one PSM and add to its evidence. Returns the number of evidence
    /// rows added.
    pub fn store_psm_evidence(
        &mut self,
        records: &[PsmRecord],
        filter: Option<&ConfidenceFilter>,
    ) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let mut evidence_rows = 0;
        {
            let mut insert_peptide =
                tx.prepare("INSERT OR IGNORE INTO peptide_sequences(sequence) VALUES (?1)")?;
            let mut select_peptide =
                tx.prepare("SELECT pep_id FROM peptide_sequences WHERE sequence = ?1")?;
            let mut insert_psm =
                tx.prepare("INSERT OR IGNORE INTO psms(psm_id, pep_id, score) VALUES (?1, ?2, ?3)")?;
            let mut insert_row = tx.prepare("INSERT INTO psmrows(rownr, psm_id) VALUES (?1, ?2)")?;
            let mut insert_evidence = tx.prepare(
                "INSERT OR IGNORE INTO protein_psm(protein_acc, psm_id) VALUES (?1, ?2)",
            )?;
            let mut peptide_ids: HashMap<&str, PeptideId> = HashMap::new();

            for record in records {
                let pep_id = match peptide_ids.get(record.peptide.as_str()) {
                    Some(&id) => id,
                    None => {
                        insert_peptide
                            .execute([&record.peptide])
                            .map_err(|e| StoreError::from_row(e, PEPTIDE_SEQUENCES, &record.peptide))?;
                        let id: PeptideId =
                            select_peptide.query_row([&record.peptide], |row| row.get(0))?;
                        peptide_ids.insert(record.peptide.as_str(), id);
                        id
                    }
                };
                insert_psm
                    .execute(params![record.psm_id, pep_id, record.score])
                    .map_err(|e| StoreError::from_row(e, PSMS, &record.psm_id))?;
                insert_row
                    .execute(params![record.rownr as i64, record.psm_id])
                    .map_err(|e| StoreError::from_row(e, PSMROWS, &record.rownr.to_string()))?;
                if filter.is_some_and(|f| !f.passes(record.confidence)) {
                    continue;
                }
                for acc in &record.proteins {
                    evidence_rows += insert_evidence
                        .execute(params![acc, record.psm_id])
                        .map_err(|e| StoreError::from_row(e, PROTEIN_PSM, acc))?;
                }
            }
        }
        tx.commit()?;
        info!("Stored {} protein-PSM evidence rows", evidence_rows);
        Ok(evidence_rows)
    }

    /// Build the lookup indexes over the evidence relation
    pub fn index_evidence(&self) -> Result<(), StoreError> {
        self.index_column("protpsmid_index", PROTEIN_PSM, "psm_id")?;
        self.index_column("psm_pep_index", PSMS, "pep_id")?;
        self.index_column("psmrows_psm_index", PSMROWS, "psm_id")
    }

    /// Numeric id of a stored protein
    pub fn protein_id(&self, accession: &str) -> Result<Option<i64>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT pacc_id FROM proteins WHERE protein_acc = ?1",
                [accession],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// All proteins evidenced by one PSM, ordered by accession
    pub fn proteins_for_psm(&self, psm_id: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT protein_acc FROM protein_psm WHERE psm_id = ?1 ORDER BY protein_acc",
        )?;
        let rows = stmt.query_map([psm_id], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    /// Full peptide evidence sets of the given proteins.
    ///
    /// Proteins without evidence are absent from the returned map.
    pub fn peptide_sets(
        &self,
        proteins: &[String],
    ) -> Result<HashMap<String, HashSet<PeptideId>>, StoreError> {
        let mut sets: HashMap<String, HashSet<PeptideId>> = HashMap::new();
        if proteins.is_empty() {
            return Ok(sets);
        }
        let sql = format!(
            "SELECT DISTINCT pp.protein_acc, p.pep_id FROM protein_psm AS pp \
             JOIN psms AS p USING(psm_id) WHERE pp.protein_acc IN ({})",
            placeholders(proteins.len())
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let mut rows = stmt.query(params_from_iter(proteins.iter()))?;
        while let Some(row) = rows.next()? {
            sets.entry(row.get(0)?).or_default().insert(row.get(1)?);
        }
        Ok(sets)
    }

    /// Description, coverage and evidence level of one protein
    pub fn protein_info(&self, accession: &str) -> Result<ProteinInfo, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT pd.description, pc.coverage, pev.evidence_lvl FROM proteins AS p \
             LEFT OUTER JOIN prot_desc AS pd USING(protein_acc) \
             LEFT OUTER JOIN protein_coverage AS pc USING(protein_acc) \
             LEFT OUTER JOIN protein_evidence AS pev USING(protein_acc) \
             WHERE p.protein_acc = ?1",
        )?;
        stmt.query_row([accession], |row| {
            Ok(ProteinInfo {
                description: row.get(0)?,
                coverage: row.get(1)?,
                evidence_level: row.get(2)?,
            })
        })
        .optional()?
        .ok_or_else(|| StoreError::integrity(PROTEINS, accession))
    }

    /// Every protein with a stored sequence, with the peptide sequences
    /// evidencing it
    pub fn sequences_with_peptides(
        &self,
    ) -> Result<Vec<(String, String, Vec<String>)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT ps.protein_acc, ps.sequence, peps.sequence FROM protein_seq AS ps \
             LEFT OUTER JOIN protein_psm AS pp USING(protein_acc) \
             LEFT OUTER JOIN psms AS p USING(psm_id) \
             LEFT OUTER JOIN peptide_sequences AS peps USING(pep_id) \
             ORDER BY ps.protein_acc",
        )?;
        let mut rows = stmt.query([])?;
        let mut out: Vec<(String, String, Vec<String>)> = Vec::new();
        while let Some(row) = rows.next()? {
            let acc: String = row.get(0)?;
            let peptide: Option<String> = row.get(2)?;
            if let Some(last) = out.last_mut().filter(|last| last.0 == acc) {
                last.2.extend(peptide);
                continue;
            }
            out.push((acc, row.get(1)?, peptide.into_iter().collect()));
        }
        Ok(out)
    }
}
