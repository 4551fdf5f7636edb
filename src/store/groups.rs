use std::collections::{HashMap, HashSet};

use log::info;
use rusqlite::{params, OptionalExtension};

use super::evidence::EvidenceTuple;
use super::schema::{PROTEIN_GROUP_CONTENT, PROTEIN_GROUP_MASTER, PSM_PROTEIN_GROUPS};
use super::{EvidenceStore, StoreError};
use crate::grouping::GroupMember;

/// A stored master protein
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Master {
    /// Row id in `protein_group_master`
    pub master_id: i64,
    /// Protein accession
    pub accession: String,
}

/// One member row of a protein group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupContentRow {
    /// Member protein accession
    pub protein_acc: String,
    /// Master of the group
    pub master_id: i64,
    /// Distinct peptides linking the member to the master's evidence
    pub peptide_count: i64,
    /// Distinct PSMs linking the member to the master's evidence
    pub psm_count: i64,
    /// Sum of the integer PSM scores
    pub protein_score: i64,
}

impl EvidenceStore {
    /// Store the master protein list and the PSM→master associations.
    ///
    /// Every master named by an association must be in `masters`, and
    /// every PSM must already be stored.
    pub fn store_masters(
        &mut self,
        masters: &[String],
        psm_masters: &[(String, String)],
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut insert_master =
                tx.prepare("INSERT INTO protein_group_master(protein_acc) VALUES (?1)")?;
            let mut master_ids: HashMap<&str, i64> = HashMap::with_capacity(masters.len());
            for acc in masters {
                insert_master
                    .execute([acc])
                    .map_err(|e| StoreError::from_row(e, PROTEIN_GROUP_MASTER, acc))?;
                master_ids.insert(acc.as_str(), tx.last_insert_rowid());
            }

            let mut insert_assoc = tx.prepare(
                "INSERT OR IGNORE INTO psm_protein_groups(psm_id, master_id) VALUES (?1, ?2)",
            )?;
            for (psm_id, master) in psm_masters {
                let master_id = master_ids
                    .get(master.as_str())
                    .ok_or_else(|| StoreError::integrity(PSM_PROTEIN_GROUPS, master.as_str()))?;
                insert_assoc
                    .execute(params![psm_id, master_id])
                    .map_err(|e| StoreError::from_row(e, PSM_PROTEIN_GROUPS, psm_id))?;
            }
        }
        tx.commit()?;
        self.index_column("psm_pg_index", PSM_PROTEIN_GROUPS, "master_id")?;
        info!(
            "Stored {} masters with {} PSM associations",
            masters.len(),
            psm_masters.len()
        );
        Ok(())
    }

    /// All masters, ordered by id
    pub fn masters(&self) -> Result<Vec<Master>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT master_id, protein_acc FROM protein_group_master ORDER BY master_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Master {
                master_id: row.get(0)?,
                accession: row.get(1)?,
            })
        })?;
        let masters = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(masters)
    }

    /// Master row of an accession, if it is a master
    pub fn master(&self, accession: &str) -> Result<Option<Master>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT master_id, protein_acc FROM protein_group_master WHERE protein_acc = ?1",
                [accession],
                |row| {
                    Ok(Master {
                        master_id: row.get(0)?,
                        accession: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    /// Masters associated with the PSM of a source table row, by accession
    pub fn masters_for_row(&self, rownr: u64) -> Result<Vec<Master>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT pgm.master_id, pgm.protein_acc FROM psmrows AS pr \
             JOIN psm_protein_groups AS ppg USING(psm_id) \
             JOIN protein_group_master AS pgm USING(master_id) \
             WHERE pr.rownr = ?1 ORDER BY pgm.protein_acc",
        )?;
        let rows = stmt.query_map([rownr as i64], |row| {
            Ok(Master {
                master_id: row.get(0)?,
                accession: row.get(1)?,
            })
        })?;
        let masters = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(masters)
    }

    /// Evidence tuples of every protein sharing a PSM with `master`,
    /// restricted to the master's PSMs
    pub fn master_group_evidence(&self, master: &str) -> Result<Vec<EvidenceTuple>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT pp.protein_acc, p.pep_id, p.score, pp.psm_id FROM protein_psm AS pp \
             JOIN psms AS p USING(psm_id) \
             WHERE pp.psm_id IN (SELECT psm_id FROM protein_psm WHERE protein_acc = ?1)",
        )?;
        let rows = stmt.query_map([master], |row| {
            Ok(EvidenceTuple {
                protein_acc: row.get(0)?,
                pep_id: row.get(1)?,
                score: row.get(2)?,
                psm_id: row.get(3)?,
            })
        })?;
        let tuples = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(tuples)
    }

    /// Proteins sharing a PSM with `master` that are evidenced by at least
    /// one peptide the master is not evidenced by
    pub fn proteins_with_missing_peptides(
        &self,
        master: &str,
    ) -> Result<HashSet<String>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT DISTINCT pp.protein_acc FROM protein_psm AS pp \
             JOIN psms AS p USING(psm_id) \
             WHERE pp.protein_acc IN (\
                 SELECT protein_acc FROM protein_psm WHERE psm_id IN (\
                     SELECT psm_id FROM protein_psm WHERE protein_acc = ?1)) \
             AND p.pep_id NOT IN (\
                 SELECT mp.pep_id FROM protein_psm AS mpp \
                 JOIN psms AS mp USING(psm_id) WHERE mpp.protein_acc = ?1)",
        )?;
        let rows = stmt.query_map([master], |row| row.get(0))?;
        let proteins = rows.collect::<Result<HashSet<String>, _>>()?;
        Ok(proteins)
    }

    /// Store the members of all protein groups
    pub fn store_protein_group_content(
        &mut self,
        rows: &[GroupContentRow],
    ) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO protein_group_content(protein_acc, master_id, peptide_count, \
                 psm_count, protein_score) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.protein_acc,
                    row.master_id,
                    row.peptide_count,
                    row.psm_count,
                    row.protein_score
                ])
                .map_err(|e| {
                    StoreError::from_row(
                        e,
                        PROTEIN_GROUP_CONTENT,
                        &format!("{} (master {})", row.protein_acc, row.master_id),
                    )
                })?;
            }
        }
        tx.commit()?;
        self.index_column("pgc_master_index", PROTEIN_GROUP_CONTENT, "master_id")?;
        Ok(rows.len())
    }

    /// Members of one protein group with their aggregates and coverage
    pub fn group_members(&self, master_id: i64) -> Result<Vec<GroupMember>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT pgc.protein_acc, pgc.peptide_count, pgc.psm_count, pgc.protein_score, \
             pc.coverage FROM protein_group_content AS pgc \
             LEFT OUTER JOIN protein_coverage AS pc USING(protein_acc) \
             WHERE pgc.master_id = ?1",
        )?;
        let rows = stmt.query_map([master_id], |row| {
            Ok(GroupMember {
                accession: row.get(0)?,
                peptide_count: row.get(1)?,
                psm_count: row.get(2)?,
                score: row.get(3)?,
                coverage: row.get(4)?,
            })
        })?;
        let members = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(members)
    }
}
