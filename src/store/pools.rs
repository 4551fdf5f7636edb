use log::{debug, info};
use rusqlite::params;

use super::schema::{BIOSETS, PROTEINS, PROTEIN_ISO_QUANTED, PROTEIN_TABLES, PROTQUANT_CHANNELS};
use super::{EvidenceStore, StoreError};
use crate::report::Dimension;

/// Isobaric quant value of one protein in one channel
#[derive(Debug, Clone, PartialEq)]
pub struct IsobaricQuant {
    /// Protein accession, must be stored
    pub accession: String,
    /// Channel id returned by [`EvidenceStore::store_quant_channels`]
    pub channel_id: i64,
    /// Quant value
    pub value: Option<f64>,
    /// Number of PSMs the value was computed from
    pub amount_psms: Option<i64>,
}

impl EvidenceStore {
    /// Store a pool name, returning its id. Storing a known pool returns the
    /// existing id.
    pub fn store_pool(&mut self, name: &str) -> Result<i64, StoreError> {
        self.conn
            .execute("INSERT OR IGNORE INTO biosets(set_name) VALUES (?1)", [name])?;
        let set_id = self.conn.query_row(
            "SELECT set_id FROM biosets WHERE set_name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(set_id)
    }

    /// Register a protein table file for a stored pool
    pub fn store_protein_table(&mut self, pool: &str, file: &str) -> Result<i64, StoreError> {
        let set_id: i64 = self
            .conn
            .query_row(
                "SELECT set_id FROM biosets WHERE set_name = ?1",
                [pool],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::integrity(BIOSETS, pool),
                e => e.into(),
            })?;
        self.conn
            .execute(
                "INSERT INTO protein_tables(set_id, prottable_file) VALUES (?1, ?2)",
                params![set_id, file],
            )
            .map_err(|e| StoreError::from_row(e, PROTEIN_TABLES, file))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Store the isobaric channels of a protein table, each with the name of
    /// its quanted-PSM count field if it has one. Returns the channel ids in
    /// input order.
    pub fn store_quant_channels(
        &mut self,
        prottable_id: i64,
        channels: &[(String, Option<String>)],
    ) -> Result<Vec<i64>, StoreError> {
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(channels.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO protquant_channels(prottable_id, channel_name, amount_psms_name) \
                 VALUES (?1, ?2, ?3)",
            )?;
            for (name, amount_psms_name) in channels {
                stmt.execute(params![prottable_id, name, amount_psms_name])
                    .map_err(|e| StoreError::from_row(e, PROTQUANT_CHANNELS, name))?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(ids)
    }

    /// Store isobaric quant values
    pub fn store_isobaric_quants(&mut self, quants: &[IsobaricQuant]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut lookup = tx.prepare("SELECT pacc_id FROM proteins WHERE protein_acc = ?1")?;
            let mut stmt = tx.prepare(
                "INSERT INTO protein_iso_quanted(pacc_id, channel_id, quantvalue, amount_psms) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for quant in quants {
                let pacc_id = pacc_id(&mut lookup, &quant.accession)?;
                stmt.execute(params![pacc_id, quant.channel_id, quant.value, quant.amount_psms])
                    .map_err(|e| {
                        StoreError::from_row(
                            e,
                            PROTEIN_ISO_QUANTED,
                            &format!("channel {}", quant.channel_id),
                        )
                    })?;
            }
        }
        tx.commit()?;
        self.index_column("isoq_pacc_index", PROTEIN_ISO_QUANTED, "pacc_id")?;
        debug!("Stored {} isobaric quant values", quants.len());
        Ok(())
    }

    /// Store one protein-keyed dimension (precursor quant, probability, FDR
    /// or PEP) of a protein table
    pub fn store_dimension_values(
        &mut self,
        dimension: Dimension,
        prottable_id: i64,
        values: &[(String, Option<f64>)],
    ) -> Result<(), StoreError> {
        let desc = dimension.descriptor();
        if desc.keyed_by_channel {
            return Err(StoreError::ChannelKeyed(desc.name));
        }
        let tx = self.conn.transaction()?;
        {
            let mut lookup = tx.prepare("SELECT pacc_id FROM proteins WHERE protein_acc = ?1")?;
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {}(pacc_id, prottable_id, {}) VALUES (?1, ?2, ?3)",
                desc.value_table, desc.value_column
            ))?;
            for (acc, value) in values {
                let pacc_id = pacc_id(&mut lookup, acc)?;
                stmt.execute(params![pacc_id, prottable_id, value])
                    .map_err(|e| StoreError::from_row(e, desc.value_table, acc))?;
            }
        }
        tx.commit()?;
        self.index_column(
            &format!("{}_pacc_index", desc.value_table),
            desc.value_table,
            "pacc_id",
        )?;
        info!(
            "Stored {} {} values for protein table {}",
            values.len(),
            desc.name,
            prottable_id
        );
        Ok(())
    }

    /// Stored pool names, sorted
    pub fn pool_names(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT set_name FROM biosets ORDER BY set_name")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    /// Distinct isobaric channels with their quanted-PSM field names,
    /// sorted by channel name
    pub fn isobaric_channels(&self) -> Result<Vec<(String, Option<String>)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT channel_name, MAX(amount_psms_name) FROM protquant_channels \
             GROUP BY channel_name ORDER BY channel_name",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Number of value rows stored for a dimension
    pub fn dimension_row_count(&self, dimension: Dimension) -> Result<usize, StoreError> {
        self.count(dimension.descriptor().value_table)
    }
}

fn pacc_id(lookup: &mut rusqlite::Statement<'_>, accession: &str) -> Result<i64, StoreError> {
    lookup
        .query_row([accession], |row| row.get(0))
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::integrity(PROTEINS, accession),
            e => e.into(),
        })
}
