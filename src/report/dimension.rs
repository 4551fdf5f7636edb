use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::store::schema;

/// Optional per-pool value dimension of the protein report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Isobaric (reporter ion) quant, one value per channel
    Isobaric,
    /// Precursor (MS1) quant
    Precursor,
    /// Protein probability
    Probability,
    /// Protein FDR / q-value
    Fdr,
    /// Protein posterior error probability
    Pep,
}

/// Fixed description of how one dimension is stored, joined and reported
#[derive(Debug)]
pub struct DimensionDescriptor {
    /// Lowercase name, as used on the command line
    pub name: &'static str,
    /// Alias of the dimension's joined subquery
    pub alias: &'static str,
    /// Value table in the store
    pub value_table: &'static str,
    /// Value column of the value table
    pub value_column: &'static str,
    /// Values reference a quant channel instead of a protein table
    pub keyed_by_channel: bool,
    /// Column map field names, in select order
    pub fields: &'static [&'static str],
    /// Select expressions inside the dimension's subquery, aligned with
    /// `fields`
    pub columns: &'static [&'static str],
    /// Field holding the pool name
    pub pool_field: &'static str,
    /// Field holding the value
    pub value_field: &'static str,
    /// Report header suffix; isobaric headers use the channel names
    pub header: &'static str,
}

static DESCRIPTORS: [DimensionDescriptor; 5] = [
    DimensionDescriptor {
        name: "isobaric",
        alias: "iso",
        value_table: schema::PROTEIN_ISO_QUANTED,
        value_column: "quantvalue",
        keyed_by_channel: true,
        fields: &["channel", "isoq_poolname", "isoq_psmsfield", "isoq_val", "isoq_psms"],
        columns: &[
            "channel_name",
            "set_name",
            "amount_psms_name",
            "quantvalue",
            "amount_psms",
        ],
        pool_field: "isoq_poolname",
        value_field: "isoq_val",
        header: "",
    },
    DimensionDescriptor {
        name: "precursor",
        alias: "preq",
        value_table: schema::PROTEIN_PRECUR_QUANTED,
        value_column: "quantvalue",
        keyed_by_channel: false,
        fields: &["preq_poolname", "preq_val"],
        columns: &["set_name", "quantvalue"],
        pool_field: "preq_poolname",
        value_field: "preq_val",
        header: "MS1 area",
    },
    DimensionDescriptor {
        name: "probability",
        alias: "pprob",
        value_table: schema::PROTEIN_PROBABILITY,
        value_column: "probability",
        keyed_by_channel: false,
        fields: &["prob_poolname", "prob_val"],
        columns: &["set_name", "probability"],
        pool_field: "prob_poolname",
        value_field: "prob_val",
        header: "Protein probability",
    },
    DimensionDescriptor {
        name: "fdr",
        alias: "pfdr",
        value_table: schema::PROTEIN_FDR,
        value_column: "fdr",
        keyed_by_channel: false,
        fields: &["fdr_poolname", "fdr_val"],
        columns: &["set_name", "fdr"],
        pool_field: "fdr_poolname",
        value_field: "fdr_val",
        header: "q-value",
    },
    DimensionDescriptor {
        name: "pep",
        alias: "ppep",
        value_table: schema::PROTEIN_PEP,
        value_column: "pep",
        keyed_by_channel: false,
        fields: &["pep_poolname", "pep_val"],
        columns: &["set_name", "pep"],
        pool_field: "pep_poolname",
        value_field: "pep_val",
        header: "PEP",
    },
];

impl Dimension {
    /// Every dimension in report column order
    pub const ALL: [Dimension; 5] = [
        Dimension::Isobaric,
        Dimension::Precursor,
        Dimension::Probability,
        Dimension::Fdr,
        Dimension::Pep,
    ];

    /// Descriptor of this dimension
    pub fn descriptor(self) -> &'static DimensionDescriptor {
        &DESCRIPTORS[self as usize]
    }

    /// Number of columns this dimension adds to a query row
    pub fn column_count(self) -> usize {
        self.descriptor().fields.len()
    }

    /// Subquery resolving this dimension's values to pool names, one row
    /// per value
    pub(crate) fn subquery(self) -> String {
        let desc = self.descriptor();
        let columns = desc.columns.join(", ");
        if desc.keyed_by_channel {
            format!(
                "SELECT v.pacc_id, pt.set_id, {columns} FROM {} AS v \
                 JOIN protquant_channels USING(channel_id) \
                 JOIN protein_tables AS pt USING(prottable_id) \
                 JOIN biosets USING(set_id)",
                desc.value_table
            )
        } else {
            format!(
                "SELECT v.pacc_id, pt.set_id, {columns} FROM {} AS v \
                 JOIN protein_tables AS pt USING(prottable_id) \
                 JOIN biosets USING(set_id)",
                desc.value_table
            )
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().name)
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::ALL
            .into_iter()
            .find(|d| d.descriptor().name.eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown report dimension: {s}"))
    }
}
