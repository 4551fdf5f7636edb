use std::collections::BTreeSet;

use super::Dimension;

/// Row position of the protein accession in every report query
pub const ACCESSION_INDEX: usize = 0;

/// One optional join of the report query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    /// Dimension the join brings in
    pub dimension: Dimension,
    /// Join SQL, appended after the base `FROM`
    pub sql: String,
}

/// Row positions of the dimension fields of a composed query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    fields: Vec<(&'static str, usize)>,
}

impl ColumnMap {
    /// Row position of a field, `None` if its dimension is not enabled
    pub fn get(&self, field: &str) -> Option<usize> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|&(_, idx)| idx)
    }

    /// Number of mapped dimension fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no dimension field is mapped
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Mapped fields in row order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.fields.iter().copied()
    }
}

/// A composed report query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    /// Select expressions, accession first
    pub selects: Vec<String>,
    /// One join per enabled dimension
    pub joins: Vec<JoinClause>,
    /// Field positions of the enabled dimensions
    pub column_map: ColumnMap,
    /// Restrict rows to master proteins
    pub masters_only: bool,
}

impl QueryPlan {
    /// Dimensions this plan joins, in column order
    pub fn dimensions(&self) -> impl Iterator<Item = Dimension> + '_ {
        self.joins.iter().map(|j| j.dimension)
    }

    /// Full SQL of the plan. Rows are ordered by accession so that all rows
    /// of one protein are consecutive.
    pub fn sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM proteins AS p", self.selects.join(", "));
        if !self.joins.is_empty() {
            sql.push_str(" LEFT OUTER JOIN biosets AS pool ON 1");
        }
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.sql);
        }
        if self.masters_only {
            sql.push_str(" WHERE p.protein_acc IN (SELECT protein_acc FROM protein_group_master)");
        }
        sql.push_str(" ORDER BY p.protein_acc");
        if !self.joins.is_empty() {
            sql.push_str(", pool.set_name");
        }
        sql
    }
}

/// Builds a [`QueryPlan`] from the set of requested dimensions.
///
/// Each dimension is resolved to pool names through its own subquery and
/// left-joined against a row per (protein, pool), so a protein without
/// values in a dimension still yields rows with that dimension's fields
/// `NULL`.
#[derive(Debug, Clone, Default)]
pub struct QueryComposer {
    dimensions: BTreeSet<Dimension>,
    masters_only: bool,
}

impl QueryComposer {
    /// Composer with no dimensions, reporting all proteins
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable a dimension
    pub fn with(mut self, dimension: Dimension) -> Self {
        self.dimensions.insert(dimension);
        self
    }

    /// Enable or disable a dimension
    pub fn set(mut self, dimension: Dimension, enabled: bool) -> Self {
        if enabled {
            self.dimensions.insert(dimension);
        } else {
            self.dimensions.remove(&dimension);
        }
        self
    }

    /// Restrict the report to master proteins
    pub fn masters_only(mut self, masters_only: bool) -> Self {
        self.masters_only = masters_only;
        self
    }

    /// Compose the query
    pub fn compose(&self) -> QueryPlan {
        let mut selects = vec!["p.protein_acc".to_string()];
        let mut joins = Vec::with_capacity(self.dimensions.len());
        let mut fields = Vec::new();

        for &dimension in &self.dimensions {
            let desc = dimension.descriptor();
            for (field, column) in desc.fields.iter().zip(desc.columns) {
                fields.push((*field, selects.len()));
                selects.push(format!("{}.{}", desc.alias, column));
            }
            joins.push(JoinClause {
                dimension,
                sql: format!(
                    "LEFT OUTER JOIN ({}) AS {alias} \
                     ON {alias}.pacc_id = p.pacc_id AND {alias}.set_id = pool.set_id",
                    dimension.subquery(),
                    alias = desc.alias
                ),
            });
        }

        QueryPlan {
            selects,
            joins,
            column_map: ColumnMap { fields },
            masters_only: self.masters_only,
        }
    }
}
