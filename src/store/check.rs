use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;
use log::warn;
use serde::Serialize;

use super::schema::{
    PROTEINS, PROTEIN_COVERAGE, PROTEIN_EVIDENCE, PROTEIN_GROUP_CONTENT, PROTEIN_GROUP_MASTER,
    PROTEIN_PSM, PROT_DESC, PSMS, PSM_PROTEIN_GROUPS,
};
use super::{EvidenceStore, StoreError};
use crate::report::Dimension;

/// Pipeline stage that fills the tables a check looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// PSM evidence loading
    Evidence,
    /// Master selection and group content
    Grouping,
    /// Sequence database backfill
    Backfill,
    /// Per-pool protein table import
    Pools,
    /// Foreign keys across all tables
    Integrity,
}

impl Stage {
    /// Command that fills this stage's tables
    pub fn command(self) -> &'static str {
        match self {
            Stage::Evidence | Stage::Grouping | Stage::Integrity => "protgroup group",
            Stage::Backfill => "protgroup group --fasta",
            Stage::Pools => "protgroup load-table",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Evidence => "evidence",
            Stage::Grouping => "grouping",
            Stage::Backfill => "backfill",
            Stage::Pools => "pools",
            Stage::Integrity => "integrity",
        })
    }
}

/// Store check result status
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum CheckStatus {
    /// Table is populated
    Ok,
    /// Optional table is empty; report columns fall back to NA
    Warning(String),
    /// Required stage is missing or references dangle
    Failed(String),
}

/// One table-level check
#[derive(Debug, Clone, Serialize)]
pub struct StoreCheck {
    /// Stage the checked table belongs to
    pub stage: Stage,
    /// Checked table or relation
    pub name: String,
    /// Row count, if the check counts rows
    pub rows: Option<usize>,
    /// Result status
    #[serde(flatten)]
    pub status: CheckStatus,
}

impl StoreCheck {
    /// Check that a table has rows. An empty required table fails, an
    /// empty optional one warns.
    fn populated(stage: Stage, name: impl Into<String>, rows: usize, required: bool) -> Self {
        let status = match (rows, required) {
            (0, true) => CheckStatus::Failed(format!("empty, run `{}`", stage.command())),
            (0, false) => CheckStatus::Warning("empty, report columns will be NA".to_string()),
            _ => CheckStatus::Ok,
        };
        Self {
            stage,
            name: name.into(),
            rows: Some(rows),
            status,
        }
    }
}

/// Health report of one evidence store, ordered by pipeline stage
#[derive(Debug, Serialize)]
pub struct StoreReport {
    /// Location of the checked store
    pub store: String,
    /// Individual check results
    pub checks: Vec<StoreCheck>,
}

impl StoreReport {
    /// Create an empty report for a store location
    pub fn new(store: impl Into<String>) -> Self {
        Self {
            store: store.into(),
            checks: Vec::new(),
        }
    }

    /// Add a check result
    pub fn add_check(&mut self, check: StoreCheck) {
        self.checks.push(check);
    }

    fn count(&self, pred: impl Fn(&CheckStatus) -> bool) -> usize {
        self.checks.iter().filter(|c| pred(&c.status)).count()
    }

    /// Whether any check failed
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Whether any check produced a warning
    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    /// Number of passed checks
    pub fn success_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Ok))
    }

    /// Number of warnings
    pub fn warning_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Warning(_)))
    }

    /// Number of failures
    pub fn failure_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Failed(_)))
    }

    /// Earliest stage with a failing check
    pub fn first_failed_stage(&self) -> Option<Stage> {
        self.checks
            .iter()
            .filter(|c| matches!(c.status, CheckStatus::Failed(_)))
            .map(|c| c.stage)
            .min()
    }

    /// One line per check under a header per stage. `mark` renders the
    /// status column.
    fn render(&self, mark: impl Fn(&CheckStatus) -> String) -> String {
        let mut out = format!("Evidence store {}\n", self.store);
        let mut stage = None;
        for check in &self.checks {
            if stage != Some(check.stage) {
                stage = Some(check.stage);
                out.push_str(&format!("\n{}\n", check.stage));
            }
            let rows = check.rows.map(|n| n.to_string()).unwrap_or_default();
            out.push_str(&format!("  {:<28} {:>9}  {}", check.name, rows, mark(&check.status)));
            if let CheckStatus::Warning(msg) | CheckStatus::Failed(msg) = &check.status {
                out.push_str(&format!("  {msg}"));
            }
            out.push('\n');
        }
        out.push_str(&format!(
            "\n{} ok, {} empty optional, {} failed\n",
            self.success_count(),
            self.warning_count(),
            self.failure_count()
        ));
        if let Some(stage) = self.first_failed_stage() {
            out.push_str(&format!("Store incomplete at {stage}, run `{}`\n", stage.command()));
        }
        out
    }

    /// Format the report with a colored status column
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            self.render(|status| match status {
                CheckStatus::Ok => style("ok").green().to_string(),
                CheckStatus::Warning(_) => style("empty").yellow().to_string(),
                CheckStatus::Failed(_) => style("FAILED").red().bold().to_string(),
            })
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            self.to_string()
        }
    }
}

impl fmt::Display for StoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(|status| {
            match status {
                CheckStatus::Ok => "ok",
                CheckStatus::Warning(_) => "empty",
                CheckStatus::Failed(_) => "FAILED",
            }
            .to_string()
        }))
    }
}

impl EvidenceStore {
    /// Check the store for missing stages, empty backfill and dimension
    /// tables, and dangling references
    pub fn check(&self) -> Result<StoreReport, StoreError> {
        let location = self
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string());
        let mut report = StoreReport::new(location);

        for table in [PROTEINS, PSMS, PROTEIN_PSM] {
            report.add_check(StoreCheck::populated(Stage::Evidence, table, self.count(table)?, true));
        }

        let masters = self.count(PROTEIN_GROUP_MASTER)?;
        report.add_check(StoreCheck::populated(
            Stage::Grouping,
            PROTEIN_GROUP_MASTER,
            masters,
            true,
        ));
        if masters > 0 {
            report.add_check(StoreCheck::populated(
                Stage::Grouping,
                PSM_PROTEIN_GROUPS,
                self.count(PSM_PROTEIN_GROUPS)?,
                true,
            ));
            // Empty when every group is a lone master
            report.add_check(StoreCheck::populated(
                Stage::Grouping,
                PROTEIN_GROUP_CONTENT,
                self.count(PROTEIN_GROUP_CONTENT)?,
                false,
            ));
        }

        for table in [PROTEIN_COVERAGE, PROTEIN_EVIDENCE, PROT_DESC] {
            report.add_check(optional(Stage::Backfill, table, self.count(table)?));
        }
        for dimension in Dimension::ALL {
            let rows = self.dimension_row_count(dimension)?;
            report.add_check(optional(Stage::Pools, dimension.descriptor().value_table, rows));
        }

        report.add_check(self.foreign_key_check()?);
        Ok(report)
    }

    fn foreign_key_check(&self) -> Result<StoreCheck, StoreError> {
        let mut stmt = self.conn.prepare("PRAGMA foreign_key_check")?;
        let dangling: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        let status = match dangling.first() {
            None => CheckStatus::Ok,
            Some(table) => CheckStatus::Failed(format!("dangling references, first in {table}")),
        };
        Ok(StoreCheck {
            stage: Stage::Integrity,
            name: "foreign keys".to_string(),
            rows: Some(dangling.len()),
            status,
        })
    }
}

fn optional(stage: Stage, table: &str, rows: usize) -> StoreCheck {
    if rows == 0 {
        warn!("No rows in {}, report columns will be NA", table);
    }
    StoreCheck::populated(stage, table, rows, false)
}
