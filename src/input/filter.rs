use serde::{Deserialize, Serialize};

/// Whether low or high values of a confidence field are better
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreDirection {
    /// q-values, PEPs, e-values
    #[default]
    LowerIsBetter,
    /// Search engine scores
    HigherIsBetter,
}

/// Confidence threshold a PSM must pass to take part in protein grouping
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceFilter {
    /// Column holding the confidence value
    pub field: String,
    /// Threshold value, exclusive
    pub threshold: f64,
    /// Comparison direction
    pub direction: ScoreDirection,
}

impl ConfidenceFilter {
    /// Create a filter on `field`
    pub fn new(field: impl Into<String>, threshold: f64, direction: ScoreDirection) -> Self {
        Self {
            field: field.into(),
            threshold,
            direction,
        }
    }

    /// Whether a confidence value passes. A missing value never passes.
    pub fn passes(&self, value: Option<f64>) -> bool {
        match (value, self.direction) {
            (Some(v), ScoreDirection::LowerIsBetter) => v < self.threshold,
            (Some(v), ScoreDirection::HigherIsBetter) => v > self.threshold,
            (None, _) => false,
        }
    }
}
