//! Structured eligibility verdict produced once per request.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed decision set. Anything else in a model reply is a parse failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Risk,
}

impl fmt::Display for Decision {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approved => formatter.write_str("Approved"),
            Self::Risk => formatter.write_str("Risk"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub decision: Decision,
    pub risk_score: u8,
    pub reasons: Vec<String>,
    #[serde(default)]
    pub improvement_tips: Vec<String>,
    /// Always a list; an omitted key deserializes to empty rather than null.
    #[serde(default)]
    pub comparison_insights: Vec<String>,
}

impl AnalysisResult {
    /// Fixed low-confidence fallback used when model output cannot be parsed.
    pub fn unparseable() -> Self {
        Self {
            decision: Decision::Risk,
            risk_score: 50,
            reasons: vec!["Unable to parse response".to_string()],
            improvement_tips: Vec::new(),
            comparison_insights: Vec::new(),
        }
    }

    /// Risk scores live in 0..=100; over-enthusiastic model output is capped.
    pub fn clamp_risk_score(mut self) -> Self {
        self.risk_score = self.risk_score.min(100);
        self
    }
}
