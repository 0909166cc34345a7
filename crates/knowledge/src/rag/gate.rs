//! Retrieval-confidence gate.
//!
//! Decides whether the top retrieved passage is trustworthy enough to ground
//! the answer. The comparison direction is configurable; see
//! [`GateConfig`] for the default and the legacy setting.

use crate::types::RetrievalResult;
use serde::Serialize;
use std::fmt;
use vidya_core::config::GateConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateReason {
    /// Retrieval returned nothing (or failed)
    NoResults,
    /// Top score satisfied the comparison
    ScoreAccepted,
    /// Top score failed the comparison
    ScoreRejected,
}

impl fmt::Display for GateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoResults => "no results",
            Self::ScoreAccepted => "score accepted",
            Self::ScoreRejected => "score rejected",
        };
        f.write_str(s)
    }
}

/// Outcome of the gate for one query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateDecision {
    pub passed: bool,
    pub top_score: Option<f32>,
    pub reason: GateReason,
}

impl GateDecision {
    /// Evaluate `gate` against results ordered best first.
    pub fn evaluate(results: &[RetrievalResult], gate: &GateConfig) -> Self {
        let Some(top) = results.first() else {
            return Self {
                passed: false,
                top_score: None,
                reason: GateReason::NoResults,
            };
        };

        let passed = gate.comparison.holds(top.score, gate.threshold);
        Self {
            passed,
            top_score: Some(top.score),
            reason: if passed {
                GateReason::ScoreAccepted
            } else {
                GateReason::ScoreRejected
            },
        }
    }
}
