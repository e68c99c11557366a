use serde::Serialize;

use super::gates::GateResult;
use crate::scoring::config::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approved,
    ApprovedWithConditions,
    Review,
    RejectedByPolicy,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Approved => "APPROVED",
            Decision::ApprovedWithConditions => "APPROVED_WITH_CONDITIONS",
            Decision::Review => "REVIEW",
            Decision::RejectedByPolicy => "REJECTED_BY_POLICY",
        }
    }

    pub fn is_rejection(self) -> bool {
        self == Decision::RejectedByPolicy
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed gates reject outright; otherwise walk the threshold ladder.
/// The ladder is not checked for ordering here.
pub fn resolve_decision(gates: &GateResult, score: f64, thresholds: &Thresholds) -> Decision {
    if !gates.pass {
        Decision::RejectedByPolicy
    } else if score >= thresholds.approved {
        Decision::Approved
    } else if score >= thresholds.conditional {
        Decision::ApprovedWithConditions
    } else if score >= thresholds.review {
        Decision::Review
    } else {
        Decision::RejectedByPolicy
    }
}
