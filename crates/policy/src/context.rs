//! Runtime context for a single evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Runtime inputs for one evaluation, supplied fresh per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalContext {
    /// Identity of the caller, if known.
    pub user_id: Option<String>,

    /// Location of the caller, if known.
    pub location: Option<String>,

    /// Instant the evaluation is performed at (UTC). An explicit parameter
    /// so evaluation is deterministic and testable.
    pub at: DateTime<Utc>,

    /// Amount of the requested action; meaningful only for features with a
    /// monetary constraint.
    pub amount: Option<f64>,
}

impl EvalContext {
    /// Context at the current instant with no audience or amount inputs.
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Context at a fixed instant.
    pub fn at(at: DateTime<Utc>) -> Self {
        Self {
            user_id: None,
            location: None,
            at,
            amount: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::now()
    }
}
