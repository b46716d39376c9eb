//! Evaluation result type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The result of evaluating a rule against a context.
///
/// Exactly four mutually exclusive variants; callers must handle all of
/// them. There is no error channel — a rule that cannot render a decision
/// fails closed as `Denied`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PermissionOutcome {
    /// The action may proceed.
    Allowed,
    /// The action may proceed once the user confirms.
    NeedsConfirmation { message: String },
    /// The current rate-limit window is exhausted; it reopens at `reset_at`.
    RateLimited { reset_at: Option<DateTime<Utc>> },
    /// The action is refused.
    Denied { reason: String },
}

impl PermissionOutcome {
    /// True only for [`PermissionOutcome::Allowed`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub(crate) fn denied(reason: impl Into<String>) -> Self {
        Self::Denied {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for PermissionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allowed => write!(f, "allowed"),
            Self::NeedsConfirmation { message } => write!(f, "needs confirmation: {message}"),
            Self::RateLimited {
                reset_at: Some(reset),
            } => write!(f, "rate limited until {}", reset.to_rfc3339()),
            Self::RateLimited { reset_at: None } => write!(f, "rate limited"),
            Self::Denied { reason } => write!(f, "denied: {reason}"),
        }
    }
}
