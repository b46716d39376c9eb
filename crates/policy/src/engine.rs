//! The policy decision engine.

use crate::{
    BaselineMode, EvalContext, PermissionOutcome, PolicyRule, RateUnit, UsageCheck, UsageTracker,
};
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::sync::Arc;

/// Message attached to every confirmation outcome.
const CONFIRMATION_MESSAGE: &str = "Requires user confirmation";

/// Evaluates policy rules against runtime contexts.
///
/// The engine holds no mutable state of its own; the only shared state it
/// touches is the [`UsageTracker`] consulted for the rate-limit check, so
/// it is safe to call from any number of threads without coordination.
pub struct PolicyEngine {
    usage: Arc<UsageTracker>,
}

impl PolicyEngine {
    /// Engine with its own private usage tracker.
    pub fn new() -> Self {
        Self {
            usage: Arc::new(UsageTracker::new()),
        }
    }

    /// Engine sharing an existing usage tracker with other components.
    pub fn with_tracker(usage: Arc<UsageTracker>) -> Self {
        Self { usage }
    }

    /// The tracker backing this engine's rate-limit checks.
    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// Decide whether `rule`'s feature may be invoked under `context`.
    ///
    /// Total: every (rule, context) pair yields exactly one outcome, never
    /// an error. Checks run in a fixed order and the first failing check
    /// wins: hard deny, audience (user, then location), time window, amount
    /// bound, rate limit, confirmation. Rate limiting outranks confirmation
    /// because an exhausted window is a harder fact than "needs asking".
    ///
    /// Evaluation records nothing; the caller reports a performed action
    /// via [`record_use`](Self::record_use) afterward.
    pub fn evaluate(&self, rule: &PolicyRule, context: &EvalContext) -> PermissionOutcome {
        // A hard deny is never overridden by any later check.
        if rule.baseline == BaselineMode::Deny {
            return PermissionOutcome::denied("Policy baseline denies");
        }

        if !rule.allowed_users.is_empty() {
            let ok = context
                .user_id
                .as_deref()
                .is_some_and(|u| rule.allowed_users.contains(u));
            if !ok {
                return PermissionOutcome::denied("User not allowed");
            }
        }

        if !rule.allowed_locations.is_empty() {
            let ok = context
                .location
                .as_deref()
                .is_some_and(|l| rule.allowed_locations.contains(l));
            if !ok {
                return PermissionOutcome::denied("Location not allowed");
            }
        }

        if let Some(window) = &rule.time_window {
            let weekday = context.at.weekday().number_from_sunday() as u8;
            if !window.days_of_week.is_empty() && !window.days_of_week.contains(&weekday) {
                return PermissionOutcome::denied("Outside allowed days");
            }
            let hour = context.at.hour();
            if hour < u32::from(window.start_hour) || hour > u32::from(window.end_hour) {
                return PermissionOutcome::denied("Outside allowed hours");
            }
        }

        // The bound only fires when the caller supplies a measurable amount.
        if let (Some(max), Some(amount)) = (rule.constraints.max_amount, context.amount) {
            if amount > max {
                return PermissionOutcome::denied(format!(
                    "Amount exceeds max {}",
                    format_amount(max)
                ));
            }
        }

        if let Some(limit) = rule.rate_limit {
            if let UsageCheck::Exceeded { reset_at } =
                self.usage
                    .check(&rule.feature_id, limit.unit, limit.max, context.at)
            {
                return PermissionOutcome::RateLimited {
                    reset_at: Some(reset_at),
                };
            }
        }

        if rule.baseline == BaselineMode::Ask || rule.require_confirmation {
            return PermissionOutcome::NeedsConfirmation {
                message: CONFIRMATION_MESSAGE.to_string(),
            };
        }

        PermissionOutcome::Allowed
    }

    /// Report that the protected action actually ran at `at`.
    pub fn record_use(&self, feature_id: &str, unit: RateUnit, at: DateTime<Utc>) {
        self.usage.record(feature_id, unit, at);
    }

    /// Clear all usage counters.
    pub fn reset_all_usage(&self) {
        self.usage.reset_all();
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole-number bounds render without a decimal point, so the reason reads
/// "Amount exceeds max 100" rather than "max 100.0".
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        amount.to_string()
    }
}
