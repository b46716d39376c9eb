//! Policy rule data model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A rule's default disposition before other constraints apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMode {
    /// Permit the feature unless a constraint says otherwise.
    #[default]
    Allow,
    /// Permit the feature, but require user confirmation first.
    Ask,
    /// Refuse the feature unconditionally; no other field is consulted.
    Deny,
}

/// Fixed-window granularity for rate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateUnit {
    Minute,
    Hour,
    Day,
}

/// Cap on uses of a feature per fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Window granularity the cap applies to.
    pub unit: RateUnit,
    /// Maximum uses per window.
    pub max: u32,
}

/// Days and hours during which a feature may be used.
///
/// Weekdays are numbered 1 = Sunday through 7 = Saturday. An empty
/// `days_of_week` means all days are allowed. Hours are inclusive on both
/// ends: `start_hour: 9, end_hour: 17` allows 09:00:00 through 17:59:59.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeWindow {
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub days_of_week: BTreeSet<u8>,
    pub start_hour: u8,
    pub end_hour: u8,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            days_of_week: BTreeSet::new(),
            start_hour: 0,
            end_hour: 23,
        }
    }
}

/// Feature-specific numeric bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureConstraints {
    /// Maximum per-invocation amount for monetary features.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
}

impl FeatureConstraints {
    /// True when no bound is set.
    pub fn is_empty(&self) -> bool {
        self.max_amount.is_none()
    }
}

/// One gating rule for one feature. Immutable during an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyRule {
    /// Unique feature key, e.g. `"play_sound"`.
    pub feature_id: String,

    /// Default disposition absent other constraints.
    pub baseline: BaselineMode,

    /// Require user confirmation even when the baseline is `Allow`.
    pub require_confirmation: bool,

    /// Users the feature is restricted to. Empty means no restriction.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub allowed_users: BTreeSet<String>,

    /// Locations the feature is restricted to. Empty means no restriction.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub allowed_locations: BTreeSet<String>,

    /// Cap on uses per fixed window, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,

    /// Days/hours the feature may be used, if restricted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_window: Option<TimeWindow>,

    /// Feature-specific bounds.
    #[serde(skip_serializing_if = "FeatureConstraints::is_empty")]
    pub constraints: FeatureConstraints,
}

impl PolicyRule {
    /// The permissive default rule: baseline allow, no constraints.
    ///
    /// Hosts use this for features that have no stored rule.
    pub fn new(feature_id: impl Into<String>) -> Self {
        Self {
            feature_id: feature_id.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rule_is_permissive() {
        let rule = PolicyRule::new("play_sound");
        assert_eq!(rule.feature_id, "play_sound");
        assert_eq!(rule.baseline, BaselineMode::Allow);
        assert!(!rule.require_confirmation);
        assert!(rule.rate_limit.is_none());
        assert!(rule.time_window.is_none());
        assert!(rule.allowed_users.is_empty());
        assert!(rule.allowed_locations.is_empty());
        assert!(rule.constraints.is_empty());
    }

    #[test]
    fn rule_round_trips_through_json() {
        let rule = PolicyRule {
            feature_id: "perform_payment".to_string(),
            baseline: BaselineMode::Ask,
            require_confirmation: true,
            rate_limit: Some(RateLimit {
                unit: RateUnit::Minute,
                max: 10,
            }),
            time_window: Some(TimeWindow {
                days_of_week: [2, 3, 4, 5, 6].into_iter().collect(),
                start_hour: 9,
                end_hour: 17,
            }),
            allowed_users: ["alice".to_string()].into_iter().collect(),
            allowed_locations: BTreeSet::new(),
            constraints: FeatureConstraints {
                max_amount: Some(100.0),
            },
        };

        let json = serde_json::to_string(&rule).unwrap();
        let back: PolicyRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let rule: PolicyRule = serde_json::from_str(r#"{"baseline": "deny"}"#).unwrap();
        assert_eq!(rule.baseline, BaselineMode::Deny);
        assert!(rule.rate_limit.is_none());
        assert!(rule.allowed_users.is_empty());
    }
}
