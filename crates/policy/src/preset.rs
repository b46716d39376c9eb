//! Canned rule sets for bootstrapping a policy map.

use crate::{BaselineMode, PolicyRule, RateLimit, RateUnit};
use std::collections::HashMap;

/// Feature id the balanced preset treats as monetary.
const PAYMENT_FEATURE: &str = "perform_payment";

/// A named starting point applied over a host's rule map.
///
/// Presets rewrite the baseline fields of each listed feature in place,
/// creating permissive default rules for features the map does not have
/// yet. Fields a preset does not mention (time windows, audience lists)
/// are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Everything allowed, no confirmation, no rate limits.
    Open,
    /// Rate-limited to 10/minute; payments behind ask + confirmation with
    /// a 100 max amount.
    Balanced,
    /// Everything denied.
    LockedDown,
}

impl Preset {
    /// Apply this preset to `rules` for each listed feature.
    pub fn apply<I, S>(self, rules: &mut HashMap<String, PolicyRule>, feature_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for feature_id in feature_ids {
            let feature_id = feature_id.into();
            let rule = rules
                .entry(feature_id.clone())
                .or_insert_with(|| PolicyRule::new(feature_id.as_str()));
            match self {
                Self::Open => {
                    rule.baseline = BaselineMode::Allow;
                    rule.require_confirmation = false;
                    rule.rate_limit = None;
                }
                Self::Balanced => {
                    if feature_id == PAYMENT_FEATURE {
                        rule.baseline = BaselineMode::Ask;
                        rule.require_confirmation = true;
                        rule.constraints.max_amount = Some(100.0);
                    } else {
                        rule.baseline = BaselineMode::Allow;
                        rule.require_confirmation = false;
                    }
                    rule.rate_limit = Some(RateLimit {
                        unit: RateUnit::Minute,
                        max: 10,
                    });
                }
                Self::LockedDown => {
                    rule.baseline = BaselineMode::Deny;
                    rule.require_confirmation = false;
                    rule.rate_limit = None;
                }
            }
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "balanced" => Ok(Self::Balanced),
            "locked" => Ok(Self::LockedDown),
            other => Err(format!(
                "unknown preset '{other}' (expected open, balanced, or locked)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEATURES: [&str; 3] = ["play_sound", "scan_devices", "perform_payment"];

    #[test]
    fn open_preset_clears_gates() {
        let mut rules = HashMap::new();
        rules.insert(
            "play_sound".to_string(),
            PolicyRule {
                baseline: BaselineMode::Deny,
                rate_limit: Some(RateLimit {
                    unit: RateUnit::Hour,
                    max: 1,
                }),
                ..PolicyRule::new("play_sound")
            },
        );

        Preset::Open.apply(&mut rules, FEATURES);
        assert_eq!(rules.len(), 3);
        for rule in rules.values() {
            assert_eq!(rule.baseline, BaselineMode::Allow);
            assert!(!rule.require_confirmation);
            assert!(rule.rate_limit.is_none());
        }
    }

    #[test]
    fn balanced_preset_singles_out_payments() {
        let mut rules = HashMap::new();
        Preset::Balanced.apply(&mut rules, FEATURES);

        let payment = &rules["perform_payment"];
        assert_eq!(payment.baseline, BaselineMode::Ask);
        assert!(payment.require_confirmation);
        assert_eq!(payment.constraints.max_amount, Some(100.0));

        let sound = &rules["play_sound"];
        assert_eq!(sound.baseline, BaselineMode::Allow);
        assert_eq!(
            sound.rate_limit,
            Some(RateLimit {
                unit: RateUnit::Minute,
                max: 10
            })
        );
    }

    #[test]
    fn locked_preset_denies_everything() {
        let mut rules = HashMap::new();
        Preset::LockedDown.apply(&mut rules, FEATURES);
        for rule in rules.values() {
            assert_eq!(rule.baseline, BaselineMode::Deny);
        }
    }

    #[test]
    fn preset_keeps_unrelated_fields() {
        let mut rules = HashMap::new();
        rules.insert(
            "scan_devices".to_string(),
            PolicyRule {
                allowed_users: ["alice".to_string()].into_iter().collect(),
                ..PolicyRule::new("scan_devices")
            },
        );
        Preset::Balanced.apply(&mut rules, ["scan_devices"]);
        assert!(rules["scan_devices"].allowed_users.contains("alice"));
    }

    #[test]
    fn preset_parses_from_name() {
        assert_eq!("open".parse(), Ok(Preset::Open));
        assert_eq!("balanced".parse(), Ok(Preset::Balanced));
        assert_eq!("locked".parse(), Ok(Preset::LockedDown));
        assert!("strict".parse::<Preset>().is_err());
    }
}
