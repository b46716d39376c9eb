//! Rules file loading from featuregate.toml.
//!
//! Loading lives on the host side: the policy core only ever sees
//! fully-formed [`PolicyRule`] values.

use crate::error::{Error, Result};
use policy::PolicyRule;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// On-disk rules file: one `[features.<id>]` table per gated feature.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesFile {
    /// Rules keyed by feature id.
    #[serde(default)]
    pub features: HashMap<String, PolicyRule>,
}

impl RulesFile {
    /// Load rules from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::ReadRules {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse rules from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        let mut file: Self = toml::from_str(toml).map_err(|e| Error::ParseRules(e.to_string()))?;
        // Table keys are authoritative for feature ids.
        for (id, rule) in &mut file.features {
            rule.feature_id = id.clone();
        }
        Ok(file)
    }

    /// Render the rules back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::RenderRules(e.to_string()))
    }

    /// Rule for `feature_id`, falling back to the permissive default for
    /// features the file does not mention.
    pub fn rule_for(&self, feature_id: &str) -> PolicyRule {
        self.features
            .get(feature_id)
            .cloned()
            .unwrap_or_else(|| PolicyRule::new(feature_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy::{BaselineMode, RateUnit};

    #[test]
    fn parses_rules_and_fills_feature_ids() {
        let toml = r#"
[features.play_sound]
baseline = "allow"

[features.play_sound.rate_limit]
unit = "minute"
max = 3

[features.perform_payment]
baseline = "ask"
require_confirmation = true
allowed_users = ["alice", "bob"]

[features.perform_payment.constraints]
max_amount = 100.0

[features.perform_payment.time_window]
days_of_week = [2, 3, 4, 5, 6]
start_hour = 9
end_hour = 17
"#;
        let rules = RulesFile::parse(toml).unwrap();

        let sound = rules.rule_for("play_sound");
        assert_eq!(sound.feature_id, "play_sound");
        let limit = sound.rate_limit.unwrap();
        assert_eq!(limit.unit, RateUnit::Minute);
        assert_eq!(limit.max, 3);

        let payment = rules.rule_for("perform_payment");
        assert_eq!(payment.baseline, BaselineMode::Ask);
        assert!(payment.require_confirmation);
        assert!(payment.allowed_users.contains("alice"));
        assert_eq!(payment.constraints.max_amount, Some(100.0));
        assert_eq!(payment.time_window.unwrap().start_hour, 9);
    }

    #[test]
    fn unknown_feature_gets_the_permissive_default() {
        let rules = RulesFile::default();
        let rule = rules.rule_for("scan_devices");
        assert_eq!(rule.feature_id, "scan_devices");
        assert_eq!(rule.baseline, BaselineMode::Allow);
        assert!(rule.rate_limit.is_none());
    }

    #[test]
    fn rules_round_trip_through_toml() {
        let toml = r#"
[features.scan_devices]
baseline = "deny"
"#;
        let rules = RulesFile::parse(toml).unwrap();
        let rendered = rules.to_toml().unwrap();
        let back = RulesFile::parse(&rendered).unwrap();
        assert_eq!(
            back.rule_for("scan_devices").baseline,
            BaselineMode::Deny
        );
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(RulesFile::parse("[features.x]\nbaseline = \"maybe\"").is_err());
    }
}
