//! Configuration for the static PDP plugin.

use serde::Deserialize;
use xacml_pep_sdk::Decision;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticPdpPluginConfig {
    /// Decision policy.
    pub mode: StaticPdpMode,

    /// Decision returned in `fixed` mode.
    pub decision: Decision,

    /// Reported in `PolicyIdentifierList` when the request asks for it.
    pub policy_id: String,
}

impl Default for StaticPdpPluginConfig {
    fn default() -> Self {
        Self {
            mode: StaticPdpMode::PermitAll,
            decision: Decision::Permit,
            policy_id: "urn:xacml-pep:policy:static".to_owned(),
        }
    }
}

impl StaticPdpPluginConfig {
    #[must_use]
    pub fn with_mode(mode: StaticPdpMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Answer every request with `decision`.
    #[must_use]
    pub fn fixed(decision: Decision) -> Self {
        Self {
            mode: StaticPdpMode::Fixed,
            decision,
            ..Self::default()
        }
    }

    /// Decision returned for every individual request.
    #[must_use]
    pub fn decision(&self) -> Decision {
        match self.mode {
            StaticPdpMode::PermitAll => Decision::Permit,
            StaticPdpMode::DenyAll => Decision::Deny,
            StaticPdpMode::Fixed => self.decision,
        }
    }
}

/// Decision policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StaticPdpMode {
    /// Permit everything.
    #[default]
    PermitAll,
    /// Deny everything.
    DenyAll,
    /// Answer with the configured `decision`.
    Fixed,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_config_permits_all() {
        let config: StaticPdpPluginConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config.mode, StaticPdpMode::PermitAll);
        assert_eq!(config.decision(), Decision::Permit);
    }

    #[test]
    fn fixed_mode_reads_decision() {
        let config: StaticPdpPluginConfig = serde_json::from_value(json!({
            "mode": "fixed",
            "decision": "Indeterminate",
            "policy_id": "urn:example:p1"
        }))
        .unwrap();

        assert_eq!(config.decision(), Decision::Indeterminate);
        assert_eq!(config.policy_id, "urn:example:p1");
    }

    #[test]
    fn decision_is_ignored_outside_fixed_mode() {
        let config: StaticPdpPluginConfig = serde_json::from_value(json!({
            "mode": "permit_all",
            "decision": "Deny"
        }))
        .unwrap();
        assert_eq!(config.decision(), Decision::Permit);
    }

    #[test]
    fn deny_all_mode() {
        let config: StaticPdpPluginConfig =
            serde_json::from_value(json!({ "mode": "deny_all" })).unwrap();
        assert_eq!(config.decision(), Decision::Deny);
    }
}
