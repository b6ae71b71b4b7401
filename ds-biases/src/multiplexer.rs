//! Merging of user bias settings with the defaults.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::rule_type::RuleType;

/// The project option that stores the user's bias settings.
pub const BIASES_OPTION: &str = "sentry:dynamic_sampling_biases";

/// The activation state of a single bias, as stored in [`BIASES_OPTION`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BiasOption {
    /// The bias id, see [`RuleType::as_str`].
    pub id: String,
    /// Whether the bias is enabled.
    pub active: bool,
}

impl BiasOption {
    /// Creates a bias option for a known rule type.
    pub fn new(rule_type: RuleType, active: bool) -> Self {
        Self {
            id: rule_type.as_str().to_owned(),
            active,
        }
    }
}

/// Biases that users can toggle, in the order they are presented.
pub const DEFAULT_BIASES: &[RuleType] = &[
    RuleType::BoostEnvironments,
    RuleType::BoostLatestReleases,
    RuleType::BoostReplayId,
];

/// Returns the default bias options, all active.
pub fn default_biases() -> Vec<BiasOption> {
    DEFAULT_BIASES
        .iter()
        .map(|&rule_type| BiasOption::new(rule_type, true))
        .collect()
}

/// Merges user bias settings over the defaults.
///
/// Returns one entry per default bias. A user setting replaces the default with the same id.
/// User settings for ids that are not a default bias are dropped.
pub fn get_user_biases(user_set_biases: Option<&[BiasOption]>) -> Vec<BiasOption> {
    let Some(user_set_biases) = user_set_biases else {
        return default_biases();
    };

    default_biases()
        .into_iter()
        .map(|default| {
            user_set_biases
                .iter()
                .rev()
                .find(|bias| bias.id == default.id)
                .cloned()
                .unwrap_or(default)
        })
        .collect()
}

/// Returns the ids of all active biases after merging user settings over the defaults.
pub fn get_enabled_user_biases(user_set_biases: Option<&[BiasOption]>) -> BTreeSet<String> {
    get_user_biases(user_set_biases)
        .into_iter()
        .filter(|bias| bias.active)
        .map(|bias| bias.id)
        .collect()
}

/// Returns the entry for `bias_id`, or an inactive entry if the id is unknown.
pub fn get_user_bias_by_id(bias_id: &str, user_biases: &[BiasOption]) -> BiasOption {
    user_biases
        .iter()
        .find(|bias| bias.id == bias_id)
        .cloned()
        .unwrap_or_else(|| BiasOption {
            id: bias_id.to_owned(),
            active: false,
        })
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    fn option(id: &str, active: bool) -> BiasOption {
        BiasOption {
            id: id.to_owned(),
            active,
        }
    }

    #[test]
    fn test_defaults_without_user_settings() {
        assert_eq!(
            get_user_biases(None),
            vec![
                option("boostEnvironments", true),
                option("boostLatestRelease", true),
                option("boostReplayId", true),
            ]
        );
    }

    #[test]
    fn test_user_settings_override_defaults() {
        let user = [
            option("boostEnvironments", false),
            option("boostKeyTransactions", true),
        ];

        assert_eq!(
            get_user_biases(Some(&user[..])),
            vec![
                option("boostEnvironments", false),
                option("boostLatestRelease", true),
                option("boostReplayId", true),
            ]
        );
    }

    #[test]
    fn test_enabled_user_biases() {
        let user = [option("boostReplayId", false)];
        let enabled = get_enabled_user_biases(Some(&user[..]));

        assert_eq!(enabled.len(), 2);
        assert!(enabled.contains("boostEnvironments"));
        assert!(enabled.contains("boostLatestRelease"));
    }

    #[test]
    fn test_empty_user_settings_keep_defaults() {
        assert_eq!(get_user_biases(Some(&[] as &[BiasOption])), default_biases());
    }

    #[test]
    fn test_get_user_bias_by_id() {
        let biases = get_user_biases(None);

        assert_eq!(
            get_user_bias_by_id("boostReplayId", &biases),
            option("boostReplayId", true)
        );
        assert_eq!(
            get_user_bias_by_id("ignoreHealthChecks", &biases),
            option("ignoreHealthChecks", false)
        );
    }

    #[test]
    fn test_deserialize_option() {
        let biases: Vec<BiasOption> = serde_json::from_str(
            r#"[{"id": "boostEnvironments", "active": false}]"#,
        )
        .unwrap();

        assert_eq!(biases, vec![option("boostEnvironments", false)]);
    }
}
