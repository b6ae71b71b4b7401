use std::fmt;
use std::str::FromStr;

use ds_protocol::RuleId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The first reserved id of latest release rules.
///
/// Every boosted release gets its own rule, numbered upwards from this id.
pub const LATEST_RELEASES_BASE_ID: u32 = 1500;

/// The kinds of rules produced by biases.
///
/// Every rule type owns a reserved [`RuleId`] so that rules can be attributed to their bias in
/// outcomes. The string form is the bias id used in the `sentry:dynamic_sampling_biases` project
/// option.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum RuleType {
    /// Uniform rule applying the base sample rate to all traces.
    BoostLowVolumeProjects,
    /// Keeps all traces of development and testing environments.
    BoostEnvironments,
    /// Keeps all traces of recently released versions for a while.
    BoostLatestReleases,
    /// Keeps all traces associated with a session replay.
    BoostReplayId,
}

/// Rule types that are emitted independently of the user configuration and the base sample rate.
pub const ALWAYS_ALLOWED_RULE_TYPES: &[RuleType] = &[RuleType::BoostLowVolumeProjects];

impl RuleType {
    /// Returns all known rule types.
    pub const fn all() -> &'static [RuleType] {
        &[
            RuleType::BoostLowVolumeProjects,
            RuleType::BoostEnvironments,
            RuleType::BoostLatestReleases,
            RuleType::BoostReplayId,
        ]
    }

    /// Returns the bias id of this rule type.
    pub const fn as_str(self) -> &'static str {
        match self {
            RuleType::BoostLowVolumeProjects => "boostLowVolumeProjects",
            RuleType::BoostEnvironments => "boostEnvironments",
            RuleType::BoostLatestReleases => "boostLatestRelease",
            RuleType::BoostReplayId => "boostReplayId",
        }
    }

    /// Returns the reserved rule id of this rule type.
    ///
    /// For [`RuleType::BoostLatestReleases`] this is the id of the first release rule.
    pub const fn reserved_id(self) -> RuleId {
        RuleId(match self {
            RuleType::BoostLowVolumeProjects => 1000,
            RuleType::BoostEnvironments => 1001,
            RuleType::BoostReplayId => 1005,
            RuleType::BoostLatestReleases => LATEST_RELEASES_BASE_ID,
        })
    }

    /// Returns `true` if rules of this type are emitted regardless of configuration.
    pub fn is_always_allowed(self) -> bool {
        ALWAYS_ALLOWED_RULE_TYPES.contains(&self)
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`RuleType`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown rule type {0:?}")]
pub struct ParseRuleTypeError(String);

impl FromStr for RuleType {
    type Err = ParseRuleTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleType::all()
            .iter()
            .copied()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| ParseRuleTypeError(s.to_owned()))
    }
}

impl Serialize for RuleType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'_, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
