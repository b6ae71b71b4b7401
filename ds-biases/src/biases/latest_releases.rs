use std::error::Error;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use ds_protocol::{
    DecayingFunction, Project, RuleCondition, RuleId, RuleType as SamplingRuleType, SamplingRule,
    SamplingValue, TimeRange,
};
use serde::{Deserialize, Serialize};

use crate::biases::{Bias, BiasError};
use crate::rule_type::LATEST_RELEASES_BASE_ID;

/// A release that was recently observed for the first time in an environment.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostedRelease {
    /// The release version.
    pub version: String,
    /// The environment the release was first seen in, if any.
    #[serde(default)]
    pub environment: Option<String>,
    /// When the boost started.
    pub timestamp: DateTime<Utc>,
}

/// Source of boosted releases for a project.
pub trait BoostedReleases: Send + Sync {
    /// Returns the boosted releases of the project, most relevant first.
    fn boosted_releases(
        &self,
        project: &Project,
    ) -> Result<Vec<BoostedRelease>, Box<dyn Error + Send + Sync>>;
}

impl BoostedReleases for Vec<BoostedRelease> {
    fn boosted_releases(
        &self,
        _project: &Project,
    ) -> Result<Vec<BoostedRelease>, Box<dyn Error + Send + Sync>> {
        Ok(self.clone())
    }
}

/// Temporarily keeps all traces of newly deployed releases.
///
/// Every boosted release gets its own rule that starts at a sample rate of `1.0` and decays
/// linearly to the base sample rate over the boost duration.
#[derive(Clone)]
pub struct BoostLatestReleasesBias {
    releases: Arc<dyn BoostedReleases>,
    boost_duration: TimeDelta,
    max_releases: usize,
    now: DateTime<Utc>,
}

impl BoostLatestReleasesBias {
    /// Creates the bias for releases that are still boosted at `now`.
    pub fn new(
        releases: Arc<dyn BoostedReleases>,
        boost_duration: TimeDelta,
        max_releases: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            releases,
            boost_duration,
            max_releases,
            now,
        }
    }

    fn release_condition(release: &BoostedRelease) -> RuleCondition {
        let environment = match release.environment {
            Some(ref environment) => RuleCondition::equals("trace.environment", [environment]),
            None => RuleCondition::equals_null("trace.environment"),
        };

        RuleCondition::and(vec![
            RuleCondition::equals("trace.release", [&release.version]),
            environment,
        ])
    }
}

impl Bias for BoostLatestReleasesBias {
    fn generate_rules(
        &self,
        project: &Project,
        base_sample_rate: f64,
    ) -> Result<Vec<SamplingRule>, BiasError> {
        let releases = self
            .releases
            .boosted_releases(project)
            .map_err(BiasError::BoostedReleases)?;

        let rules = releases
            .iter()
            .filter_map(|release| {
                let end = release.timestamp.checked_add_signed(self.boost_duration);
                if end.is_none() {
                    ds_log::warn!(
                        project_id = %project.id,
                        release = %release.version,
                        "skipping boosted release with out of range boost end"
                    );
                }
                Some((release, end?))
            })
            .filter(|(_, end)| self.now < *end)
            .take(self.max_releases)
            .zip(LATEST_RELEASES_BASE_ID..)
            .map(|((release, end), id)| SamplingRule {
                condition: Self::release_condition(release),
                sampling_value: SamplingValue::SampleRate { value: 1.0 },
                ty: SamplingRuleType::Trace,
                id: RuleId(id),
                time_range: TimeRange {
                    start: Some(release.timestamp),
                    end: Some(end),
                },
                decaying_fn: DecayingFunction::Linear {
                    decayed_value: base_sample_rate,
                },
            })
            .collect();

        Ok(rules)
    }
}
