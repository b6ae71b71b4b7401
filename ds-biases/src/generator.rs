use std::collections::HashSet;
use std::error::Error;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use ds_protocol::{Project, RuleId, SamplingRule};
use ds_quotas::Quotas;

use crate::biases::{
    BoostEnvironmentsBias, BoostLatestReleasesBias, BoostLowVolumeProjectsBias,
    BoostReplayIdBias, BoostedReleases,
};
use crate::combinator::{BiasesCombinator, OrderedBiasesCombinator};
use crate::multiplexer::{self, BIASES_OPTION, BiasOption};
use crate::rule_type::RuleType;

/// An error that prevents rules from being generated for a project.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The quota system has no blended sample rate for the organization.
    #[error("no blended sample rate available")]
    MissingBlendedSampleRate,
    /// The blended sample rate is not a finite value in `[0, 1]`.
    #[error("invalid blended sample rate {0}")]
    InvalidBlendedSampleRate(f64),
    /// The `sentry:dynamic_sampling_biases` option cannot be parsed.
    #[error("invalid dynamic sampling biases option")]
    InvalidBiasOption(#[source] serde_json::Error),
    /// A bias produced a rule with a sample rate outside of `[0, 1]`.
    #[error("rule {id} has invalid sample rate {value}")]
    InvalidRule {
        /// The id of the offending rule.
        id: RuleId,
        /// The sample rate of the offending rule.
        value: f64,
    },
}

/// Settings of the biases built by [`RuleGenerator`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneratorConfig {
    /// For how long a newly boosted release is sampled at an increased rate.
    pub latest_release_boost: TimeDelta,
    /// The maximum number of boosted releases per project that receive a rule.
    pub max_boosted_releases: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            latest_release_boost: TimeDelta::hours(1),
            max_boosted_releases: 10,
        }
    }
}

/// Returns the combinator with all biases served to Relay, in evaluation order.
///
/// The uniform rule of [`RuleType::BoostLowVolumeProjects`] is registered last so that it only
/// applies when no boost matched.
pub fn relay_biases_combinator(
    releases: Arc<dyn BoostedReleases>,
    config: GeneratorConfig,
    now: DateTime<Utc>,
) -> OrderedBiasesCombinator {
    let mut combinator = OrderedBiasesCombinator::new();

    combinator.add(RuleType::BoostReplayId, Box::new(BoostReplayIdBias));
    combinator.add(RuleType::BoostEnvironments, Box::new(BoostEnvironmentsBias));
    combinator.add_if(
        config.max_boosted_releases > 0,
        RuleType::BoostLatestReleases,
        Box::new(BoostLatestReleasesBias::new(
            releases,
            config.latest_release_boost,
            config.max_boosted_releases,
            now,
        )),
    );
    combinator.add(
        RuleType::BoostLowVolumeProjects,
        Box::new(BoostLowVolumeProjectsBias),
    );

    combinator
}

/// Computes the dynamic sampling rules of projects.
///
/// Rules are recomputed on every call from the blended sample rate of the organization and the
/// bias settings of the project.
pub struct RuleGenerator {
    quotas: Arc<dyn Quotas>,
    releases: Arc<dyn BoostedReleases>,
    config: GeneratorConfig,
}

impl RuleGenerator {
    /// Creates a generator with the default [`GeneratorConfig`].
    pub fn new(quotas: Arc<dyn Quotas>, releases: Arc<dyn BoostedReleases>) -> Self {
        Self {
            quotas,
            releases,
            config: GeneratorConfig::default(),
        }
    }

    /// Replaces the generator settings.
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Generates the rules of a project and reports failures.
    ///
    /// This is the fail-open boundary of [`try_generate_rules`](Self::try_generate_rules): on
    /// error, the failure is logged at error level, which reports it to Sentry, and an empty list
    /// is returned. An empty list means that Relay applies no dynamic sampling to the project.
    pub fn generate_rules(&self, project: &Project, now: DateTime<Utc>) -> Vec<SamplingRule> {
        match self.try_generate_rules(project, now) {
            Ok(rules) => rules,
            Err(error) => {
                ds_log::error!(
                    error = &error as &dyn Error,
                    project_id = %project.id,
                    organization_id = %project.organization_id,
                    "failed to generate dynamic sampling rules"
                );
                Vec::new()
            }
        }
    }

    /// Generates the rules of a project.
    ///
    /// The returned list is ordered for evaluation by Relay. Rule ids are unique and the uniform
    /// rule at the base sample rate comes last.
    pub fn try_generate_rules(
        &self,
        project: &Project,
        now: DateTime<Utc>,
    ) -> Result<Vec<SamplingRule>, GenerationError> {
        let base_sample_rate = self
            .quotas
            .blended_sample_rate(project)
            .ok_or(GenerationError::MissingBlendedSampleRate)?;

        if !(0.0..=1.0).contains(&base_sample_rate) {
            return Err(GenerationError::InvalidBlendedSampleRate(base_sample_rate));
        }

        let user_set_biases = parse_bias_options(project)?;
        let user_biases = multiplexer::get_user_biases(user_set_biases.as_deref());

        let combinator = relay_biases_combinator(self.releases.clone(), self.config, now);

        let mut rules = Vec::new();
        for (rule_type, bias) in combinator.get_combined_biases() {
            let enabled = rule_type.is_always_allowed()
                || (multiplexer::get_user_bias_by_id(rule_type.as_str(), &user_biases).active
                    && base_sample_rate < 1.0);

            if !enabled {
                continue;
            }

            match bias.generate_rules(project, base_sample_rate) {
                Ok(bias_rules) => rules.extend(bias_rules),
                Err(error) => ds_log::error!(
                    error = &error as &dyn Error,
                    project_id = %project.id,
                    rule_type = rule_type.as_str(),
                    "failed to generate rules for bias"
                ),
            }
        }

        let rules = dedup_rules(rules)?;

        ds_log::debug!(
            organization_id = %project.organization_id,
            project_id = %project.id,
            rules = ?rules,
            "generated {} dynamic sampling rules",
            rules.len()
        );

        Ok(rules)
    }
}

/// Reads the user's bias settings from the project options.
fn parse_bias_options(project: &Project) -> Result<Option<Vec<BiasOption>>, GenerationError> {
    project
        .get_option(BIASES_OPTION)
        .map(|value| {
            serde_json::from_value(value.clone()).map_err(GenerationError::InvalidBiasOption)
        })
        .transpose()
}

/// Validates sample rates and removes rules with duplicate ids, keeping the first.
fn dedup_rules(rules: Vec<SamplingRule>) -> Result<Vec<SamplingRule>, GenerationError> {
    let mut seen = HashSet::new();
    let mut deduped = Vec::with_capacity(rules.len());

    for rule in rules {
        let value = rule.sampling_value.value();
        if !(0.0..=1.0).contains(&value) {
            return Err(GenerationError::InvalidRule { id: rule.id, value });
        }

        if seen.insert(rule.id) {
            deduped.push(rule);
        } else {
            ds_log::warn!(rule_id = %rule.id, "dropping sampling rule with duplicate id");
        }
    }

    Ok(deduped)
}

#[cfg(test)]
mod tests {
    use ds_protocol::{
        DecayingFunction, RuleCondition, RuleType as SamplingRuleType, SamplingValue, TimeRange,
    };

    use crate::biases::BoostedRelease;

    use super::*;

    fn rule(id: u32, value: f64) -> SamplingRule {
        SamplingRule {
            condition: RuleCondition::all(),
            sampling_value: SamplingValue::SampleRate { value },
            ty: SamplingRuleType::Trace,
            id: RuleId(id),
            time_range: TimeRange::default(),
            decaying_fn: DecayingFunction::Constant,
        }
    }

    #[test]
    fn test_dedup_keeps_first() {
        ds_log::init_test!();

        let rules = dedup_rules(vec![rule(1001, 1.0), rule(1000, 0.5), rule(1001, 0.2)]).unwrap();

        assert_eq!(rules, vec![rule(1001, 1.0), rule(1000, 0.5)]);
    }

    #[test]
    fn test_dedup_rejects_invalid_rate() {
        let error = dedup_rules(vec![rule(1000, 1.5)]).unwrap_err();
        assert_eq!(error.to_string(), "rule 1000 has invalid sample rate 1.5");
    }

    #[test]
    fn test_relay_biases_combinator_order() {
        let combinator = relay_biases_combinator(
            Arc::new(Vec::<BoostedRelease>::new()),
            GeneratorConfig::default(),
            DateTime::UNIX_EPOCH,
        );

        let rule_types: Vec<_> = combinator.get_combined_biases().keys().copied().collect();
        assert_eq!(
            rule_types,
            vec![
                RuleType::BoostReplayId,
                RuleType::BoostEnvironments,
                RuleType::BoostLatestReleases,
                RuleType::BoostLowVolumeProjects,
            ]
        );
    }

    #[test]
    fn test_relay_biases_combinator_without_releases() {
        let config = GeneratorConfig {
            max_boosted_releases: 0,
            ..Default::default()
        };
        let combinator = relay_biases_combinator(
            Arc::new(Vec::<BoostedRelease>::new()),
            config,
            DateTime::UNIX_EPOCH,
        );

        assert!(
            !combinator
                .get_combined_biases()
                .contains_key(&RuleType::BoostLatestReleases)
        );
    }
}
