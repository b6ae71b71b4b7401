use ds_protocol::{
    DecayingFunction, Project, RuleCondition, RuleType as SamplingRuleType, SamplingRule,
    SamplingValue, TimeRange,
};

use crate::biases::{Bias, BiasError};
use crate::rule_type::RuleType;

/// Glob patterns of environments that are fully sampled.
pub const ENVIRONMENT_GLOBS: &[&str] = &["*debug*", "*dev*", "*local*", "*qa*", "*test*"];

/// Keeps all traces from development and testing environments.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoostEnvironmentsBias;

impl Bias for BoostEnvironmentsBias {
    fn generate_rules(
        &self,
        _project: &Project,
        _base_sample_rate: f64,
    ) -> Result<Vec<SamplingRule>, BiasError> {
        Ok(vec![SamplingRule {
            condition: RuleCondition::or(vec![RuleCondition::glob(
                "trace.environment",
                ENVIRONMENT_GLOBS.iter().copied(),
            )]),
            sampling_value: SamplingValue::SampleRate { value: 1.0 },
            ty: SamplingRuleType::Trace,
            id: RuleType::BoostEnvironments.reserved_id(),
            time_range: TimeRange::default(),
            decaying_fn: DecayingFunction::Constant,
        }])
    }
}

#[cfg(test)]
mod tests {
    use ds_protocol::{OrganizationId, ProjectId};

    use super::*;

    #[test]
    fn test_generate_bias_for_environments() {
        let project = Project::new(ProjectId::new(1), OrganizationId::new(1));
        let rules = BoostEnvironmentsBias.generate_rules(&project, 0.1).unwrap();

        insta::assert_json_snapshot!(rules, @r#"
        [
          {
            "condition": {
              "op": "or",
              "inner": [
                {
                  "op": "glob",
                  "name": "trace.environment",
                  "value": [
                    "*debug*",
                    "*dev*",
                    "*local*",
                    "*qa*",
                    "*test*"
                  ]
                }
              ]
            },
            "samplingValue": {
              "type": "sampleRate",
              "value": 1.0
            },
            "type": "trace",
            "id": 1001
          }
        ]
        "#);
    }
}
