use ds_protocol::{
    DecayingFunction, Project, RuleCondition, RuleType as SamplingRuleType, SamplingRule,
    SamplingValue, TimeRange,
};

use crate::biases::{Bias, BiasError};
use crate::rule_type::RuleType;

/// Returns the catch-all rule that applies `sample_rate` to every trace.
pub fn generate_uniform_rule(sample_rate: f64) -> SamplingRule {
    SamplingRule {
        condition: RuleCondition::all(),
        sampling_value: SamplingValue::SampleRate { value: sample_rate },
        ty: SamplingRuleType::Trace,
        id: RuleType::BoostLowVolumeProjects.reserved_id(),
        time_range: TimeRange::default(),
        decaying_fn: DecayingFunction::Constant,
    }
}

/// Emits the uniform rule at the base sample rate.
///
/// This rule matches everything and must therefore come last in the rule list.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoostLowVolumeProjectsBias;

impl Bias for BoostLowVolumeProjectsBias {
    fn generate_rules(
        &self,
        _project: &Project,
        base_sample_rate: f64,
    ) -> Result<Vec<SamplingRule>, BiasError> {
        Ok(vec![generate_uniform_rule(base_sample_rate)])
    }
}

#[cfg(test)]
mod tests {
    use ds_protocol::{OrganizationId, ProjectId};

    use super::*;

    #[test]
    fn test_generate_uniform_rule() {
        let project = Project::new(ProjectId::new(1), OrganizationId::new(1));
        let rules = BoostLowVolumeProjectsBias
            .generate_rules(&project, 0.25)
            .unwrap();

        insta::assert_json_snapshot!(rules, @r#"
        [
          {
            "condition": {
              "op": "and",
              "inner": []
            },
            "samplingValue": {
              "type": "sampleRate",
              "value": 0.25
            },
            "type": "trace",
            "id": 1000
          }
        ]
        "#);
    }
}
