use ds_protocol::{
    DecayingFunction, Project, RuleCondition, RuleType as SamplingRuleType, SamplingRule,
    SamplingValue, TimeRange,
};

use crate::biases::{Bias, BiasError};
use crate::rule_type::RuleType;

/// Keeps all traces that carry a session replay id.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoostReplayIdBias;

impl Bias for BoostReplayIdBias {
    fn generate_rules(
        &self,
        _project: &Project,
        _base_sample_rate: f64,
    ) -> Result<Vec<SamplingRule>, BiasError> {
        // `ignoreCase` has no effect on null comparisons, but Relay expects this exact shape.
        let condition =
            RuleCondition::negate(RuleCondition::equals_null("trace.replay_id").ignore_case(true));

        Ok(vec![SamplingRule {
            condition,
            sampling_value: SamplingValue::SampleRate { value: 1.0 },
            ty: SamplingRuleType::Trace,
            id: RuleType::BoostReplayId.reserved_id(),
            time_range: TimeRange::default(),
            decaying_fn: DecayingFunction::Constant,
        }])
    }
}
