//! Evaluation of dynamic sampling rules.

use chrono::{DateTime, Utc};

use crate::config::{RuleId, SamplingRule, SamplingValue};
use crate::getter::Getter;

/// The outcome of matching a list of rules against a trace.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplingMatch {
    /// The sample rate to use for the trace, clamped to `[0, 1]`.
    pub sample_rate: f64,
    /// The ids of all rules that matched, in order.
    pub matched_rules: Vec<RuleId>,
}

/// Matches the rules in order against `instance` and returns the resulting sample rate.
///
/// Factor rules multiply into an accumulated factor and matching continues. The first matching
/// sample rate rule terminates matching. Rules that are inactive at `now` are skipped.
///
/// Returns `None` if no sample rate rule matched.
pub fn match_rules<'a, I, G>(now: DateTime<Utc>, instance: &G, rules: I) -> Option<SamplingMatch>
where
    G: Getter + ?Sized,
    I: IntoIterator<Item = &'a SamplingRule>,
{
    let mut factor = 1.0;
    let mut matched_rules = Vec::new();

    for rule in rules {
        if !rule.condition.matches(instance) {
            continue;
        }

        let Some(sampling_value) = rule.sample_rate(now) else {
            continue;
        };

        matched_rules.push(rule.id);

        match sampling_value {
            SamplingValue::Factor { value } => factor *= value,
            SamplingValue::SampleRate { value } => {
                return Some(SamplingMatch {
                    sample_rate: (value * factor).clamp(0.0, 1.0),
                    matched_rules,
                });
            }
        }
    }

    None
}
