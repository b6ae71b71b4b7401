//! Ordering of biases into a combined rule list.

use indexmap::IndexMap;

use crate::biases::Bias;
use crate::rule_type::RuleType;

/// Merges biases from multiple registrations into one ordered collection.
///
/// Relay evaluates rules in list order and applies the first matching sample rate, so the order of
/// the combined biases determines the sampling outcome.
pub trait BiasesCombinator {
    /// Registers a bias for a rule type, replacing an earlier registration of the same type.
    fn add(&mut self, rule_type: RuleType, bias: Box<dyn Bias>);

    /// Registers a bias only if `condition` holds.
    fn add_if(&mut self, condition: bool, rule_type: RuleType, bias: Box<dyn Bias>) {
        if condition {
            self.add(rule_type, bias);
        }
    }

    /// Returns the registered biases in evaluation order.
    fn get_combined_biases(&self) -> IndexMap<RuleType, &dyn Bias>;
}

/// A [`BiasesCombinator`] that orders biases by registration.
///
/// Every registration draws a number from a monotonic counter. Combined biases are sorted by that
/// number, so registering a rule type again moves it to the position of the latest registration.
#[derive(Default)]
pub struct OrderedBiasesCombinator {
    biases: IndexMap<RuleType, (Box<dyn Bias>, u64)>,
    order_discriminant: u64,
}

impl OrderedBiasesCombinator {
    /// Creates an empty combinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next order number and advances the counter.
    pub fn get_next_order_number(&mut self) -> u64 {
        let order_number = self.order_discriminant;
        self.order_discriminant += 1;
        order_number
    }

    /// Registers a bias with an explicit order number.
    pub fn register(&mut self, rule_type: RuleType, bias: Box<dyn Bias>, order_number: u64) {
        self.biases.insert(rule_type, (bias, order_number));
    }

    /// Returns the number of registered rule types.
    pub fn len(&self) -> usize {
        self.biases.len()
    }

    /// Returns `true` if no bias is registered.
    pub fn is_empty(&self) -> bool {
        self.biases.is_empty()
    }
}

impl BiasesCombinator for OrderedBiasesCombinator {
    fn add(&mut self, rule_type: RuleType, bias: Box<dyn Bias>) {
        let order_number = self.get_next_order_number();
        self.register(rule_type, bias, order_number);
    }

    fn get_combined_biases(&self) -> IndexMap<RuleType, &dyn Bias> {
        let mut ordered: Vec<_> = self
            .biases
            .iter()
            .map(|(rule_type, (bias, order))| (*order, *rule_type, bias.as_ref()))
            .collect();

        ordered.sort_by_key(|(order, _, _)| *order);

        ordered
            .into_iter()
            .map(|(_, rule_type, bias)| (rule_type, bias))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use crate::biases::{BoostEnvironmentsBias, BoostLowVolumeProjectsBias, BoostReplayIdBias};

    use super::*;

    fn rule_types(combinator: &OrderedBiasesCombinator) -> Vec<RuleType> {
        combinator.get_combined_biases().keys().copied().collect()
    }

    #[test]
    fn test_combined_biases_follow_registration_order() {
        let mut combinator = OrderedBiasesCombinator::new();
        combinator.add(RuleType::BoostReplayId, Box::new(BoostReplayIdBias));
        combinator.add(
            RuleType::BoostLowVolumeProjects,
            Box::new(BoostLowVolumeProjectsBias),
        );
        combinator.add(RuleType::BoostEnvironments, Box::new(BoostEnvironmentsBias));

        assert_eq!(
            rule_types(&combinator),
            vec![
                RuleType::BoostReplayId,
                RuleType::BoostLowVolumeProjects,
                RuleType::BoostEnvironments,
            ]
        );
    }

    #[test]
    fn test_explicit_order_numbers() {
        let mut combinator = OrderedBiasesCombinator::new();
        combinator.register(RuleType::BoostEnvironments, Box::new(BoostEnvironmentsBias), 5);
        combinator.register(RuleType::BoostReplayId, Box::new(BoostReplayIdBias), 1);

        assert_eq!(
            rule_types(&combinator),
            vec![RuleType::BoostReplayId, RuleType::BoostEnvironments]
        );
    }

    #[test]
    fn test_reregistration_moves_to_end() {
        let mut combinator = OrderedBiasesCombinator::new();
        combinator.add(RuleType::BoostEnvironments, Box::new(BoostEnvironmentsBias));
        combinator.add(RuleType::BoostReplayId, Box::new(BoostReplayIdBias));
        combinator.add(RuleType::BoostEnvironments, Box::new(BoostEnvironmentsBias));

        assert_eq!(combinator.len(), 2);
        assert_eq!(
            rule_types(&combinator),
            vec![RuleType::BoostReplayId, RuleType::BoostEnvironments]
        );
    }

    #[test]
    fn test_add_if() {
        let mut combinator = OrderedBiasesCombinator::new();
        combinator.add_if(false, RuleType::BoostReplayId, Box::new(BoostReplayIdBias));
        assert!(combinator.is_empty());

        combinator.add_if(true, RuleType::BoostReplayId, Box::new(BoostReplayIdBias));
        assert_eq!(rule_types(&combinator), vec![RuleType::BoostReplayId]);
    }

    #[test]
    fn test_order_numbers_are_monotonic() {
        let mut combinator = OrderedBiasesCombinator::new();
        assert_eq!(combinator.get_next_order_number(), 0);
        assert_eq!(combinator.get_next_order_number(), 1);
        assert_eq!(combinator.get_next_order_number(), 2);
    }
}
