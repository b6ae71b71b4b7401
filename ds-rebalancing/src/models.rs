//! Rebalancing models that compute new sample rates.

use ds_protocol::ProjectId;
use serde::{Deserialize, Serialize};

use crate::error::{RebalancingError, check_count, check_intensity, check_rate};

/// A rebalancing model.
///
/// [`run`](Self::run) validates the input before computing, so [`compute`](Self::compute) can
/// rely on valid input.
pub trait Model<I> {
    /// The result of the model.
    type Output;

    /// Checks that the input is valid for this model.
    fn validate(&self, input: &I) -> Result<(), RebalancingError>;

    /// Computes the result from a validated input.
    fn compute(&self, input: I) -> Self::Output;

    /// Validates the input and computes the result.
    fn run(&self, input: I) -> Result<Self::Output, RebalancingError> {
        self.validate(&input)?;
        Ok(self.compute(input))
    }
}

/// A class of traffic with its observed volume and rebalanced sample rate.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancedItem<Id> {
    /// The identifier of the class.
    pub id: Id,
    /// The number of events observed for the class.
    pub count: f64,
    /// The sample rate computed for this class.
    ///
    /// Ignored on input.
    #[serde(default)]
    pub new_sample_rate: f64,
}

impl<Id> RebalancedItem<Id> {
    /// Creates an item with its observed count.
    pub fn new(id: Id, count: f64) -> Self {
        Self {
            id,
            count,
            new_sample_rate: 0.0,
        }
    }
}

/// Distributes `budget` over `classes` from the smallest to the largest class.
///
/// Every class is offered an equal share of the remaining budget. Classes smaller than their share
/// are kept entirely and leave the rest to the larger classes. Rates are blended with `base_rate`
/// by `intensity`. Returns the classes sorted by `(count, id)` and the budget they use.
fn water_fill<Id: Ord>(
    mut classes: Vec<RebalancedItem<Id>>,
    budget: f64,
    base_rate: f64,
    intensity: f64,
) -> (Vec<RebalancedItem<Id>>, f64) {
    classes.sort_by(|a, b| a.count.total_cmp(&b.count).then_with(|| a.id.cmp(&b.id)));

    let mut remaining_budget = budget;
    let mut remaining_classes = classes.len();
    let mut used_budget = 0.0;

    for class in &mut classes {
        let share = remaining_budget.max(0.0) / remaining_classes as f64;
        let rate = if class.count > 0.0 {
            (share / class.count).min(1.0)
        } else {
            1.0
        };

        let rate = rate * intensity + base_rate * (1.0 - intensity);
        let spent = class.count * rate;

        class.new_sample_rate = rate;
        remaining_budget -= spent;
        remaining_classes -= 1;
        used_budget += spent;
    }

    (classes, used_budget)
}

/// Input of the [`FullRebalancingModel`].
#[derive(Clone, Debug, PartialEq)]
pub struct FullRebalancingInput<Id> {
    /// The classes to rebalance.
    pub classes: Vec<RebalancedItem<Id>>,
    /// The sample rate that applies to the total volume.
    pub sample_rate: f64,
    /// The total volume, which may be larger than the sum of the classes.
    pub total: f64,
    /// How strongly the rebalanced rates deviate from `sample_rate`, in `[0, 1]`.
    pub intensity: f64,
}

/// Output of the [`FullRebalancingModel`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullRebalancingOutput<Id> {
    /// The classes with new sample rates, sorted by ascending count.
    pub classes: Vec<RebalancedItem<Id>>,
    /// The number of events kept with the new sample rates.
    pub used_budget: f64,
}

/// Rebalances a budget of `total * sample_rate` events over all classes.
///
/// Small classes are sampled at higher rates, up to `1.0`, and large classes absorb the remaining
/// budget. With an intensity of `0`, every class keeps `sample_rate`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FullRebalancingModel;

impl<Id: Ord> Model<FullRebalancingInput<Id>> for FullRebalancingModel {
    type Output = FullRebalancingOutput<Id>;

    fn validate(&self, input: &FullRebalancingInput<Id>) -> Result<(), RebalancingError> {
        check_rate(input.sample_rate)?;
        check_intensity(input.intensity)?;
        check_count(input.total)?;
        for class in &input.classes {
            check_count(class.count)?;
        }
        Ok(())
    }

    fn compute(&self, input: FullRebalancingInput<Id>) -> Self::Output {
        let budget = input.total * input.sample_rate;
        let (classes, used_budget) =
            water_fill(input.classes, budget, input.sample_rate, input.intensity);

        FullRebalancingOutput {
            classes,
            used_budget,
        }
    }
}

/// Input of the [`ProjectsRebalancingModel`].
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectsRebalancingInput {
    /// The volume of every project in the organization.
    pub projects: Vec<RebalancedItem<ProjectId>>,
    /// The blended sample rate of the organization.
    pub sample_rate: f64,
    /// How strongly project rates deviate from `sample_rate`, in `[0, 1]`.
    pub intensity: f64,
}

/// Rebalances the sample rate of an organization across its projects.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProjectsRebalancingModel;

impl Model<ProjectsRebalancingInput> for ProjectsRebalancingModel {
    type Output = Vec<RebalancedItem<ProjectId>>;

    fn validate(&self, input: &ProjectsRebalancingInput) -> Result<(), RebalancingError> {
        if input.projects.is_empty() {
            return Err(RebalancingError::EmptyInput);
        }

        check_rate(input.sample_rate)?;
        check_intensity(input.intensity)?;
        for project in &input.projects {
            check_count(project.count)?;
        }
        Ok(())
    }

    fn compute(&self, input: ProjectsRebalancingInput) -> Self::Output {
        let total = input.projects.iter().map(|p| p.count).sum();

        FullRebalancingModel
            .compute(FullRebalancingInput {
                classes: input.projects,
                sample_rate: input.sample_rate,
                total,
                intensity: input.intensity,
            })
            .classes
    }
}

/// Input of the [`TransactionsRebalancingModel`].
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionsRebalancingInput {
    /// The transactions that receive an explicit sample rate, usually the top transactions.
    pub transactions: Vec<RebalancedItem<String>>,
    /// The sample rate of the project.
    pub sample_rate: f64,
    /// The total volume of the project, including implicit transactions.
    ///
    /// If `None`, only the explicit transactions are considered.
    pub total_num_transactions: Option<f64>,
    /// The number of distinct transactions, including implicit ones.
    pub total_num_classes: Option<usize>,
    /// How strongly transaction rates deviate from `sample_rate`, in `[0, 1]`.
    pub intensity: f64,
}

/// Output of the [`TransactionsRebalancingModel`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsRebalancingOutput {
    /// The explicit transactions with their new sample rates.
    pub explicit_transactions: Vec<RebalancedItem<String>>,
    /// The sample rate for all transactions without an explicit rate.
    ///
    /// `None` if there are no implicit transactions.
    pub implicit_rate: Option<f64>,
}

/// Rebalances the sample rate of a project across its transactions.
///
/// The budget is split between explicit and implicit transactions in proportion to their number
/// of classes. Explicit transactions are rebalanced individually. Budget they leave unused is
/// handed to the implicit transactions, which share a single rate.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransactionsRebalancingModel;

impl Model<TransactionsRebalancingInput> for TransactionsRebalancingModel {
    type Output = TransactionsRebalancingOutput;

    fn validate(&self, input: &TransactionsRebalancingInput) -> Result<(), RebalancingError> {
        check_rate(input.sample_rate)?;
        check_intensity(input.intensity)?;
        for transaction in &input.transactions {
            check_count(transaction.count)?;
        }
        if let Some(total) = input.total_num_transactions {
            check_count(total)?;
        }
        Ok(())
    }

    fn compute(&self, input: TransactionsRebalancingInput) -> Self::Output {
        let num_explicit_classes = input.transactions.len();
        let total_explicit: f64 = input.transactions.iter().map(|t| t.count).sum();

        let (total, num_implicit_classes) =
            match (input.total_num_transactions, input.total_num_classes) {
                (Some(total), Some(classes)) => (
                    total.max(total_explicit),
                    classes.saturating_sub(num_explicit_classes),
                ),
                _ => (total_explicit, 0),
            };

        let total_implicit = total - total_explicit;
        let total_classes = num_explicit_classes + num_implicit_classes;

        if total_classes == 0 {
            return TransactionsRebalancingOutput {
                explicit_transactions: Vec::new(),
                implicit_rate: None,
            };
        }

        let budget = total * input.sample_rate;
        let explicit_budget = budget * num_explicit_classes as f64 / total_classes as f64;

        let (explicit_transactions, used_budget) = water_fill(
            input.transactions,
            explicit_budget,
            input.sample_rate,
            input.intensity,
        );

        let implicit_rate = (num_implicit_classes > 0 && total_implicit > 0.0).then(|| {
            let implicit_budget = (budget - used_budget).max(0.0);
            let rate = (implicit_budget / total_implicit).min(1.0);
            rate * input.intensity + input.sample_rate * (1.0 - input.intensity)
        });

        ds_log::trace!(
            num_explicit_classes,
            num_implicit_classes,
            used_budget,
            ?implicit_rate,
            "rebalanced transactions"
        );

        TransactionsRebalancingOutput {
            explicit_transactions,
            implicit_rate,
        }
    }
}
