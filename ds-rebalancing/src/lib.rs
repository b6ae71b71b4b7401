//! Sample rate rebalancing for dynamic sampling.
//!
//! Rebalancing redistributes a sampling budget across classes of traffic, such as the projects of
//! an organization or the transactions of a project, so that low volume classes are kept at a
//! higher rate than high volume classes while the overall number of kept events stays the same.
//!
//! - [`AdjustedModel`] computes volume adjustments that smooth disparities between projects.
//! - [`FullRebalancingModel`], [`ProjectsRebalancingModel`] and [`TransactionsRebalancingModel`]
//!   compute new sample rates and implement the [`Model`] trait.
//! - [`extrapolate_monthly_volume`] and [`sliding_window_sample_rate`] derive a sample rate from
//!   the volume observed in a sliding window.

#![warn(missing_docs)]

mod adjustment;
mod error;
mod models;
mod sliding_window;

pub use self::adjustment::*;
pub use self::error::*;
pub use self::models::*;
pub use self::sliding_window::*;
