//! Sampling rule producers.
//!
//! A [`Bias`] turns a project and its base sample rate into zero or more [`SamplingRule`]s.
//! Biases are stateless with respect to the project. External data, such as boosted releases, is
//! injected when the bias is constructed.

use std::error::Error;

use ds_protocol::{Project, SamplingRule};

mod environments;
mod latest_releases;
mod low_volume_projects;
mod replay_id;

pub use self::environments::*;
pub use self::latest_releases::*;
pub use self::low_volume_projects::*;
pub use self::replay_id::*;

/// An error raised by a single [`Bias`].
#[derive(Debug, thiserror::Error)]
pub enum BiasError {
    /// The external source of boosted releases could not be read.
    #[error("failed to load boosted releases")]
    BoostedReleases(#[source] Box<dyn Error + Send + Sync>),
}

/// A producer of sampling rules for a single [`RuleType`](crate::RuleType).
pub trait Bias: Send + Sync {
    /// Returns the rules contributed by this bias.
    ///
    /// `base_sample_rate` must be in the range `[0, 1]`. Validating it is the responsibility of
    /// the caller.
    fn generate_rules(
        &self,
        project: &Project,
        base_sample_rate: f64,
    ) -> Result<Vec<SamplingRule>, BiasError>;
}
