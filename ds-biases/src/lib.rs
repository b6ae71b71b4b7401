//! Generation of dynamic sampling rules from biases.
//!
//! Every project is sampled at the blended sample rate of its organization. Biases adjust this
//! for traces that deserve a higher fidelity, for example traces from development environments or
//! traces with a session replay. The [`RuleGenerator`] collects the rules of all enabled biases
//! into a list that Relay evaluates in order.
//!
//! # Rule Order
//!
//! The order of biases is defined by a [`BiasesCombinator`]. [`relay_biases_combinator`] registers
//! all biases served to Relay:
//!
//! 1. [`BoostReplayIdBias`]
//! 2. [`BoostEnvironmentsBias`]
//! 3. [`BoostLatestReleasesBias`]
//! 4. [`BoostLowVolumeProjectsBias`], the uniform rule at the base sample rate
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use chrono::DateTime;
//! use ds_biases::{BoostedRelease, RuleGenerator};
//! use ds_protocol::{OrganizationId, Project, ProjectId};
//! use ds_quotas::StaticQuotas;
//!
//! let generator = RuleGenerator::new(
//!     Arc::new(StaticQuotas::with_sample_rate(0.25)),
//!     Arc::new(Vec::<BoostedRelease>::new()),
//! );
//!
//! let project = Project::new(ProjectId::new(42), OrganizationId::new(1));
//! let rules = generator.generate_rules(&project, DateTime::UNIX_EPOCH);
//!
//! assert_eq!(rules.last().unwrap().sampling_value.value(), 0.25);
//! ```

#![warn(missing_docs)]

mod biases;
mod combinator;
mod generator;
mod multiplexer;
mod rule_type;

pub use self::biases::*;
pub use self::combinator::*;
pub use self::generator::*;
pub use self::multiplexer::*;
pub use self::rule_type::*;
