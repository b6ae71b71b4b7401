//! Types of the dynamic sampling rules generated for a project.
//!
//! Sentry computes an ordered list of [`SamplingRule`]s for every project and serves it to Relay
//! as part of the project configuration. Relay evaluates the rules in list order against the
//! trace information of every incoming transaction and applies the first sample rate that
//! matches.
//!
//! # Components
//!
//! - [`SamplingRule`]: a rule with an id, a [`RuleCondition`] and a [`SamplingValue`].
//! - [`RuleCondition`]: a small boolean expression tree over trace fields (`and`, `or`, `not`,
//!   `eq` and `glob`).
//! - [`Getter`]: an abstraction implemented by [`TraceContext`] to expose fields that are read
//!   during matching.
//! - [`Project`]: the read-only view of a project that rules are generated for.
//!
//! # Example
//!
//! ```
//! use ds_protocol::SamplingRule;
//!
//! let rule: SamplingRule = serde_json::from_str(r#"{
//!     "condition": {"op": "and", "inner": []},
//!     "samplingValue": {"type": "sampleRate", "value": 0.25},
//!     "type": "trace",
//!     "id": 1000
//! }"#).unwrap();
//!
//! assert_eq!(rule.id.0, 1000);
//! ```

#![warn(missing_docs)]

mod condition;
mod config;
mod evaluation;
mod getter;
mod glob;
mod project;
mod trace;
mod utils;

pub use self::condition::*;
pub use self::config::*;
pub use self::evaluation::*;
pub use self::getter::*;
pub use self::glob::*;
pub use self::project::*;
pub use self::trace::*;
