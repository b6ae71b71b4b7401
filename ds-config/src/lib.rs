//! Configuration for the dynamic sampling tools.
//!
//! The configuration is loaded from a `config.yml` file inside a configuration directory:
//!
//! ```yaml
//! logging:
//!   level: debug
//! sampling:
//!   max_boosted_releases: 5
//!   fidelity_rate: 0.25
//! ```
//!
//! All sections and values are optional and fall back to defaults.

#![warn(missing_docs)]

mod config;

pub use self::config::*;
