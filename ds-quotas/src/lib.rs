//! Quota information consumed by dynamic sampling.
//!
//! The blended sample rate of an organization and its transaction sampling tiers are computed by
//! the billing system. This crate defines the [`Quotas`] interface through which they are read,
//! and [`StaticQuotas`], an in-memory implementation for tools and tests.

#![warn(missing_docs)]

mod quota;

pub use self::quota::*;
