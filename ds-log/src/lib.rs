//! Error reporting and logging facade for the dynamic sampling crates.
//!
//! # Setup
//!
//! To enable logging, invoke the [`init`] function with [`logging`](LogConfig) and
//! [`sentry`](SentryConfig) configuration. The configuration implements `serde` traits, so it can
//! be obtained from configuration files.
//!
//! ```
//! # #[cfg(feature = "init")] {
//! use ds_log::{LogConfig, SentryConfig};
//!
//! let log_config = LogConfig {
//!     enable_backtraces: true,
//!     ..LogConfig::default()
//! };
//!
//! let sentry_config = SentryConfig {
//!     enabled: true,
//!     ..SentryConfig::default()
//! };
//!
//! ds_log::init(&log_config, &sentry_config);
//! # }
//! ```
//!
//! # Logging
//!
//! The basic use of this crate is through the five logging macros: [`error!`], [`warn!`],
//! [`info!`], [`debug!`] and [`trace!`] where `error!` represents the highest-priority log messages
//! and `trace!` the lowest. The log messages are filtered by configuring the log level to exclude
//! messages with a lower priority. Each of these macros accept format strings similarly to
//! [`println!`], as well as structured fields.
//!
//! ## Conventions
//!
//! Log messages should start lowercase and end without punctuation. Prefer short and precise log
//! messages over verbose text. Choose the log level according to these rules:
//!
//! - [`error!`] for bugs and invalid behavior. This will also be reported to Sentry.
//! - [`warn!`] for undesirable behavior.
//! - [`info!`] for messages relevant to the average user.
//! - [`debug!`] for messages usually relevant to debugging.
//! - [`trace!`] for full auxiliary information.
//!
//! ## Examples
//!
//! ```
//! ds_log::info!(project_id = 42, "generated sampling rules");
//! ```
//!
//! # Error Reporting
//!
//! `sentry` is used for error reporting of all messages logged with an error level. Errors are
//! passed as structured field so that their source chain is preserved:
//!
//! ```
//! use std::error::Error;
//! use std::io;
//!
//! let error = io::Error::other("oh no!");
//! ds_log::error!(error = &error as &dyn Error, "operation failed");
//! ```
//!
//! To add custom scope information, use [`configure_scope`] or [`with_scope`].
//!
//! ```
//! ds_log::with_scope(|scope| scope.set_tag("custom", "value"), || {
//!     ds_log::error!("this message has a custom tag");
//! });
//! ```
//!
//! ## Capturing without Logging
//!
//! Additionally, errors can be captured without logging.
//!
//! ```
//! use std::io;
//!
//! let custom_error = io::Error::other("oh no!");
//! ds_log::capture_error(&custom_error);
//! ```
//!
//! # Testing
//!
//! For unit testing, there is a separate initialization macro `init_test!` (feature `test`) that
//! should be called at the beginning of test method. It enables test mode of the logger and
//! customizes log levels for the current crate.

#![warn(missing_docs)]

#[cfg(feature = "init")]
mod setup;
#[cfg(feature = "init")]
pub use setup::*;

#[cfg(feature = "test")]
pub use test::*;

mod utils;
pub use utils::*;

// Expose the minimal log facade.
#[doc(inline)]
pub use tracing::{debug, error, info, trace, warn};

// Expose the minimal error reporting API.
#[doc(inline)]
pub use sentry_core::{Hub, capture_error, configure_scope, protocol, with_scope};
