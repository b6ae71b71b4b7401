//! Command line interface for dynamic sampling rule generation.
//!
//! The `ds` binary computes the dynamic sampling rules that Sentry serves to Relay for a project,
//! and exposes the rebalancing arithmetic used to derive sample rates from observed volumes.
//!
//! # Commands
//!
//!  - `ds rules <snapshot>`: Generates the rules of a project from a JSON snapshot containing the
//!    project, the blended sample rate of its organization and its boosted releases.
//!  - `ds extrapolate <volume> [hours]`: Extrapolates the volume of a sliding window to a month.
//!  - `ds adjust <volumes>`: Computes volume adjustments between the projects of an organization.
//!  - `ds rebalance <volumes> --sample-rate <rate>`: Rebalances a sample rate across projects.
//!  - `ds config show`: Prints the effective configuration.
//!
//! All commands accept `--config <dir>` pointing to a folder with a `config.yml` file.
//!
//! # Workspace Crates
//!
//!  - `ds`: Main entry point and command line interface.
//!  - [`ds-biases`]: Biases and rule generation.
//!  - [`ds-config`]: Static configuration for the CLI.
//!  - [`ds-log`]: Error reporting and logging.
//!  - [`ds-protocol`]: Rule types as consumed by Relay.
//!  - [`ds-quotas`]: Quota information of organizations.
//!  - [`ds-rebalancing`]: Sample rate rebalancing models.
//!
//! [`ds-biases`]: ../ds_biases/index.html
//! [`ds-config`]: ../ds_config/index.html
//! [`ds-log`]: ../ds_log/index.html
//! [`ds-protocol`]: ../ds_protocol/index.html
//! [`ds-quotas`]: ../ds_quotas/index.html
//! [`ds-rebalancing`]: ../ds_rebalancing/index.html

mod cli;
mod setup;
mod snapshot;

use std::process;

use ds_log::Hub;

pub fn main() {
    let exit_code = match cli::execute() {
        Ok(()) => 0,
        Err(err) => {
            ds_log::ensure_error(&err);
            1
        }
    };

    if let Some(client) = Hub::current().client() {
        client.close(None);
    }

    process::exit(exit_code);
}
