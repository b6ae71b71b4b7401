use std::path::Path;

use anyhow::{Context, Result};
use ds_config::Config;

/// Loads the config from the given folder, or defaults if no folder is given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Initializes logging and error reporting.
pub fn init_logging(config: &Config) {
    ds_log::init(config.logging(), config.sentry());
}

/// Print spawn infos to the log.
pub fn dump_spawn_infos(config: &Config) {
    if config.path().as_os_str().is_empty() {
        ds_log::debug!("running without config folder");
    } else {
        ds_log::debug!("running with config folder {}", config.path().display());
    }

    let sampling = config.sampling();
    ds_log::debug!("  log level: {}", config.logging().level);
    ds_log::debug!("  latest release boost: {}s", sampling.latest_release_boost_secs);
    ds_log::debug!("  max boosted releases: {}", sampling.max_boosted_releases);
}
