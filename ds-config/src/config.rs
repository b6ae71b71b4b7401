use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Defines the source of a config error.
#[derive(Debug)]
enum ConfigErrorSource {
    /// An error occurring independently.
    None,
    /// An error originating from a configuration file.
    File(PathBuf),
    /// An error originating from a specific value.
    Field(&'static str),
}

/// Indicates config related errors.
#[derive(Debug)]
pub struct ConfigError {
    origin: ConfigErrorSource,
    kind: ConfigErrorKind,
    inner: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl ConfigError {
    #[inline]
    fn new(kind: ConfigErrorKind) -> Self {
        Self {
            origin: ConfigErrorSource::None,
            kind,
            inner: None,
        }
    }

    #[inline]
    fn wrap<E>(inner: E, kind: ConfigErrorKind) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            origin: ConfigErrorSource::None,
            kind,
            inner: Some(Box::new(inner)),
        }
    }

    #[inline]
    fn file(mut self, p: impl AsRef<Path>) -> Self {
        self.origin = ConfigErrorSource::File(p.as_ref().to_path_buf());
        self
    }

    #[inline]
    fn field(mut self, name: &'static str) -> Self {
        self.origin = ConfigErrorSource::Field(name);
        self
    }

    /// Returns the error kind of the error.
    pub fn kind(&self) -> ConfigErrorKind {
        self.kind
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            ConfigErrorSource::None => write!(f, "{}", self.kind),
            ConfigErrorSource::File(file_name) => {
                write!(f, "{} (file {})", self.kind, file_name.display())
            }
            ConfigErrorSource::Field(name) => write!(f, "{} (field {})", self.kind, name),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.as_ref().map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

/// Indicates config related errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ConfigErrorKind {
    /// Failed to open the file.
    #[error("could not open config file")]
    CouldNotOpenFile,
    /// Parsing YAML failed.
    #[error("could not parse yaml config file")]
    BadYaml,
    /// Parsing JSON failed.
    #[error("could not parse json config file")]
    BadJson,
    /// Invalid config value.
    #[error("invalid config value")]
    InvalidValue,
}

/// Settings of the rule generator and the rebalancing models.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplingSettings {
    /// For how long a newly boosted release is sampled at an increased rate, in seconds.
    pub latest_release_boost_secs: u64,

    /// The maximum number of boosted releases per project that receive a rule.
    pub max_boosted_releases: usize,

    /// The fidelity rate of the adjusted project model.
    ///
    /// Must be in the range `(0, 1]`.
    pub fidelity_rate: f64,

    /// How strongly rebalanced sample rates move away from the base sample rate.
    ///
    /// `0` keeps the base sample rate, `1` applies the fully rebalanced rate.
    pub rebalancing_intensity: f64,

    /// The window over which volumes are observed before extrapolating them to a month.
    pub sliding_window_hours: u64,
}

impl SamplingSettings {
    /// The longest allowed latest release boost, 30 days.
    pub const MAX_LATEST_RELEASE_BOOST_SECS: u64 = 30 * 24 * 3600;

    fn validate(&self) -> Result<(), ConfigError> {
        if self.latest_release_boost_secs > Self::MAX_LATEST_RELEASE_BOOST_SECS {
            return Err(ConfigError::new(ConfigErrorKind::InvalidValue)
                .field("sampling.latest_release_boost_secs"));
        }

        if !(self.fidelity_rate > 0.0 && self.fidelity_rate <= 1.0) {
            return Err(
                ConfigError::new(ConfigErrorKind::InvalidValue).field("sampling.fidelity_rate")
            );
        }

        if !(0.0..=1.0).contains(&self.rebalancing_intensity) {
            return Err(ConfigError::new(ConfigErrorKind::InvalidValue)
                .field("sampling.rebalancing_intensity"));
        }

        if self.sliding_window_hours == 0 {
            return Err(ConfigError::new(ConfigErrorKind::InvalidValue)
                .field("sampling.sliding_window_hours"));
        }

        Ok(())
    }
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            latest_release_boost_secs: 3600,
            max_boosted_releases: 10,
            fidelity_rate: 0.4,
            rebalancing_intensity: 1.0,
            sliding_window_hours: 24,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct ConfigValues {
    logging: ds_log::LogConfig,
    sentry: ds_log::SentryConfig,
    sampling: SamplingSettings,
}

impl ConfigValues {
    const FILE_NAME: &'static str = "config.yml";

    fn load(base: &Path) -> Result<Self, ConfigError> {
        let path = base.join(Self::FILE_NAME);

        let contents = fs::read_to_string(&path)
            .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::CouldNotOpenFile).file(&path))?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::BadYaml).file(&path))
    }
}

/// Config struct.
#[derive(Debug, Default)]
pub struct Config {
    values: ConfigValues,
    path: PathBuf,
}

impl Config {
    /// Loads a config from a given config folder.
    ///
    /// The folder must contain a `config.yml` file. Sampling settings are validated.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let values = ConfigValues::load(&path)?;

        let config = Config { values, path };
        config.values.sampling.validate()?;

        Ok(config)
    }

    /// Creates a config from a JSON value.
    ///
    /// This is mostly useful for tests.
    pub fn from_json_value(value: serde_json::Value) -> Result<Config, ConfigError> {
        let values: ConfigValues = serde_json::from_value(value)
            .map_err(|err| ConfigError::wrap(err, ConfigErrorKind::BadJson))?;
        values.sampling.validate()?;

        Ok(Config {
            values,
            path: PathBuf::new(),
        })
    }

    /// Returns the path to the configuration folder, if loaded from disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes the config values to YAML.
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(&self.values)
            .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::BadYaml))
    }

    /// Returns the logging configuration.
    pub fn logging(&self) -> &ds_log::LogConfig {
        &self.values.logging
    }

    /// Returns the configuration for internal error reporting.
    pub fn sentry(&self) -> &ds_log::SentryConfig {
        &self.values.sentry
    }

    /// Returns the sampling settings.
    pub fn sampling(&self) -> &SamplingSettings {
        &self.values.sampling
    }

    /// Returns the duration of a latest release boost.
    pub fn latest_release_boost(&self) -> Duration {
        Duration::from_secs(self.values.sampling.latest_release_boost_secs)
    }
}
