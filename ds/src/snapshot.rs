use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use ds_biases::{BoostedRelease, GeneratorConfig, RuleGenerator};
use ds_config::Config;
use ds_protocol::{Project, ProjectId, SamplingRule};
use ds_quotas::StaticQuotas;
use ds_rebalancing::ProjectVolume;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// The state of a project required to generate its rules.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    /// The project including its options.
    pub project: Project,
    /// The blended sample rate of the project's organization.
    #[serde(default)]
    pub blended_sample_rate: Option<f64>,
    /// The releases boosted for the project.
    #[serde(default)]
    pub boosted_releases: Vec<BoostedRelease>,
}

impl ProjectSnapshot {
    /// Generates the rules of the snapshot's project.
    pub fn generate_rules(self, config: &Config, now: DateTime<Utc>) -> Result<Vec<SamplingRule>> {
        let latest_release_boost = TimeDelta::from_std(config.latest_release_boost())
            .context("latest release boost out of range")?;

        let quotas = StaticQuotas {
            default_sample_rate: self.blended_sample_rate,
            ..Default::default()
        };

        let generator = RuleGenerator::new(Arc::new(quotas), Arc::new(self.boosted_releases))
            .with_config(GeneratorConfig {
                latest_release_boost,
                max_boosted_releases: config.sampling().max_boosted_releases,
            });

        Ok(generator.generate_rules(&self.project, now))
    }
}

/// Reads and parses a JSON file, or stdin if the path is `-`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = if path.as_os_str() == "-" {
        let mut json = String::new();
        io::stdin()
            .read_to_string(&mut json)
            .context("failed to read stdin")?;
        json
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };

    serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
}

/// Reads project volumes, either as a list of objects or as a map from project id to volume.
pub fn read_volumes(path: &Path) -> Result<Vec<ProjectVolume>> {
    let value: serde_json::Value = read_json(path)?;

    if value.is_array() {
        return serde_json::from_value(value).context("invalid list of project volumes");
    }

    let map: BTreeMap<ProjectId, f64> =
        serde_json::from_value(value).context("invalid map of project volumes")?;

    Ok(map
        .into_iter()
        .map(|(id, total)| ProjectVolume { id, total })
        .collect())
}
