use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use ds_config::Config;
use ds_protocol::ProjectId;
use ds_rebalancing::{
    AdjustedModel, Model, ProjectsRebalancingInput, ProjectsRebalancingModel, RebalancedItem,
};
use serde::Serialize;

use crate::setup;
use crate::snapshot::{self, ProjectSnapshot};

/// Generates dynamic sampling rules and rebalances sample rates.
#[derive(Debug, Parser)]
#[command(name = "ds", version, max_term_width = 79, propagate_version = true)]
struct Cli {
    /// The path to the config folder.
    #[arg(short, long, global = true, env = "DS_CONFIG", value_name = "CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate the sampling rules of a project.
    ///
    /// The snapshot is a JSON object with the `project`, the `blendedSampleRate` of its
    /// organization and its `boostedReleases`. Rules are printed as a JSON list in the order Relay
    /// evaluates them.
    Rules {
        /// Path to the project snapshot, or `-` for stdin.
        snapshot: PathBuf,

        /// The time to generate rules at, in RFC 3339 format. Defaults to now.
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// Extrapolate the volume of a sliding window to the current month.
    Extrapolate {
        /// The number of events observed in the window.
        volume: f64,

        /// The size of the window in hours. Defaults to the configured window.
        hours: Option<f64>,
    },

    /// Compute volume adjustments between the projects of an organization.
    ///
    /// Volumes are a JSON list of `{"id", "total"}` objects or a map from project id to volume.
    Adjust {
        /// Path to the project volumes, or `-` for stdin.
        volumes: PathBuf,
    },

    /// Rebalance the sample rate of an organization across its projects.
    Rebalance {
        /// Path to the project volumes, or `-` for stdin.
        volumes: PathBuf,

        /// The blended sample rate of the organization.
        #[arg(long)]
        sample_rate: f64,
    },

    /// Manage the configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration.
    Show,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Adjustment {
    id: ProjectId,
    total: f64,
    delta: f64,
}

/// Runs the command line application.
pub fn execute() -> Result<()> {
    let cli = Cli::parse();

    let config = setup::load_config(cli.config.as_deref())?;
    setup::init_logging(&config);
    setup::dump_spawn_infos(&config);

    match cli.command {
        Command::Rules { snapshot, now } => generate_rules(&config, snapshot, now),
        Command::Extrapolate { volume, hours } => extrapolate(&config, volume, hours),
        Command::Adjust { volumes } => adjust(&config, volumes),
        Command::Rebalance {
            volumes,
            sample_rate,
        } => rebalance(&config, volumes, sample_rate),
        Command::Config(ConfigCommand::Show) => show_config(&config),
    }
}

fn generate_rules(config: &Config, path: PathBuf, now: Option<DateTime<Utc>>) -> Result<()> {
    let snapshot: ProjectSnapshot = snapshot::read_json(&path)?;
    let project_id = snapshot.project.id;

    let rules = snapshot.generate_rules(config, now.unwrap_or_else(Utc::now))?;
    ds_log::info!(project_id = %project_id, "generated {} rules", rules.len());

    print_json(&rules)
}

fn extrapolate(config: &Config, volume: f64, hours: Option<f64>) -> Result<()> {
    let hours = hours.unwrap_or(config.sampling().sliding_window_hours as f64);
    let monthly_volume = ds_rebalancing::extrapolate_monthly_volume(volume, hours)?;

    writeln!(io::stdout(), "{monthly_volume}")?;
    Ok(())
}

fn adjust(config: &Config, path: PathBuf) -> Result<()> {
    let volumes = snapshot::read_volumes(&path)?;
    let model = AdjustedModel::new(volumes, config.sampling().fidelity_rate)
        .context("cannot adjust project volumes")?;

    let adjustments: Vec<_> = model
        .sorted_projects()
        .into_iter()
        .zip(model.adjust_sample_rates())
        .map(|(project, delta)| Adjustment {
            id: project.id,
            total: project.total,
            delta,
        })
        .collect();

    print_json(&adjustments)
}

fn rebalance(config: &Config, path: PathBuf, sample_rate: f64) -> Result<()> {
    let projects = snapshot::read_volumes(&path)?
        .into_iter()
        .map(|volume| RebalancedItem::new(volume.id, volume.total))
        .collect();

    let rebalanced = ProjectsRebalancingModel
        .run(ProjectsRebalancingInput {
            projects,
            sample_rate,
            intensity: config.sampling().rebalancing_intensity,
        })
        .context("cannot rebalance projects")?;

    print_json(&rebalanced)
}

fn show_config(config: &Config) -> Result<()> {
    let yaml = config.to_yaml_string()?;
    io::stdout().write_all(yaml.as_bytes())?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_rules() {
        let cli = Cli::parse_from([
            "ds",
            "--config",
            "/etc/ds",
            "rules",
            "snapshot.json",
            "--now",
            "2024-05-01T12:00:00Z",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("/etc/ds")));
        match cli.command {
            Command::Rules { snapshot, now } => {
                assert_eq!(snapshot, PathBuf::from("snapshot.json"));
                assert_eq!(now.unwrap().to_rfc3339(), "2024-05-01T12:00:00+00:00");
            }
            command => panic!("unexpected command {command:?}"),
        }
    }

    #[test]
    fn test_parse_extrapolate_default_window() {
        let cli = Cli::parse_from(["ds", "extrapolate", "100"]);
        assert!(matches!(
            cli.command,
            Command::Extrapolate {
                hours: None,
                ..
            }
        ));
    }
}
