use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::{Parser, Subcommand};
use drs_core::{ReviewSettings, Spin, Vector3};

use crate::commands::{review::review_files, simulate::simulate_launch};

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Review one or more recorded deliveries (JSON files with per-frame detections).
    #[clap(name = "review")]
    Review {
        /// Delivery files to review. Each file is reviewed independently.
        #[clap(required = true)]
        files: Vec<PathBuf>,

        /// Directory to write one JSON report per delivery into.
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Predict the flight of a ball from a given launch state.
    #[clap(name = "simulate")]
    Simulate {
        /// Launch position as x,y,z in meters.
        #[clap(long, value_parser = parse_vector, allow_hyphen_values = true)]
        position: Vector3,

        /// Launch velocity as x,y,z in m/s.
        #[clap(long, value_parser = parse_vector, allow_hyphen_values = true)]
        velocity: Vector3,

        /// Spin axis as x,y,z. Uses the nominal spin when omitted.
        #[clap(long, value_parser = parse_vector, allow_hyphen_values = true)]
        spin_axis: Option<Vector3>,

        /// Spin rate in rad/s.
        #[clap(long, allow_hyphen_values = true)]
        spin_rate: Option<f64>,

        /// Depth of the stump plane in meters.
        #[clap(long, allow_hyphen_values = true)]
        plane_depth: f64,
    },

    /// Write the settings file, filling in defaults for missing values.
    #[clap(name = "init-settings")]
    InitSettings,
}

#[derive(Debug, Parser)]
#[command(name = "drs-cli")]
pub struct Cli {
    #[clap(subcommand)]
    command: Command,

    #[clap(long, short = 'f', default_value = "drs-settings.json")]
    pub settings_file: PathBuf,

    #[clap(long, default_value = "info")]
    pub log_level: String,

    #[clap(long, default_value = "auto")]
    pub log_file: String,
}

impl Cli {
    pub async fn start(self) -> ExitCode {
        let settings = match self.settings() {
            Ok(settings) => settings,
            Err(err) => {
                eprintln!("Invalid settings in {}: {:#}", self.settings_file.display(), err);
                return ExitCode::FAILURE;
            }
        };

        match self.command {
            Command::Review { files, output } => {
                match review_files(files, settings, output).await {
                    Ok(_) => ExitCode::SUCCESS,
                    Err(err) => {
                        eprintln!("Error reviewing deliveries: {:#}", err);
                        ExitCode::FAILURE
                    }
                }
            }
            Command::Simulate {
                position,
                velocity,
                spin_axis,
                spin_rate,
                plane_depth,
            } => {
                let nominal = Spin::nominal();
                let spin = Spin::new(
                    spin_axis.unwrap_or(nominal.axis),
                    spin_rate.unwrap_or(nominal.rate),
                );
                match simulate_launch(position, velocity, spin, plane_depth, &settings) {
                    Ok(_) => ExitCode::SUCCESS,
                    Err(err) => {
                        eprintln!("Error simulating trajectory: {:#}", err);
                        ExitCode::FAILURE
                    }
                }
            }
            Command::InitSettings => match settings.store(&self.settings_file).await {
                Ok(_) => {
                    println!("Settings written to {}", self.settings_file.display());
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("Error writing settings: {:#}", err);
                    ExitCode::FAILURE
                }
            },
        }
    }

    fn settings(&self) -> Result<ReviewSettings> {
        let settings = ReviewSettings::load_or_insert(&self.settings_file)?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Parse a vector given as `x,y,z`.
fn parse_vector(s: &str) -> Result<Vector3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("invalid number in '{}': {}", s, err))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(format!("expected three comma-separated values, got '{}'", s)),
    }
}
