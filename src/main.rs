use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use cpfit::config::AppConfig;
use cpfit::depletion;
use cpfit::logging::{init_logging, LogConfig, LogLevel};
use cpfit::model::CpModel;
use cpfit::report::{self, DepletionTarget};

/// cpfit - Critical Power & W' estimation CLI
///
/// Fits the inverse-time model P = W'/t + CP to mean power outputs of timed
/// efforts and derives fractional W' depletion pacing targets.
#[derive(Parser)]
#[command(name = "cpfit")]
#[command(version = "0.1.0")]
#[command(about = "Critical Power & W' estimation from timed efforts", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit CP and W' from mean powers of the configured test protocol
    Fit {
        /// Mean power per effort, in watts, in protocol order
        #[arg(required = true, num_args = 2..)]
        powers: Vec<f64>,

        /// Effort durations in seconds (default: protocol from config)
        #[arg(short, long, value_delimiter = ',')]
        durations: Option<Vec<f64>>,

        /// Emit the fit result and targets as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute the constant power to deplete a W' fraction over a duration
    Pace {
        /// Critical Power in watts
        #[arg(long)]
        cp: f64,

        /// W' in joules
        #[arg(long)]
        wprime: f64,

        /// Fraction of W' to expend (0.70 = 70%)
        #[arg(short, long)]
        fraction: f64,

        /// Effort duration in seconds
        #[arg(short, long)]
        duration: f64,
    },

    /// Show or initialize the configuration file
    Config {
        /// Print the active configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file
        #[arg(short, long)]
        init: bool,
    },
}

/// JSON payload for `fit --json`
#[derive(Serialize)]
struct FitOutput {
    fit: cpfit::model::FitResult,
    wprime_kj: f64,
    targets: Vec<DepletionTarget>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: LogLevel::from_verbosity(cli.verbose),
        ..LogConfig::default()
    };
    if let Err(e) = init_logging(&log_config) {
        eprintln!("failed to initialize logging: {}", e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "✗ could not compute:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(AppConfig::default_path);

    match cli.command {
        Commands::Fit {
            powers,
            durations,
            json,
        } => {
            let config = AppConfig::load_or_default(&config_path)?;
            let durations = durations.unwrap_or_else(|| config.protocol.durations_s.clone());

            let result = CpModel::fit(&powers, &durations)?;

            let mut targets = Vec::new();
            for &fraction in &config.depletion.fractions {
                let power_w = depletion::power_for_fraction(
                    result.cp_w,
                    result.wprime_j,
                    fraction,
                    config.depletion.duration_s,
                )?;
                targets.push(DepletionTarget {
                    fraction,
                    duration_s: config.depletion.duration_s,
                    power_w,
                });
            }

            if json {
                let output = FitOutput {
                    wprime_kj: result.wprime_kj(),
                    fit: result,
                    targets,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", "Inverse-time model fit".green().bold());
                println!("{}", report::summary(&result, &targets));
                println!();
                println!("{}", report::residual_table(&result));
            }
        }

        Commands::Pace {
            cp,
            wprime,
            fraction,
            duration,
        } => {
            let power = depletion::power_for_fraction(cp, wprime, fraction, duration)?;
            println!(
                "Power for {:.0}% W' in {:.0} s: {}",
                fraction * 100.0,
                duration,
                format!("{:.1} W", power).cyan().bold()
            );
        }

        Commands::Config { show, init } => {
            if init {
                let config = AppConfig::default();
                config.save(&config_path)?;
                println!(
                    "{} {}",
                    "✓ wrote default config to".green(),
                    config_path.display()
                );
            }
            if show || !init {
                let config = AppConfig::load_or_default(&config_path)?;
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}
