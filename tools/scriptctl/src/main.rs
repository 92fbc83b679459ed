//! scriptctl - Inspect and evaluate VoltageEMS channel scripts
//!
//! Loads a script configuration (YAML, TOML or JSON) and lists, renders or
//! evaluates the scripts against accumulator snapshots stored as JSON.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scriptctl")]
#[command(about = "Inspect and evaluate VoltageEMS channel scripts")]
#[command(long_about = "Inspect and evaluate VoltageEMS channel scripts

Examples:
  scriptctl -c scripts.yaml list --sort
  scriptctl -c scripts.yaml render
  scriptctl -c scripts.yaml eval --old old.json --new new.json --hours 0.25
  scriptctl -c scripts.yaml eval --new new.json --hours 1 --units kWh --name Main")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Script configuration file (.yaml, .yml, .toml or .json)
    #[arg(short = 'c', long = "config", global = true, default_value = "config/scripts.yaml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List scripts with their units and precision
    List {
        /// Order by name instead of configuration order
        #[arg(short, long)]
        sort: bool,
    },

    /// Print the decompiled form of every script
    Render,

    /// Evaluate scripts over an interval
    Eval {
        /// Snapshot at the start of the interval (omit for a zero baseline)
        #[arg(long)]
        old: Option<PathBuf>,

        /// Snapshot at the end of the interval
        #[arg(long)]
        new: PathBuf,

        /// Length of the interval in hours
        #[arg(long, default_value_t = 1.0)]
        hours: f64,

        /// Evaluate in these units instead of each script's own
        #[arg(short, long)]
        units: Option<String>,

        /// Only evaluate the script with this name
        #[arg(short, long)]
        name: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose);

    let loaded = commands::Loaded::from_file(&cli.config)?;

    match cli.command {
        Commands::List { sort } => commands::list(loaded, sort),
        Commands::Render => commands::render(&loaded),
        Commands::Eval {
            old,
            new,
            hours,
            units,
            name,
            json,
        } => commands::eval(
            &loaded,
            &commands::EvalArgs {
                old,
                new,
                hours,
                units,
                name,
                json,
            },
        ),
    }
}
