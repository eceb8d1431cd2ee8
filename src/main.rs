//! # Replay every configured strategy over the race corpus
//! paddock-backtest backtest --config configuration/backtest.toml
//!
//! # Report win rates by price band for each session
//! paddock-backtest outcomes --config configuration/backtest.toml
//!
//! # Print each race's winner
//! paddock-backtest winners --config configuration/backtest.toml

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use paddock_backtest::{
    OutcomeAnalysis, PerformanceSummary, Race, RaceLoader, Settings, Simulator,
};

#[derive(Parser)]
#[command(name = "paddock-backtest")]
#[command(about = "Race prediction-market strategy backtester")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay every configured strategy over the race corpus
    Backtest {
        /// Path to the TOML settings file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Report win rates by price band for each session
    Outcomes {
        /// Path to the TOML settings file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Print each race's winner
    Winners {
        /// Path to the TOML settings file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Print practice prices for matching drivers, ordered by qualifying price
    PracticePrices {
        /// Path to the TOML settings file
        #[arg(short, long)]
        config: PathBuf,

        /// Space-separated driver name fragments to match
        #[arg(short, long)]
        drivers: String,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("paddock_backtest=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Backtest { config } => cmd_backtest(&config),
        Commands::Outcomes { config } => cmd_outcomes(&config),
        Commands::Winners { config } => cmd_winners(&config),
        Commands::PracticePrices { config, drivers } => cmd_practice_prices(&config, &drivers),
    }
}

/// Load the full race corpus described by the settings.
fn load_corpus(settings: &Settings) -> anyhow::Result<Vec<Race>> {
    let loader = RaceLoader::new(&settings.source, settings.loader.clone());
    let bar = ProgressBar::new(settings.races.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40} {pos}/{len} {msg}",
    )?);

    let mut races = Vec::with_capacity(settings.races.len());
    for schedule in &settings.races {
        bar.set_message(schedule.path.clone());
        let race = loader
            .load_race(&schedule.path, &schedule.boundaries())
            .with_context(|| format!("loading race {}", schedule.path))?;
        races.push(race);
        bar.inc(1);
    }
    bar.finish_and_clear();
    info!("loaded {} races", races.len());
    Ok(races)
}

fn cmd_backtest(config: &Path) -> anyhow::Result<()> {
    let settings = Settings::load(config)?;
    anyhow::ensure!(
        !settings.strategies.is_empty(),
        "no strategies configured; add [[strategies]] entries to {}",
        config.display()
    );

    let races = load_corpus(&settings)?;
    let simulator = Simulator::new(settings.simulation.clone());

    for strategy in &settings.strategies {
        let run = simulator.run(strategy, &races)?;
        let summary = PerformanceSummary::from_returns(&run.race_returns);
        println!("Backtest result for \"{}\":", run.strategy.label());
        for line in summary.summary().lines() {
            println!("\t{line}");
        }
        println!();
    }
    Ok(())
}

fn cmd_outcomes(config: &Path) -> anyhow::Result<()> {
    let settings = Settings::load(config)?;
    let races = load_corpus(&settings)?;
    let analysis = OutcomeAnalysis::collect(&races);
    println!("{}", analysis.summary());
    Ok(())
}

fn cmd_winners(config: &Path) -> anyhow::Result<()> {
    let settings = Settings::load(config)?;
    let races = load_corpus(&settings)?;
    for race in &races {
        let winner = race
            .winner()
            .with_context(|| format!("no winner recorded for race {}", race.name))?;
        println!("{}: {}", race.name, winner.name);
    }
    Ok(())
}

fn cmd_practice_prices(config: &Path, drivers: &str) -> anyhow::Result<()> {
    let fragments: Vec<&str> = drivers.split_whitespace().collect();
    anyhow::ensure!(!fragments.is_empty(), "no driver name fragments given");

    let settings = Settings::load(config)?;
    let races = load_corpus(&settings)?;
    for race in &races {
        println!("{}:", race.name);
        let mut field = race.drivers.clone();
        field.sort_by(|a, b| {
            b.qualifying_price
                .partial_cmp(&a.qualifying_price)
                .unwrap_or(Ordering::Equal)
        });
        for driver in &field {
            if fragments.iter().any(|f| driver.name.contains(f)) {
                println!("\t{}: {:.2}", driver.name, driver.practice_price);
            }
        }
    }
    Ok(())
}
