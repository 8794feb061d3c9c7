use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrollreel_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "scrollreel")]
#[command(author, version, about = "Headless landing page preloader and scroll choreography")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved preloader timeline
    Preloader {
        /// Seed for the progress bar increments
        #[arg(long)]
        seed: Option<u64>,
        /// Print the schedule as JSON
        #[arg(long)]
        json: bool,
    },
    /// Simulate a scroll session frame by frame
    Scroll {
        /// Scroll destination in viewport heights
        #[arg(long, default_value_t = 4.0)]
        to: f64,
        /// Wheel delta per frame in px
        #[arg(long, default_value_t = 120.0)]
        step: f64,
        /// Seed for the progress bar increments
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run the page in real time
    Play {
        /// How long to run, in seconds
        #[arg(long, default_value_t = commands::play::DEFAULT_SECONDS)]
        seconds: f64,
        /// Wheel delta per frame once the preloader finished, in px
        #[arg(long, default_value_t = commands::play::DEFAULT_WHEEL)]
        wheel: f64,
    },
    /// Show the effective configuration
    Config {
        /// Write it to the configuration file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Preloader { seed, json }) => commands::preloader::run(config, seed, json),
        Some(Commands::Scroll { to, step, seed }) => commands::scroll::run(config, to, step, seed),
        Some(Commands::Play { seconds, wheel }) => {
            commands::play::run(config, seconds, wheel).await
        }
        Some(Commands::Config { save }) => commands::config::run(&config, save),
        None => {
            commands::play::run(config, commands::play::DEFAULT_SECONDS, commands::play::DEFAULT_WHEEL)
                .await
        }
    }
}
