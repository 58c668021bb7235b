//! Toonify CLI - cartoonize photos with an on-device generator.
//!
//! # Usage
//!
//! ```bash
//! # Cartoonize a single photo
//! toonify process photo.jpg
//!
//! # Cartoonize a directory into ./cartoons
//! toonify process ./photos/ --output ./cartoons
//!
//! # Check the generator model
//! toonify models status
//!
//! # View configuration
//! toonify config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Toonify - cartoonize photos with an on-device CartoonGAN generator.
#[derive(Parser, Debug)]
#[command(name = "toonify")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Cartoonize photos
    Process(cli::process::ProcessArgs),

    /// Inspect the generator model
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go to eprintln.
    let config = match toonify_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `toonify config path`."
            );
            toonify_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Toonify v{}", toonify_core::VERSION);

    match cli.command {
        Commands::Process(args) => cli::process::execute(args, config).await,
        Commands::Models(args) => cli::models::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
