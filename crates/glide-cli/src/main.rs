use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glide_core::GlideConfig;

mod commands;

#[derive(Parser)]
#[command(name = "glide")]
#[command(author, version, about = "Headless driver for the glide smooth-scroll engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ~/.config/glide/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an input script against a page and print every scroll event
    Simulate {
        /// Page layout (TOML)
        #[arg(short = 'p', long)]
        page: PathBuf,
        /// Input script (TOML, a list of [[step]] tables)
        #[arg(short = 's', long)]
        script: PathBuf,
        /// Start in Native mode regardless of configuration
        #[arg(long)]
        native: bool,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the active configuration)
        path: Option<PathBuf>,
    },
    /// Write the default configuration to ~/.config/glide/config.toml
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => GlideConfig::load_from(path)?,
        None => GlideConfig::load()?,
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Simulate {
            page,
            script,
            native,
        } => commands::simulate::run(config, &page, &script, native),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Validate { path } => {
                commands::config::validate(path.or(cli.config).as_deref())
            }
            ConfigAction::Init => commands::config::init(),
        },
    }
}
