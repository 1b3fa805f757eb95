use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "flyzexbot")]
#[command(
    author,
    version,
    about = "Telegram bot for collecting and reviewing guild membership applications",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot and the dashboard server
    Run {
        /// Path to the settings file
        #[arg(short, long, default_value = "config/settings.yaml")]
        config: PathBuf,
    },

    /// Validate the settings file and exit
    CheckConfig {
        /// Path to the settings file
        #[arg(short, long, default_value = "config/settings.yaml")]
        config: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
