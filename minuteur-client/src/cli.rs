use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::controller::{DEFAULT_MINUTES, DEFAULT_SECONDS};

const HELP_EPILOG: &str = r#"Config resolution order:
  1) --config/-c PATH
  2) $MINUTEUR_CONFIG
  3) XDG default: ~/.config/minuteur/client.yaml

Without a subcommand, follows the countdown in the terminal.
"#;

#[derive(Debug, Parser)]
#[command(
    name = "minuteur",
    version,
    about = "Terminal client for the Minuteur countdown daemon",
    long_about = None,
    after_long_help = HELP_EPILOG,
)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Optional subcommand. Without one, watches the countdown.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a countdown. A start while one is running supersedes it,
    /// whichever client issued it.
    Start {
        #[arg(long, default_value_t = DEFAULT_MINUTES)]
        minutes: u32,
        #[arg(long, default_value_t = DEFAULT_SECONDS)]
        seconds: u32,
    },
    /// Stop the running countdown
    Stop,
    /// Stop if running and restore the default duration (0 min 10 s)
    Reset,
    /// Follow the countdown live in the terminal (default)
    Watch,
    /// Show notification consent status, or run the consent prompt
    Permission {
        /// Ask for consent (also re-asks after a denial)
        #[arg(long)]
        request: bool,
    },
    /// Show a test notification
    TestNotify,
}
