use clap::Parser;
use std::path::PathBuf;

const HELP_EPILOG: &str = r#"Server options can also be provided via environment variables:
  CONFIG_PATH (default: ./config.yaml; a missing default file falls back
               to built-in defaults)
  PORT        (default: 5161 or config.listen_port)
"#;

#[derive(Debug, Parser)]
#[command(
    name = "minuteur-server",
    version,
    about = "Minuteur countdown daemon",
    long_about = None,
    after_long_help = HELP_EPILOG,
)]
pub struct Cli {
    /// Path to YAML config file (takes precedence over CONFIG_PATH)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
