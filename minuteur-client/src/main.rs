use clap::Parser;
use minuteur_client::{Cli, run};

#[tokio::main]
async fn main() -> Result<(), minuteur_client::AppError> {
    run(Cli::parse()).await
}
