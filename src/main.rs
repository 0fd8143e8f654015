// Proof-of-work ledger node - CLI

use clap::Parser;
use coin_ledger::{Cli, cli};

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = cli::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
