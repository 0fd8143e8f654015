// CLI commands

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::api;
use crate::config::Config;
use crate::consensus::Miner;
use crate::error::Result;
use crate::network::Node;

#[derive(Parser)]
#[command(name = "coin-ledger")]
#[command(about = "Single-node proof-of-work ledger", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a ledger node over HTTP
    Serve {
        /// Path to a TOML config file (defaults to ./config.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address to listen on, overriding the config file
        #[arg(short, long)]
        listen: Option<SocketAddr>,

        /// Peer to register at startup (repeatable)
        #[arg(short, long = "peer")]
        peers: Vec<String>,
    },

    /// Find the proof that follows LAST_PROOF
    Proof {
        /// Proof of the block being built upon
        last_proof: u64,
    },
}

/// Run a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            config,
            listen,
            peers,
        } => serve(config, listen, peers).await,
        Commands::Proof { last_proof } => {
            proof(last_proof);
            Ok(())
        }
    }
}

async fn serve(config_path: Option<PathBuf>, listen: Option<SocketAddr>, peers: Vec<String>) -> Result<()> {
    let mut config = Config::load(config_path.as_deref())?;
    if let Some(listen) = listen {
        config.node.listen = listen;
    }
    config.network.peers.extend(peers);

    let node = Node::from_config(&config).await?;
    log::info!("Node identifier: {}", node.identifier());
    log::info!("Registered {} peers", node.nodes().await.len());

    api::serve(node, config.node.listen).await
}

fn proof(last_proof: u64) {
    println!("Searching for the proof after {}...\n", last_proof);

    let result = Miner::new().mine(last_proof);

    if result.success {
        println!("✓ Proof found\n");
        println!("Proof: {}", result.proof);
        println!("Digest: {}", result.digest);
        println!("Attempts: {}", result.attempts);
        println!("Duration: {:?}", result.duration);
        println!("Hash rate: {:.2} H/s", result.hash_rate());
    } else {
        println!("✗ Search exhausted without a proof");
    }
}
