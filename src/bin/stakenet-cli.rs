use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use stakenet_sdk::observer::BlockListener;
use stakenet_sdk::{ClientConfig, Provider};

#[derive(Parser)]
#[command(name = "stakenet-cli")]
#[command(about = "Query and observe a proof-of-stake node", long_about = None)]
struct Cli {
    /// Node API base URL.
    #[arg(short, long, default_value = "http://localhost:6876")]
    url: String,

    /// Optional TOML config file; overrides --url.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current block height
    Height,
    /// Print the node status report
    State,
    /// Print an account balance in NQT
    Balance { account_rs: String },
    /// Look a transaction up by full hash
    Tx { full_hash: String },
    /// Print block and health events until interrupted
    Watch,
}

struct PrintingListener;

impl BlockListener for PrintingListener {
    fn on_block(&self, height: u64, old_height: u64) {
        println!("new block: height {height} (previous {old_height})");
    }

    fn on_node_health_change(&self, healthy: bool) {
        println!("node health changed: {}", if healthy { "healthy" } else { "unhealthy" });
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stakenet_sdk=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::new(cli.url.clone()),
    };
    let provider = Provider::new(config)?;

    match cli.command {
        Commands::Height => {
            let height = provider.block_height().await?;
            println!("{}", serde_json::to_string_pretty(&json!({ "height": height }))?);
        }
        Commands::State => {
            let state = provider.node_state().await?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Commands::Balance { account_rs } => {
            let balance = provider.balance(&account_rs).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "account": account_rs,
                    "balanceNQT": balance,
                }))?
            );
        }
        Commands::Tx { full_hash } => {
            let tx = provider.transaction_by_full_hash(&full_hash).await?;
            println!("{}", serde_json::to_string_pretty(&tx)?);
        }
        Commands::Watch => {
            let listener: Arc<dyn BlockListener> = Arc::new(PrintingListener);
            provider.add_block_listener(Arc::clone(&listener));
            println!("watching for blocks, press Ctrl-C to stop");
            tokio::signal::ctrl_c().await?;
            provider.remove_block_listener(&listener);
        }
    }

    Ok(())
}
