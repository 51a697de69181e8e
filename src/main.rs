//! Sigvault CLI Application
//!
//! Runs the multisig coordination service and ships small helpers for
//! key generation and out-of-band request signing.

use clap::{Parser, Subcommand};
use sigvault::api::{create_router, ApiState};
use sigvault::config::Config;
use sigvault::crypto::KeyPair;
use sigvault::multisig::MultisigCoordinator;
use sigvault::node::NodeClient;
use sigvault::storage::{JsonStore, JsonStoreConfig};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sigvault")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Multisig transaction coordination service", long_about = None)]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the coordination service
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Chain node URL (overrides the config file)
        #[arg(long)]
        node_url: Option<String>,

        /// Data directory for the transaction store (overrides the config file)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Generate a new key pair
    Keygen {
        /// Network id used for the address prefix
        #[arg(long, default_value = "1")]
        network_id: u32,
    },

    /// Sign a payload for an out-of-band request
    Sign {
        /// Hex-encoded private key
        #[arg(short, long)]
        key: String,

        /// Payload to sign
        #[arg(short, long)]
        payload: String,

        /// Treat the payload as hex bytes instead of a UTF-8 string
        #[arg(long)]
        hex: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            node_url,
            data_dir,
        } => {
            let mut config = Config::load_or_default(cli.config.as_deref())?;
            if let Some(port) = port {
                config.listen_address = format!("0.0.0.0:{}", port);
            }
            if let Some(node_url) = node_url {
                config.node_url = node_url;
            }
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir;
            }
            run_server(config)
        }

        Commands::Keygen { network_id } => {
            let key_pair = KeyPair::generate();
            println!("🔑 New key pair:");
            println!("   Private key: {}", key_pair.private_key_hex());
            println!("   Public key:  {}", key_pair.public_key_hex());
            println!("   Address:     {}", key_pair.address(network_id));
            Ok(())
        }

        Commands::Sign { key, payload, hex } => {
            let key_pair = KeyPair::from_private_key_hex(&key)?;
            let payload_bytes = if hex {
                ::hex::decode(sigvault::crypto::strip_hex_prefix(&payload))?
            } else {
                payload.into_bytes()
            };
            let signature = key_pair.sign_recoverable(&payload_bytes)?;
            println!("{}", signature);
            Ok(())
        }
    }
}

fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let store = Arc::new(JsonStore::new(JsonStoreConfig {
            data_dir: config.data_dir.clone(),
            ..Default::default()
        })?);
        let node = Arc::new(NodeClient::new(&config.node_url));

        let coordinator = Arc::new(MultisigCoordinator::new(
            config.network_id,
            config.tx_expiration_days,
            store,
            node.clone(),
            node,
        ));

        let app = create_router(ApiState { coordinator });

        println!(
            "🚀 Sigvault starting on http://{} (node: {})",
            config.listen_address, config.node_url
        );
        println!();
        println!("📖 Available endpoints:");
        println!("   GET  /health               - Health check");
        println!("   POST /v1/multisig          - Create a multisig transaction");
        println!("   GET  /v1/multisig/{{alias}}  - List pending transactions");
        println!("   PUT  /v1/multisig/{{id}}     - Add an owner's signature");
        println!("   POST /v1/multisig/issue    - Issue a fully-signed transaction");
        println!("   POST /v1/multisig/cancel   - Cancel a pending transaction");
        println!();

        // Handle Ctrl+C
        tokio::spawn(async {
            tokio::signal::ctrl_c().await.ok();
            println!("\n📴 Shutting down...");
            std::process::exit(0);
        });

        let listener = tokio::net::TcpListener::bind(&config.listen_address).await?;
        axum::serve(listener, app).await?;

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
