//! Operator tool for Dropmint
//!
//! Computes commitments from wave files, issues mint challenges with the platform key and
//! drives the stored-project operations. Results are printed as JSON on stdout.

use alloy_primitives::Address;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use dropmint_core::{
    get_sale_config_proof, get_sale_config_root, get_whitelist_proof, parse_address,
    SaleWaveConfig, SignerConfig, WhitelistTree,
};
use dropmint_service::{
    ChainReader, MintOrchestrator, SaleWaveService, SqliteWaveStore, WaveRepository,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "dropmint")]
#[command(about = "Sale-config commitments and mint authorization", long_about = None)]
struct Cli {
    /// SQLite database for stored projects
    #[arg(long, global = true, env = "DROPMINT_DB_PATH", default_value = "dropmint.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sale-config root of a waves file
    Root {
        /// JSON array of sale waves
        waves: PathBuf,
    },

    /// Sale-config proof of one wave in a waves file
    Proof {
        /// JSON array of sale waves
        waves: PathBuf,

        /// Wave identifier
        identifier: String,
    },

    /// Whitelist proof of a wallet in one wave of a waves file
    WhitelistProof {
        /// JSON array of sale waves
        waves: PathBuf,

        /// Wave identifier
        identifier: String,

        /// Wallet address
        #[arg(value_parser = parse_wallet)]
        wallet: Address,
    },

    /// Sign random challenges for pre-signing flows
    Challenge {
        /// Number of challenges
        #[arg(short, long, default_value = "1")]
        count: usize,
    },

    /// Sign a challenge bound to a wallet and mint count
    BoundChallenge {
        /// Wallet address
        #[arg(value_parser = parse_wallet)]
        wallet: Address,

        /// Units to mint
        count: u64,
    },

    /// Replace a project's stored waves and print the root to publish
    SaveWaves {
        /// Project id
        project: String,

        /// JSON array of sale waves
        waves: PathBuf,
    },

    /// Prepare a mint bundle from a project's stored waves
    PrepareMint {
        /// Project id
        project: String,

        /// Wallet address
        #[arg(value_parser = parse_wallet)]
        wallet: Address,

        /// Units to mint
        count: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Root { waves } => {
            let waves = read_waves(&waves)?;
            let root = get_sale_config_root(&waves)?;
            json!({ "root": root, "waves": waves.len() })
        }
        Commands::Proof { waves, identifier } => {
            let waves = read_waves(&waves)?;
            let root = get_sale_config_root(&waves)?;
            let proof = get_sale_config_proof(&waves, &identifier)?;
            json!({ "identifier": identifier, "root": root, "proof": proof })
        }
        Commands::WhitelistProof {
            waves,
            identifier,
            wallet,
        } => {
            let waves = read_waves(&waves)?;
            let wave = waves
                .iter()
                .find(|w| w.identifier == identifier)
                .ok_or_else(|| anyhow!("No wave {} in file", identifier))?;
            wave.ensure_unique_whitelist()?;

            let entry = wave.whitelist_entry(&wallet);
            let proof = get_whitelist_proof(wave.sale_type, &wave.whitelist, &entry);
            json!({
                "wallet": wallet,
                "limit": entry.limit,
                "root": WhitelistTree::build(&wave.whitelist).root(),
                "proof": proof,
            })
        }
        Commands::Challenge { count } => {
            let authorizer = SignerConfig::from_env()?.into_authorizer()?;
            let challenges = authorizer.issue_batch(count)?;
            json!({ "signer": authorizer.signer_address(), "challenges": challenges })
        }
        Commands::BoundChallenge { wallet, count } => {
            let authorizer = SignerConfig::from_env()?.into_authorizer()?;
            let challenge = authorizer.issue_bound_challenge(wallet, count)?;
            json!({
                "signer": authorizer.signer_address(),
                "wallet": wallet,
                "count": count,
                "message": challenge.message,
                "signature": challenge.signature,
            })
        }
        Commands::SaveWaves { project, waves } => {
            let waves = read_waves(&waves)?;
            let store: Arc<dyn WaveRepository> = Arc::new(open_store(&cli.db)?);
            let root = SaleWaveService::new(store)
                .save_sale_waves(&project, &waves)
                .await?;
            info!("Saved {} waves for {}", waves.len(), project);
            json!({ "project": project, "root": root })
        }
        Commands::PrepareMint {
            project,
            wallet,
            count,
        } => {
            let authorizer = SignerConfig::from_env()?.into_authorizer()?;
            let orchestrator = MintOrchestrator::new(
                Arc::new(open_store(&cli.db)?),
                Arc::new(OfflineChainReader),
                authorizer,
            );
            let bundle = orchestrator.prepare_mint(&project, wallet, count).await?;
            serde_json::to_value(bundle)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn parse_wallet(value: &str) -> Result<Address, String> {
    parse_address(value).map_err(|e| e.to_string())
}

fn read_waves(path: &Path) -> anyhow::Result<Vec<SaleWaveConfig>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let waves: Vec<SaleWaveConfig> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse waves in {}", path.display()))?;
    for wave in &waves {
        wave.validate()?;
    }
    Ok(waves)
}

fn open_store(path: &Path) -> anyhow::Result<SqliteWaveStore> {
    SqliteWaveStore::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

/// Chain reader for commands that never consult the chain
struct OfflineChainReader;

#[async_trait]
impl ChainReader for OfflineChainReader {
    async fn received_count(&self, _gating: &Address, _wallet: &Address) -> dropmint_service::Result<u64> {
        Err(offline())
    }

    async fn minted_count(&self, _wallet: &Address, _sale_identifier: &str) -> dropmint_service::Result<u64> {
        Err(offline())
    }

    async fn is_single_unit_collection(&self, _gating: &Address) -> dropmint_service::Result<bool> {
        Err(offline())
    }
}

fn offline() -> dropmint_service::Error {
    dropmint_service::Error::Provider("No chain reader is configured for this tool".to_string())
}
