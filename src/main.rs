//! escrow-sync
//!
//! Command-line presentation boundary over the synchronization layer.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!                 │                 escrow-sync                   │
//!                 │                                               │
//!   CLI command   │  ┌─────────┐   ┌───────────┐   ┌──────────┐ │
//!   ──────────────┼─▶│ session │──▶│ transfers │──▶│ indexer  │─┼──▶ indexing
//!                 │  │identity │   │ portfolio │   │ (JSON-RPC)│ │    gateway
//!                 │  └─────────┘   └───────────┘   └──────────┘ │
//!                 │                                               │
//!                 │  ┌────────────┐   ┌──────────┐               │
//!                 │  │ governance │──▶│  chain   │───────────────┼──▶ ledger RPC
//!                 │  │   escrow   │   │ provider │               │
//!                 │  └────────────┘   └──────────┘               │
//!                 └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Bytes;
use clap::{Parser, Subcommand};

use escrow_sync::chain::{ChainContext, TxSigner};
use escrow_sync::config::{loader::load_config, SyncConfig};
use escrow_sync::escrow::{ChainEscrow, EscrowLifecycleManager, EscrowState};
use escrow_sync::governance::{ChainGovernance, GovernanceAdapter};
use escrow_sync::indexer::LedgerClient;
use escrow_sync::portfolio::BalanceResolver;
use escrow_sync::session::{Session, WalletAddress};
use escrow_sync::transfers::TransferAggregator;
use escrow_sync::{SyncError, SyncResult};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "escrow-sync", about = "Ledger synchronization client")]
struct Cli {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session wallet address; falls back to ESCROW_SYNC_WALLET.
    #[arg(long, global = true)]
    wallet: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the session wallet's holdings, native entry last.
    Holdings,
    /// Merged transfer history for the session wallet.
    Transfers {
        /// Narrow to one token contract.
        #[arg(long, conflicts_with = "native")]
        token: Option<String>,
        /// Native-asset transfers only.
        #[arg(long)]
        native: bool,
    },
    /// NFTs owned by the session wallet.
    Nfts,
    /// Deploy an escrow and drive its lifecycle.
    Deploy {
        #[arg(long)]
        arbiter: String,
        #[arg(long)]
        beneficiary: String,
        /// File holding the escrow creation bytecode as 0x-prefixed hex.
        #[arg(long)]
        bytecode: PathBuf,
        /// Submit the approval after deployment and wait for the reset.
        #[arg(long)]
        approve: bool,
    },
    /// Voting power and delegation status on a governance token.
    VotingPower {
        #[arg(long)]
        token: String,
    },
    /// Delegate the session wallet's voting power.
    Delegate {
        #[arg(long)]
        token: String,
        #[arg(long)]
        to: String,
    },
    /// Transfer governance tokens.
    SendTokens {
        #[arg(long)]
        token: String,
        #[arg(long)]
        to: String,
        /// Human-readable amount, e.g. "1.5".
        #[arg(long)]
        amount: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "escrow_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> SyncResult<()> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SyncConfig::default(),
    };

    let session = Session::try_from_address(cli.wallet.as_deref())
        .or_else(|_| Session::from_env());

    match cli.command {
        Command::Holdings => {
            let session = session?;
            let client = LedgerClient::new(&config.gateway)?;
            let resolver = BalanceResolver::new(Arc::new(client));
            let holdings = resolver.get_holdings(session.wallet()).await?;
            print_json(&holdings)
        }
        Command::Transfers { token, native } => {
            let session = session?;
            let client = LedgerClient::new(&config.gateway)?;
            let aggregator = TransferAggregator::new(client);
            let transfers = if native {
                aggregator.get_native_transfers(session.wallet()).await?
            } else {
                let filter = token.map(WalletAddress::new).transpose()?;
                aggregator
                    .get_transfers(session.wallet(), filter.as_ref())
                    .await?
            };
            print_json(&transfers)
        }
        Command::Nfts => {
            let session = session?;
            let client = LedgerClient::new(&config.gateway)?;
            let nfts = client.get_nfts(session.wallet()).await?;
            print_json(&nfts)
        }
        Command::Deploy {
            arbiter,
            beneficiary,
            bytecode,
            approve,
        } => {
            let context = Arc::new(ChainContext::new(config.chain.clone()));
            let signer = TxSigner::from_env()?;
            let raw = std::fs::read_to_string(&bytecode).map_err(|e| {
                SyncError::Config(format!("failed to read {}: {}", bytecode.display(), e))
            })?;
            let init_code: Bytes = raw.trim().parse().map_err(|e| {
                SyncError::Config(format!("invalid bytecode in {}: {}", bytecode.display(), e))
            })?;

            let escrow = Arc::new(ChainEscrow::new(context, signer, init_code));
            let manager =
                EscrowLifecycleManager::new(escrow.clone(), escrow, &config.escrow)?;
            let instance = manager
                .deploy(&WalletAddress::new(arbiter)?, &WalletAddress::new(beneficiary)?)
                .await?;
            print_json(&instance)?;

            if approve {
                manager.approve().await?;
                tracing::info!("Approval submitted, waiting for the lifecycle to settle");
                while manager.current_state() != EscrowState::Reset {
                    if !manager.is_watching() {
                        tracing::warn!(
                            state = %manager.current_state(),
                            "Approval watch is not running; the escrow will not advance on its own"
                        );
                        break;
                    }
                    tokio::time::sleep(Duration::from_millis(250)).await;
                }
                tracing::info!(state = %manager.current_state(), "Escrow lifecycle settled");
            }
            Ok(())
        }
        Command::VotingPower { token } => {
            let session = session?;
            let context = Arc::new(ChainContext::new(config.chain.clone()));
            let adapter =
                GovernanceAdapter::new(Arc::new(ChainGovernance::new(context, None)));
            let power = adapter
                .get_voting_power(&WalletAddress::new(token)?, Some(&session))
                .await?;
            print_json(&power)
        }
        Command::Delegate { token, to } => {
            let context = Arc::new(ChainContext::new(config.chain.clone()));
            let signer = TxSigner::from_env()?;
            let adapter =
                GovernanceAdapter::new(Arc::new(ChainGovernance::new(context, Some(signer))));
            adapter
                .delegate_votes(&WalletAddress::new(token)?, &WalletAddress::new(to)?)
                .await?;
            tracing::info!("Delegation confirmed");
            Ok(())
        }
        Command::SendTokens { token, to, amount } => {
            let context = Arc::new(ChainContext::new(config.chain.clone()));
            let signer = TxSigner::from_env()?;
            let adapter =
                GovernanceAdapter::new(Arc::new(ChainGovernance::new(context, Some(signer))));
            adapter
                .send_tokens(
                    &WalletAddress::new(token)?,
                    &WalletAddress::new(to)?,
                    &amount,
                )
                .await?;
            tracing::info!("Transfer confirmed");
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> SyncResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| SyncError::Config(format!("failed to render output: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}
