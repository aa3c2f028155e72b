//! Tutum Lending Client - Operator Entry Point
//!
//! Headless front end over the library: shows the lending position and
//! drives approve/deposit/withdraw for the configured signer.
//!
//! Wiring sequence:
//! 1. Parse CLI, load config.toml + validate
//! 2. Init tracing (human or JSON, EnvFilter)
//! 3. Open the wallet session (signer + provider pinned to the chain)
//! 4. Validate contract code at the configured addresses
//! 5. Build token/pool adapters, receipt watcher, dashboard, orchestrator
//! 6. Initial full refresh
//! 7. Run the requested command (`watch` polls until SIGINT)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{info, warn};

use tutum_lending_client::adapters::chain::{
    ContractValidator, Erc20Token, LendingPool, ReceiptWatcher, WalletSession,
};
use tutum_lending_client::config::{self, AppConfig};
use tutum_lending_client::domain::ActionSlot;
use tutum_lending_client::ports::TxConfirmer;
use tutum_lending_client::usecases::{
    ActionOutcome, ConfirmationWaiter, LendingDashboard, PollingRefresher, StatusView,
    TransactionOrchestrator,
};

type Dashboard = LendingDashboard<Erc20Token, LendingPool>;
type Orchestrator = TransactionOrchestrator<Erc20Token, LendingPool>;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[clap(short, long, default_value = "config.toml", env = "TUTUM_CONFIG")]
    config: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print balance, allowance, deposit, rewards and lock status
    Status {
        /// Emit JSON instead of text
        #[clap(long)]
        json: bool,
    },

    /// Keep refreshing the lock status and log every change
    Watch,

    /// Approve the lending pool to spend exactly AMOUNT tokens
    Approve { amount: String },

    /// Deposit AMOUNT tokens (approving first when the policy allows)
    Deposit { amount: String },

    /// Withdraw AMOUNT tokens of deposited principal
    Withdraw { amount: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── 1. Load configuration ───────────────────────────────
    let config = config::loader::load_config(&cli.config)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured logging ────────────────────
    init_tracing(&config);

    info!(
        name = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        chain_id = config.chain.chain_id,
        "Starting Tutum lending client"
    );

    // ── 3. Wallet session ───────────────────────────────────
    let session = Arc::new(
        WalletSession::connect(&config.chain, &config.wallet)
            .await
            .context("Failed to connect wallet session")?,
    );
    if !session.is_healthy().await {
        warn!("RPC endpoint did not answer eth_blockNumber");
    }

    // ── 4. Contract validation ──────────────────────────────
    let lending_address = config.contracts.lending_address()?;
    let token_address = config.contracts.token_address()?;
    ContractValidator::new(session.provider().clone())
        .validate_all(lending_address, token_address)
        .await
        .context("Contract validation failed")?;

    // ── 5. Adapters and use cases ───────────────────────────
    let token = Arc::new(Erc20Token::new(Arc::clone(&session), token_address));
    let pool = Arc::new(LendingPool::new(
        Arc::clone(&session),
        lending_address,
        config.chain.write_gas_limit,
    ));
    let confirmation_timeout = Duration::from_secs(config.chain.confirmation_timeout_secs);
    let watcher: Arc<dyn TxConfirmer> = Arc::new(ReceiptWatcher::new(
        Arc::clone(&session),
        Duration::from_millis(config.chain.receipt_poll_interval_ms),
        confirmation_timeout,
    ));

    let dashboard = Arc::new(LendingDashboard::new(token, pool, session.account()));
    let orchestrator = TransactionOrchestrator::new(
        Arc::clone(&dashboard),
        ConfirmationWaiter::new(watcher, confirmation_timeout),
        config.orchestrator.approval_policy,
    );

    // ── 6. Initial read ─────────────────────────────────────
    let report = dashboard.refresh_all().await;
    if !report.is_complete() {
        warn!(failed = report.failures.len(), "Initial refresh incomplete");
    }

    // ── 7. Command ──────────────────────────────────────────
    match cli.command {
        Command::Status { json } => print_status(&dashboard, &config, json)?,
        Command::Watch => watch(&dashboard, &config).await?,
        Command::Approve { amount } => {
            let outcome = orchestrator.approve_for_deposit(&amount).await?;
            report_outcome(&orchestrator, ActionSlot::Deposit, &outcome);
        }
        Command::Deposit { amount } => {
            let outcome = orchestrator.deposit(&amount).await?;
            report_outcome(&orchestrator, ActionSlot::Deposit, &outcome);
            print_status(&dashboard, &config, false)?;
        }
        Command::Withdraw { amount } => {
            let outcome = orchestrator.withdraw(&amount).await?;
            report_outcome(&orchestrator, ActionSlot::Withdraw, &outcome);
            print_status(&dashboard, &config, false)?;
        }
    }

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.app.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.app.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_status(dashboard: &Dashboard, config: &AppConfig, json: bool) -> Result<()> {
    let view = StatusView::from_snapshot(&dashboard.snapshot(), &config.display);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&view).context("Failed to serialize status")?
        );
    } else {
        for line in view.lines() {
            println!("{line}");
        }
    }
    Ok(())
}

fn report_outcome(orchestrator: &Orchestrator, slot: ActionSlot, outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::Confirmed { transactions } => {
            for tx in transactions {
                println!("{} {} confirmed: {}", tx.kind, tx.amount, tx.tx_hash);
            }
        }
        ActionOutcome::Cancelled { confirmed } => {
            for tx in confirmed {
                println!("{} {} confirmed: {}", tx.kind, tx.amount, tx.tx_hash);
            }
            println!("Cancelled: signing declined");
        }
    }
    orchestrator.dismiss(slot);
}

/// Poll until SIGINT, logging the lock countdown and banner changes.
async fn watch(dashboard: &Arc<Dashboard>, config: &AppConfig) -> Result<()> {
    let poller = PollingRefresher::new(
        Arc::clone(dashboard),
        Duration::from_secs(config.polling.lock_status_interval_secs),
        config.polling.include_balances,
    );
    let mut updates = dashboard.subscribe();
    poller.start();

    loop {
        tokio::select! {
            biased;
            _ = signal::ctrl_c() => {
                info!("SIGINT received, stopping");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = StatusView::from_snapshot(&updates.borrow_and_update(), &config.display);
                info!(
                    lock = %view.lock_remaining,
                    deposited = %view.deposited,
                    rewards = %view.pending_rewards,
                    withdraw_enabled = view.withdraw_enabled,
                    banner = ?view.banner,
                    "Dashboard updated"
                );
            }
        }
    }

    poller.stop();
    Ok(())
}
