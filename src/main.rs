//! Algorand wallet CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   algo-wallet <command>
//!        │
//!        ▼
//!   ┌──────────┐   ┌────────────────────────────────────────────────┐
//!   │  config  │──▶│               PaymentProcessor                  │
//!   └──────────┘   │  builder ─▶ submitter ─▶ monitor                │
//!                  └──────┬───────────┬───────────┬──────────────────┘
//!   ┌──────────┐          │           │           │
//!   │  wallet  │── sign ──┘           ▼           ▼
//!   └──────────┘                ┌────────────────────┐   ┌─────────┐
//!                               │  AlgodClient (v2)  │   │ Indexer │
//!   ┌──────────┐                └────────────────────┘   └─────────┘
//!   │ Ctrl-C   │── cancels the round wait
//!   └──────────┘
//! ```
//!
//! The passphrase for commands that sign or need "my" address is read from
//! `ALGO_MNEMONIC` (a `.env` file is honored).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use algo_wallet::blockchain::types::TransactionId;
use algo_wallet::blockchain::{Account, Address, AlgodClient, IndexerClient, NodeApi, Passphrase};
use algo_wallet::config::{load_or_default, AppConfig};
use algo_wallet::lifecycle::{signals, Shutdown};
use algo_wallet::observability::{logging, metrics};
use algo_wallet::payments::types::format_algos;
use algo_wallet::payments::{
    parse_algos, ConfirmationOutcome, FeePolicy, PaymentProcessor, SendOptions,
};

#[derive(Parser)]
#[command(name = "algo-wallet")]
#[command(about = "Algorand wallet: balances, payments and confirmation tracking", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show node status
    Status,
    /// Create a new account and print its passphrase
    NewAccount,
    /// Print the address of the configured account
    Address,
    /// Show an account balance
    Balance {
        /// Defaults to the configured account
        #[arg(long)]
        address: Option<String>,
    },
    /// Send a payment and wait for confirmation
    Send {
        /// Receiver address
        #[arg(long)]
        to: String,
        /// Amount in algos, e.g. 1.5
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
        #[arg(long, default_value = "")]
        note: String,
        /// Rounds to wait for confirmation
        #[arg(long)]
        rounds: Option<u64>,
        /// Fee in microalgos instead of the suggested fee
        #[arg(long)]
        flat_fee: Option<u64>,
    },
    /// Wait for an already submitted transaction
    Wait {
        tx_id: String,
        #[arg(long)]
        rounds: Option<u64>,
    },
    /// List past transactions
    History {
        /// Defaults to the configured account
        #[arg(long)]
        address: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref())?;
    logging::init_logging(&config.observability);
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    match cli.command {
        Commands::NewAccount => {
            let account = Account::generate()?;
            print_json(&json!({
                "address": account.address().to_string(),
                "passphrase": account.passphrase().expose(),
            }))?;
        }
        Commands::Address => {
            let account = Account::from_env()?;
            println!("{}", account.address());
        }
        command => run_node_command(command, &config).await?,
    }

    Ok(())
}

async fn run_node_command(
    command: Commands,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = AlgodClient::new(config.node.clone())?;
    let processor = PaymentProcessor::new(Arc::new(client.clone()), config.transactions.clone())
        .with_indexer(IndexerClient::new(&config.node)?);

    match command {
        Commands::Status => {
            let status = client.status().await?;
            print_json(&serde_json::to_value(&status)?)?;
        }
        Commands::Balance { address } => {
            let address = resolve_address(address)?;
            let balance = processor.balance(&address).await?;
            print_json(&json!({
                "address": balance.address,
                "microalgos": balance.microalgos,
                "algos": balance.algos().to_string(),
                "min_balance": balance.min_balance,
                "round": balance.round,
            }))?;
        }
        Commands::Send {
            to,
            amount,
            note,
            rounds,
            flat_fee,
        } => {
            let account = Account::from_env()?;
            let amount = parse_algos(&amount)?;
            let options = SendOptions {
                fee: flat_fee.map_or(
                    FeePolicy::from_config(config.transactions.flat_fee),
                    FeePolicy::Flat,
                ),
                confirmation_rounds: rounds.unwrap_or(config.transactions.confirmation_rounds),
            };

            let shutdown = Shutdown::new();
            let mut cancel = shutdown.subscribe();
            signals::spawn_ctrl_c_listener(shutdown);

            let report = processor
                .send_with(&account, amount, &to, note.as_bytes(), &options, Some(&mut cancel))
                .await?;
            print_outcome(&report.tx_id, &report.outcome)?;
        }
        Commands::Wait { tx_id, rounds } => {
            let tx_id = TransactionId::new(tx_id);
            let rounds = rounds.unwrap_or(config.transactions.confirmation_rounds);

            let shutdown = Shutdown::new();
            let mut cancel = shutdown.subscribe();
            signals::spawn_ctrl_c_listener(shutdown);

            let outcome = processor.wait(&tx_id, rounds, Some(&mut cancel)).await;
            print_outcome(&tx_id, &outcome)?;
        }
        Commands::History { address } => {
            let address = resolve_address(address)?;
            let transactions = processor.history(&address).await?;
            let rows: Vec<_> = transactions
                .iter()
                .map(|txn| {
                    json!({
                        "id": txn.id,
                        "type": txn.tx_type,
                        "round": txn.confirmed_round,
                        "sender": txn.sender,
                        "receiver": txn.receiver(),
                        "amount": txn.amount(),
                        "asset_id": txn.asset_id(),
                        "fee": txn.fee,
                        "note": txn.decoded_note().map(|n| String::from_utf8_lossy(&n).into_owned()),
                    })
                })
                .collect();
            print_json(&serde_json::Value::Array(rows))?;
        }
        Commands::NewAccount | Commands::Address => {}
    }

    Ok(())
}

/// The given address, or the configured account's.
fn resolve_address(address: Option<String>) -> Result<Address, Box<dyn std::error::Error>> {
    match address {
        Some(address) => Ok(address.trim().parse()?),
        None => Ok(Passphrase::from_env()?.address()?),
    }
}

fn print_outcome(
    tx_id: &TransactionId,
    outcome: &ConfirmationOutcome,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut value = json!({ "tx_id": tx_id, "outcome": outcome.kind() });
    match outcome {
        ConfirmationOutcome::Confirmed { round, transaction } => {
            value["round"] = json!(round);
            if let Some(fee) = transaction.txn.pointer("/txn/fee").and_then(|v| v.as_u64()) {
                value["fee"] = json!(format_algos(fee));
            }
            if let Some(note) = transaction.note() {
                value["note"] = json!(String::from_utf8_lossy(&note));
            }
        }
        ConfirmationOutcome::Rejected { reason } => value["reason"] = json!(reason),
        ConfirmationOutcome::TimedOut { rounds } => value["rounds"] = json!(rounds),
        ConfirmationOutcome::QueryFailed(e) => value["error"] = json!(e.to_string()),
        ConfirmationOutcome::Cancelled => {}
    }
    print_json(&value)
}

fn print_json(value: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
