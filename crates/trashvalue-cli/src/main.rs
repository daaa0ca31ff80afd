//! TrashValue CLI - a command-line client for the TrashValue recycling
//! rewards platform.
//!
//! Every command resumes the stored session first, then talks to the API
//! through the authenticated request pipeline in `trashvalue-core`.

mod app;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trashvalue_core::config::Config;
use trashvalue_core::models::{PaymentMethod, PickupMethod};

use app::App;

/// Log file name prefix inside the log directory
const LOG_FILE_NAME: &str = "trashvalue.log";

#[derive(Parser, Debug)]
#[command(name = "trashvalue", version, about = "TrashValue recycling rewards client")]
pub struct Cli {
    /// Keep the session in memory only instead of the OS keychain
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create a new account (does not sign in)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        profile_image: Option<PathBuf>,
        #[arg(long)]
        background_photo: Option<PathBuf>,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the session status
    Status,
    /// Show the profile, or update it when any field is given
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        profile_image: Option<PathBuf>,
        #[arg(long)]
        background_photo: Option<PathBuf>,
    },
    /// Change the account password
    ChangePassword,
    /// List waste types and their price per kg
    WasteTypes {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Ignore the local cache
        #[arg(long)]
        refresh: bool,
    },
    /// List waste banks
    WasteBanks {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        refresh: bool,
    },
    /// List pending dropoffs, or completed ones with --completed
    Dropoffs {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        completed: bool,
    },
    /// Request a pickup or announce a self drop-off
    CreateDropoff {
        #[arg(long)]
        address: String,
        /// Pickup date, e.g. 2026-10-20
        #[arg(long)]
        date: String,
        /// pickup or self-dropoff
        #[arg(long, default_value = "pickup")]
        method: PickupMethod,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Add a waste item to a dropoff
    AddItem {
        dropoff_id: String,
        #[arg(long)]
        waste_type: String,
        /// Weight in kg
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Estimate the reward for a weight of a waste type
    Estimate {
        #[arg(long)]
        waste_type: String,
        #[arg(long)]
        weight: f64,
        #[arg(long, default_value = "pickup")]
        method: PickupMethod,
    },
    /// Show the transaction history
    Transactions {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Oldest first
        #[arg(long)]
        asc: bool,
    },
    /// Top up the balance, e.g. `top-up "Rp 50.000" --method e-wallet`
    TopUp {
        amount: String,
        #[arg(long, default_value = "e-wallet")]
        method: PaymentMethod,
    },
    /// Withdraw from the balance
    Withdraw {
        amount: String,
        #[arg(long, default_value = "bank-transfer")]
        method: PaymentMethod,
        #[arg(long, default_value = "Withdrawal")]
        description: String,
    },
    /// Ask the recycling assistant
    Chat {
        message: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr and, when a log directory is available, to a daily
/// rolling file. The returned guard must be held until exit.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir.map(|dir| (dir, std::fs::create_dir_all(dir))) {
        Some((dir, Ok(()))) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging starts before the config loads so its warnings are kept
    let _guard = init_tracing(Config::log_dir().ok().as_deref());
    info!(command = ?cli.command, "TrashValue CLI starting");

    let mut config = Config::load()?;
    config.apply_env();

    let mut app = App::new(config, cli.ephemeral)?;
    let result = app.run(cli.command).await;

    debug!("TrashValue CLI exiting");
    result
}
