//! CLI for the expense outbox
//!
//! Subcommands:
//! - `submit`: record an expense, saving it offline if the API is unreachable
//! - `flush`: push queued expenses to the API
//! - `status`: list queued expenses
//! - `watch`: keep syncing whenever connectivity returns

use std::sync::Arc;

use clap::{Parser, Subcommand};
use expense_outbox::app;
use expense_outbox::config::{Settings, load_config};
use expense_outbox::persistence::QueueStore;
use expense_outbox::queue::{OfflineQueue, SubmitOutcome};
use expense_outbox::sync::spawn_sync_worker;
use expense_outbox::transport::{ConnectivityMonitor, HttpDelivery};
use expense_outbox::utils::error::AppError;
use expense_outbox::utils::logging;
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "expense-outbox", about = "Record expenses, online or offline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record an expense
    Submit {
        /// User id; defaults to the last one used
        #[arg(long)]
        user: Option<String>,
        /// Free-text description, e.g. "coffee 35k"
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Sync queued expenses now
    Flush,
    /// Show queued expenses
    Status,
    /// Sync automatically whenever the API becomes reachable
    Watch,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };
    logging::init(&settings.log.level);

    let result = match cli.command {
        Command::Submit { user, message } => run_submit(&settings, user, message.join(" ")).await,
        Command::Flush => run_flush(&settings).await,
        Command::Status => run_status(&settings).await,
        Command::Watch => run_watch(&settings).await,
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}

struct Session {
    store: QueueStore,
    queue: Arc<OfflineQueue<HttpDelivery>>,
    monitor: ConnectivityMonitor,
    online: watch::Sender<bool>,
}

/// Open the queue with the connectivity state from a fresh probe.
async fn open_session(settings: &Settings) -> Result<Session, AppError> {
    let store = QueueStore::open(&settings.storage.path, &settings.storage.queue_key)?;
    let delivery = HttpDelivery::new(&settings.api)?;
    let monitor = ConnectivityMonitor::from_settings(settings)?;

    let (online, rx) = watch::channel(monitor.probe().await);
    let queue = OfflineQueue::open(store.clone(), delivery, rx)?;

    Ok(Session {
        store,
        queue: Arc::new(queue),
        monitor,
        online,
    })
}

async fn run_submit(
    settings: &Settings,
    user: Option<String>,
    message: String,
) -> Result<(), AppError> {
    let session = open_session(settings).await?;
    let summary =
        app::submit_expense(&*session.queue, &session.store, user.as_deref(), &message).await?;

    if summary.startup.synced > 0 {
        println!("Synced {} offline expense(s)", summary.startup.synced);
    }
    match summary.outcome {
        SubmitOutcome::Delivered => println!("Expense recorded"),
        SubmitOutcome::Queued => println!("Saved offline; it will sync when the network returns"),
    }
    Ok(())
}

async fn run_flush(settings: &Settings) -> Result<(), AppError> {
    let session = open_session(settings).await?;
    if !session.queue.is_online() {
        println!(
            "API unreachable; {} expense(s) still queued",
            session.queue.len().await
        );
        return Ok(());
    }

    let report = session.queue.flush().await?;
    println!(
        "Synced {} of {} expense(s); {} still queued",
        report.synced, report.attempted, report.remaining
    );
    Ok(())
}

async fn run_status(settings: &Settings) -> Result<(), AppError> {
    let store = QueueStore::open(&settings.storage.path, &settings.storage.queue_key)?;
    let queued = app::queued_records(&store)?;

    if queued.is_empty() {
        println!("No queued expenses");
        return Ok(());
    }

    println!("{} queued expense(s):", queued.len());
    for record in &queued {
        println!("  {}", app::describe(record));
    }
    Ok(())
}

async fn run_watch(settings: &Settings) -> Result<(), AppError> {
    let Session {
        queue,
        monitor,
        online,
        ..
    } = open_session(settings).await?;

    let worker = spawn_sync_worker(queue, online.subscribe());
    let probing = tokio::spawn(monitor.run(online));
    info!(url = %settings.api.base_url, "Watching connectivity");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received. Exiting gracefully.");

    // dropping the monitor drops the sender, which stops the worker
    probing.abort();
    let _ = probing.await;
    let _ = worker.await;
    Ok(())
}
