//! Command logic behind the CLI, kept free of argument parsing and printing.

use chrono::{DateTime, Utc};

use crate::persistence::QueueStore;
use crate::queue::{FlushReport, OfflineQueue, Record, SubmitOutcome};
use crate::transport::Delivery;
use crate::utils::error::{AppError, StorageResult};

/// What `submit_expense` did: the startup sync, then the new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitSummary {
    pub startup: FlushReport,
    pub outcome: SubmitOutcome,
}

/// The explicit user id, or the one remembered from the last submission.
pub fn resolve_user(store: &QueueStore, user: Option<&str>) -> Result<String, AppError> {
    match user {
        Some(user) => Ok(user.to_string()),
        None => store.last_user()?.ok_or(AppError::MissingUser),
    }
}

/// Validate and remember the entry, sync what was queued earlier, then
/// submit the new record.
///
/// Nothing is written or sent when validation fails.
pub async fn submit_expense<D: Delivery>(
    queue: &OfflineQueue<D>,
    store: &QueueStore,
    user: Option<&str>,
    message: &str,
) -> Result<SubmitSummary, AppError> {
    let user = resolve_user(store, user)?;
    let record = Record::new(message, &user)?;
    store.remember_user(&record.user_id)?;

    let startup = queue.flush().await?;
    let outcome = queue.submit(record).await?;

    Ok(SubmitSummary { startup, outcome })
}

/// Every stored record still awaiting delivery, in the order a reopened
/// queue would send them: an interrupted flush's batch first.
pub fn queued_records(store: &QueueStore) -> StorageResult<Vec<Record>> {
    let stored = store.load()?;
    let mut records = stored.in_flight;
    records.extend(stored.pending);
    Ok(records)
}

/// One status line: `[saved-at] user: message`.
pub fn describe(record: &Record) -> String {
    let saved_at = record
        .timestamp
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "-".to_string());
    format!("[{saved_at}] {}: {}", record.user_id, record.message)
}
