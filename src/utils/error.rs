//! The `error` module defines the error types used within `expense_outbox`.
//!
//! Delivery failures never escape the queue: they are recovered by saving the
//! record offline. Storage failures are propagated to the caller, and
//! validation failures are raised before a record ever reaches the queue.

use thiserror::Error;

/// A failed attempt to hand a record to the remote API.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Transport-level failure: connection refused, timeout, TLS, ...
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server responded with status {0}")]
    Status(u16),
}

/// A failed read or write of the local queue store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sled::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A record rejected before submission.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// Top-level error for the command-line front end.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] DeliveryError),

    #[error("invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("no user id given and none remembered; pass --user")]
    MissingUser,
}

pub type StorageResult<T> = Result<T, StorageError>;
