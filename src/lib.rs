//! # Expense Outbox
//!
//! `expense_outbox` submits short free-text expense entries to a remote API.
//! When the API cannot be reached, entries are kept in a local queue and
//! synced once connectivity returns.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `queue`: The offline submission queue and the `Record` it carries.
//! - `persistence`: Durable storage of the queue in an embedded `sled` database.
//! - `transport`: HTTP delivery to the expense API and reachability probing.
//! - `sync`: Background task that flushes the queue when the API comes back.
//! - `app`: Command logic behind the CLI (submit, status).
//! - `config`: Handles loading and managing configuration.
//! - `utils`: Contains shared utilities, such as error handling and logging.

pub mod app;
pub mod config;
pub mod persistence;
pub mod queue;
pub mod sync;
pub mod transport;
pub mod utils;
