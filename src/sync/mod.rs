//! The `sync` module decides when the offline queue gets flushed.
//!
//! A worker task follows the connectivity channel fed by
//! `transport::ConnectivityMonitor` and drains the queue whenever the API
//! becomes reachable.

pub mod worker;

pub use worker::spawn_sync_worker;
