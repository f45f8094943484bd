//! The `transport` module is responsible for network communication with the
//! expense API.
//!
//! It defines the `Delivery` seam the queue sends records through, the HTTP
//! implementation of it, and the reachability probe that tells the rest of
//! the crate whether the API is currently online.

pub mod connectivity;
pub mod http;

use async_trait::async_trait;

use crate::queue::Record;
use crate::utils::error::DeliveryError;

pub use connectivity::ConnectivityMonitor;
pub use http::HttpDelivery;

/// Hands a single record to the remote API.
///
/// `Ok(())` means the API accepted the record. Every error is treated the
/// same way by the queue: keep the record and retry later.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, record: &Record) -> Result<(), DeliveryError>;
}
