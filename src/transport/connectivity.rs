//! Reachability probing for the expense API.
//!
//! The monitor opens a TCP connection to the API host and publishes
//! online/offline transitions on a `watch` channel. Consumers only ever see
//! changes, never repeated states.

use std::time::Duration;

use reqwest::Url;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{debug, info};

use crate::config::Settings;
use crate::utils::error::AppError;

#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    host: String,
    port: u16,
    probe_interval: Duration,
    probe_timeout: Duration,
}

impl ConnectivityMonitor {
    pub fn new(host: &str, port: u16, probe_interval: Duration, probe_timeout: Duration) -> Self {
        Self {
            host: host.to_string(),
            port,
            probe_interval,
            probe_timeout,
        }
    }

    /// Derive the probe target from `api.base_url`.
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let invalid = || AppError::InvalidBaseUrl(settings.api.base_url.clone());
        let url = Url::parse(&settings.api.base_url).map_err(|_| invalid())?;
        let host = url.host_str().ok_or_else(invalid)?;
        let port = url.port_or_known_default().ok_or_else(invalid)?;

        Ok(Self::new(
            host,
            port,
            Duration::from_secs(settings.sync.probe_interval_secs),
            Duration::from_millis(settings.sync.probe_timeout_ms),
        ))
    }

    /// True when the API host accepts a TCP connection within the probe
    /// timeout.
    pub async fn probe(&self) -> bool {
        let attempt = TcpStream::connect((self.host.as_str(), self.port));
        match timeout(self.probe_timeout, attempt).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(host = %self.host, port = self.port, error = %e, "Probe failed");
                false
            }
            Err(_) => {
                debug!(host = %self.host, port = self.port, "Probe timed out");
                false
            }
        }
    }

    /// Probe forever, publishing state changes on `tx`. Returns once every
    /// receiver has been dropped.
    pub async fn run(self, tx: watch::Sender<bool>) {
        let mut ticker = interval(self.probe_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tx.closed() => break,
            }

            let online = self.probe().await;
            let changed = tx.send_if_modified(|current| {
                if *current == online {
                    false
                } else {
                    *current = online;
                    true
                }
            });

            if changed {
                info!(host = %self.host, online, "Connectivity changed");
            }
        }

        debug!(host = %self.host, "Connectivity monitor stopped");
    }
}
