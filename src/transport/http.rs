//! HTTP delivery of expense records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::ApiSettings;
use crate::queue::Record;
use crate::transport::Delivery;
use crate::utils::error::DeliveryError;

/// Body of `POST /expense`. The offline timestamp stays local.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExpensePayload<'a> {
    message: &'a str,
    user_id: &'a str,
}

/// Posts records to `{base_url}/expense` as JSON.
#[derive(Debug, Clone)]
pub struct HttpDelivery {
    client: Client,
    endpoint: String,
}

impl HttpDelivery {
    pub fn new(settings: &ApiSettings) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/expense", settings.base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Delivery for HttpDelivery {
    async fn deliver(&self, record: &Record) -> Result<(), DeliveryError> {
        let payload = ExpensePayload {
            message: &record.message,
            user_id: &record.user_id,
        };

        debug!(url = %self.endpoint, user_id = %record.user_id, "Sending expense");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }

        Ok(())
    }
}
