use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::utils::error::ValidationError;

/// A single expense submission.
///
/// Serialized as `{"message", "userId", "timestamp"}`. `timestamp` is the Unix
/// time in milliseconds at which the record was saved offline. It stays unset
/// for records that were delivered straight away.
///
/// # Example
///
/// ```rust
/// use expense_outbox::queue::Record;
///
/// let record = Record::new("  coffee 35k ", "u1").unwrap();
/// assert_eq!(record.message, "coffee 35k");
/// assert!(record.timestamp.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub message: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Record {
    /// Builds a record from raw form input, trimming both fields and
    /// rejecting empty ones.
    pub fn new(message: &str, user_id: &str) -> Result<Self, ValidationError> {
        let message = message.trim();
        let user_id = user_id.trim();

        if user_id.is_empty() {
            return Err(ValidationError::EmptyField("userId"));
        }
        if message.is_empty() {
            return Err(ValidationError::EmptyField("message"));
        }

        Ok(Self {
            message: message.to_string(),
            user_id: user_id.to_string(),
            timestamp: None,
        })
    }

    /// Stamps the offline-save time unless one is already set. Records that
    /// bounce back from a failed flush keep their first timestamp.
    pub(crate) fn stamp(&mut self) {
        if self.timestamp.is_none() {
            self.timestamp = Some(Utc::now().timestamp_millis());
        }
    }
}
