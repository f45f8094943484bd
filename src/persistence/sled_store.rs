use serde::de::DeserializeOwned;
use sled::{Batch, Db};
use tracing::debug;

use crate::queue::Record;
use crate::utils::error::StorageResult;

const USER_KEY: &str = "userId";
const IN_FLIGHT_SUFFIX: &str = ".inflight";

/// Everything the store holds for the queue: records waiting for delivery and
/// records a flush had taken out but not finished with.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoredQueue {
    pub pending: Vec<Record>,
    pub in_flight: Vec<Record>,
}

#[derive(Clone)]
pub struct QueueStore {
    db: Db,
    queue_key: String,
    in_flight_key: String,
    #[cfg(test)]
    reject_writes: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl QueueStore {
    /// Open or create a sled database at `path`, keeping the queue under
    /// `queue_key`.
    pub fn open(path: &str, queue_key: &str) -> StorageResult<Self> {
        let db = sled::open(path)?;
        Ok(Self {
            db,
            queue_key: queue_key.to_string(),
            in_flight_key: format!("{queue_key}{IN_FLIGHT_SUFFIX}"),
            #[cfg(test)]
            reject_writes: Default::default(),
        })
    }

    pub fn queue_key(&self) -> &str {
        &self.queue_key
    }

    /// Load both queue arrays. Missing keys read as empty.
    pub fn load(&self) -> StorageResult<StoredQueue> {
        Ok(StoredQueue {
            pending: self.read_json(&self.queue_key)?.unwrap_or_default(),
            in_flight: self.read_json(&self.in_flight_key)?.unwrap_or_default(),
        })
    }

    /// Overwrite the pending queue and the in-flight batch in one atomic
    /// batch, so a reader never sees a record in both or in neither.
    pub fn persist(&self, pending: &[Record], in_flight: &[Record]) -> StorageResult<()> {
        self.check_writable()?;
        let mut batch = Batch::default();
        batch.insert(self.queue_key.as_bytes(), serde_json::to_vec(pending)?);
        if in_flight.is_empty() {
            batch.remove(self.in_flight_key.as_bytes());
        } else {
            batch.insert(self.in_flight_key.as_bytes(), serde_json::to_vec(in_flight)?);
        }
        self.db.apply_batch(batch)?;
        self.db.flush()?;
        debug!(
            key = %self.queue_key,
            pending = pending.len(),
            in_flight = in_flight.len(),
            "Persisted queue"
        );
        Ok(())
    }

    /// Remember the user id of the latest submission.
    pub fn remember_user(&self, user_id: &str) -> StorageResult<()> {
        self.check_writable()?;
        self.db.insert(USER_KEY, user_id.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    pub fn last_user(&self) -> StorageResult<Option<String>> {
        Ok(self
            .db
            .get(USER_KEY)?
            .map(|raw| String::from_utf8_lossy(&raw).into_owned()))
    }

    #[cfg(not(test))]
    fn check_writable(&self) -> StorageResult<()> {
        Ok(())
    }

    #[cfg(test)]
    fn check_writable(&self) -> StorageResult<()> {
        use std::sync::atomic::Ordering;

        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(sled::Error::Unsupported("writes rejected".to_string()).into());
        }
        Ok(())
    }

    /// Make every following write fail, across all clones of this store.
    #[cfg(test)]
    pub(crate) fn reject_writes(&self, reject: bool) {
        self.reject_writes
            .store(reject, std::sync::atomic::Ordering::SeqCst);
    }

    #[cfg(test)]
    pub(crate) fn raw_get(&self, key: &str) -> Option<Vec<u8>> {
        self.db.get(key).ok().flatten().map(|v| v.to_vec())
    }

    #[cfg(test)]
    pub(crate) fn raw_insert(&self, key: &str, value: &[u8]) {
        self.db.insert(key, value).ok();
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.db.get(key.as_bytes())? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for QueueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueStore")
            .field("db", &"sled::Db")
            .field("queue_key", &self.queue_key)
            .finish()
    }
}
