pub mod outbox;
pub mod record;

pub use outbox::{FlushReport, OfflineQueue, SubmitOutcome};
pub use record::Record;
