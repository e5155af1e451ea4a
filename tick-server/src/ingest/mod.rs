//! Write side: bootstrap snapshot and external feed reconciliation

pub mod feed;
pub mod reconciler;
pub mod record;
pub mod snapshot;

pub use feed::{extract_records, FeedClient, FeedError};
pub use reconciler::{FeedOutcome, IngestReport, Reconciler, StartupReport};
pub use record::{decode_records, RawSighting};
pub use snapshot::read_snapshot;
