//! Ingestion reconciler
//!
//! Merges the bootstrap snapshot and the external feed into the sighting
//! store. Both paths share normalization and insert-if-absent semantics, so
//! whichever source writes an `id` first keeps it.

use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;
use tick_common::db::{insert_if_absent, SourceLabel};
use tick_common::{CityTable, Result};
use tracing::{debug, error, info, warn};

use super::feed::{FeedClient, FeedError};
use super::record::RawSighting;
use super::snapshot::read_snapshot;

/// Counts from one ingestion batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Records that passed validation and were offered to the store
    pub attempted: usize,
    /// Records actually written (ids not already present)
    pub inserted: usize,
}

impl IngestReport {
    pub fn skipped_existing(&self) -> usize {
        self.attempted - self.inserted
    }
}

/// Result of the external feed step
#[derive(Debug)]
pub enum FeedOutcome {
    Merged { fetched: usize, report: IngestReport },
    Failed(FeedError),
}

impl FeedOutcome {
    /// Records merged, zero on failure
    pub fn attempted(&self) -> usize {
        match self {
            FeedOutcome::Merged { report, .. } => report.attempted,
            FeedOutcome::Failed(_) => 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FeedOutcome::Failed(_))
    }
}

#[derive(Clone)]
pub struct Reconciler {
    pool: SqlitePool,
    cities: Arc<CityTable>,
}

impl Reconciler {
    pub fn new(pool: SqlitePool, cities: Arc<CityTable>) -> Self {
        Self { pool, cities }
    }

    /// Insert snapshot records tagged with the system label
    ///
    /// Returns the number of valid records offered to the store, not the
    /// number of new rows.
    pub async fn load_bootstrap(&self, records: &[RawSighting]) -> Result<IngestReport> {
        self.ingest(records, SourceLabel::System).await
    }

    /// Insert feed records tagged with the external-feed label
    pub async fn merge_external(&self, records: &[RawSighting]) -> Result<IngestReport> {
        self.ingest(records, SourceLabel::ExternalFeed).await
    }

    /// Read the snapshot file and load it; never fails
    pub async fn bootstrap_from_file(&self, path: &Path) -> IngestReport {
        let records = match read_snapshot(path).await {
            Ok(Some(records)) => records,
            Ok(None) => {
                warn!(path = %path.display(), "Bootstrap snapshot not found, skipping");
                return IngestReport::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Bootstrap snapshot unreadable, skipping");
                return IngestReport::default();
            }
        };

        match self.load_bootstrap(&records).await {
            Ok(report) => {
                info!(
                    attempted = report.attempted,
                    inserted = report.inserted,
                    "Loaded bootstrap sightings"
                );
                report
            }
            Err(e) => {
                error!(error = %e, "Failed to store bootstrap sightings");
                IngestReport::default()
            }
        }
    }

    /// Fetch the external feed and merge it; failures become [`FeedOutcome::Failed`]
    pub async fn merge_from_feed(&self, client: &FeedClient) -> FeedOutcome {
        let records = match client.fetch().await {
            Ok(records) => records,
            Err(e) => return FeedOutcome::Failed(e),
        };

        match self.merge_external(&records).await {
            Ok(report) => FeedOutcome::Merged {
                fetched: records.len(),
                report,
            },
            Err(e) => FeedOutcome::Failed(FeedError::Store(e.to_string())),
        }
    }

    /// Startup sequence: bootstrap first, then the feed when one is configured
    pub async fn run_startup(&self, snapshot: &Path, feed: Option<&FeedClient>) -> StartupReport {
        let bootstrap = self.bootstrap_from_file(snapshot).await;

        let feed = match feed {
            Some(client) => {
                let outcome = self.merge_from_feed(client).await;
                match &outcome {
                    FeedOutcome::Merged { fetched, report } => info!(
                        url = %client.url(),
                        fetched,
                        attempted = report.attempted,
                        inserted = report.inserted,
                        "Merged external feed"
                    ),
                    FeedOutcome::Failed(e) => warn!(
                        url = %client.url(),
                        error = %e,
                        "External feed unavailable, continuing with stored sightings"
                    ),
                }
                Some(outcome)
            }
            None => {
                info!("External feed disabled");
                None
            }
        };

        StartupReport { bootstrap, feed }
    }

    async fn ingest(&self, records: &[RawSighting], source: SourceLabel) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let mut tx = self.pool.begin().await?;

        for raw in records {
            let Some(sighting) = raw.to_new_sighting(&self.cities, source.clone()) else {
                continue;
            };
            report.attempted += 1;
            if insert_if_absent(&mut *tx, &sighting).await? {
                report.inserted += 1;
            }
        }

        tx.commit().await?;
        debug!(
            source = source.as_str(),
            attempted = report.attempted,
            inserted = report.inserted,
            skipped = report.skipped_existing(),
            "Ingested batch"
        );
        Ok(report)
    }
}

/// What startup ingestion did
#[derive(Debug)]
pub struct StartupReport {
    pub bootstrap: IngestReport,
    /// `None` when the feed is disabled
    pub feed: Option<FeedOutcome>,
}
