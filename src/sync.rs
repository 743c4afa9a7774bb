//! Periodic, throttled reconciliation of the catalog against a user's
//! remote categories.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, error, info, warn};

use crate::cancel::CancellationFlag;
use crate::catalog;
use crate::clock::Clock;
use crate::error::AppResult;
use crate::flight::{lock, SingleFlight};
use crate::reconcile::{create_batch, missing_definitions, BatchReport};
use crate::repository::CategoryRepository;
use crate::sync_state::SyncStateStore;

/// How long a completed sync stays fresh.
pub const DEFAULT_SYNC_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct SyncManager<R, S, C> {
    repo: R,
    store: S,
    clock: C,
    ttl: Duration,
    cancel: CancellationFlag,
    flight: SingleFlight,
    last_report: Mutex<Option<BatchReport>>,
}

impl<R, S, C> SyncManager<R, S, C>
where
    R: CategoryRepository,
    S: SyncStateStore,
    C: Clock,
{
    pub fn new(repo: R, store: S, clock: C, cancel: CancellationFlag) -> Self {
        Self {
            repo,
            store,
            clock,
            ttl: DEFAULT_SYNC_TTL,
            cancel,
            flight: SingleFlight::new(),
            last_report: Mutex::new(None),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_syncing(&self) -> bool {
        self.flight.is_busy()
    }

    pub fn last_report(&self) -> Option<BatchReport> {
        lock(&self.last_report).clone()
    }

    /// When the last sync attempt completed, if it ever did.
    pub fn last_sync_date(&self) -> Option<DateTime<Utc>> {
        match self.store.last_sync_at() {
            Ok(Some(millis)) => Utc.timestamp_millis_opt(millis).single(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Could not read last sync timestamp");
                None
            }
        }
    }

    /// True when no sync has completed yet or the last one is older than the
    /// TTL. An unreadable timestamp counts as never synced.
    pub fn should_sync(&self) -> bool {
        match self.store.last_sync_at() {
            Ok(Some(last)) => {
                let elapsed = self.clock.now_millis().saturating_sub(last);
                let ttl = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
                elapsed > ttl
            }
            Ok(None) => true,
            Err(e) => {
                warn!(error = %e, "Could not read last sync timestamp, assuming never synced");
                true
            }
        }
    }

    /// Creates every catalog entry missing from the user's remote set.
    ///
    /// Returns `false` if a sync is already running, if the remote list could
    /// not be fetched, or if the batch was cancelled; `true` otherwise,
    /// including when the TTL says no sync is due and `force` is not set.
    pub async fn sync_categories(&self, force: bool) -> bool {
        let Some(_flight) = self.flight.try_begin() else {
            debug!("Category sync already in progress, skipping");
            return false;
        };

        if !force && !self.should_sync() {
            debug!("Category sync not due yet");
            return true;
        }

        let existing = match self.repo.list(None).await {
            Ok(categories) => categories,
            Err(e) => {
                error!(error = %e, "Could not list categories, sync aborted");
                return false;
            }
        };

        let missing = missing_definitions(&existing, catalog::all_definitions());
        info!(
            existing = existing.len(),
            missing = missing.len(),
            forced = force,
            "Reconciling default categories"
        );

        let report = create_batch(&self.repo, &missing, &self.cancel).await;
        let cancelled = report.cancelled;
        *lock(&self.last_report) = Some(report);

        if cancelled {
            warn!("Category sync cancelled, last sync time left unchanged");
            return false;
        }

        if let Err(e) = self.store.set_last_sync_at(self.clock.now_millis()) {
            warn!(error = %e, "Could not persist last sync timestamp");
        }
        true
    }

    /// Forgets the last sync time so the next check runs a full sync.
    pub fn force_clear_sync(&self) -> AppResult<()> {
        self.store.clear_last_sync_at()?;
        info!("Last sync timestamp cleared");
        Ok(())
    }
}
