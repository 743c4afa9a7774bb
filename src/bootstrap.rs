//! One-shot bootstrap of a new user's category set.
//!
//! A pass reads the persisted completion flag and the remote category list.
//! A user who already has categories, or whose device already completed
//! bootstrap, goes straight to [`BootstrapState::Initialized`]. Otherwise the
//! whole catalog is created, the flag is persisted and the list is refetched.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cancel::CancellationFlag;
use crate::catalog;
use crate::error::AppResult;
use crate::flight::{lock, SingleFlight};
use crate::reconcile::{create_batch, BatchReport};
use crate::repository::CategoryRepository;
use crate::sync_state::SyncStateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapState {
    Unknown,
    Checking,
    Initializing,
    Initialized,
}

pub struct BootstrapController<R, S> {
    repo: R,
    store: S,
    cancel: CancellationFlag,
    flight: SingleFlight,
    state: Mutex<BootstrapState>,
    total_categories: AtomicUsize,
    last_report: Mutex<Option<BatchReport>>,
}

impl<R, S> BootstrapController<R, S>
where
    R: CategoryRepository,
    S: SyncStateStore,
{
    pub fn new(repo: R, store: S, cancel: CancellationFlag) -> Self {
        Self {
            repo,
            store,
            cancel,
            flight: SingleFlight::new(),
            state: Mutex::new(BootstrapState::Unknown),
            total_categories: AtomicUsize::new(0),
            last_report: Mutex::new(None),
        }
    }

    pub fn state(&self) -> BootstrapState {
        *lock(&self.state)
    }

    pub fn is_initialized(&self) -> bool {
        self.state() == BootstrapState::Initialized
    }

    pub fn is_initializing(&self) -> bool {
        self.state() == BootstrapState::Initializing
    }

    /// Number of remote categories seen by the last pass.
    pub fn total_categories(&self) -> usize {
        self.total_categories.load(Ordering::SeqCst)
    }

    /// Report of the last creation batch, if a pass ever created anything.
    pub fn last_report(&self) -> Option<BatchReport> {
        lock(&self.last_report).clone()
    }

    /// Whether this device has persisted a completed bootstrap.
    pub fn completed_on_device(&self) -> bool {
        self.store.bootstrap_completed().unwrap_or_else(|e| {
            warn!(error = %e, "Could not read bootstrap flag");
            false
        })
    }

    fn set_state(&self, state: BootstrapState) {
        *lock(&self.state) = state;
    }

    /// Runs one bootstrap pass and returns the state it ended in.
    ///
    /// A pass already in flight makes this return immediately with the
    /// current state. If the remote list cannot be read the controller stays
    /// in `Checking` until the next call.
    pub async fn run(&self) -> BootstrapState {
        let Some(_flight) = self.flight.try_begin() else {
            debug!("Bootstrap already in progress, skipping");
            return self.state();
        };

        self.set_state(BootstrapState::Checking);

        if self.completed_on_device() {
            match self.repo.list(None).await {
                Ok(categories) => self.total_categories.store(categories.len(), Ordering::SeqCst),
                Err(e) => warn!(error = %e, "Could not count categories after completed bootstrap"),
            }
            debug!("Bootstrap previously completed");
            self.set_state(BootstrapState::Initialized);
            return BootstrapState::Initialized;
        }

        let existing = match self.repo.list(None).await {
            Ok(categories) => categories,
            Err(e) => {
                error!(error = %e, "Could not list categories, bootstrap check aborted");
                return BootstrapState::Checking;
            }
        };

        if !existing.is_empty() {
            info!(count = existing.len(), "User already has categories, skipping bootstrap");
            self.total_categories.store(existing.len(), Ordering::SeqCst);
            self.set_state(BootstrapState::Initialized);
            return BootstrapState::Initialized;
        }

        self.set_state(BootstrapState::Initializing);
        let definitions: Vec<_> = catalog::all_definitions().iter().collect();
        info!(count = definitions.len(), "Creating default categories");

        let report = create_batch(&self.repo, &definitions, &self.cancel).await;
        let materialized = report.created + report.already_existed;
        let cancelled = report.cancelled;
        *lock(&self.last_report) = Some(report);

        if cancelled {
            warn!("Bootstrap cancelled before completion");
            self.set_state(BootstrapState::Unknown);
            return BootstrapState::Unknown;
        }

        if let Err(e) = self.store.mark_bootstrap_completed() {
            warn!(error = %e, "Could not persist bootstrap flag");
        }
        self.set_state(BootstrapState::Initialized);

        let total = match self.repo.list(None).await {
            Ok(categories) => categories.len(),
            Err(e) => {
                warn!(error = %e, "Could not refetch categories after bootstrap");
                materialized
            }
        };
        self.total_categories.store(total, Ordering::SeqCst);
        info!(total, "Bootstrap completed");

        BootstrapState::Initialized
    }

    /// Clears the persisted completion flag. Remote data is left alone.
    pub fn reset_initialization(&self) -> AppResult<()> {
        self.store.clear_bootstrap_completed()?;
        info!("Bootstrap flag cleared");
        Ok(())
    }

    /// Clears the flag and immediately runs a fresh pass.
    pub async fn force_initialization(&self) -> BootstrapState {
        if let Err(e) = self.reset_initialization() {
            warn!(error = %e, "Could not clear bootstrap flag before forced pass");
        }
        self.run().await
    }
}
