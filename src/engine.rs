use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::bootstrap::{BootstrapController, BootstrapState};
use crate::cancel::CancellationFlag;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::{create_pool, migrations};
use crate::error::AppResult;
use crate::fallback::{self, CategoryListing};
use crate::models::CategoryKind;
use crate::repository::{CategoryRepository, HttpCategoryRepository};
use crate::sync::SyncManager;
use crate::sync_state::{SqliteSyncStateStore, SyncStateStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartupReport {
    pub bootstrap: BootstrapState,
    pub synced: bool,
}

/// The category subsystem as the rest of the client sees it: one bootstrap
/// controller and one sync manager sharing a repository, a state store and a
/// cancellation flag. Built once at startup and passed by reference.
pub struct CategoryEngine<R, S, C = SystemClock> {
    repo: Arc<R>,
    bootstrap: BootstrapController<Arc<R>, Arc<S>>,
    sync: SyncManager<Arc<R>, Arc<S>, C>,
    cancel: CancellationFlag,
}

pub type HttpCategoryEngine = CategoryEngine<HttpCategoryRepository, SqliteSyncStateStore>;

impl<R, S, C> CategoryEngine<R, S, C>
where
    R: CategoryRepository,
    S: SyncStateStore,
    C: Clock,
{
    pub fn new(repo: R, store: S, clock: C) -> Self {
        let repo = Arc::new(repo);
        let store = Arc::new(store);
        let cancel = CancellationFlag::new();

        Self {
            bootstrap: BootstrapController::new(repo.clone(), store.clone(), cancel.clone()),
            sync: SyncManager::new(repo.clone(), store, clock, cancel.clone()),
            repo,
            cancel,
        }
    }

    pub fn with_sync_ttl(mut self, ttl: std::time::Duration) -> Self {
        self.sync = self.sync.with_ttl(ttl);
        self
    }

    pub fn bootstrap(&self) -> &BootstrapController<Arc<R>, Arc<S>> {
        &self.bootstrap
    }

    pub fn sync(&self) -> &SyncManager<Arc<R>, Arc<S>, C> {
        &self.sync
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Runs bootstrap, then a TTL-gated sync. The sync is skipped when
    /// bootstrap did not reach `Initialized`.
    pub async fn start(&self) -> StartupReport {
        let bootstrap = self.bootstrap.run().await;
        let synced = bootstrap == BootstrapState::Initialized && self.sync.sync_categories(false).await;
        info!(bootstrap = ?bootstrap, synced, "Category engine started");
        StartupReport { bootstrap, synced }
    }

    /// Category read for pickers; falls back to the catalog on failure.
    pub async fn categories(&self, kind: Option<CategoryKind>) -> CategoryListing {
        fallback::list_categories(self.repo.as_ref(), kind).await
    }

    /// Stops in-flight batches between items, e.g. on logout.
    pub fn shutdown(&self) {
        info!("Cancelling category batches");
        self.cancel.cancel();
    }

    /// Allows batches to run again after [`shutdown`](Self::shutdown).
    pub fn resume(&self) {
        self.cancel.reset();
    }
}

impl HttpCategoryEngine {
    /// Wires the HTTP repository and the SQLite state store from `config`.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let pool = create_pool(&config.state_path)?;
        {
            let conn = pool.get()?;
            migrations::run_migrations(&conn)?;
        }

        let repo = HttpCategoryRepository::from_config(config)?;
        let store = SqliteSyncStateStore::new(pool);
        Ok(CategoryEngine::new(repo, store, SystemClock).with_sync_ttl(config.sync_ttl))
    }
}
