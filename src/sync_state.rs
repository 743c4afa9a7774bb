//! Device-local persisted state shared by the bootstrap controller and the
//! sync manager: whether bootstrap has completed and when the last
//! reconciliation attempt finished. Neither value is ever sent to the server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::db::queries::settings;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};

pub const BOOTSTRAP_COMPLETED_KEY: &str = "@categories_initialized";
pub const LAST_SYNC_KEY: &str = "@categories_last_sync";

/// Key/value persistence for the two sync scalars.
///
/// Implementors provide raw string access; the typed accessors encode the
/// stored formats (`"true"` for the flag, decimal epoch millis for the
/// timestamp) in one place.
pub trait SyncStateStore: Send + Sync {
    fn read(&self, key: &str) -> AppResult<Option<String>>;
    fn write(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&self, key: &str) -> AppResult<()>;

    fn bootstrap_completed(&self) -> AppResult<bool> {
        Ok(self.read(BOOTSTRAP_COMPLETED_KEY)?.as_deref() == Some("true"))
    }

    fn mark_bootstrap_completed(&self) -> AppResult<()> {
        self.write(BOOTSTRAP_COMPLETED_KEY, "true")
    }

    fn clear_bootstrap_completed(&self) -> AppResult<()> {
        self.remove(BOOTSTRAP_COMPLETED_KEY)
    }

    /// Epoch millis of the last completed sync. An unparseable value is
    /// reported as absent.
    fn last_sync_at(&self) -> AppResult<Option<i64>> {
        let Some(raw) = self.read(LAST_SYNC_KEY)? else {
            return Ok(None);
        };
        match raw.trim().parse::<i64>() {
            Ok(millis) => Ok(Some(millis)),
            Err(_) => {
                warn!(value = %raw, "Ignoring malformed last sync timestamp");
                Ok(None)
            }
        }
    }

    fn set_last_sync_at(&self, millis: i64) -> AppResult<()> {
        self.write(LAST_SYNC_KEY, &millis.to_string())
    }

    fn clear_last_sync_at(&self) -> AppResult<()> {
        self.remove(LAST_SYNC_KEY)
    }
}

impl<S: SyncStateStore + ?Sized> SyncStateStore for Arc<S> {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> AppResult<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        (**self).remove(key)
    }
}

/// Sync state kept in the `settings` table of the local SQLite database.
#[derive(Clone)]
pub struct SqliteSyncStateStore {
    pool: DbPool,
}

impl SqliteSyncStateStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SyncStateStore for SqliteSyncStateStore {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        let conn = self.pool.get()?;
        Ok(settings::get_setting(&conn, key)?)
    }

    fn write(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        settings::set_setting(&conn, key, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        settings::delete_setting(&conn, key)?;
        Ok(())
    }
}

/// Process-local store, for ephemeral sessions and tests.
#[derive(Debug, Default)]
pub struct MemorySyncStateStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySyncStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| AppError::Internal("sync state lock poisoned".into()))
    }
}

impl SyncStateStore for MemorySyncStateStore {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> AppResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
