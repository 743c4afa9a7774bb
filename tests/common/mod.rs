//! Shared test utilities for integration tests.
//!
//! `FakeRepository` is an in-process category store with call counters and
//! failure injection. Every operation yields once before touching state so
//! concurrent callers interleave the way they would over a real network.
//! Methods are intentionally broad to support scenarios across test files.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use finsight::cancel::CancellationFlag;
use finsight::clock::ManualClock;
use finsight::error::{AppError, AppResult};
use finsight::models::{CategoryKind, NewCategory, UserCategory};
use finsight::repository::{CategoryRepository, CreateOutcome, RepositoryError};
use finsight::sync_state::{MemorySyncStateStore, SyncStateStore};

/// 2024-01-01T00:00:00Z
pub const T0: i64 = 1_704_067_200_000;

#[derive(Default)]
pub struct FakeRepository {
    categories: Mutex<Vec<UserCategory>>,
    next_id: AtomicUsize,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    fail_list: AtomicBool,
    fail_creates: Mutex<HashSet<String>>,
    cancel_after: Mutex<Option<(usize, CancellationFlag)>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(categories: Vec<UserCategory>) -> Self {
        let repo = Self::new();
        *repo.categories.lock().unwrap() = categories;
        repo
    }

    pub fn categories(&self) -> Vec<UserCategory> {
        self.categories.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.categories.lock().unwrap().len()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn network_calls(&self) -> usize {
        self.list_calls() + self.create_calls()
    }

    pub fn reset_counters(&self) {
        self.list_calls.store(0, Ordering::SeqCst);
        self.create_calls.store(0, Ordering::SeqCst);
    }

    pub fn set_list_failing(&self, failing: bool) {
        self.fail_list.store(failing, Ordering::SeqCst);
    }

    /// Make creation of `name` fail with a server error.
    pub fn fail_create_of(&self, name: &str) {
        self.fail_creates.lock().unwrap().insert(name.to_lowercase());
    }

    /// Raise `flag` once `creates` create calls have been served.
    pub fn cancel_after(&self, creates: usize, flag: CancellationFlag) {
        *self.cancel_after.lock().unwrap() = Some((creates, flag));
    }

    pub fn names_of(&self, kind: CategoryKind) -> Vec<String> {
        self.categories()
            .into_iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name)
            .collect()
    }
}

#[async_trait]
impl CategoryRepository for FakeRepository {
    async fn list(&self, kind: Option<CategoryKind>) -> Result<Vec<UserCategory>, RepositoryError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if self.fail_list.load(Ordering::SeqCst) {
            return Err(RepositoryError::Status {
                status: 503,
                message: "Service unavailable".into(),
            });
        }

        Ok(self
            .categories()
            .into_iter()
            .filter(|c| kind.is_none_or(|k| c.kind == k))
            .collect())
    }

    async fn create(&self, category: &NewCategory) -> Result<CreateOutcome, RepositoryError> {
        let served = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::task::yield_now().await;

        if let Some((after, flag)) = self.cancel_after.lock().unwrap().as_ref() {
            if served >= *after {
                flag.cancel();
            }
        }

        if self
            .fail_creates
            .lock()
            .unwrap()
            .contains(&category.name.to_lowercase())
        {
            return Err(RepositoryError::Status {
                status: 500,
                message: "Internal error".into(),
            });
        }

        let mut categories = self.categories.lock().unwrap();
        if categories.iter().any(|c| c.key() == category.key()) {
            return Ok(CreateOutcome::AlreadyExists);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = UserCategory {
            id: format!("cat-{}", id),
            name: category.name.clone(),
            kind: category.kind,
            icon: category.icon.clone(),
            color: category.color.clone(),
            order: category.order,
            active: true,
            is_default: category.is_default,
            subcategories: Some(category.subcategories.clone()),
            usage_stats: None,
        };
        categories.push(created.clone());
        Ok(CreateOutcome::Created(created))
    }

    async fn update(
        &self,
        id: &str,
        category: &NewCategory,
    ) -> Result<UserCategory, RepositoryError> {
        let mut categories = self.categories.lock().unwrap();
        let existing = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RepositoryError::Status {
                status: 404,
                message: "Category not found".into(),
            })?;
        existing.name = category.name.clone();
        existing.icon = category.icon.clone();
        existing.color = category.color.clone();
        Ok(existing.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.categories.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }
}

/// A state store whose every operation fails, as with a corrupt database.
pub struct BrokenStore;

impl SyncStateStore for BrokenStore {
    fn read(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::Internal("storage unavailable".into()))
    }

    fn write(&self, _key: &str, _value: &str) -> AppResult<()> {
        Err(AppError::Internal("storage unavailable".into()))
    }

    fn remove(&self, _key: &str) -> AppResult<()> {
        Err(AppError::Internal("storage unavailable".into()))
    }
}

pub fn user_category(name: &str, kind: CategoryKind) -> UserCategory {
    UserCategory {
        id: format!("user-{}", name.to_lowercase().replace(' ', "-")),
        name: name.into(),
        kind,
        icon: "folder".into(),
        color: "#6b7280".into(),
        order: 0,
        active: true,
        is_default: false,
        subcategories: None,
        usage_stats: None,
    }
}

pub fn shared_store() -> Arc<MemorySyncStateStore> {
    Arc::new(MemorySyncStateStore::new())
}

pub fn clock_at(millis: i64) -> Arc<ManualClock> {
    Arc::new(ManualClock::new(millis))
}
