//! Integration tests for the TTL-gated category reconciliation.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use common::{clock_at, shared_store, user_category, BrokenStore, FakeRepository, T0};
use finsight::cancel::CancellationFlag;
use finsight::catalog;
use finsight::clock::ManualClock;
use finsight::models::CategoryKind;
use finsight::sync::{SyncManager, DEFAULT_SYNC_TTL};
use finsight::sync_state::{MemorySyncStateStore, SyncStateStore, LAST_SYNC_KEY};

type Manager = SyncManager<Arc<FakeRepository>, Arc<MemorySyncStateStore>, Arc<ManualClock>>;

fn manager(
    repo: &Arc<FakeRepository>,
    store: &Arc<MemorySyncStateStore>,
    clock: &Arc<ManualClock>,
) -> Manager {
    SyncManager::new(repo.clone(), store.clone(), clock.clone(), CancellationFlag::new())
}

#[tokio::test]
async fn test_should_sync_follows_ttl() {
    let repo = Arc::new(FakeRepository::new());
    let store = shared_store();
    let clock = clock_at(T0);
    let sync = manager(&repo, &store, &clock);

    assert!(sync.should_sync(), "never synced");
    assert!(sync.last_sync_date().is_none());

    assert!(sync.sync_categories(false).await);
    assert!(!sync.should_sync(), "just synced");
    assert_eq!(
        store.read(LAST_SYNC_KEY).unwrap().as_deref(),
        Some(T0.to_string().as_str())
    );
    assert_eq!(sync.last_sync_date().unwrap().timestamp_millis(), T0);

    clock.advance(DEFAULT_SYNC_TTL);
    assert!(!sync.should_sync(), "exactly at the TTL boundary");

    clock.advance(Duration::from_millis(1));
    assert!(sync.should_sync(), "past the TTL");
}

#[tokio::test]
async fn test_not_due_is_a_successful_noop() {
    let repo = Arc::new(FakeRepository::new());
    let store = shared_store();
    let clock = clock_at(T0);
    let sync = manager(&repo, &store, &clock);

    assert!(sync.sync_categories(false).await);
    repo.reset_counters();

    clock.advance(Duration::from_secs(60 * 60));
    assert!(sync.sync_categories(false).await);
    assert_eq!(repo.network_calls(), 0);
    assert_eq!(sync.last_sync_date().unwrap().timestamp_millis(), T0);
}

#[tokio::test]
async fn test_force_ignores_ttl() {
    let repo = Arc::new(FakeRepository::new());
    let store = shared_store();
    let clock = clock_at(T0);
    let sync = manager(&repo, &store, &clock);

    assert!(sync.sync_categories(false).await);
    repo.reset_counters();
    clock.advance(Duration::from_secs(5));

    assert!(sync.sync_categories(true).await);
    assert_eq!(repo.list_calls(), 1);
    assert_eq!(repo.create_calls(), 0);
    assert_eq!(sync.last_sync_date().unwrap().timestamp_millis(), T0 + 5_000);
}

/// Exactly one create per catalog entry without a matching (kind, name).
#[tokio::test]
async fn test_diff_creates_only_missing() {
    let mut inactive = user_category("TRANSPORTATION", CategoryKind::Expense);
    inactive.active = false;
    let existing = vec![
        user_category("food", CategoryKind::Expense),
        user_category("Salary", CategoryKind::Income),
        // Wrong kind: does not cover the expense "Travel".
        user_category("Travel", CategoryKind::Income),
        inactive,
        user_category("Crypto", CategoryKind::Income),
    ];
    let repo = Arc::new(FakeRepository::with_categories(existing.clone()));
    let sync = manager(&repo, &shared_store(), &clock_at(T0));

    assert!(sync.sync_categories(false).await);

    assert_eq!(repo.create_calls(), 20);
    assert_eq!(repo.count(), existing.len() + 20);
    let report = sync.last_report().unwrap();
    assert_eq!(report.created, 20);
    assert_eq!(report.already_existed, 0);
}

/// Existing rows are never modified or removed, even when they collide with
/// catalog names under different casing.
#[tokio::test]
async fn test_sync_never_touches_existing_rows() {
    let mut renamed = user_category("FOOD", CategoryKind::Expense);
    renamed.color = "#123456".into();
    renamed.active = false;
    let custom = user_category("Board Games", CategoryKind::Expense);
    let repo = Arc::new(FakeRepository::with_categories(vec![
        renamed.clone(),
        custom.clone(),
    ]));
    let sync = manager(&repo, &shared_store(), &clock_at(T0));

    assert!(sync.sync_categories(true).await);

    let after = repo.categories();
    assert!(after.contains(&renamed));
    assert!(after.contains(&custom));
    assert_eq!(
        after
            .iter()
            .filter(|c| c.name.eq_ignore_ascii_case("food"))
            .count(),
        1
    );
}

#[tokio::test]
async fn test_complete_set_syncs_without_creates() {
    let complete = catalog::all_definitions()
        .iter()
        .map(|d| user_category(d.name, d.kind))
        .collect();
    let repo = Arc::new(FakeRepository::with_categories(complete));
    let sync = manager(&repo, &shared_store(), &clock_at(T0));

    assert!(sync.sync_categories(false).await);
    assert_eq!(repo.create_calls(), 0);
    assert!(!sync.should_sync());
}

/// A failed list aborts the attempt and keeps the previous timestamp.
#[tokio::test]
async fn test_list_failure_aborts_without_timestamp() {
    let repo = Arc::new(FakeRepository::new());
    let store = shared_store();
    let clock = clock_at(T0);
    let sync = manager(&repo, &store, &clock);

    repo.set_list_failing(true);
    assert!(!sync.sync_categories(false).await);
    assert_eq!(repo.create_calls(), 0);
    assert!(store.last_sync_at().unwrap().is_none());
    assert!(sync.should_sync());
    assert!(!sync.is_syncing());

    repo.set_list_failing(false);
    assert!(sync.sync_categories(false).await);
    assert_eq!(repo.count(), 23);
}

/// Individual create failures are tolerated and the timestamp still moves.
#[tokio::test]
async fn test_partial_failure_still_records_sync() {
    let repo = Arc::new(FakeRepository::new());
    repo.fail_create_of("Pets");
    let store = shared_store();
    let clock = clock_at(T0);
    let sync = manager(&repo, &store, &clock);

    assert!(sync.sync_categories(false).await);
    assert_eq!(repo.count(), 22);
    assert_eq!(store.last_sync_at().unwrap(), Some(T0));

    // The next due sync picks up the one that failed.
    clock.advance(DEFAULT_SYNC_TTL + Duration::from_secs(1));
    repo.reset_counters();
    assert!(sync.sync_categories(false).await);
    assert_eq!(repo.create_calls(), 1);
    assert_eq!(sync.last_report().unwrap().failed.len(), 1);
}

/// A second call while the first is in flight returns false and issues no
/// network calls of its own.
#[tokio::test]
async fn test_concurrent_sync_is_rejected() {
    let repo = Arc::new(FakeRepository::new());
    let sync = manager(&repo, &shared_store(), &clock_at(T0));

    let (first, second) = tokio::join!(sync.sync_categories(false), async {
        tokio::task::yield_now().await;
        let busy = sync.is_syncing();
        let calls_before = repo.network_calls();
        let result = sync.sync_categories(true).await;
        (busy, result, repo.network_calls() - calls_before)
    });

    assert!(first);
    let (busy, result, extra_calls) = second;
    assert!(busy);
    assert!(!result);
    assert_eq!(extra_calls, 0);

    assert_eq!(repo.list_calls(), 1);
    assert_eq!(repo.create_calls(), 23);
    assert!(!sync.is_syncing());
}

#[tokio::test]
async fn test_force_clear_sync_makes_sync_due() {
    let repo = Arc::new(FakeRepository::new());
    let store = shared_store();
    let sync = manager(&repo, &store, &clock_at(T0));

    assert!(sync.sync_categories(false).await);
    assert!(!sync.should_sync());

    sync.force_clear_sync().unwrap();
    assert!(sync.should_sync());
    assert!(sync.last_sync_date().is_none());
}

#[tokio::test]
async fn test_custom_ttl() {
    let repo = Arc::new(FakeRepository::new());
    let clock = clock_at(T0);
    let sync = manager(&repo, &shared_store(), &clock).with_ttl(Duration::from_secs(60));

    assert!(sync.sync_categories(false).await);
    clock.advance(Duration::from_secs(61));
    assert!(sync.should_sync());
}

/// A TTL too large for epoch millis never expires.
#[tokio::test]
async fn test_huge_ttl_never_expires() {
    let repo = Arc::new(FakeRepository::new());
    let clock = clock_at(T0);
    let sync = manager(&repo, &shared_store(), &clock).with_ttl(Duration::MAX);

    assert!(sync.sync_categories(false).await);
    clock.advance(Duration::from_secs(100 * 365 * 24 * 60 * 60));
    assert!(!sync.should_sync());
    assert!(sync.sync_categories(false).await);
    assert_eq!(repo.list_calls(), 1);
}

/// Unreadable storage means "never synced", so every check syncs.
#[tokio::test]
async fn test_storage_failure_counts_as_never_synced() {
    let repo = Arc::new(FakeRepository::new());
    let sync = SyncManager::new(
        repo.clone(),
        BrokenStore,
        clock_at(T0),
        CancellationFlag::new(),
    );

    assert!(sync.should_sync());
    assert!(sync.sync_categories(false).await);
    assert!(sync.should_sync());
    assert!(sync.last_sync_date().is_none());
    assert!(sync.force_clear_sync().is_err());
}

/// Cancellation stops the batch and leaves the timestamp untouched.
#[tokio::test]
async fn test_cancelled_sync_returns_false() {
    let repo = Arc::new(FakeRepository::new());
    let store = shared_store();
    let cancel = CancellationFlag::new();
    repo.cancel_after(3, cancel.clone());
    let sync = SyncManager::new(repo.clone(), store.clone(), clock_at(T0), cancel.clone());

    assert!(!sync.sync_categories(false).await);
    assert_eq!(repo.count(), 3);
    assert!(store.last_sync_at().unwrap().is_none());
    assert!(sync.last_report().unwrap().cancelled);

    cancel.reset();
    assert!(sync.sync_categories(false).await);
    let keys: HashSet<_> = repo.categories().iter().map(|c| c.key()).collect();
    assert_eq!(keys.len(), 23);
    assert_eq!(repo.count(), 23);
}
