use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use syncscript_storage::{
    MemoryAdapter, PersistenceAdapter, RetryPolicy, StorageError, StorageResult, save_with_retry,
};
use syncscript_types::{Namespace, StorageKey};

fn key() -> StorageKey {
    Namespace::new("test").unwrap().key("calls").unwrap()
}

/// Fails the first `failures` saves with an IO error.
struct FlakyAdapter {
    failures: u32,
    calls: AtomicU32,
    inner: MemoryAdapter,
}

impl FlakyAdapter {
    fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
            inner: MemoryAdapter::new(),
        }
    }
}

impl PersistenceAdapter for FlakyAdapter {
    fn name(&self) -> &'static str {
        "flaky"
    }

    fn load(&self, key: &StorageKey) -> StorageResult<Option<String>> {
        self.inner.load(key)
    }

    fn save(&self, key: &StorageKey, value: &str) -> StorageResult<()> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            return Err(std::io::Error::other("disk busy").into());
        }
        self.inner.save(key, value)
    }

    fn remove(&self, key: &StorageKey) -> StorageResult<()> {
        self.inner.remove(key)
    }
}

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff_ms: 1,
        max_backoff_ms: 2,
    }
}

#[test]
fn backoff_doubles_and_caps() {
    let policy = RetryPolicy {
        max_attempts: 5,
        initial_backoff_ms: 100,
        max_backoff_ms: 350,
    };
    assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
    assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
    assert_eq!(policy.backoff_for(3), Duration::from_millis(350));
    assert_eq!(policy.backoff_for(80), Duration::from_millis(350));
}

#[test]
fn default_policy() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(RetryPolicy::none().max_attempts, 1);
}

#[tokio::test]
async fn succeeds_first_try() {
    let adapter = FlakyAdapter::new(0);
    let attempts = save_with_retry(&adapter, &key(), "v", &fast_policy(3)).await.unwrap();
    assert_eq!(attempts, 1);
}

#[tokio::test]
async fn retries_transient_failures() {
    let adapter = FlakyAdapter::new(2);
    let attempts = save_with_retry(&adapter, &key(), "v", &fast_policy(3)).await.unwrap();
    assert_eq!(attempts, 3);
    assert_eq!(adapter.load(&key()).unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let adapter = FlakyAdapter::new(10);
    let err = save_with_retry(&adapter, &key(), "v", &fast_policy(3)).await.unwrap_err();
    assert!(matches!(err, StorageError::Io(_)));
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn does_not_retry_quota_errors() {
    let adapter = MemoryAdapter::new().with_max_value_bytes(Some(1));
    let err = save_with_retry(&adapter, &key(), "long", &fast_policy(5)).await.unwrap_err();
    assert!(matches!(err, StorageError::QuotaExceeded { .. }));
}

#[tokio::test]
async fn zero_attempts_still_tries_once() {
    let adapter = FlakyAdapter::new(0);
    assert_eq!(
        save_with_retry(&adapter, &key(), "v", &fast_policy(0)).await.unwrap(),
        1
    );
}
