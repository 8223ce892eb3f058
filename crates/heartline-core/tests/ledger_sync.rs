use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use heartline_core::history::LocalHistoryCache;
use heartline_core::remote::client::encode_ledger;
use heartline_core::remote::{
    DocumentStore, KvDocumentStore, MemoryDocumentStore, RemoteLedgerClient, StoredDocument,
    DEFAULT_DOCUMENT_KEY,
};
use heartline_core::storage::{FileStore, MemoryStore};
use heartline_core::{
    FallbackReason, HeartlineError, LedgerStats, LedgerSynchronizer, PlayRecord, Result,
    SharedLedger, StatsSource, SyncPolicy, VersionToken,
};

fn synchronizer(store: Arc<dyn DocumentStore>) -> LedgerSynchronizer {
    LedgerSynchronizer::new(
        RemoteLedgerClient::new(store),
        LocalHistoryCache::new(Arc::new(MemoryStore::new())),
    )
}

fn shared_ledger(store: &dyn DocumentStore) -> SharedLedger {
    let doc = store
        .fetch(DEFAULT_DOCUMENT_KEY)
        .expect("fetch should succeed")
        .expect("ledger should exist");
    serde_json::from_slice(&doc.bytes).expect("ledger should parse")
}

/// Lets another device write a play right before this device's first put.
struct RacingStore {
    inner: Arc<MemoryDocumentStore>,
    rival: PlayRecord,
    raced: AtomicUsize,
}

impl DocumentStore for RacingStore {
    fn fetch(&self, key: &str) -> Result<Option<StoredDocument>> {
        self.inner.fetch(key)
    }

    fn put(
        &self,
        key: &str,
        bytes: &[u8],
        expected: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken> {
        if self.raced.fetch_add(1, Ordering::SeqCst) == 0 {
            let current = self.inner.fetch(key)?;
            let mut ledger = match &current {
                Some(doc) => serde_json::from_slice(&doc.bytes)?,
                None => SharedLedger::new(),
            };
            ledger.merge_play(&self.rival);
            let rival_bytes = encode_ledger(&ledger)?;
            self.inner.put(
                key,
                &rival_bytes,
                current.as_ref().map(|doc| &doc.version),
                "rival",
            )?;
        }
        self.inner.put(key, bytes, expected, message)
    }

    fn describe(&self) -> String {
        "racing".to_string()
    }
}

/// Every write loses.
struct AlwaysConflict(MemoryDocumentStore);

impl DocumentStore for AlwaysConflict {
    fn fetch(&self, key: &str) -> Result<Option<StoredDocument>> {
        self.0.fetch(key)
    }

    fn put(
        &self,
        _key: &str,
        _bytes: &[u8],
        _expected: Option<&VersionToken>,
        _message: &str,
    ) -> Result<VersionToken> {
        Err(HeartlineError::Conflict("stale version".to_string()))
    }

    fn describe(&self) -> String {
        "always-conflict".to_string()
    }
}

/// Reads work, writes fail with a transport error.
struct ReadOnlyOutage(MemoryDocumentStore);

impl DocumentStore for ReadOnlyOutage {
    fn fetch(&self, key: &str) -> Result<Option<StoredDocument>> {
        self.0.fetch(key)
    }

    fn put(
        &self,
        _key: &str,
        _bytes: &[u8],
        _expected: Option<&VersionToken>,
        _message: &str,
    ) -> Result<VersionToken> {
        Err(HeartlineError::Unreachable("connection reset".to_string()))
    }

    fn describe(&self) -> String {
        "read-only".to_string()
    }
}

#[test]
fn test_two_devices_share_one_ledger() {
    let store = Arc::new(MemoryDocumentStore::new());
    let d1 = synchronizer(store.clone());
    let d2 = synchronizer(store.clone());

    let first = d1.submit_play(&PlayRecord::new("Alice", "Bob", 42, "device-1"));
    assert_eq!(first.stats, LedgerStats::new(1, 1));

    let second = d2.submit_play(&PlayRecord::new("Carol", "Dan", 77, "device-2"));
    assert!(second.is_shared());
    assert_eq!(second.stats, LedgerStats::new(2, 2));

    let ledger = shared_ledger(store.as_ref());
    assert_eq!(ledger.devices, vec!["device-1", "device-2"]);
    assert!(ledger.is_consistent());

    // each device keeps only its own history
    assert_eq!(d1.history().len(), 1);
    assert_eq!(d2.history().latest().unwrap().first_name, "Carol");

    assert_eq!(d1.current_stats().stats, LedgerStats::new(2, 2));
    assert_eq!(
        store.messages(),
        vec![
            "New play: Alice ❤️ Bob = 42%".to_string(),
            "New play: Carol ❤️ Dan = 77%".to_string(),
        ]
    );
}

#[test]
fn test_conflict_is_retried_and_both_plays_survive() {
    let inner = Arc::new(MemoryDocumentStore::new());
    let racing = Arc::new(RacingStore {
        inner: inner.clone(),
        rival: PlayRecord::new("Eve", "Frank", 12, "device-rival"),
        raced: AtomicUsize::new(0),
    });
    let sync = synchronizer(racing);

    let report = sync.submit_play(&PlayRecord::new("Alice", "Bob", 42, "device-1"));

    assert!(report.is_shared());
    assert!(report.recorded);
    assert_eq!(report.attempts, 2);
    assert_eq!(report.stats, LedgerStats::new(2, 2));

    let ledger = shared_ledger(inner.as_ref());
    assert_eq!(ledger.plays.len(), 2);
    assert_eq!(ledger.devices, vec!["device-rival", "device-1"]);
}

#[test]
fn test_unreachable_remote_falls_back_without_writing() {
    let store = Arc::new(MemoryDocumentStore::new());
    store.set_offline(true);
    let sync = synchronizer(store.clone());

    let report = sync.submit_play(&PlayRecord::new("Alice", "Bob", 42, "device-1"));

    assert_eq!(
        report.source,
        StatsSource::LocalOnly {
            reason: FallbackReason::Unreachable
        }
    );
    assert_eq!(report.stats, LedgerStats::new(1, 1));
    assert_eq!(store.put_count(), 0);
    assert_eq!(sync.history().len(), 1);

    // once back online the next play lands in the shared ledger
    store.set_offline(false);
    let report = sync.submit_play(&PlayRecord::new("Carol", "Dan", 50, "device-1"));
    assert!(report.is_shared());
    assert_eq!(report.stats, LedgerStats::new(1, 1));
}

#[test]
fn test_failed_write_falls_back_after_one_attempt() {
    let sync = synchronizer(Arc::new(ReadOnlyOutage(MemoryDocumentStore::new())));
    let report = sync.submit_play(&PlayRecord::new("Alice", "Bob", 42, "device-1"));

    assert_eq!(report.attempts, 1);
    assert_eq!(
        report.source,
        StatsSource::LocalOnly {
            reason: FallbackReason::Unreachable
        }
    );
}

#[test]
fn test_conflicts_past_attempt_limit_fall_back() {
    let sync = synchronizer(Arc::new(AlwaysConflict(MemoryDocumentStore::new())));
    let report = sync.submit_play(&PlayRecord::new("Alice", "Bob", 42, "device-1"));

    assert_eq!(report.attempts, 3);
    assert!(!report.recorded);
    assert_eq!(
        report.source,
        StatsSource::LocalOnly {
            reason: FallbackReason::ConflictRetriesExhausted
        }
    );
    assert_eq!(report.stats, LedgerStats::new(1, 1));
}

#[test]
fn test_attempt_limit_is_configurable() {
    let sync = LedgerSynchronizer::with_policy(
        RemoteLedgerClient::new(Arc::new(AlwaysConflict(MemoryDocumentStore::new()))),
        LocalHistoryCache::new(Arc::new(MemoryStore::new())),
        SyncPolicy::new(5),
    );
    let report = sync.submit_play(&PlayRecord::new("Alice", "Bob", 42, "device-1"));
    assert_eq!(report.attempts, 5);
}

#[test]
fn test_corrupt_remote_document_is_replaced() {
    let store = Arc::new(MemoryDocumentStore::new());
    store
        .put(DEFAULT_DOCUMENT_KEY, b"{not json", None, "garbage")
        .expect("seed should succeed");
    let sync = synchronizer(store.clone());

    let report = sync.submit_play(&PlayRecord::new("Alice", "Bob", 42, "device-1"));

    assert!(report.is_shared());
    assert_eq!(report.stats, LedgerStats::new(1, 1));
    assert!(shared_ledger(store.as_ref()).is_consistent());
}

#[test]
fn test_file_backed_stores_persist_across_instances() {
    let dir = tempfile::tempdir().expect("tempdir should be created");

    let open = || {
        let local = Arc::new(FileStore::open(dir.path().join("device")).expect("open local"));
        let shared = Arc::new(FileStore::open(dir.path().join("shared")).expect("open shared"));
        LedgerSynchronizer::new(
            RemoteLedgerClient::new(Arc::new(KvDocumentStore::new(shared))),
            LocalHistoryCache::new(local),
        )
    };

    open().submit_play(&PlayRecord::new("Alice", "Bob", 42, "device-1"));
    let reopened = open();

    assert_eq!(reopened.history().len(), 1);
    let report = reopened.submit_play(&PlayRecord::new("Carol", "Dan", 60, "device-2"));
    assert_eq!(report.stats, LedgerStats::new(2, 2));
    assert_eq!(reopened.current_stats().stats, LedgerStats::new(2, 2));
}

#[test]
fn test_racing_devices_on_one_shared_directory_keep_every_acknowledged_play() {
    let dir = tempfile::tempdir().expect("tempdir");
    let devices = 6;
    let rounds = 5;
    let barrier = Arc::new(std::sync::Barrier::new(devices));

    let handles: Vec<_> = (0..devices)
        .map(|i| {
            let root = dir.path().to_path_buf();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                let local = Arc::new(
                    FileStore::open(root.join(format!("device-{}", i))).expect("open local"),
                );
                let shared = Arc::new(FileStore::open(root.join("shared")).expect("open shared"));
                let sync = LedgerSynchronizer::with_policy(
                    RemoteLedgerClient::new(Arc::new(KvDocumentStore::new(shared))),
                    LocalHistoryCache::new(local),
                    SyncPolicy::new(64),
                );

                let mut acknowledged = 0;
                for round in 0..rounds {
                    barrier.wait();
                    let record = PlayRecord::new(
                        format!("Name{}", i),
                        format!("Round{}", round),
                        50,
                        format!("device-{}", i),
                    );
                    let report = sync.submit_play(&record);
                    if report.recorded && report.is_shared() {
                        acknowledged += 1;
                    }
                }
                acknowledged
            })
        })
        .collect();

    let acknowledged: u64 = handles
        .into_iter()
        .map(|h| h.join().expect("device thread"))
        .sum();

    let shared = KvDocumentStore::new(Arc::new(
        FileStore::open(dir.path().join("shared")).expect("open shared"),
    ));
    let ledger = shared_ledger(&shared);
    assert_eq!(ledger.stats.total_plays, acknowledged);
    assert_eq!(acknowledged, (devices * rounds) as u64);
    assert_eq!(ledger.stats.unique_devices, devices as u64);
}
