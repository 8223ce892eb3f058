//! Entry point for presentation layers.
//!
//! [`Game`] wires the device identity, the score engine, and the ledger
//! synchronizer together behind two calls: [`Game::play`] and
//! [`Game::history`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::error::{HeartlineError, Result};
use crate::history::LocalHistoryCache;
use crate::identity::DeviceIdentityProvider;
use crate::remote::RemoteLedgerClient;
use crate::score::{score, validate_names, Verdict};
use crate::storage::KeyValueStore;
use crate::sync::{LedgerSynchronizer, SyncPolicy, SyncReport};
use crate::types::{DeviceId, LocalHistory, PlayRecord};

/// Everything a presentation layer needs to render one play.
#[derive(Debug, Clone, Serialize)]
pub struct PlayResult {
    pub record: PlayRecord,
    pub verdict: Verdict,
    #[serde(flatten)]
    pub report: SyncReport,
}

impl PlayResult {
    pub fn percentage(&self) -> u8 {
        self.record.percentage
    }
}

pub struct Game {
    device_id: DeviceId,
    sync: LedgerSynchronizer,
    rng: Mutex<StdRng>,
    busy: AtomicBool,
}

/// Clears the busy flag when a submission ends, including on panic.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Game {
    pub fn new(
        local: Arc<dyn KeyValueStore>,
        remote: RemoteLedgerClient,
        policy: SyncPolicy,
    ) -> Self {
        let device_id = DeviceIdentityProvider::new(local.clone()).get_or_create();
        let sync = LedgerSynchronizer::with_policy(remote, LocalHistoryCache::new(local), policy);
        Self {
            device_id,
            sync,
            rng: Mutex::new(StdRng::from_os_rng()),
            busy: AtomicBool::new(false),
        }
    }

    /// Replace the jitter source, e.g. with a seeded generator.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn synchronizer(&self) -> &LedgerSynchronizer {
        &self.sync
    }

    /// Whether a submission is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Score two names, record the play, and sync it.
    ///
    /// # Errors
    ///
    /// Returns `HeartlineError::InvalidInput` if either name is blank and
    /// `HeartlineError::Busy` if another submission has not finished. Remote
    /// failures never surface here; they show up as local-only statistics.
    pub fn play(&self, name1: &str, name2: &str) -> Result<PlayResult> {
        let (first, second) = validate_names(name1, name2)?;

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(HeartlineError::Busy(
                "A play is already being submitted".to_string(),
            ));
        }
        let _guard = BusyGuard(&self.busy);

        let percentage = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| HeartlineError::Other("Random source poisoned".to_string()))?;
            score(first, second, &mut *rng)
        };

        let record = PlayRecord::new(first, second, percentage, self.device_id.clone());
        let report = self.sync.submit_play(&record);

        Ok(PlayResult {
            verdict: Verdict::from_percentage(percentage),
            record,
            report,
        })
    }

    /// This device's recent plays, most recent first.
    pub fn history(&self) -> LocalHistory {
        self.sync.history()
    }

    /// Current statistics, shared if reachable.
    pub fn stats(&self) -> SyncReport {
        self.sync.current_stats()
    }
}
