//! Ledger synchronizer.
//!
//! Merges plays into the shared ledger with optimistic concurrency:
//!
//! 1. fetch the ledger and its version token
//! 2. merge the play locally and recompute stats
//! 3. write back with the token; on `Conflict` start over from 1
//!
//! When the remote is unreachable, times out, or keeps conflicting past the
//! attempt limit, the synchronizer reports statistics computed from this
//! device's local history instead. It never returns an error.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Serialize;

use crate::history::LocalHistoryCache;
use crate::remote::client::play_message;
use crate::remote::{RemoteLedgerClient, VersionToken};
use crate::types::{LedgerStats, LocalHistory, PlayRecord, SharedLedger};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Retry and timeout limits for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Total read-merge-write cycles before falling back (at least 1)
    pub max_attempts: u32,
    /// Wall-clock budget for the whole submission
    pub deadline: Option<Duration>,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            deadline: None,
        }
    }
}

impl SyncPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Why local-only statistics were reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    Unreachable,
    TimedOut,
    ConflictRetriesExhausted,
}

impl FallbackReason {
    pub fn describe(&self) -> &'static str {
        match self {
            FallbackReason::Unreachable => "shared ledger unreachable",
            FallbackReason::TimedOut => "shared ledger timed out",
            FallbackReason::ConflictRetriesExhausted => "too many concurrent updates",
        }
    }
}

/// Where reported statistics came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum StatsSource {
    /// Computed from the shared ledger at `version` (`None` if not created yet)
    Shared { version: Option<VersionToken> },
    /// Computed from this device's history only
    LocalOnly { reason: FallbackReason },
}

/// Outcome of a submission or a statistics read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub stats: LedgerStats,
    #[serde(flatten)]
    pub source: StatsSource,
    /// Read-merge-write cycles started
    pub attempts: u32,
    /// Whether the play was newly recorded in the shared ledger
    pub recorded: bool,
}

impl SyncReport {
    pub fn is_shared(&self) -> bool {
        matches!(self.source, StatsSource::Shared { .. })
    }

    fn local_only(history: &LocalHistory, reason: FallbackReason, attempts: u32) -> Self {
        Self {
            stats: history.local_stats(),
            source: StatsSource::LocalOnly { reason },
            attempts,
            recorded: false,
        }
    }
}

pub struct LedgerSynchronizer {
    client: RemoteLedgerClient,
    history: LocalHistoryCache,
    policy: SyncPolicy,
}

impl LedgerSynchronizer {
    pub fn new(client: RemoteLedgerClient, history: LocalHistoryCache) -> Self {
        Self::with_policy(client, history, SyncPolicy::default())
    }

    pub fn with_policy(
        client: RemoteLedgerClient,
        history: LocalHistoryCache,
        policy: SyncPolicy,
    ) -> Self {
        Self {
            client,
            history,
            policy,
        }
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    pub fn remote(&self) -> &RemoteLedgerClient {
        &self.client
    }

    /// This device's history, most recent first.
    pub fn history(&self) -> LocalHistory {
        self.history.load()
    }

    /// Record a play locally and merge it into the shared ledger.
    pub fn submit_play(&self, record: &PlayRecord) -> SyncReport {
        let history = self.history.append(record);
        let started = Instant::now();
        let max_attempts = self.policy.max_attempts.max(1);
        let message = play_message(record);

        for attempt in 1..=max_attempts {
            if self.deadline_passed(started) {
                warn!("Submission exceeded its deadline after {} attempt(s)", attempt - 1);
                return SyncReport::local_only(&history, FallbackReason::TimedOut, attempt - 1);
            }

            let (original, version) = match self.client.fetch_ledger() {
                Ok(Some(fetched)) => (fetched.ledger, Some(fetched.version)),
                Ok(None) => (SharedLedger::new(), None),
                Err(err) => {
                    warn!("Falling back to local statistics: {}", err);
                    return SyncReport::local_only(&history, FallbackReason::Unreachable, attempt);
                }
            };

            let mut ledger = original.clone();
            let recorded = ledger.merge_play(record);
            if !recorded && ledger == original {
                if let Some(current) = version.as_ref() {
                    debug!("Play already in shared ledger at {}, skipping write", current);
                    return SyncReport {
                        stats: ledger.stats,
                        source: StatsSource::Shared {
                            version: Some(current.clone()),
                        },
                        attempts: attempt,
                        recorded: false,
                    };
                }
            }

            match self.client.write_ledger(&ledger, version.as_ref(), &message) {
                Ok(new_version) => {
                    debug!(
                        "Merged play into {} on attempt {}",
                        self.client.describe(),
                        attempt
                    );
                    return SyncReport {
                        stats: ledger.stats,
                        source: StatsSource::Shared {
                            version: Some(new_version),
                        },
                        attempts: attempt,
                        recorded,
                    };
                }
                Err(err) if err.is_retryable() => {
                    info!(
                        "Attempt {}/{} lost a race on {}: {}",
                        attempt,
                        max_attempts,
                        self.client.key(),
                        err
                    );
                }
                Err(err) => {
                    warn!("Falling back to local statistics: {}", err);
                    return SyncReport::local_only(&history, FallbackReason::Unreachable, attempt);
                }
            }
        }

        warn!(
            "Giving up on {} after {} conflicting attempts",
            self.client.key(),
            max_attempts
        );
        SyncReport::local_only(
            &history,
            FallbackReason::ConflictRetriesExhausted,
            max_attempts,
        )
    }

    /// Read current statistics without writing.
    pub fn current_stats(&self) -> SyncReport {
        match self.client.fetch_ledger() {
            Ok(Some(mut fetched)) => {
                fetched.ledger.recompute_stats();
                SyncReport {
                    stats: fetched.ledger.stats,
                    source: StatsSource::Shared {
                        version: Some(fetched.version),
                    },
                    attempts: 1,
                    recorded: false,
                }
            }
            Ok(None) => SyncReport {
                stats: LedgerStats::default(),
                source: StatsSource::Shared { version: None },
                attempts: 1,
                recorded: false,
            },
            Err(err) => {
                warn!("Showing local statistics: {}", err);
                SyncReport::local_only(&self.history.load(), FallbackReason::Unreachable, 1)
            }
        }
    }

    fn deadline_passed(&self, started: Instant) -> bool {
        self.policy
            .deadline
            .map(|limit| started.elapsed() >= limit)
            .unwrap_or(false)
    }
}
