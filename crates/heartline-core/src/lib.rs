//! # Heartline Core
//!
//! Core library for Heartline - a name-compatibility game that keeps a local
//! play history per device and contributes every play to a shared ledger of
//! aggregate statistics.
//!
//! This crate provides the synchronization layer, storage abstractions, and
//! data models independent of any user interface.
//!
//! ## Architecture
//!
//! - **identity**: stable per-installation device identifier
//! - **history**: bounded local play history
//! - **remote**: versioned document stores and the shared ledger client
//! - **sync**: optimistic-concurrency merge with local-only fallback
//! - **score**: compatibility score and verdicts
//! - **game**: the two calls a presentation layer makes
//! - **storage**: device-local key-value backends

pub mod error;
pub mod fs;
pub mod game;
pub mod history;
pub mod identity;
pub mod remote;
pub mod score;
pub mod storage;
pub mod sync;
pub mod types;

pub use error::{HeartlineError, Result};
pub use game::{Game, PlayResult};
pub use remote::{DocumentStore, RemoteLedgerClient, VersionToken};
pub use storage::{KeyValueStore, Namespace};
pub use sync::{FallbackReason, LedgerSynchronizer, StatsSource, SyncPolicy, SyncReport};
pub use types::{LedgerStats, LocalHistory, PlayRecord, SharedLedger};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
