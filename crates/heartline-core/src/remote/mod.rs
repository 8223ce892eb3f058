//! Shared ledger transport.
//!
//! - **traits**: [`DocumentStore`], [`VersionToken`], and the always-offline store
//! - **client**: [`RemoteLedgerClient`], JSON encoding of the ledger
//! - **memory**: in-process store for tests and demos
//! - **kv**: store over any [`crate::storage::KeyValueStore`] shared namespace
//! - **github**: GitHub contents API

pub mod client;
pub mod github;
pub mod kv;
pub mod memory;
pub mod traits;

pub use client::{RemoteLedgerClient, VersionedLedger, DEFAULT_DOCUMENT_KEY};
pub use github::{GitHubConfig, GitHubContentsStore};
pub use kv::KvDocumentStore;
pub use memory::MemoryDocumentStore;
pub use traits::{DocumentStore, OfflineStore, StoredDocument, VersionToken};
