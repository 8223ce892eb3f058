//! Device-local persistence.
//!
//! - **traits**: the [`KeyValueStore`] interface and [`Namespace`] selector
//! - **memory**: in-process backend
//! - **file**: directory-backed backend with atomic writes

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::{KeyLock, KeyValueStore, Namespace};
