//! Application-level utilities for the Heartline CLI.
//!
//! This module provides:
//! - Path resolution for config and data directories
//! - Backend wiring from the `[remote]` config section
//! - The lazily-initialized application context

mod backend;
mod context;
mod resolver;

// Re-export public API
pub use context::AppContext;
pub use resolver::{resolve_config_path, resolve_data_dir};
