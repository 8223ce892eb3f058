//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, data directory).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Another play is still being submitted.
    pub const BUSY: i32 = 5;

    /// Config file unreadable or inconsistent.
    pub const CONFIG: i32 = 6;
}

/// Environment variables read by the CLI.
pub mod env_vars {
    pub const CONFIG: &str = "HEARTLINE_CONFIG";
    pub const DATA_DIR: &str = "HEARTLINE_DATA_DIR";
    pub const LOG: &str = "HEARTLINE_LOG";
    pub const GITHUB_TOKEN: &str = "HEARTLINE_GITHUB_TOKEN";
}

/// Default number of history rows shown.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
