//! Command handlers, one module per subcommand group.

pub mod history;
pub mod init;
pub mod misc;
pub mod play;
pub mod stats;
