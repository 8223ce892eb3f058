use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use heartline_core::VERSION;

/// Heartline - name compatibility game with a shared play ledger
#[derive(Parser)]
#[command(name = "heartline")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding this device's identity and history
    #[arg(long, global = true, env = "HEARTLINE_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<String>,

    /// Skip the shared ledger and use local statistics only
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use ASCII symbols instead of unicode
    #[arg(long, global = true)]
    pub ascii: bool,
}

/// Shared ledger backend choice for `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    None,
    Local,
    Github,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Shared ledger backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Directory for the `local` backend's shared ledger
    #[arg(long, value_name = "DIR")]
    pub shared_dir: Option<String>,

    /// GitHub repository as OWNER/REPO (github backend)
    #[arg(long, value_name = "OWNER/REPO")]
    pub github_repo: Option<String>,

    /// Branch to commit plays to (github backend)
    #[arg(long)]
    pub github_branch: Option<String>,

    /// Environment variable holding the GitHub token
    #[arg(long, value_name = "VAR")]
    pub token_env: Option<String>,

    /// Path of the shared document
    #[arg(long, value_name = "KEY")]
    pub document_key: Option<String>,

    /// Set timezone for displaying history
    #[arg(long)]
    pub timezone: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Output flags shared by read commands
#[derive(Args, Clone, Default)]
pub struct OutputArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Output format (pretty, plain)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,
}

/// Arguments for the `play` command
#[derive(Args)]
pub struct PlayArgs {
    /// First name
    #[arg(value_name = "NAME1")]
    pub name1: Option<String>,

    /// Second name
    #[arg(value_name = "NAME2")]
    pub name2: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `history` command
#[derive(Args)]
pub struct HistoryArgs {
    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `stats` command
#[derive(Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `device` command
#[derive(Args)]
pub struct DeviceArgs {
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a config file and choose a shared ledger backend
    Init(InitArgs),

    /// Score two names and record the play
    Play(PlayArgs),

    /// Show this device's recent plays
    History(HistoryArgs),

    /// Show total plays and unique devices
    Stats(StatsArgs),

    /// Show this installation's device identifier
    Device(DeviceArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
