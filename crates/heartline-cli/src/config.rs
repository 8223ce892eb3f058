use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use heartline_core::remote::DEFAULT_DOCUMENT_KEY;
use heartline_core::sync::DEFAULT_MAX_ATTEMPTS;

use crate::constants::env_vars;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartlineConfig {
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub remote: RemoteSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubSection>,
    #[serde(default)]
    pub ui: UiSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageSection {
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSection {
    pub backend: Backend,
    #[serde(default = "default_document_key")]
    pub document_key: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Directory for the `local` backend; defaults to the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_dir: Option<String>,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            backend: Backend::None,
            document_key: default_document_key(),
            timeout_seconds: default_timeout_seconds(),
            max_attempts: default_max_attempts(),
            shared_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSection {
    pub owner: String,
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

impl GitHubSection {
    /// Name of the environment variable holding the token.
    pub fn token_env(&self) -> &str {
        self.token_env.as_deref().unwrap_or(env_vars::GITHUB_TOKEN)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiSection {
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    None,
    Local,
    Github,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::None => "none",
            Backend::Local => "local",
            Backend::Github => "github",
        }
    }
}

fn default_document_key() -> String {
    DEFAULT_DOCUMENT_KEY.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl HeartlineConfig {
    pub fn new(data_dir: PathBuf, backend: Backend, timezone: Option<String>) -> Self {
        Self {
            storage: StorageSection {
                data_dir: Some(data_dir.to_string_lossy().to_string()),
            },
            remote: RemoteSection {
                backend,
                ..RemoteSection::default()
            },
            github: None,
            ui: UiSection { timezone },
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_data_dir() -> anyhow::Result<PathBuf> {
    xdg_data_dir()
}

pub fn read_config(path: &Path) -> anyhow::Result<HeartlineConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &HeartlineConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("heartline"));
        }
    }
    Ok(home_dir()?.join(".config").join("heartline"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("heartline"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("heartline"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
