//! Maps the `[remote]` config section onto a document store.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use heartline_core::remote::{
    DocumentStore, GitHubConfig, GitHubContentsStore, KvDocumentStore, OfflineStore,
    RemoteLedgerClient,
};
use heartline_core::storage::{FileStore, KeyValueStore};
use heartline_core::SyncPolicy;
use log::{debug, warn};

use crate::config::{Backend, HeartlineConfig};
use crate::errors::CliError;

/// Build the remote ledger client for `config`.
///
/// `local` is reused as the shared store of the `local` backend unless
/// `remote.shared_dir` points elsewhere.
pub fn ledger_client(
    config: &HeartlineConfig,
    local: Arc<FileStore>,
    offline: bool,
) -> anyhow::Result<RemoteLedgerClient> {
    let backend = if offline {
        Backend::None
    } else {
        config.remote.backend
    };
    let store = document_store(config, backend, local)?;
    debug!("Shared ledger backend: {}", store.describe());
    Ok(RemoteLedgerClient::with_key(
        store,
        config.remote.document_key.clone(),
    ))
}

fn document_store(
    config: &HeartlineConfig,
    backend: Backend,
    local: Arc<FileStore>,
) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match backend {
        Backend::None => Ok(Arc::new(OfflineStore)),
        Backend::Local => {
            let shared: Arc<dyn KeyValueStore> = match config.remote.shared_dir.as_deref() {
                Some(dir) => Arc::new(FileStore::open(Path::new(dir))?),
                None => local,
            };
            Ok(Arc::new(KvDocumentStore::new(shared)))
        }
        Backend::Github => {
            let section = config.github.as_ref().ok_or_else(|| {
                CliError::config_with_hint(
                    "Backend `github` needs a [github] section",
                    "Hint: Run `heartline init --backend github --github-repo OWNER/REPO`.",
                )
            })?;
            let mut github = GitHubConfig::new(&section.owner, &section.repo)
                .with_timeout(Duration::from_secs(config.remote.timeout_seconds));
            if let Some(branch) = &section.branch {
                github = github.with_branch(branch);
            }
            if let Some(api_base) = &section.api_base {
                github = github.with_api_base(api_base);
            }
            match std::env::var(section.token_env()) {
                Ok(token) if !token.trim().is_empty() => github = github.with_token(token.trim()),
                _ => warn!(
                    "{} is not set; writes to {}/{} will be rejected",
                    section.token_env(),
                    section.owner,
                    section.repo
                ),
            }
            Ok(Arc::new(GitHubContentsStore::new(github)?))
        }
    }
}

/// Retry policy from `[remote]`.
///
/// The overall deadline allows one fetch and one write per attempt.
pub fn sync_policy(config: &HeartlineConfig) -> SyncPolicy {
    let attempts = config.remote.max_attempts.max(1);
    let per_request = config.remote.timeout_seconds.max(1);
    SyncPolicy::new(attempts)
        .with_deadline(Duration::from_secs(per_request * 2 * u64::from(attempts)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GitHubSection;

    fn config(backend: Backend) -> HeartlineConfig {
        HeartlineConfig::new("/unused".into(), backend, None)
    }

    fn local_store() -> (tempfile::TempDir, Arc<FileStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::open(dir.path()).unwrap());
        (dir, store)
    }

    #[test]
    fn test_offline_flag_overrides_backend() {
        let (_dir, local) = local_store();
        let client = ledger_client(&config(Backend::Local), local, true).unwrap();
        assert!(client.describe().starts_with("offline"));
    }

    #[test]
    fn test_local_backend_uses_kv_store() {
        let (_dir, local) = local_store();
        let client = ledger_client(&config(Backend::Local), local, false).unwrap();
        assert!(client.describe().starts_with("local"));
        assert_eq!(client.key(), "plays.json");
    }

    #[test]
    fn test_github_backend_requires_section() {
        let (_dir, local) = local_store();
        match ledger_client(&config(Backend::Github), local, false) {
            Err(err) => assert!(err.to_string().contains("[github]")),
            Ok(_) => panic!("github backend without a section should fail"),
        }
    }

    #[test]
    fn test_github_backend_builds_with_section() {
        let (_dir, local) = local_store();
        let mut cfg = config(Backend::Github);
        cfg.github = Some(GitHubSection {
            owner: "me".into(),
            repo: "plays".into(),
            branch: Some("main".into()),
            api_base: None,
            token_env: Some("HEARTLINE_TEST_TOKEN_UNSET".into()),
        });
        assert!(ledger_client(&cfg, local, false).is_ok());
    }

    #[test]
    fn test_sync_policy_from_config() {
        let policy = sync_policy(&config(Backend::Local));
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.deadline, Some(Duration::from_secs(60)));
    }
}
