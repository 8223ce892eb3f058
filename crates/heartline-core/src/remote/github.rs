//! GitHub contents API backend.
//!
//! The shared document is a file in a repository; its blob SHA is the version
//! token. `GET /repos/{owner}/{repo}/contents/{path}` reads it and `PUT` on the
//! same URL writes it, failing when the supplied SHA is stale.
//!
//! Files over 1 MB come back from the JSON endpoint with empty `content`; those
//! are fetched again through the raw media type instead of being read as empty.

use std::time::Duration;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{HeartlineError, Result};
use crate::remote::traits::{DocumentStore, StoredDocument, VersionToken};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Connection settings for a repository-hosted document.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub owner: String,
    pub repo: String,
    pub branch: Option<String>,
    pub api_base: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl GitHubConfig {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: None,
            api_base: DEFAULT_API_BASE.to_string(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn contents_url(&self, key: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            self.owner,
            self.repo,
            key.trim_start_matches('/')
        )
    }
}

pub const JSON_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
pub const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    size: u64,
    sha: String,
}

/// What a contents `GET` told us about a document.
#[derive(Debug, PartialEq, Eq)]
enum FetchOutcome {
    Missing,
    Document(StoredDocument),
    /// The file exists but its body was not inlined; fetch it raw.
    NeedsRaw(VersionToken),
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Debug, Deserialize)]
struct PutContent {
    sha: String,
}

pub struct GitHubContentsStore {
    config: GitHubConfig,
    client: Client,
}

impl GitHubContentsStore {
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("heartline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HeartlineError::Other(format!("HTTP client error: {}", e)))?;
        Ok(Self { config, client })
    }

    fn authorize(&self, request: RequestBuilder, accept: &str) -> RequestBuilder {
        let request = request.header(ACCEPT, accept);
        match &self.config.token {
            Some(token) => request.header(AUTHORIZATION, format!("token {}", token)),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder, accept: &str) -> Result<(StatusCode, Vec<u8>)> {
        let response = self
            .authorize(request, accept)
            .send()
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().map_err(transport_error)?;
        Ok((status, body.to_vec()))
    }

    fn get_request(&self, key: &str) -> RequestBuilder {
        let request = self.client.get(self.config.contents_url(key));
        match &self.config.branch {
            Some(branch) => request.query(&[("ref", branch)]),
            None => request,
        }
    }
}

fn transport_error(err: reqwest::Error) -> HeartlineError {
    if err.is_timeout() {
        HeartlineError::Unreachable(format!("request timed out: {}", err))
    } else {
        HeartlineError::Unreachable(err.to_string())
    }
}

fn status_error(status: StatusCode, body: &[u8]) -> HeartlineError {
    HeartlineError::Unreachable(format!(
        "GitHub API error {}: {}",
        status,
        String::from_utf8_lossy(body).trim()
    ))
}

fn fetch_outcome(key: &str, status: StatusCode, body: &[u8]) -> Result<FetchOutcome> {
    match status {
        StatusCode::NOT_FOUND => {
            debug!("{} not found on GitHub", key);
            Ok(FetchOutcome::Missing)
        }
        status if status.is_success() => {
            let body: ContentsResponse = serde_json::from_slice(body).map_err(|e| {
                HeartlineError::Unreachable(format!("Unexpected GitHub response: {}", e))
            })?;
            let version = VersionToken::new(body.sha);
            let content = body.content.as_deref().unwrap_or_default();
            let inlined = body.encoding.as_deref().unwrap_or("base64") == "base64";
            if body.size > 0 && (!inlined || content.trim().is_empty()) {
                debug!("{} is {} bytes, not inlined", key, body.size);
                return Ok(FetchOutcome::NeedsRaw(version));
            }
            let bytes = decode_lenient(content).unwrap_or_else(|| {
                warn!("{} has undecodable base64 content", key);
                Vec::new()
            });
            Ok(FetchOutcome::Document(StoredDocument { bytes, version }))
        }
        status => Err(status_error(status, body)),
    }
}

fn raw_outcome(key: &str, status: StatusCode, body: Vec<u8>) -> Result<Vec<u8>> {
    if status.is_success() && !body.is_empty() {
        Ok(body)
    } else if status.is_success() {
        Err(HeartlineError::Unreachable(format!(
            "GitHub returned an empty raw body for {}",
            key
        )))
    } else {
        Err(status_error(status, &body))
    }
}

fn put_outcome(key: &str, status: StatusCode, body: &[u8]) -> Result<VersionToken> {
    match status {
        // 409: stale sha. 422: sha missing for an existing file.
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => Err(HeartlineError::Conflict(
            format!("GitHub rejected write to {} ({})", key, status),
        )),
        status if status.is_success() => {
            let body: PutResponse = serde_json::from_slice(body).map_err(|e| {
                HeartlineError::Unreachable(format!("Unexpected GitHub response: {}", e))
            })?;
            Ok(VersionToken::new(body.content.sha))
        }
        status => Err(status_error(status, body)),
    }
}

/// Decode base64 content the way the contents API delivers it.
///
/// The API wraps content at 60 columns; URL-safe characters and missing
/// padding are tolerated as well.
pub fn decode_lenient(content: &str) -> Option<Vec<u8>> {
    let cleaned: String = content
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '_' => '/',
            '-' => '+',
            other => other,
        })
        .collect();
    STANDARD
        .decode(cleaned.as_bytes())
        .or_else(|_| STANDARD_NO_PAD.decode(cleaned.trim_end_matches('=').as_bytes()))
        .ok()
}

impl DocumentStore for GitHubContentsStore {
    fn fetch(&self, key: &str) -> Result<Option<StoredDocument>> {
        let (status, body) = self.send(self.get_request(key), JSON_MEDIA_TYPE)?;
        match fetch_outcome(key, status, &body)? {
            FetchOutcome::Missing => Ok(None),
            FetchOutcome::Document(document) => Ok(Some(document)),
            FetchOutcome::NeedsRaw(version) => {
                let (status, body) = self.send(self.get_request(key), RAW_MEDIA_TYPE)?;
                let bytes = raw_outcome(key, status, body)?;
                Ok(Some(StoredDocument { bytes, version }))
            }
        }
    }

    fn put(
        &self,
        key: &str,
        bytes: &[u8],
        expected: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken> {
        let body = PutRequest {
            message,
            content: STANDARD.encode(bytes),
            sha: expected.map(VersionToken::as_str),
            branch: self.config.branch.as_deref(),
        };
        let request = self.client.put(self.config.contents_url(key)).json(&body);
        let (status, response) = self.send(request, JSON_MEDIA_TYPE)?;
        put_outcome(key, status, &response)
    }

    fn describe(&self) -> String {
        format!("github:{}/{}", self.config.owner, self.config.repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_lenient_handles_wrapped_content() {
        let encoded = STANDARD.encode(br#"{"devices":[],"plays":[]}"#);
        let wrapped = format!("{}\n{}\n", &encoded[..10], &encoded[10..]);
        assert_eq!(
            decode_lenient(&wrapped).unwrap(),
            br#"{"devices":[],"plays":[]}"#.to_vec()
        );
    }

    #[test]
    fn test_decode_lenient_accepts_url_safe_and_unpadded() {
        let bytes = [0xfb, 0xff, 0xfe, 0x01];
        let url_safe = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);
        assert_eq!(decode_lenient(&url_safe).unwrap(), bytes.to_vec());
    }

    #[test]
    fn test_decode_lenient_rejects_garbage() {
        assert!(decode_lenient("!!!not base64!!!").is_none());
    }

    #[test]
    fn test_contents_url() {
        let config = GitHubConfig::new("octo", "plays").with_api_base("http://localhost:9/");
        assert_eq!(
            config.contents_url("/data/plays.json"),
            "http://localhost:9/repos/octo/plays/contents/data/plays.json"
        );
    }

    #[test]
    fn test_put_request_omits_sha_on_create() {
        let body = PutRequest {
            message: "New play",
            content: "e30=".to_string(),
            sha: None,
            branch: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("sha").is_none());
        assert_eq!(value["content"], "e30=");
    }

    #[test]
    fn test_unreachable_host_maps_to_unreachable() {
        let config = GitHubConfig::new("octo", "plays")
            .with_api_base("http://127.0.0.1:9")
            .with_timeout(Duration::from_millis(500));
        let store = GitHubContentsStore::new(config).unwrap();
        assert!(matches!(
            store.fetch("plays.json"),
            Err(HeartlineError::Unreachable(_))
        ));
    }

    fn contents_body(content: &str, encoding: &str, size: u64) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "type": "file",
            "encoding": encoding,
            "size": size,
            "name": "plays.json",
            "path": "plays.json",
            "content": content,
            "sha": "abc123",
        }))
        .unwrap()
    }

    #[test]
    fn test_fetch_404_is_missing() {
        let outcome = fetch_outcome("plays.json", StatusCode::NOT_FOUND, b"{}").unwrap();
        assert_eq!(outcome, FetchOutcome::Missing);
    }

    #[test]
    fn test_fetch_inlined_content_is_decoded() {
        let encoded = STANDARD.encode(b"{\"plays\":[]}");
        let body = contents_body(&encoded, "base64", 12);
        match fetch_outcome("plays.json", StatusCode::OK, &body).unwrap() {
            FetchOutcome::Document(doc) => {
                assert_eq!(doc.bytes, b"{\"plays\":[]}".to_vec());
                assert_eq!(doc.version.as_str(), "abc123");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_fetch_large_file_is_not_read_as_empty() {
        let body = contents_body("", "none", 2_400_000);
        assert_eq!(
            fetch_outcome("plays.json", StatusCode::OK, &body).unwrap(),
            FetchOutcome::NeedsRaw(VersionToken::new("abc123"))
        );

        let body = contents_body("", "base64", 2_400_000);
        assert!(matches!(
            fetch_outcome("plays.json", StatusCode::OK, &body).unwrap(),
            FetchOutcome::NeedsRaw(_)
        ));
    }

    #[test]
    fn test_fetch_empty_file_is_an_empty_document() {
        let body = contents_body("", "base64", 0);
        match fetch_outcome("plays.json", StatusCode::OK, &body).unwrap() {
            FetchOutcome::Document(doc) => assert!(doc.bytes.is_empty()),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_fetch_server_error_is_unreachable() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::INTERNAL_SERVER_ERROR] {
            let err = fetch_outcome("plays.json", status, b"nope").unwrap_err();
            assert!(matches!(err, HeartlineError::Unreachable(_)), "{}", status);
        }
    }

    #[test]
    fn test_raw_body_must_be_present() {
        assert_eq!(
            raw_outcome("plays.json", StatusCode::OK, b"{}".to_vec()).unwrap(),
            b"{}".to_vec()
        );
        assert!(matches!(
            raw_outcome("plays.json", StatusCode::OK, Vec::new()),
            Err(HeartlineError::Unreachable(_))
        ));
        assert!(matches!(
            raw_outcome("plays.json", StatusCode::FORBIDDEN, b"rate limited".to_vec()),
            Err(HeartlineError::Unreachable(_))
        ));
    }

    #[test]
    fn test_put_stale_sha_conflicts() {
        for status in [StatusCode::CONFLICT, StatusCode::UNPROCESSABLE_ENTITY] {
            let err = put_outcome("plays.json", status, b"{}").unwrap_err();
            assert!(matches!(err, HeartlineError::Conflict(_)), "{}", status);
        }
    }

    #[test]
    fn test_put_success_reads_new_sha() {
        let body = br#"{"content":{"name":"plays.json","sha":"def456"},"commit":{"sha":"c0ffee"}}"#;
        let version = put_outcome("plays.json", StatusCode::CREATED, body).unwrap();
        assert_eq!(version.as_str(), "def456");
    }

    #[test]
    fn test_put_other_failures_are_unreachable() {
        for status in [StatusCode::NOT_FOUND, StatusCode::FORBIDDEN, StatusCode::BAD_GATEWAY] {
            let err = put_outcome("plays.json", status, b"").unwrap_err();
            assert!(matches!(err, HeartlineError::Unreachable(_)), "{}", status);
        }
        let err = put_outcome("plays.json", StatusCode::OK, b"not json").unwrap_err();
        assert!(matches!(err, HeartlineError::Unreachable(_)));
    }
}
