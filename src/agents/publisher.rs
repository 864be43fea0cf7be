//! Publish Agent
//!
//! Commits the final document into a hosted repository through the contents
//! API. The current file hash is looked up first: no hash means create, a
//! hash means update and is sent back as the conflict token. Lookup and write
//! are two separate requests, so a concurrent commit in between makes the
//! write fail with a conflict status instead of being merged.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::check_kind;
use crate::config::PublishConfig;
use crate::constants::agents::{CALLER, PUBLISHER};
use crate::constants::network::USER_AGENT;
use crate::types::{CraftError, Message, MessageKind, Result};

/// Prefix of every successful publish status
pub const SUCCESS_PREFIX: &str = "✅";

const GITHUB_HOST: &str = "github.com";
const API_VERSION: &str = "2022-11-28";

// =============================================================================
// Repository Reference
// =============================================================================

/// Owner and name of a hosted repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parse `https://github.com/o/r[.git]`, `git@github.com:o/r.git` or `o/r`
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        let invalid = || {
            CraftError::Config(format!(
                "invalid repository reference '{}': expected owner/name or a github.com URL",
                reference
            ))
        };

        let path = if let Some(rest) = reference.strip_prefix("git@") {
            let (host, path) = rest.split_once(':').ok_or_else(invalid)?;
            if host != GITHUB_HOST {
                return Err(invalid());
            }
            path.to_string()
        } else if reference.contains("://") {
            let url = url::Url::parse(reference).map_err(|_| invalid())?;
            if url.host_str() != Some(GITHUB_HOST) {
                return Err(invalid());
            }
            url.path().to_string()
        } else {
            reference.to_string()
        };

        let mut segments = path
            .trim_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty());
        let owner = segments.next().ok_or_else(invalid)?;
        let name = segments.next().ok_or_else(invalid)?;
        let name = name.strip_suffix(".git").unwrap_or(name);

        if name.is_empty() || segments.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Browser location of `path` on `branch`
    pub fn blob_url(&self, branch: &str, path: &str) -> String {
        format!(
            "https://{}/{}/{}/blob/{}/{}",
            GITHUB_HOST, self.owner, self.name, branch, path
        )
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// =============================================================================
// Hosting API
// =============================================================================

/// Body of a create-or-update file request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PutFileRequest {
    pub message: String,
    /// Base64 of the UTF-8 file content
    pub content: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl PutFileRequest {
    pub fn new(message: &str, text: &str, branch: &str, sha: Option<String>) -> Self {
        Self {
            message: message.to_string(),
            content: BASE64.encode(text.as_bytes()),
            branch: branch.to_string(),
            sha,
        }
    }
}

/// Repository contents operations used for publishing
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// Current content hash of `path`, `None` when the file does not exist
    async fn file_sha(&self, repo: &RepoRef, path: &str, branch: &str) -> Result<Option<String>>;

    /// Create or update `path`; returns the committed file's location
    async fn put_file(&self, repo: &RepoRef, path: &str, request: &PutFileRequest)
    -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PutFileResponse {
    content: Option<CommittedFile>,
}

#[derive(Debug, Deserialize)]
struct CommittedFile {
    html_url: Option<String>,
}

/// GitHub REST contents API client
pub struct GitHubApi {
    /// Token stored securely - never exposed in logs or debug output
    token: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GitHubApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubApi")
            .field("token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubApi {
    /// `timeout` bounds each request, connect included
    pub fn new(api_base: &str, token: SecretString, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CraftError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Client using the configured token, or `GITHUB_TOKEN`
    pub fn from_config(config: &PublishConfig, timeout: Duration) -> Result<Self> {
        let token = config
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                CraftError::Config(
                    "GitHub token not found. Set GITHUB_TOKEN env var or publish.token in config"
                        .to_string(),
                )
            })?;
        Self::new(&config.api_base, SecretString::from(token), timeout)
    }

    fn contents_url(&self, repo: &RepoRef, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            repo.owner,
            repo.name,
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header(
                "Authorization",
                format!("Bearer {}", self.token.expose_secret()),
            )
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

async fn http_error(response: reqwest::Response) -> CraftError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    CraftError::Http { status, body }
}

#[async_trait]
impl HostingApi for GitHubApi {
    async fn file_sha(&self, repo: &RepoRef, path: &str, branch: &str) -> Result<Option<String>> {
        let url = self.contents_url(repo, path);
        debug!("Looking up {} on {}", path, repo);

        let response = self
            .request(reqwest::Method::GET, &url)
            .query(&[("ref", branch)])
            .send()
            .await?;

        match response.status().as_u16() {
            404 => Ok(None),
            200 => {
                let contents: ContentsResponse = response.json().await?;
                Ok(contents.sha)
            }
            _ => Err(http_error(response).await),
        }
    }

    async fn put_file(
        &self,
        repo: &RepoRef,
        path: &str,
        request: &PutFileRequest,
    ) -> Result<String> {
        let url = self.contents_url(repo, path);
        let response = self
            .request(reqwest::Method::PUT, &url)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(http_error(response).await);
        }

        // The location is informational; an unreadable body still means committed.
        let location = response
            .json::<PutFileResponse>()
            .await
            .ok()
            .and_then(|body| body.content)
            .and_then(|file| file.html_url)
            .unwrap_or_else(|| repo.blob_url(&request.branch, path));
        Ok(location)
    }
}

// =============================================================================
// Agent
// =============================================================================

pub struct PublishAgent {
    api: Arc<dyn HostingApi>,
    branch: String,
    path: String,
    commit_message: String,
}

impl PublishAgent {
    pub fn new(
        api: Arc<dyn HostingApi>,
        branch: impl Into<String>,
        path: impl Into<String>,
        commit_message: impl Into<String>,
    ) -> Self {
        Self {
            api,
            branch: branch.into(),
            path: path.into(),
            commit_message: commit_message.into(),
        }
    }

    /// Agent backed by the GitHub API with configured defaults
    pub fn from_config(config: &PublishConfig, timeout: Duration) -> Result<Self> {
        let api = GitHubApi::from_config(config, timeout)?;
        Ok(Self::new(
            Arc::new(api),
            &config.branch,
            &config.path,
            &config.commit_message,
        ))
    }

    /// Whether a publish status reports success
    pub fn is_success(status: &str) -> bool {
        status.starts_with(SUCCESS_PREFIX)
    }

    async fn commit(&self, reference: &str, text: &str) -> Result<String> {
        let repo = RepoRef::parse(reference)?;
        let sha = self.api.file_sha(&repo, &self.path, &self.branch).await?;
        info!(
            "{} {} on {} ({})",
            if sha.is_some() { "Updating" } else { "Creating" },
            self.path,
            repo,
            self.branch
        );

        let request = PutFileRequest::new(&self.commit_message, text, &self.branch, sha);
        self.api.put_file(&repo, &self.path, &request).await
    }

    /// Push `text` to `reference` and describe the outcome
    pub async fn publish(&self, reference: &str, text: &str) -> String {
        match self.commit(reference, text).await {
            Ok(location) => format!("{} README pushed to GitHub: {}", SUCCESS_PREFIX, location),
            Err(CraftError::Http { status, body }) => {
                warn!("Publish rejected with status {}", status);
                format!("❌ GitHub push failed: {} - {}", status, body)
            }
            Err(e) => {
                warn!("Publish failed: {}", e);
                format!("❌ Exception during GitHub push: {}", e)
            }
        }
    }

    /// Produce a `publish-status` from a `final-document`
    pub async fn run(&self, reference: &str, incoming: &Message) -> Message {
        if let Some(rejection) = check_kind(PUBLISHER, incoming, &[MessageKind::FinalDocument]) {
            return rejection;
        }

        let status = self.publish(reference, incoming.content()).await;
        Message::new(PUBLISHER, CALLER, MessageKind::PublishStatus, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CONTENTS: &str = "/repos/octo/app/contents/README.md";
    const TIMEOUT: Duration = Duration::from_secs(5);

    fn agent(server: &MockServer) -> PublishAgent {
        let api = GitHubApi::new(&server.uri(), SecretString::from("ghp_test"), TIMEOUT).unwrap();
        PublishAgent::new(Arc::new(api), "main", "README.md", "docs: update README")
    }

    fn final_doc(text: &str) -> Message {
        Message::new("FeedbackAgent", PUBLISHER, MessageKind::FinalDocument, text)
    }

    async fn put_body(server: &MockServer) -> Value {
        let requests = server.received_requests().await.unwrap();
        let put = requests
            .iter()
            .find(|r| r.method.as_str() == "PUT")
            .unwrap();
        put.body_json().unwrap()
    }

    #[test]
    fn test_parse_references() {
        let expected = RepoRef {
            owner: "octo".to_string(),
            name: "app".to_string(),
        };
        for reference in [
            "https://github.com/octo/app",
            "https://github.com/octo/app/",
            "https://github.com/octo/app.git",
            "git@github.com:octo/app.git",
            "octo/app",
        ] {
            assert_eq!(RepoRef::parse(reference).unwrap(), expected, "{reference}");
        }

        for bad in ["", "octo", "https://gitlab.com/octo/app", "a/b/c", "git@host:octo/app"] {
            assert!(RepoRef::parse(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_request_omits_absent_sha() {
        let request = PutFileRequest::new("msg", "# Hi", "main", None);
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("sha").is_none());
        assert_eq!(value["content"], "IyBIaQ==");
    }

    #[tokio::test]
    async fn test_creates_when_file_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CONTENTS))
            .and(query_param("ref", "main"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(CONTENTS))
            .and(header("Authorization", "Bearer ghp_test"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "content": {"html_url": "https://github.com/octo/app/blob/main/README.md"}
            })))
            .mount(&server)
            .await;

        let reply = agent(&server)
            .run("https://github.com/octo/app", &final_doc("# App"))
            .await;

        assert_eq!(reply.kind(), &MessageKind::PublishStatus);
        assert_eq!(
            reply.content(),
            "✅ README pushed to GitHub: https://github.com/octo/app/blob/main/README.md"
        );
        assert!(PublishAgent::is_success(reply.content()));

        let body = put_body(&server).await;
        assert!(body.get("sha").is_none());
        assert_eq!(body["branch"], "main");
        assert_eq!(body["message"], "docs: update README");
        assert_eq!(body["content"], "IyBBcHA=");
    }

    #[tokio::test]
    async fn test_updates_with_existing_sha() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CONTENTS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sha": "sha123"})))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(CONTENTS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let reply = agent(&server).run("octo/app", &final_doc("# App")).await;

        assert_eq!(
            reply.content(),
            "✅ README pushed to GitHub: https://github.com/octo/app/blob/main/README.md"
        );
        assert_eq!(put_body(&server).await["sha"], "sha123");
    }

    #[tokio::test]
    async fn test_rejected_write_reports_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CONTENTS))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(CONTENTS))
            .respond_with(ResponseTemplate::new(409).set_body_string("sha mismatch"))
            .mount(&server)
            .await;

        let reply = agent(&server).run("octo/app", &final_doc("# App")).await;

        assert_eq!(reply.content(), "❌ GitHub push failed: 409 - sha mismatch");
        assert!(!PublishAgent::is_success(reply.content()));
    }

    #[tokio::test]
    async fn test_transport_failure_is_exception() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let api = GitHubApi::new(&uri, SecretString::from("ghp_test"), TIMEOUT).unwrap();
        let agent = PublishAgent::new(Arc::new(api), "main", "README.md", "docs");
        let status = agent.publish("octo/app", "# App").await;

        assert!(status.starts_with("❌ Exception during GitHub push: "));
    }

    #[tokio::test]
    async fn test_slow_host_hits_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CONTENTS))
            .respond_with(ResponseTemplate::new(404).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let api = GitHubApi::new(
            &server.uri(),
            SecretString::from("ghp_test"),
            Duration::from_millis(100),
        )
        .unwrap();
        let agent = PublishAgent::new(Arc::new(api), "main", "README.md", "docs");
        let status = agent.publish("octo/app", "# App").await;

        assert!(status.starts_with("❌ Exception during GitHub push: "));
        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| r.method.as_str() != "PUT"));
    }

    #[tokio::test]
    async fn test_invalid_reference_is_exception() {
        let server = MockServer::start().await;
        let status = agent(&server).publish("not a repo", "# App").await;
        assert!(status.starts_with("❌ Exception during GitHub push: "));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    struct CountingApi(AtomicUsize);

    #[async_trait]
    impl HostingApi for CountingApi {
        async fn file_sha(&self, _: &RepoRef, _: &str, _: &str) -> Result<Option<String>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }

        async fn put_file(&self, repo: &RepoRef, path: &str, r: &PutFileRequest) -> Result<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(repo.blob_url(&r.branch, path))
        }
    }

    #[tokio::test]
    async fn test_rejects_draft_without_calls() {
        let api = Arc::new(CountingApi(AtomicUsize::new(0)));
        let agent = PublishAgent::new(api.clone(), "main", "README.md", "docs");

        let draft = Message::new("WriterAgent", PUBLISHER, MessageKind::DraftDocument, "# App");
        let reply = agent.run("octo/app", &draft).await;

        assert!(reply.is_error());
        assert!(reply.content().contains("final-document"));
        assert_eq!(api.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_debug_redacts_token() {
        let api = GitHubApi::new("http://localhost", SecretString::from("ghp_secret"), TIMEOUT).unwrap();
        assert!(!format!("{:?}", api).contains("ghp_secret"));
    }
}
