//! GitHub REST API client.
//!
//! Read-mostly client for the forge endpoints the review gates need:
//! releases, workflow runs, issues, milestones, and pull requests. No
//! retries are performed; any request failure surfaces immediately and is
//! fatal to the calling stage.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A published release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Release ID
    pub id: u64,

    /// Tag the release was created from
    pub tag_name: String,

    /// URL to the release page
    pub html_url: String,

    /// When the release was created
    pub created_at: String,

    /// Release title, if set
    pub name: Option<String>,
}

/// A workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    /// Run ID
    pub id: u64,

    /// Run number within the workflow
    pub run_number: u64,

    /// Branch (or tag) that triggered the run
    pub head_branch: String,

    /// Run status: queued, in_progress, completed
    pub status: String,

    /// Run conclusion once completed: success, failure, cancelled, ...
    pub conclusion: Option<String>,

    /// URL to the run
    pub html_url: String,
}

impl WorkflowRun {
    /// Check whether the run completed successfully.
    pub fn is_successful(&self) -> bool {
        self.status == "completed" && self.conclusion.as_deref() == Some("success")
    }
}

/// An issue in the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number
    pub number: u64,

    /// Issue title
    pub title: String,

    /// Issue state (open, closed)
    pub state: String,

    /// Whether the conversation is locked
    pub locked: bool,

    /// Reason the conversation was locked, if any
    pub active_lock_reason: Option<String>,

    /// Issue labels
    pub labels: Vec<Label>,

    /// URL to the issue
    pub html_url: String,
}

/// An issue label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    /// Label name
    pub name: String,
}

/// A milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    /// Milestone number
    pub number: u64,

    /// Milestone title
    pub title: String,

    /// Milestone state
    pub state: String,
}

/// A pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// Pull request number
    pub number: u64,

    /// Pull request state (open, closed)
    pub state: String,

    /// Pull request title
    pub title: String,

    /// URL to the pull request
    pub html_url: String,

    /// When the pull request was created
    pub created_at: String,
}

/// Options for creating a pull request.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePullRequestOptions {
    /// Pull request title
    pub title: String,

    /// Branch the changes are on
    pub head: String,

    /// Branch to merge into
    pub base: String,

    /// Pull request body
    pub body: String,
}

#[derive(Debug, Deserialize)]
struct WorkflowRunsResponse {
    #[allow(dead_code)]
    total_count: u64,
    workflow_runs: Vec<WorkflowRun>,
}

/// Error type for GitHub API operations.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error
    #[error("GitHub API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Invalid response
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for GitHub API operations.
pub type GitHubResult<T> = Result<T, GitHubError>;

/// GitHub API client scoped to one repository.
pub struct GitHub {
    base_url: String,
    owner: String,
    repo: String,
    token: String,
    client: reqwest::blocking::Client,
}

impl GitHub {
    /// Create a new client for `owner/repo` authenticated with `token`.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> GitHubResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("revgate/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: "https://api.github.com".to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
            client,
        })
    }

    /// Get repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    fn repo_url(&self) -> String {
        format!("{}/repos/{}/{}", self.base_url, self.owner, self.repo)
    }

    fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> GitHubResult<T> {
        let url = format!("{}{}", self.repo_url(), path);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()?;

        self.handle_response(response)
    }

    fn post<T: serde::de::DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> GitHubResult<T> {
        let url = format!("{}{}", self.repo_url(), path);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .json(body)
            .send()?;

        self.handle_response(response)
    }

    fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::blocking::Response,
    ) -> GitHubResult<T> {
        let status = response.status();

        if status.is_success() {
            return response.json().map_err(|e| GitHubError::InvalidResponse(e.to_string()));
        }

        let rate_limited = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|s| s == "0");

        let message = response
            .json::<serde_json::Value>()
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        match status.as_u16() {
            401 => Err(GitHubError::Auth(message)),
            403 if rate_limited => Err(GitHubError::RateLimited),
            404 => Err(GitHubError::NotFound(message)),
            code => Err(GitHubError::Api { status: code, message }),
        }
    }

    /// Fetch a release by its tag name.
    pub fn release_by_tag(&self, tag: &str) -> GitHubResult<Release> {
        self.get(&format!("/releases/tags/{tag}"))
    }

    /// List runs of a workflow (by file name or ID), filtered by trigger event.
    pub fn list_workflow_runs(&self, workflow: &str, event: &str) -> GitHubResult<Vec<WorkflowRun>> {
        let response: WorkflowRunsResponse =
            self.get(&format!("/actions/workflows/{workflow}/runs?event={event}"))?;
        Ok(response.workflow_runs)
    }

    /// List issues carrying all of the given labels, in any state.
    pub fn list_issues(&self, labels: &str) -> GitHubResult<Vec<Issue>> {
        self.get(&format!("/issues?labels={labels}&state=all"))
    }

    /// List milestones.
    pub fn list_milestones(&self) -> GitHubResult<Vec<Milestone>> {
        self.get("/milestones?state=all")
    }

    /// Create a milestone with the given title.
    pub fn create_milestone(&self, title: &str) -> GitHubResult<Milestone> {
        self.post("/milestones", &serde_json::json!({ "title": title }))
    }

    /// List pull requests in the given state (open, closed, all).
    pub fn list_pull_requests(&self, state: &str) -> GitHubResult<Vec<PullRequest>> {
        self.get(&format!("/pulls?state={state}"))
    }

    /// Open a pull request.
    pub fn create_pull_request(
        &self,
        options: &CreatePullRequestOptions,
    ) -> GitHubResult<PullRequest> {
        self.post("/pulls", options)
    }
}
