//! Execution context derived from the CI environment.

use std::collections::HashMap;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

pub const GITHUB_CLOUD_URL: &str = "https://github.com";
pub const GITHUB_CLOUD_API_URL: &str = "https://api.github.com";

const PULL_REQUEST_EVENTS: &[&str] = &["pull_request", "pull_request_target"];

static PULL_REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^refs/pull/(\d+)/").unwrap());

/// Environment variables read by [`ExecutionContext::resolve`].
pub mod env_keys {
    pub const EVENT_NAME: &str = "GITHUB_EVENT_NAME";
    pub const REPOSITORY: &str = "GITHUB_REPOSITORY";
    pub const REPOSITORY_OWNER: &str = "GITHUB_REPOSITORY_OWNER";
    pub const HEAD_REF: &str = "GITHUB_HEAD_REF";
    pub const BASE_REF: &str = "GITHUB_BASE_REF";
    pub const REF_NAME: &str = "GITHUB_REF_NAME";
    pub const REF: &str = "GITHUB_REF";
    pub const SHA: &str = "GITHUB_SHA";
    pub const SERVER_URL: &str = "GITHUB_SERVER_URL";
    pub const API_URL: &str = "GITHUB_API_URL";
    pub const WORKSPACE: &str = "GITHUB_WORKSPACE";
    pub const TOKEN: &str = "GITHUB_TOKEN";
}

/// Read-only facts about the current CI run.
///
/// Missing environment values are empty strings, never absent.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub is_pull_request: bool,
    pub repository_owner: String,
    pub repository_name: String,
    pub repository_full_name: String,
    /// Head branch of a pull request.
    pub branch_name: String,
    /// Target branch of a pull request.
    pub base_branch_name: String,
    pub ref_name: String,
    pub git_ref: String,
    pub commit_sha: String,
    pub pull_number: Option<u64>,
    pub host_server_url: String,
    pub is_cloud_host: bool,
    pub api_url: String,
    pub workspace: String,
    pub github_token: String,
}

impl ExecutionContext {
    pub fn resolve(env: &HashMap<String, String>) -> Self {
        let var = |key: &str| env.get(key).map(|v| v.trim().to_string()).unwrap_or_default();

        let event_name = var(env_keys::EVENT_NAME);
        let repository_full_name = var(env_keys::REPOSITORY);
        let repository_name = match repository_full_name.split_once('/') {
            Some((_, name)) => name.to_string(),
            None => repository_full_name.clone(),
        };
        let git_ref = var(env_keys::REF);
        let pull_number = PULL_REF_RE
            .captures(&git_ref)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok());
        let host_server_url = var(env_keys::SERVER_URL);

        Self {
            is_pull_request: PULL_REQUEST_EVENTS.contains(&event_name.as_str()),
            repository_owner: var(env_keys::REPOSITORY_OWNER),
            repository_name,
            repository_full_name,
            branch_name: var(env_keys::HEAD_REF),
            base_branch_name: var(env_keys::BASE_REF),
            ref_name: var(env_keys::REF_NAME),
            git_ref,
            commit_sha: var(env_keys::SHA),
            pull_number,
            is_cloud_host: is_cloud_url(&host_server_url),
            host_server_url,
            api_url: var(env_keys::API_URL),
            workspace: var(env_keys::WORKSPACE),
            github_token: var(env_keys::TOKEN),
        }
    }

    /// Prefer an explicit token input over the environment token.
    pub fn with_token(mut self, token: Option<&str>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.github_token = token.trim().to_string();
        }
        self
    }

    /// Branch being scanned: the head branch on PR runs, the ref otherwise.
    pub fn current_branch(&self) -> &str {
        if self.is_pull_request {
            &self.branch_name
        } else {
            &self.ref_name
        }
    }

    /// API base for hosting-platform calls. Enterprise servers are same-origin.
    pub fn api_base_url(&self) -> &str {
        if self.is_cloud_host {
            GITHUB_CLOUD_API_URL
        } else {
            &self.host_server_url
        }
    }

    pub fn has_token(&self) -> bool {
        !self.github_token.is_empty()
    }

    /// Directory the bridge runs in: `project_directory` resolved against
    /// the workspace, else the workspace, else the current directory.
    pub fn working_directory(&self, project_directory: Option<&str>) -> PathBuf {
        let base = if self.workspace.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.workspace)
        };
        match project_directory {
            Some(dir) => base.join(dir),
            None => base,
        }
    }
}

fn is_cloud_url(url: &str) -> bool {
    url == GITHUB_CLOUD_URL
}
