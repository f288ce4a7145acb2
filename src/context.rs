//! Hosting pipeline context.
//!
//! The runner describes the triggering repository and reference through
//! environment variables; the state file path comes from `GITHUB_STATE`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Ambient context of one stage invocation.
#[derive(Debug, Clone)]
pub struct ActionContext {
    /// Repository owner
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// Reference that triggered the run (e.g. `refs/tags/v2.3.1`)
    pub ref_name: String,

    /// Path of the cross-stage state file
    pub state_file: PathBuf,
}

impl ActionContext {
    /// Read the context from the runner's environment.
    pub fn from_env() -> Result<Self> {
        let repository = std::env::var("GITHUB_REPOSITORY")
            .context("GITHUB_REPOSITORY is not set; revgate stages run inside a CI pipeline")?;

        let Some((owner, repo)) = repository.split_once('/') else {
            bail!("GITHUB_REPOSITORY is not in owner/repo form: {repository}");
        };

        let ref_name = std::env::var("GITHUB_REF")
            .context("GITHUB_REF is not set; revgate stages run inside a CI pipeline")?;

        let state_file = std::env::var("GITHUB_STATE")
            .context("GITHUB_STATE is not set; revgate stages run inside a CI pipeline")?;

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            ref_name,
            state_file: PathBuf::from(state_file),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_must_be_owner_slash_repo() {
        // from_env reads process-global environment; exercise the split rule
        // directly instead of mutating it under the test harness.
        let repository = "octocat";
        assert!(repository.split_once('/').is_none());

        let repository = "octocat/project-octocat";
        let (owner, repo) = repository.split_once('/').unwrap();
        assert_eq!(owner, "octocat");
        assert_eq!(repo, "project-octocat");
    }
}
