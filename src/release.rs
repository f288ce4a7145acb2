//! Release verification.
//!
//! A review request names a tagged release. The release must exist on the
//! forge, and the CI test workflow run triggered by that release must have
//! completed successfully. Both lookups are read-only; failure of either is
//! fatal to the stage with no retries.

use crate::github::{GitHub, GitHubError, WorkflowRun};
use crate::output;

/// Workflow file that runs the project tests on release.
pub const TEST_WORKFLOW: &str = "test.yml";

/// Error type for release verification.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// No release exists for the tag.
    #[error("Unable to find release {tag}: {reason}.")]
    ReleaseNotFound { tag: String, reason: String },

    /// No test workflow run was triggered by the release tag.
    #[error("Unable to find workflow run for release {tag}. Releases must pass the automated tests before review.")]
    RunNotFound { tag: String },

    /// A run exists but did not complete successfully.
    #[error("Workflow run {number} (id {id}) for release {tag} did not complete successfully.")]
    RunNotSuccessful { tag: String, number: u64, id: u64 },

    /// Listing workflow runs failed outright.
    #[error(transparent)]
    Github(#[from] GitHubError),
}

/// Combined release and workflow run metadata for a verified release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVerification {
    /// URL to the release page
    pub release_url: String,
    /// Tag the release was created from
    pub release_tag: String,
    /// When the release was created
    pub release_date: String,
    /// Test run number
    pub run_number: u64,
    /// Test run ID
    pub run_id: u64,
    /// URL to the test run
    pub run_url: String,
}

/// Find the run triggered by the release tag.
fn find_release_run<'a>(runs: &'a [WorkflowRun], tag: &str) -> Option<&'a WorkflowRun> {
    runs.iter().find(|run| run.head_branch == tag)
}

/// Check that a run completed with a successful conclusion.
fn check_run(run: &WorkflowRun, tag: &str) -> Result<(), VerifyError> {
    if run.is_successful() {
        Ok(())
    } else {
        Err(VerifyError::RunNotSuccessful {
            tag: tag.to_string(),
            number: run.run_number,
            id: run.id,
        })
    }
}

/// Verify that `tag` names a released snapshot with a passing test run.
pub fn verify_release(github: &GitHub, tag: &str) -> Result<ReleaseVerification, VerifyError> {
    output::group_start(&format!("Verifying release {tag}..."));
    let result = verify_release_inner(github, tag);
    output::group_end();
    result
}

fn verify_release_inner(github: &GitHub, tag: &str) -> Result<ReleaseVerification, VerifyError> {
    let release = fetch_release(github, tag)?;
    println!("Found release {}: {}", release.tag_name, release.html_url);

    let runs = github.list_workflow_runs(TEST_WORKFLOW, "release")?;
    tracing::debug!(count = runs.len(), "fetched release-triggered test runs");

    let run = find_release_run(&runs, tag)
        .ok_or_else(|| VerifyError::RunNotFound { tag: tag.to_string() })?;

    check_run(run, tag)?;
    println!("Found passing test run {}: {}", run.run_number, run.html_url);

    Ok(ReleaseVerification {
        release_url: release.html_url,
        release_tag: release.tag_name,
        release_date: release.created_at,
        run_number: run.run_number,
        run_id: run.id,
        run_url: run.html_url.clone(),
    })
}

fn fetch_release(github: &GitHub, tag: &str) -> Result<crate::github::Release, VerifyError> {
    github.release_by_tag(tag).map_err(|error| VerifyError::ReleaseNotFound {
        tag: tag.to_string(),
        reason: error.to_string().to_lowercase(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(tag: &str, status: &str, conclusion: Option<&str>) -> WorkflowRun {
        WorkflowRun {
            id: 100,
            run_number: 41,
            head_branch: tag.to_string(),
            status: status.to_string(),
            conclusion: conclusion.map(String::from),
            html_url: "https://github.com/o/r/actions/runs/100".to_string(),
        }
    }

    #[test]
    fn test_find_release_run_matches_head_branch() {
        let runs =
            vec![run("v1.0.0", "completed", Some("success")), run("v1.1.0", "completed", Some("success"))];

        let found = find_release_run(&runs, "v1.1.0").unwrap();
        assert_eq!(found.head_branch, "v1.1.0");
        assert!(find_release_run(&runs, "v2.0.0").is_none());
    }

    #[test]
    fn test_check_run_requires_completed_success() {
        assert!(check_run(&run("v1.0.0", "completed", Some("success")), "v1.0.0").is_ok());

        let err = check_run(&run("v1.0.0", "completed", Some("failure")), "v1.0.0").unwrap_err();
        assert!(err.to_string().contains("41"));

        assert!(check_run(&run("v1.0.0", "in_progress", None), "v1.0.0").is_err());
        assert!(check_run(&run("v1.0.0", "queued", None), "v1.0.0").is_err());
    }

    #[test]
    fn test_run_not_successful_mentions_run_number_and_id() {
        let err = check_run(&run("v2.1.0", "completed", Some("failure")), "v2.1.0").unwrap_err();

        match err {
            VerifyError::RunNotSuccessful { tag, number, id } => {
                assert_eq!(tag, "v2.1.0");
                assert_eq!(number, 41);
                assert_eq!(id, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
