//! Issue gate for review approval state.
//!
//! Each project passes two sequential review gates tracked as issues: a
//! functionality review and a design review. An issue counts as passed when
//! it is closed and locked with the "resolved" lock reason. A review request
//! requires a passed functionality issue and no passed design issue; a
//! project receives at most one successful design review per version
//! lineage, so a passing design issue ends the process rather than erroring
//! into a retry.

use crate::github::{GitHub, GitHubError, Issue};
use crate::output;

/// Error type for the issue gate.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// No approved functionality issue exists for the project.
    #[error("Unable to detect approved functionality issue for project {project}. You must pass functionality before requesting code review.")]
    FunctionalityNotApproved { project: u8 },

    /// The project already has an approved design issue.
    #[error("Detected approved design issue #{number} for project {project}. Additional code reviews are not necessary.")]
    AlreadyReviewed { project: u8, number: u64 },

    /// Listing issues failed outright.
    #[error(transparent)]
    Github(#[from] GitHubError),
}

/// The approved functionality issue backing a review request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueApproval {
    /// Issue number of the passing functionality issue
    pub issue_number: u64,
    /// URL to the passing functionality issue
    pub issue_url: String,
}

/// Check whether an issue has passed its review gate.
pub fn is_passing(issue: &Issue) -> bool {
    issue.state == "closed" && issue.locked && issue.active_lock_reason.as_deref() == Some("resolved")
}

/// Find the passing issue in a label query result, if any.
pub fn find_passing(issues: &[Issue]) -> Option<&Issue> {
    issues.iter().find(|issue| is_passing(issue))
}

/// Check the functionality and design gates for `project`.
pub fn check_issues(github: &GitHub, project: u8) -> Result<IssueApproval, GateError> {
    output::group_start("Checking issues...");
    let result = check_issues_inner(github, project);
    output::group_end();
    result
}

fn check_issues_inner(github: &GitHub, project: u8) -> Result<IssueApproval, GateError> {
    let functionality = github.list_issues(&format!("project{project},functionality"))?;

    let passed = find_passing(&functionality)
        .ok_or(GateError::FunctionalityNotApproved { project })?;

    println!("Passing functionality issue: {}", passed.html_url);

    let design = github.list_issues(&format!("project{project},design"))?;

    if let Some(reviewed) = find_passing(&design) {
        println!("Passing design issue: {}", reviewed.html_url);
        return Err(GateError::AlreadyReviewed { project, number: reviewed.number });
    }

    println!("No passing design issues for project {project} found.");

    Ok(IssueApproval { issue_number: passed.number, issue_url: passed.html_url.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::Label;

    fn issue(number: u64, state: &str, locked: bool, reason: Option<&str>) -> Issue {
        Issue {
            number,
            title: format!("Issue {number}"),
            state: state.to_string(),
            locked,
            active_lock_reason: reason.map(String::from),
            labels: vec![Label { name: "project3".to_string() }],
            html_url: format!("https://github.com/o/r/issues/{number}"),
        }
    }

    #[test]
    fn test_passing_requires_closed_locked_resolved() {
        assert!(is_passing(&issue(1, "closed", true, Some("resolved"))));

        assert!(!is_passing(&issue(2, "open", true, Some("resolved"))));
        assert!(!is_passing(&issue(3, "closed", false, Some("resolved"))));
        assert!(!is_passing(&issue(4, "closed", true, Some("off-topic"))));
        assert!(!is_passing(&issue(5, "closed", true, None)));
    }

    #[test]
    fn test_find_passing_selects_only_resolved_issue() {
        // Two functionality issues for the same project; only the
        // closed/locked/resolved one counts, regardless of the other's state.
        let issues = vec![
            issue(10, "closed", false, None),
            issue(11, "closed", true, Some("resolved")),
        ];

        let passed = find_passing(&issues).unwrap();
        assert_eq!(passed.number, 11);
    }

    #[test]
    fn test_find_passing_none_when_no_issue_qualifies() {
        let issues = vec![issue(20, "open", false, None), issue(21, "closed", true, None)];
        assert!(find_passing(&issues).is_none());
    }
}
