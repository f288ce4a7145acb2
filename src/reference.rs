//! Project reference parsing.
//!
//! Review requests are triggered by pushing a version tag of the form
//! `v{project}.{reviews}.{patches}`, where the major component is the
//! project number (1 through 4), the minor component counts prior code
//! reviews, and the patch component counts patch releases since the last
//! review. Anything else is a fatal parse error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::output;
use crate::TEST_DIR;

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v([1-4])\.(\d+)\.(\d+)$").expect("version pattern is valid"));

/// Error raised when a reference does not encode project details.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unable to parse project information from: {reference}")]
pub struct ParseError {
    /// The offending reference string.
    pub reference: String,
}

/// Project details derived from a version tag reference.
///
/// Built once per run and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReference {
    /// Repository owner (the student account).
    pub owner: String,
    /// `owner/repo` of the project repository.
    pub main_repo: String,
    /// `owner/repo` of the shared test repository.
    pub test_repo: String,
    /// Project number, 1 through 4.
    pub project: u8,
    /// Number of code reviews already received.
    pub reviews: u32,
    /// Number of patch releases since the last review.
    pub patches: u32,
    /// The version tag itself, e.g. `v2.3.1`.
    pub version: String,
}

impl ProjectReference {
    /// Parse project details from a reference string.
    ///
    /// The last path segment of the reference (e.g. `refs/tags/v2.3.1`) is
    /// taken as the candidate version tag.
    pub fn parse(owner: &str, repo: &str, reference: &str) -> Result<Self, ParseError> {
        let version = reference.rsplit('/').next().unwrap_or(reference);

        let captures = VERSION_RE
            .captures(version)
            .ok_or_else(|| ParseError { reference: reference.to_string() })?;

        // The pattern guarantees each group is a short decimal number.
        let project = captures[1].parse().map_err(|_| ParseError {
            reference: reference.to_string(),
        })?;
        let reviews = captures[2].parse().map_err(|_| ParseError {
            reference: reference.to_string(),
        })?;
        let patches = captures[3].parse().map_err(|_| ParseError {
            reference: reference.to_string(),
        })?;

        let parsed = Self {
            owner: owner.to_string(),
            main_repo: format!("{owner}/{repo}"),
            test_repo: format!("{owner}/{TEST_DIR}"),
            project,
            reviews,
            patches,
            version: version.to_string(),
        };

        println!("Project version: {}", parsed.version);
        println!("Project number:  {}", parsed.project);
        println!("Project reviews: {}", parsed.reviews);
        println!("Project patches: {}", parsed.patches);

        Ok(parsed)
    }
}

/// Parse project details inside a named log group.
pub fn parse_project(owner: &str, repo: &str, reference: &str) -> Result<ProjectReference, ParseError> {
    output::group_start("Parsing project details...");
    let result = ProjectReference::parse(owner, repo, reference);
    output::group_end();
    result
}
