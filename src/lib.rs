//! # Revgate
//!
//! CI gate for classroom code review requests.
//!
//! Students request a code review by tagging a release of their project.
//! Revgate runs inside the hosting CI pipeline as three stages that verify
//! the request before a reviewer ever sees it:
//!
//! - **setup**: parse the version tag, confirm the release exists and its
//!   test run passed, confirm the functionality review gate is approved and
//!   no design review already passed, and clone the released project.
//! - **request**: compile the project with all compiler and javadoc
//!   warnings promoted to failures, and scan the sources for leftover debug
//!   artifacts (TODO comments, stray `main` methods).
//! - **cleanup**: save the dependency cache for the next run.
//!
//! Stages share persisted state through the pipeline's flat key-value store
//! and are strictly sequential; failures surface as single-line summaries
//! in the run log.

#![forbid(unsafe_code)]

pub mod checks;
pub mod context;
pub mod exec;
pub mod github;
pub mod issues;
pub mod output;
pub mod reference;
pub mod release;
pub mod scan;
pub mod stages;
pub mod state;
pub mod warnings;

pub use context::ActionContext;
pub use exec::{CheckedCommand, CommandError};
pub use github::{GitHub, GitHubError, Issue, Release, WorkflowRun};
pub use issues::{GateError, IssueApproval};
pub use reference::{ParseError, ProjectReference};
pub use release::{ReleaseVerification, VerifyError};
pub use stages::{Outcome, StageCtx};
pub use state::{RunState, StateError, StateFile};
pub use warnings::WarningTracker;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "revgate";

/// Directory the student's project is cloned into
pub const MAIN_DIR: &str = "project-main";

/// Shared test repository name; must match the pom.xml and repository name
pub const TEST_DIR: &str = "project-tests";

/// Designated entry point allowed to keep a `main` method
pub const ENTRY_POINT: &str = "Driver.java";
