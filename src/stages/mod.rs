//! Stage orchestration.
//!
//! A review request runs as three pipeline stages: `setup` (pre) verifies
//! the release and review gates and clones the project, `request` (main)
//! checks the build and would open the pull request, and `cleanup` (post)
//! saves the dependency cache. Stages share persisted state and each runs
//! as its own process; steps within a stage are strictly sequential.
//!
//! A failed step aborts the remaining steps of its stage but never rolls
//! back side effects already performed. Whatever happens, the stage epilogue
//! logs the status and state snapshot and the warning summary.

pub mod cleanup;
pub mod request;
pub mod setup;

use std::collections::BTreeMap;

use anyhow::Result;

use crate::output;
use crate::state::RunState;
use crate::warnings::WarningTracker;

/// How a stage body resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every step finished.
    Completed,

    /// The stage reached a step this tool deliberately does not support.
    ///
    /// Still fails the stage (the pipeline must not report a successful
    /// review request), but is reported as an explicit unsupported outcome
    /// rather than a generic error.
    NotSupported(String),
}

/// Mutable context threaded through the steps of one stage.
#[derive(Debug, Default)]
pub struct StageCtx {
    /// Warnings recorded so far
    pub warnings: WarningTracker,

    /// Cross-stage state being built or restored
    pub state: RunState,

    /// Status of intermediate steps, for the epilogue snapshot
    pub status: BTreeMap<String, String>,
}

impl StageCtx {
    /// Create a fresh stage context.
    pub fn new() -> Self {
        Self::default()
    }

    fn log_status(&self) {
        let map: serde_json::Map<String, serde_json::Value> = self
            .status
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        println!("status: {}", serde_json::Value::Object(map));
        self.state.log_snapshot();
    }
}

/// Run a stage body with failure reporting and the logging epilogue.
///
/// Returns the process exit code. `failure_prefix` leads the single-line
/// failure summary, e.g. `"Setup failed."`.
pub fn run_stage<F>(name: &str, phase: &str, failure_prefix: &str, body: F) -> i32
where
    F: FnOnce(&mut StageCtx) -> Result<Outcome>,
{
    let mut stage = StageCtx::new();

    let code = match body(&mut stage) {
        Ok(Outcome::Completed) => 0,
        Ok(Outcome::NotSupported(reason)) => {
            output::show_error(&reason);
            output::group_end();
            output::set_failed(&format!("{failure_prefix} {reason}"));
            1
        }
        Err(error) => {
            output::show_error(&format!("{error}\n"));
            output::group_end();
            output::set_failed(&format!("{failure_prefix} {error}"));
            1
        }
    };

    // Always log the snapshot, success or not.
    output::group_start(&format!("Logging {name} status..."));
    stage.log_status();
    output::group_end();

    if let Some(summary) = stage.warnings.summary(phase) {
        output::notice_warning(&summary);
    }

    code
}
