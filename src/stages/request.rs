//! Request stage (main).
//!
//! Restores the state saved by setup, checks the build environment, compiles
//! the project with strict warnings, and scans the sources. The final
//! approval step, pushing a review branch and opening or updating the pull
//! request, resolves as an unsupported outcome: the prior-review matching
//! rule is not specified upstream, and a review request must not be reported
//! as successful until it is.

use anyhow::Result;

use crate::output;
use crate::{checks, state};

use super::{Outcome, StageCtx};

const NOT_SUPPORTED: &str = "Requesting code review is not yet implemented. \
    Contact the instructor for instructions on how to request code review.";

/// Run the request stage body.
pub fn run(stage: &mut StageCtx) -> Result<Outcome> {
    stage.state = state::restore(state::env_lookup)?;

    checks::run_checks(&mut stage.warnings)?;
    stage.status.insert("checks".to_string(), "passed".to_string());

    output::group_start("Requesting code review...");

    Ok(Outcome::NotSupported(NOT_SUPPORTED.to_string()))
}
