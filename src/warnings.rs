//! Warning accumulation.
//!
//! Warnings are non-fatal: the stage keeps going, but every warning is
//! counted and a single run-level summary is emitted at stage end when at
//! least one occurred. The tracker is an explicit value threaded through the
//! stage rather than process-global state.

use crate::output;

/// Counts warnings raised during one stage invocation.
#[derive(Debug, Default)]
pub struct WarningTracker {
    count: u32,
}

impl WarningTracker {
    /// Create a fresh tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and display a warning.
    pub fn warn(&mut self, text: &str) {
        self.count += 1;
        output::show_warning(text);
    }

    /// Number of warnings recorded so far.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The end-of-stage summary line, or `None` when nothing was recorded.
    pub fn summary(&self, phase: &str) -> Option<String> {
        match self.count {
            0 => None,
            1 => Some(format!(
                "There was 1 warning in the {phase} phase. View the run log for details."
            )),
            n => Some(format!(
                "There were {n} warnings in the {phase} phase. View the run log for details."
            )),
        }
    }
}
