//! Styled console output and workflow log commands.
//!
//! Stage output is read in the hosting CI run log, so user-facing lines are
//! written straight to stdout with ANSI styling, while `::group::`,
//! `::warning::`, and `::error::` lines use the runner's workflow command
//! syntax so they surface outside the collapsed log groups.

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const BLACK: &str = "\x1b[30m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BG_RED: &str = "\x1b[41m";
const BG_GREEN: &str = "\x1b[42m";
const BG_YELLOW: &str = "\x1b[43m";

/// Print a bold cyan section title.
pub fn show_title(text: &str) {
    println!("\n{CYAN}{BOLD}{text}{RESET}");
}

fn labeled(color: &str, bg: &str, label: &str, text: &str) {
    println!("{bg}{BLACK}{BOLD}{label}:{RESET} {color}{text}{RESET}");
}

/// Print a styled error line inside the current log group.
pub fn show_error(text: &str) {
    labeled(RED, BG_RED, "Error", text);
}

/// Print a styled success line.
pub fn show_success(text: &str) {
    labeled(GREEN, BG_GREEN, "Success", text);
}

/// Print a styled warning line.
pub fn show_warning(text: &str) {
    labeled(YELLOW, BG_YELLOW, "Warning", text);
}

/// Open a collapsible log group in the run log.
pub fn group_start(name: &str) {
    println!("::group::{name}");
}

/// Close the current log group.
pub fn group_end() {
    println!("::endgroup::");
}

/// Mark the stage as failed with a single-line summary.
///
/// Emitted outside any group so it is always visible in the run summary.
pub fn set_failed(message: &str) {
    println!("::error::{message}");
}

/// Emit a run-level warning annotation.
pub fn notice_warning(message: &str) {
    println!("::warning::{message}");
}

/// Register a value with the runner's log masker.
pub fn mask_secret(value: &str) {
    println!("::add-mask::{value}");
}
