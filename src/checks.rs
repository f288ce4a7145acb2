//! Environment and build checks.
//!
//! Runs tool version checks and a strict compile of the cloned project with
//! all compiler and javadoc warnings promoted to failures, then scans the
//! sources for leftover debug artifacts. Build failures are fatal; leftover
//! TODO markers and surplus `main` methods are counted warnings, so the
//! review can proceed with the run flagged.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::exec::CheckedCommand;
use crate::output;
use crate::scan;
use crate::warnings::WarningTracker;
use crate::{ENTRY_POINT, MAIN_DIR};

static TODO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(scan::TODO_PATTERN).expect("todo pattern is valid"));
static MAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(scan::MAIN_METHOD_PATTERN).expect("main pattern is valid"));

/// Maven flags promoting compiler and doc warnings to failures.
const STRICT_COMPILE_FLAGS: &[&str] = &[
    "-Dmaven.compiler.showWarnings=true",
    "-Dmaven.compiler.showDeprecation=true",
    "-Dmaven.compiler.failOnWarning=true",
    "-Dmaven.javadoc.failOnWarnings=true",
    "-Ddoclint=all",
];

/// Check tool versions, compile the project, and scan its sources.
pub fn run_checks(warnings: &mut WarningTracker) -> Result<()> {
    output::group_start("Checking environment...");
    let environment = check_environment();
    output::group_end();
    environment?;

    output::group_start("Compiling project...");
    let compile = compile_project();
    output::group_end();
    compile?;

    output::group_start("Scanning source code...");
    let scanned = scan_sources(warnings);
    output::group_end();
    scanned?;

    Ok(())
}

fn check_environment() -> Result<()> {
    CheckedCommand::new("java")
        .args(["--version"])
        .title("Checking Java runtime version")
        .error("Unable to check Java runtime version")
        .run()?;

    CheckedCommand::new("javac")
        .args(["--version"])
        .title("Checking Java compiler version")
        .error("Unable to check Java compiler version")
        .run()?;

    CheckedCommand::new("mvn")
        .args(["--version"])
        .title("Checking Maven version")
        .error("Unable to check Maven version")
        .run()?;

    Ok(())
}

fn compile_project() -> Result<()> {
    CheckedCommand::new("mvn")
        .args(["dependency:go-offline"])
        .current_dir(MAIN_DIR)
        .title("Resolving project dependencies")
        .error("Unable to resolve project dependencies")
        .run()?;

    let mut args = vec!["clean", "compile"];
    args.extend_from_slice(STRICT_COMPILE_FLAGS);

    CheckedCommand::new("mvn")
        .args(args)
        .current_dir(MAIN_DIR)
        .title("Compiling project with all warnings enabled")
        .error("Unable to compile project without warnings")
        .run()?;

    let classes = format!("{MAIN_DIR}/target/classes");

    CheckedCommand::new("ls")
        .args(["-m", classes.as_str()])
        .title("Listing compiled class files")
        .error("Unable to list compiled class files")
        .run()?;

    Ok(())
}

fn scan_sources(warnings: &mut WarningTracker) -> Result<()> {
    let sources = std::path::Path::new(MAIN_DIR).join("src/main/java");

    output::show_title("Checking for TODO comments...");
    let todos = scan::count_matches(&sources, &TODO_RE, "java", None)?;

    if todos > 0 {
        warnings.warn(&format!(
            "Found {todos} TODO comment{} in the source code. Resolve these before review.",
            plural(todos)
        ));
    } else {
        output::show_success("No TODO comments found.");
    }

    output::show_title(&format!("Checking for main methods outside {ENTRY_POINT}..."));
    let mains = scan::count_matches(&sources, &MAIN_RE, "java", Some(ENTRY_POINT))?;

    // The designated entry point keeps its main method; anything else left
    // over from debugging flags the run.
    if mains > 0 {
        warnings.warn(&format!(
            "Found {mains} main method{} outside {ENTRY_POINT}. Remove these before review.",
            plural(mains)
        ));
    } else {
        output::show_success(&format!("No main methods found outside {ENTRY_POINT}."));
    }

    Ok(())
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
