//! Source scanning for leftover debug artifacts.
//!
//! Recursively counts regex matches across source files under a directory.
//! The scanner only reports counts; whether a count beyond the expected
//! baseline is a warning is the caller's policy.

use std::path::Path;

use regex::Regex;
use walkdir::WalkDir;

/// Pattern matching TODO markers left in comments.
pub const TODO_PATTERN: &str = r"\bTODO\b";

/// Pattern matching Java `main` method declarations.
pub const MAIN_METHOD_PATTERN: &str = r"(public\s+static|static\s+public)\s+void\s+main\b";

/// Count matches of `pattern` across files with `extension` under `root`.
///
/// Files whose name equals `exclude` are skipped. Unreadable files are
/// skipped rather than failing the scan.
pub fn count_matches(
    root: &Path,
    pattern: &Regex,
    extension: &str,
    exclude: Option<&str>,
) -> std::io::Result<usize> {
    let mut total = 0;

    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();

        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }

        if let Some(excluded) = exclude {
            if path.file_name().and_then(|n| n.to_str()) == Some(excluded) {
                continue;
            }
        }

        let Ok(contents) = std::fs::read_to_string(path) else {
            tracing::debug!(path = %path.display(), "skipping unreadable file");
            continue;
        };

        let count = pattern.find_iter(&contents).count();
        if count > 0 {
            tracing::debug!(path = %path.display(), count, "pattern matches");
            total += count;
        }
    }

    Ok(total)
}
