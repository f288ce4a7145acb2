//! Cross-stage run state.
//!
//! The hosting pipeline runs each stage as a separate process and provides a
//! flat key-value store between them: values are saved by appending
//! `key=value` lines to the state file named by `GITHUB_STATE`, and restored
//! in later stages from `STATE_{key}` environment variables. Alongside the
//! individual values, a `keys` entry holds a JSON array of every saved key
//! name so a later stage knows what to restore.
//!
//! Rather than passing the raw string bag around, the known keys are
//! modelled as a typed [`RunState`] record that is validated on restore.
//! Save and restore never run concurrently; stage ordering is guaranteed by
//! the pipeline itself.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::output;

/// Every key the stages may persist, in save order.
pub const STATE_KEYS: &[&str] = &[
    "owner",
    "mainRepo",
    "testRepo",
    "project",
    "reviews",
    "patches",
    "version",
    "releaseUrl",
    "releaseTag",
    "releaseDate",
    "runNumber",
    "runId",
    "runUrl",
    "issueNumber",
    "issueUrl",
    "branch",
    "type",
    "pullNumber",
    "pullUrl",
    "pullDate",
    "mavenKey",
    "mavenCache",
];

/// Name of the index entry listing the saved keys.
const KEYS_INDEX: &str = "keys";

/// Error type for state persistence.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The key index names a key no stage ever saves.
    #[error("unknown state key: {key}")]
    UnknownKey { key: String },

    /// A restored value failed numeric validation.
    #[error("invalid value for state {key}: {value}")]
    Invalid { key: String, value: String },

    /// The key index entry is missing entirely.
    #[error("no saved state found; was the setup stage run?")]
    MissingIndex,

    /// The key index entry is not a JSON array of strings.
    #[error("malformed state key index: {0}")]
    BadIndex(#[from] serde_json::Error),

    /// Writing the state file failed.
    #[error("unable to write state file: {0}")]
    Io(#[from] std::io::Error),
}

/// Typed record of everything remembered between stages.
///
/// Fields are optional because each stage fills in its own slice; a key that
/// was never saved restores as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    pub owner: Option<String>,
    pub main_repo: Option<String>,
    pub test_repo: Option<String>,
    pub project: Option<u8>,
    pub reviews: Option<u32>,
    pub patches: Option<u32>,
    pub version: Option<String>,
    pub release_url: Option<String>,
    pub release_tag: Option<String>,
    pub release_date: Option<String>,
    pub run_number: Option<u64>,
    pub run_id: Option<u64>,
    pub run_url: Option<String>,
    pub issue_number: Option<u64>,
    pub issue_url: Option<String>,
    pub branch: Option<String>,
    pub kind: Option<String>,
    pub pull_number: Option<u64>,
    pub pull_url: Option<String>,
    pub pull_date: Option<String>,
    pub maven_key: Option<String>,
    pub maven_cache: Option<String>,
}

impl RunState {
    /// Get the value saved under `key`, if set.
    fn get(&self, key: &str) -> Option<String> {
        match key {
            "owner" => self.owner.clone(),
            "mainRepo" => self.main_repo.clone(),
            "testRepo" => self.test_repo.clone(),
            "project" => self.project.map(|v| v.to_string()),
            "reviews" => self.reviews.map(|v| v.to_string()),
            "patches" => self.patches.map(|v| v.to_string()),
            "version" => self.version.clone(),
            "releaseUrl" => self.release_url.clone(),
            "releaseTag" => self.release_tag.clone(),
            "releaseDate" => self.release_date.clone(),
            "runNumber" => self.run_number.map(|v| v.to_string()),
            "runId" => self.run_id.map(|v| v.to_string()),
            "runUrl" => self.run_url.clone(),
            "issueNumber" => self.issue_number.map(|v| v.to_string()),
            "issueUrl" => self.issue_url.clone(),
            "branch" => self.branch.clone(),
            "type" => self.kind.clone(),
            "pullNumber" => self.pull_number.map(|v| v.to_string()),
            "pullUrl" => self.pull_url.clone(),
            "pullDate" => self.pull_date.clone(),
            "mavenKey" => self.maven_key.clone(),
            "mavenCache" => self.maven_cache.clone(),
            _ => None,
        }
    }

    /// Set the field behind `key` from its string form, validating numbers.
    fn set(&mut self, key: &str, value: String) -> Result<(), StateError> {
        fn number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, StateError> {
            value.parse().map_err(|_| StateError::Invalid {
                key: key.to_string(),
                value: value.to_string(),
            })
        }

        match key {
            "owner" => self.owner = Some(value),
            "mainRepo" => self.main_repo = Some(value),
            "testRepo" => self.test_repo = Some(value),
            "project" => self.project = Some(number(key, &value)?),
            "reviews" => self.reviews = Some(number(key, &value)?),
            "patches" => self.patches = Some(number(key, &value)?),
            "version" => self.version = Some(value),
            "releaseUrl" => self.release_url = Some(value),
            "releaseTag" => self.release_tag = Some(value),
            "releaseDate" => self.release_date = Some(value),
            "runNumber" => self.run_number = Some(number(key, &value)?),
            "runId" => self.run_id = Some(number(key, &value)?),
            "runUrl" => self.run_url = Some(value),
            "issueNumber" => self.issue_number = Some(number(key, &value)?),
            "issueUrl" => self.issue_url = Some(value),
            "branch" => self.branch = Some(value),
            "type" => self.kind = Some(value),
            "pullNumber" => self.pull_number = Some(number(key, &value)?),
            "pullUrl" => self.pull_url = Some(value),
            "pullDate" => self.pull_date = Some(value),
            "mavenKey" => self.maven_key = Some(value),
            "mavenCache" => self.maven_cache = Some(value),
            _ => return Err(StateError::UnknownKey { key: key.to_string() }),
        }

        Ok(())
    }

    /// The set fields as ordered `(key, value)` pairs.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        STATE_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| ((*key).to_string(), value)))
            .collect()
    }

    /// Log the current state as a single JSON object line.
    pub fn log_snapshot(&self) {
        let map: serde_json::Map<String, serde_json::Value> = self
            .to_pairs()
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();

        println!("states: {}", serde_json::Value::Object(map));
    }
}

/// The pipeline's state file, written during save.
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// Create a handle to the state file at `path` (usually `$GITHUB_STATE`).
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Persist every set field of `state`, plus the `keys` index entry.
    pub fn save(&self, state: &RunState) -> Result<(), StateError> {
        output::group_start("Saving state...");
        let result = self.save_inner(state);
        output::group_end();
        result
    }

    fn save_inner(&self, state: &RunState) -> Result<(), StateError> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;

        let pairs = state.to_pairs();

        for (key, value) in &pairs {
            writeln!(file, "{key}={value}")?;
            println!("Saved value {value} for state {key}.");
        }

        let keys: Vec<&str> = pairs.iter().map(|(key, _)| key.as_str()).collect();
        writeln!(file, "{KEYS_INDEX}={}", serde_json::to_string(&keys)?)?;

        Ok(())
    }
}

/// Restore a [`RunState`] through a key lookup.
///
/// In a live stage the lookup reads `STATE_{key}` environment variables (see
/// [`env_lookup`]); tests inject a map instead. Keys listed in the index but
/// absent from the store restore as unset.
pub fn restore<F>(lookup: F) -> Result<RunState, StateError>
where
    F: Fn(&str) -> Option<String>,
{
    output::group_start("Restoring state...");
    let result = restore_inner(lookup);
    output::group_end();
    result
}

fn restore_inner<F>(lookup: F) -> Result<RunState, StateError>
where
    F: Fn(&str) -> Option<String>,
{
    let index = lookup(KEYS_INDEX).ok_or(StateError::MissingIndex)?;
    let keys: Vec<String> = serde_json::from_str(&index)?;
    println!("Loaded keys: {}", keys.join(", "));

    let mut state = RunState::default();

    for key in &keys {
        if !STATE_KEYS.contains(&key.as_str()) {
            return Err(StateError::UnknownKey { key: key.clone() });
        }

        if let Some(value) = lookup(key) {
            println!("Restored value {value} for state {key}.");
            state.set(key, value)?;
        }
    }

    Ok(state)
}

/// Lookup for values the runner exposes as `STATE_{key}` variables.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(format!("STATE_{key}")).ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use super::*;

    fn sample_state() -> RunState {
        RunState {
            owner: Some("octocat".to_string()),
            main_repo: Some("octocat/project-octocat".to_string()),
            test_repo: Some("octocat/project-tests".to_string()),
            project: Some(2),
            reviews: Some(3),
            patches: Some(1),
            version: Some("v2.3.1".to_string()),
            release_url: Some("https://github.com/o/r/releases/tag/v2.3.1".to_string()),
            run_number: Some(17),
            run_id: Some(90210),
            issue_number: Some(5),
            maven_key: Some("octocat-maven-2026-08".to_string()),
            ..RunState::default()
        }
    }

    fn saved_map(state: &RunState) -> HashMap<String, String> {
        let mut map: HashMap<String, String> =
            state.to_pairs().into_iter().collect();
        let keys: Vec<String> = state.to_pairs().into_iter().map(|(k, _)| k).collect();
        map.insert("keys".to_string(), serde_json::to_string(&keys).unwrap());
        map
    }

    #[test]
    fn test_round_trip_is_identity() {
        let state = sample_state();
        let map = saved_map(&state);

        let restored = restore(|key| map.get(key).cloned()).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_state_file_save_writes_key_value_lines() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("state");

        let state = sample_state();
        StateFile::new(&path).save(&state).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("owner=octocat\n"));
        assert!(contents.contains("project=2\n"));
        assert!(contents.contains("version=v2.3.1\n"));

        // The keys index lists exactly the saved keys, in save order.
        let keys_line = contents.lines().find(|l| l.starts_with("keys=")).unwrap();
        let keys: Vec<String> =
            serde_json::from_str(keys_line.strip_prefix("keys=").unwrap()).unwrap();
        assert_eq!(keys.first().map(String::as_str), Some("owner"));
        assert!(keys.contains(&"mavenKey".to_string()));
        assert!(!keys.contains(&"branch".to_string()));
    }

    #[test]
    fn test_restore_from_saved_file_round_trips() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("state");

        let state = sample_state();
        StateFile::new(&path).save(&state).unwrap();

        // Parse the file the way the runner would before exposing STATE_ vars.
        let contents = fs::read_to_string(&path).unwrap();
        let map: HashMap<String, String> = contents
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let restored = restore(|key| map.get(key).cloned()).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_restore_without_index_fails() {
        let err = restore(|_| None).unwrap_err();
        assert!(matches!(err, StateError::MissingIndex));
    }

    #[test]
    fn test_restore_rejects_unknown_key() {
        let mut map = HashMap::new();
        map.insert("keys".to_string(), r#"["owner","mystery"]"#.to_string());
        map.insert("owner".to_string(), "octocat".to_string());
        map.insert("mystery".to_string(), "boo".to_string());

        let err = restore(|key| map.get(key).cloned()).unwrap_err();
        assert!(matches!(err, StateError::UnknownKey { key } if key == "mystery"));
    }

    #[test]
    fn test_restore_rejects_invalid_number() {
        let mut map = HashMap::new();
        map.insert("keys".to_string(), r#"["project"]"#.to_string());
        map.insert("project".to_string(), "two".to_string());

        let err = restore(|key| map.get(key).cloned()).unwrap_err();
        assert!(matches!(err, StateError::Invalid { key, .. } if key == "project"));
    }

    #[test]
    fn test_indexed_key_missing_from_store_restores_unset() {
        let mut map = HashMap::new();
        map.insert("keys".to_string(), r#"["owner","version"]"#.to_string());
        map.insert("owner".to_string(), "octocat".to_string());

        let restored = restore(|key| map.get(key).cloned()).unwrap();
        assert_eq!(restored.owner.as_deref(), Some("octocat"));
        assert!(restored.version.is_none());
    }
}
