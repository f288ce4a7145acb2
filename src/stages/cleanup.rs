//! Cleanup stage (post).
//!
//! Archives the local Maven repository under the cache key saved by setup.
//! Skips the save when the key already matches the recorded cache. Cache
//! trouble is never fatal; it is recorded as a warning and the stage
//! completes.

use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::exec::CheckedCommand;
use crate::output;
use crate::state;

use super::{Outcome, StageCtx};

/// Run the cleanup stage body.
pub fn run(stage: &mut StageCtx) -> Result<Outcome> {
    stage.state = state::restore(state::env_lookup)?;

    output::group_start("Saving Maven cache...");
    let saved = save_cache(stage);
    output::group_end();

    if let Err(error) = saved {
        stage.warnings.warn(&format!("Encountered issues saving cache. {error}"));
    }

    Ok(Outcome::Completed)
}

fn save_cache(stage: &mut StageCtx) -> Result<()> {
    let Some(key) = stage.state.maven_key.clone() else {
        println!("Unable to cache; key not found");
        return Ok(());
    };

    if stage.state.maven_cache.as_deref() == Some(key.as_str()) {
        println!("Skipping; cache already exists.");
        return Ok(());
    }

    println!("Saving {key} to cache...");

    let home = dirs::home_dir().ok_or_else(|| anyhow!("home directory not found"))?;
    let archive = cache_dir()?.join(format!("{key}.tgz"));

    let archive_path = archive.to_string_lossy().into_owned();
    let home_path = home.to_string_lossy().into_owned();

    CheckedCommand::new("tar")
        .args(["-czf", archive_path.as_str(), "-C", home_path.as_str(), ".m2"])
        .title(format!("Archiving Maven repository as {key}"))
        .error("Unable to archive Maven repository")
        .run()?;

    stage.state.maven_cache = Some(key.clone());
    stage.status.insert("mavenCache".to_string(), archive.to_string_lossy().into_owned());
    println!("Saved cache: {}", archive.display());

    Ok(())
}

fn cache_dir() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .ok_or_else(|| anyhow!("cache directory not found"))?
        .join("revgate");

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
