//! Pool state persisted as a JSON snapshot between invocations

use anyhow::{bail, Context, Result};
use log::debug;
use pool_ledger::{Pool, PoolSnapshot};
use std::fs;
use std::path::{Path, PathBuf};

pub fn load(path: &Path) -> Result<Pool> {
    if !path.exists() {
        bail!(
            "No pool state at {}\n\
             Create one with: cpamm init",
            path.display()
        );
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pool state: {}", path.display()))?;
    let snapshot: PoolSnapshot = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse pool state: {}", path.display()))?;

    debug!("loaded pool state from {}", path.display());
    Ok(Pool::from_snapshot(snapshot))
}

/// Write the snapshot next to `path` first, then move it into place
pub fn save(path: &Path, pool: &Pool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(&pool.snapshot())?;
    let staging = staging_path(path);
    fs::write(&staging, json)
        .with_context(|| format!("Failed to write pool state: {}", staging.display()))?;
    fs::rename(&staging, path)
        .with_context(|| format!("Failed to replace pool state: {}", path.display()))?;

    debug!("saved pool state to {}", path.display());
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
