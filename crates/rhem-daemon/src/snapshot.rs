// crates/rhem-daemon/src/snapshot.rs
//
// Whole-platform state snapshots: JSON at `<data_dir>/state.json`.
//
// Writes go to a sibling temp file first and are renamed into place, so a
// crash mid-write leaves the previous snapshot intact.

use std::fs;
use std::path::{Path, PathBuf};

use rhem_core::RhemError;
use rhem_economics::Platform;
use thiserror::Error;

pub const SNAPSHOT_FILE: &str = "state.json";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not a valid platform state: {0}")]
    Decode(#[from] RhemError),
}

pub fn snapshot_path(data_dir: &str) -> PathBuf {
    Path::new(data_dir).join(SNAPSHOT_FILE)
}

/// Read a snapshot if one exists.
pub fn load(path: &Path) -> Result<Option<Platform>, SnapshotError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    let platform = Platform::from_json(&contents)?;
    tracing::info!("Restored platform state from {}", path.display());
    Ok(Some(platform))
}

pub fn save(path: &Path, platform: &Platform) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = platform.to_json()?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    tracing::info!("Wrote platform snapshot to {}", path.display());
    Ok(())
}
