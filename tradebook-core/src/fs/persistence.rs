//! JSON snapshot files for the embedded store.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Writes `snapshot` to `path` atomically.
///
/// The JSON goes to a sibling `.tmp` file which is synced and then renamed
/// over the target, so a crash mid-write leaves the previous snapshot intact.
///
/// # Arguments
///
/// * `path` - The snapshot file.
/// * `snapshot` - The state to serialize.
///
/// # Returns
///
/// * `Ok(())` on success.
/// * `Err` on serialization or IO failure.
pub fn save_snapshot<T: Serialize>(path: &Path, snapshot: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let json = serde_json::to_vec(snapshot).context("Failed to serialize snapshot")?;

    let temp_path = path.with_extension("tmp");
    let mut temp_file = std::fs::File::create(&temp_path)
        .with_context(|| format!("Failed to create {}", temp_path.display()))?;
    temp_file
        .write_all(&json)
        .context("Failed to write snapshot")?;
    temp_file.sync_all().context("Failed to sync snapshot")?;

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to move snapshot into {}", path.display()))?;

    Ok(())
}

/// Reads a snapshot written by [`save_snapshot`].
///
/// Returns `Ok(None)` when the file does not exist yet.
pub fn load_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = std::io::BufReader::new(file);
    let snapshot = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(snapshot))
}
