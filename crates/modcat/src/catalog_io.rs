//! Atomic on-disk persistence for the two cache-directory files (§4.6
//! "Persistence layout"): write to a temporary path, then rename, with a
//! best-effort fsync of the parent directory so the rename survives a
//! crash.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use modcat_types::Catalog;

pub fn load_catalog(path: &Path) -> Result<Option<Catalog>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file {}", path.display()))?;
    let catalog: Catalog = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse catalog JSON {}", path.display()))?;
    Ok(Some(catalog))
}

/// Write the catalog as minified JSON (§6 "Outputs").
pub fn save_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    let data = serde_json::to_vec(catalog).context("failed to serialize catalog JSON")?;
    atomic_write(path, &data)
}

/// Write the raw paginated snapshot, pretty-printed (§6 "Outputs").
pub fn save_graphql_snapshot<T: serde::Serialize>(path: &Path, snapshot: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(snapshot).context("failed to serialize GraphQL snapshot")?;
    atomic_write(path, &data)
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create cache directory {}", parent.display()))?;
    }

    let tmp = path.with_extension("tmp");
    {
        let mut f = fs::File::create(&tmp)
            .with_context(|| format!("failed to create tmp file {}", tmp.display()))?;
        f.write_all(data)
            .with_context(|| format!("failed to write tmp file {}", tmp.display()))?;
        f.sync_all().ok();
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("failed to rename {} to {}", tmp.display(), path.display()))?;

    fsync_parent_dir(path);
    Ok(())
}

fn fsync_parent_dir(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Ok(dir) = fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }
}
