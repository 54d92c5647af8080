// src/core/file_source.rs
//! Turns filesystem paths into upload candidates

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::types::{DocumentKind, FileCandidate};

/// Read a file into a candidate. The MIME type is inferred from the
/// extension; unknown extensions leave it unset so validation rejects them.
pub async fn load_candidate(path: &Path) -> Result<FileCandidate> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Path has no file name: {}", path.display()))?
        .to_string();

    let metadata = fs::metadata(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    if !metadata.is_file() {
        anyhow::bail!("Not a regular file: {}", path.display());
    }

    let content = fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let mime_type = DocumentKind::from_file_name(&name).map(|kind| kind.mime_type());
    debug!(
        "Loaded {} ({} bytes, mime {:?})",
        path.display(),
        content.len(),
        mime_type
    );

    Ok(FileCandidate::new(name, mime_type, content))
}

/// Load every path of one drop, failing on the first unreadable file.
pub async fn load_candidates(paths: &[PathBuf]) -> Result<Vec<FileCandidate>> {
    let mut candidates = Vec::with_capacity(paths.len());
    for path in paths {
        candidates.push(load_candidate(path).await?);
    }
    Ok(candidates)
}
