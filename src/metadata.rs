//! Loading and saving of per-work `metadata.json` documents.
//!
//! A persisted document always wins: its `chapters` list is the reading order.
//! Without one, the chapter order is derived from the work directory, sorted by
//! file name, and every other field is left empty.

use log::debug;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{Error, Result};
use crate::path_utils::{get_file_name_lossy, is_hidden_file};
use crate::types::{GroupingKind, Metadata};

/// File name of the persisted metadata document inside a work directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Path of the metadata document for `work_dir`.
pub fn metadata_path(work_dir: &Path) -> PathBuf {
    work_dir.join(METADATA_FILE)
}

/// Whether `work_dir` has an authored metadata document.
pub async fn has_metadata(work_dir: &Path) -> bool {
    fs::metadata(metadata_path(work_dir))
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Loads the metadata for a work.
///
/// # Returns
///
/// * `Ok(Metadata)` - The parsed document, or derived metadata if none exists
/// * `Err(Error::Parse)` - The document exists but is not valid metadata JSON
/// * `Err(Error::Io)` - The document or the directory could not be read
pub async fn load(work_dir: &Path, kind: GroupingKind) -> Result<Metadata> {
    let path = metadata_path(work_dir);

    if !has_metadata(work_dir).await {
        debug!("No metadata document in {:?}, deriving chapter order", work_dir);
        return Ok(Metadata::with_chapters(
            discover_chapters(work_dir, kind).await?,
        ));
    }

    let content = fs::read_to_string(&path).await?;
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(&content);
    serde_json::from_str(content).map_err(|source| Error::Parse { path, source })
}

/// Writes `metadata` to `work_dir/metadata.json`, replacing any existing document.
///
/// Only non-empty fields are written; the document is indented with four spaces.
pub async fn save(work_dir: &Path, metadata: &Metadata) -> Result<()> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    metadata.serialize(&mut serializer)?;

    fs::write(metadata_path(work_dir), buffer).await?;
    debug!("Saved metadata for {:?}", work_dir);
    Ok(())
}

/// Lists chapter files directly inside `work_dir`, sorted by file name.
///
/// Only regular, non-hidden files carrying the kind's chapter extension count.
pub async fn discover_chapters(work_dir: &Path, kind: GroupingKind) -> Result<Vec<String>> {
    let mut entries = fs::read_dir(work_dir).await?;
    let mut chapters = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if is_hidden_file(&path) || !kind.is_chapter_file(&path) {
            continue;
        }
        if fs::metadata(&path).await?.is_file() {
            chapters.push(get_file_name_lossy(&path));
        }
    }

    chapters.par_sort();
    Ok(chapters)
}
