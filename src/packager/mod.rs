//! Packager module builds the intermediate artifacts handed to the converter.
//!
//! Comic works are bundled into a `.cbc` container (the chapter archives plus a
//! `comics.txt` index); text works get an HTML table of contents linking to the
//! chapter documents that already live in the work directory. Chapter order is
//! always the caller's order: nothing here re-sorts.

use async_trait::async_trait;
use memmap2::MmapOptions;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::path_utils::path_to_string_lossy;
use crate::types::GroupingKind;

pub mod comic;
pub mod text;

pub use comic::{COMIC_TOC_FILE, ComicPackager, comic_container, comic_table_of_contents};
pub use text::{NO_TITLE, TextPackager, chapter_title, text_table_of_contents};

/// Artifacts produced for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedWork {
    /// The file the converter reads (container or table of contents).
    pub source: PathBuf,
    /// Files to remove once the converter has run, `source` included.
    pub intermediates: Vec<PathBuf>,
}

/// Common interface for the per-kind packaging pipelines.
#[async_trait]
pub trait Packager: Send + Sync {
    /// Packages `chapters` (absolute paths, reading order) into `destination`.
    ///
    /// # Parameters
    /// * `chapters` - Chapter files in the order they must appear
    /// * `destination` - Directory receiving the intermediate files, created if absent
    /// * `title` - Base name of the produced container or table of contents
    async fn package(
        &self,
        chapters: &[PathBuf],
        destination: &Path,
        title: &str,
    ) -> Result<PackagedWork>;
}

/// Returns the packager for a grouping kind.
pub fn packager_for(kind: GroupingKind) -> Box<dyn Packager> {
    match kind {
        GroupingKind::Comic => Box::new(ComicPackager),
        GroupingKind::Text => Box::new(TextPackager),
    }
}

/// Options for every archive the library writes: uncompressed entries.
pub(crate) fn stored_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .unix_permissions(0o644)
}

/// Writes an uncompressed zip at `archive_path` from `(file, entry name)` pairs, in order.
///
/// The archive is finished and closed before this returns. Blocking; call it
/// through `spawn_blocking` from async code.
pub(crate) fn write_stored_archive(
    archive_path: &Path,
    entries: &[(PathBuf, String)],
) -> Result<()> {
    let file = File::create(archive_path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!(
                "Failed to create archive '{}': {}",
                path_to_string_lossy(archive_path),
                e
            ),
        ))
    })?;

    let mut zip = ZipWriter::new(file);
    let options = stored_options();

    for (path, entry_name) in entries {
        add_file_entry(&mut zip, path, entry_name, options)?;
    }

    zip.finish()?;
    Ok(())
}

fn add_file_entry(
    zip: &mut ZipWriter<File>,
    path: &Path,
    entry_name: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    let file = File::open(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open '{}': {}", path_to_string_lossy(path), e),
        ))
    })?;

    zip.start_file(entry_name, options)?;

    // Empty files cannot be memory mapped.
    if file.metadata()?.len() == 0 {
        return Ok(());
    }

    // SAFETY: read-only map, dropped before the file handle.
    let mmap = unsafe { MmapOptions::new().map(&file)? };
    zip.write_all(&mmap[..])?;

    Ok(())
}
