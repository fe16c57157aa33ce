//! Importer module normalizes heterogeneous sources into chapters of a work.
//!
//! Comic sources are `.cbz` archives (copied verbatim) or directories of images
//! (packed into a new `.cbz`). Text sources are `.txt` files (converted to HTML)
//! or `.html` files (copied verbatim). Anything else is skipped.
//!
//! Imports are best-effort: a failing source is recorded in the
//! [`ImportReport`] and the remaining sources are still imported.

use log::{info, warn};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::Result;
use crate::types::ImportReport;

pub mod comic;
pub mod entities;
pub mod text;

pub use comic::{import_comic_source, pack_image_directory};
pub use text::{import_text_source, rewrite_stylesheet_link, text_to_html};

/// Imports comic chapters from `sources` into `destination`, in source order.
pub async fn import_comics(sources: &[PathBuf], destination: &Path) -> Result<ImportReport> {
    fs::create_dir_all(destination).await?;

    let mut report = ImportReport::default();
    for source in sources {
        let outcome = import_comic_source(source, destination).await;
        record(&mut report, source, outcome);
    }

    log_summary(destination, &report);
    Ok(report)
}

/// Imports text chapters from `sources` into `destination`, in source order.
///
/// Converted documents link `stylesheet` relative to `destination`.
pub async fn import_texts(
    sources: &[PathBuf],
    destination: &Path,
    stylesheet: &Path,
) -> Result<ImportReport> {
    fs::create_dir_all(destination).await?;

    let mut report = ImportReport::default();
    for source in sources {
        let outcome = import_text_source(source, destination, stylesheet).await;
        record(&mut report, source, outcome);
    }

    log_summary(destination, &report);
    Ok(report)
}

fn record(report: &mut ImportReport, source: &Path, outcome: Result<Option<PathBuf>>) {
    match outcome {
        Ok(Some(chapter)) => report.imported.push(chapter),
        Ok(None) => report.skipped.push(source.to_path_buf()),
        Err(e) => {
            warn!("Failed to import {:?}: {}", source, e);
            report.failed.push((source.to_path_buf(), e.to_string()));
        }
    }
}

fn log_summary(destination: &Path, report: &ImportReport) {
    info!(
        "Imported {} chapter(s) into {:?} ({} skipped, {} failed)",
        report.imported.len(),
        destination,
        report.skipped.len(),
        report.failed.len()
    );
}
