use async_trait::async_trait;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::task::spawn_blocking;

use crate::error::Result;
use crate::packager::{PackagedWork, Packager, write_stored_archive};
use crate::path_utils::{get_file_name_lossy, get_file_stem_lossy};

/// Name of the index file the converter expects inside a `.cbc` container.
pub const COMIC_TOC_FILE: &str = "comics.txt";

/// Writes `destination/comics.txt`, one `file name:title` line per chapter.
///
/// The title is the chapter file name without its extension. `destination` is
/// created if absent.
pub async fn comic_table_of_contents(chapters: &[PathBuf], destination: &Path) -> Result<PathBuf> {
    fs::create_dir_all(destination).await?;

    let content: String = chapters
        .iter()
        .map(|chapter| {
            format!(
                "{}:{}\n",
                get_file_name_lossy(chapter),
                get_file_stem_lossy(chapter)
            )
        })
        .collect();

    let toc = destination.join(COMIC_TOC_FILE);
    fs::write(&toc, content).await?;
    debug!("Wrote comic table of contents {:?}", toc);
    Ok(toc)
}

/// Builds `destination/<title>.cbc`: every chapter archive verbatim, then the index.
///
/// Entries are named by base name and stored uncompressed, in the given order.
pub async fn comic_container(
    chapters: &[PathBuf],
    destination: &Path,
    toc: &Path,
    title: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(destination).await?;

    let container = destination.join(format!("{}.cbc", title));
    let mut entries: Vec<(PathBuf, String)> = chapters
        .iter()
        .map(|path| (path.clone(), get_file_name_lossy(path)))
        .collect();
    entries.push((toc.to_path_buf(), get_file_name_lossy(toc)));

    let container_clone = container.clone();
    spawn_blocking(move || write_stored_archive(&container_clone, &entries)).await??;

    debug!(
        "Packed {} chapter(s) into container {:?}",
        chapters.len(),
        container
    );
    Ok(container)
}

/// Packages comic works as a `.cbc` container.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComicPackager;

#[async_trait]
impl Packager for ComicPackager {
    async fn package(
        &self,
        chapters: &[PathBuf],
        destination: &Path,
        title: &str,
    ) -> Result<PackagedWork> {
        let toc = comic_table_of_contents(chapters, destination).await?;

        let container = match comic_container(chapters, destination, &toc, title).await {
            Ok(container) => container,
            Err(e) => {
                if let Err(remove_error) = fs::remove_file(&toc).await {
                    warn!("Could not remove {:?}: {}", toc, remove_error);
                }
                return Err(e);
            }
        };

        Ok(PackagedWork {
            source: container.clone(),
            intermediates: vec![toc, container],
        })
    }
}
