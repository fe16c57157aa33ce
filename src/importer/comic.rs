use log::debug;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::task::spawn_blocking;

use crate::error::{Error, Result};
use crate::packager::write_stored_archive;
use crate::path_utils::{absolute_path, get_file_name_lossy, has_extension, is_hidden_file};

/// Image extensions packed from a loose chapter directory.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp"];

fn is_image(path: &Path) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| has_extension(path, ext))
}

/// Imports one comic source into `destination`.
///
/// # Returns
///
/// * `Ok(Some(path))` - The chapter archive written into `destination`
/// * `Ok(None)` - The source is neither a `.cbz` file nor a directory
/// * `Err(Error)` - Copying or packing failed
pub async fn import_comic_source(source: &Path, destination: &Path) -> Result<Option<PathBuf>> {
    let source_metadata = fs::metadata(source).await?;

    if source_metadata.is_dir() {
        return pack_image_directory(source, destination).await.map(Some);
    }

    if has_extension(source, "cbz") {
        let target = destination.join(get_file_name_lossy(source));
        if absolute_path(source)? == absolute_path(&target)? {
            return Ok(Some(target));
        }
        fs::copy(source, &target).await?;
        debug!("Copied chapter archive {:?}", target);
        return Ok(Some(target));
    }

    debug!("Skipping {:?}: not a chapter archive or image directory", source);
    Ok(None)
}

/// Packs the images directly inside `directory` into `destination/<directory name>.cbz`.
///
/// Images are taken in file-name order and renamed to zero-padded sequence
/// numbers (`01.jpg`, `02.png`, ...) whose width is the number of digits of the
/// image count; each keeps its original extension.
pub async fn pack_image_directory(directory: &Path, destination: &Path) -> Result<PathBuf> {
    let mut entries = fs::read_dir(directory).await?;
    let mut images = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if is_hidden_file(&path) || !is_image(&path) {
            continue;
        }
        if fs::metadata(&path).await?.is_file() {
            images.push(path);
        }
    }

    if images.is_empty() {
        return Err(Error::Value(format!(
            "No images found in chapter directory {:?}",
            directory
        )));
    }

    images.par_sort_by_key(|path| get_file_name_lossy(path));

    let width = images.len().to_string().len();
    let archive_entries: Vec<(PathBuf, String)> = images
        .into_iter()
        .enumerate()
        .map(|(index, path)| {
            let extension = path
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default();
            let name = format!("{:0width$}{}", index + 1, extension, width = width);
            (path, name)
        })
        .collect();

    let archive = destination.join(format!("{}.cbz", get_file_name_lossy(directory)));
    let archive_clone = archive.clone();
    let page_count = archive_entries.len();
    spawn_blocking(move || write_stored_archive(&archive_clone, &archive_entries)).await??;

    debug!("Packed {} image(s) into {:?}", page_count, archive);
    Ok(archive)
}
