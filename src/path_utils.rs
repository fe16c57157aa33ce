//! Path utilities for safe and robust file path handling.
//!
//! This module provides the helpers the library uses to turn work names into
//! directories, to compare extensions, and to express one path relative to
//! another (stylesheet links) or as a local-file URL (table of contents links).

use crate::error::{Error, Result};

use std::path::{Component, Path, PathBuf};

/// Converts a path to a string with fallback to lossy conversion.
pub fn path_to_string_lossy(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Gets the file name from a path with fallback to lossy conversion.
///
/// # Returns
///
/// * `String` - The file name, or `"unknown"` for paths without one (e.g. `..`)
pub fn get_file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Gets the file name without its last extension, with lossy conversion.
pub fn get_file_stem_lossy(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Checks if a filename starts with a dot (hidden file) using safe conversion.
pub fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Case-insensitive extension check. `extension` is given without the dot.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Validates a single path component used as a work name.
///
/// Work names become directory names under `root/<grouping>/`, so they must be
/// a single, non-empty component free of characters that file systems or zip
/// entries reject.
///
/// # Returns
///
/// * `Result<()>` - Ok if the name is usable, or `Error::InvalidPath` describing the issue
pub fn validate_work_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Err(Error::InvalidPath(PathBuf::from(name), reason.to_string()));

    if name.trim().is_empty() {
        return invalid("Work name is empty");
    }
    if name == "." || name == ".." {
        return invalid("Work name cannot be a relative directory reference");
    }
    if name
        .chars()
        .any(|c| matches!(c, '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*') || c.is_control())
    {
        return invalid("Work name contains invalid characters");
    }

    Ok(())
}

/// Makes `path` absolute against the current directory without touching the file system.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}

/// Makes `path` absolute and resolves its `.` and `..` components lexically.
///
/// The path does not need to exist, and symbolic links are not followed.
pub fn normalize_path(path: &Path) -> Result<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in absolute_path(path)?.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(Error::InvalidPath(
                        path.to_path_buf(),
                        "Path climbs above its root".to_string(),
                    ));
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

/// Expresses `target` relative to the directory `from_dir`, using `/` separators.
///
/// Both paths are normalized first. When they share no common root (e.g. two
/// Windows drives), the absolute local-file URL of `target` is returned instead.
pub fn relative_path(from_dir: &Path, target: &Path) -> Result<String> {
    let from = normalize_path(from_dir)?;
    let to = normalize_path(target)?;

    if from.components().next() != to.components().next() {
        return Ok(file_url(&to));
    }

    let Some(relative) = pathdiff::diff_paths(&to, &from) else {
        return Ok(file_url(&to));
    };

    let parts: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().to_string())
        .collect();
    if parts.is_empty() {
        return Ok(".".to_string());
    }
    Ok(parts.join("/"))
}

/// Formats an absolute path as a `file://` URL with forward slashes.
pub fn file_url(path: &Path) -> String {
    let path_str = path_to_string_lossy(path).replace('\\', "/");
    if path_str.starts_with('/') {
        format!("file://{}", path_str)
    } else {
        format!("file:///{}", path_str)
    }
}
