//! Argument vectors for the external converter and viewer.
//!
//! Nothing here touches the file system: the functions only concatenate the
//! configured templates with the paths and metadata of a single build.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::path_utils::path_to_string_lossy;
use crate::types::{GroupingKind, Metadata};

/// Command templates read from the `Calibre` section of the configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterTemplates {
    /// Base conversion invocation, e.g. `["ebook-convert"]`.
    pub convert: Vec<String>,
    /// Base viewer invocation, e.g. `["ebook-viewer"]`.
    pub viewer: Vec<String>,
    /// Extra flags appended when converting a comic container.
    #[serde(rename = "convert-comic-epub")]
    pub comic_flags: Vec<String>,
    /// Extra flags appended when converting an HTML table of contents.
    #[serde(rename = "convert-html-epub")]
    pub text_flags: Vec<String>,
}

impl ConverterTemplates {
    pub fn flags_for(&self, kind: GroupingKind) -> &[String] {
        match kind {
            GroupingKind::Comic => &self.comic_flags,
            GroupingKind::Text => &self.text_flags,
        }
    }
}

/// Maps a metadata field to the converter option that sets it.
pub fn metadata_flag(field: &str) -> String {
    format!("--{}", field.replace('_', "-"))
}

/// Builds the conversion command for one work.
///
/// The order is fixed: base invocation, `source destination`, the kind-specific
/// flags, `--cover <path>` when a cover exists, then one option pair per
/// non-empty metadata field.
pub fn build_command(
    templates: &ConverterTemplates,
    kind: GroupingKind,
    source: &Path,
    destination: &Path,
    cover: Option<&Path>,
    metadata: &Metadata,
) -> Vec<String> {
    let mut command: Vec<String> = templates.convert.clone();
    command.push(path_to_string_lossy(source));
    command.push(path_to_string_lossy(destination));
    command.extend(templates.flags_for(kind).iter().cloned());

    if let Some(cover) = cover {
        command.push("--cover".to_string());
        command.push(path_to_string_lossy(cover));
    }

    for (field, value) in metadata.descriptive_fields() {
        command.push(metadata_flag(field));
        command.push(value.to_string());
    }

    command
}

/// Builds the command that opens `epub` in the configured viewer.
pub fn view_command(templates: &ConverterTemplates, epub: &Path) -> Vec<String> {
    let mut command = templates.viewer.clone();
    command.push(path_to_string_lossy(epub));
    command
}
