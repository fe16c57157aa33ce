//! Core data types and reports for the Shoko library.
//!
//! This module defines the fundamental data structures used throughout Shoko:
//! - Grouping classification (`Grouping`, `GroupingKind`)
//! - Descriptive work metadata (`Metadata`)
//! - Operation reports (`BuildReport`, `ImportReport`, `RegenerateReport`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use crate::path_utils::has_extension;

/// The two packaging pipelines a grouping can belong to.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub enum GroupingKind {
    /// Chapters are `.cbz` image archives, bundled into a `.cbc` container.
    Comic,
    /// Chapters are HTML documents, linked from an HTML table of contents.
    Text,
}

impl GroupingKind {
    /// Extension (without dot) of an imported chapter of this kind.
    pub fn chapter_extension(&self) -> &'static str {
        match self {
            GroupingKind::Comic => "cbz",
            GroupingKind::Text => "html",
        }
    }

    /// Whether `path` carries this kind's chapter extension.
    pub fn is_chapter_file(&self, path: &Path) -> bool {
        has_extension(path, self.chapter_extension())
    }
}

impl std::fmt::Display for GroupingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupingKind::Comic => f.write_str("Comic"),
            GroupingKind::Text => f.write_str("Text"),
        }
    }
}

/// A named category of works, e.g. `Manga` or `Novel`.
///
/// `key` is the identifier used in the configuration document, `tag` is the
/// display name and the directory name under the library root.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct Grouping {
    pub key: String,
    pub tag: String,
    pub kind: GroupingKind,
}

impl Grouping {
    pub fn new(key: impl Into<String>, tag: impl Into<String>, kind: GroupingKind) -> Self {
        Self {
            key: key.into(),
            tag: tag.into(),
            kind,
        }
    }

    pub fn is_comic(&self) -> bool {
        self.kind == GroupingKind::Comic
    }

    pub fn is_text(&self) -> bool {
        self.kind == GroupingKind::Text
    }
}

/// Descriptive record for a work, persisted as `metadata.json`.
///
/// Every field except `chapters` is a free-form string handed to the converter
/// as-is. Empty fields are omitted from the persisted document and from the
/// converter command line. `chapters` lists chapter file names relative to the
/// work directory, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "string_or_number")]
    pub author_sort: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "string_or_number")]
    pub authors: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "string_or_number")]
    pub book_producer: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "string_or_number")]
    pub comments: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "string_or_number")]
    pub isbn: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "string_or_number")]
    pub language: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "string_or_number")]
    pub pubdate: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "string_or_number")]
    pub publisher: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "string_or_number")]
    pub rating: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "string_or_number")]
    pub series: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "string_or_number")]
    pub series_index: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "string_or_number")]
    pub tags: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "string_or_number")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty", deserialize_with = "string_or_number")]
    pub title_sort: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chapters: Vec<String>,
}

impl Metadata {
    /// Metadata carrying only a chapter order, as derived from a directory listing.
    pub fn with_chapters(chapters: Vec<String>) -> Self {
        Self {
            chapters,
            ..Default::default()
        }
    }

    /// Non-empty descriptive fields as `(field name, value)`, in declaration order.
    /// `chapters` is never part of this list.
    pub fn descriptive_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("author_sort", &self.author_sort),
            ("authors", &self.authors),
            ("book_producer", &self.book_producer),
            ("comments", &self.comments),
            ("isbn", &self.isbn),
            ("language", &self.language),
            ("pubdate", &self.pubdate),
            ("publisher", &self.publisher),
            ("rating", &self.rating),
            ("series", &self.series),
            ("series_index", &self.series_index),
            ("tags", &self.tags),
            ("title", &self.title),
            ("title_sort", &self.title_sort),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| (name, value.as_str()))
        .collect()
    }
}

/// Accepts `"4"` as well as `4` for fields such as `rating` and `series_index`;
/// `null` reads as empty.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field {
        Text(String),
        Number(serde_json::Number),
        Null(()),
    }

    Ok(match Field::deserialize(deserializer)? {
        Field::Text(text) => text,
        Field::Number(number) => number.to_string(),
        Field::Null(()) => String::new(),
    })
}

/// Outcome of a successful `build_epub` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    /// Where the converter was asked to write the EPUB.
    pub epub: PathBuf,
    /// Cover image handed to the converter, if one was found.
    pub cover: Option<PathBuf>,
    /// The exact argument vector the converter was invoked with.
    pub command: Vec<String>,
    /// Whether the converter reported success. Cleanup runs either way.
    pub converter_succeeded: bool,
    /// Intermediate files that could not be removed after conversion.
    pub cleanup_warnings: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Outcome of a best-effort batch import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    /// Chapters written into the work directory, in source order.
    pub imported: Vec<PathBuf>,
    /// Sources that were not importable for this grouping kind.
    pub skipped: Vec<PathBuf>,
    /// Sources whose import failed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of a stylesheet-link regeneration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegenerateReport {
    /// Chapter documents whose stylesheet link was rewritten.
    pub rewritten: usize,
    /// Chapter documents already pointing at the configured stylesheet.
    pub unchanged: usize,
    /// Chapter documents with no stylesheet link, left untouched.
    pub unmatched: usize,
    /// Chapter documents that could not be read or written.
    pub failed: usize,
}
