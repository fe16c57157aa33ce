//! The JSON configuration document a [`Library`](crate::Library) is built from.
//!
//! ```json
//! {
//!     "root": "library",
//!     "output": "output",
//!     "CSS": "library/style.css",
//!     "covers": ["cover.jpg", "cover.png"],
//!     "FORMATS": {
//!         "Comic": { "MANGA": "Manga" },
//!         "Text": { "NOVEL": "Novel" }
//!     },
//!     "Calibre": {
//!         "convert": ["ebook-convert"],
//!         "viewer": ["ebook-viewer"],
//!         "convert-comic-epub": ["--no-process"],
//!         "convert-html-epub": []
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::command::ConverterTemplates;
use crate::error::{Error, Result};
use crate::types::{Grouping, GroupingKind};

/// Grouping tables: internal key to display tag, per kind, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatsConfig {
    #[serde(rename = "Comic")]
    pub comic: Map<String, Value>,
    #[serde(rename = "Text")]
    pub text: Map<String, Value>,
}

/// Deserialized configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Library root directory.
    pub root: PathBuf,
    /// Name of the output subdirectory inside each work.
    pub output: String,
    /// Stylesheet linked from imported text chapters.
    #[serde(rename = "CSS")]
    pub css: PathBuf,
    /// Cover file names, in search order.
    pub covers: Vec<String>,
    #[serde(rename = "FORMATS")]
    pub formats: FormatsConfig,
    #[serde(rename = "Calibre")]
    pub converter: ConverterTemplates,
}

impl LibraryConfig {
    /// Parses a configuration document. Any missing or mistyped key is a `Error::Config`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let json = json.strip_prefix('\u{FEFF}').unwrap_or(json);
        serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid configuration document: {}", e)))
    }

    /// Reads and parses the configuration document at `path`.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("Cannot read configuration file {:?}: {}", path, e))
        })?;
        Self::from_json_str(&content)
    }

    /// Flattens the grouping tables, comic groupings first, each in document order.
    ///
    /// Tags must be strings; uniqueness is checked when the library is built.
    pub fn groupings(&self) -> Result<Vec<Grouping>> {
        let comics = Self::grouping_table(&self.formats.comic, GroupingKind::Comic);
        let texts = Self::grouping_table(&self.formats.text, GroupingKind::Text);
        comics.chain(texts).collect()
    }

    fn grouping_table(
        table: &Map<String, Value>,
        kind: GroupingKind,
    ) -> impl Iterator<Item = Result<Grouping>> + '_ {
        table.iter().map(move |(key, tag)| match tag {
            Value::String(tag) => Ok(Grouping::new(key.clone(), tag.clone(), kind)),
            other => Err(Error::Config(format!(
                "Grouping '{}' in FORMATS.{} must map to a string tag, found {}",
                key, kind, other
            ))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "root": "library",
        "output": "output",
        "CSS": "library/style.css",
        "covers": ["cover.jpg", "cover.png"],
        "FORMATS": {
            "Comic": { "MANGA": "Manga", "COMIC": "Comic" },
            "Text": { "NOVEL": "Novel" }
        },
        "Calibre": {
            "convert": ["ebook-convert"],
            "viewer": ["ebook-viewer"],
            "convert-comic-epub": ["--no-process"],
            "convert-html-epub": ["--level1-toc", "//h:h1"]
        }
    }"#;

    #[test]
    fn test_parse_document() {
        let config = LibraryConfig::from_json_str(DOCUMENT).unwrap();
        assert_eq!(config.root, PathBuf::from("library"));
        assert_eq!(config.output, "output");
        assert_eq!(config.covers, vec!["cover.jpg", "cover.png"]);
        assert_eq!(config.converter.comic_flags, vec!["--no-process"]);

        let groupings = config.groupings().unwrap();
        assert_eq!(
            groupings,
            vec![
                Grouping::new("MANGA", "Manga", GroupingKind::Comic),
                Grouping::new("COMIC", "Comic", GroupingKind::Comic),
                Grouping::new("NOVEL", "Novel", GroupingKind::Text),
            ]
        );
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let document = DOCUMENT.replace("\"output\": \"output\",", "");
        let result = LibraryConfig::from_json_str(&document);
        assert!(matches!(result, Err(Error::Config(message)) if message.contains("output")));
    }

    #[test]
    fn test_non_string_tag_is_config_error() {
        let document = DOCUMENT.replace("\"NOVEL\": \"Novel\"", "\"NOVEL\": 3");
        let config = LibraryConfig::from_json_str(&document).unwrap();
        assert!(matches!(config.groupings(), Err(Error::Config(_))));
    }
}
