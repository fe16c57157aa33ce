//! Shoko - Personal Comic and Text Library to EPUB
//!
//! This crate manages a library of serialized works (comics and text documents),
//! each made of ordered chapters, and assembles them into EPUB files through an
//! external converter such as Calibre's `ebook-convert`.
//!
//! # Getting Started
//!
//! Describe the library in a JSON configuration document, build a [`Library`]
//! from it, then create works, import chapters and build EPUBs:
//!
//! ```rust,no_run
//! use shoko::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> shoko::error::Result<()> {
//!     let library = Library::from_config_file(Path::new("config.json")).await?;
//!
//!     // 1. Create the work directory (a no-op if it already exists)
//!     library.create_work("Manga", "Vol1").await?;
//!
//!     // 2. Import chapters: `.cbz` archives are copied, image directories are packed
//!     let report = library
//!         .import_chapters(
//!             "Manga",
//!             "Vol1",
//!             &[PathBuf::from("./scans/Chapter 1"), PathBuf::from("./Chapter 2.cbz")],
//!         )
//!         .await?;
//!     println!("Imported {} chapter(s)", report.imported.len());
//!
//!     // 3. Package the chapters and run the converter
//!     let build = library.build_epub("Manga", "Vol1").await?;
//!     println!("EPUB written to {:?}", build.epub);
//!
//!     Ok(())
//! }
//! ```
//!
//! Chapter order comes from the work's `metadata.json` when it exists, and from
//! the sorted directory listing otherwise; see the [`metadata`] module.

pub mod command;
pub mod config;
pub mod converter;
pub mod error;
pub mod importer;
pub mod library;
pub mod metadata;
pub mod packager;
pub mod path_utils;
pub mod types;

// Publicly expose the main `Library` struct and its builder
pub use library::{Library, LibraryBuilder, find_cover};

// Re-export core types for direct access
pub use command::ConverterTemplates;
pub use config::LibraryConfig;
pub use converter::{Converter, ProcessConverter};
pub use types::{
    BuildReport, Grouping, GroupingKind, ImportReport, Metadata, RegenerateReport,
};

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and traits, allowing you to
/// import everything you need with a single `use shoko::prelude::*;` statement.
pub mod prelude {
    pub use super::{
        BuildReport, Converter, ConverterTemplates, Grouping, GroupingKind, ImportReport,
        Library, LibraryBuilder, LibraryConfig, Metadata, ProcessConverter, RegenerateReport,
        error, types,
    };
    pub use std::path::{Path, PathBuf};
    pub use std::sync::Arc;
}
