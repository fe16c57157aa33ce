use chrono::Utc;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use crate::command::{ConverterTemplates, build_command, view_command};
use crate::config::LibraryConfig;
use crate::converter::{Converter, ProcessConverter};
use crate::error::{Error, Result};
use crate::importer::{import_comics, import_texts, rewrite_stylesheet_link};
use crate::metadata;
use crate::packager::packager_for;
use crate::path_utils::{absolute_path, is_hidden_file, relative_path, validate_work_name};
use crate::types::{
    BuildReport, Grouping, GroupingKind, ImportReport, Metadata, RegenerateReport,
};

/// A library of works on disk, laid out as `root/<grouping tag>/<work name>/`.
///
/// The library resolves works to directories, reads and writes their metadata,
/// imports chapters and drives the packaging and conversion of a work into an
/// EPUB placed in the work's output subdirectory.
///
/// ## Builder Pattern
///
/// Use [`Library::from_config`] for a parsed configuration document, or
/// [`Library::builder()`](Library::builder) to assemble one directly:
///
/// ```rust,no_run
/// # use shoko::prelude::*;
/// # fn main() -> shoko::error::Result<()> {
/// let library = Library::builder()
///     .root(PathBuf::from("./library"))
///     .css_file(PathBuf::from("./library/style.css"))
///     .covers(vec!["cover.jpg".to_string()])
///     .groupings(vec![
///         Grouping::new("MANGA", "Manga", GroupingKind::Comic),
///         Grouping::new("NOVEL", "Novel", GroupingKind::Text),
///     ])
///     .templates(ConverterTemplates {
///         convert: vec!["ebook-convert".to_string()],
///         viewer: vec!["ebook-viewer".to_string()],
///         ..Default::default()
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_builder::Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct Library {
    /// Library root directory.
    root: PathBuf,

    /// Name of the subdirectory of each work that receives the EPUB.
    #[builder(default = "\"output\".to_string()")]
    output_directory: String,

    /// Stylesheet linked from imported text chapters.
    css_file: PathBuf,

    /// Cover file names searched in each work directory, first match wins.
    #[builder(default)]
    covers: Vec<String>,

    /// Every grouping, each classified as comic or text. Tags and keys are unique.
    groupings: Vec<Grouping>,

    /// Converter and viewer command templates.
    templates: ConverterTemplates,

    /// Runs the converter and viewer commands.
    #[builder(setter(custom), default = "Arc::new(ProcessConverter)")]
    converter: Arc<dyn Converter>,
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("root", &self.root)
            .field("output_directory", &self.output_directory)
            .field("css_file", &self.css_file)
            .field("covers", &self.covers)
            .field("groupings", &self.groupings)
            .field("templates", &self.templates)
            .finish()
    }
}

/// Outcome of rewriting the stylesheet link of one chapter.
enum ChapterRewrite {
    Rewritten,
    Unchanged,
    Unmatched,
}

impl Library {
    /// Creates a new builder for configuring a `Library`.
    pub fn builder() -> LibraryBuilder {
        LibraryBuilder::default()
    }

    /// Builds a library from a parsed configuration document.
    ///
    /// # Returns
    ///
    /// * `Err(Error::Config)` - Grouping tags collide, a tag is not a string, or a
    ///   required template is empty
    pub fn from_config(config: LibraryConfig) -> Result<Self> {
        let groupings = config.groupings()?;
        Ok(Self::builder()
            .root(config.root)
            .output_directory(config.output)
            .css_file(config.css)
            .covers(config.covers)
            .groupings(groupings)
            .templates(config.converter)
            .build()?)
    }

    /// Reads the configuration document at `path` and builds a library from it.
    pub async fn from_config_file(path: &Path) -> Result<Self> {
        let config = LibraryConfig::from_file(path).await?;
        Self::from_config(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn output_directory(&self) -> &str {
        &self.output_directory
    }

    pub fn css_file(&self) -> &Path {
        &self.css_file
    }

    pub fn covers(&self) -> &[String] {
        &self.covers
    }

    pub fn templates(&self) -> &ConverterTemplates {
        &self.templates
    }

    /// All groupings, comic groupings first, each in configuration order.
    pub fn groupings(&self) -> &[Grouping] {
        &self.groupings
    }

    /// Resolves a grouping by its tag.
    pub fn grouping(&self, tag: &str) -> Result<&Grouping> {
        self.groupings
            .iter()
            .find(|grouping| grouping.tag == tag)
            .ok_or_else(|| Error::NotFound(format!("Grouping '{}'", tag)))
    }

    /// Whether `tag` names a comic grouping. Unknown tags are neither comic nor text.
    pub fn is_comic(&self, tag: &str) -> bool {
        self.grouping(tag).map(Grouping::is_comic).unwrap_or(false)
    }

    /// Whether `tag` names a text grouping. Unknown tags are neither comic nor text.
    pub fn is_text(&self, tag: &str) -> bool {
        self.grouping(tag).map(Grouping::is_text).unwrap_or(false)
    }

    /// Absolute directory of a work: `root/<tag>/<work>`.
    pub fn work_dir(&self, tag: &str, work: &str) -> Result<PathBuf> {
        let grouping = self.grouping(tag)?;
        validate_work_name(work)?;
        Ok(self.grouping_dir(grouping)?.join(work))
    }

    /// Absolute output directory of a work: `root/<tag>/<work>/<output>`.
    pub fn output_dir(&self, tag: &str, work: &str) -> Result<PathBuf> {
        Ok(self.work_dir(tag, work)?.join(&self.output_directory))
    }

    /// Where the EPUB of a work is expected: `root/<tag>/<work>/<output>/<work>.epub`.
    pub fn epub_path(&self, tag: &str, work: &str) -> Result<PathBuf> {
        Ok(self.output_dir(tag, work)?.join(format!("{}.epub", work)))
    }

    /// Returns the EPUB of a work if it has been built.
    pub async fn find_epub(&self, tag: &str, work: &str) -> Result<Option<PathBuf>> {
        let epub = self.epub_path(tag, work)?;
        Ok(if is_file(&epub).await { Some(epub) } else { None })
    }

    /// Creates the directory of a work. Creating an existing work is a no-op.
    pub async fn create_work(&self, tag: &str, work: &str) -> Result<PathBuf> {
        let work_dir = self.work_dir(tag, work)?;
        if !is_dir(&work_dir).await {
            fs::create_dir_all(&work_dir).await?;
            info!("Created work {:?}", work_dir);
        }
        Ok(work_dir)
    }

    /// Names of the works in a grouping, sorted. A grouping without a directory has no works.
    pub async fn list_works(&self, tag: &str) -> Result<Vec<String>> {
        let grouping_dir = self.grouping_dir(self.grouping(tag)?)?;
        if !is_dir(&grouping_dir).await {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&grouping_dir).await?;
        let mut works = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !is_hidden_file(&path) && is_dir(&path).await {
                works.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        works.par_sort();
        Ok(works)
    }

    /// Loads the metadata of a work, deriving it when no document exists.
    pub async fn load_metadata(&self, tag: &str, work: &str) -> Result<Metadata> {
        let grouping = self.grouping(tag)?;
        let work_dir = self.existing_work_dir(tag, work).await?;
        metadata::load(&work_dir, grouping.kind).await
    }

    /// Replaces the metadata document of a work.
    pub async fn save_metadata(&self, tag: &str, work: &str, metadata: &Metadata) -> Result<()> {
        let work_dir = self.existing_work_dir(tag, work).await?;
        metadata::save(&work_dir, metadata).await
    }

    /// Imports chapters into a work, dispatching on the grouping kind.
    ///
    /// Sources that fail are recorded in the report; the rest are still imported.
    pub async fn import_chapters(
        &self,
        tag: &str,
        work: &str,
        sources: &[PathBuf],
    ) -> Result<ImportReport> {
        let grouping = self.grouping(tag)?;
        let work_dir = self.existing_work_dir(tag, work).await?;

        info!(
            "Importing {} source(s) into {}/{}",
            sources.len(),
            grouping.tag,
            work
        );
        match grouping.kind {
            GroupingKind::Comic => import_comics(sources, &work_dir).await,
            GroupingKind::Text => import_texts(sources, &work_dir, &self.css_file).await,
        }
    }

    /// Builds the EPUB of a work.
    ///
    /// Loads (or derives and persists) the metadata, packages the chapters in
    /// metadata order, looks up a cover, runs the converter and then removes the
    /// intermediate files. Cleanup is attempted whatever the converter's exit
    /// status; cleanup failures are reported as warnings, not errors.
    pub async fn build_epub(&self, tag: &str, work: &str) -> Result<BuildReport> {
        let started_at = Utc::now();
        let grouping = self.grouping(tag)?;
        let source = self.existing_work_dir(tag, work).await?;
        let destination = source.join(&self.output_directory);

        info!("Building EPUB for {}/{}", grouping.tag, work);

        let authored = metadata::has_metadata(&source).await;
        let metadata = metadata::load(&source, grouping.kind).await?;
        if !authored {
            metadata::save(&source, &metadata).await?;
            debug!("Persisted derived metadata for {:?}", source);
        }

        let chapters: Vec<PathBuf> = metadata
            .chapters
            .iter()
            .map(|chapter| source.join(chapter))
            .collect();
        if chapters.is_empty() {
            warn!("{}/{} has no chapters", grouping.tag, work);
        }

        let packaged = packager_for(grouping.kind)
            .package(&chapters, &destination, work)
            .await?;
        let cover = find_cover(&source, &self.covers).await;
        let epub = destination.join(format!("{}.epub", work));
        let command = build_command(
            &self.templates,
            grouping.kind,
            &packaged.source,
            &epub,
            cover.as_deref(),
            &metadata,
        );

        let outcome = self.converter.run(&command).await;
        let cleanup_warnings = remove_intermediates(&packaged.intermediates).await;
        let converter_succeeded = outcome?;

        if converter_succeeded {
            info!("Converted {}/{} to {:?}", grouping.tag, work, epub);
        } else {
            warn!("Converter reported failure for {}/{}", grouping.tag, work);
        }

        Ok(BuildReport {
            epub,
            cover,
            command,
            converter_succeeded,
            cleanup_warnings,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Opens the EPUB of a work in the configured viewer.
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - The EPUB handed to the viewer
    /// * `Err(Error::NotFound)` - The work has no EPUB yet
    pub async fn open_epub(&self, tag: &str, work: &str) -> Result<PathBuf> {
        let epub = self
            .find_epub(tag, work)
            .await?
            .ok_or_else(|| Error::NotFound(format!("EPUB for {}/{}", tag, work)))?;

        let command = view_command(&self.templates, &epub);
        if !self.converter.run(&command).await? {
            warn!("Viewer reported failure for {:?}", epub);
        }
        Ok(epub)
    }

    /// Points the stylesheet link of every imported text chapter at the configured stylesheet.
    ///
    /// Only the `href` of the first stylesheet link is replaced. Chapters without
    /// a link, or that cannot be read or written, are counted and skipped. Running
    /// it again without changing the configuration rewrites nothing.
    pub async fn regenerate(&self) -> Result<RegenerateReport> {
        let mut report = RegenerateReport::default();

        for grouping in self.groupings.iter().filter(|grouping| grouping.is_text()) {
            let grouping_dir = self.grouping_dir(grouping)?;
            for work in self.list_works(&grouping.tag).await? {
                let work_dir = grouping_dir.join(&work);
                let href = relative_path(&work_dir, &self.css_file)?;

                let chapters = match metadata::discover_chapters(&work_dir, GroupingKind::Text).await
                {
                    Ok(chapters) => chapters,
                    Err(e) => {
                        warn!("Cannot list chapters of {:?}: {}", work_dir, e);
                        report.failed += 1;
                        continue;
                    }
                };

                for chapter in chapters {
                    let path = work_dir.join(&chapter);
                    match rewrite_chapter_stylesheet(&path, &href).await {
                        Ok(ChapterRewrite::Rewritten) => report.rewritten += 1,
                        Ok(ChapterRewrite::Unchanged) => report.unchanged += 1,
                        Ok(ChapterRewrite::Unmatched) => {
                            warn!("No stylesheet link in {:?}", path);
                            report.unmatched += 1;
                        }
                        Err(e) => {
                            warn!("Cannot regenerate {:?}: {}", path, e);
                            report.failed += 1;
                        }
                    }
                }
            }
        }

        info!(
            "Regenerated stylesheet links: {} rewritten, {} unchanged, {} unmatched, {} failed",
            report.rewritten, report.unchanged, report.unmatched, report.failed
        );
        Ok(report)
    }

    fn grouping_dir(&self, grouping: &Grouping) -> Result<PathBuf> {
        absolute_path(&self.root.join(&grouping.tag))
    }

    async fn existing_work_dir(&self, tag: &str, work: &str) -> Result<PathBuf> {
        let work_dir = self.work_dir(tag, work)?;
        if !is_dir(&work_dir).await {
            return Err(Error::NotFound(format!("Work {}/{}", tag, work)));
        }
        Ok(work_dir)
    }
}

impl LibraryBuilder {
    /// Replaces the program runner, e.g. with a test double.
    pub fn converter(&mut self, converter: Arc<dyn Converter>) -> &mut Self {
        self.converter = Some(converter);
        self
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(groupings) = &self.groupings {
            if groupings.is_empty() {
                return Err("At least one grouping is required".to_string());
            }

            let mut tags = HashSet::new();
            let mut keys = HashSet::new();
            for grouping in groupings {
                if grouping.tag.trim().is_empty() {
                    return Err(format!("Grouping '{}' has an empty tag", grouping.key));
                }
                validate_work_name(&grouping.tag).map_err(|_| {
                    format!(
                        "Grouping '{}' has tag '{}', which is not a valid directory name",
                        grouping.key, grouping.tag
                    )
                })?;
                if !tags.insert(grouping.tag.as_str()) {
                    return Err(format!(
                        "Grouping tag '{}' is declared more than once",
                        grouping.tag
                    ));
                }
                if !keys.insert(grouping.key.as_str()) {
                    return Err(format!(
                        "Grouping key '{}' is declared more than once",
                        grouping.key
                    ));
                }
            }
        }

        if let Some(output_directory) = &self.output_directory {
            validate_work_name(output_directory)
                .map_err(|_| format!("Invalid output directory name '{}'", output_directory))?;
        }

        if let Some(templates) = &self.templates {
            if templates.convert.is_empty() {
                return Err("The convert command template is empty".to_string());
            }
            if templates.viewer.is_empty() {
                return Err("The viewer command template is empty".to_string());
            }
        }

        Ok(())
    }
}

/// Finds the first candidate that exists as a regular file directly in `folder`.
///
/// # Returns
///
/// * `Some(PathBuf)` - Absolute path of the first existing candidate, in candidate order
/// * `None` - No candidate exists
pub async fn find_cover(folder: &Path, candidates: &[String]) -> Option<PathBuf> {
    for candidate in candidates {
        let path = folder.join(candidate);
        if is_file(&path).await {
            return absolute_path(&path).ok();
        }
    }
    None
}

async fn rewrite_chapter_stylesheet(path: &Path, href: &str) -> Result<ChapterRewrite> {
    let html = fs::read_to_string(path).await?;
    let Some(rewritten) = rewrite_stylesheet_link(&html, href) else {
        return Ok(ChapterRewrite::Unmatched);
    };
    if rewritten == html {
        return Ok(ChapterRewrite::Unchanged);
    }

    fs::write(path, rewritten).await?;
    debug!("Rewrote stylesheet link in {:?}", path);
    Ok(ChapterRewrite::Rewritten)
}

async fn remove_intermediates(intermediates: &[PathBuf]) -> Vec<String> {
    let mut warnings = Vec::new();
    for path in intermediates {
        if let Err(e) = fs::remove_file(path).await {
            warn!("Could not remove intermediate file {:?}: {}", path, e);
            warnings.push(format!("{}: {}", path.display(), e));
        }
    }
    warnings
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}
