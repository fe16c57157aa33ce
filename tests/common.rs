//! Common test utilities and constants for the Shoko crate.
//!
//! Provides functions for setting up test libraries, creating dummy chapter
//! archives and documents, inspecting zip files, and a converter double that
//! records commands instead of launching a real converter.

use async_trait::async_trait;
use rand::{Rng, distributions::Alphanumeric};
use shoko::error::{Error, Result};
use shoko::prelude::*;
use std::fs::File;
use std::io::{Read, Write};
use std::sync::Mutex;
use tokio::fs;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

#[allow(dead_code)]
pub const TEST_TMP_DIR: &str = "tests/tmp";

/// Directories of one test: a library root and a scratch folder for import sources.
#[allow(dead_code)]
pub struct TestDirs {
    pub test_dir: PathBuf,
    pub root: PathBuf,
    pub sources: PathBuf,
}

/// Helper function to create a clean, uniquely named test directory.
#[allow(dead_code)]
pub async fn setup_test_dirs(sub_path: &str) -> TestDirs {
    let rand_string: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let unique_sub_path = format!("{}-{}", sub_path, rand_string);
    let test_dir = PathBuf::from(TEST_TMP_DIR).join(unique_sub_path);
    if test_dir.exists() {
        fs::remove_dir_all(&test_dir).await.unwrap();
    }
    let root = test_dir.join("library");
    let sources = test_dir.join("sources");

    fs::create_dir_all(&root).await.unwrap();
    fs::create_dir_all(&sources).await.unwrap();

    TestDirs {
        test_dir,
        root,
        sources,
    }
}

#[allow(dead_code)]
pub fn test_templates() -> ConverterTemplates {
    ConverterTemplates {
        convert: vec!["ebook-convert".to_string()],
        viewer: vec!["ebook-viewer".to_string()],
        comic_flags: vec!["--no-process".to_string()],
        text_flags: vec!["--level1-toc".to_string(), "//h:h1".to_string()],
    }
}

/// A library with a `Manga` comic grouping and a `Novel` text grouping.
#[allow(dead_code)]
pub fn test_library(dirs: &TestDirs, converter: Arc<RecordingConverter>) -> Library {
    test_library_with_css(dirs, dirs.root.join("style.css"), converter)
}

#[allow(dead_code)]
pub fn test_library_with_css(
    dirs: &TestDirs,
    css_file: PathBuf,
    converter: Arc<RecordingConverter>,
) -> Library {
    Library::builder()
        .root(dirs.root.clone())
        .output_directory("output")
        .css_file(css_file)
        .covers(vec!["cover.jpg".to_string(), "cover.png".to_string()])
        .groupings(vec![
            Grouping::new("MANGA", "Manga", GroupingKind::Comic),
            Grouping::new("NOVEL", "Novel", GroupingKind::Text),
        ])
        .templates(test_templates())
        .converter(converter)
        .build()
        .unwrap()
}

/// Records every command instead of running it.
///
/// At invocation time it also snapshots the entry names of any `.cbc` argument
/// and the content of any `.html` argument, and creates the `.epub` target so
/// that later lookups find it.
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingConverter {
    pub calls: Mutex<Vec<Vec<String>>>,
    pub container_entries: Mutex<Vec<Vec<String>>>,
    pub html_sources: Mutex<Vec<String>>,
    pub fail: bool,
    /// Deletes the `.cbc` argument after reading it, as a converter cleaning up after itself would.
    pub remove_container: bool,
    /// Fails as if the program could not be started.
    pub unlaunchable: bool,
}

#[allow(dead_code)]
impl RecordingConverter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn removing_container() -> Arc<Self> {
        Arc::new(Self {
            remove_container: true,
            ..Default::default()
        })
    }

    pub fn unlaunchable() -> Arc<Self> {
        Arc::new(Self {
            unlaunchable: true,
            ..Default::default()
        })
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Converter for RecordingConverter {
    async fn run(&self, command: &[String]) -> Result<bool> {
        self.calls.lock().unwrap().push(command.to_vec());
        if self.unlaunchable {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "converter program not found",
            )));
        }

        for arg in command {
            if arg.ends_with(".cbc") {
                let entries = zip_entry_names(Path::new(arg));
                self.container_entries.lock().unwrap().push(entries);
                if self.remove_container {
                    std::fs::remove_file(arg)?;
                }
            } else if arg.ends_with(".html") {
                let content = std::fs::read_to_string(arg)?;
                self.html_sources.lock().unwrap().push(content);
            }
        }

        if let Some(epub) = command.iter().find(|arg| arg.ends_with(".epub")) {
            let epub = Path::new(epub);
            if !epub.exists() {
                std::fs::write(epub, b"epub")?;
            }
        }

        Ok(!self.fail)
    }
}

/// Writes `content` at `path`, creating parent directories.
#[allow(dead_code)]
pub async fn write_file(path: &Path, content: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.unwrap();
    }
    fs::write(path, content).await.unwrap();
}

/// Creates a small chapter archive with `pages` dummy image entries.
#[allow(dead_code)]
pub fn create_chapter_archive(path: &Path, pages: usize) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for page in 1..=pages {
        zip.start_file(format!("{}.jpg", page), options).unwrap();
        zip.write_all(format!("page {} of {:?}", page, path).as_bytes())
            .unwrap();
    }
    zip.finish().unwrap();
}

/// Entry names of a zip file, in archive order.
#[allow(dead_code)]
pub fn zip_entry_names(path: &Path) -> Vec<String> {
    let file = File::open(path).unwrap();
    let mut archive = ZipArchive::new(file).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Raw content and compression method of one zip entry.
#[allow(dead_code)]
pub fn read_zip_entry(path: &Path, name: &str) -> (Vec<u8>, CompressionMethod) {
    let file = File::open(path).unwrap();
    let mut archive = ZipArchive::new(file).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let method = entry.compression();
    let mut content = Vec::new();
    entry.read_to_end(&mut content).unwrap();
    (content, method)
}
