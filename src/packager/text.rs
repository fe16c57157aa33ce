use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::Result;
use crate::importer::entities::encode_entities;
use crate::packager::{PackagedWork, Packager};
use crate::path_utils::{absolute_path, file_url};

/// Link label used when a chapter has no usable `<title>`.
pub const NO_TITLE: &str = "No Title";

const TITLE_OPEN: &str = "<title>";
const TITLE_CLOSE: &str = "</title>";

/// Extracts the trimmed content of the first `<title>` element of `html`.
///
/// Returns [`NO_TITLE`] when either tag is missing, the close tag comes before
/// the open tag, or the content is blank.
pub fn chapter_title(html: &str) -> String {
    let Some(start) = html.find(TITLE_OPEN) else {
        return NO_TITLE.to_string();
    };
    let content_start = start + TITLE_OPEN.len();
    let Some(length) = html[content_start..].find(TITLE_CLOSE) else {
        return NO_TITLE.to_string();
    };

    let title = html[content_start..content_start + length].trim();
    if title.is_empty() {
        NO_TITLE.to_string()
    } else {
        title.to_string()
    }
}

/// Makes a `<title>` content safe as element text. Entity references it
/// already carries are kept; stray angle brackets are encoded.
fn escape_label(title: &str) -> String {
    title.replace('<', "&#60;").replace('>', "&#62;")
}

/// Writes `destination/<title>.html`, an HTML document linking every chapter in order.
///
/// Each link points at the chapter's absolute `file://` URL and is labelled with
/// the chapter's own `<title>`. The work title is entity-encoded in the markup;
/// the file name keeps it verbatim. `destination` is created if absent.
pub async fn text_table_of_contents(
    chapters: &[PathBuf],
    destination: &Path,
    title: &str,
) -> Result<PathBuf> {
    let heading = encode_entities(title);
    let mut content = String::from("<!DOCTYPE html>\n<html>\n<head>\n\t<meta charset=\"utf-8\">\n");
    content.push_str(&format!("\t<title>{}</title>\n", heading));
    content.push_str("</head>\n<body>\n");
    content.push_str(&format!("\t<h1>{}</h1>\n", heading));
    content.push_str("\t<h2>Table Of Contents</h2>\n");
    content.push_str("\t<p>\n");

    for chapter in chapters {
        let html = fs::read_to_string(chapter).await?;
        let html = html.strip_prefix('\u{FEFF}').unwrap_or(&html);
        let label = escape_label(&chapter_title(html));
        let href = file_url(&absolute_path(chapter)?);
        content.push_str(&format!("\t\t<a href=\"{}\">{}</a><br>\n", href, label));
    }

    content.push_str("\t</p>\n</body>\n</html>");

    fs::create_dir_all(destination).await?;
    let toc = destination.join(format!("{}.html", title));
    fs::write(&toc, content).await?;
    debug!(
        "Wrote table of contents {:?} for {} chapter(s)",
        toc,
        chapters.len()
    );
    Ok(toc)
}

/// Packages text works as an HTML table of contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPackager;

#[async_trait]
impl Packager for TextPackager {
    async fn package(
        &self,
        chapters: &[PathBuf],
        destination: &Path,
        title: &str,
    ) -> Result<PackagedWork> {
        let toc = text_table_of_contents(chapters, destination, title).await?;
        Ok(PackagedWork {
            source: toc.clone(),
            intermediates: vec![toc],
        })
    }
}
