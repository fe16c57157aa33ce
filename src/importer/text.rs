use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{Error, Result};
use crate::importer::entities::encode_entities;
use crate::path_utils::{
    absolute_path, get_file_name_lossy, get_file_stem_lossy, has_extension, relative_path,
};

lazy_static! {
    /// Paragraph boundary: a line break, any blank (or whitespace-only) lines, a line break.
    static ref BLANK_LINE_REGEX: Regex = Regex::new(r"\n[ \t]*\n").unwrap();
    /// First stylesheet link; group 1 is the `href` value.
    static ref STYLESHEET_LINK_REGEX: Regex =
        Regex::new(r#"<link\s+rel="stylesheet"\s+href="([^"]*)"\s*/?>"#).unwrap();
}

/// Converts plain text to an HTML chapter document.
///
/// Paragraphs are separated by blank lines. The first paragraph is the document
/// `<title>` and its `<h1>`; every following paragraph becomes a `<p>` whose line
/// breaks are `<br>`. Characters with an HTML5 named reference are written as
/// numeric references.
///
/// # Returns
///
/// * `Err(Error::Value)` - `text` is empty once trimmed
pub fn text_to_html(text: &str, stylesheet_href: &str) -> Result<String> {
    let normalized = text.replace("\r\n", "\n");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return Err(Error::Value("Text chapter is empty".to_string()));
    }

    let mut paragraphs = BLANK_LINE_REGEX
        .split(trimmed)
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty());

    let title = encode_entities(paragraphs.next().unwrap_or_default());

    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n\t<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "\t<link rel=\"stylesheet\" href=\"{}\">\n",
        stylesheet_href
    ));
    html.push_str(&format!("\t<title>{}</title>\n", title));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("\t<h1>{}</h1>\n", title));

    let body: Vec<String> = paragraphs
        .map(|paragraph| format!("\t<p>{}</p>\n", encode_entities(paragraph).replace('\n', "<br>")))
        .collect();
    if !body.is_empty() {
        html.push('\n');
        html.push_str(&body.concat());
    }

    html.push_str("</body>\n</html>");
    Ok(html)
}

/// Points the first stylesheet link of `html` at `href`.
///
/// # Returns
///
/// * `Some(String)` - The document with only that `href` value replaced
/// * `None` - The document has no stylesheet link
pub fn rewrite_stylesheet_link(html: &str, href: &str) -> Option<String> {
    let captures = STYLESHEET_LINK_REGEX.captures(html)?;
    let current = captures.get(1)?;

    let mut rewritten = String::with_capacity(html.len() + href.len());
    rewritten.push_str(&html[..current.start()]);
    rewritten.push_str(href);
    rewritten.push_str(&html[current.end()..]);
    Some(rewritten)
}

/// Imports one text source into `destination`.
///
/// # Returns
///
/// * `Ok(Some(path))` - The chapter document written into `destination`
/// * `Ok(None)` - The source is not a `.txt` or `.html` file
/// * `Err(Error)` - Reading, converting or writing failed
pub async fn import_text_source(
    source: &Path,
    destination: &Path,
    stylesheet: &Path,
) -> Result<Option<PathBuf>> {
    if !fs::metadata(source).await?.is_file() {
        debug!("Skipping {:?}: not a file", source);
        return Ok(None);
    }

    if has_extension(source, "txt") {
        let text = fs::read_to_string(source).await?;
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(&text);
        let href = relative_path(destination, stylesheet)?;
        let html = text_to_html(text, &href)?;

        let target = destination.join(format!("{}.html", get_file_stem_lossy(source)));
        fs::write(&target, html).await?;
        debug!("Converted {:?} to {:?}", source, target);
        return Ok(Some(target));
    }

    if has_extension(source, "html") {
        let target = destination.join(get_file_name_lossy(source));
        if absolute_path(source)? == absolute_path(&target)? {
            return Ok(Some(target));
        }
        fs::copy(source, &target).await?;
        debug!("Copied chapter document {:?}", target);
        return Ok(Some(target));
    }

    debug!("Skipping {:?}: not a text or HTML file", source);
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_html_structure() {
        let html = text_to_html("Chapter One\n\nFirst line\nsecond line\n\nLast", "../style.css")
            .unwrap();
        assert!(html.contains("<link rel=\"stylesheet\" href=\"../style.css\">"));
        assert!(html.contains("\t<title>Chapter One</title>\n"));
        assert!(html.contains("\t<h1>Chapter One</h1>\n"));
        assert!(html.contains("\t<p>First line<br>second line</p>\n"));
        assert!(html.contains("\t<p>Last</p>\n"));
        assert_eq!(html.matches("<h1>").count(), 1);
    }

    #[test]
    fn test_text_to_html_escapes_named_characters() {
        let html = text_to_html("Title\n\nTom & Jerry", "s.css").unwrap();
        assert!(html.contains("<p>Tom &#38; Jerry</p>"));
        assert!(!html.contains("Tom & Jerry"));
    }

    #[test]
    fn test_text_to_html_title_only() {
        let html = text_to_html("  Lonely Title \r\n", "s.css").unwrap();
        assert!(html.contains("<title>Lonely Title</title>"));
        assert!(!html.contains("<p>"));
    }

    #[test]
    fn test_text_to_html_rejects_empty_input() {
        assert!(matches!(text_to_html("", "s.css"), Err(Error::Value(_))));
        assert!(matches!(text_to_html(" \n\t\n ", "s.css"), Err(Error::Value(_))));
    }

    #[test]
    fn test_rewrite_stylesheet_link() {
        let html = "<head>\n\t<link rel=\"stylesheet\" href=\"old.css\">\n</head><body>old.css</body>";
        let rewritten = rewrite_stylesheet_link(html, "../new.css").unwrap();
        assert_eq!(
            rewritten,
            "<head>\n\t<link rel=\"stylesheet\" href=\"../new.css\">\n</head><body>old.css</body>"
        );
        assert_eq!(
            rewrite_stylesheet_link(&rewritten, "../new.css").unwrap(),
            rewritten
        );
    }

    #[test]
    fn test_rewrite_stylesheet_link_only_first() {
        let html = "<link rel=\"stylesheet\" href=\"a.css\"><link rel=\"stylesheet\" href=\"b.css\">";
        assert_eq!(
            rewrite_stylesheet_link(html, "c.css").unwrap(),
            "<link rel=\"stylesheet\" href=\"c.css\"><link rel=\"stylesheet\" href=\"b.css\">"
        );
    }

    #[test]
    fn test_rewrite_stylesheet_link_unmatched() {
        assert!(rewrite_stylesheet_link("<html><head></head></html>", "c.css").is_none());
    }
}
