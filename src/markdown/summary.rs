//! Plain-text summary derivation.
//!
//! The summary ends up HTML-escaped inside listing cards and the page's meta description, so
//! every piece of Markdown and wiki syntax is resolved to display text rather than truncated
//! mid-token.

use regex::Captures;

use crate::markdown::patterns::{
    caption_decor, caption_line, embed_image, is_metadata_line, list_marker, markdown_link,
    markup_chars, standard_image, whitespace_run, wiki_link,
};

/// Maximum number of characters kept before the ellipsis.
pub const MAX_SUMMARY_LENGTH: usize = 220;

/// Summary used when no paragraph survives cleaning.
pub const FALLBACK_SUMMARY: &str = "this is a new journal entry, stay tuned.";

const ELLIPSIS: char = '…';

/// Derive a summary from the first paragraph that still has text after cleaning.
pub fn extract_summary(text: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut in_code_block = false;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            continue;
        }
        if line.is_empty() {
            flush(&mut current, &mut paragraphs);
            continue;
        }
        if is_metadata_line(line) {
            continue;
        }
        if caption_line().is_match(line) {
            flush(&mut current, &mut paragraphs);
            continue;
        }
        if line.starts_with("![") {
            continue;
        }
        if let Some(marker) = list_marker().find(line) {
            flush(&mut current, &mut paragraphs);
            let item = line[marker.end()..].trim();
            if !is_metadata_line(item) {
                paragraphs.push(item.to_string());
            }
            continue;
        }
        if line.starts_with('#') {
            flush(&mut current, &mut paragraphs);
            paragraphs.push(line.trim_start_matches('#').trim().to_string());
            continue;
        }

        let line = if line.starts_with('>') {
            line.trim_start_matches('>').trim()
        } else {
            line
        };
        current.push(line);
    }
    flush(&mut current, &mut paragraphs);

    paragraphs
        .iter()
        .map(|paragraph| clean_summary_text(paragraph))
        .find(|cleaned| !cleaned.is_empty())
        .unwrap_or_else(|| FALLBACK_SUMMARY.to_string())
}

fn flush(current: &mut Vec<&str>, paragraphs: &mut Vec<String>) {
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
        current.clear();
    }
}

/// Collapse Markdown/wiki syntax to display text, normalise whitespace and truncate.
pub fn clean_summary_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = caption_decor().replace_all(raw, "");
    let text = standard_image().replace_all(&text, "");
    let text = embed_image().replace_all(&text, "");
    let text = wiki_link().replace_all(&text, |captures: &Captures<'_>| {
        captures
            .get(2)
            .or_else(|| captures.get(1))
            .map(|label| label.as_str().to_string())
            .unwrap_or_default()
    });
    let text = markdown_link().replace_all(&text, "${1}");
    let text = markup_chars().replace_all(&text, "");
    let text = whitespace_run().replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() > MAX_SUMMARY_LENGTH {
        let mut truncated: String = text.chars().take(MAX_SUMMARY_LENGTH).collect();
        truncated.push(ELLIPSIS);
        truncated
    } else {
        text.to_string()
    }
}
