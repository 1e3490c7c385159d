//! `banner::` / `icon::` directives and optional YAML frontmatter.

use std::fs;
use std::path::Path;

use gray_matter::{Matter, engine::YAML};
use regex::Regex;
use serde_yaml::Value;

use crate::error::{IoResultExt, JournalResult};
use crate::markdown::patterns::{banner_directive, icon_directive};
use crate::markdown::summary::{clean_summary_text, extract_summary};
use crate::models::{EntryFrontmatterRecord, EntryMetadata};

/// Read a Markdown source, dropping a UTF-8 byte order mark if present.
pub fn read_markdown(path: &Path) -> JournalResult<String> {
    let content = fs::read_to_string(path).at_path(path)?;
    Ok(match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Split a leading YAML frontmatter block from the Markdown body.
///
/// Text without frontmatter is returned unchanged with empty metadata. A leading `---` block
/// only counts as frontmatter when it holds a YAML mapping; anything else is a thematic break
/// followed by prose.
pub fn split_frontmatter(text: &str) -> (EntryFrontmatterRecord, String) {
    let unchanged = || (EntryFrontmatterRecord::default(), text.to_string());
    if !text.starts_with("---") {
        return unchanged();
    }

    let matter = Matter::<YAML>::new();
    let Ok(parsed) = matter.parse(text) else {
        return unchanged();
    };
    let data: Option<Value> = parsed.data;
    let Some(yaml @ Value::Mapping(_)) = data else {
        return unchanged();
    };

    let frontmatter = serde_yaml::from_value::<EntryFrontmatterRecord>(yaml).unwrap_or_default();
    (frontmatter, parsed.content)
}

/// Harvest banner, icon and summary from a Markdown document.
///
/// Directives win over frontmatter values; a frontmatter `summary` replaces the derived one.
pub fn extract_entry_metadata(text: &str) -> EntryMetadata {
    let (frontmatter, body) = split_frontmatter(text);

    let banner = extract_directive(banner_directive(), text).or(non_empty(frontmatter.banner));
    let icon = extract_directive(icon_directive(), text).or(non_empty(frontmatter.icon));
    let summary = frontmatter
        .summary
        .map(|summary| clean_summary_text(&summary))
        .filter(|summary| !summary.is_empty())
        .unwrap_or_else(|| extract_summary(&body));

    EntryMetadata {
        banner,
        icon,
        summary,
    }
}

fn extract_directive(pattern: &Regex, text: &str) -> Option<String> {
    let captures = pattern.captures(text)?;
    let value = captures.get(1)?.as_str().trim();
    non_empty(Some(strip_quotes(value).trim().to_string()))
}

fn strip_quotes(value: &str) -> &str {
    let quoted = |c: char| c == '\'' || c == '"';
    if value.len() >= 2 && value.starts_with(quoted) && value.ends_with(quoted) {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn extracts_first_directive_case_insensitively() {
        let text = "Intro\nBANNER:: \"covers/first.png\"\nbanner:: second.png\nicon:: 🌊\n";
        let meta = extract_entry_metadata(text);
        assert_eq!(meta.banner.as_deref(), Some("covers/first.png"));
        assert_eq!(meta.icon.as_deref(), Some("🌊"));
        assert_eq!(meta.summary, "Intro");
    }

    #[test]
    fn missing_directives_yield_none() {
        let meta = extract_entry_metadata("Just prose.");
        assert_eq!(meta.banner, None);
        assert_eq!(meta.icon, None);
    }

    #[test]
    fn frontmatter_fills_gaps_and_overrides_summary() {
        let text = "---\nbanner: hero.jpg\nicon: \"🏔\"\nsummary: A *short* trip.\n---\nicon:: 📷\n\nBody text.\n";
        let meta = extract_entry_metadata(text);
        assert_eq!(meta.banner.as_deref(), Some("hero.jpg"));
        assert_eq!(meta.icon.as_deref(), Some("📷"));
        assert_eq!(meta.summary, "A short trip.");
    }

    #[test]
    fn frontmatter_never_leaks_into_summary() {
        let text = "---\nbanner: hero.jpg\n---\nFirst paragraph.\n";
        let meta = extract_entry_metadata(text);
        assert_eq!(meta.summary, "First paragraph.");
    }

    #[test]
    fn leading_thematic_break_is_not_frontmatter() {
        let text = "---\nIntro paragraph.\n---\nMore text.";
        let (frontmatter, body) = split_frontmatter(text);
        assert_eq!(body, text);
        assert_eq!(frontmatter.summary, None);
        assert_eq!(extract_entry_metadata(text).summary, "Intro paragraph.");
    }

    #[test]
    fn reads_markdown_with_byte_order_mark() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entry.md");
        fs::write(&path, "\u{feff}# Title\n").unwrap();
        assert_eq!(read_markdown(&path).unwrap(), "# Title\n");
    }
}
