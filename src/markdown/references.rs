//! Image references embedded in Markdown.

use crate::markdown::patterns::image_token;

/// Collect image references in document order, duplicates included.
///
/// Both `![alt](src)` and `![[src]]` forms are recognised.
pub fn collect_image_references(markdown: &str) -> Vec<String> {
    image_token()
        .captures_iter(markdown)
        .filter_map(|captures| captures.get(1).or_else(|| captures.get(2)))
        .map(|reference| reference.as_str().trim().to_string())
        .filter(|reference| !reference.is_empty())
        .collect()
}
