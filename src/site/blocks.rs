//! Balanced `<div>` scanning over raw listing HTML.
//!
//! Listing pages are hand-maintained, so they are patched textually rather than reparsed. A
//! block ends where the number of closing `</div>` tags catches up with the opening ones.
//! `>` characters inside attribute values are not understood.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

fn div_tag() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)<div(?:\s[^>]*)?/?>|</div\s*>").expect("invalid div tag regex")
    })
}

/// End offset (exclusive) of the `<div>` element opened at `start`.
///
/// Returns `None` when `start` is not an opening tag or the element is never closed.
pub fn element_end(content: &str, start: usize) -> Option<usize> {
    let rest = content.get(start..)?;
    let mut depth = 0usize;

    for tag in div_tag().find_iter(rest) {
        let text = tag.as_str();
        if text.starts_with("</") {
            if depth == 0 {
                return None;
            }
            depth -= 1;
            if depth == 0 {
                return Some(start + tag.end());
            }
        } else if text.ends_with("/>") {
            if depth == 0 {
                return (tag.start() == 0).then_some(start + tag.end());
            }
        } else {
            if depth == 0 && tag.start() != 0 {
                return None;
            }
            depth += 1;
        }
    }

    None
}

/// Range of the innermost element opened by `opening` that contains `position`.
///
/// `opening` must match opening tags only; candidates are tried from the nearest one backwards.
pub fn enclosing_element(content: &str, position: usize, opening: &Regex) -> Option<Range<usize>> {
    let starts: Vec<usize> = opening
        .find_iter(content)
        .map(|tag| tag.start())
        .take_while(|&start| start < position)
        .collect();

    starts.into_iter().rev().find_map(|start| {
        element_end(content, start)
            .filter(|&end| end > position)
            .map(|end| start..end)
    })
}
