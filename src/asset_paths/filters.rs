use std::sync::OnceLock;

use regex::Regex;

fn served_as_written() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(?:https?://|data:)").expect("invalid remote reference regex")
    })
}

/// `http(s)://` URLs and `data:` URIs stay in the image map verbatim and are never copied.
pub fn is_remote_reference(value: &str) -> bool {
    served_as_written().is_match(value)
}
