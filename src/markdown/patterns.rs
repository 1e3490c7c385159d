//! Compiled regular expressions shared by the Markdown helpers.

use std::sync::OnceLock;

use regex::Regex;

macro_rules! pattern {
    ($name:ident, $source:expr) => {
        pub(crate) fn $name() -> &'static Regex {
            static PATTERN: OnceLock<Regex> = OnceLock::new();
            PATTERN.get_or_init(|| {
                Regex::new($source).expect(concat!("invalid ", stringify!($name), " regex"))
            })
        }
    };
}

pattern!(image_token, r"!\[[^\]]*\]\(([^)]+)\)|!\[\[([^\]]+)\]\]");
pattern!(standard_image, r"!\[([^\]]*)\]\(([^)]+)\)");
pattern!(embed_image, r"!\[\[([^\]]+)\]\]");
pattern!(banner_directive, r"(?im)^\s*banner::\s*(.+)$");
pattern!(icon_directive, r"(?im)^\s*icon::\s*(.+)$");
pattern!(directive_line, r"(?i)^\s*(?:banner|icon)::");
pattern!(outliner_meta_line, r"(?i)^\s*[a-z0-9_-]+\.[^:\s]+::");
pattern!(collapsed_line, r"(?i)^\s*collapsed::\s*true\s*$");
pattern!(
    caption_line,
    r"(?i)^\s*!\[[^\]]*\]\([^)]+\)\s*\[\[#caption\]\]==.*?==\s*$"
);
pattern!(caption_decor, r"(?i)\[\[#caption\]\]==.*?==");
pattern!(
    caption_block,
    r"(?i)!\[([^\]]*)\]\(([^)]+)\)\s*\[\[#caption\]\]==((?s:.*?))=="
);
pattern!(wiki_link, r"\[\[([^\]|]+)(?:\|([^\]]+))?\]\]");
pattern!(markdown_link, r"\[([^\]]+)\]\([^)]+\)");
pattern!(markup_chars, r"[#*_>`~]");
pattern!(whitespace_run, r"\s+");
pattern!(list_marker, r"^[-*+]+(?:\s+|$)");

/// Lines that carry page metadata rather than prose.
pub(crate) fn is_metadata_line(line: &str) -> bool {
    directive_line().is_match(line)
        || outliner_meta_line().is_match(line)
        || collapsed_line().is_match(line)
}
