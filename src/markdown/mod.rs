//! Markdown scanning: directives, frontmatter, image references, summaries and the static
//! fallback rendering embedded in entry pages.

mod directives;
mod patterns;
mod references;
mod render;
mod summary;

pub use directives::{extract_entry_metadata, read_markdown, split_frontmatter};
pub use references::collect_image_references;
pub use render::{render_static_body, strip_metadata_lines};
pub use summary::{FALLBACK_SUMMARY, MAX_SUMMARY_LENGTH, clean_summary_text, extract_summary};
