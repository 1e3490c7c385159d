//! Keeps an entry's summary block current on the recent-updates and journal index pages.
//!
//! Both pages are patched in memory first and only written once every patch succeeded, so a
//! page missing its markers never leaves the other one half updated.

use std::fs;
use std::path::{Path, PathBuf};

use maud::{Markup, html};
use regex::Regex;

use crate::error::{IoResultExt, JournalError, JournalResult};
use crate::models::EntryBuild;
use crate::project::{JournalLayout, ListingTarget};
use crate::site::blocks::enclosing_element;

const ITEM_CLASS: &str = "update-item";

/// How a single listing page is patched.
#[derive(Debug, Clone, Copy)]
pub struct ListingPatch<'a> {
    /// Class of the element blocks are inserted into.
    pub container_class: &'a str,
    /// Closing tag a missing container is created in front of.
    pub container_anchor: &'a str,
    /// Whether a missing container may be created.
    pub ensure_container: bool,
}

impl<'a> ListingPatch<'a> {
    /// Patch settings for one of the layout's listing targets.
    pub fn for_target(layout: &'a JournalLayout, target: ListingTarget<'_>) -> Self {
        Self {
            container_class: &layout.container_class,
            container_anchor: &layout.container_anchor,
            ensure_container: target.ensure_container,
        }
    }
}

/// A listing page whose new content has been computed but not yet written.
#[derive(Debug, Clone)]
pub struct PendingListing {
    /// Page on disk.
    pub path: PathBuf,
    /// Content to write.
    pub updated: String,
}

/// Summary block shown for an entry on the listing pages.
pub fn render_update_block(build: &EntryBuild) -> Markup {
    html! {
        div.update-item {
            div.update-image {
                a href=(build.link_href) {
                    img.lazy data-src=(build.hero.homepage) alt=(format!("{} cover", build.title));
                    div.image-title {}
                }
            }
            div.update-content {
                div.update-title { (build.title) }
                div.update-main.clickable {
                    p { (build.summary) }
                }
                div.update-time { (build.timestamp) }
            }
        }
    }
}

fn class_opening_tag(class: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)<div\b[^>]*\bclass\s*=\s*["'](?:[^"']*\s)?{}(?:\s[^"']*)?["'][^>]*>"#,
        regex::escape(class)
    ))
    .expect("invalid class tag regex")
}

fn escaped(value: &str) -> String {
    html! { (value) }.into_string()
}

/// Verify `content` can take a block without modifying anything.
pub fn check_listing(content: &str, page: &str, patch: &ListingPatch<'_>) -> JournalResult<()> {
    if class_opening_tag(patch.container_class).is_match(content) {
        return Ok(());
    }
    if patch.ensure_container && content.contains(patch.container_anchor) {
        return Ok(());
    }
    Err(container_missing(page, patch))
}

fn container_missing(page: &str, patch: &ListingPatch<'_>) -> JournalError {
    let marker = if patch.ensure_container {
        patch.container_anchor.to_string()
    } else {
        format!("<div class=\"{}\">", patch.container_class)
    };
    JournalError::MarkerNotFound {
        page: page.to_string(),
        marker,
    }
}

/// Create an empty container in front of the anchor tag unless one exists.
pub fn ensure_container(content: &str, page: &str, patch: &ListingPatch<'_>) -> JournalResult<String> {
    if class_opening_tag(patch.container_class).is_match(content) {
        return Ok(content.to_string());
    }
    let Some(position) = content.find(patch.container_anchor) else {
        return Err(container_missing(page, patch));
    };
    let shell = format!(
        "<div class=\"{}\">\n</div>\n",
        escaped(patch.container_class)
    );
    let mut updated = String::with_capacity(content.len() + shell.len());
    updated.push_str(&content[..position]);
    updated.push_str(&shell);
    updated.push_str(&content[position..]);
    Ok(updated)
}

/// Remove every update block linking to `link_href`, returning the new content and how many
/// blocks were dropped.
///
/// A link occurrence that is not inside an update block is left alone.
pub fn remove_existing_blocks(content: &str, link_href: &str) -> (String, usize) {
    let marker = format!("href=\"{}\"", escaped(link_href));
    let opening = class_opening_tag(ITEM_CLASS);
    let mut content = content.to_string();
    let mut removed = 0;
    let mut search_from = 0;

    while let Some(offset) = content[search_from..].find(&marker) {
        let position = search_from + offset;
        match enclosing_element(&content, position, &opening) {
            Some(range) => {
                let head = content[..range.start].trim_end();
                let tail = content[range.end..].trim_start();
                search_from = head.len();
                content = format!("{head}\n{tail}");
                removed += 1;
            }
            None => search_from = position + marker.len(),
        }
    }

    (content, removed)
}

/// Insert `block` right after the opening tag of the container.
pub fn insert_block(
    content: &str,
    page: &str,
    block: &str,
    patch: &ListingPatch<'_>,
) -> JournalResult<String> {
    let Some(opening) = class_opening_tag(patch.container_class).find(content) else {
        return Err(container_missing(page, patch));
    };
    let mut updated = String::with_capacity(content.len() + block.len() + 1);
    updated.push_str(&content[..opening.end()]);
    updated.push('\n');
    updated.push_str(block);
    updated.push_str(&content[opening.end()..]);
    Ok(updated)
}

/// Replace any block for `link_href` in `content` with `block`, at the top of the container.
pub fn patch_listing(
    content: &str,
    page: &str,
    block: &str,
    link_href: &str,
    patch: &ListingPatch<'_>,
) -> JournalResult<String> {
    let content = if patch.ensure_container {
        ensure_container(content, page, patch)?
    } else {
        content.to_string()
    };
    let (content, removed) = remove_existing_blocks(&content, link_href);
    if removed > 0 {
        log::debug!("replaced {removed} existing block(s) for {link_href} in {page}");
    }
    insert_block(&content, page, block, patch)
}

fn read_listing(path: &Path) -> JournalResult<String> {
    if !path.is_file() {
        return Err(JournalError::ListingNotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).at_path(path)
}

/// Fail early when a listing page is missing or cannot take a block.
pub fn preflight_listings(layout: &JournalLayout) -> JournalResult<()> {
    for target in layout.listing_targets() {
        let content = read_listing(target.path)?;
        let page = target.path.display().to_string();
        check_listing(&content, &page, &ListingPatch::for_target(layout, target))?;
    }
    Ok(())
}

/// Compute the patched content of every listing page for `build`.
pub fn prepare_listing_updates(
    layout: &JournalLayout,
    build: &EntryBuild,
) -> JournalResult<Vec<PendingListing>> {
    let block = render_update_block(build).into_string();
    layout
        .listing_targets()
        .into_iter()
        .map(|target| -> JournalResult<PendingListing> {
            let content = read_listing(target.path)?;
            let page = target.path.display().to_string();
            let patch = ListingPatch::for_target(layout, target);
            let updated = patch_listing(&content, &page, &block, &build.link_href, &patch)?;
            Ok(PendingListing {
                path: target.path.to_path_buf(),
                updated,
            })
        })
        .collect()
}

/// Write prepared listing pages, keeping a `.bak` copy of each first when asked to.
pub fn commit_listing_updates(pending: &[PendingListing], keep_backups: bool) -> JournalResult<()> {
    for listing in pending {
        if keep_backups {
            let backup = backup_path(&listing.path);
            fs::copy(&listing.path, &backup).at_path(&backup)?;
        }
        fs::write(&listing.path, &listing.updated).at_path(&listing.path)?;
        log::info!("updated listing {}", listing.path.display());
    }
    Ok(())
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HeroSources, ImageMap};
    use crate::project::test_layout;
    use tempfile::tempdir;

    const LINK: &str = "../journals/foo/foo.html";

    fn patch(ensure_container: bool) -> ListingPatch<'static> {
        ListingPatch {
            container_class: "update-container",
            container_anchor: "</section>",
            ensure_container,
        }
    }

    fn build(layout: &JournalLayout, summary: &str) -> EntryBuild {
        EntryBuild {
            entry_name: "foo".into(),
            title: "foo".into(),
            summary: summary.into(),
            icon: None,
            timestamp: "2024-05-01 10:00:00".into(),
            paths: layout.entry_paths("foo"),
            hero: HeroSources {
                entry: "../default.jpeg".into(),
                homepage: "../journals/default.jpeg".into(),
            },
            link_href: layout.entry_link("foo"),
            md_filename: "foo.md".into(),
            image_map: ImageMap::new(),
            warnings: Vec::new(),
        }
    }

    fn page_with(blocks: &str) -> String {
        format!(
            "<html><body><section>\n<div class=\"update-container\">\n{blocks}\n</div>\n</section></body></html>"
        )
    }

    #[test]
    fn block_carries_link_hero_and_escaped_text() {
        let layout = test_layout(Path::new("/site"));
        let mut build = build(&layout, "fish & <chips>");
        build.title = "Tom's \"trip\"".into();
        let html = render_update_block(&build).into_string();
        assert!(html.starts_with("<div class=\"update-item\">"));
        assert!(html.contains("href=\"../journals/foo/foo.html\""));
        assert!(html.contains("data-src=\"../journals/default.jpeg\""));
        assert!(html.contains("<p>fish &amp; &lt;chips&gt;</p>"));
        assert!(html.contains("&quot;trip&quot; cover"));
        assert!(html.contains("<div class=\"update-time\">2024-05-01 10:00:00</div>"));
    }

    #[test]
    fn reinserting_leaves_exactly_one_block() {
        let layout = test_layout(Path::new("/site"));
        let first = render_update_block(&build(&layout, "old summary")).into_string();
        let second = render_update_block(&build(&layout, "new summary")).into_string();
        let page = page_with("");

        let once = patch_listing(&page, "index", &first, LINK, &patch(true)).unwrap();
        let twice = patch_listing(&once, "index", &second, LINK, &patch(true)).unwrap();

        assert_eq!(twice.matches(&format!("href=\"{LINK}\"")).count(), 1);
        assert!(twice.contains("new summary"));
        assert!(!twice.contains("old summary"));
        assert_eq!(twice.matches("<div").count(), twice.matches("</div>").count());
    }

    #[test]
    fn other_entries_are_untouched_and_new_block_goes_first() {
        let other = r#"<div class="update-item"><div class="update-image"><a href="../journals/bar/bar.html"></a></div><div class="update-content"><p>bar</p></div></div>"#;
        let page = page_with(other);
        let updated = patch_listing(&page, "index", "<div class=\"update-item\">NEW</div>", LINK, &patch(false)).unwrap();
        assert!(updated.contains(other));
        assert!(updated.find("NEW").unwrap() < updated.find("bar.html").unwrap());
    }

    #[test]
    fn removes_duplicate_blocks_for_same_link() {
        let stale = format!(r#"<div class="update-item"><div><a href="{LINK}"></a></div></div>"#);
        let page = page_with(&format!("{stale}\n{stale}"));
        let (content, removed) = remove_existing_blocks(&page, LINK);
        assert_eq!(removed, 2);
        assert!(!content.contains(LINK));
        assert!(content.contains("<div class=\"update-container\">"));
    }

    #[test]
    fn stray_link_outside_blocks_is_kept() {
        let page = format!(r#"<nav><a href="{LINK}">latest</a></nav>{}"#, page_with(""));
        let (content, removed) = remove_existing_blocks(&page, LINK);
        assert_eq!(removed, 0);
        assert_eq!(content, page);
    }

    #[test]
    fn creates_container_before_anchor_when_allowed() {
        let page = "<section><h2>Journals</h2></section>";
        let updated = patch_listing(page, "index", "<div class=\"update-item\">X</div>", LINK, &patch(true)).unwrap();
        assert!(updated.contains("<h2>Journals</h2><div class=\"update-container\">\n<div class=\"update-item\">X</div>\n</div>\n</section>"));
    }

    #[test]
    fn missing_container_is_an_error_when_not_allowed() {
        let page = "<section></section>";
        let err = patch_listing(page, "recent", "<div></div>", LINK, &patch(false)).unwrap_err();
        assert!(matches!(err, JournalError::MarkerNotFound { .. }));
        assert!(check_listing(page, "recent", &patch(false)).is_err());
        assert!(check_listing(page, "recent", &patch(true)).is_ok());
        assert!(check_listing("<main></main>", "recent", &patch(true)).is_err());
    }

    #[test]
    fn container_is_found_among_other_classes() {
        let page = r#"<div id="list" class="grid update-container wide"></div>"#;
        let updated = insert_block(page, "index", "<b>x</b>", &patch(false)).unwrap();
        assert_eq!(
            updated,
            "<div id=\"list\" class=\"grid update-container wide\">\n<b>x</b></div>"
        );
        assert!(insert_block(r#"<div class="update-container-old"></div>"#, "index", "x", &patch(false)).is_err());
    }

    #[test]
    fn prepared_updates_are_written_with_backups() {
        let dir = tempdir().unwrap();
        let layout = test_layout(dir.path());
        fs::create_dir_all(layout.recent_updates_page.parent().unwrap()).unwrap();
        fs::write(&layout.recent_updates_page, page_with("")).unwrap();
        fs::write(&layout.journal_index_page, "<section></section>").unwrap();

        preflight_listings(&layout).unwrap();
        let pending = prepare_listing_updates(&layout, &build(&layout, "hello")).unwrap();
        commit_listing_updates(&pending, true).unwrap();

        let recent = fs::read_to_string(&layout.recent_updates_page).unwrap();
        let index = fs::read_to_string(&layout.journal_index_page).unwrap();
        assert!(recent.contains("hello"));
        assert!(index.contains("hello"));
        let backup = fs::read_to_string(dir.path().join("homepage/journal.html.bak")).unwrap();
        assert_eq!(backup, "<section></section>");
    }

    #[test]
    fn missing_listing_page_fails_preflight() {
        let dir = tempdir().unwrap();
        let layout = test_layout(dir.path());
        let err = preflight_listings(&layout).unwrap_err();
        assert!(matches!(err, JournalError::ListingNotFound(_)));
    }
}
