//! The standalone entry page.
//!
//! The page fetches the copied Markdown and renders it client-side so later edits to the `.md`
//! show up without a rebuild; a build-time rendering sits in `<noscript>` for readers without
//! scripts.

use std::fs;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;

use crate::error::{IoResultExt, JournalError, JournalResult};
use crate::markdown::{render_static_body, split_frontmatter};
use crate::models::EntryBuild;
use crate::project::JournalLayout;

const ENTRY_CSS: &str = include_str!("../../static/entry.css");
const ENTRY_JS: &str = include_str!("../../static/entry.js");
const DEFAULT_ICON: &str = "📓";

/// Render the entry page for `build`; `markdown` is the entry source as copied next to it.
pub fn render_entry_page(
    layout: &JournalLayout,
    build: &EntryBuild,
    markdown: &str,
) -> JournalResult<Markup> {
    let encode_error = |source| JournalError::Json {
        path: build.paths.html_path.clone(),
        source,
    };
    let page_data = format!(
        "const MD_FILE = {};\nconst ASSETS_DIR = {};\nconst IMAGE_MAP = {};",
        script_literal(&build.md_filename).map_err(encode_error)?,
        script_literal(&layout.assets_dir).map_err(encode_error)?,
        script_literal(&build.image_map).map_err(encode_error)?,
    );

    let (_, body) = split_frontmatter(markdown);
    let static_body = render_static_body(&body, &build.image_map, &layout.assets_dir);
    let icon = build.icon.as_deref().unwrap_or(DEFAULT_ICON);

    Ok(html! {
        (DOCTYPE)
        html lang=(layout.page_language) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="description" content=(build.summary);
                title { (build.title) }
                link rel="preconnect" href="https://fonts.googleapis.com";
                link rel="preconnect" href="https://fonts.gstatic.com" crossorigin;
                link href="https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700&display=swap" rel="stylesheet";
                style { (PreEscaped(ENTRY_CSS)) }
            }
            body {
                div.page-shell {
                    header.entry-header {
                        div.eyebrow { "Journal Entry" }
                        div.title-row {
                            div.icon-badge { (icon) }
                            h1 { (build.title) }
                        }
                        div.meta { "Last updated: " (build.timestamp) }
                    }
                    section.hero {
                        img src=(build.hero.entry) alt=(format!("{} hero", build.title)) loading="lazy" decoding="async";
                    }
                    main id="journal-body" class="markdown-body" {}
                    noscript {
                        div.markdown-body { (PreEscaped(static_body)) }
                    }
                }
                script { (PreEscaped(page_data)) }
                script src=(layout.markdown_renderer_url) {}
                script { (PreEscaped(ENTRY_JS)) }
            }
        }
    })
}

/// Render and write the entry page to its place in the entry folder.
pub fn write_entry_page(
    layout: &JournalLayout,
    build: &EntryBuild,
    markdown: &str,
) -> JournalResult<()> {
    let page = render_entry_page(layout, build, markdown)?;
    let path = &build.paths.html_path;
    fs::write(path, page.into_string()).at_path(path)
}

/// JSON literal that cannot terminate the surrounding `<script>` element.
fn script_literal<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HeroSources, ImageMap};
    use crate::project::test_layout;
    use std::path::Path;

    fn build(layout: &JournalLayout) -> EntryBuild {
        let mut image_map = ImageMap::new();
        image_map.insert("pics/cat.png", "./assets/cat.png");
        image_map.insert("cat.png", "./assets/cat.png");
        EntryBuild {
            entry_name: "kyoto".into(),
            title: "kyoto".into(),
            summary: "Temples & tea".into(),
            icon: Some("🍵".into()),
            timestamp: "2024-05-01 10:00:00".into(),
            paths: layout.entry_paths("kyoto"),
            hero: HeroSources {
                entry: "./assets/cat.png".into(),
                homepage: "../journals/kyoto/assets/cat.png".into(),
            },
            link_href: layout.entry_link("kyoto"),
            md_filename: "kyoto.md".into(),
            image_map,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn page_embeds_entry_data_and_chrome() {
        let layout = test_layout(Path::new("/site"));
        let html = render_entry_page(&layout, &build(&layout), "# Day one\n\n![cat](pics/cat.png)\n")
            .unwrap()
            .into_string();

        assert!(html.starts_with("<!DOCTYPE html><html lang=\"zh-CN\">"));
        assert!(html.contains("<title>kyoto</title>"));
        assert!(html.contains("content=\"Temples &amp; tea\""));
        assert!(html.contains("<div class=\"icon-badge\">🍵</div>"));
        assert!(html.contains("Last updated: 2024-05-01 10:00:00"));
        assert!(html.contains("src=\"./assets/cat.png\" alt=\"kyoto hero\""));
        assert!(html.contains("const MD_FILE = \"kyoto.md\";"));
        assert!(html.contains("const IMAGE_MAP = {\"cat.png\":\"./assets/cat.png\",\"pics/cat.png\":\"./assets/cat.png\"};"));
        assert!(html.contains("<main id=\"journal-body\" class=\"markdown-body\"></main>"));
        assert!(html.contains("marked.min.js"));
    }

    #[test]
    fn noscript_body_is_rendered_without_frontmatter() {
        let layout = test_layout(Path::new("/site"));
        let markdown = "---\nsummary: hidden\n---\nbanner:: pics/cat.png\n\nHello ![cat](pics/cat.png)\n";
        let html = render_entry_page(&layout, &build(&layout), markdown)
            .unwrap()
            .into_string();
        let noscript = &html[html.find("<noscript>").unwrap()..html.find("</noscript>").unwrap()];
        assert!(noscript.contains("Hello"));
        assert!(noscript.contains("src=\"./assets/cat.png\""));
        assert!(!noscript.contains("banner::"));
        assert!(!noscript.contains("summary: hidden"));
    }

    #[test]
    fn default_icon_and_script_safe_json() {
        let layout = test_layout(Path::new("/site"));
        let mut build = build(&layout);
        build.icon = None;
        build.image_map.insert("</script>.png", "./assets/x.png");
        let html = render_entry_page(&layout, &build, "").unwrap().into_string();
        assert!(html.contains("<div class=\"icon-badge\">📓</div>"));
        assert!(html.contains("<\\/script>.png"));
        assert_eq!(html.matches("</script>").count(), 3);
    }
}
