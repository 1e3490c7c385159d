//! Build-time rendering of the entry body, used as the page's no-script fallback.
//!
//! Preprocessing matches what the page's client-side renderer does, so both views agree on
//! which lines are dropped and where every image is served from.

use maud::html;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html as md_html};
use regex::Captures;

use crate::markdown::patterns::{caption_block, embed_image, is_metadata_line, standard_image};
use crate::models::ImageMap;

/// Drop directive, outliner metadata and `collapsed:: true` lines.
pub fn strip_metadata_lines(markdown: &str) -> String {
    markdown
        .lines()
        .filter(|line| !is_metadata_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a Markdown body to HTML with images remapped through `image_map`.
pub fn render_static_body(markdown: &str, image_map: &ImageMap, assets_dir: &str) -> String {
    let cleaned = strip_metadata_lines(markdown);
    let with_captions = apply_caption_blocks(&cleaned, image_map, assets_dir);
    let normalised = remap_image_references(&with_captions, image_map, assets_dir);

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(&normalised, options);
    let mut body = String::new();
    md_html::push_html(&mut body, flatten_top_level_lists(parser).into_iter());
    body
}

/// Turn `![alt](src) [[#caption]]==text==` into a captioned figure.
fn apply_caption_blocks(markdown: &str, image_map: &ImageMap, assets_dir: &str) -> String {
    caption_block()
        .replace_all(markdown, |captures: &Captures<'_>| {
            let alt = &captures[1];
            let src = image_map.resolve(&captures[2], assets_dir);
            let caption = captures[3].trim();
            html! {
                figure.md-figure {
                    img src=(src) alt=(alt) loading="lazy" decoding="async";
                    figcaption { (caption) }
                }
            }
            .into_string()
        })
        .into_owned()
}

fn remap_image_references(markdown: &str, image_map: &ImageMap, assets_dir: &str) -> String {
    let standard = standard_image().replace_all(markdown, |captures: &Captures<'_>| {
        let src = image_map.resolve(&captures[2], assets_dir);
        format!("![{}]({})", &captures[1], link_destination(&src))
    });
    embed_image()
        .replace_all(&standard, |captures: &Captures<'_>| {
            let src = image_map.resolve(&captures[1], assets_dir);
            format!("![{}]({})", &captures[1], link_destination(&src))
        })
        .into_owned()
}

fn link_destination(src: &str) -> String {
    if src.contains(char::is_whitespace) {
        format!("<{src}>")
    } else {
        src.to_string()
    }
}

/// Replace top-level bullet lists with one `div.flat-entry` per item; nested lists stay lists.
fn flatten_top_level_lists<'a>(parser: Parser<'a>) -> Vec<Event<'a>> {
    let mut events = Vec::new();
    let mut open_lists: Vec<bool> = Vec::new();

    for event in parser {
        match event {
            Event::Start(Tag::List(start)) => {
                let flatten = open_lists.is_empty() && start.is_none();
                open_lists.push(flatten);
                if !flatten {
                    events.push(Event::Start(Tag::List(start)));
                }
            }
            Event::End(TagEnd::List(ordered)) => {
                if !open_lists.pop().unwrap_or(false) {
                    events.push(Event::End(TagEnd::List(ordered)));
                }
            }
            Event::Start(Tag::Item) if open_lists == [true] => {
                events.push(Event::Html("<div class=\"flat-entry\">".into()));
            }
            Event::End(TagEnd::Item) if open_lists == [true] => {
                events.push(Event::Html("</div>\n".into()));
            }
            Event::SoftBreak => events.push(Event::HardBreak),
            other => events.push(other),
        }
    }

    events
}
