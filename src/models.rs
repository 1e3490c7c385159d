//! Data structures produced while building a journal entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::asset_paths::{bare_file_name, clean_image_reference};
use crate::project::EntryPaths;

/// Mapping from an original Markdown image reference (or its bare file name) to the path
/// the entry page serves it from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageMap(BTreeMap<String, String>);

impl ImageMap {
  /// Create an empty map.
  pub fn new() -> Self {
    Self::default()
  }

  /// Served path recorded for `reference`.
  pub fn get(&self, reference: &str) -> Option<&str> {
    self.0.get(reference).map(String::as_str)
  }

  /// Record `reference`, replacing any previous mapping.
  pub fn insert(&mut self, reference: impl Into<String>, served: impl Into<String>) {
    self.0.insert(reference.into(), served.into());
  }

  /// Record `alias` only when nothing claimed it yet.
  pub fn alias(&mut self, alias: &str, served: &str) {
    if alias.is_empty() {
      return;
    }
    self
      .0
      .entry(alias.to_string())
      .or_insert_with(|| served.to_string());
  }

  /// Number of mapped keys, aliases included.
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Whether nothing has been mapped.
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Remap an image reference the way the entry page does at view time.
  ///
  /// Exact reference first, then its bare file name, then a guess inside the assets folder.
  pub fn resolve(&self, reference: &str, assets_dir: &str) -> String {
    let cleaned = clean_image_reference(reference);
    if let Some(served) = self.get(&cleaned) {
      return served.to_string();
    }
    let file_name = bare_file_name(&cleaned);
    if file_name.is_empty() {
      return cleaned;
    }
    match self.get(file_name) {
      Some(served) => served.to_string(),
      None => format!("./{assets_dir}/{file_name}"),
    }
  }
}

/// Contents of the per-entry metadata file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalMeta {
  /// Image map of the last successful build.
  #[serde(default)]
  pub image_map: ImageMap,
  /// Timestamp of the last successful build.
  #[serde(default)]
  pub updated_at: String,
}

/// Optional YAML frontmatter accepted at the top of a journal Markdown file.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EntryFrontmatterRecord {
  /// Hero image reference.
  pub banner: Option<String>,
  /// Display glyph.
  pub icon: Option<String>,
  /// Explicit summary overriding the derived one.
  pub summary: Option<String>,
}

/// Metadata harvested from the Markdown source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
  /// `banner::` directive value.
  pub banner: Option<String>,
  /// `icon::` directive value.
  pub icon: Option<String>,
  /// Plain-text summary safe to embed after escaping.
  pub summary: String,
}

/// Hero image path in both contexts it is referenced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroSources {
  /// Path used inside the entry's own page.
  pub entry: String,
  /// Path used by listing pages.
  pub homepage: String,
}

/// Everything known about an entry once its build completed.
#[derive(Debug, Clone)]
pub struct EntryBuild {
  /// Entry identifier, taken from the Markdown file stem.
  pub entry_name: String,
  /// Display title.
  pub title: String,
  /// Plain-text summary.
  pub summary: String,
  /// Optional display glyph.
  pub icon: Option<String>,
  /// Build time, `%Y-%m-%d %H:%M:%S`.
  pub timestamp: String,
  /// On-disk locations of the entry's files.
  pub paths: EntryPaths,
  /// Hero image paths.
  pub hero: HeroSources,
  /// Link to the entry page from the listing pages.
  pub link_href: String,
  /// File name of the copied Markdown, fetched by the page at view time.
  pub md_filename: String,
  /// Persisted reference to served-path mapping.
  pub image_map: ImageMap,
  /// Non-fatal problems found while resolving assets.
  pub warnings: Vec<String>,
}
