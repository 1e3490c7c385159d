//! Resolved filesystem layout for a journal project.

use std::path::{Path, PathBuf};

/// Absolute paths and naming conventions used by a build.
#[derive(Debug, Clone)]
pub struct JournalLayout {
  /// Directory holding one folder per journal entry.
  pub journals_root: PathBuf,
  /// Recent-updates listing page.
  pub recent_updates_page: PathBuf,
  /// Journal index listing page.
  pub journal_index_page: PathBuf,
  /// URL from the listing pages to the journals root, without trailing slash.
  pub journals_url_prefix: String,
  /// Default hero file name relative to the journals root.
  pub default_hero: String,
  /// Per-entry assets folder name.
  pub assets_dir: String,
  /// Per-entry staging folder name.
  pub staging_dir: String,
  /// Per-entry metadata file name.
  pub meta_file: String,
  /// Class of the listing container element.
  pub container_class: String,
  /// Closing tag the listing container is created in front of.
  pub container_anchor: String,
  /// `lang` attribute of generated pages.
  pub page_language: String,
  /// Client-side Markdown renderer script URL.
  pub markdown_renderer_url: String,
  /// Write `.bak` copies of listing pages before patching.
  pub keep_backups: bool,
}

/// Paths owned by a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPaths {
  /// `<journals_root>/<entry>`
  pub entry_dir: PathBuf,
  /// `<entry_dir>/<entry>.html`
  pub html_path: PathBuf,
  /// `<entry_dir>/<entry>.md`
  pub md_destination: PathBuf,
  /// `<entry_dir>/assets`
  pub assets_dir: PathBuf,
  /// `<entry_dir>/__assets_build`
  pub staging_dir: PathBuf,
  /// `<entry_dir>/journal_meta.json`
  pub meta_path: PathBuf,
}

/// A listing page together with how it should be patched.
#[derive(Debug, Clone, Copy)]
pub struct ListingTarget<'a> {
  /// Page on disk.
  pub path: &'a Path,
  /// Create the container in front of the anchor when the page has none.
  pub ensure_container: bool,
}

impl JournalLayout {
  /// Paths for the entry called `entry_name`.
  pub fn entry_paths(&self, entry_name: &str) -> EntryPaths {
    let entry_dir = self.journals_root.join(entry_name);
    EntryPaths {
      html_path: entry_dir.join(format!("{entry_name}.html")),
      md_destination: entry_dir.join(format!("{entry_name}.md")),
      assets_dir: entry_dir.join(&self.assets_dir),
      staging_dir: entry_dir.join(&self.staging_dir),
      meta_path: entry_dir.join(&self.meta_file),
      entry_dir,
    }
  }

  /// Link to an entry page as seen from the listing pages.
  pub fn entry_link(&self, entry_name: &str) -> String {
    format!(
      "{}/{}/{}.html",
      self.journals_url_prefix, entry_name, entry_name
    )
  }

  /// The recent-updates page is patched as is; the journal index gets a container on demand.
  pub fn listing_targets(&self) -> [ListingTarget<'_>; 2] {
    [
      ListingTarget {
        path: &self.recent_updates_page,
        ensure_container: false,
      },
      ListingTarget {
        path: &self.journal_index_page,
        ensure_container: true,
      },
    ]
  }
}

#[cfg(test)]
pub(crate) fn test_layout(root: &Path) -> JournalLayout {
  crate::config::JournalConfig::default().to_layout(root)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn derives_entry_paths_from_name() {
    let layout = test_layout(Path::new("/site"));
    let paths = layout.entry_paths("kyoto");
    assert_eq!(paths.entry_dir, Path::new("/site/journals/kyoto"));
    assert_eq!(paths.html_path, Path::new("/site/journals/kyoto/kyoto.html"));
    assert_eq!(paths.md_destination, Path::new("/site/journals/kyoto/kyoto.md"));
    assert_eq!(paths.assets_dir, Path::new("/site/journals/kyoto/assets"));
    assert_eq!(
      paths.meta_path,
      Path::new("/site/journals/kyoto/journal_meta.json")
    );
  }

  #[test]
  fn builds_listing_link() {
    let layout = test_layout(Path::new("/site"));
    assert_eq!(layout.entry_link("foo"), "../journals/foo/foo.html");
  }
}
