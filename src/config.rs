//! Project configuration loader describing where journals and listing pages live.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::project::JournalLayout;

/// File searched for in the project directory.
pub const DEFAULT_CONFIG_FILE: &str = "journal.config.json";

const DEFAULT_RENDERER_URL: &str = "https://cdn.jsdelivr.net/npm/marked/marked.min.js";

/// Discoverable project configuration describing filesystem layout and output paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Directory holding one folder per journal entry.
    pub journals_root: String,
    /// Listing page showing the most recent updates across the site.
    pub recent_updates_page: String,
    /// Listing page dedicated to journal entries.
    pub journal_index_page: String,
    /// URL from the listing pages' directory to the journals root.
    pub journals_url_prefix: String,
    /// Hero image used when an entry has neither a banner nor an inline image.
    pub default_hero: String,
    /// Per-entry folder receiving copied images.
    pub assets_dir: String,
    /// Per-entry folder assets are staged into before being swapped in.
    pub staging_dir: String,
    /// Per-entry metadata file persisting the image map.
    pub meta_file: String,
    /// Class of the element listing blocks are inserted into.
    pub container_class: String,
    /// Closing tag the container is created in front of when missing.
    pub container_anchor: String,
    /// `lang` attribute of generated entry pages.
    pub page_language: String,
    /// Script URL of the client-side Markdown renderer.
    pub markdown_renderer_url: String,
    /// Keep a `.bak` copy of listing pages before rewriting them.
    pub keep_backups: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            journals_root: "journals".into(),
            recent_updates_page: "homepage/recent-updates.html".into(),
            journal_index_page: "homepage/journal.html".into(),
            journals_url_prefix: "../journals".into(),
            default_hero: "default.jpeg".into(),
            assets_dir: "assets".into(),
            staging_dir: "__assets_build".into(),
            meta_file: "journal_meta.json".into(),
            container_class: "update-container".into(),
            container_anchor: "</section>".into(),
            page_language: "zh-CN".into(),
            markdown_renderer_url: DEFAULT_RENDERER_URL.into(),
            keep_backups: false,
        }
    }
}

impl JournalConfig {
    /// Attempt to load configuration from the provided project directory.
    ///
    /// A missing or malformed file falls back to the defaults.
    pub fn discover(project_dir: &Path) -> Self {
        let candidate = project_dir.join(DEFAULT_CONFIG_FILE);
        match Self::from_path(&candidate) {
            Some(config) => config,
            None => {
                if candidate.exists() {
                    log::warn!(
                        "ignoring unreadable configuration at {}",
                        candidate.display()
                    );
                }
                Self::default()
            }
        }
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Resolve every relative path against `project_dir`.
    pub fn to_layout(&self, project_dir: &Path) -> JournalLayout {
        JournalLayout {
            journals_root: project_dir.join(&self.journals_root),
            recent_updates_page: project_dir.join(&self.recent_updates_page),
            journal_index_page: project_dir.join(&self.journal_index_page),
            journals_url_prefix: self.journals_url_prefix.trim_end_matches('/').to_string(),
            default_hero: self.default_hero.trim_start_matches('/').to_string(),
            assets_dir: self.assets_dir.clone(),
            staging_dir: self.staging_dir.clone(),
            meta_file: self.meta_file.clone(),
            container_class: self.container_class.clone(),
            container_anchor: self.container_anchor.clone(),
            page_language: self.page_language.clone(),
            markdown_renderer_url: self.markdown_renderer_url.clone(),
            keep_backups: self.keep_backups,
        }
    }
}
