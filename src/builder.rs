//! Entry build orchestrator: stages assets, persists metadata, writes the entry page and
//! keeps the listing pages in step.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::asset_paths::{clean_image_reference, compute_hero_sources};
use crate::error::{IoResultExt, JournalError, JournalResult};
use crate::markdown::{collect_image_references, extract_entry_metadata, read_markdown};
use crate::meta::{load_meta, write_meta};
use crate::models::{EntryBuild, JournalMeta};
use crate::project::{EntryPaths, JournalLayout};
use crate::site::{commit_listing_updates, prepare_listing_updates, preflight_listings, write_entry_page};
use crate::staging::{AssetStager, ReferenceKind, StagingPlan, install_asset};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether a build creates a new entry or refreshes an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
  /// The entry folder must not exist yet.
  Create,
  /// The entry folder must already exist.
  Update,
}

/// Whether publishing also patches the listing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingPolicy {
  /// Patch both listing pages.
  Update,
  /// Leave the listing pages alone.
  Skip,
}

/// High-level helper building journal entries inside a [`JournalLayout`].
pub struct JournalBuilder<'a> {
  layout: &'a JournalLayout,
}

impl<'a> JournalBuilder<'a> {
  /// Create a builder for the provided layout.
  pub fn new(layout: &'a JournalLayout) -> Self {
    Self { layout }
  }

  /// Build the entry and, unless skipped, refresh its block on both listing pages.
  ///
  /// Listing pages are checked before anything is written, so a page without its container
  /// marker aborts the whole operation.
  pub fn publish(
    &self,
    markdown_path: &Path,
    mode: BuildMode,
    listings: ListingPolicy,
  ) -> JournalResult<EntryBuild> {
    if listings == ListingPolicy::Update {
      preflight_listings(self.layout)?;
    }

    let build = self.build(markdown_path, mode)?;

    if listings == ListingPolicy::Update {
      let pending = prepare_listing_updates(self.layout, &build)?;
      commit_listing_updates(&pending, self.layout.keep_backups)?;
    }
    Ok(build)
  }

  /// Build the entry page, its assets folder and metadata file from `markdown_path`.
  pub fn build(&self, markdown_path: &Path, mode: BuildMode) -> JournalResult<EntryBuild> {
    let source = markdown_path
      .canonicalize()
      .ok()
      .filter(|path| path.is_file())
      .ok_or_else(|| JournalError::InputNotFound(markdown_path.to_path_buf()))?;
    let entry_name = source
      .file_stem()
      .map(|stem| stem.to_string_lossy().to_string())
      .filter(|stem| !stem.is_empty())
      .ok_or_else(|| JournalError::InputNotFound(markdown_path.to_path_buf()))?;

    fs::create_dir_all(&self.layout.journals_root).at_path(&self.layout.journals_root)?;
    let paths = self.layout.entry_paths(&entry_name);

    match mode {
      BuildMode::Create if paths.entry_dir.exists() => {
        return Err(JournalError::EntryExists(entry_name));
      }
      BuildMode::Update if !paths.entry_dir.is_dir() => {
        return Err(JournalError::EntryMissing(entry_name));
      }
      _ => {}
    }

    fs::create_dir_all(&paths.entry_dir).at_path(&paths.entry_dir)?;
    let result = reset_dir(&paths.staging_dir)
      .and_then(|()| self.build_entry(&source, entry_name, paths.clone()));

    if result.is_err() {
      discard(&paths.staging_dir);
      if mode == BuildMode::Create {
        discard(&paths.entry_dir);
      }
    }
    result
  }

  fn build_entry(
    &self,
    source: &Path,
    entry_name: String,
    paths: EntryPaths,
  ) -> JournalResult<EntryBuild> {
    let layout = self.layout;
    let markdown = read_markdown(source)?;
    let previous = load_meta(&paths.meta_path);
    let metadata = extract_entry_metadata(&markdown);

    let references: Vec<String> = collect_image_references(&markdown)
      .iter()
      .map(|reference| clean_image_reference(reference))
      .filter(|reference| !reference.is_empty())
      .collect();
    let banner = metadata
      .banner
      .as_deref()
      .map(clean_image_reference)
      .filter(|banner| !banner.is_empty());

    let source_dir = source.parent().unwrap_or_else(|| Path::new("."));
    let fallback_dir = paths.assets_dir.is_dir().then_some(paths.assets_dir.as_path());
    let plan = StagingPlan {
      source_dir,
      staging_dir: &paths.staging_dir,
      fallback_dir,
      existing: &previous.image_map,
      assets_dir: &layout.assets_dir,
    };
    let mut stager = AssetStager::new(
      plan,
      references.iter().map(String::as_str).chain(banner.as_deref()),
    );

    let mut first_inline = None;
    for reference in &references {
      let served = stager.stage(reference, ReferenceKind::Inline);
      if first_inline.is_none() {
        first_inline = served;
      }
    }
    let banner_served = banner
      .as_deref()
      .and_then(|banner| stager.stage(banner, ReferenceKind::Banner));
    let (image_map, warnings) = stager.finish();

    let hero_candidate = banner_served.or(first_inline);
    let hero = compute_hero_sources(layout, &entry_name, hero_candidate.as_deref());
    let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();

    install_asset(source, &paths.md_destination).at_path(&paths.md_destination)?;
    let md_filename = paths
      .md_destination
      .file_name()
      .map(|name| name.to_string_lossy().to_string())
      .unwrap_or_else(|| format!("{entry_name}.md"));

    let build = EntryBuild {
      title: entry_name.clone(),
      link_href: layout.entry_link(&entry_name),
      entry_name,
      summary: metadata.summary,
      icon: metadata.icon,
      timestamp,
      paths,
      hero,
      md_filename,
      image_map,
      warnings,
    };

    write_entry_page(layout, &build, &markdown)?;
    write_meta(
      &build.paths.meta_path,
      &JournalMeta {
        image_map: build.image_map.clone(),
        updated_at: build.timestamp.clone(),
      },
    )?;
    swap_assets(&build.paths)?;

    log::info!(
      "built journal entry {} ({} image mappings, {} warnings)",
      build.entry_name,
      build.image_map.len(),
      build.warnings.len()
    );
    Ok(build)
  }
}

fn reset_dir(path: &Path) -> JournalResult<()> {
  discard(path);
  fs::create_dir_all(path).at_path(path)
}

fn discard(path: &Path) {
  match fs::remove_dir_all(path) {
    Ok(()) => {}
    Err(err) if err.kind() == ErrorKind::NotFound => {}
    Err(err) => log::warn!("failed to remove {}: {}", path.display(), err),
  }
}

/// Replace the entry's assets folder with the freshly staged one.
///
/// The previous folder is moved aside first and only deleted once the staged folder is in
/// place, so a failed rename leaves the old assets where they were.
fn swap_assets(paths: &EntryPaths) -> JournalResult<()> {
  let mut retired_name = paths.staging_dir.file_name().unwrap_or_default().to_os_string();
  retired_name.push(".old");
  let retired = paths.staging_dir.with_file_name(retired_name);

  discard(&retired);
  let had_assets = paths.assets_dir.exists();
  if had_assets {
    fs::rename(&paths.assets_dir, &retired).at_path(&paths.assets_dir)?;
  }

  if let Err(err) = fs::rename(&paths.staging_dir, &paths.assets_dir) {
    if had_assets && let Err(restore) = fs::rename(&retired, &paths.assets_dir) {
      log::warn!("failed to restore {}: {}", paths.assets_dir.display(), restore);
    }
    return Err(JournalError::io(&paths.staging_dir, err));
  }

  discard(&retired);
  log::info!("swapped staged assets into {}", paths.assets_dir.display());
  Ok(())
}
