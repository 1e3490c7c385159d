//! Copies referenced images into an entry's staging folder under stable, unique names.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use same_file::is_same_file;

use crate::asset_paths::{
  DestinationNames, FallbackIndex, bare_file_name, is_remote_reference, resolve_reference,
  served_asset_path,
};
use crate::models::ImageMap;

/// Where a reference came from, used to word warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
  /// Image embedded in the Markdown body.
  Inline,
  /// Hero image named by the `banner::` directive.
  Banner,
}

/// Inputs describing where assets come from and where they go.
#[derive(Debug)]
pub struct StagingPlan<'a> {
  /// Directory relative references are resolved against.
  pub source_dir: &'a Path,
  /// Fresh folder receiving copies.
  pub staging_dir: &'a Path,
  /// The entry's current assets folder, searched when a source is gone.
  pub fallback_dir: Option<&'a Path>,
  /// Image map persisted by the previous build.
  pub existing: &'a ImageMap,
  /// Assets folder name used in served paths.
  pub assets_dir: &'a str,
}

/// Stateful pass over an entry's image references.
///
/// The first occurrence of a reference decides its mapping; later occurrences reuse it.
#[derive(Debug)]
pub struct AssetStager<'a> {
  plan: StagingPlan<'a>,
  fallback: FallbackIndex,
  names: DestinationNames,
  image_map: ImageMap,
  staged: BTreeSet<String>,
  unresolved: BTreeSet<String>,
  warnings: Vec<String>,
}

impl<'a> AssetStager<'a> {
  /// Prepare a pass that will see `references` (already cleaned).
  pub fn new<'r>(plan: StagingPlan<'a>, references: impl IntoIterator<Item = &'r str>) -> Self {
    let fallback = FallbackIndex::build(plan.fallback_dir, plan.assets_dir);
    let names = DestinationNames::new(plan.existing, references, plan.assets_dir);
    Self {
      plan,
      fallback,
      names,
      image_map: ImageMap::new(),
      staged: BTreeSet::new(),
      unresolved: BTreeSet::new(),
      warnings: Vec::new(),
    }
  }

  /// Map `reference` to the path the entry page serves it from, copying it when local.
  ///
  /// Returns `None` and records a warning when the file cannot be found or copied. A bare file
  /// name only aliased so far is staged on its own and takes the alias over.
  pub fn stage(&mut self, reference: &str, kind: ReferenceKind) -> Option<String> {
    if reference.is_empty() || self.unresolved.contains(reference) {
      return None;
    }
    if self.staged.contains(reference) {
      return self.image_map.get(reference).map(str::to_string);
    }

    if is_remote_reference(reference) {
      self.staged.insert(reference.to_string());
      self.image_map.insert(reference, reference);
      self.image_map.alias(bare_file_name(reference), reference);
      return Some(reference.to_string());
    }

    let Some(source) = self.locate(reference) else {
      self.warn(reference, kind, "not found");
      return None;
    };

    let file_name = source
      .file_name()
      .map(|name| name.to_string_lossy().to_string())
      .unwrap_or_default();
    let destination_name = self.names.assign(reference, &file_name);
    let destination = self.plan.staging_dir.join(&destination_name);

    if let Err(err) = install_asset(&source, &destination) {
      self.warn(reference, kind, &format!("could not be copied ({err})"));
      return None;
    }

    let served = served_asset_path(self.plan.assets_dir, &destination_name);
    log::debug!("staged {} as {}", source.display(), served);
    self.staged.insert(reference.to_string());
    self.image_map.insert(reference, served.as_str());
    self.image_map.alias(&file_name, &served);
    Some(served)
  }

  /// The image map built so far.
  pub fn image_map(&self) -> &ImageMap {
    &self.image_map
  }

  /// Finish the pass, handing back the image map and collected warnings.
  pub fn finish(self) -> (ImageMap, Vec<String>) {
    (self.image_map, self.warnings)
  }

  fn locate(&self, reference: &str) -> Option<PathBuf> {
    let resolved = resolve_reference(reference, self.plan.source_dir);
    if resolved.is_file() {
      return Some(resolved);
    }
    self.fallback.lookup(reference, self.plan.existing)
  }

  fn warn(&mut self, reference: &str, kind: ReferenceKind, problem: &str) {
    let message = match kind {
      ReferenceKind::Inline => format!("image {problem}: {reference}"),
      ReferenceKind::Banner => format!("banner image {problem}: {reference}"),
    };
    log::warn!("{message}");
    self.unresolved.insert(reference.to_string());
    self.warnings.push(message);
  }
}

/// Copy `source` to `destination` unless both already name the same file.
pub fn install_asset(source: &Path, destination: &Path) -> std::io::Result<()> {
  if destination.exists() {
    if is_same_file(source, destination)? {
      return Ok(());
    }
    fs::remove_file(destination)?;
  }

  fs::copy(source, destination).map(|_| ())
}
