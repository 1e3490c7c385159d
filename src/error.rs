//! Error taxonomy shared by the journal builder and the listing patcher.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used throughout the library.
pub type JournalResult<T> = Result<T, JournalError>;

/// Failures that abort an entry build or a listing update.
///
/// Unresolvable image references are not errors; they are collected as warnings on the
/// [`crate::models::EntryBuild`] instead.
#[derive(Debug, Error)]
pub enum JournalError {
  /// No path was supplied at the prompt.
  #[error("no path received, drag the Markdown file into the terminal again")]
  EmptyInput,
  /// The supplied input path does not exist.
  #[error("file not found: {}", .0.display())]
  InputNotFound(PathBuf),
  /// A create was requested for an entry that already exists.
  #[error("journal entry \"{0}\" already exists, run `journal update` to rebuild it")]
  EntryExists(String),
  /// An update was requested for an entry that has never been created.
  #[error("journal entry \"{0}\" not found, run `journal new` first")]
  EntryMissing(String),
  /// An entry folder was given but it holds no Markdown file.
  #[error("no Markdown file found in {}", .0.display())]
  NoMarkdownInFolder(PathBuf),
  /// A listing page to patch does not exist.
  #[error("listing page not found: {}", .0.display())]
  ListingNotFound(PathBuf),
  /// An expected HTML marker is absent from a listing page.
  #[error("{page} is missing {marker}")]
  MarkerNotFound {
    /// Listing page (or description of it) that was searched.
    page: String,
    /// Marker that could not be found.
    marker: String,
  },
  /// Filesystem failure.
  #[error("failed to access {}: {source}", path.display())]
  Io {
    /// Path involved in the failing operation.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// Failed to serialise the entry metadata file.
  #[error("failed to encode {}: {source}", path.display())]
  Json {
    /// Path of the metadata file.
    path: PathBuf,
    /// Source serialisation error.
    source: serde_json::Error,
  },
}

impl JournalError {
  /// Wrap an I/O error with the path it concerns.
  pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.as_ref().to_path_buf(),
      source,
    }
  }
}

/// Attach a path to `std::io::Result` values.
pub(crate) trait IoResultExt<T> {
  fn at_path(self, path: impl AsRef<Path>) -> JournalResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
  fn at_path(self, path: impl AsRef<Path>) -> JournalResult<T> {
    self.map_err(|source| JournalError::io(path, source))
  }
}
