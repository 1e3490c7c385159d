//! Loading and persisting the per-entry metadata file.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{IoResultExt, JournalError, JournalResult};
use crate::models::JournalMeta;

/// Load the metadata left by the previous build.
///
/// A missing file is a first build; an unreadable or malformed one is ignored so the entry can
/// still be rebuilt, at the cost of asset names possibly changing.
pub fn load_meta(path: &Path) -> JournalMeta {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(err) if err.kind() == ErrorKind::NotFound => return JournalMeta::default(),
    Err(err) => {
      log::warn!("ignoring unreadable {}: {}", path.display(), err);
      return JournalMeta::default();
    }
  };

  match serde_json::from_str(&content) {
    Ok(meta) => meta,
    Err(err) => {
      log::warn!("ignoring malformed {}: {}", path.display(), err);
      JournalMeta::default()
    }
  }
}

/// Write `meta` as pretty-printed JSON.
pub fn write_meta(path: &Path, meta: &JournalMeta) -> JournalResult<()> {
  let json = serde_json::to_string_pretty(meta).map_err(|source| JournalError::Json {
    path: path.to_path_buf(),
    source,
  })?;
  fs::write(path, json).at_path(path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ImageMap;
  use tempfile::tempdir;

  #[test]
  fn missing_meta_is_empty() {
    let dir = tempdir().unwrap();
    let meta = load_meta(&dir.path().join("journal_meta.json"));
    assert!(meta.image_map.is_empty());
  }

  #[test]
  fn malformed_meta_is_ignored() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("journal_meta.json");
    fs::write(&path, "{\"image_map\": [1, 2]}").unwrap();
    assert!(load_meta(&path).image_map.is_empty());
  }

  #[test]
  fn written_meta_loads_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("journal_meta.json");
    let mut image_map = ImageMap::new();
    image_map.insert("pics/a.png", "./assets/a.png");
    let meta = JournalMeta {
      image_map: image_map.clone(),
      updated_at: "2024-01-02 03:04:05".into(),
    };

    write_meta(&path, &meta).unwrap();
    let loaded = load_meta(&path);
    assert_eq!(loaded.image_map, image_map);
    assert_eq!(loaded.updated_at, "2024-01-02 03:04:05");
  }
}
