use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

use crate::asset_paths::served_file_name;
use crate::models::ImageMap;

/// Normalise a raw image reference as written in Markdown.
///
/// Surrounding whitespace and quotes are dropped and Windows separators become `/`, so the
/// same picture referenced from different machines maps to the same key.
pub fn clean_image_reference(reference: &str) -> String {
    reference
        .trim()
        .trim_matches('\'')
        .trim_matches('"')
        .replace('\\', "/")
}

/// Last path segment of a cleaned reference.
pub fn bare_file_name(reference: &str) -> &str {
    reference.rsplit(['/', '\\']).next().unwrap_or_default()
}

/// Turn a cleaned local reference into a filesystem path.
///
/// `file://` URLs are decoded, absolute paths are kept and anything else is taken relative to
/// the directory of the Markdown file.
pub fn resolve_reference(reference: &str, base_dir: &Path) -> PathBuf {
    if let Some(stripped) = reference.strip_prefix("file://") {
        return Url::parse(reference)
            .ok()
            .and_then(|url| url.to_file_path().ok())
            .unwrap_or_else(|| PathBuf::from(stripped));
    }

    let path = Path::new(reference);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Files of an entry's previous assets folder, used when a reference no longer resolves
/// against the Markdown's directory (typically when rebuilding from the entry's own copy).
#[derive(Debug, Default)]
pub struct FallbackIndex {
    dir: Option<PathBuf>,
    assets_dir: String,
    files: BTreeMap<String, PathBuf>,
}

impl FallbackIndex {
    /// Index the regular files directly inside `dir`, if it exists.
    pub fn build(dir: Option<&Path>, assets_dir: &str) -> Self {
        let Some(dir) = dir.filter(|dir| dir.is_dir()) else {
            return Self::default();
        };

        let mut files = BTreeMap::new();
        if let Ok(entries) = fs::read_dir(dir) {
            for entry in entries.flatten() {
                if !entry.file_type().is_ok_and(|ft| ft.is_file()) {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().to_string();
                files.insert(name, entry.path());
            }
        }

        Self {
            dir: Some(dir.to_path_buf()),
            assets_dir: assets_dir.to_string(),
            files,
        }
    }

    /// Find a previously copied file for `reference`.
    ///
    /// The destination recorded for this exact reference wins over a bare file name match.
    pub fn lookup(&self, reference: &str, existing: &ImageMap) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;

        if let Some(name) = existing
            .get(reference)
            .and_then(|served| served_file_name(served, &self.assets_dir))
        {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        let base = bare_file_name(reference);
        if base.is_empty() {
            return None;
        }
        self.files.get(base).cloned()
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no fallback files are available.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn cleans_quotes_and_separators() {
        assert_eq!(clean_image_reference("  'img\\a b.png' "), "img/a b.png");
        assert_eq!(clean_image_reference("\"photo.jpg\""), "photo.jpg");
    }

    #[test]
    fn extracts_bare_file_name() {
        assert_eq!(bare_file_name("a/b/c.png"), "c.png");
        assert_eq!(bare_file_name("c.png"), "c.png");
        assert_eq!(bare_file_name("dir/"), "");
    }

    #[test]
    fn resolves_relative_absolute_and_file_urls() {
        let base = Path::new("/notes");
        assert_eq!(
            resolve_reference("img/a.png", base),
            PathBuf::from("/notes/img/a.png")
        );
        assert_eq!(
            resolve_reference("/pics/a.png", base),
            PathBuf::from("/pics/a.png")
        );
        #[cfg(unix)]
        assert_eq!(
            resolve_reference("file:///pics/my%20photo.png", base),
            PathBuf::from("/pics/my photo.png")
        );
    }

    #[test]
    fn fallback_prefers_recorded_destination() {
        let dir = tempdir().unwrap();
        let assets = dir.path().join("assets");
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join("photo.jpg"), "first").unwrap();
        fs::write(assets.join("photo_1.jpg"), "second").unwrap();

        let mut existing = ImageMap::new();
        existing.insert("b/photo.jpg", "./assets/photo_1.jpg");

        let index = FallbackIndex::build(Some(&assets), "assets");
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.lookup("b/photo.jpg", &existing),
            Some(assets.join("photo_1.jpg"))
        );
        assert_eq!(
            index.lookup("elsewhere/photo.jpg", &existing),
            Some(assets.join("photo.jpg"))
        );
        assert_eq!(index.lookup("missing.jpg", &existing), None);
    }

    #[test]
    fn missing_fallback_dir_finds_nothing() {
        let index = FallbackIndex::build(None, "assets");
        assert!(index.is_empty());
        assert_eq!(index.lookup("a.png", &ImageMap::new()), None);
    }
}
