use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::asset_paths::{bare_file_name, served_file_name};
use crate::models::ImageMap;

/// Allocates collision-free file names inside an entry's assets folder.
///
/// Names recorded by a previous build are reserved up front for the references that still
/// appear, so rebuilding an entry keeps every asset under the name it was first given and a
/// newly referenced file can never grab one of them.
#[derive(Debug, Default)]
pub struct DestinationNames {
    reserved: BTreeMap<String, String>,
    reserved_names: BTreeSet<String>,
    used: BTreeSet<String>,
}

impl DestinationNames {
    /// Reserve the names `existing` recorded for any of `references`.
    ///
    /// A recorded name goes to one reference only. When a bare file name shares it with a
    /// path reference, the bare name was an alias and the path reference keeps the name.
    pub fn new<'r>(
        existing: &ImageMap,
        references: impl IntoIterator<Item = &'r str>,
        assets_dir: &str,
    ) -> Self {
        let mut owners: BTreeMap<String, &'r str> = BTreeMap::new();
        for reference in references {
            let Some(name) = existing
                .get(reference)
                .and_then(|served| served_file_name(served, assets_dir))
            else {
                continue;
            };
            let claim = match owners.get(name) {
                Some(owner) => is_bare(owner) && !is_bare(reference),
                None => true,
            };
            if claim {
                owners.insert(name.to_string(), reference);
            }
        }

        let reserved: BTreeMap<String, String> = owners
            .iter()
            .map(|(name, reference)| (reference.to_string(), name.clone()))
            .collect();
        let reserved_names = owners.into_keys().collect();

        Self {
            reserved,
            reserved_names,
            used: BTreeSet::new(),
        }
    }

    /// Destination name for `reference`, whose source file is called `suggested`.
    pub fn assign(&mut self, reference: &str, suggested: &str) -> String {
        if let Some(name) = self.reserved.get(reference) {
            self.used.insert(name.clone());
            return name.clone();
        }

        let candidate = if suggested.is_empty() {
            bare_file_name(reference)
        } else {
            suggested
        };
        let candidate = if candidate.is_empty() { "asset" } else { candidate };

        let path = Path::new(candidate);
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "asset".to_string());
        let suffix = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut name = candidate.to_string();
        let mut counter = 1;
        while self.is_taken(&name) {
            name = format!("{stem}_{counter}{suffix}");
            counter += 1;
        }

        self.used.insert(name.clone());
        name
    }

    fn is_taken(&self, name: &str) -> bool {
        self.used.contains(name) || self.reserved_names.contains(name)
    }
}

fn is_bare(reference: &str) -> bool {
    bare_file_name(reference) == reference
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_counter_before_extension() {
        let mut names = DestinationNames::default();
        assert_eq!(names.assign("a/photo.jpg", "photo.jpg"), "photo.jpg");
        assert_eq!(names.assign("b/photo.jpg", "photo.jpg"), "photo_1.jpg");
        assert_eq!(names.assign("c/photo.jpg", "photo.jpg"), "photo_2.jpg");
    }

    #[test]
    fn handles_names_without_extension() {
        let mut names = DestinationNames::default();
        assert_eq!(names.assign("x/scan", "scan"), "scan");
        assert_eq!(names.assign("y/scan", "scan"), "scan_1");
        assert_eq!(names.assign("z", ""), "z");
    }

    #[test]
    fn reuses_recorded_names_and_protects_them() {
        let mut existing = ImageMap::new();
        existing.insert("b/photo.jpg", "./assets/photo.jpg");
        existing.insert("https://x.test/photo.jpg", "https://x.test/photo.jpg");

        let mut names =
            DestinationNames::new(&existing, ["a/photo.jpg", "b/photo.jpg"], "assets");

        // A new reference processed first must not take the reserved name.
        assert_eq!(names.assign("a/photo.jpg", "photo.jpg"), "photo_1.jpg");
        assert_eq!(names.assign("b/photo.jpg", "photo.jpg"), "photo.jpg");
    }

    #[test]
    fn alias_on_record_yields_to_path_reference() {
        let mut existing = ImageMap::new();
        existing.insert("pics/cat.png", "./assets/cat.png");
        existing.insert("cat.png", "./assets/cat.png");

        let mut names = DestinationNames::new(&existing, ["cat.png", "pics/cat.png"], "assets");

        assert_eq!(names.assign("cat.png", "cat.png"), "cat_1.png");
        assert_eq!(names.assign("pics/cat.png", "cat.png"), "cat.png");
    }

    #[test]
    fn ignores_remote_values_on_record() {
        let mut existing = ImageMap::new();
        existing.insert("pic.png", "https://cdn.test/pic.png");
        let mut names = DestinationNames::new(&existing, ["pic.png"], "assets");
        assert_eq!(names.assign("pic.png", "pic.png"), "pic.png");
    }
}
