use crate::models::HeroSources;
use crate::project::JournalLayout;

/// Path an entry page serves a copied asset from.
pub fn served_asset_path(assets_dir: &str, file_name: &str) -> String {
    format!("./{assets_dir}/{file_name}")
}

/// File name of a served asset path, if it points into the entry's assets folder.
pub fn served_file_name<'a>(served: &'a str, assets_dir: &str) -> Option<&'a str> {
    served
        .strip_prefix("./")
        .and_then(|rest| rest.strip_prefix(assets_dir))
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|name| !name.is_empty() && !name.contains('/'))
}

/// Hero paths for the entry page and for the listing pages.
///
/// Local assets are made reachable from the listing pages through the journals prefix; remote
/// heroes are used verbatim and a missing hero falls back to the shared default image.
pub fn compute_hero_sources(
    layout: &JournalLayout,
    entry_name: &str,
    candidate: Option<&str>,
) -> HeroSources {
    let Some(candidate) = candidate.filter(|value| !value.is_empty()) else {
        return HeroSources {
            entry: format!("../{}", layout.default_hero),
            homepage: format!("{}/{}", layout.journals_url_prefix, layout.default_hero),
        };
    };

    match served_file_name(candidate, &layout.assets_dir) {
        Some(name) => HeroSources {
            entry: candidate.to_string(),
            homepage: format!(
                "{}/{}/{}/{}",
                layout.journals_url_prefix, entry_name, layout.assets_dir, name
            ),
        },
        None => HeroSources {
            entry: candidate.to_string(),
            homepage: candidate.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::test_layout;
    use std::path::Path;

    #[test]
    fn builds_served_path() {
        assert_eq!(served_asset_path("assets", "a.png"), "./assets/a.png");
    }

    #[test]
    fn extracts_served_file_name() {
        assert_eq!(served_file_name("./assets/a.png", "assets"), Some("a.png"));
        assert_eq!(served_file_name("./assetsx/a.png", "assets"), None);
        assert_eq!(served_file_name("https://x.test/a.png", "assets"), None);
        assert_eq!(served_file_name("./assets/", "assets"), None);
    }

    #[test]
    fn default_hero_when_no_candidate() {
        let layout = test_layout(Path::new("/site"));
        let hero = compute_hero_sources(&layout, "foo", None);
        assert_eq!(hero.entry, "../default.jpeg");
        assert_eq!(hero.homepage, "../journals/default.jpeg");
    }

    #[test]
    fn local_hero_is_prefixed_for_listings() {
        let layout = test_layout(Path::new("/site"));
        let hero = compute_hero_sources(&layout, "foo", Some("./assets/cover.jpg"));
        assert_eq!(hero.entry, "./assets/cover.jpg");
        assert_eq!(hero.homepage, "../journals/foo/assets/cover.jpg");
    }

    #[test]
    fn remote_hero_is_shared() {
        let layout = test_layout(Path::new("/site"));
        let hero = compute_hero_sources(&layout, "foo", Some("https://x.test/c.jpg"));
        assert_eq!(hero.entry, hero.homepage);
    }
}
