//! Platform selection: keyword resolution, the curated retro catalog and
//! local icon lookup.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;

use crate::models::Platform;

/// Platform used when a query names no known console (Sony Playstation 2).
pub const DEFAULT_PLATFORM_ID: i64 = 11;

/// Keyword table checked in order; the first contained keyword wins.
///
/// Longer keywords are listed before any keyword they contain, so
/// `"playstation 3"` is tested before `"playstation"`.
pub const PLATFORM_KEYWORDS: &[(&str, i64)] = &[
    ("playstation 2", 11),
    ("playstation 3", 12),
    ("playstation", 10),
    ("ps2", 11),
    ("ps1", 10),
    ("ps3", 12),
    ("xbox 360", 15),
    ("xbox", 14),
    ("gamecube", 23),
    ("wii", 25),
];

/// Platforms offered in the picker.
pub const RETRO_PLATFORM_IDS: &[i64] = &[
    7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 18, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 32, 33, 34,
    35, 36, 37, 38, 39, 40, 41, 49, 50, 58, 59, 60, 61, 62,
];

/// Placeholder shown when no icon can be found.
pub const PLACEHOLDER_ICON: &str = "no-cover.png";

static CUSTOM_ICONS: Lazy<HashMap<i64, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (10, "platforms/ps1.png"),
        (11, "platforms/ps2.png"),
        (14, "platforms/xbox.png"),
        (15, "platforms/xbox360.png"),
        (23, "platforms/gamecube.png"),
        (24, "platforms/dreamcast.png"),
        (25, "platforms/wii.png"),
        (26, "platforms/nes.png"),
        (27, "platforms/snes.png"),
        (28, "platforms/n64.png"),
        (32, "platforms/megadrive.png"),
        (33, "platforms/genesis.png"),
        (34, "platforms/mastersystem.png"),
        (35, "platforms/gameboy.png"),
        (36, "platforms/gameboycolor.png"),
        (37, "platforms/gameboyadvance.png"),
        (38, "platforms/gbmicro.png"),
        (39, "platforms/virtualboy.png"),
        (40, "platforms/gamegear.png"),
        (41, "platforms/lynx.png"),
    ])
});

/// Map free text to a platform ID, falling back to [`DEFAULT_PLATFORM_ID`].
pub fn resolve_platform_id(query: &str) -> i64 {
    let lower = query.to_lowercase();
    PLATFORM_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, id)| *id)
        .unwrap_or(DEFAULT_PLATFORM_ID)
}

/// Keep only allow-listed platforms, sorted by name.
pub fn retro_platforms(all: impl IntoIterator<Item = Platform>) -> Vec<Platform> {
    let mut platforms: Vec<Platform> = all
        .into_iter()
        .filter(|platform| RETRO_PLATFORM_IDS.contains(&platform.id))
        .collect();
    platforms.sort_by_cached_key(|platform| platform.name.to_lowercase());
    platforms
}

/// Icon references for a platform, most preferred first.
///
/// Relative entries are paths under the assets root; the upstream `icon`
/// may be a bare file name or a URL.
pub fn icon_candidates(platform: &Platform) -> Vec<String> {
    let mut candidates = Vec::new();
    if let Some(custom) = CUSTOM_ICONS.get(&platform.id) {
        candidates.push((*custom).to_string());
    }
    if let Some(icon) = platform.icon.as_deref().filter(|icon| !icon.is_empty()) {
        candidates.push(icon.to_string());
    }
    if let Some(alias) = platform.alias.as_deref().filter(|alias| !alias.is_empty()) {
        candidates.push(format!("platforms/{alias}.png"));
    }
    candidates
}

/// First icon under `assets_root` that exists on disk.
///
/// Each local candidate is tried as given and then once with the alternate
/// image extension; if nothing matches the placeholder path is returned.
pub fn resolve_icon(assets_root: &Path, platform: &Platform) -> PathBuf {
    icon_candidates(platform)
        .iter()
        .filter(|candidate| !candidate.starts_with("http"))
        .flat_map(|candidate| {
            let primary = assets_root.join(candidate);
            let alternate = alternate_extension(&primary);
            std::iter::once(primary).chain(alternate)
        })
        .find(|path| path.is_file())
        .unwrap_or_else(|| assets_root.join(PLACEHOLDER_ICON))
}

fn alternate_extension(path: &Path) -> Option<PathBuf> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let swapped = match ext.as_str() {
        "png" => "jpg",
        "jpg" | "jpeg" => "png",
        _ => return None,
    };
    Some(path.with_extension(swapped))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use tempfile::tempdir;

    fn platform(id: i64, name: &str, alias: Option<&str>) -> Platform {
        Platform {
            id,
            name: name.to_string(),
            alias: alias.map(str::to_string),
            icon: None,
        }
    }

    #[test]
    fn keywords_resolve_case_insensitively() {
        assert_eq!(resolve_platform_id("My PS2 game"), 11);
        assert_eq!(resolve_platform_id("Gran Turismo PlayStation 3"), 12);
        assert_eq!(resolve_platform_id("crash playstation"), 10);
        assert_eq!(resolve_platform_id("halo XBOX 360"), 15);
        assert_eq!(resolve_platform_id("halo xbox"), 14);
        assert_eq!(resolve_platform_id("zelda wii"), 25);
        assert_eq!(resolve_platform_id("melee gamecube"), 23);
    }

    #[test]
    fn unmatched_queries_use_default() {
        assert_eq!(resolve_platform_id("random text"), DEFAULT_PLATFORM_ID);
        assert_eq!(resolve_platform_id(""), DEFAULT_PLATFORM_ID);
    }

    #[test]
    fn no_keyword_is_shadowed_by_an_earlier_one() {
        for (idx, (keyword, _)) in PLATFORM_KEYWORDS.iter().enumerate() {
            for (earlier, _) in &PLATFORM_KEYWORDS[..idx] {
                assert!(
                    !keyword.contains(earlier),
                    "{keyword:?} can never match because {earlier:?} precedes it"
                );
            }
        }
    }

    #[test]
    fn retro_catalog_is_filtered_and_sorted() {
        let all = vec![
            platform(4919, "Sony Playstation 5", None),
            platform(11, "Sony Playstation 2", None),
            platform(7, "NES", None),
            platform(25, "Nintendo Wii", None),
        ];
        let names: Vec<_> = retro_platforms(all).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["NES", "Nintendo Wii", "Sony Playstation 2"]);
    }

    #[test]
    fn icon_candidates_prefer_custom_then_upstream_then_alias() {
        let mut ps2 = platform(11, "Sony Playstation 2", Some("sony-playstation-2"));
        ps2.icon = Some("ps2-1336524620.png".to_string());
        assert_eq!(
            icon_candidates(&ps2),
            vec![
                "platforms/ps2.png",
                "ps2-1336524620.png",
                "platforms/sony-playstation-2.png",
            ]
        );
        assert!(icon_candidates(&platform(99, "Unknown", None)).is_empty());
    }

    #[test]
    fn resolve_icon_tries_alternate_extension_then_placeholder() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("platforms"))?;
        fs::write(root.join("platforms/3do.jpg"), b"jpg")?;

        let three_do = platform(25000, "3DO", Some("3do"));
        assert_eq!(resolve_icon(root, &three_do), root.join("platforms/3do.jpg"));

        let missing = platform(25001, "Missing", Some("missing"));
        assert_eq!(resolve_icon(root, &missing), root.join(PLACEHOLDER_ICON));
        Ok(())
    }

    #[test]
    fn resolve_icon_prefers_custom_override() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("platforms"))?;
        fs::write(root.join("platforms/ps2.png"), b"png")?;
        fs::write(root.join("platforms/sony-playstation-2.png"), b"png")?;

        let ps2 = platform(11, "Sony Playstation 2", Some("sony-playstation-2"));
        assert_eq!(resolve_icon(root, &ps2), root.join("platforms/ps2.png"));
        Ok(())
    }
}
