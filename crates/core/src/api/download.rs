//! Saving cover images to disk.

use std::path::{Path, PathBuf};

use crate::{error::ApiError, models::GameSummary};

const DEFAULT_EXTENSION: &str = "jpg";

/// File name for a game's cover: slugged title, game ID and the URL's
/// image extension, e.g. `gran-turismo-4-123.jpg`.
pub fn cover_file_name(game: &GameSummary, url: &str) -> String {
    let mut slug = String::new();
    for ch in game.name.as_deref().unwrap_or_default().chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');

    let stem = if slug.is_empty() {
        format!("game-{}", game.id)
    } else {
        format!("{slug}-{}", game.id)
    };
    format!("{stem}.{}", url_extension(url).unwrap_or(DEFAULT_EXTENSION))
}

fn url_extension(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next()?;
    let (_, ext) = file.rsplit_once('.')?;
    let valid = !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(ext)
}

/// Write `bytes` to `dir/file_name`, creating `dir` when needed.
pub async fn save_cover(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ApiError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn game(id: i64, name: Option<&str>) -> GameSummary {
        GameSummary {
            id,
            name: name.map(str::to_string),
            ..GameSummary::default()
        }
    }

    #[test]
    fn file_names_use_title_id_and_extension() {
        let url = "https://cdn.thegamesdb.net/images/original/boxart/front/123-1.png";
        assert_eq!(
            cover_file_name(&game(123, Some("Gran Turismo 4: The Real Driving Simulator")), url),
            "gran-turismo-4-the-real-driving-simulator-123.png"
        );
        assert_eq!(
            cover_file_name(&game(7, None), "https://cdn.example.com/covers/7?size=big"),
            "game-7.jpg"
        );
        assert_eq!(
            cover_file_name(&game(8, Some("Ōkami")), "https://cdn.example.com/a.JPG#x"),
            "ōkami-8.JPG"
        );
    }

    #[tokio::test]
    async fn save_creates_missing_directories() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let dir = temp.path().join("covers/ps2");
        let path = save_cover(&dir, "foo-5.png", b"png").await?;
        assert_eq!(path, dir.join("foo-5.png"));
        assert_eq!(std::fs::read(&path)?, b"png");
        Ok(())
    }
}
