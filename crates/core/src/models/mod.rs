//! Shared domain models handed to the front-end.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Human-facing game page on TheGamesDB.
pub const GAME_PAGE_URL: &str = "https://thegamesdb.net/game.php";

/// A console platform from the upstream catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Upstream-assigned identifier.
    pub id: i64,
    /// Display name (e.g. `Sony Playstation 2`).
    pub name: String,
    /// Slug used for local icon lookup.
    #[serde(default)]
    pub alias: Option<String>,
    /// Remote icon reference, when the upstream provides one.
    #[serde(default)]
    pub icon: Option<String>,
}

/// A game as returned by a name search, with cross-references resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Upstream game identifier.
    pub id: i64,
    /// Title (`game_title` upstream).
    pub name: Option<String>,
    /// Absolute cover image URL.
    pub cover: Option<String>,
    /// Release date as reported, usually `YYYY-MM-DD`.
    pub release_date: Option<String>,
    /// Resolved platform name; empty when unknown.
    pub platform: String,
    /// Region code, see [`Region`].
    pub region_id: Option<i64>,
    /// Player count as reported.
    pub players: Option<String>,
    /// Co-op flag as reported (`co_op` upstream).
    pub coop: Option<String>,
    /// Comma-joined developer names; empty when none resolve.
    pub developer: String,
    /// Comma-joined genre names; empty when none resolve.
    pub genres: String,
    /// Free-text synopsis.
    pub overview: Option<String>,
}

impl GameSummary {
    /// Title, or a neutral label when the upstream omitted it.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(untitled)")
    }

    /// Year component of the release date, when it parses.
    pub fn release_year(&self) -> Option<i32> {
        let raw = self.release_date.as_deref()?.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|date| date.year())
            .ok()
            .or_else(|| raw.get(..4)?.parse().ok())
    }

    /// Display name for `region_id`.
    pub fn region_label(&self) -> Option<String> {
        self.region_id.map(region_label)
    }

    /// True when nothing beyond the identity fields is known.
    pub fn has_no_details(&self) -> bool {
        self.platform.is_empty()
            && self.region_id.is_none()
            && self.release_date.is_none()
            && self.players.is_none()
            && self.coop.is_none()
            && self.developer.is_empty()
            && self.genres.is_empty()
            && self.overview.is_none()
    }
}

/// A single game lookup: the summary plus a permalink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDetail {
    /// Every summary field.
    #[serde(flatten)]
    pub summary: GameSummary,
    /// Link to the game's page on TheGamesDB.
    pub thegamesdb_url: String,
}

impl GameDetail {
    /// Promote an already-known summary, used when a detail lookup fails.
    pub fn from_summary(summary: GameSummary) -> Self {
        let thegamesdb_url = game_page_url(summary.id);
        Self {
            summary,
            thegamesdb_url,
        }
    }

    /// Labelled lines describing the game, skipping unknown fields.
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        let game = &self.summary;
        let mut lines = vec![("Title", game.display_name().to_string())];
        let mut push = |label: &'static str, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                lines.push((label, value));
            }
        };
        push("Platform", Some(game.platform.clone()));
        push("Region", game.region_label());
        push("Release Date", game.release_date.clone());
        push("Players", game.players.clone());
        push("Co-op", game.coop.clone());
        push("Developer", Some(game.developer.clone()));
        push("Genres", Some(game.genres.clone()));
        push("Cover", game.cover.clone());
        push("Page", Some(self.thegamesdb_url.clone()));
        lines
    }
}

/// Permalink for a game identifier.
pub fn game_page_url(game_id: i64) -> String {
    format!("{GAME_PAGE_URL}?id={game_id}")
}

/// Release regions known to the upstream.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    NorthAmerica,
    Europe,
    Australia,
    Japan,
    China,
    Asia,
    Worldwide,
    Brazil,
    Korea,
}

impl Region {
    /// Map an upstream region code; unknown codes yield `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        let region = match code {
            1 => Region::NorthAmerica,
            2 => Region::Europe,
            3 => Region::Australia,
            4 => Region::Japan,
            5 => Region::China,
            6 => Region::Asia,
            7 => Region::Worldwide,
            8 => Region::Brazil,
            9 => Region::Korea,
            _ => return None,
        };
        Some(region)
    }

    /// English display name.
    pub fn name(self) -> &'static str {
        match self {
            Region::NorthAmerica => "North America",
            Region::Europe => "Europe",
            Region::Australia => "Australia",
            Region::Japan => "Japan",
            Region::China => "China",
            Region::Asia => "Asia",
            Region::Worldwide => "Worldwide",
            Region::Brazil => "Brazil",
            Region::Korea => "Korea",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Region display name, passing unknown codes through as their number.
pub fn region_label(code: i64) -> String {
    match Region::from_code(code) {
        Some(region) => region.to_string(),
        None => code.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_codes_map_to_names() {
        assert_eq!(region_label(1), "North America");
        assert_eq!(region_label(4), "Japan");
        assert_eq!(region_label(9), "Korea");
        assert_eq!(region_label(0), "0");
        assert_eq!(region_label(42), "42");
    }

    #[test]
    fn release_year_handles_partial_dates() {
        let mut game = GameSummary {
            release_date: Some("2001-10-23".to_string()),
            ..GameSummary::default()
        };
        assert_eq!(game.release_year(), Some(2001));
        game.release_date = Some("1998".to_string());
        assert_eq!(game.release_year(), Some(1998));
        game.release_date = Some("soon".to_string());
        assert_eq!(game.release_year(), None);
        game.release_date = None;
        assert_eq!(game.release_year(), None);
    }

    #[test]
    fn detail_from_summary_keeps_fields_and_adds_permalink() {
        let summary = GameSummary {
            id: 5,
            name: Some("Foo".to_string()),
            developer: "Dev1".to_string(),
            ..GameSummary::default()
        };
        let detail = GameDetail::from_summary(summary.clone());
        assert_eq!(detail.summary, summary);
        assert_eq!(detail.thegamesdb_url, "https://thegamesdb.net/game.php?id=5");
    }

    #[test]
    fn describe_skips_unknown_fields() {
        let detail = GameDetail::from_summary(GameSummary {
            id: 7,
            name: Some("Bar".to_string()),
            region_id: Some(2),
            genres: "Action, Puzzle".to_string(),
            ..GameSummary::default()
        });
        let labels: Vec<_> = detail.describe().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Title", "Region", "Genres", "Page"]);
        assert!(!detail.summary.has_no_details());
        assert!(GameSummary::default().has_no_details());
    }

    #[test]
    fn detail_serializes_flat() -> serde_json::Result<()> {
        let detail = GameDetail::from_summary(GameSummary {
            id: 3,
            ..GameSummary::default()
        });
        let value = serde_json::to_value(&detail)?;
        assert_eq!(value["id"], 3);
        assert_eq!(value["thegamesdb_url"], "https://thegamesdb.net/game.php?id=3");
        Ok(())
    }
}
