//! Flatten raw games and their side-tables into [`GameSummary`] records.
//!
//! Normalization is total: dangling references and missing fields become
//! empty strings or `None`, never errors.

use std::collections::HashMap;

use super::wire::{BoxArt, RawGame, SideTables};
use crate::models::GameSummary;

/// CDN prefix used when the response carries no usable image base URL.
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://cdn.thegamesdb.net/images/original/";

/// Resolve every cross-reference of `raw` against `tables`.
pub fn normalize(raw: &RawGame, tables: &SideTables) -> GameSummary {
    GameSummary {
        id: raw.id,
        name: raw.game_title.clone(),
        cover: cover_for(raw.id, tables),
        release_date: raw.release_date.clone(),
        platform: raw
            .platform
            .and_then(|id| tables.platforms.get(&id))
            .cloned()
            .unwrap_or_default(),
        region_id: raw.region_id,
        players: raw.players.clone(),
        coop: raw.co_op.clone(),
        developer: join_names(&raw.developers, &tables.developers),
        genres: join_names(&raw.genres, &tables.genres),
        overview: raw.overview.clone(),
    }
}

/// Cover URL for a game, or `None` when it has no usable box art.
pub fn cover_for(game_id: i64, tables: &SideTables) -> Option<String> {
    let images = tables.boxart.images.get(&game_id)?;
    let filename = preferred_box_art(images)?.filename.as_deref()?;
    resolve_cover_url(filename, tables.boxart.base_url.as_deref())
}

/// The front cover if tagged, otherwise the first descriptor.
pub fn preferred_box_art(images: &[BoxArt]) -> Option<&BoxArt> {
    images
        .iter()
        .find(|image| image.side.as_deref() == Some("front"))
        .or_else(|| images.first())
}

/// Build an absolute image URL.
///
/// Absolute filenames are kept as-is; relative ones are appended to the
/// response's base URL when it is an HTTP URL, else to
/// [`DEFAULT_IMAGE_BASE_URL`].
pub fn resolve_cover_url(filename: &str, base_url: Option<&str>) -> Option<String> {
    if filename.is_empty() {
        return None;
    }
    if filename.starts_with("http") {
        return Some(filename.to_string());
    }
    let base = base_url
        .filter(|base| base.starts_with("http"))
        .unwrap_or(DEFAULT_IMAGE_BASE_URL);
    Some(format!("{base}{filename}"))
}

/// Names for `ids`, dropping any without an entry, joined with `", "`.
pub fn join_names(ids: &[i64], table: &HashMap<i64, String>) -> String {
    ids.iter()
        .filter_map(|id| table.get(id).map(String::as_str))
        .collect::<Vec<_>>()
        .join(", ")
}
