//! Raw upstream payload shapes.
//!
//! TheGamesDB is a PHP service: empty maps arrive as `[]`, side-tables are
//! sometimes wrapped in `{ "data": ... }` and numeric fields occasionally
//! arrive as strings. Everything here degrades to empty values rather than
//! failing the whole response.

use std::collections::HashMap;

use serde::{
    de::{DeserializeOwned, Error as _},
    Deserialize, Deserializer,
};
use serde_json::Value;
use tracing::warn;

use crate::models::Platform;

/// Top-level response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "D: DeserializeOwned"))]
pub struct Envelope<D> {
    /// Upstream status code mirrored in the body.
    #[serde(default)]
    pub code: Option<i64>,
    /// Upstream status text.
    #[serde(default)]
    pub status: Option<String>,
    /// Primary entities.
    #[serde(default)]
    pub data: Option<D>,
    /// Cross-reference side-tables.
    #[serde(default, deserialize_with = "lenient")]
    pub include: SideTables,
    /// Remaining monthly request quota for the API key.
    #[serde(default)]
    pub remaining_monthly_allowance: Option<i64>,
}

/// `data` payload of the game endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct GamesData {
    /// Games in upstream order.
    #[serde(default, deserialize_with = "records")]
    pub games: Vec<RawGame>,
}

/// `data` payload of the platform endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PlatformsData {
    /// Platform catalog.
    #[serde(default, deserialize_with = "records")]
    pub platforms: Vec<Platform>,
}

/// A game exactly as the upstream describes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawGame {
    /// Upstream identifier.
    #[serde(deserialize_with = "required_id")]
    pub id: i64,
    /// Title.
    #[serde(default)]
    pub game_title: Option<String>,
    /// Release date, usually `YYYY-MM-DD`.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Platform ID, resolved through the `platforms` side-table.
    #[serde(default, deserialize_with = "optional_id")]
    pub platform: Option<i64>,
    /// Region code.
    #[serde(default, deserialize_with = "optional_id")]
    pub region_id: Option<i64>,
    /// Player count.
    #[serde(default, deserialize_with = "optional_text")]
    pub players: Option<String>,
    /// Co-op flag.
    #[serde(default, deserialize_with = "optional_text")]
    pub co_op: Option<String>,
    /// Developer IDs, resolved through the `developers` side-table.
    #[serde(default, deserialize_with = "id_list")]
    pub developers: Vec<i64>,
    /// Genre IDs, resolved through the `genres` side-table.
    #[serde(default, deserialize_with = "id_list")]
    pub genres: Vec<i64>,
    /// Synopsis.
    #[serde(default)]
    pub overview: Option<String>,
}

/// One cover image descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BoxArt {
    /// `"front"` or `"back"`.
    #[serde(default)]
    pub side: Option<String>,
    /// Relative path under the image base URL, or an absolute URL.
    #[serde(default)]
    pub filename: Option<String>,
}

/// Box art side-table: images per game ID plus the base URL to prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxartTable {
    /// `base_url.original` from the response, when supplied.
    pub base_url: Option<String>,
    /// Image descriptors keyed by game ID.
    pub images: HashMap<i64, Vec<BoxArt>>,
}

/// Cross-reference tables delivered alongside the primary entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SideTables {
    /// Cover images.
    #[serde(default, deserialize_with = "boxart_table")]
    pub boxart: BoxartTable,
    /// Platform ID to name.
    #[serde(default, alias = "platform", deserialize_with = "name_table")]
    pub platforms: HashMap<i64, String>,
    /// Developer ID to name.
    #[serde(default, deserialize_with = "name_table")]
    pub developers: HashMap<i64, String>,
    /// Genre ID to name.
    #[serde(default, deserialize_with = "name_table")]
    pub genres: HashMap<i64, String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(from_value_or_default(value, "include"))
}

fn from_value_or_default<T>(value: Value, what: &str) -> T
where
    T: DeserializeOwned + Default,
{
    if is_empty_value(&value) {
        return T::default();
    }
    serde_json::from_value(value).unwrap_or_else(|err| {
        warn!("ignoring malformed {what}: {err}");
        T::default()
    })
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Unwrap `{ "data": {...} }` side-tables to the inner map.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Entries of an ID-keyed object, or of an array of records carrying `id`.
fn keyed_entries(value: Value) -> Vec<(i64, Value)> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(key, entry)| match key.trim().parse() {
                Ok(id) => Some((id, entry)),
                Err(_) => {
                    warn!("ignoring side-table entry with non-numeric key {key:?}");
                    None
                }
            })
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|entry| Some((value_as_id(entry.get("id")?)?, entry)))
            .collect(),
        Value::Null => Vec::new(),
        other => {
            warn!("ignoring side-table of unexpected shape: {other}");
            Vec::new()
        }
    }
}

fn value_as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(num) => num.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn name_table<'de, D>(deserializer: D) -> Result<HashMap<i64, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = unwrap_data(Value::deserialize(deserializer)?);
    Ok(keyed_entries(value)
        .into_iter()
        .filter_map(|(id, entry)| {
            let name = entry.get("name")?.as_str()?;
            Some((id, name.to_string()))
        })
        .collect())
}

fn boxart_table<'de, D>(deserializer: D) -> Result<BoxartTable, D::Error>
where
    D: Deserializer<'de>,
{
    let mut value = Value::deserialize(deserializer)?;
    let base_url = value
        .pointer("/base_url/original")
        .and_then(Value::as_str)
        .map(str::to_string);
    let data = value
        .as_object_mut()
        .and_then(|map| map.remove("data"))
        .unwrap_or(Value::Null);

    let images = keyed_entries(data)
        .into_iter()
        .map(|(id, entry)| (id, box_art_list(entry)))
        .collect();

    Ok(BoxartTable { base_url, images })
}

fn box_art_list(value: Value) -> Vec<BoxArt> {
    let items = match value {
        Value::Array(items) => items,
        single @ Value::Object(_) => vec![single],
        _ => return Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

/// Primary records given as an array or an ID-keyed object; entries that do
/// not decode are skipped.
fn records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, entry)| entry).collect(),
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("skipping malformed record: {err}");
                None
            }
        })
        .collect())
}

fn required_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_id(&value).ok_or_else(|| D::Error::custom(format!("invalid id {value}")))
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_id(&Value::deserialize(deserializer)?))
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(num) => Some(num.to_string()),
        Value::Bool(flag) => Some(if flag { "Yes" } else { "No" }.to_string()),
        _ => None,
    })
}

fn id_list<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.iter().filter_map(value_as_id).collect(),
        single => value_as_id(&single).into_iter().collect(),
    })
}

impl SideTables {
    /// Build side-tables from a raw `include` object.
    pub fn from_value(value: Value) -> Self {
        from_value_or_default(value, "include")
    }
}

impl<D> Envelope<D>
where
    D: DeserializeOwned,
{
    /// Decode an envelope from a JSON body.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn side_tables_accept_flat_and_wrapped_maps() {
        let tables = SideTables::from_value(json!({
            "boxart": {
                "base_url": { "original": "https://cdn.example.com/" },
                "data": { "5": [{ "side": "front", "filename": "a.png" }] }
            },
            "platforms": { "data": { "11": { "id": 11, "name": "Sony Playstation 2" } } },
            "developers": { "1": { "name": "Dev1" }, "2": { "id": 2 } },
            "genres": []
        }));

        assert_eq!(tables.boxart.base_url.as_deref(), Some("https://cdn.example.com/"));
        assert_eq!(tables.boxart.images[&5][0].filename.as_deref(), Some("a.png"));
        assert_eq!(tables.platforms[&11], "Sony Playstation 2");
        assert_eq!(tables.developers.len(), 1);
        assert_eq!(tables.developers[&1], "Dev1");
        assert!(tables.genres.is_empty());
    }

    #[test]
    fn malformed_include_degrades_to_empty() {
        assert_eq!(SideTables::from_value(json!(null)), SideTables::default());
        assert_eq!(SideTables::from_value(json!([])), SideTables::default());
        assert_eq!(SideTables::from_value(json!("nonsense")), SideTables::default());

        let tables = SideTables::from_value(json!({
            "boxart": "broken",
            "developers": { "x": { "name": "NoId" }, "3": { "name": "C" } },
        }));
        assert_eq!(tables.boxart, BoxartTable::default());
        assert_eq!(tables.developers.len(), 1);
        assert_eq!(tables.developers[&3], "C");
    }

    #[test]
    fn raw_games_tolerate_loose_typing() -> serde_json::Result<()> {
        let game: RawGame = serde_json::from_value(json!({
            "id": 9,
            "game_title": "Loose",
            "platform": "11",
            "players": 2,
            "co_op": "Yes",
            "developers": [1, "2", null],
            "genres": null
        }))?;
        assert_eq!(game.platform, Some(11));
        assert_eq!(game.players.as_deref(), Some("2"));
        assert_eq!(game.co_op.as_deref(), Some("Yes"));
        assert_eq!(game.developers, vec![1, 2]);
        assert!(game.genres.is_empty());
        assert!(game.overview.is_none());
        Ok(())
    }

    #[test]
    fn string_ids_and_names_pass_through() -> serde_json::Result<()> {
        let envelope: Envelope<GamesData> = Envelope::from_value(json!({
            "data": { "games": [{ "id": "5", "game_title": "Quoted" }, { "id": "x" }] },
            "include": { "developers": { "1": { "name": "  Spaced Dev " }, "2": { "name": " " } } }
        }))?;
        let games = envelope.data.unwrap_or_default().games;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, 5);
        assert_eq!(envelope.include.developers[&1], "  Spaced Dev ");
        assert_eq!(envelope.include.developers[&2], " ");
        Ok(())
    }

    #[test]
    fn games_arrive_as_array_or_map() -> serde_json::Result<()> {
        let envelope: Envelope<GamesData> = Envelope::from_value(json!({
            "code": 200,
            "status": "Success",
            "data": { "count": 2, "games": { "1": { "id": 1 }, "2": { "nope": true } } },
            "include": []
        }))?;
        let data = envelope.data.unwrap_or_default();
        assert_eq!(data.games.len(), 1);
        assert_eq!(data.games[0].id, 1);

        let envelope: Envelope<PlatformsData> = Envelope::from_value(json!({
            "data": {
                "platforms": [
                    { "id": 11, "name": "Sony Playstation 2", "alias": "sony-playstation-2" }
                ]
            }
        }))?;
        let platforms = envelope.data.unwrap_or_default().platforms;
        assert_eq!(platforms[0].alias.as_deref(), Some("sony-playstation-2"));
        Ok(())
    }
}
