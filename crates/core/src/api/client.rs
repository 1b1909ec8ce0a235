//! TheGamesDB client: search, single-game lookup and the platform catalog.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::{
    download::{cover_file_name, save_cover},
    normalize::normalize,
    transport::{upstream_error, HttpTransport, Transport},
    wire::{Envelope, GamesData, PlatformsData},
};
use crate::{
    config::AppConfig,
    error::{ApiError, ClientError},
    models::{game_page_url, GameDetail, GameSummary, Platform},
    platform::resolve_platform_id,
    throttle::ThrottleGate,
};

const SEARCH_PATH: &str = "Games/ByGameName";
const DETAILS_PATH: &str = "Games/ByGameID";
const PLATFORMS_PATH: &str = "Platforms";
const GAME_INCLUDES: &str = "boxart,platforms,developers,genres";

/// Throttled client for the upstream game catalog.
pub struct GamesDbClient<T = HttpTransport> {
    transport: T,
    gate: ThrottleGate,
    api_key: String,
}

impl GamesDbClient<HttpTransport> {
    /// Client talking HTTP to the configured upstream.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Ok(Self::new(
            HttpTransport::from_config(config)?,
            ThrottleGate::new(config.throttle_delay()),
            config.api_key.clone(),
        ))
    }
}

impl<T: Transport> GamesDbClient<T> {
    /// Client over an arbitrary transport.
    pub fn new(transport: T, gate: ThrottleGate, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            gate,
            api_key: api_key.into(),
        }
    }

    /// Search games by name on one platform.
    ///
    /// An explicit `platform_id` wins over the platform guessed from the
    /// query text.
    pub async fn search(
        &self,
        query: &str,
        platform_id: Option<i64>,
    ) -> Result<Vec<GameSummary>, ClientError> {
        let platform = platform_id.unwrap_or_else(|| resolve_platform_id(query));
        let name = query.trim();
        debug!(query = name, platform, "searching games");

        let envelope: Envelope<GamesData> = self
            .fetch(
                SEARCH_PATH,
                vec![
                    ("name", name.to_string()),
                    ("filter[platform]", platform.to_string()),
                    ("include", GAME_INCLUDES.to_string()),
                ],
            )
            .await
            .map_err(ClientError::SearchFailed)?;

        let games: Vec<GameSummary> = envelope
            .data
            .unwrap_or_default()
            .games
            .iter()
            .map(|raw| normalize(raw, &envelope.include))
            .collect();
        info!(query = name, platform, results = games.len(), "search finished");
        Ok(games)
    }

    /// Look up one game, attaching its TheGamesDB permalink.
    pub async fn fetch_details(&self, game_id: i64) -> Result<GameDetail, ClientError> {
        let envelope: Envelope<GamesData> = self
            .fetch(
                DETAILS_PATH,
                vec![
                    ("id", game_id.to_string()),
                    ("include", GAME_INCLUDES.to_string()),
                ],
            )
            .await
            .map_err(ClientError::DetailsFailed)?;

        let games = envelope.data.unwrap_or_default().games;
        let raw = games
            .iter()
            .find(|game| game.id == game_id)
            .or_else(|| games.first())
            .ok_or_else(|| {
                ClientError::DetailsFailed(ApiError::Missing(format!("game {game_id} not found")))
            })?;

        let summary = normalize(raw, &envelope.include);
        Ok(GameDetail {
            thegamesdb_url: game_page_url(summary.id),
            summary,
        })
    }

    /// Full platform catalog in upstream order.
    pub async fn fetch_platforms(&self) -> Result<Vec<Platform>, ClientError> {
        let envelope: Envelope<PlatformsData> = self
            .fetch(PLATFORMS_PATH, Vec::new())
            .await
            .map_err(ClientError::PlatformsFailed)?;
        let platforms = envelope.data.unwrap_or_default().platforms;
        info!(total = platforms.len(), "platform catalog loaded");
        Ok(platforms)
    }

    /// Download a game's cover into `dir` and return the saved path.
    ///
    /// Image fetches bypass the throttle gate.
    pub async fn download_cover(
        &self,
        game: &GameSummary,
        dir: &Path,
    ) -> Result<PathBuf, ClientError> {
        let url = game.cover.as_deref().ok_or_else(|| {
            ClientError::CoverDownloadFailed(ApiError::Missing(format!(
                "game {} has no cover",
                game.id
            )))
        })?;

        let bytes = self
            .transport
            .get_bytes(url)
            .await
            .map_err(ClientError::CoverDownloadFailed)?;
        let path = save_cover(dir, &cover_file_name(game, url), &bytes)
            .await
            .map_err(ClientError::CoverDownloadFailed)?;
        info!(game_id = game.id, path = %path.display(), bytes = bytes.len(), "cover saved");
        Ok(path)
    }

    async fn fetch<D: DeserializeOwned>(
        &self,
        path: &str,
        mut query: Vec<(&str, String)>,
    ) -> Result<Envelope<D>, ApiError> {
        self.gate.acquire().await;
        query.insert(0, ("apikey", self.api_key.clone()));

        let value = self.transport.get_json(path, &query).await?;
        if let Some(err) = upstream_error(&value) {
            return Err(err);
        }

        let envelope = Envelope::<D>::from_value(value)?;
        if let Some(remaining) = envelope.remaining_monthly_allowance {
            debug!(remaining, "upstream allowance");
        }
        Ok(envelope)
    }
}
