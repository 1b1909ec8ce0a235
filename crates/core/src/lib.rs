#![warn(clippy::all, missing_docs)]

//! Core logic for coverfinder.
//!
//! This crate hosts configuration handling, the throttled TheGamesDB
//! client, response normalization and the platform catalog helpers used
//! by the terminal UI and any future frontends.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod platform;
pub mod throttle;

pub use api::GamesDbClient;
pub use config::AppConfig;
pub use error::{ApiError, ClientError};
pub use models::{GameDetail, GameSummary, Platform, Region};
pub use throttle::ThrottleGate;
