//! Upstream API access.

/// Throttled TheGamesDB client.
pub mod client;
/// Cover image files.
pub mod download;
/// Raw response to [`crate::models`] conversion.
pub mod normalize;
/// HTTP transport seam.
pub mod transport;
/// Raw upstream payload shapes.
pub mod wire;

pub use client::GamesDbClient;
pub use normalize::normalize;
pub use transport::{HttpTransport, Transport};
pub use wire::{RawGame, SideTables};
