//! Tile load lifecycle and the transport seam.
//!
//! Fetching and decoding are owned by an external collaborator; this crate
//! only consumes the outcome. [`TileState`] is the tagged lifecycle a tile
//! moves through, and [`TileLoader`] is the capability a transport implements
//! to turn a resolved URL into a decoded image.

use std::sync::Arc;

use async_trait::async_trait;
use image::RgbaImage;

use crate::error::LoadError;

/// Lifecycle of one tile load.
///
/// A tile starts `Pending`, moves to `Loading` when a fetch is in flight, and
/// terminates in `Loaded` with the decoded image or in `Failed`. Only the
/// `Loaded` state carries pixels; the materializer never caches anything for
/// the other three.
#[derive(Debug, Clone, Default)]
pub enum TileState {
    /// No fetch has been issued yet
    #[default]
    Pending,

    /// A fetch is in flight
    Loading,

    /// The fetch completed and the payload decoded
    Loaded(Arc<RgbaImage>),

    /// The fetch failed, was cancelled, or was superseded
    Failed,
}

impl TileState {
    /// Whether the tile reached the loaded state.
    pub fn is_loaded(&self) -> bool {
        matches!(self, TileState::Loaded(_))
    }

    /// Whether the load reached a terminal state (loaded or failed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TileState::Loaded(_) | TileState::Failed)
    }

    /// The raw decoded image, present only when loaded.
    pub fn raw_image(&self) -> Option<&Arc<RgbaImage>> {
        match self {
            TileState::Loaded(image) => Some(image),
            _ => None,
        }
    }
}

/// Transport capability: fetch a tile URL and hand back the decoded image.
///
/// Implementations own everything network-shaped, including retries and
/// cancellation. A cancelled or superseded fetch reports
/// [`LoadError::Cancelled`] so the caller leaves the tile's caches untouched.
#[async_trait]
pub trait TileLoader: Send + Sync {
    /// Fetch `url` and decode the response into an image.
    async fn load(&self, url: &str) -> Result<RgbaImage, LoadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_pending() {
        assert!(matches!(TileState::default(), TileState::Pending));
    }

    #[test]
    fn test_state_queries() {
        let loaded = TileState::Loaded(Arc::new(RgbaImage::new(4, 4)));

        assert!(loaded.is_loaded());
        assert!(loaded.is_terminal());
        assert!(loaded.raw_image().is_some());

        assert!(!TileState::Pending.is_terminal());
        assert!(!TileState::Loading.is_terminal());
        assert!(TileState::Failed.is_terminal());
        assert!(TileState::Loading.raw_image().is_none());
        assert!(TileState::Failed.raw_image().is_none());
    }
}
