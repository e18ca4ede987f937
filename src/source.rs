//! Pyramid source: construction-time wiring of plan, resolver, and tiles.
//!
//! A [`PyramidSource`] is built once from validated [`SourceOptions`]. It
//! computes the tier plan up front, resolves tile coordinates into origin
//! URLs on demand, creates tile objects for the store, and drives a
//! [`TileLoader`] through the tile load lifecycle.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            addressing framework             │
//! │      (supplies TileCoord or "no tile")      │
//! └──────────────────────┬──────────────────────┘
//!                        ▼
//! ┌─────────────────────────────────────────────┐
//! │               PyramidSource                 │
//! │   TierPlan ──► linear index ──► FetchURL    │
//! └──────────┬───────────────────────┬──────────┘
//!            ▼                       ▼
//! ┌────────────────────┐   ┌────────────────────┐
//! │     TileLoader     │   │     ImageTile      │
//! │ (external fetch +  │   │ (state + context   │
//! │      decode)       │   │   surface cache)   │
//! └────────────────────┘   └────────────────────┘
//! ```
//!
//! The source itself is immutable after construction and can be shared
//! freely; all per-tile mutation lives inside the tile objects.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::SourceOptions;
use crate::error::{ConfigError, LoadError};
use crate::pyramid::{FetchDescriptor, TierPlan, TileCoord};
use crate::tile::{ImageTile, TileLoader, TileState};

/// A deep-zoom tile source for one origin image.
///
/// # Example
///
/// ```
/// use pyramid_source::config::SourceOptions;
/// use pyramid_source::pyramid::TileCoord;
/// use pyramid_source::source::PyramidSource;
///
/// let options = SourceOptions::new("https://origin.test/scan-42", [1000, 1000]);
/// let source = PyramidSource::new(options).unwrap();
///
/// assert_eq!(
///     source.tile_url(Some(TileCoord::new(1, 1, 0))).unwrap(),
///     "https://origin.test/scan-42?512+0+512+512+1+80+s"
/// );
/// assert_eq!(source.tile_url(None), None);
/// ```
#[derive(Debug, Clone)]
pub struct PyramidSource {
    plan: TierPlan,
    base_url: String,
    quality: u8,
    attributions: Option<String>,
    cross_origin: Option<String>,
    logo: Option<String>,
}

impl PyramidSource {
    /// Build a source from options.
    ///
    /// Validates the options and computes the tier plan once; the plan is
    /// immutable for the lifetime of the source.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a zero extent, zero tile edge, quality
    /// outside `1..=100`, or an unparseable base URL.
    pub fn new(options: SourceOptions) -> Result<Self, ConfigError> {
        options.validate()?;

        let [width, height] = options.size;
        let plan = TierPlan::build(
            width,
            height,
            options.tier_size_calculation,
            options.tile_edge,
        )?;

        debug!(
            width,
            height,
            policy = %options.tier_size_calculation,
            tiers = plan.tier_count(),
            total_tiles = plan.total_tiles(),
            "built pyramid tier plan"
        );

        Ok(Self {
            plan,
            base_url: options.url,
            quality: options.quality,
            attributions: options.attributions,
            cross_origin: options.cross_origin,
            logo: options.logo,
        })
    }

    /// The tier plan, shared read-only.
    pub fn plan(&self) -> &TierPlan {
        &self.plan
    }

    /// Base URL of the origin image.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Canonical tile edge length in pixels.
    pub fn tile_edge(&self) -> u32 {
        self.plan.tile_edge()
    }

    /// Origin compression quality, fixed per pyramid.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Attribution text forwarded to the rendering framework.
    pub fn attributions(&self) -> Option<&str> {
        self.attributions.as_deref()
    }

    /// Cross-origin policy forwarded to the rendering framework.
    pub fn cross_origin(&self) -> Option<&str> {
        self.cross_origin.as_deref()
    }

    /// Logo URL forwarded to the rendering framework.
    pub fn logo(&self) -> Option<&str> {
        self.logo.as_deref()
    }

    /// Resolve a coordinate into its linear index and fetch descriptor.
    ///
    /// `None` (no tile at this position) resolves to `None`: no fetch.
    pub fn resolve(&self, coord: Option<TileCoord>) -> Option<(u64, FetchDescriptor)> {
        self.plan.resolve(coord, self.quality)
    }

    /// The origin request URL for a coordinate, or `None` for "no tile".
    pub fn tile_url(&self, coord: Option<TileCoord>) -> Option<String> {
        self.resolve(coord)
            .map(|(_, descriptor)| descriptor.to_url(&self.base_url))
    }

    /// Create a pending tile object for a coordinate.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate lies outside the plan, as the resolver
    /// does.
    pub fn create_tile(&self, coord: TileCoord) -> ImageTile {
        let descriptor = self.plan.fetch_descriptor(coord, self.quality);
        ImageTile::new(coord, descriptor.to_url(&self.base_url), self.tile_edge())
    }

    /// Drive one tile through a load.
    ///
    /// Marks the tile loading, hands its URL to the loader, and records the
    /// terminal state. An already loaded tile is left alone. A failed or
    /// cancelled load marks the tile failed and leaves its surface cache
    /// untouched; whether to try again is the transport's call.
    pub async fn load_tile<L: TileLoader>(
        &self,
        loader: &L,
        tile: &mut ImageTile,
    ) -> Result<(), LoadError> {
        if tile.state().is_loaded() {
            return Ok(());
        }

        tile.set_state(TileState::Loading);
        match loader.load(tile.url()).await {
            Ok(image) => {
                debug!(coord = %tile.coord(), "tile loaded");
                tile.set_state(TileState::Loaded(Arc::new(image)));
                Ok(())
            }
            Err(err) => {
                warn!(coord = %tile.coord(), error = %err, "tile load failed");
                tile.set_state(TileState::Failed);
                Err(err)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::RgbaImage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_source() -> PyramidSource {
        PyramidSource::new(SourceOptions::new("https://origin.test/scan-42", [1000, 1000])).unwrap()
    }

    /// Loader that serves a fixed-size image and counts its calls.
    struct MockLoader {
        width: u32,
        height: u32,
        fail: bool,
        calls: AtomicUsize,
    }

    impl MockLoader {
        fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(0, 0)
            }
        }
    }

    #[async_trait]
    impl TileLoader for MockLoader {
        async fn load(&self, _url: &str) -> Result<RgbaImage, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LoadError::Transport("connection reset".to_string()));
            }
            Ok(RgbaImage::new(self.width, self.height))
        }
    }

    #[test]
    fn test_construction_rejects_invalid_options() {
        let result = PyramidSource::new(SourceOptions::new("https://origin.test/i", [0, 100]));
        assert!(matches!(result, Err(ConfigError::InvalidExtent { .. })));

        let result = PyramidSource::new(SourceOptions::new("::::", [100, 100]));
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_metadata_passthrough() {
        let mut options = SourceOptions::new("https://origin.test/i", [800, 600]);
        options.attributions = Some("Imaging Core Facility".to_string());
        options.cross_origin = Some("anonymous".to_string());
        options.logo = Some("https://origin.test/logo.png".to_string());

        let source = PyramidSource::new(options).unwrap();
        assert_eq!(source.attributions(), Some("Imaging Core Facility"));
        assert_eq!(source.cross_origin(), Some("anonymous"));
        assert_eq!(source.logo(), Some("https://origin.test/logo.png"));
    }

    #[test]
    fn test_tile_url_matches_wire_format() {
        let source = test_source();

        assert_eq!(
            source.tile_url(Some(TileCoord::new(0, 0, 0))).unwrap(),
            "https://origin.test/scan-42?0+0+512+512+2+80+s"
        );
        assert_eq!(
            source.tile_url(Some(TileCoord::new(1, 0, 1))).unwrap(),
            "https://origin.test/scan-42?0+512+512+512+1+80+s"
        );
        assert_eq!(source.tile_url(None), None);
    }

    #[test]
    fn test_create_tile_carries_resolved_url() {
        let source = test_source();
        let coord = TileCoord::new(1, 1, 0);

        let tile = source.create_tile(coord);
        assert_eq!(tile.coord(), coord);
        assert_eq!(tile.url(), source.tile_url(Some(coord)).unwrap());
        assert_eq!(tile.tile_edge(), 512);
        assert!(matches!(tile.state(), TileState::Pending));
    }

    #[tokio::test]
    async fn test_load_tile_success() {
        let source = test_source();
        let loader = MockLoader::new(512, 512);
        let mut tile = source.create_tile(TileCoord::new(1, 0, 0));

        source.load_tile(&loader, &mut tile).await.unwrap();
        assert!(tile.state().is_loaded());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);

        // A loaded tile is not fetched again.
        source.load_tile(&loader, &mut tile).await.unwrap();
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_tile_failure_marks_failed() {
        let source = test_source();
        let loader = MockLoader::failing();
        let mut tile = source.create_tile(TileCoord::new(0, 0, 0));

        let err = source.load_tile(&loader, &mut tile).await.unwrap_err();
        assert!(matches!(err, LoadError::Transport(_)));
        assert!(matches!(tile.state(), TileState::Failed));
        assert!(tile.image(None).is_none());
        assert_eq!(tile.materialized_contexts(), 0);
    }

    #[test]
    fn test_resolve_is_pure() {
        let source = test_source();
        let coord = Some(TileCoord::new(1, 1, 1));

        assert_eq!(source.resolve(coord), source.resolve(coord));
        assert_eq!(source.resolve(coord).unwrap().0, 4);
    }
}
