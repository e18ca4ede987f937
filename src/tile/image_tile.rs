//! Tile materialization and the per-context surface cache.
//!
//! The origin clips edge and corner tiles to the true image bounds, so a
//! loaded raw image may be smaller than the canonical tile edge. Compositors
//! want every tile the same size; materialization pads short tiles onto a
//! canonical square surface (raw pixels at the top-left, remainder
//! transparent) so the draw path never special-cases partial tiles.
//!
//! Some rendering backends cannot share one surface across drawing contexts,
//! so materialized surfaces are cached per context key. The tile owns that
//! cache outright: context keys are opaque caller-supplied strings, the empty
//! string naming the default/shared rendering path, and nothing outside the
//! tile ever mutates the mapping.

use std::collections::HashMap;
use std::sync::Arc;

use image::imageops;
use image::RgbaImage;

use crate::pyramid::TileCoord;

use super::loader::TileState;

/// Context key for the default/shared rendering path.
pub const DEFAULT_CONTEXT: &str = "";

// =============================================================================
// Materialization
// =============================================================================

/// Normalize a raw image onto a canonical `edge`x`edge` surface.
///
/// The raw pixels land at the top-left origin; any remainder stays fully
/// transparent. An oversized raw image is clipped to the canvas.
pub fn materialize(raw: &RgbaImage, edge: u32) -> RgbaImage {
    let mut canvas = RgbaImage::new(edge, edge);
    imageops::replace(&mut canvas, raw, 0, 0);
    canvas
}

// =============================================================================
// ImageTile
// =============================================================================

/// One tile of the pyramid: coordinate, resolved URL, load state, and the
/// per-context cache of materialized surfaces.
///
/// The cache lives as long as the tile object; dropping the tile (eviction
/// from the store) is the only invalidation.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use image::RgbaImage;
/// use pyramid_source::pyramid::TileCoord;
/// use pyramid_source::tile::{ImageTile, TileState};
///
/// let mut tile = ImageTile::new(TileCoord::new(1, 1, 0), "https://o/i?512+0+512+512+1+80+s", 512);
/// tile.set_state(TileState::Loaded(Arc::new(RgbaImage::new(488, 512))));
///
/// let surface = tile.image(None).unwrap();
/// assert_eq!((surface.width(), surface.height()), (512, 512));
/// ```
#[derive(Debug)]
pub struct ImageTile {
    coord: TileCoord,
    url: String,
    tile_edge: u32,
    state: TileState,
    image_by_context: HashMap<String, Arc<RgbaImage>>,
}

impl ImageTile {
    /// Create a pending tile for a resolved coordinate and URL.
    pub fn new(coord: TileCoord, url: impl Into<String>, tile_edge: u32) -> Self {
        Self {
            coord,
            url: url.into(),
            tile_edge,
            state: TileState::Pending,
            image_by_context: HashMap::new(),
        }
    }

    /// The tile's pyramid coordinate.
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// The resolved origin URL for this tile.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Canonical tile edge length in pixels.
    pub fn tile_edge(&self) -> u32 {
        self.tile_edge
    }

    /// Current load state.
    pub fn state(&self) -> &TileState {
        &self.state
    }

    /// Replace the load state.
    ///
    /// Called by whoever drives the loader. Materialized surfaces from an
    /// earlier completed load are kept; a tile object is discarded rather
    /// than reloaded when its pixels change.
    pub fn set_state(&mut self, state: TileState) {
        self.state = state;
    }

    /// The materialized surface for a rendering context.
    ///
    /// `None` as context selects the default/shared path. While the load is
    /// not yet terminal (or has failed) this returns whatever raw handle the
    /// state carries, unmodified and uncached. Once loaded, the first call
    /// per context materializes and caches; later calls hand back the same
    /// surface.
    ///
    /// A raw image already at canonical size is cached as-is, no copy.
    pub fn image(&mut self, context: Option<&str>) -> Option<Arc<RgbaImage>> {
        let key = context.unwrap_or(DEFAULT_CONTEXT);
        if let Some(surface) = self.image_by_context.get(key) {
            return Some(Arc::clone(surface));
        }

        match &self.state {
            TileState::Loaded(raw) => {
                let surface = if raw.width() == self.tile_edge && raw.height() == self.tile_edge {
                    Arc::clone(raw)
                } else {
                    Arc::new(materialize(raw, self.tile_edge))
                };
                self.image_by_context
                    .insert(key.to_owned(), Arc::clone(&surface));
                Some(surface)
            }
            // Incomplete or failed loads pass through uncached.
            other => other.raw_image().cloned(),
        }
    }

    /// Number of contexts holding a materialized surface.
    pub fn materialized_contexts(&self) -> usize {
        self.image_by_context.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
