//! Tile addressing and fetch descriptor resolution.
//!
//! Maps an abstract tile coordinate `(tier, x, y)` onto the two things the
//! rest of the pipeline needs:
//!
//! - a [`linear tile index`](TierPlan::linear_index) unique across the whole
//!   pyramid, which origin servers bucket into fixed-size tile groups for
//!   storage locality, and
//! - a [`FetchDescriptor`] carrying the pixel region, scale factor, and
//!   quality the origin turns into an actual byte response.
//!
//! Resolution is pure: no I/O, no caching, identical inputs always produce
//! identical outputs. The addressing framework may also signal "no tile at
//! this position" by passing `None`, which resolves to no fetch at all; that
//! is an expected outcome, not an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::plan::TierPlan;

/// Number of consecutive linear indices the origin packs into one tile group.
///
/// Shared with the server-side tile packer; both sides must agree for bucket
/// lookups to land on the same group.
pub const TILE_GROUP_SIZE: u64 = 256;

// =============================================================================
// TileCoord
// =============================================================================

/// Position of one tile inside the pyramid.
///
/// `tier` 0 is the coarsest tier; `x` counts columns from the left and `y`
/// rows from the top. Coordinates are only meaningful against the plan they
/// were produced for: `x < tiles_x` and `y < tiles_y` of that tier is a
/// caller-side precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Resolution tier (0 = coarsest)
    pub tier: u32,

    /// Column, 0-indexed from the left
    pub x: u32,

    /// Row, 0-indexed from the top
    pub y: u32,
}

impl TileCoord {
    /// Create a tile coordinate.
    pub fn new(tier: u32, x: u32, y: u32) -> Self {
        Self { tier, x, y }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.tier, self.x, self.y)
    }
}

// =============================================================================
// FetchDescriptor
// =============================================================================

/// Everything the origin needs to serve one tile.
///
/// The pixel offset is expressed in the coordinate space of the tile's tier
/// at its native resolution, before the origin applies `scale`. The region is
/// always a full square of the canonical edge length; the origin clips to the
/// true image bounds at pyramid edges.
///
/// Descriptors are stateless and recomputed per request, never retained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FetchDescriptor {
    /// Left pixel offset of the requested region
    pub pixel_x: u64,

    /// Top pixel offset of the requested region
    pub pixel_y: u64,

    /// Side length of the requested square region in pixels
    pub edge: u32,

    /// Downsample factor the origin applies, a power of two.
    ///
    /// Kept as a float because the origin wire format allows fractional
    /// power-of-two ratios; integral values print without a decimal point.
    pub scale: f64,

    /// Compression quality the origin encodes at, fixed per pyramid
    pub quality: u8,
}

impl FetchDescriptor {
    /// Synthesize the origin request URL.
    ///
    /// Wire format:
    /// `<base>?<x>+<y>+<edge>+<edge>+<scale>+<quality>+s`
    /// with the literal trailing `s` marker the origin requires.
    pub fn to_url(&self, base_url: &str) -> String {
        format!(
            "{}?{}+{}+{}+{}+{}+{}+s",
            base_url, self.pixel_x, self.pixel_y, self.edge, self.edge, self.scale, self.quality
        )
    }
}

// =============================================================================
// Resolution
// =============================================================================

impl TierPlan {
    /// Whether a coordinate addresses a tile this plan defines.
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.get(coord.tier)
            .is_some_and(|tier| coord.x < tier.tiles_x && coord.y < tier.tiles_y)
    }

    /// Linear tile index, unique across the whole pyramid.
    ///
    /// `x + y * tiles_x[tier] + tiles_before[tier]`, counting row-major
    /// within the tier and offsetting by every coarser tier's tile count.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate lies outside the plan. The addressing
    /// framework never constructs such coordinates; hitting this is a caller
    /// bug, and failing loudly beats emitting an index that aliases another
    /// tile.
    pub fn linear_index(&self, coord: TileCoord) -> u64 {
        let tier = self
            .get(coord.tier)
            .unwrap_or_else(|| panic!("tile {} outside pyramid: no tier {}", coord, coord.tier));
        assert!(
            coord.x < tier.tiles_x && coord.y < tier.tiles_y,
            "tile {} outside tier bounds {}x{}",
            coord,
            tier.tiles_x,
            tier.tiles_y
        );

        coord.x as u64 + coord.y as u64 * tier.tiles_x as u64 + tier.tiles_before
    }

    /// Build the fetch descriptor for a tile.
    ///
    /// The scale is `2^(max_tier - tier)`: tier 0 asks the origin for the
    /// heaviest downsample, the finest tier for none at all.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate lies outside the plan, as
    /// [`linear_index`](Self::linear_index) does.
    pub fn fetch_descriptor(&self, coord: TileCoord, quality: u8) -> FetchDescriptor {
        assert!(
            self.contains(coord),
            "tile {} outside pyramid of {} tiers",
            coord,
            self.tier_count()
        );

        let edge = self.tile_edge();
        FetchDescriptor {
            pixel_x: coord.x as u64 * edge as u64,
            pixel_y: coord.y as u64 * edge as u64,
            edge,
            scale: (1u64 << (self.max_tier() - coord.tier)) as f64,
            quality,
        }
    }

    /// Resolve a coordinate into its linear index and fetch descriptor.
    ///
    /// `None` means the addressing framework found no tile at the requested
    /// position; no fetch is issued and `None` is returned.
    pub fn resolve(&self, coord: Option<TileCoord>, quality: u8) -> Option<(u64, FetchDescriptor)> {
        let coord = coord?;
        Some((self.linear_index(coord), self.fetch_descriptor(coord, quality)))
    }
}

/// Tile group (storage bucket) id for a linear tile index.
pub fn tile_group(linear_index: u64) -> u64 {
    linear_index / TILE_GROUP_SIZE
}

// =============================================================================
// Tests
// =============================================================================
