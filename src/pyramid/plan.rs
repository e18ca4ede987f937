//! Pyramid tier planning.
//!
//! A deep-zoom origin serves one image at several power-of-two resolution
//! tiers. This module computes the tier layout for a full-size image extent:
//! how many tiers exist, how many tiles each tier spans per axis, the
//! downsample factor the origin applies at each tier, and the running tile
//! count used for linear tile addressing.
//!
//! # Tier Ordering
//!
//! Tiers are ordered coarsest-first: tier 0 is the whole image downsampled
//! into a single tile, and the last tier is full resolution. Tier 0 always
//! spans exactly one tile per axis.
//!
//! # Tiering Policies
//!
//! Two policies decide how many tiers an extent produces:
//!
//! - [`TieringPolicy::Default`]: the working tile edge doubles each step
//!   until the whole extent fits inside one tile. Tile counts at each step
//!   are taken against the current (grown) edge.
//! - [`TieringPolicy::Truncated`]: the working extent itself is halved
//!   (integer shift) each step; tile counts are always taken against the
//!   fixed base edge. The truncation in the shift can end the loop one step
//!   earlier than the default policy for extents just past a tile boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// =============================================================================
// TieringPolicy
// =============================================================================

/// How the number of tiers and per-tier tile counts are derived.
///
/// Exactly one policy is active per pyramid. An unrecognized policy name is a
/// construction-time failure, never a silent fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieringPolicy {
    /// Grow the tile edge by doubling until the extent fits in one tile.
    #[default]
    Default,

    /// Halve the remaining extent each step against a fixed tile edge.
    Truncated,
}

impl TieringPolicy {
    /// The wire name used in viewer-facing configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            TieringPolicy::Default => "default",
            TieringPolicy::Truncated => "truncated",
        }
    }
}

impl fmt::Display for TieringPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TieringPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(TieringPolicy::Default),
            "truncated" => Ok(TieringPolicy::Truncated),
            other => Err(ConfigError::UnknownTierSizeCalculation {
                name: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// TierDescriptor
// =============================================================================

/// Layout of a single resolution tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierDescriptor {
    /// Number of tiles across the X axis at this tier
    pub tiles_x: u32,

    /// Number of tiles across the Y axis at this tier
    pub tiles_y: u32,

    /// Power-of-two downsample the origin applies at this tier.
    ///
    /// The finest tier has resolution 1; tier 0 (coarsest) has the largest
    /// value.
    pub resolution: u64,

    /// Total tile count of all strictly coarser tiers.
    ///
    /// This is the running offset that makes linear tile indices unique
    /// across the whole pyramid.
    pub tiles_before: u64,
}

impl TierDescriptor {
    /// Number of tiles in this tier.
    pub fn tile_count(&self) -> u64 {
        self.tiles_x as u64 * self.tiles_y as u64
    }
}

// =============================================================================
// TierPlan
// =============================================================================

/// The immutable tier layout of one image pyramid.
///
/// Computed once at source construction and shared read-only afterwards; every
/// per-tile resolution happens against a finished plan.
///
/// # Example
///
/// ```
/// use pyramid_source::pyramid::{TierPlan, TieringPolicy};
///
/// let plan = TierPlan::build(1000, 1000, TieringPolicy::Default, 512).unwrap();
/// assert_eq!(plan.tier_count(), 2);
/// assert_eq!(plan.get(0).unwrap().tiles_x, 1);
/// assert_eq!(plan.get(1).unwrap().tiles_x, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierPlan {
    /// Tier descriptors, coarsest first
    tiers: Vec<TierDescriptor>,

    /// Canonical tile edge length in pixels
    tile_edge: u32,

    /// Full image width in pixels
    width: u32,

    /// Full image height in pixels
    height: u32,
}

impl TierPlan {
    /// Compute the tier layout for an image extent.
    ///
    /// `tile_edge` is the canonical tile side length in pixels. The returned
    /// plan always contains at least the terminal single-tile tier; an extent
    /// that already fits inside one tile yields exactly one tier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidExtent`] when either axis is zero and
    /// [`ConfigError::InvalidTileEdge`] when the edge length is zero.
    pub fn build(
        width: u32,
        height: u32,
        policy: TieringPolicy,
        tile_edge: u32,
    ) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidExtent { width, height });
        }
        if tile_edge == 0 {
            return Err(ConfigError::InvalidTileEdge(tile_edge));
        }

        // Collected finest-first, then reversed so index 0 is coarsest.
        let mut tier_sizes: Vec<(u32, u32)> = Vec::new();
        let base_edge = tile_edge as u64;

        match policy {
            TieringPolicy::Default => {
                let (w, h) = (width as u64, height as u64);
                let mut edge = base_edge;
                while w > edge || h > edge {
                    tier_sizes.push((w.div_ceil(edge) as u32, h.div_ceil(edge) as u32));
                    edge += edge;
                }
            }
            TieringPolicy::Truncated => {
                let (mut w, mut h) = (width as u64, height as u64);
                while w > base_edge || h > base_edge {
                    tier_sizes.push((w.div_ceil(base_edge) as u32, h.div_ceil(base_edge) as u32));
                    w >>= 1;
                    h >>= 1;
                }
            }
        }

        // Terminal tier: the whole image inside one tile.
        tier_sizes.push((1, 1));
        tier_sizes.reverse();

        let tier_count = tier_sizes.len();
        let mut tiers = Vec::with_capacity(tier_count);
        let mut tiles_before = 0u64;
        for (i, (tiles_x, tiles_y)) in tier_sizes.into_iter().enumerate() {
            let descriptor = TierDescriptor {
                tiles_x,
                tiles_y,
                resolution: 1u64 << (tier_count - 1 - i),
                tiles_before,
            };
            tiles_before += descriptor.tile_count();
            tiers.push(descriptor);
        }

        Ok(TierPlan {
            tiers,
            tile_edge,
            width,
            height,
        })
    }

    /// Number of tiers, always at least 1.
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// The finest tier index.
    pub fn max_tier(&self) -> u32 {
        (self.tiers.len() - 1) as u32
    }

    /// Get a tier descriptor by index (0 = coarsest).
    pub fn get(&self, tier: u32) -> Option<&TierDescriptor> {
        self.tiers.get(tier as usize)
    }

    /// All tier descriptors, coarsest first.
    pub fn tiers(&self) -> &[TierDescriptor] {
        &self.tiers
    }

    /// Canonical tile edge length in pixels.
    pub fn tile_edge(&self) -> u32 {
        self.tile_edge
    }

    /// Full image extent `(width, height)` in pixels.
    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Total number of tiles across all tiers.
    pub fn total_tiles(&self) -> u64 {
        let last = self.tiers.last().expect("plan has at least one tier");
        last.tiles_before + last.tile_count()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(plan: &TierPlan) -> Vec<(u32, u32)> {
        plan.tiers().iter().map(|t| (t.tiles_x, t.tiles_y)).collect()
    }

    fn resolutions(plan: &TierPlan) -> Vec<u64> {
        plan.tiers().iter().map(|t| t.resolution).collect()
    }

    fn cumulative(plan: &TierPlan) -> Vec<u64> {
        plan.tiers().iter().map(|t| t.tiles_before).collect()
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "default".parse::<TieringPolicy>().unwrap(),
            TieringPolicy::Default
        );
        assert_eq!(
            "truncated".parse::<TieringPolicy>().unwrap(),
            TieringPolicy::Truncated
        );

        let err = "bilinear".parse::<TieringPolicy>().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownTierSizeCalculation { ref name } if name == "bilinear"
        ));
    }

    #[test]
    fn test_policy_roundtrip_display() {
        for policy in [TieringPolicy::Default, TieringPolicy::Truncated] {
            assert_eq!(policy.to_string().parse::<TieringPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_default_policy_1000x1000() {
        let plan = TierPlan::build(1000, 1000, TieringPolicy::Default, 512).unwrap();

        assert_eq!(sizes(&plan), vec![(1, 1), (2, 2)]);
        assert_eq!(resolutions(&plan), vec![2, 1]);
        assert_eq!(cumulative(&plan), vec![0, 1]);
        assert_eq!(plan.max_tier(), 1);
        assert_eq!(plan.total_tiles(), 5);
    }

    #[test]
    fn test_coarsest_tier_is_single_tile() {
        for (w, h) in [(1, 1), (512, 512), (513, 100), (10_000, 7_000), (46920, 33600)] {
            for policy in [TieringPolicy::Default, TieringPolicy::Truncated] {
                let plan = TierPlan::build(w, h, policy, 512).unwrap();
                let tier0 = plan.get(0).unwrap();
                assert_eq!((tier0.tiles_x, tier0.tiles_y), (1, 1), "{w}x{h} {policy}");
                assert_eq!(tier0.tiles_before, 0);
            }
        }
    }

    #[test]
    fn test_exact_fit_is_single_tier() {
        let plan = TierPlan::build(512, 512, TieringPolicy::Default, 512).unwrap();
        assert_eq!(sizes(&plan), vec![(1, 1)]);
        assert_eq!(resolutions(&plan), vec![1]);
        assert_eq!(plan.max_tier(), 0);
    }

    #[test]
    fn test_finest_tier_covers_extent() {
        let edge = 512u64;
        for (w, h) in [(1000, 700), (512, 512), (1024, 512), (46920, 33600), (513, 513)] {
            let plan = TierPlan::build(w, h, TieringPolicy::Default, edge as u32).unwrap();
            let finest = plan.get(plan.max_tier()).unwrap();

            assert!(finest.tiles_x as u64 * edge >= w as u64);
            assert!(finest.tiles_y as u64 * edge >= h as u64);

            // Covering is exact only when the extent is a whole number of tiles.
            if w as u64 % edge == 0 {
                assert_eq!(finest.tiles_x as u64 * edge, w as u64);
            } else {
                assert!(finest.tiles_x as u64 * edge > w as u64);
            }
        }
    }

    #[test]
    fn test_cumulative_counts_are_prefix_sums() {
        let plan = TierPlan::build(46920, 33600, TieringPolicy::Default, 512).unwrap();

        let mut expected = 0u64;
        for tier in plan.tiers() {
            assert_eq!(tier.tiles_before, expected);
            expected += tier.tile_count();
        }
        assert_eq!(plan.total_tiles(), expected);

        // Non-decreasing by construction.
        let cum = cumulative(&plan);
        assert!(cum.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_resolutions_are_reversed_powers_of_two() {
        let plan = TierPlan::build(8000, 6000, TieringPolicy::Default, 512).unwrap();
        let n = plan.tier_count();

        for (i, tier) in plan.tiers().iter().enumerate() {
            assert_eq!(tier.resolution, 1u64 << (n - 1 - i));
        }
        assert_eq!(plan.get(plan.max_tier()).unwrap().resolution, 1);
    }

    #[test]
    fn test_truncated_policy_counts_against_fixed_edge() {
        // 2000 needs four 512-tiles, the halved 1000 needs two, 500 fits.
        let plan = TierPlan::build(2000, 2000, TieringPolicy::Truncated, 512).unwrap();
        assert_eq!(sizes(&plan), vec![(1, 1), (2, 2), (4, 4)]);
        assert_eq!(resolutions(&plan), vec![4, 2, 1]);
        assert_eq!(cumulative(&plan), vec![0, 1, 5]);
    }

    #[test]
    fn test_policies_diverge_past_tile_boundary() {
        // 1025 >> 1 = 512 ends the truncated loop after one step, while the
        // default policy still needs a 2x2 tier before the extent fits.
        let default = TierPlan::build(1025, 1025, TieringPolicy::Default, 512).unwrap();
        let truncated = TierPlan::build(1025, 1025, TieringPolicy::Truncated, 512).unwrap();

        assert_eq!(sizes(&default), vec![(1, 1), (2, 2), (3, 3)]);
        assert_eq!(sizes(&truncated), vec![(1, 1), (3, 3)]);
    }

    #[test]
    fn test_asymmetric_extent() {
        let plan = TierPlan::build(4096, 256, TieringPolicy::Default, 512).unwrap();
        assert_eq!(sizes(&plan), vec![(1, 1), (2, 1), (4, 1), (8, 1)]);
        assert_eq!(cumulative(&plan), vec![0, 1, 3, 7]);
        assert_eq!(plan.total_tiles(), 15);
    }

    #[test]
    fn test_zero_extent_rejected() {
        for (w, h) in [(0, 100), (100, 0), (0, 0)] {
            let err = TierPlan::build(w, h, TieringPolicy::Default, 512).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidExtent { .. }));
        }
    }

    #[test]
    fn test_zero_tile_edge_rejected() {
        let err = TierPlan::build(100, 100, TieringPolicy::Default, 0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTileEdge(0)));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let a = TierPlan::build(46920, 33600, TieringPolicy::Default, 512).unwrap();
        let b = TierPlan::build(46920, 33600, TieringPolicy::Default, 512).unwrap();
        assert_eq!(a, b);
    }
}
