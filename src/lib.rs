//! # Pyramid Source
//!
//! A tile addressing and materialization layer for deep-zoom image pyramids
//! served by scale/region origin servers.
//!
//! Given a full image's pixel extent, this library computes the pyramid's
//! resolution tiers, maps abstract `(tier, x, y)` tile coordinates onto the
//! linear indices and scale/region request URLs such origins understand, and
//! normalizes loaded tiles onto canonical fixed-size surfaces for a pan/zoom
//! compositor.
//!
//! ## Features
//!
//! - **Tier planning**: both edge-doubling and extent-halving tier layouts,
//!   computed once per pyramid and shared immutably
//! - **Pure addressing**: deterministic linear tile indices, storage tile
//!   groups, and origin fetch URLs with no I/O
//! - **Tile materialization**: origin-clipped edge tiles padded onto
//!   canonical square surfaces, cached per rendering context
//! - **Tile lifetime**: an LRU store keeps hot tiles and their surface
//!   caches alive
//!
//! ## Architecture
//!
//! The library is organized into a few modules:
//!
//! - [`pyramid`] - Tier planning and tile address resolution (pure core)
//! - [`tile`] - Tile objects, load lifecycle, materialization, and the store
//! - [`source`] - The per-image source wiring everything together
//! - [`config`] - Source options and CLI types
//! - [`error`] - Typed construction and load errors
//!
//! ## Example
//!
//! ```
//! use pyramid_source::config::SourceOptions;
//! use pyramid_source::pyramid::{tile_group, TileCoord};
//! use pyramid_source::source::PyramidSource;
//!
//! let options = SourceOptions::new("https://origin.test/scan-42", [1000, 1000]);
//! let source = PyramidSource::new(options).unwrap();
//!
//! // Two tiers: the whole image in one tile, then 2x2 at full resolution.
//! assert_eq!(source.plan().tier_count(), 2);
//!
//! let (index, descriptor) = source.resolve(Some(TileCoord::new(1, 1, 0))).unwrap();
//! assert_eq!(index, 2);
//! assert_eq!(tile_group(index), 0);
//! assert_eq!(
//!     descriptor.to_url(source.base_url()),
//!     "https://origin.test/scan-42?512+0+512+512+1+80+s"
//! );
//! ```

pub mod config;
pub mod error;
pub mod pyramid;
pub mod source;
pub mod tile;

// Re-export commonly used types
pub use config::{Cli, Command, PlanConfig, SourceOptions, UrlConfig, DEFAULT_QUALITY, DEFAULT_TILE_EDGE};
pub use error::{ConfigError, LoadError};
pub use pyramid::{
    tile_group, FetchDescriptor, TierDescriptor, TierPlan, TieringPolicy, TileCoord,
    TILE_GROUP_SIZE,
};
pub use source::PyramidSource;
pub use tile::{
    materialize, ImageTile, TileLoader, TileState, TileStore, DEFAULT_CONTEXT,
    DEFAULT_TILE_STORE_CAPACITY,
};
