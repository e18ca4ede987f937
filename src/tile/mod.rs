//! Tile objects, materialization, and lifetime management.
//!
//! A tile request flows through three pieces:
//!
//! - [`TileLoader`]: the transport capability that fetches a resolved URL
//!   and delivers a decoded image (external collaborator).
//! - [`ImageTile`]: one tile's coordinate, URL, load state, and per-context
//!   cache of materialized surfaces.
//! - [`TileStore`]: keeps recently used tiles alive so repeated draws hit
//!   their surface caches, evicting least recently used tiles.
//!
//! Materialization normalizes origin-clipped edge tiles onto canonical
//! fixed-size surfaces so the compositor never sees a partial tile.

mod image_tile;
mod loader;
mod store;

pub use image_tile::{materialize, ImageTile, DEFAULT_CONTEXT};
pub use loader::{TileLoader, TileState};
pub use store::{TileStore, DEFAULT_TILE_STORE_CAPACITY};
