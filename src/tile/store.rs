//! Coordinate-keyed tile store with LRU eviction.
//!
//! Repeated requests for the same coordinate must land on the same
//! [`ImageTile`] object, otherwise its per-context surface cache never gets a
//! hit. The store keeps recently used tiles alive and discards the least
//! recently used one when full; discarding a tile drops its surfaces with it.
//!
//! The store is single-writer, owned by the rendering loop that drives it.

use std::num::NonZeroUsize;

use lru::LruCache;

use crate::pyramid::TileCoord;

use super::image_tile::ImageTile;

/// Default number of tiles kept alive.
pub const DEFAULT_TILE_STORE_CAPACITY: usize = 2048;

/// LRU store of tile objects keyed by pyramid coordinate.
pub struct TileStore {
    tiles: LruCache<TileCoord, ImageTile>,
}

impl TileStore {
    /// Create a store with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TILE_STORE_CAPACITY)
    }

    /// Create a store holding at most `capacity` tiles.
    ///
    /// # Panics
    ///
    /// Panics when `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tiles: LruCache::new(NonZeroUsize::new(capacity).expect("capacity must be > 0")),
        }
    }

    /// The tile at a coordinate, marking it recently used.
    pub fn get_mut(&mut self, coord: TileCoord) -> Option<&mut ImageTile> {
        self.tiles.get_mut(&coord)
    }

    /// The tile at a coordinate, creating it on first request.
    ///
    /// The least recently used tile is evicted when the store is full.
    pub fn get_or_create<F>(&mut self, coord: TileCoord, create: F) -> &mut ImageTile
    where
        F: FnOnce() -> ImageTile,
    {
        self.tiles.get_or_insert_mut(coord, create)
    }

    /// Whether a tile exists without touching LRU order.
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.tiles.contains(&coord)
    }

    /// Remove a tile, returning it if present.
    pub fn remove(&mut self, coord: TileCoord) -> Option<ImageTile> {
        self.tiles.pop(&coord)
    }

    /// Number of tiles currently alive.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the store holds no tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Maximum number of tiles kept alive.
    pub fn capacity(&self) -> usize {
        self.tiles.cap().get()
    }

    /// Drop every tile and its cached surfaces.
    pub fn clear(&mut self) {
        self.tiles.clear();
    }
}

impl Default for TileStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
