//! Pyramid tier planning and tile addressing.
//!
//! This module is the pure core of the crate. [`TierPlan`] captures the tier
//! layout of one image pyramid; the resolver maps tile coordinates onto
//! linear indices and origin fetch descriptors against a finished plan.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  extent + policy + tile edge             │
//! └────────────────────┬─────────────────────┘
//!                      ▼
//! ┌──────────────────────────────────────────┐
//! │  TierPlan          (built once,          │
//! │                     immutable, shared)   │
//! └────────────────────┬─────────────────────┘
//!                      ▼  per tile request
//! ┌──────────────────────────────────────────┐
//! │  linear index + FetchDescriptor + URL    │
//! └──────────────────────────────────────────┘
//! ```

mod plan;
mod resolver;

pub use plan::{TierDescriptor, TierPlan, TieringPolicy};
pub use resolver::{tile_group, FetchDescriptor, TileCoord, TILE_GROUP_SIZE};
