//! Core data structures for tessera
//!
//! This crate provides the plain-data building blocks shared by the tiling
//! catalog and the map store:
//! - `IVec2` / `IMat2` / `Rect` - integer grid math
//! - `LayerKind` - the three parallel tile planes (front, mid, back)
//! - `TileId` / `Cell` - per-cell tile references
//! - `MapGrid` - a fixed-size 2D grid of cells with resize support
//! - `names` - helpers for name-sorted vectors used as associative sets

mod grid;
mod layer;
mod math;
pub mod names;

pub use grid::MapGrid;
pub use layer::{Cell, LayerKind, TileId};
pub use math::{IMat2, IVec2, Rect};
