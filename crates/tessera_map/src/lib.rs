//! Map storage and autotiling for tessera
//!
//! This crate owns the map side of the tile engine:
//! - [`autotile`] - picks each cell's variant from its neighborhood using the
//!   rules of a [`Catalog`](tessera_tiling::Catalog)
//! - [`MapStore`] - the grid plus its file; every edit reruns the autotiler
//! - [`persist`] - the compact binary and forward compatible text map formats
//! - [`ProjectConfig`] - `tessera.toml`
//! - [`Session`] - catalog handle, map and random source owned together
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_map::{ProjectConfig, Session, Format};
//!
//! let config = ProjectConfig::load("tessera.toml".as_ref())?;
//! let mut session = Session::open(&config)?;
//! let grass = session.catalog().tile_index("grass").unwrap();
//! session.place(IVec2::new(3, 4), grass);
//! session.save(Format::Compact)?;
//! ```

pub mod autotile;
mod config;
mod edit;
pub mod persist;
mod session;
mod snapshot;
mod store;

pub use autotile::{RandomSource, RngSource};
pub use config::{AutotileSection, CatalogSection, ConfigError, MapSection, ProjectConfig, CONFIG_FILE};
pub use edit::{available_tiles, Brush, LayerFilter};
pub use persist::{Format, PersistError};
pub use session::Session;
pub use snapshot::MapSnapshot;
pub use store::{MapOrigin, MapStore};
