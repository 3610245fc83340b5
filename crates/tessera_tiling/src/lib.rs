//! Tiling rule catalog for tessera
//!
//! A catalog file declares flags, tile groups and tiles. Each tile owns a set
//! of visual variants and an ordered list of rules that pick a variant from
//! the cell's neighborhood. This crate parses that file, validates it and
//! compiles it into a [`Catalog`] with dense global variant ids.
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_tiling::{load_tiling, TilingHandle};
//!
//! // One-shot compile
//! let catalog = load_tiling("tiles.json".as_ref())?;
//! let id = catalog.index_by_name("grass", "center");
//!
//! // Reloadable, keeps the last good catalog on failure
//! let mut handle = TilingHandle::load("tiles.json")?;
//! handle.reload()?;
//! ```

mod catalog;
mod compile;
mod handle;
mod types;

pub use catalog::*;
pub use compile::compile;
pub use handle::TilingHandle;
pub use types::*;

use std::path::Path;
use thiserror::Error;

/// A catalog that parsed but failed one of the structural checks.
///
/// The message names the offending entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Errors that can occur when loading a catalog
#[derive(Debug, Error)]
pub enum TilingError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid catalog: {0}")]
    Validation(#[from] ValidationError),
}

/// Parse and compile a catalog from a JSON string
pub fn parse_tiling(json: &str) -> Result<Catalog, TilingError> {
    let config: TilingConfig = serde_json::from_str(json)?;
    Ok(compile(config)?)
}

/// Load and compile a catalog from a JSON file
pub fn load_tiling(path: &Path) -> Result<Catalog, TilingError> {
    let content = std::fs::read_to_string(path)?;
    parse_tiling(&content)
}
