//! The process-wide "current catalog".

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{load_tiling, Catalog, TilingError};

/// Owns the catalog compiled from one file and swaps it wholesale on reload.
///
/// Readers take an [`Arc`] snapshot through [`current`](Self::current); a
/// snapshot stays valid (and unchanged) even after a later reload.
#[derive(Debug, Clone)]
pub struct TilingHandle {
    path: PathBuf,
    current: Arc<Catalog>,
}

impl TilingHandle {
    /// First load. An error here is meant to be fatal for the caller.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, TilingError> {
        let path = path.into();
        let catalog = load_tiling(&path)?;
        tracing::info!(
            "loaded tiling catalog {} ({} tiles, {} variants)",
            path.display(),
            catalog.tile_count(),
            catalog.index_count()
        );
        Ok(Self {
            path,
            current: Arc::new(catalog),
        })
    }

    /// Wrap an already compiled catalog.
    pub fn from_catalog(path: impl Into<PathBuf>, catalog: Catalog) -> Self {
        Self {
            path: path.into(),
            current: Arc::new(catalog),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Arc<Catalog> {
        Arc::clone(&self.current)
    }

    /// Re-read and recompile the catalog file.
    ///
    /// The new catalog replaces the current one only if it compiles. On
    /// failure the previous catalog stays current and the error is returned
    /// as a diagnostic.
    pub fn reload(&mut self) -> Result<Arc<Catalog>, TilingError> {
        match load_tiling(&self.path) {
            Ok(catalog) => {
                tracing::info!(
                    "reloaded tiling catalog {} ({} tiles, {} variants)",
                    self.path.display(),
                    catalog.tile_count(),
                    catalog.index_count()
                );
                self.current = Arc::new(catalog);
                Ok(self.current())
            }
            Err(err) => {
                tracing::warn!(
                    "tiling reload of {} rejected, keeping the previous catalog: {err}",
                    self.path.display()
                );
                Err(err)
            }
        }
    }
}
