//! The map store: owns the grid and the file it lives in.

use std::path::{Path, PathBuf};

use tessera_core::{IVec2, LayerKind, MapGrid, Rect, TileId};
use tessera_tiling::Catalog;

use crate::autotile::{run_autotiler, run_autotiler_for_entire_map, RandomSource};
use crate::persist::{read_snapshot, write_snapshot, Format};
use crate::{MapSnapshot, PersistError};

/// Where the grid held by a [`MapStore`] came from when it was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapOrigin {
    Compact,
    /// Migrated from the text form and re-saved as compact.
    Text,
    /// Nothing could be loaded.
    Blank,
}

/// The map grid plus the file it is saved to.
///
/// The grid is only changed through the store's own operations. Every edit
/// reruns the autotiler over the touched area before returning.
#[derive(Debug, Clone)]
pub struct MapStore {
    pub(crate) grid: MapGrid,
    file_name: PathBuf,
    compress: bool,
    origin: MapOrigin,
}

impl MapStore {
    /// A store holding `grid`, saved to `file_name`.
    pub fn new(grid: MapGrid, file_name: impl Into<PathBuf>) -> Self {
        Self {
            grid,
            file_name: file_name.into(),
            compress: true,
            origin: MapOrigin::Blank,
        }
    }

    /// Load the map at `file_name`, trying the compact file, then the text
    /// file, then falling back to a blank grid of `default_size`.
    ///
    /// A map recovered from the text file is immediately re-saved compact.
    pub fn open(
        file_name: impl Into<PathBuf>,
        catalog: &Catalog,
        default_size: IVec2,
        compress: bool,
    ) -> Self {
        let blank = match MapGrid::cell_count(default_size) {
            Some(_) => MapGrid::new(default_size),
            None => {
                tracing::warn!("default map size {default_size} is not usable, using 10x10");
                MapGrid::default()
            }
        };
        let mut store = Self::new(blank, file_name);
        store.compress = compress;

        match store.load(catalog, Format::Compact) {
            Ok(()) => {
                store.origin = MapOrigin::Compact;
                return store;
            }
            Err(err) => tracing::warn!(
                "could not load compact map {}: {err}",
                store.file_name.display()
            ),
        }

        match store.load(catalog, Format::Text) {
            Ok(()) => {
                store.origin = MapOrigin::Text;
                if let Err(err) = store.save(catalog, Format::Compact) {
                    tracing::warn!("could not re-save migrated map as compact: {err}");
                }
                return store;
            }
            Err(err) => tracing::warn!(
                "could not load text map {}: {err}",
                Format::Text.path_for(&store.file_name).display()
            ),
        }

        tracing::warn!("starting with a blank {} map", store.grid.size());
        store
    }

    pub fn grid(&self) -> &MapGrid {
        &self.grid
    }

    pub fn size(&self) -> IVec2 {
        self.grid.size()
    }

    pub fn origin(&self) -> MapOrigin {
        self.origin
    }

    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    pub fn set_file_name(&mut self, file_name: impl Into<PathBuf>) {
        self.file_name = file_name.into();
    }

    pub fn compress(&self) -> bool {
        self.compress
    }

    pub fn set_compress(&mut self, compress: bool) {
        self.compress = compress;
    }

    /// Id on `layer` at `pos`, reading past the border clamps.
    pub fn get(&self, pos: IVec2, layer: LayerKind) -> Option<TileId> {
        self.grid.get_layer(pos, layer)
    }

    pub fn save(&self, catalog: &Catalog, format: Format) -> Result<(), PersistError> {
        let snapshot = MapSnapshot::capture(&self.grid, catalog);
        let path = write_snapshot(&self.file_name, format, &snapshot, self.compress)?;
        tracing::info!("saved {} map to {}", self.grid.size(), path.display());
        Ok(())
    }

    /// Replace the grid with the one stored in `format`. On error the current
    /// grid is kept.
    pub fn load(&mut self, catalog: &Catalog, format: Format) -> Result<(), PersistError> {
        let snapshot = read_snapshot(&self.file_name, format)?;
        self.grid = snapshot.restore(catalog)?;
        tracing::info!(
            "loaded {} map from {}",
            self.grid.size(),
            format.path_for(&self.file_name).display()
        );
        Ok(())
    }

    /// Resize the map, moving its content by `offset`. Returns `false` when
    /// nothing changed.
    pub fn resize(&mut self, new_size: IVec2, offset: IVec2) -> bool {
        let old_size = self.grid.size();
        let resized = self.grid.resize(new_size, offset);
        if resized {
            tracing::info!("resized map from {old_size} to {new_size} (offset {offset})");
        }
        resized
    }

    /// Re-resolve every id from `old` to `new` by (tile, variant) name, then
    /// re-autotile the whole map. Names `new` lacks become empty.
    pub fn rebind(&mut self, old: &Catalog, new: &Catalog, rng: &mut impl RandomSource) {
        self.grid.remap_ids(|id| {
            old.try_tile_info(id)
                .and_then(|info| new.index_by_name(&info.tile_name, &info.variant_name))
        });
        self.retile(new, rng);
    }

    /// Re-autotile every cell.
    pub fn retile(&mut self, catalog: &Catalog, rng: &mut impl RandomSource) {
        run_autotiler_for_entire_map(&mut self.grid, catalog, rng);
    }

    /// Re-autotile `region` and its neighborhood.
    pub fn retile_region(&mut self, catalog: &Catalog, region: Rect, rng: &mut impl RandomSource) {
        run_autotiler(&mut self.grid, catalog, region, rng);
    }
}
