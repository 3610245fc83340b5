//! Editing units: each mutates the grid and then reruns the autotiler over
//! the touched rectangle.

use tessera_core::{Cell, IVec2, LayerKind, MapGrid, Rect, TileId};
use tessera_tiling::Catalog;

use crate::autotile::RandomSource;
use crate::MapStore;

/// Which layers an area operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerFilter {
    #[default]
    All,
    Only(LayerKind),
}

impl LayerFilter {
    pub fn includes(self, layer: LayerKind) -> bool {
        match self {
            LayerFilter::All => true,
            LayerFilter::Only(only) => only == layer,
        }
    }
}

impl From<Option<LayerKind>> for LayerFilter {
    fn from(layer: Option<LayerKind>) -> Self {
        layer.map_or(LayerFilter::All, LayerFilter::Only)
    }
}

/// A rectangle of cells picked up from the map (or from the tile picker).
///
/// Tiles in a brush are always at their default variant; pasting lets the
/// autotiler choose the real ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brush {
    grid: MapGrid,
}

impl Brush {
    pub fn size(&self) -> IVec2 {
        self.grid.size()
    }

    pub fn cells(&self) -> &[Cell] {
        self.grid.cells()
    }

    pub fn get(&self, pos: IVec2) -> Cell {
        self.grid.get(pos)
    }

    pub fn is_empty(&self) -> bool {
        self.grid.cells().iter().all(Cell::is_empty)
    }
}

/// The default variant of the tile `id` belongs to.
fn reset_to_default(catalog: &Catalog, id: TileId) -> Option<TileId> {
    let info = catalog.try_tile_info(id)?;
    Some(catalog.default_variant(info.tile_index).global_index)
}

impl MapStore {
    /// Put `tile_index` (at its default variant) on its layer at `pos`.
    ///
    /// # Panics
    /// If `tile_index` is not a tile of `catalog`.
    pub fn place(
        &mut self,
        catalog: &Catalog,
        rng: &mut impl RandomSource,
        pos: IVec2,
        tile_index: usize,
    ) {
        if !self.grid.contains(pos) {
            return;
        }
        let tile = catalog.tile_by_index(tile_index);
        self.grid
            .set_layer(pos, tile.layer, Some(tile.default_variant().global_index));
        self.retile_region(catalog, Rect::new(pos, IVec2::ONE), rng);
    }

    /// A 1x1 brush holding `tile_index` on its layer.
    ///
    /// # Panics
    /// If `tile_index` is not a tile of `catalog`.
    pub fn grab_tile(catalog: &Catalog, tile_index: usize) -> Brush {
        let tile = catalog.tile_by_index(tile_index);
        let mut grid = MapGrid::new(IVec2::ONE);
        grid.set_layer(IVec2::ZERO, tile.layer, Some(tile.default_variant().global_index));
        Brush { grid }
    }

    /// Copy the rectangle spanned by corners `a` and `b` (inclusive, any order)
    /// into a brush. The rectangle is clipped to the map; `None` if nothing
    /// of it lies inside.
    pub fn grab_area(
        &self,
        catalog: &Catalog,
        a: IVec2,
        b: IVec2,
        filter: LayerFilter,
    ) -> Option<Brush> {
        let area = Rect::from_corners(a, b).intersect(&self.grid.bounds())?;
        let mut grid = MapGrid::new(area.size);
        for pos in area.iter() {
            let source = self.grid.get_unchecked(pos);
            for layer in LayerKind::ALL.into_iter().filter(|l| filter.includes(*l)) {
                let id = source.get(layer).and_then(|id| reset_to_default(catalog, id));
                grid.set_layer(pos - area.pos, layer, id);
            }
        }
        Some(Brush { grid })
    }

    /// Stamp `brush` with its top-left cell at `offset`. Only occupied brush
    /// slots are written; cells falling outside the map are dropped.
    pub fn paste(
        &mut self,
        catalog: &Catalog,
        rng: &mut impl RandomSource,
        brush: &Brush,
        offset: IVec2,
    ) {
        for pos in brush.grid.bounds().iter() {
            for (layer, id) in brush.grid.get_unchecked(pos).occupied() {
                self.grid.set_layer(pos + offset, layer, Some(id));
            }
        }
        self.retile_region(catalog, Rect::new(offset, brush.size()), rng);
    }

    /// Clear the filtered layers in the rectangle spanned by `a` and `b`
    /// (inclusive, any order).
    pub fn erase_area(
        &mut self,
        catalog: &Catalog,
        rng: &mut impl RandomSource,
        a: IVec2,
        b: IVec2,
        filter: LayerFilter,
    ) {
        let Some(area) = Rect::from_corners(a, b).intersect(&self.grid.bounds()) else {
            return;
        };
        for pos in area.iter() {
            for layer in LayerKind::ALL.into_iter().filter(|l| filter.includes(*l)) {
                self.grid.set_layer(pos, layer, None);
            }
        }
        self.retile_region(catalog, area, rng);
    }
}

/// Tiles offered by a picker for `filter`: the layer's tiles in catalog file
/// order, or every tile for [`LayerFilter::All`].
pub fn available_tiles(catalog: &Catalog, filter: LayerFilter) -> Vec<usize> {
    match filter {
        LayerFilter::All => (0..catalog.tile_count()).collect(),
        LayerFilter::Only(layer) => catalog.tile_indices_for_layer(layer).to_vec(),
    }
}
