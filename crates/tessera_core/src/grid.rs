//! The map grid: a fixed-size rectangle of cells

use serde::{Deserialize, Serialize};

use crate::{Cell, IVec2, LayerKind, Rect, TileId};

/// A rectangular array of [`Cell`]s stored row-major.
///
/// Two access modes are offered:
/// - checked (`get*` / `set*`): reads outside the grid clamp to the nearest
///   edge cell, writes outside the grid are ignored
/// - unchecked (`*_unchecked`): the caller guarantees the position is in range;
///   an out-of-range position panics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct MapGrid {
    size: IVec2,
    cells: Vec<Cell>,
}

impl MapGrid {
    /// Create an empty grid.
    ///
    /// # Panics
    /// If `size` is not a valid grid size, see [`MapGrid::cell_count`].
    pub fn new(size: IVec2) -> Self {
        let Some(count) = Self::cell_count(size) else {
            panic!("map size {size} must be at least 1x1 with at most {} cells", i32::MAX);
        };
        Self {
            size,
            cells: vec![Cell::EMPTY; count],
        }
    }

    /// Number of cells in a grid of `size`, or `None` when `size` is smaller
    /// than 1x1 or its cell count does not fit an `i32`.
    pub fn cell_count(size: IVec2) -> Option<usize> {
        if size.min_element() < 1 {
            return None;
        }
        size.x.checked_mul(size.y).map(|count| count as usize)
    }

    /// Build a grid from row-major cells. Returns `None` if the size is not
    /// valid or the cell count does not match it.
    pub fn from_cells(size: IVec2, cells: Vec<Cell>) -> Option<Self> {
        if Self::cell_count(size) != Some(cells.len()) {
            return None;
        }
        Some(Self { size, cells })
    }

    pub fn size(&self) -> IVec2 {
        self.size
    }

    /// The whole grid as a rectangle starting at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(IVec2::ZERO, self.size)
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        pos.is_within(self.size)
    }

    /// Row-major cells.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn flat_index(&self, pos: IVec2) -> usize {
        (pos.x + self.size.x * pos.y) as usize
    }

    fn clamp_pos(&self, pos: IVec2) -> IVec2 {
        pos.clamp(IVec2::ZERO, self.size - IVec2::ONE)
    }

    pub fn get(&self, pos: IVec2) -> Cell {
        self.cells[self.flat_index(self.clamp_pos(pos))]
    }

    pub fn get_layer(&self, pos: IVec2, layer: LayerKind) -> Option<TileId> {
        self.get(pos).get(layer)
    }

    pub fn set(&mut self, pos: IVec2, cell: Cell) {
        if self.contains(pos) {
            self.set_unchecked(pos, cell);
        }
    }

    pub fn set_layer(&mut self, pos: IVec2, layer: LayerKind, id: Option<TileId>) {
        if self.contains(pos) {
            let index = self.flat_index(pos);
            self.cells[index].set(layer, id);
        }
    }

    pub fn get_unchecked(&self, pos: IVec2) -> Cell {
        assert!(self.contains(pos), "cell {pos} is outside the {} map", self.size);
        self.cells[self.flat_index(pos)]
    }

    pub fn set_unchecked(&mut self, pos: IVec2, cell: Cell) {
        assert!(self.contains(pos), "cell {pos} is outside the {} map", self.size);
        let index = self.flat_index(pos);
        self.cells[index] = cell;
    }

    /// `true` if any layer of the (clamped) cell holds a tile.
    pub fn any_tile_at(&self, pos: IVec2) -> bool {
        !self.get(pos).is_empty()
    }

    /// Ids of one layer in row-major order.
    pub fn layer_ids(&self, layer: LayerKind) -> impl Iterator<Item = Option<TileId>> + '_ {
        self.cells.iter().map(move |cell| cell.get(layer))
    }

    /// Replace every tile id through `f`, leaving empty slots empty.
    pub fn remap_ids(&mut self, mut f: impl FnMut(TileId) -> Option<TileId>) {
        for cell in &mut self.cells {
            for layer in LayerKind::ALL {
                let slot = cell.slot_mut(layer);
                *slot = slot.and_then(&mut f);
            }
        }
    }

    /// Resize the grid, moving old content by `offset`.
    ///
    /// Content that lands outside the new bounds is dropped, new cells are empty.
    /// Returns `false` (leaving the grid untouched) when nothing would change or
    /// the new size is not valid.
    pub fn resize(&mut self, new_size: IVec2, offset: IVec2) -> bool {
        if new_size == self.size && offset == IVec2::ZERO {
            return false;
        }
        if Self::cell_count(new_size).is_none() {
            return false;
        }

        let mut resized = MapGrid::new(new_size);

        let a = IVec2::ZERO.max(-offset);
        let b = (new_size - offset).min(self.size);
        for pos in Rect::new(a, b - a).iter() {
            resized.set_unchecked(pos + offset, self.get_unchecked(pos));
        }

        *self = resized;
        true
    }
}

/// Unchecked serde form of [`MapGrid`].
#[derive(Deserialize)]
struct RawGrid {
    size: IVec2,
    cells: Vec<Cell>,
}

impl TryFrom<RawGrid> for MapGrid {
    type Error = String;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        let RawGrid { size, cells } = raw;
        let len = cells.len();
        MapGrid::from_cells(size, cells)
            .ok_or_else(|| format!("{len} cells do not form a {size} map"))
    }
}

impl Default for MapGrid {
    fn default() -> Self {
        Self::new(IVec2::splat(10))
    }
}
