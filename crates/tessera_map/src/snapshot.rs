//! The logical on-disk form of a map, shared by both file formats.

use serde::{Deserialize, Serialize};
use tessera_core::{Cell, IVec2, LayerKind, MapGrid, TileId};
use tessera_tiling::Catalog;

use crate::PersistError;

/// A map with its tile ids replaced by indices into a name table.
///
/// Entry `i` of the name table is the (`tile_names[i]`, `variant_names[i]`)
/// pair. Saving writes the whole catalog as the table, indexed by global id.
/// Loading resolves each pair once against the live catalog, so reordered or
/// added tiles do not disturb old saves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub size: IVec2,
    pub tile_names: Vec<String>,
    pub variant_names: Vec<String>,
    /// One row-major array per layer, in front, mid, back order.
    pub layers: [Vec<Option<u32>>; LayerKind::COUNT],
}

impl MapSnapshot {
    pub fn capture(grid: &MapGrid, catalog: &Catalog) -> Self {
        let (tile_names, variant_names): (Vec<String>, Vec<String>) = catalog
            .tile_infos()
            .iter()
            .map(|info| (info.tile_name.clone(), info.variant_name.clone()))
            .unzip();

        let layers: [Vec<Option<u32>>; LayerKind::COUNT] =
            LayerKind::ALL.map(|layer| grid.layer_ids(layer).map(|id| id.map(|t| t.0)).collect());

        Self {
            size: grid.size(),
            tile_names,
            variant_names,
            layers,
        }
    }

    /// Rebuild a grid against `catalog`.
    ///
    /// Name pairs the catalog no longer has, and indices past the end of the
    /// name table, become empty cells.
    pub fn restore(&self, catalog: &Catalog) -> Result<MapGrid, PersistError> {
        if self.tile_names.len() != self.variant_names.len() {
            return Err(PersistError::Inconsistent(format!(
                "{} tile names but {} variant names",
                self.tile_names.len(),
                self.variant_names.len()
            )));
        }
        let Some(cell_count) = MapGrid::cell_count(self.size) else {
            return Err(PersistError::Inconsistent(format!("map size {}", self.size)));
        };
        if let Some(layer) = self.layers.iter().position(|ids| ids.len() != cell_count) {
            return Err(PersistError::Inconsistent(format!(
                "{} layer has {} cells, expected {cell_count}",
                LayerKind::ALL[layer],
                self.layers[layer].len()
            )));
        }

        let mapping: Vec<Option<TileId>> = self
            .tile_names
            .iter()
            .zip(&self.variant_names)
            .map(|(tile, variant)| catalog.index_by_name(tile, variant))
            .collect();
        let resolve = |stored: Option<u32>| {
            stored.and_then(|index| mapping.get(index as usize).copied().flatten())
        };

        let dropped = mapping.iter().filter(|id| id.is_none()).count();
        if dropped > 0 {
            tracing::debug!("{dropped} stored tile variants are not in the current catalog");
        }

        let cells = (0..cell_count)
            .map(|i| {
                let mut cell = Cell::EMPTY;
                for (layer, ids) in LayerKind::ALL.into_iter().zip(&self.layers) {
                    cell.set(layer, resolve(ids[i]));
                }
                cell
            })
            .collect();

        MapGrid::from_cells(self.size, cells)
            .ok_or_else(|| PersistError::Inconsistent("cell count does not match size".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_tiling::parse_tiling;

    fn catalog(extra_tile: bool) -> Catalog {
        let extra = if extra_tile {
            r#"{ "name": "moss", "layer": "front", "default": "a", "display": "a",
                 "variants": [{ "name": "a", "texture": [0, 1] }] },"#
        } else {
            ""
        };
        parse_tiling(&format!(
            r#"{{ "tiles": [
                {extra}
                {{ "name": "stone", "layer": "mid", "default": "a", "display": "a",
                   "variants": [{{ "name": "a", "texture": [0, 0] }}, {{ "name": "b", "texture": [1, 0] }}] }}
            ] }}"#
        ))
        .unwrap()
    }

    #[test]
    fn capture_then_restore_is_identity() {
        let catalog = catalog(true);
        let mut grid = MapGrid::new(IVec2::new(3, 2));
        grid.set_layer(IVec2::new(0, 0), LayerKind::Mid, catalog.index_by_name("stone", "b"));
        grid.set_layer(IVec2::new(2, 1), LayerKind::Front, catalog.index_by_name("moss", "a"));

        let snapshot = MapSnapshot::capture(&grid, &catalog);
        assert_eq!(snapshot.tile_names.len(), catalog.index_count());
        assert_eq!(snapshot.restore(&catalog).unwrap(), grid);
    }

    #[test]
    fn restore_follows_names_not_ids() {
        let old = catalog(true);
        let new = catalog(false);
        let mut grid = MapGrid::new(IVec2::new(2, 1));
        grid.set_layer(IVec2::new(0, 0), LayerKind::Mid, old.index_by_name("stone", "b"));
        grid.set_layer(IVec2::new(1, 0), LayerKind::Front, old.index_by_name("moss", "a"));

        let restored = MapSnapshot::capture(&grid, &old).restore(&new).unwrap();
        assert_eq!(
            restored.get_layer(IVec2::new(0, 0), LayerKind::Mid),
            new.index_by_name("stone", "b")
        );
        assert_eq!(restored.get_layer(IVec2::new(1, 0), LayerKind::Front), None);
    }

    #[test]
    fn inconsistent_snapshots_are_rejected() {
        let catalog = catalog(false);
        let good = MapSnapshot::capture(&MapGrid::new(IVec2::new(2, 2)), &catalog);

        let mut bad = good.clone();
        bad.variant_names.pop();
        assert!(matches!(bad.restore(&catalog), Err(PersistError::Inconsistent(_))));

        let mut bad = good.clone();
        bad.layers[1].push(None);
        assert!(matches!(bad.restore(&catalog), Err(PersistError::Inconsistent(_))));

        let mut bad = good.clone();
        bad.size = IVec2::new(0, 4);
        assert!(matches!(bad.restore(&catalog), Err(PersistError::Inconsistent(_))));

        // 65536 * 65537 wraps to 65536 in 32 bits.
        let mut bad = good;
        bad.size = IVec2::new(65536, 65537);
        bad.layers = std::array::from_fn(|_| vec![None; 65536]);
        assert!(matches!(bad.restore(&catalog), Err(PersistError::Inconsistent(_))));
    }

    #[test]
    fn out_of_table_index_becomes_empty() {
        let catalog = catalog(false);
        let mut snapshot = MapSnapshot::capture(&MapGrid::new(IVec2::new(1, 1)), &catalog);
        snapshot.layers[0][0] = Some(99);
        let grid = snapshot.restore(&catalog).unwrap();
        assert!(grid.get(IVec2::ZERO).is_empty());
    }
}
