//! Layer selector and per-cell tile references

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three parallel tile planes of a map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Front,
    Mid,
    Back,
}

impl LayerKind {
    /// All layers, in storage order.
    pub const ALL: [LayerKind; 3] = [LayerKind::Front, LayerKind::Mid, LayerKind::Back];
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this layer in [`LayerKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            LayerKind::Front => 0,
            LayerKind::Mid => 1,
            LayerKind::Back => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Front => "front",
            LayerKind::Mid => "mid",
            LayerKind::Back => "back",
        }
    }

    /// Parse a layer name as written in catalog files.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layer| layer.name() == name)
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A global variant id: the dense index of one (tile, variant) pair in the
/// catalog that produced it. Not stable across catalog edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u32);

impl TileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The contents of one map cell: an optional tile on each layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub front: Option<TileId>,
    pub mid: Option<TileId>,
    pub back: Option<TileId>,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        front: None,
        mid: None,
        back: None,
    };

    pub fn get(&self, layer: LayerKind) -> Option<TileId> {
        match layer {
            LayerKind::Front => self.front,
            LayerKind::Mid => self.mid,
            LayerKind::Back => self.back,
        }
    }

    pub fn slot_mut(&mut self, layer: LayerKind) -> &mut Option<TileId> {
        match layer {
            LayerKind::Front => &mut self.front,
            LayerKind::Mid => &mut self.mid,
            LayerKind::Back => &mut self.back,
        }
    }

    pub fn set(&mut self, layer: LayerKind, id: Option<TileId>) {
        *self.slot_mut(layer) = id;
    }

    /// Occupied layers with their ids.
    pub fn occupied(&self) -> impl Iterator<Item = (LayerKind, TileId)> + '_ {
        LayerKind::ALL
            .into_iter()
            .filter_map(|layer| self.get(layer).map(|id| (layer, id)))
    }

    pub fn is_empty(&self) -> bool {
        self.occupied().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_selector_addresses_matching_field() {
        let mut cell = Cell::EMPTY;
        cell.set(LayerKind::Mid, Some(TileId(4)));
        assert_eq!(cell.mid, Some(TileId(4)));
        assert_eq!(cell.get(LayerKind::Front), None);
        assert_eq!(cell.get(LayerKind::Mid), Some(TileId(4)));
        assert!(!cell.is_empty());
        assert_eq!(cell.occupied().collect::<Vec<_>>(), vec![(LayerKind::Mid, TileId(4))]);
    }

    #[test]
    fn layer_names_round_trip() {
        for layer in LayerKind::ALL {
            assert_eq!(LayerKind::from_name(layer.name()), Some(layer));
            assert_eq!(LayerKind::ALL[layer.index()], layer);
        }
        assert_eq!(LayerKind::from_name("middle"), None);
    }
}
