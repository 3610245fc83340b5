//! The compiled, validated tiling catalog.
//!
//! Every table here is built by [`compile`](crate::compile) and is read-only
//! afterwards. Tiles, groups and flags are sorted by name; global variant ids
//! are dense and assigned in (tile name, variant name) order.

use std::collections::{BTreeMap, BTreeSet};

use tessera_core::names::{self, Named};
use tessera_core::{IVec2, LayerKind, TileId};
use uuid::Uuid;

/// Texture sheet extent, in cells.
pub const SHEET_SIZE: IVec2 = IVec2::splat(32);
/// Pixel position of the texture sheet inside the texture atlas.
pub const SHEET_PIXEL_ORIGIN: IVec2 = IVec2::new(0, 512);
/// Edge length of one sheet cell / map cell, in pixels.
pub const TILE_PIXELS: i32 = 12;

// ─── Groups ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
    /// Member tile names, sorted.
    pub tiles: Vec<String>,
    /// Member tile indices, sorted.
    pub indices: Vec<usize>,
}

impl Group {
    pub fn contains_name(&self, name: &str) -> bool {
        names::contains_name(&self.tiles, name)
    }

    pub fn contains_index(&self, tile_index: usize) -> bool {
        self.indices.binary_search(&tile_index).is_ok()
    }
}

impl Named for Group {
    fn name(&self) -> &str {
        &self.name
    }
}

// ─── Variants ────────────────────────────────────────────────────────────────

/// One visual rendering of a tile.
#[derive(Debug, Clone)]
pub struct TileVariant {
    pub name: String,
    /// Sheet cell of the top-left corner.
    pub texture: IVec2,
    /// Size in sheet cells.
    pub size: IVec2,
    /// Draw offset relative to the grid cell, in cells.
    pub offset: IVec2,
    pub tex_offset: IVec2,
    /// Assigned once all tiles are sorted.
    pub global_index: TileId,
    pub(crate) small: bool,
    pub(crate) texture_pixel_pos: IVec2,
    pub(crate) texture_pixel_size: IVec2,
    pub(crate) texture_pixel_offset: IVec2,
}

impl TileVariant {
    /// Exactly one sheet cell.
    pub fn small(&self) -> bool {
        self.small
    }

    /// Pixel position in the texture atlas.
    pub fn texture_pos(&self) -> IVec2 {
        self.texture_pixel_pos
    }

    pub fn texture_size(&self) -> IVec2 {
        self.texture_pixel_size
    }

    /// Pixel draw offset relative to the grid cell.
    pub fn texture_offset(&self) -> IVec2 {
        self.texture_pixel_offset
    }
}

impl Named for TileVariant {
    fn name(&self) -> &str {
        &self.name
    }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// One weighted outcome of a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleResult {
    pub name: String,
    /// Normalized selection weight.
    pub chance: f32,
    /// Variant index within the owning tile.
    pub variant: usize,
}

/// What a requirement looks for at its offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementTarget {
    /// Any tile on any layer.
    Any,
    /// This exact tile on its own layer.
    Tile(usize),
    /// Any member of the group, on any layer.
    Group(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub name: String,
    /// Relative to the evaluated cell.
    pub offset: IVec2,
    pub target: RequirementTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuloPosition {
    pub size: IVec2,
    pub offsets: BTreeSet<IVec2>,
    pub(crate) active: bool,
}

impl ModuloPosition {
    /// The filter only applies when its period is not 1x1.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `true` if the filter is inactive or `pos mod size` is an allowed remainder.
    pub fn matches(&self, pos: IVec2) -> bool {
        !self.active || self.offsets.contains(&pos.rem_euclid(self.size))
    }
}

#[derive(Debug, Clone)]
pub struct TileRule {
    /// Position of the authored rule this one came from; clones made by
    /// `duplicate` share it.
    pub original_index: usize,
    pub results: Vec<RuleResult>,
    pub requires: Vec<Requirement>,
    pub requires_not: Vec<Requirement>,
    /// Sorted variant indices; empty means the rule applies to any variant.
    pub req_variants: Vec<usize>,
    pub modulo_pos: ModuloPosition,
}

impl TileRule {
    pub fn can_be_applied_to_variant(&self, variant_index: usize) -> bool {
        self.req_variants.is_empty() || self.req_variants.binary_search(&variant_index).is_ok()
    }

    /// Requirements of both polarities.
    pub fn all_requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.requires.iter().chain(self.requires_not.iter())
    }
}

// ─── Tiles ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Tile {
    pub name: String,
    pub layer: LayerKind,
    pub flags: BTreeSet<String>,
    /// Position in the catalog file.
    pub original_index: usize,
    /// Sorted by name.
    pub variants: Vec<TileVariant>,
    /// In match priority order, duplicates expanded.
    pub rules: Vec<TileRule>,
    pub(crate) flag_bits: Vec<bool>,
    pub(crate) default_variant: usize,
    pub(crate) display_variant: usize,
}

impl Tile {
    pub fn has_flag(&self, flag_index: usize) -> bool {
        self.flag_bits.get(flag_index).copied().unwrap_or(false)
    }

    pub fn variant_index(&self, name: &str) -> Option<usize> {
        names::index_by_name(&self.variants, name)
    }

    pub fn variant(&self, name: &str) -> Option<&TileVariant> {
        self.variant_index(name).map(|i| &self.variants[i])
    }

    pub fn default_variant_index(&self) -> usize {
        self.default_variant
    }

    pub fn display_variant_index(&self) -> usize {
        self.display_variant
    }

    pub fn default_variant(&self) -> &TileVariant {
        &self.variants[self.default_variant]
    }

    pub fn display_variant(&self) -> &TileVariant {
        &self.variants[self.display_variant]
    }
}

impl Named for Tile {
    fn name(&self) -> &str {
        &self.name
    }
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// Reverse lookup entry for one global variant id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileInfo {
    pub tile_index: usize,
    pub variant_index: usize,
    pub tile_name: String,
    pub variant_name: String,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    pub(crate) generation: Uuid,
    pub(crate) flags: Vec<String>,
    pub(crate) groups: Vec<Group>,
    pub(crate) tiles: Vec<Tile>,
    /// Indexed by global id.
    pub(crate) tile_info: Vec<TileInfo>,
    pub(crate) indices_by_name: BTreeMap<String, BTreeMap<String, TileId>>,
    pub(crate) layer_tile_indices: [Vec<usize>; LayerKind::COUNT],
    pub(crate) autotiling_range: IVec2,
    pub(crate) max_texture_offset_negative: IVec2,
    pub(crate) max_texture_offset_positive: IVec2,
}

impl Catalog {
    /// Unique id of this compilation. A reload produces a new one.
    pub fn generation(&self) -> Uuid {
        self.generation
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn flag_index(&self, name: &str) -> Option<usize> {
        names::index_by_name(&self.flags, name)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile_index(&self, name: &str) -> Option<usize> {
        names::index_by_name(&self.tiles, name)
    }

    pub fn group_index(&self, name: &str) -> Option<usize> {
        names::index_by_name(&self.groups, name)
    }

    pub fn tile_exists(&self, name: &str) -> bool {
        self.tile_index(name).is_some()
    }

    pub fn group_exists(&self, name: &str) -> bool {
        self.group_index(name).is_some()
    }

    pub fn tile_by_index(&self, index: usize) -> &Tile {
        &self.tiles[index]
    }

    pub fn group_by_index(&self, index: usize) -> &Group {
        &self.groups[index]
    }

    pub fn default_variant(&self, tile_index: usize) -> &TileVariant {
        self.tiles[tile_index].default_variant()
    }

    /// Valid ids are `0..index_count()`.
    pub fn index_count(&self) -> usize {
        self.tile_info.len()
    }

    /// Global id of a (tile, variant) name pair.
    pub fn index_by_name(&self, tile_name: &str, variant_name: &str) -> Option<TileId> {
        self.indices_by_name
            .get(tile_name)
            .and_then(|variants| variants.get(variant_name))
            .copied()
    }

    pub fn try_tile_info(&self, id: TileId) -> Option<&TileInfo> {
        self.tile_info.get(id.index())
    }

    /// Reverse lookup of a global id.
    ///
    /// # Panics
    /// If `id` was not produced by this catalog.
    pub fn tile_info(&self, id: TileId) -> &TileInfo {
        self.try_tile_info(id)
            .unwrap_or_else(|| panic!("attempt to look up tile id {id}, which doesn't exist"))
    }

    /// Reverse lookup table, indexed by global id.
    pub fn tile_infos(&self) -> &[TileInfo] {
        &self.tile_info
    }

    /// # Panics
    /// If `id` was not produced by this catalog.
    pub fn tile_index_of(&self, id: TileId) -> usize {
        self.tile_info(id).tile_index
    }

    /// # Panics
    /// If `id` was not produced by this catalog.
    pub fn variant_index_of(&self, id: TileId) -> usize {
        self.tile_info(id).variant_index
    }

    /// # Panics
    /// If `id` was not produced by this catalog.
    pub fn get_tile(&self, id: TileId) -> &Tile {
        &self.tiles[self.tile_index_of(id)]
    }

    /// # Panics
    /// If `id` was not produced by this catalog.
    pub fn get_variant(&self, id: TileId) -> &TileVariant {
        let info = self.tile_info(id);
        &self.tiles[info.tile_index].variants[info.variant_index]
    }

    /// Tile indices living on `layer`, in catalog file order.
    pub fn tile_indices_for_layer(&self, layer: LayerKind) -> &[usize] {
        &self.layer_tile_indices[layer.index()]
    }

    /// Largest absolute requirement offset over all rules, per axis.
    ///
    /// Autotiling a cell can depend on cells this far away.
    pub fn autotiling_range(&self) -> IVec2 {
        self.autotiling_range
    }

    /// Add to the top-left corner of the visible cell range so that large
    /// sprites reaching into view are still drawn.
    pub fn max_texture_offset_negative(&self) -> IVec2 {
        self.max_texture_offset_negative
    }

    /// Add to the bottom-right corner of the visible cell range.
    pub fn max_texture_offset_positive(&self) -> IVec2 {
        self.max_texture_offset_positive
    }
}
