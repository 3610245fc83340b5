//! Validation and compilation: [`TilingConfig`] → [`Catalog`].
//!
//! The pipeline is a straight sequence of finalize-and-check steps. The first
//! failing check aborts the whole compile with a [`ValidationError`] naming the
//! offending entity; a partially compiled catalog is never returned.

use std::collections::BTreeMap;

use tessera_core::names::{self, Named};
use tessera_core::{IVec2, LayerKind, TileId};
use uuid::Uuid;

use crate::catalog::{
    Catalog, Group, ModuloPosition, Requirement, RequirementTarget, RuleResult, Tile, TileInfo,
    TileRule, TileVariant, SHEET_PIXEL_ORIGIN, SHEET_SIZE, TILE_PIXELS,
};
use crate::types::{GroupDef, RequirementDef, ResultDef, RuleDef, TileDef, TilingConfig, VariantDef};
use crate::ValidationError;

/// Slack allowed when checking that explicit weights do not exceed 1, so that
/// weights like ten times `0.1` survive `f32` rounding.
const WEIGHT_EPSILON: f32 = 1e-6;

type Result<T> = std::result::Result<T, ValidationError>;

macro_rules! invalid {
    ($($arg:tt)*) => {
        ValidationError(format!($($arg)*))
    };
}

/// Validate `config` and build the lookup tables of a [`Catalog`].
pub fn compile(config: TilingConfig) -> Result<Catalog> {
    let TilingConfig {
        mut flags,
        groups,
        tiles,
    } = config;

    // Flags
    names::sort_by_name(&mut flags);
    if let Some(dup) = names::find_duplicate(&flags) {
        return Err(invalid!("A duplicate tile flag name `{dup}`."));
    }

    // Groups
    let mut groups = groups
        .into_iter()
        .map(finalize_group)
        .collect::<Result<Vec<_>>>()?;
    names::sort_by_name(&mut groups);
    if let Some(dup) = names::find_duplicate(&groups) {
        return Err(invalid!("A duplicate tile group named `{}`.", dup.name));
    }

    // Tiles
    let mut tiles = tiles
        .into_iter()
        .enumerate()
        .map(|(index, def)| finalize_tile(index, def))
        .collect::<Result<Vec<_>>>()?;
    names::sort_by_name(&mut tiles);
    if let Some(dup) = names::find_duplicate(&tiles) {
        return Err(invalid!("A duplicate tile named `{}`.", dup.name));
    }
    if let Some(tile) = tiles.iter().find(|t| names::contains_name(&groups, &t.name)) {
        return Err(invalid!(
            "A name collision between a tile named `{}` and a group with the same name.",
            tile.name
        ));
    }

    // Flag bitsets
    for tile in &mut tiles {
        tile.flag_bits = vec![false; flags.len()];
        for flag in &tile.flags {
            let Some(flag_index) = names::index_by_name(&flags, flag) else {
                return Err(invalid!(
                    "An invalid flag named `{flag}` was specified for tile `{}`.",
                    tile.name
                ));
            };
            tile.flag_bits[flag_index] = true;
        }
    }

    // Group members
    for group in &mut groups {
        for name in &group.tiles {
            let Some(index) = names::index_by_name(&tiles, name) else {
                return Err(invalid!(
                    "Tile named `{name}` referenced in group `{}` doesn't exist.",
                    group.name
                ));
            };
            group.indices.push(index);
        }
        group.indices.sort_unstable();
    }

    let (tile_info, indices_by_name) = assign_global_ids(&mut tiles);
    let (max_texture_offset_negative, max_texture_offset_positive) = texture_footprint(&tiles);
    let layer_tile_indices = layer_tile_lists(&tiles);
    let autotiling_range = autotiling_range(&tiles);
    resolve_requirements(&mut tiles, &groups)?;

    tracing::debug!(
        "compiled tiling catalog: {} flags, {} groups, {} tiles, {} variants",
        flags.len(),
        groups.len(),
        tiles.len(),
        tile_info.len()
    );

    Ok(Catalog {
        generation: Uuid::new_v4(),
        flags,
        groups,
        tiles,
        tile_info,
        indices_by_name,
        layer_tile_indices,
        autotiling_range,
        max_texture_offset_negative,
        max_texture_offset_positive,
    })
}

// ─── Groups ──────────────────────────────────────────────────────────────────

fn finalize_group(def: GroupDef) -> Result<Group> {
    let GroupDef { name, mut tiles } = def;

    if name.is_empty() {
        return Err(invalid!("Attempt to create a tile group with an empty name."));
    }

    tiles.sort();
    if let Some(dup) = names::find_duplicate(&tiles) {
        return Err(invalid!("Duplicate tile named `{dup}` in group `{name}`."));
    }

    Ok(Group {
        name,
        tiles,
        indices: Vec::new(),
    })
}

// ─── Tiles ───────────────────────────────────────────────────────────────────

fn finalize_tile(original_index: usize, def: TileDef) -> Result<Tile> {
    let TileDef {
        name,
        layer,
        flags,
        default_variant,
        display_variant,
        variants,
        rules,
    } = def;

    if name.is_empty() {
        return Err(invalid!("Attempt to create a tile with an empty name."));
    }

    let Some(layer) = LayerKind::from_name(&layer) else {
        return Err(invalid!("Invalid layer `{layer}` for tile `{name}`."));
    };

    // Variants
    let mut variants = variants
        .into_iter()
        .map(|v| finalize_variant(v, &name))
        .collect::<Result<Vec<_>>>()?;
    names::sort_by_name(&mut variants);
    if let Some(dup) = names::find_duplicate(&variants) {
        return Err(invalid!("Duplicate variant `{}` for tile `{name}`.", dup.name));
    }
    let Some(default_index) = names::index_by_name(&variants, &default_variant) else {
        return Err(invalid!(
            "Default variant `{default_variant}` for tile `{name}` doesn't exist."
        ));
    };
    let Some(display_index) = names::index_by_name(&variants, &display_variant) else {
        return Err(invalid!(
            "Display variant `{display_variant}` for tile `{name}` doesn't exist."
        ));
    };

    // Rules
    let rules = expand_duplicates(rules)
        .into_iter()
        .map(|(index, rule)| finalize_rule(index, rule, &name, &variants))
        .collect::<Result<Vec<_>>>()?;

    Ok(Tile {
        name,
        layer,
        flags,
        original_index,
        variants,
        rules,
        flag_bits: Vec::new(),
        default_variant: default_index,
        display_variant: display_index,
    })
}

fn finalize_variant(def: VariantDef, tile_name: &str) -> Result<TileVariant> {
    let VariantDef {
        name,
        texture,
        size,
        offset,
        tex_offset,
    } = def;

    if name.is_empty() {
        return Err(invalid!("A variant of tile `{tile_name}` has an empty name."));
    }
    if size.min_element() < 1 {
        return Err(invalid!(
            "Variant `{name}` of tile `{tile_name}` has non-positive size."
        ));
    }
    let end = texture + size;
    if texture.min_element() < 0 || end.x > SHEET_SIZE.x || end.y > SHEET_SIZE.y {
        return Err(invalid!(
            "Texture coordinates for variant `{name}` of tile `{tile_name}` are out of range."
        ));
    }

    Ok(TileVariant {
        small: size == IVec2::ONE,
        texture_pixel_pos: SHEET_PIXEL_ORIGIN + (texture + offset + tex_offset) * TILE_PIXELS,
        texture_pixel_size: size * TILE_PIXELS,
        texture_pixel_offset: offset * TILE_PIXELS,
        global_index: TileId(0),
        name,
        texture,
        size,
        offset,
        tex_offset,
    })
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// Insert the clones requested by each rule's `duplicate` list right after it.
///
/// Clones get the template matrix applied to every requirement offset and,
/// when given, the template's results. Each entry keeps the index of the
/// authored rule it came from.
fn expand_duplicates(rules: Vec<RuleDef>) -> Vec<(usize, RuleDef)> {
    let mut expanded = Vec::with_capacity(rules.len());

    for (index, rule) in rules.into_iter().enumerate() {
        let clones: Vec<RuleDef> = rule
            .duplicate
            .iter()
            .map(|dupe| {
                let mut clone = rule.clone();
                clone.duplicate.clear();
                for req in clone.requires.iter_mut().chain(clone.requires_not.iter_mut()) {
                    req.offset = dupe.matrix * req.offset;
                }
                if !dupe.results.is_empty() {
                    clone.results = dupe.results.clone();
                }
                clone
            })
            .collect();

        expanded.push((index, rule));
        expanded.extend(clones.into_iter().map(|clone| (index, clone)));
    }

    expanded
}

fn finalize_rule(
    original_index: usize,
    def: RuleDef,
    tile_name: &str,
    variants: &[TileVariant],
) -> Result<TileRule> {
    let RuleDef {
        results,
        requires,
        requires_not,
        req_variants,
        matrices,
        modulo_pos,
        duplicate: _,
    } = def;

    if results.is_empty() {
        return Err(invalid!(
            "Result vector of rule {original_index} for tile `{tile_name}` is empty."
        ));
    }

    let chances = normalize_chances(&results).map_err(|reason| {
        invalid!("Results of the rule {original_index} for tile `{tile_name}` {reason}.")
    })?;

    let results = results
        .into_iter()
        .zip(chances)
        .map(|(result, chance)| {
            let Some(variant) = names::index_by_name(variants, &result.name) else {
                return Err(invalid!(
                    "A tiling rule result for tile `{tile_name}` references non-existent variant named `{}`.",
                    result.name
                ));
            };
            Ok(RuleResult {
                name: result.name,
                chance,
                variant,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Modulo position
    if modulo_pos.size.min_element() < 1 {
        return Err(invalid!(
            "Rectangle size for modulo position for the rule {original_index} for tile `{tile_name}` is smaller than 1 in at least one dimension."
        ));
    }
    let active = modulo_pos.size != IVec2::ONE;
    if active && modulo_pos.offsets.is_empty() {
        return Err(invalid!(
            "List of modulo offsets for the rule {original_index} for tile `{tile_name}` is empty."
        ));
    }
    if let Some(bad) = modulo_pos
        .offsets
        .iter()
        .find(|offset| !offset.is_within(modulo_pos.size))
    {
        return Err(invalid!(
            "Modulo offset {bad} for the rule {original_index} for tile `{tile_name}` is invalid."
        ));
    }

    // Required current variants
    let mut req_variant_indices = Vec::with_capacity(req_variants.len());
    for va_name in &req_variants {
        let Some(index) = names::index_by_name(variants, va_name) else {
            return Err(invalid!(
                "A tiling rule for tile `{tile_name}` references non-existent variant named `{va_name}`."
            ));
        };
        req_variant_indices.push(index);
    }
    req_variant_indices.sort_unstable();
    req_variant_indices.dedup();

    Ok(TileRule {
        original_index,
        results,
        requires: expand_requirements(requires, &matrices),
        requires_not: expand_requirements(requires_not, &matrices),
        req_variants: req_variant_indices,
        modulo_pos: ModuloPosition {
            size: modulo_pos.size,
            offsets: modulo_pos.offsets,
            active,
        },
    })
}

/// Fill in omitted weights with an equal share of what the explicit ones leave.
fn normalize_chances(results: &[ResultDef]) -> std::result::Result<Vec<f32>, &'static str> {
    let mut sum = 0.0f32;
    let mut omitted = 0usize;
    for result in results {
        match result.chance {
            Some(chance) if !chance.is_finite() || chance < 0.0 => {
                return Err("have a negative or non-finite probability");
            }
            Some(chance) => sum += chance,
            None => omitted += 1,
        }
    }
    if sum > 1.0 + WEIGHT_EPSILON {
        return Err("have total probability greater than 1");
    }

    let share = if omitted > 0 {
        (1.0 - sum).max(0.0) / omitted as f32
    } else {
        0.0
    };
    Ok(results.iter().map(|r| r.chance.unwrap_or(share)).collect())
}

/// Keep the original requirements and append one transformed copy of them per matrix.
fn expand_requirements(
    requirements: Vec<RequirementDef>,
    matrices: &[tessera_core::IMat2],
) -> Vec<Requirement> {
    let originals: Vec<Requirement> = requirements
        .into_iter()
        .map(|req| Requirement {
            name: req.name,
            offset: req.offset,
            target: RequirementTarget::Any,
        })
        .collect();

    let mut expanded = originals.clone();
    for matrix in matrices {
        expanded.extend(originals.iter().map(|req| Requirement {
            offset: *matrix * req.offset,
            ..req.clone()
        }));
    }
    expanded
}

// ─── Derived tables ──────────────────────────────────────────────────────────

fn assign_global_ids(
    tiles: &mut [Tile],
) -> (Vec<TileInfo>, BTreeMap<String, BTreeMap<String, TileId>>) {
    let mut tile_info = Vec::new();
    let mut indices_by_name: BTreeMap<String, BTreeMap<String, TileId>> = BTreeMap::new();

    for (tile_index, tile) in tiles.iter_mut().enumerate() {
        let by_variant = indices_by_name.entry(tile.name.clone()).or_default();
        for (variant_index, variant) in tile.variants.iter_mut().enumerate() {
            let id = TileId(tile_info.len() as u32);
            variant.global_index = id;
            by_variant.insert(variant.name.clone(), id);
            tile_info.push(TileInfo {
                tile_index,
                variant_index,
                tile_name: tile.name.clone(),
                variant_name: variant.name.clone(),
            });
        }
    }

    (tile_info, indices_by_name)
}

/// Extreme sprite extents relative to their cell, over every variant.
fn texture_footprint(tiles: &[Tile]) -> (IVec2, IVec2) {
    let mut extents = tiles
        .iter()
        .flat_map(|tile| tile.variants.iter())
        .map(|v| (v.offset, v.offset + v.size - IVec2::ONE));

    let Some(first) = extents.next() else {
        return (IVec2::ZERO, IVec2::ZERO);
    };
    extents.fold(first, |(neg, pos), (a, b)| (neg.min(a), pos.max(b)))
}

/// Per-layer tile indices, in catalog file order rather than name order.
fn layer_tile_lists(tiles: &[Tile]) -> [Vec<usize>; LayerKind::COUNT] {
    let mut lists: [Vec<usize>; LayerKind::COUNT] = Default::default();
    for (index, tile) in tiles.iter().enumerate() {
        lists[tile.layer.index()].push(index);
    }
    for list in &mut lists {
        list.sort_by_key(|&index| tiles[index].original_index);
    }
    lists
}

fn autotiling_range(tiles: &[Tile]) -> IVec2 {
    tiles
        .iter()
        .flat_map(|tile| tile.rules.iter())
        .flat_map(|rule| rule.all_requirements())
        .fold(IVec2::ZERO, |range, req| range.max(req.offset.abs()))
}

fn resolve_requirements(tiles: &mut [Tile], groups: &[Group]) -> Result<()> {
    let tile_names: Vec<String> = tiles.iter().map(|t| t.name().to_owned()).collect();

    for tile in tiles.iter_mut() {
        for rule in &mut tile.rules {
            for req in rule.requires.iter_mut().chain(rule.requires_not.iter_mut()) {
                req.target = if let Some(index) = names::index_by_name(&tile_names, &req.name) {
                    RequirementTarget::Tile(index)
                } else if req.name.is_empty() {
                    RequirementTarget::Any
                } else if let Some(index) = names::index_by_name(groups, &req.name) {
                    RequirementTarget::Group(index)
                } else {
                    return Err(invalid!(
                        "Autotiling rule for tile `{}` references `{}`, which is neither a tile nor a tile group.",
                        tile.name,
                        req.name
                    ));
                };
            }
        }
    }

    Ok(())
}
