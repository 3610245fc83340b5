//! Authoring-time configuration types.
//!
//! These mirror the JSON catalog file one to one. Nothing here is validated;
//! [`compile`](crate::compile) turns a [`TilingConfig`] into a [`Catalog`](crate::Catalog).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tessera_core::{IMat2, IVec2};

// ─── Config ──────────────────────────────────────────────────────────────────

/// The whole catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TilingConfig {
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub groups: Vec<GroupDef>,
    #[serde(default)]
    pub tiles: Vec<TileDef>,
}

/// A named set of tiles that rules can reference as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupDef {
    pub name: String,
    #[serde(default)]
    pub tiles: Vec<String>,
}

// ─── Tiles ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TileDef {
    pub name: String,
    /// `front`, `mid` or `back`. Checked at compile time.
    pub layer: String,
    #[serde(default)]
    pub flags: BTreeSet<String>,
    /// Variant used for freshly placed tiles.
    #[serde(rename = "default")]
    pub default_variant: String,
    /// Variant shown in tile pickers.
    #[serde(rename = "display")]
    pub display_variant: String,
    pub variants: Vec<VariantDef>,
    /// Match priority is list order: earlier rules fire first.
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

/// One sprite of a tile on the texture sheet, in sheet cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantDef {
    pub name: String,
    pub texture: IVec2,
    #[serde(default = "one")]
    pub size: IVec2,
    /// Where the sprite is drawn relative to its grid cell.
    #[serde(default)]
    pub offset: IVec2,
    #[serde(default)]
    pub tex_offset: IVec2,
}

fn one() -> IVec2 {
    IVec2::ONE
}

// ─── Rules ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDef {
    pub results: Vec<ResultDef>,
    /// All of these must hold.
    #[serde(default)]
    pub requires: Vec<RequirementDef>,
    /// None of these may hold.
    #[serde(default)]
    pub requires_not: Vec<RequirementDef>,
    /// The current variant must be one of these for the rule to fire. Empty = any.
    #[serde(default)]
    pub req_variants: Vec<String>,
    /// Every requirement is copied once per matrix, with the matrix applied to
    /// its offset (after `duplicate` is handled).
    #[serde(default)]
    pub matrices: Vec<IMat2>,
    #[serde(default)]
    pub modulo_pos: ModuloPosDef,
    /// The whole rule is cloned once per entry.
    #[serde(default)]
    pub duplicate: Vec<DupeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultDef {
    /// Variant name within the owning tile.
    pub name: String,
    /// Selection weight. Omitted weights share what the given ones leave of 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chance: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequirementDef {
    /// Tile or group name. Empty means any tile on any layer.
    #[serde(default)]
    pub name: String,
    pub offset: IVec2,
}

/// The tile position modulo `size` must be one of `offsets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuloPosDef {
    #[serde(default = "one")]
    pub size: IVec2,
    #[serde(default)]
    pub offsets: BTreeSet<IVec2>,
}

impl Default for ModuloPosDef {
    fn default() -> Self {
        Self {
            size: IVec2::ONE,
            offsets: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DupeDef {
    /// Applied to every requirement offset of the clone.
    pub matrix: IMat2,
    /// Replaces the clone's results when not empty.
    #[serde(default)]
    pub results: Vec<ResultDef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_tile_uses_defaults() {
        let json = r#"{
            "tiles": [{
                "name": "grass",
                "layer": "mid",
                "default": "a",
                "display": "a",
                "variants": [{ "name": "a", "texture": [1, 2] }]
            }]
        }"#;
        let config: TilingConfig = serde_json::from_str(json).unwrap();
        assert!(config.flags.is_empty());
        let variant = &config.tiles[0].variants[0];
        assert_eq!(variant.size, IVec2::ONE);
        assert_eq!(variant.offset, IVec2::ZERO);
        assert!(config.tiles[0].rules.is_empty());
    }

    #[test]
    fn rule_fields_parse() {
        let json = r#"{
            "results": [{ "name": "a", "chance": 0.25 }, { "name": "b" }],
            "requires": [{ "offset": [1, 0] }],
            "matrices": [[[0, 1], [-1, 0]]],
            "modulo_pos": { "size": [2, 1], "offsets": [[1, 0]] },
            "duplicate": [{ "matrix": [[-1, 0], [0, 1]] }]
        }"#;
        let rule: RuleDef = serde_json::from_str(json).unwrap();
        assert_eq!(rule.results[0].chance, Some(0.25));
        assert_eq!(rule.results[1].chance, None);
        assert_eq!(rule.requires[0].name, "");
        assert_eq!(rule.matrices[0], IMat2::ROTATE_90);
        assert!(rule.modulo_pos.offsets.contains(&IVec2::new(1, 0)));
        assert_eq!(rule.duplicate[0].matrix, IMat2::FLIP_X);
        assert!(rule.duplicate[0].results.is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let json = r#"{ "flags": [], "tilez": [] }"#;
        assert!(serde_json::from_str::<TilingConfig>(json).is_err());
    }
}
