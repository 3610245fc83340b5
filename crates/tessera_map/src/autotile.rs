//! The autotiler: picks a variant for every occupied cell from its neighborhood.
//!
//! Evaluation never looks at a variant's previous value. It starts from the
//! tile's default variant and lets the tile's rules refine it, in order. Grid
//! reads go through the clamping accessor, so positions past the border see
//! the nearest edge cell.

use rand::Rng;
use tessera_core::{Cell, IVec2, LayerKind, MapGrid, Rect, TileId};
use tessera_tiling::{Catalog, Requirement, RequirementTarget, RuleResult, TileRule};

// ─── Random source ────────────────────────────────────────────────────────────

/// Draws used to pick between weighted rule results.
pub trait RandomSource {
    /// A uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f32;
}

/// Adapts any [`rand::Rng`] into a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f32 {
        self.0.gen::<f32>()
    }
}

// ─── Entry points ─────────────────────────────────────────────────────────────

/// Compute the autotiled contents of the cell at `pos` without writing them.
///
/// Empty layers stay empty. Ids the catalog does not know are left as they are.
pub fn evaluate(
    grid: &MapGrid,
    catalog: &Catalog,
    pos: IVec2,
    rng: &mut impl RandomSource,
) -> Cell {
    let mut cell = grid.get(pos);

    for layer in LayerKind::ALL {
        let Some(id) = cell.get(layer) else {
            continue;
        };
        if let Some(chosen) = evaluate_layer(grid, catalog, pos, id, rng) {
            cell.set(layer, Some(chosen));
        }
    }

    cell
}

/// Re-evaluate one cell in place. Positions outside the grid are ignored.
pub fn run_autotiler_for_one_tile(
    grid: &mut MapGrid,
    catalog: &Catalog,
    pos: IVec2,
    rng: &mut impl RandomSource,
) {
    if !grid.contains(pos) {
        return;
    }
    let cell = evaluate(grid, catalog, pos, rng);
    grid.set_unchecked(pos, cell);
}

/// Re-evaluate `region` plus a margin of the catalog's autotiling range.
///
/// Cells are visited row by row; each write is visible to the cells evaluated
/// after it.
pub fn run_autotiler(
    grid: &mut MapGrid,
    catalog: &Catalog,
    region: Rect,
    rng: &mut impl RandomSource,
) {
    let expanded = region.expand(catalog.autotiling_range());
    let Some(clipped) = expanded.intersect(&grid.bounds()) else {
        return;
    };
    for pos in clipped.iter() {
        run_autotiler_for_one_tile(grid, catalog, pos, rng);
    }
}

/// Re-evaluate every cell of the grid.
pub fn run_autotiler_for_entire_map(
    grid: &mut MapGrid,
    catalog: &Catalog,
    rng: &mut impl RandomSource,
) {
    for pos in grid.bounds().iter() {
        run_autotiler_for_one_tile(grid, catalog, pos, rng);
    }
}

// ─── Rule evaluation ──────────────────────────────────────────────────────────

fn evaluate_layer(
    grid: &MapGrid,
    catalog: &Catalog,
    pos: IVec2,
    id: TileId,
    rng: &mut impl RandomSource,
) -> Option<TileId> {
    let info = catalog.try_tile_info(id)?;
    let tile = catalog.tile_by_index(info.tile_index);

    let mut candidate = tile.default_variant_index();
    for rule in &tile.rules {
        if rule_fires(grid, catalog, pos, rule, candidate) {
            candidate = select_result(&rule.results, rng).variant;
        }
    }

    Some(tile.variants[candidate].global_index)
}

fn rule_fires(
    grid: &MapGrid,
    catalog: &Catalog,
    pos: IVec2,
    rule: &TileRule,
    candidate: usize,
) -> bool {
    rule.can_be_applied_to_variant(candidate)
        && rule.modulo_pos.matches(pos)
        && rule
            .requires
            .iter()
            .all(|req| requirement_holds(grid, catalog, pos, req))
        && !rule
            .requires_not
            .iter()
            .any(|req| requirement_holds(grid, catalog, pos, req))
}

fn requirement_holds(grid: &MapGrid, catalog: &Catalog, pos: IVec2, req: &Requirement) -> bool {
    let cell = grid.get(pos + req.offset);

    match req.target {
        RequirementTarget::Any => !cell.is_empty(),
        RequirementTarget::Tile(tile_index) => {
            let layer = catalog.tile_by_index(tile_index).layer;
            cell.get(layer)
                .and_then(|id| catalog.try_tile_info(id))
                .is_some_and(|info| info.tile_index == tile_index)
        }
        RequirementTarget::Group(group_index) => {
            let group = catalog.group_by_index(group_index);
            cell.occupied().any(|(_, id)| {
                catalog
                    .try_tile_info(id)
                    .is_some_and(|info| group.contains_index(info.tile_index))
            })
        }
    }
}

/// Pick one of `results` by weight. A single result is taken without a draw.
///
/// `results` must not be empty, which the catalog guarantees.
fn select_result<'a>(results: &'a [RuleResult], rng: &mut impl RandomSource) -> &'a RuleResult {
    let (last, rest) = results
        .split_last()
        .unwrap_or_else(|| unreachable!("compiled rules always have results"));
    if rest.is_empty() {
        return last;
    }

    let mut pick = rng.next_unit();
    for result in rest {
        if pick <= result.chance {
            return result;
        }
        pick -= result.chance;
    }
    // Rounding can leave a sliver past the last explicit boundary.
    last
}
