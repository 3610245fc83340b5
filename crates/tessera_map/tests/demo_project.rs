//! End-to-end checks against the catalog shipped in `demos/basic`.

use std::fs;
use std::path::{Path, PathBuf};

use tessera_core::{IVec2, LayerKind};
use tessera_map::{Format, LayerFilter, MapOrigin, ProjectConfig, Session};
use tessera_tiling::load_tiling;

fn demo_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/basic")
}

/// The demo project, with its catalog copied into `dir` and the map saved there.
fn project_in(dir: &Path) -> ProjectConfig {
    let toml_str = fs::read_to_string(demo_dir().join("tessera.toml")).unwrap();
    let mut config = ProjectConfig::parse(&toml_str).unwrap();

    let catalog_path = dir.join("tiling.json");
    fs::copy(demo_dir().join("tiling.json"), &catalog_path).unwrap();
    config.catalog.path = catalog_path;
    config.map.path = dir.join("basic.tsm");
    config
}

fn variant(session: &Session, x: i32, y: i32, layer: LayerKind) -> Option<String> {
    session
        .map()
        .get(IVec2::new(x, y), layer)
        .map(|id| session.catalog().tile_info(id).variant_name.clone())
}

fn place(session: &mut Session, x: i32, y: i32, tile: &str) {
    let index = session.catalog().tile_index(tile).unwrap();
    session.place(IVec2::new(x, y), index);
}

#[test]
fn demo_catalog_compiles() {
    let catalog = load_tiling(&demo_dir().join("tiling.json")).unwrap();

    assert_eq!(catalog.tile_count(), 5);
    assert_eq!(catalog.index_count(), 16);
    assert_eq!(catalog.autotiling_range(), IVec2::new(1, 1));
    assert_eq!(catalog.max_texture_offset_negative(), IVec2::new(0, -1));
    assert_eq!(catalog.max_texture_offset_positive(), IVec2::ZERO);

    let stone = catalog.tile_by_index(catalog.tile_index("stone").unwrap());
    // middle, left, its mirrored "right" clone, pillar
    assert_eq!(stone.rules.len(), 4);
    assert!(stone.has_flag(catalog.flag_index("solid").unwrap()));
    assert!(!stone.has_flag(catalog.flag_index("liquid").unwrap()));

    let masonry = catalog.group_by_index(catalog.group_index("masonry").unwrap());
    assert!(masonry.contains_name("brick"));
    assert!(!masonry.contains_name("grass"));
}

#[test]
fn painting_autotiles_neighbors() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(&project_in(dir.path())).unwrap();
    assert_eq!(session.map().origin(), MapOrigin::Blank);
    assert_eq!(session.map().size(), IVec2::new(16, 12));

    for x in 2..=5 {
        place(&mut session, x, 5, "stone");
    }
    let row: Vec<Option<String>> = (2..=5).map(|x| variant(&session, x, 5, LayerKind::Mid)).collect();
    assert_eq!(
        row,
        ["left", "middle", "middle", "right"].map(|v| Some(v.to_string()))
    );

    // Stone on masonry becomes a pillar.
    place(&mut session, 8, 6, "brick");
    place(&mut session, 8, 5, "stone");
    assert_eq!(variant(&session, 8, 5, LayerKind::Mid).as_deref(), Some("pillar"));

    // Water: the center of a 3x3 pool is deep, periodic ripples elsewhere.
    for y in 1..4 {
        for x in 10..13 {
            place(&mut session, x, y, "water");
        }
    }
    assert_eq!(variant(&session, 11, 2, LayerKind::Back).as_deref(), Some("deep"));
    assert_eq!(variant(&session, 11, 1, LayerKind::Back).as_deref(), Some("ripple"));
    assert_eq!(variant(&session, 10, 1, LayerKind::Back).as_deref(), Some("still"));

    // Grass: the top row is an edge, rows below are randomized.
    for y in 9..11 {
        for x in 0..16 {
            place(&mut session, x, y, "grass");
        }
    }
    for x in 0..16 {
        assert_eq!(variant(&session, x, 9, LayerKind::Back).as_deref(), Some("edge"));
        let below = variant(&session, x, 10, LayerKind::Back).unwrap();
        assert!(["plain", "tuft", "bare"].contains(&below.as_str()), "{below}");
    }

    place(&mut session, 3, 9, "flower");
    place(&mut session, 3, 2, "flower");
    let on_grass = variant(&session, 3, 9, LayerKind::Front).unwrap();
    assert!(on_grass == "red" || on_grass == "blue");
    assert_eq!(variant(&session, 3, 2, LayerKind::Front).as_deref(), Some("red"));

    // Erasing the middle of the stone row re-splits it.
    session.erase_area(IVec2::new(4, 5), IVec2::new(4, 5), LayerFilter::Only(LayerKind::Mid));
    assert_eq!(variant(&session, 3, 5, LayerKind::Mid).as_deref(), Some("right"));
    assert_eq!(variant(&session, 5, 5, LayerKind::Mid).as_deref(), Some("single"));
}

#[test]
fn saved_map_survives_catalog_edits() {
    let dir = tempfile::tempdir().unwrap();
    let config = project_in(dir.path());
    let mut session = Session::open(&config).unwrap();

    place(&mut session, 8, 6, "brick");
    place(&mut session, 8, 5, "stone");
    place(&mut session, 2, 5, "stone");
    place(&mut session, 3, 5, "stone");
    session.save(Format::Compact).unwrap();

    let reopened = Session::open(&config).unwrap();
    assert_eq!(reopened.map().origin(), MapOrigin::Compact);
    assert_eq!(reopened.map().grid(), session.map().grid());

    // Drop "brick" from the catalog.
    let mut json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.catalog.path).unwrap()).unwrap();
    json["groups"][0]["tiles"] = serde_json::json!(["stone"]);
    json["tiles"]
        .as_array_mut()
        .unwrap()
        .retain(|tile| tile["name"] != "brick");
    fs::write(&config.catalog.path, serde_json::to_string(&json).unwrap()).unwrap();

    // Live reload: the brick vanishes and the pillar loses its support.
    session.reload_tiling().unwrap();
    assert_eq!(variant(&session, 8, 6, LayerKind::Mid), None);
    assert_eq!(variant(&session, 8, 5, LayerKind::Mid).as_deref(), Some("single"));
    assert_eq!(variant(&session, 2, 5, LayerKind::Mid).as_deref(), Some("left"));

    // Loading the old file against the new catalog: brick cells are empty.
    let fresh = Session::open(&config).unwrap();
    assert_eq!(fresh.map().origin(), MapOrigin::Compact);
    assert_eq!(variant(&fresh, 8, 6, LayerKind::Mid), None);
    assert_eq!(variant(&fresh, 3, 5, LayerKind::Mid).as_deref(), Some("right"));
}

#[test]
fn text_export_migrates_back_to_compact() {
    let dir = tempfile::tempdir().unwrap();
    let config = project_in(dir.path());
    let mut session = Session::open(&config).unwrap();

    place(&mut session, 1, 1, "stone");
    place(&mut session, 2, 1, "stone");
    session.save(Format::Text).unwrap();

    // A compact file from some other layout version.
    fs::write(&config.map.path, b"TSM\x01 not the current layout").unwrap();

    let migrated = Session::open(&config).unwrap();
    assert_eq!(migrated.map().origin(), MapOrigin::Text);
    assert_eq!(migrated.map().grid(), session.map().grid());

    let again = Session::open(&config).unwrap();
    assert_eq!(again.map().origin(), MapOrigin::Compact);
    assert_eq!(again.map().grid(), session.map().grid());
}
