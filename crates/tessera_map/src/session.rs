//! A working session: the current catalog, the map and the random source,
//! owned together.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tessera_core::IVec2;
use tessera_tiling::{Catalog, TilingError, TilingHandle};

use crate::autotile::RngSource;
use crate::edit::{available_tiles, Brush, LayerFilter};
use crate::persist::Format;
use crate::{MapStore, PersistError, ProjectConfig};

pub struct Session {
    tiling: TilingHandle,
    catalog: Arc<Catalog>,
    map: MapStore,
    rng: RngSource<SmallRng>,
}

impl Session {
    /// Load the catalog (errors are fatal) and open the map.
    pub fn open(config: &ProjectConfig) -> Result<Self, TilingError> {
        let tiling = TilingHandle::load(&config.catalog.path)?;
        Ok(Self::with_tiling(tiling, config))
    }

    pub fn with_tiling(tiling: TilingHandle, config: &ProjectConfig) -> Self {
        let catalog = tiling.current();
        let map = MapStore::open(
            &config.map.path,
            &catalog,
            config.map.default_size,
            config.map.compress,
        );
        let rng = match config.autotile.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            tiling,
            catalog,
            map,
            rng: RngSource(rng),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn map(&self) -> &MapStore {
        &self.map
    }

    /// Recompile the catalog. On success the map is re-resolved by name
    /// against the new catalog and fully re-autotiled; on failure nothing
    /// changes and the error is handed back as a diagnostic.
    pub fn reload_tiling(&mut self) -> Result<(), TilingError> {
        let new = self.tiling.reload()?;
        let old = std::mem::replace(&mut self.catalog, new);
        self.map.rebind(&old, &self.catalog, &mut self.rng);
        Ok(())
    }

    pub fn retile(&mut self) {
        self.map.retile(&self.catalog, &mut self.rng);
    }

    pub fn place(&mut self, pos: IVec2, tile_index: usize) {
        self.map.place(&self.catalog, &mut self.rng, pos, tile_index);
    }

    pub fn grab_tile(&self, tile_index: usize) -> Brush {
        MapStore::grab_tile(&self.catalog, tile_index)
    }

    pub fn grab_area(&self, a: IVec2, b: IVec2, filter: LayerFilter) -> Option<Brush> {
        self.map.grab_area(&self.catalog, a, b, filter)
    }

    pub fn paste(&mut self, brush: &Brush, offset: IVec2) {
        self.map.paste(&self.catalog, &mut self.rng, brush, offset);
    }

    pub fn erase_area(&mut self, a: IVec2, b: IVec2, filter: LayerFilter) {
        self.map.erase_area(&self.catalog, &mut self.rng, a, b, filter);
    }

    pub fn available_tiles(&self, filter: LayerFilter) -> Vec<usize> {
        available_tiles(&self.catalog, filter)
    }

    pub fn resize(&mut self, new_size: IVec2, offset: IVec2) -> bool {
        self.map.resize(new_size, offset)
    }

    pub fn save(&self, format: Format) -> Result<(), PersistError> {
        self.map.save(&self.catalog, format)
    }

    pub fn load(&mut self, format: Format) -> Result<(), PersistError> {
        self.map.load(&self.catalog, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tessera_core::LayerKind;

    fn catalog_json(tiles: &[(&str, &[&str])]) -> String {
        let defs: Vec<String> = tiles
            .iter()
            .map(|(name, variants)| {
                let list: Vec<String> = variants
                    .iter()
                    .enumerate()
                    .map(|(i, v)| format!(r#"{{ "name": "{v}", "texture": [{i}, 0] }}"#))
                    .collect();
                format!(
                    r#"{{ "name": "{name}", "layer": "mid", "default": "{first}", "display": "{first}", "variants": [{list}] }}"#,
                    first = variants[0],
                    list = list.join(",")
                )
            })
            .collect();
        format!(r#"{{ "tiles": [{}] }}"#, defs.join(","))
    }

    fn project(dir: &std::path::Path, catalog: &str) -> ProjectConfig {
        let path = dir.join("tiles.json");
        fs::write(&path, catalog).unwrap();
        let mut config = ProjectConfig::default();
        config.catalog.path = path;
        config.map.path = dir.join("map.tsm");
        config.map.default_size = IVec2::new(4, 4);
        config.autotile.seed = Some(3);
        config
    }

    #[test]
    fn reload_rebinds_map_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let config = project(dir.path(), &catalog_json(&[("stone", &["a"]), ("dirt", &["a"])]));
        let mut session = Session::open(&config).unwrap();

        let stone = session.catalog().tile_index("stone").unwrap();
        let dirt = session.catalog().tile_index("dirt").unwrap();
        session.place(IVec2::new(1, 1), stone);
        session.place(IVec2::new(2, 2), dirt);

        // "dirt" disappears, "clay" sorts first and shifts every id.
        fs::write(
            &config.catalog.path,
            catalog_json(&[("clay", &["a"]), ("stone", &["a"])]),
        )
        .unwrap();
        session.reload_tiling().unwrap();

        let catalog = session.catalog();
        assert_eq!(
            session.map().get(IVec2::new(1, 1), LayerKind::Mid),
            catalog.index_by_name("stone", "a")
        );
        assert_eq!(session.map().get(IVec2::new(2, 2), LayerKind::Mid), None);
    }

    #[test]
    fn failed_reload_keeps_catalog_and_map() {
        let dir = tempfile::tempdir().unwrap();
        let config = project(dir.path(), &catalog_json(&[("stone", &["a"])]));
        let mut session = Session::open(&config).unwrap();
        session.place(IVec2::new(0, 0), 0);

        let generation = session.catalog().generation();
        let grid = session.map().grid().clone();

        fs::write(&config.catalog.path, r#"{ "tiles": [], "groups": [{ "name": "" }] }"#).unwrap();
        assert!(matches!(session.reload_tiling(), Err(TilingError::Validation(_))));
        assert_eq!(session.catalog().generation(), generation);
        assert_eq!(session.map().grid(), &grid);
    }

    #[test]
    fn save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = project(dir.path(), &catalog_json(&[("stone", &["a", "b"])]));
        let mut session = Session::open(&config).unwrap();
        assert_eq!(session.map().size(), IVec2::new(4, 4));

        session.place(IVec2::new(3, 0), 0);
        assert!(session.resize(IVec2::new(6, 5), IVec2::new(1, 1)));
        session.save(Format::Compact).unwrap();

        let reopened = Session::open(&config).unwrap();
        assert_eq!(reopened.map().size(), IVec2::new(6, 5));
        assert_eq!(reopened.map().grid(), session.map().grid());
    }

    #[test]
    fn first_load_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = project(dir.path(), "{ broken");
        assert!(matches!(Session::open(&config), Err(TilingError::Parse(_))));
    }
}
