//! Project configuration, read from `tessera.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tessera_core::IVec2;
use thiserror::Error;

/// Default project file name.
pub const CONFIG_FILE: &str = "tessera.toml";

/// Errors that can occur when reading the project configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read project config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse project config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub catalog: CatalogSection,
    pub map: MapSection,
    pub autotile: AutotileSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    /// Tiling catalog (JSON).
    pub path: PathBuf,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tiling.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSection {
    /// Compact map file. The text form lives next to it.
    pub path: PathBuf,
    /// Zlib-compress the compact payload.
    pub compress: bool,
    /// Size of the blank map used when nothing can be loaded.
    pub default_size: IVec2,
}

impl Default for MapSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("map.tsm"),
            compress: true,
            default_size: IVec2::splat(10),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutotileSection {
    /// Fixed seed for reproducible outcome draws. Seeded from entropy when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl ProjectConfig {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read the config at `path`. A missing file yields the defaults.
    ///
    /// Relative paths inside the file are resolved against its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("no project config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        if let Some(dir) = path.parent() {
            config.resolve_relative_to(dir);
        }
        Ok(config)
    }

    fn resolve_relative_to(&mut self, dir: &Path) {
        for path in [&mut self.catalog.path, &mut self.map.path] {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }
}
