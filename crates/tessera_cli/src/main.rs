mod cli;

use anyhow::{bail, Context};
use clap::Parser;
use tessera_core::{IVec2, LayerKind, MapGrid};
use tessera_map::{Format, ProjectConfig, Session};
use tessera_tiling::{load_tiling, Catalog};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{layer_filter, Cli, Command};

fn main() -> anyhow::Result<()> {
    setup_logging();
    let args = Cli::parse();

    let config = ProjectConfig::load(&args.config)
        .with_context(|| format!("Reading {}", args.config.display()))?;

    if let Command::Check = args.command {
        let catalog = load_tiling(&config.catalog.path)
            .with_context(|| format!("Compiling {}", config.catalog.path.display()))?;
        print_catalog(&catalog);
        return Ok(());
    }

    let mut session = Session::open(&config)
        .with_context(|| format!("Compiling {}", config.catalog.path.display()))?;

    match args.command {
        Command::Check => unreachable!("handled before the session is opened"),
        Command::Info => {
            print_catalog(session.catalog());
            print_map(&session);
        }
        Command::Retile => {
            session.retile();
            save(&session, Format::Compact)?;
        }
        Command::ExportCompat => save(&session, Format::Text)?,
        Command::ImportCompat => {
            session
                .load(Format::Text)
                .context("Reading the text export")?;
            save(&session, Format::Compact)?;
        }
        Command::Resize { width, height, dx, dy } => {
            let new_size = IVec2::new(width, height);
            check_map_size(new_size)?;
            if session.resize(new_size, IVec2::new(dx, dy)) {
                save(&session, Format::Compact)?;
            } else {
                info!("map is already {new_size}, nothing to do");
            }
        }
        Command::Paint { x, y, tile } => {
            let pos = IVec2::new(x, y);
            let Some(tile_index) = session.catalog().tile_index(&tile) else {
                bail!("no tile named `{tile}` in the catalog");
            };
            if !session.map().grid().contains(pos) {
                bail!("{pos} is outside the {} map", session.map().size());
            }
            session.place(pos, tile_index);
            save(&session, Format::Compact)?;
        }
        Command::Erase { x0, y0, x1, y1, layer } => {
            session.erase_area(IVec2::new(x0, y0), IVec2::new(x1, y1), layer_filter(layer));
            save(&session, Format::Compact)?;
        }
    }

    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tessera=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn check_map_size(size: IVec2) -> anyhow::Result<()> {
    if MapGrid::cell_count(size).is_none() {
        bail!("{size} is not a usable map size");
    }
    Ok(())
}

fn save(session: &Session, format: Format) -> anyhow::Result<()> {
    session
        .save(format)
        .with_context(|| format!("Writing {}", format.path_for(session.map().file_name()).display()))
}

fn print_catalog(catalog: &Catalog) {
    println!(
        "{} tiles, {} variants, {} groups, {} flags",
        catalog.tile_count(),
        catalog.index_count(),
        catalog.groups().len(),
        catalog.flags().len()
    );
    println!(
        "autotiling range {}, texture footprint {} .. {}",
        catalog.autotiling_range(),
        catalog.max_texture_offset_negative(),
        catalog.max_texture_offset_positive()
    );

    for layer in LayerKind::ALL {
        let names: Vec<&str> = catalog
            .tile_indices_for_layer(layer)
            .iter()
            .map(|&index| catalog.tile_by_index(index).name.as_str())
            .collect();
        println!("  {layer}: {}", names.join(", "));
    }
    for group in catalog.groups() {
        println!("  group {}: {}", group.name, group.tiles.join(", "));
    }
}

fn print_map(session: &Session) {
    let map = session.map();
    println!(
        "map {} ({:?}), size {}",
        map.file_name().display(),
        map.origin(),
        map.size()
    );

    for layer in LayerKind::ALL {
        let used = map
            .grid()
            .cells()
            .iter()
            .filter(|cell| cell.get(layer).is_some())
            .count();
        println!("  {layer}: {used} cells");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_size_must_be_positive_and_countable() {
        assert!(check_map_size(IVec2::new(20, 8)).is_ok());
        assert!(check_map_size(IVec2::new(0, 8)).is_err());
        let err = check_map_size(IVec2::new(65536, 65537)).unwrap_err();
        assert!(err.to_string().contains("[65536,65537]"), "{err}");
    }
}
