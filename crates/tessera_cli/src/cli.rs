use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tessera_core::LayerKind;
use tessera_map::{LayerFilter, CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Project file
    #[arg(long, short, global = true, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile the tiling catalog and report the first problem found
    Check,
    /// Print catalog and map statistics
    Info,
    /// Re-autotile the whole map and save it
    Retile,
    /// Write the map in the forward compatible text format
    ExportCompat,
    /// Read the text format back and save it compact
    ImportCompat,
    /// Resize the map, shifting the old content by (dx, dy)
    Resize {
        width: i32,
        height: i32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        dx: i32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        dy: i32,
    },
    /// Place a tile and autotile around it
    Paint { x: i32, y: i32, tile: String },
    /// Clear a rectangle, corners in any order
    Erase {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        /// Only clear this layer
        #[arg(long, value_enum)]
        layer: Option<LayerArg>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerArg {
    Front,
    Mid,
    Back,
}

impl From<LayerArg> for LayerKind {
    fn from(arg: LayerArg) -> Self {
        match arg {
            LayerArg::Front => LayerKind::Front,
            LayerArg::Mid => LayerKind::Mid,
            LayerArg::Back => LayerKind::Back,
        }
    }
}

pub fn layer_filter(layer: Option<LayerArg>) -> LayerFilter {
    layer.map(LayerKind::from).into()
}
