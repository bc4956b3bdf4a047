//! CLI Module
//!
//! Command-line front end over a file-backed session.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Layerstack - building assembly configuration
#[derive(Parser, Debug)]
#[command(name = "layerstack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Session storage directory (overrides config)
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the current assembly
    #[command(name = "show")]
    Show,

    /// List catalog materials
    #[command(name = "materials")]
    Materials,

    /// Append a layer made of a catalog material
    #[command(name = "add-layer")]
    AddLayer {
        /// Catalog material name
        material: String,

        /// Thickness in metres
        thickness: f64,

        #[arg(short, long)]
        name: Option<String>,
    },

    /// Edit a layer (by id or 1-based position)
    #[command(name = "update-layer")]
    UpdateLayer {
        layer: String,

        #[arg(short, long)]
        thickness: Option<f64>,

        #[arg(short, long)]
        name: Option<String>,

        /// Replace the material with a catalog entry
        #[arg(short, long)]
        material: Option<String>,
    },

    /// Remove a layer (by id or 1-based position)
    #[command(name = "delete-layer")]
    DeleteLayer { layer: String },

    /// Move a layer between 1-based positions
    #[command(name = "move-layer")]
    MoveLayer { from: usize, to: usize },

    /// Append a copy of a layer
    #[command(name = "duplicate-layer")]
    DuplicateLayer { layer: String },

    /// Anchor a monitor inside a layer
    #[command(name = "add-monitor")]
    AddMonitor {
        layer: String,

        /// Fractional position across the layer (0-1)
        position: f64,

        #[arg(short, long, default_value = "Monitor")]
        name: String,
    },

    /// Remove a monitor by id
    #[command(name = "delete-monitor")]
    DeleteMonitor { id: String },

    /// Edit project metadata
    #[command(name = "set-project")]
    SetProject {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        client: Option<String>,

        #[arg(long)]
        number: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Run a JSON array of actions against the session
    #[command(name = "replay")]
    Replay { script: PathBuf },

    /// Discard the assembly and start empty
    #[command(name = "reset")]
    Reset,
}
