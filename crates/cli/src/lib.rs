//! # CardMap CLI
//!
//! Command-line interface for CardMap.
//!
//! This crate drives documents and their canvas without a window: it creates
//! and inspects document files, replays scripted pointer interactions against
//! the connector canvas, and renders the canvas to SVG.
//!
//! ## Commands
//!
//! - `new` - Create an empty document
//! - `add-card` - Add a card to a document
//! - `info` - Display information about a document
//! - `validate` - Check a document for consistency
//! - `replay` - Apply a script of canvas interactions
//! - `render` - Render the canvas as SVG
//!

pub mod commands;
pub mod script;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

// Re-export dependencies for use in main.rs
pub use cardmap_core;
pub use cardmap_ir;
pub use cardmap_ui;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Card-and-connector diagrams from the command line
#[derive(Parser, Debug)]
#[command(name = "cardmap", version, about, long_about = None)]
pub struct Cli {
    /// Canvas configuration file (TOML)
    #[arg(short, long, global = true, value_name = "PATH", env = "CARDMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty document
    New {
        /// Document file to create
        file: PathBuf,

        /// Document name (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Add a card to a document
    AddCard {
        file: PathBuf,

        #[arg(short, long)]
        title: String,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        x: f32,

        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        y: f32,

        #[arg(long, default_value_t = 160.0)]
        w: f32,

        #[arg(long, default_value_t = 90.0)]
        h: f32,
    },

    /// Display information about a document
    Info { file: PathBuf },

    /// Check a document for consistency
    Validate { file: PathBuf },

    /// Apply a JSON script of canvas interactions to a document
    Replay {
        file: PathBuf,

        /// Script file
        script: PathBuf,

        /// Replay without writing the document back
        #[arg(long)]
        dry_run: bool,
    },

    /// Render the canvas as SVG
    Render {
        file: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Execute a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::New { file, name, force } => commands::new_document(&file, name, force),
        Command::AddCard {
            file,
            title,
            x,
            y,
            w,
            h,
        } => commands::add_card(&file, &title, x, y, w, h),
        Command::Info { file } => commands::info(&file),
        Command::Validate { file } => commands::validate(&file),
        Command::Replay {
            file,
            script,
            dry_run,
        } => commands::replay(&file, &script, dry_run, config),
        Command::Render { file, output } => commands::render(&file, output.as_deref(), config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_card() {
        let cli = Cli::try_parse_from([
            "cardmap", "add-card", "map.cmap", "--title", "Inbox", "--x", "-20", "--y", "40",
        ])
        .unwrap();
        match cli.command {
            Command::AddCard { title, x, y, w, h, .. } => {
                assert_eq!(title, "Inbox");
                assert_eq!((x, y, w, h), (-20.0, 40.0, 160.0, 90.0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "cardmap", "render", "map.cmap", "--verbose", "--config", "canvas.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("canvas.toml")));
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Cli::try_parse_from(["cardmap"]).is_err());
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
