//! pkbank CLI
//!
//! Command-line tools for bank maintenance.
//!
//! # Commands
//!
//! - `inspect` - Display bank layout and occupancy
//! - `verify` - Check bank files and backups without modifying them
//! - `backup` - Write a backup snapshot of a bank
//! - `resize` - Change the number of boxes
//! - `rename` - Rename a box
//! - `convert` - Convert the legacy monolithic bank

mod commands;
mod species;

use clap::{Parser, Subcommand};
use commands::Context;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// pkbank command-line bank tools.
#[derive(Parser)]
#[command(name = "pkbank")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Root of removable storage
    #[arg(global = true, short, long)]
    root: Option<PathBuf>,

    /// Root of archive storage (defaults to `<root>/archive`)
    #[arg(global = true, long)]
    archive_root: Option<PathBuf>,

    /// Configuration file (defaults to `<root>/config.json`)
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    /// Species growth-rate table (JSON) used when converting the legacy bank
    #[arg(global = true, long, value_name = "FILE")]
    species: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display bank layout and occupancy
    Inspect {
        /// Bank name
        name: String,

        /// List every occupied slot
        #[arg(short, long)]
        slots: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check bank files and backups without modifying them
    Verify {
        /// Bank name
        name: String,
    },

    /// Write a backup snapshot of a bank
    Backup {
        /// Bank name
        name: String,
    },

    /// Change the number of boxes
    Resize {
        /// Bank name
        name: String,

        /// New box count
        boxes: u32,
    },

    /// Rename a box
    Rename {
        /// Bank name
        name: String,

        /// Zero-based box index
        #[arg(value_name = "BOX")]
        box_index: u32,

        /// New box name
        title: String,
    },

    /// Convert the legacy monolithic bank
    ///
    /// Level-100 records are only recognised as hyper-trained when a species
    /// table is given with `--species`.
    Convert {
        /// Only report how entries would be classified
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Commands::Version = cli.command {
        println!("pkbank CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("pkbank core v{}", pkbank_core::VERSION);
        return Ok(());
    }

    let root = cli.root.ok_or("Storage root required (--root)")?;
    let ctx = Context::new(root, cli.archive_root, cli.config).with_species(cli.species);

    match cli.command {
        Commands::Inspect {
            name,
            slots,
            format,
        } => commands::inspect::run(&ctx, &name, slots, &format)?,
        Commands::Verify { name } => commands::verify::run(&ctx, &name)?,
        Commands::Backup { name } => commands::backup::run(&ctx, &name)?,
        Commands::Resize { name, boxes } => commands::resize::run(&ctx, &name, boxes)?,
        Commands::Rename {
            name,
            box_index,
            title,
        } => commands::rename::run(&ctx, &name, box_index, &title)?,
        Commands::Convert { dry_run } => commands::convert::run(&ctx, dry_run)?,
        Commands::Version => {}
    }

    Ok(())
}
