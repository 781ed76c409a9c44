// SPDX-License-Identifier: GPL-3.0-only

use camera_archive::constants::app_info;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "camera-archive")]
#[command(about = "Archive edited camera photos and videos")]
#[command(version = app_info::version())]
struct Cli {
    /// Configuration file (default: <config dir>/camera-archive/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive a batch of edit results
    ///
    /// Each slot is `image:EDITED,ORIGINAL`, `video:EDITED,ORIGINAL`, or `-`
    /// for an empty slot. Outcomes are printed in slot order.
    Archive {
        /// Export slots, in order
        #[arg(required = true)]
        slots: Vec<cli::SlotSpec>,

        /// Directory for archived originals (overrides config)
        #[arg(short, long)]
        save_dir: Option<PathBuf>,

        /// Directory for edited images (overrides config)
        #[arg(short, long)]
        temp_dir: Option<PathBuf>,

        /// Metadata entry embedded into every image, as KEY=VALUE
        #[arg(short, long = "info")]
        info: Vec<cli::InfoEntry>,

        /// Maximum saves in flight (overrides config)
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        /// Print outcomes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the metadata embedded in an archived image
    Inspect {
        /// Archived JPEG file
        file: PathBuf,
    },

    /// List archived images, newest first
    List {
        /// Directory to scan (default: configured save directory)
        dir: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=camera_archive=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Archive {
            slots,
            save_dir,
            temp_dir,
            info,
            jobs,
            json,
        } => cli::archive(
            cli.config.as_deref(),
            cli::ArchiveOverrides {
                save_dir,
                temp_dir,
                jobs,
            },
            slots,
            info,
            json,
        ),
        Commands::Inspect { file } => cli::inspect(&file),
        Commands::List { dir } => cli::list(cli.config.as_deref(), dir),
    }
}
