// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use visionsnap::app::AppModel;
use visionsnap::constants::ui;
use visionsnap::i18n;

mod cli;

#[derive(Parser)]
#[command(name = "visionsnap")]
#[command(about = "Snap a photo and label what is in it")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List,

    /// Take a photo and print its top label
    Snap {
        /// Camera index to use (from 'visionsnap list')
        #[arg(short, long, default_value = "0")]
        camera: usize,

        /// Also save the captured image to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Label an existing image file
    Classify {
        /// Image to label
        file: PathBuf,

        /// Print every label with its confidence as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=visionsnap=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List) => cli::list_cameras(),
        Some(Commands::Snap { camera, output }) => cli::snap(camera, output),
        Some(Commands::Classify { file, json }) => cli::classify_file(file, json),
        None => run_gui(),
    }
}

fn run_gui() -> Result<(), Box<dyn std::error::Error>> {
    // Get the system's preferred languages.
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();

    // Enable localizations to be applied.
    i18n::init(&requested_languages);

    let settings = cosmic::app::Settings::default().size_limits(
        cosmic::iced::Limits::NONE
            .min_width(ui::MIN_WIDTH)
            .min_height(ui::MIN_HEIGHT),
    );

    cosmic::app::run::<AppModel>(settings, ())?;

    Ok(())
}
