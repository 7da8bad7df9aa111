//! `orrery`: headless driver for the animated solar system.
//!
//! Loads `config.ron` (creating it on first run), applies CLI overrides,
//! builds the body registry and runs the frame loop against a tracing
//! renderer. Edits to `config.ron` change the motion settings while
//! running. Window, shaders and meshes live behind the `Renderer` trait.
//!
//! Run with: `cargo run -p orrery-app -- --frames 600 --days-per-second 5`

mod driver;
mod platform;

use clap::Parser;
use orrery_config::{CliArgs, Config, ConfigError};
use orrery_orbit::OrbitError;
use tracing::info;

use crate::driver::{ConfigRate, TraceRenderer, WallClock};
use crate::platform::{PlatformDirs, PlatformError};

/// Fatal startup errors.
#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid body configuration: {0}")]
    Orbit(#[from] OrbitError),
}

fn main() {
    let args = CliArgs::parse();
    if let Err(e) = run(&args) {
        eprintln!("orrery: {e}");
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), AppError> {
    let dirs = PlatformDirs::resolve(args.config.as_deref())?;
    dirs.create_all()?;

    let on_disk = Config::load_or_create(&dirs.config_dir)?;
    let mut config = on_disk.clone();
    config.apply_cli_overrides(args);
    config.validate()?;

    orrery_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));

    info!("Orrery");
    info!("  config: {}", dirs.config_dir.display());
    info!(
        "  {} days/s | orbit {} | spin {} | paths {}",
        config.simulation.days_per_second,
        on_off(config.simulation.orbital_motion),
        on_off(config.simulation.rotational_motion),
        on_off(config.render.show_orbit_paths),
    );

    let mut sim = driver::build_simulation(&config)?;
    let mut rate = ConfigRate::watching(on_disk, dirs.config_dir.clone(), args.clone());
    let mut renderer = TraceRenderer::default();

    driver::run(
        &mut sim,
        &mut WallClock::new(),
        &mut rate,
        &mut renderer,
        args.frames,
        config.render.target_fps,
    );
    driver::log_summary(&sim, &renderer);
    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
