//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "orrery", about = "Animated solar system")]
pub struct CliArgs {
    /// Simulated days per real second.
    #[arg(long, value_parser = parse_rate)]
    pub days_per_second: Option<f64>,

    /// Freeze orbital motion.
    #[arg(long)]
    pub no_orbit: bool,

    /// Freeze spin.
    #[arg(long)]
    pub no_spin: bool,

    /// Do not draw orbit paths.
    #[arg(long)]
    pub hide_orbits: bool,

    /// RON body table to load instead of the built-in solar system.
    #[arg(long)]
    pub bodies: Option<PathBuf>,

    /// Stop after this many frames (runs until interrupted otherwise).
    #[arg(long)]
    pub frames: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Parse a rate, rejecting `NaN` and infinities.
fn parse_rate(value: &str) -> Result<f64, String> {
    let rate: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if rate.is_finite() {
        Ok(rate)
    } else {
        Err(format!("rate must be finite, got {value}"))
    }
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(rate) = args.days_per_second {
            self.simulation.days_per_second = rate;
        }
        if args.no_orbit {
            self.simulation.orbital_motion = false;
        }
        if args.no_spin {
            self.simulation.rotational_motion = false;
        }
        if args.hide_orbits {
            self.render.show_orbit_paths = false;
        }
        if let Some(ref path) = args.bodies {
            self.simulation.bodies_file = Some(path.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
