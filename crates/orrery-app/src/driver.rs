//! Headless frame loop: wall clock, config-backed rate control and a tracing
//! renderer wired around [`Simulation`].

use std::path::PathBuf;
use std::time::{Duration, Instant};

use glam::DVec3;
use orrery_config::{CliArgs, Config};
use orrery_orbit::{
    BodyRegistry, BodyTable, BodyTransform, Clock, MotionSettings, OrbitError, OrbitOverlay,
    RateControl, RegistryOptions, Renderer, Simulation, solar_system,
};
use tracing::{debug, info, trace, warn};

/// Build the simulation described by `config`: the RON body table when one
/// is configured, the built-in solar system otherwise.
///
/// # Errors
///
/// Returns [`OrbitError`] if the table cannot be read or the body graph is
/// inconsistent.
pub fn build_simulation(config: &Config) -> Result<Simulation, OrbitError> {
    let descriptors = match &config.simulation.bodies_file {
        Some(path) => BodyTable::load(path)?.bodies,
        None => solar_system(),
    };

    let options = RegistryOptions {
        reference_radius: config.simulation.reference_radius,
        orbit_path_vertices: config.simulation.orbit_path_vertices,
    };
    let registry = BodyRegistry::build_with(descriptors, &options)?;
    Ok(Simulation::new(
        registry,
        config.simulation.min_frame_interval,
    ))
}

/// Real time measured between calls.
pub struct WallClock {
    previous: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            previous: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn elapsed_seconds(&mut self) -> f64 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.previous).as_secs_f64();
        self.previous = now;
        elapsed
    }
}

/// How often [`run`] checks `config.ron` for edits.
pub const RELOAD_INTERVAL: Duration = Duration::from_secs(1);

/// On-disk config being followed, plus the CLI overrides layered on top.
#[derive(Clone, Debug)]
struct ConfigWatch {
    dir: PathBuf,
    on_disk: Config,
    overrides: CliArgs,
}

/// Motion settings taken from the loaded configuration, optionally kept in
/// step with later edits to `config.ron`.
#[derive(Clone, Debug)]
pub struct ConfigRate {
    settings: MotionSettings,
    show_orbit_paths: bool,
    watch: Option<ConfigWatch>,
}

impl ConfigRate {
    /// Fixed settings from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            settings: MotionSettings {
                days_per_second: config.simulation.days_per_second,
                orbital_motion: config.simulation.orbital_motion,
                rotational_motion: config.simulation.rotational_motion,
            },
            show_orbit_paths: config.render.show_orbit_paths,
            watch: None,
        }
    }

    /// Settings from `on_disk` with `overrides` applied, re-read from
    /// `config_dir` on every [`poll`](Self::poll).
    pub fn watching(on_disk: Config, config_dir: PathBuf, overrides: CliArgs) -> Self {
        let mut effective = on_disk.clone();
        effective.apply_cli_overrides(&overrides);
        Self {
            watch: Some(ConfigWatch {
                dir: config_dir,
                on_disk,
                overrides,
            }),
            ..Self::from_config(&effective)
        }
    }

    /// Re-read `config.ron` and adopt its settings.
    ///
    /// Returns `true` if the motion settings or path visibility changed. A
    /// missing or invalid file keeps the current settings.
    pub fn poll(&mut self) -> bool {
        let Some(watch) = self.watch.as_mut() else {
            return false;
        };
        let reloaded = match watch.on_disk.reload(&watch.dir) {
            Ok(Some(config)) => config,
            Ok(None) => return false,
            Err(e) => {
                warn!("keeping current motion settings: {e}");
                return false;
            }
        };

        let mut effective = reloaded.clone();
        effective.apply_cli_overrides(&watch.overrides);
        watch.on_disk = reloaded;

        let updated = Self::from_config(&effective);
        if updated.settings == self.settings && updated.show_orbit_paths == self.show_orbit_paths
        {
            return false;
        }
        self.settings = updated.settings;
        self.show_orbit_paths = updated.show_orbit_paths;
        info!(
            days_per_second = self.settings.days_per_second,
            orbital_motion = self.settings.orbital_motion,
            rotational_motion = self.settings.rotational_motion,
            show_orbit_paths = self.show_orbit_paths,
            "motion settings reloaded"
        );
        true
    }
}

impl RateControl for ConfigRate {
    fn motion_settings(&self) -> MotionSettings {
        self.settings
    }

    fn show_orbit_paths(&self) -> bool {
        self.show_orbit_paths
    }
}

/// Renderer stand-in that records the latest placement of every body and
/// traces each draw call.
#[derive(Debug, Default)]
pub struct TraceRenderer {
    positions: Vec<DVec3>,
    body_draws: u64,
    path_draws: u64,
}

impl TraceRenderer {
    /// Latest world-space position per body, indexed by `BodyId`.
    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    pub fn body_draws(&self) -> u64 {
        self.body_draws
    }

    pub fn path_draws(&self) -> u64 {
        self.path_draws
    }
}

impl Renderer for TraceRenderer {
    fn draw_body(&mut self, transform: &BodyTransform) {
        let index = transform.id.0;
        if self.positions.len() <= index {
            self.positions.resize(index + 1, DVec3::ZERO);
        }
        let position = transform.world.w_axis.truncate();
        self.positions[index] = position;
        self.body_draws += 1;
        trace!(
            body = index,
            mesh = transform.mesh.0,
            x = position.x,
            y = position.y,
            z = position.z,
            "draw body"
        );
    }

    fn draw_orbit_path(&mut self, overlay: &OrbitOverlay<'_>) {
        self.path_draws += 1;
        trace!(
            body = overlay.id.0,
            vertices = overlay.path.vertex_count(),
            "draw orbit path"
        );
    }
}

/// Run frames until `frames` have been rendered (forever when `None`),
/// sleeping to approximate `target_fps` (unpaced when 0). `rate` is polled
/// for config edits every [`RELOAD_INTERVAL`].
pub fn run(
    sim: &mut Simulation,
    clock: &mut impl Clock,
    rate: &mut ConfigRate,
    renderer: &mut impl Renderer,
    frames: Option<u64>,
    target_fps: u32,
) -> u64 {
    let frame_budget = (target_fps > 0).then(|| Duration::from_secs_f64(1.0 / target_fps as f64));
    let mut rendered = 0u64;
    let mut last_reload = Instant::now();

    while frames.is_none_or(|limit| rendered < limit) {
        let frame_start = Instant::now();
        if frame_start.duration_since(last_reload) >= RELOAD_INTERVAL {
            rate.poll();
            last_reload = frame_start;
        }
        if let Some(days) = sim.run_frame(clock, &*rate, renderer) {
            debug!(
                tick = sim.tick_count(),
                days, "advanced simulation"
            );
        }
        rendered += 1;

        if let Some(budget) = frame_budget {
            let spent = frame_start.elapsed();
            if spent < budget {
                std::thread::sleep(budget - spent);
            }
        }
    }

    info!(
        frames = rendered,
        ticks = sim.tick_count(),
        days = sim.elapsed_days(),
        "run finished"
    );
    rendered
}

/// Log the final position of every body.
pub fn log_summary(sim: &Simulation, renderer: &TraceRenderer) {
    for (id, body) in sim.registry().iter() {
        let position = renderer
            .positions()
            .get(id.0)
            .copied()
            .unwrap_or(DVec3::ZERO);
        info!(
            "{:>10}  phase {:>8.3} rev  spin {:>10.1}°  at ({:>8.2}, {:>8.2}, {:>8.2})",
            body.name(),
            body.orbital_phase(),
            body.spin_angle_deg(),
            position.x,
            position.y,
            position.z
        );
    }
}
