//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Motion rates and body-table settings.
    pub simulation: SimulationConfig,
    /// Drawing settings.
    pub render: RenderConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated days per real second.
    pub days_per_second: f64,
    /// Advance orbital phase.
    pub orbital_motion: bool,
    /// Advance spin angle.
    pub rotational_motion: bool,
    /// Minimum real time between simulation steps, in seconds.
    pub min_frame_interval: f64,
    /// Body radius that renders at scale 1 (km).
    pub reference_radius: f64,
    /// Vertex count of each orbit-path outline.
    pub orbit_path_vertices: u32,
    /// RON body table to load instead of the built-in solar system.
    pub bodies_file: Option<PathBuf>,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Draw orbit-path overlays.
    pub show_orbit_paths: bool,
    /// Frame pacing target (0 = unpaced).
    pub target_fps: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days_per_second: 1.0,
            orbital_motion: true,
            rotational_motion: true,
            min_frame_interval: 1.0 / 60.0,
            reference_radius: 6371.0,
            orbit_path_vertices: 1000,
            bodies_file: None,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            show_orbit_paths: true,
            target_fps: 60,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

const CONFIG_FILE: &str = "config.ron";

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let write_err = |source| ConfigError::Write {
            path: config_path.clone(),
            source,
        };

        std::fs::create_dir_all(config_dir).map_err(write_err)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(write_err)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Check numeric settings that the simulation cannot recover from.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a non-finite rate or a
    /// negative or non-finite frame interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if !sim.days_per_second.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "simulation.days_per_second",
                value: sim.days_per_second,
            });
        }
        if !(sim.min_frame_interval.is_finite() && sim.min_frame_interval >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "simulation.min_frame_interval",
                value: sim.min_frame_interval,
            });
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
}
