//! Body tables: the built-in solar system and RON-loaded tables.
//!
//! Orbit radii and periods are compressed so every planet stays on screen and
//! completes a revolution within seconds at one simulated day per second.
//! Axial tilts, spin rates and radii are real values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::body::{BodyDescriptor, MeshHandle};
use crate::error::OrbitError;

/// Mean radius of the Earth in kilometers; the default scale baseline.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// An ordered table of body descriptors, as stored in RON.
///
/// ```ron
/// (
///     bodies: [
///         (name: "sun", axial_tilt_deg: 7.25, spin_rate_deg_per_day: 14.18,
///          radius: 696340.0, orbital_period_days: 0.0, ellipse_a: 0.0, ellipse_b: 0.0),
///     ],
/// )
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyTable {
    /// Descriptors in configuration order.
    pub bodies: Vec<BodyDescriptor>,
}

impl BodyTable {
    /// Load a table from a RON file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`OrbitError::Io`] or [`OrbitError::Ron`].
    pub fn load(path: &Path) -> Result<Self, OrbitError> {
        let contents = std::fs::read_to_string(path)?;
        let table = Self::from_ron_str(&contents)?;
        log::info!(
            "Loaded {} bodies from {}",
            table.bodies.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse a table from a RON string.
    ///
    /// # Errors
    ///
    /// Returns [`OrbitError::Ron`] on malformed input.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, OrbitError> {
        Ok(ron::from_str(ron_str)?)
    }

    /// Serialize the table as pretty RON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error unchanged.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new().depth_limit(3))
    }
}

/// The built-in solar system: the sun, eight planets and six moons.
///
/// Mesh handles follow table order.
pub fn solar_system() -> Vec<BodyDescriptor> {
    // name, focus, tilt, spin, radius (km), period (days), start (deg), a, b
    const TABLE: [(&str, &str, f64, f64, f64, f64, f64, f64, f64); 15] = [
        ("sun", "", 7.25, 14.18, 696_340.0, 0.0, 0.0, 0.0, 0.0),
        ("mercury", "sun", 0.03, 6.14, 2440.0, 3.0, 0.0, 320.0, 320.0),
        ("venus", "sun", 2.64, -1.48, 6052.0, 5.0, 0.0, 335.0, 335.0),
        ("earth", "sun", 23.44, 360.99, 6371.0, 6.0, 0.0, 350.0, 350.0),
        ("mars", "sun", 25.19, 350.89, 3390.0, 7.0, 0.0, 365.0, 365.0),
        ("jupiter", "sun", 3.13, 870.54, 69_911.0, 9.0, 0.0, 500.0, 500.0),
        ("saturn", "sun", 26.73, 810.79, 58_232.0, 11.0, 0.0, 600.0, 600.0),
        ("uranus", "sun", 82.23, -501.16, 25_362.0, 13.0, 0.0, 680.0, 680.0),
        ("neptune", "sun", 28.32, 536.31, 24_622.0, 15.0, 0.0, 720.0, 720.0),
        ("moon", "earth", 0.0, 30.0, 1737.5, 1.5, 140.0, 5.0, 5.0),
        ("titan", "saturn", 0.0, 30.0, 2575.0, 1.5, 140.0, 40.0, 40.0),
        ("io", "jupiter", 0.0, 30.0, 1821.5, 1.0, 60.0, 40.0, 40.0),
        ("europa", "jupiter", 0.0, 30.0, 1561.0, 2.0, 80.0, 45.0, 45.0),
        ("ganymede", "jupiter", 0.0, 30.0, 2631.0, 3.0, 100.0, 50.0, 50.0),
        ("callisto", "jupiter", 0.0, 30.0, 2410.5, 5.0, 120.0, 55.0, 55.0),
    ];

    TABLE
        .iter()
        .zip(0u32..)
        .map(
            |(&(name, focus, tilt, spin, radius, period, start, a, b), mesh)| BodyDescriptor {
                name: name.to_string(),
                focus: focus.to_string(),
                axial_tilt_deg: tilt,
                spin_rate_deg_per_day: spin,
                radius,
                orbital_period_days: period,
                starting_phase_deg: start,
                ellipse_a: a,
                ellipse_b: b,
                mesh: MeshHandle(mesh),
            },
        )
        .collect()
}
