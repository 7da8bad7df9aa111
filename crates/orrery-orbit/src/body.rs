//! A single celestial body: static parameters, motion state, and transforms.

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

use crate::ellipse::EllipseGeometry;

/// Index of a body inside its owning [`BodyRegistry`](crate::BodyRegistry).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

/// Handle to a drawable mesh owned by the renderer's mesh store.
///
/// The body holds the only copy; it is dropped together with the body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeshHandle(pub u32);

/// Configuration record for one body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyDescriptor {
    /// Unique name.
    pub name: String,
    /// Name of the body this one orbits, empty for none.
    #[serde(default)]
    pub focus: String,
    /// Axial tilt in degrees.
    pub axial_tilt_deg: f64,
    /// Spin rate in degrees per simulated day. Negative spins retrograde.
    pub spin_rate_deg_per_day: f64,
    /// Physical radius, in the same unit as the registry's reference radius.
    pub radius: f64,
    /// Orbital period in simulated days. `0` marks a non-orbiting anchor.
    pub orbital_period_days: f64,
    /// Starting position along the orbit, in degrees.
    #[serde(default)]
    pub starting_phase_deg: f64,
    /// Ellipse semi-axis along X.
    pub ellipse_a: f64,
    /// Ellipse semi-axis along Z.
    pub ellipse_b: f64,
    /// Drawable geometry for this body.
    #[serde(default)]
    pub mesh: MeshHandle,
}

impl BodyDescriptor {
    /// Whether this descriptor describes an anchor (orbital period 0).
    pub fn is_anchor(&self) -> bool {
        self.orbital_period_days == 0.0
    }
}

/// One celestial body with its own spin and orbital motion.
///
/// Motion state only ever touches this body. Placement relative to the
/// orbital focus is supplied by the caller as a focus frame, which keeps the
/// body free of references into the registry.
#[derive(Clone, Debug)]
pub struct OrbitalBody {
    name: String,
    focus_name: String,
    focus: Option<BodyId>,

    axial_tilt_deg: f64,
    spin_rate_deg_per_day: f64,
    radius: f64,
    orbital_period_days: f64,
    ellipse_a: f64,
    ellipse_b: f64,
    reference_radius: f64,

    spin_angle_deg: f64,
    orbital_phase: f64,
    local_translation: DMat4,

    mesh: MeshHandle,
    orbit_path: Option<EllipseGeometry>,
}

impl OrbitalBody {
    /// Create a body from its descriptor with the focus left unresolved.
    ///
    /// The starting phase is converted from degrees to revolutions and the
    /// local translation is placed at it immediately. Orbiting bodies get an
    /// orbit path of `path_vertices` points; anchors get none.
    pub fn new(desc: BodyDescriptor, reference_radius: f64, path_vertices: u32) -> Self {
        let orbit_path = (!desc.is_anchor()).then(|| {
            EllipseGeometry::generate(desc.ellipse_a as f32, desc.ellipse_b as f32, path_vertices)
        });

        let orbital_phase = desc.starting_phase_deg / 360.0;
        let local_translation =
            DMat4::from_translation(ellipse_position(desc.ellipse_a, desc.ellipse_b, orbital_phase));

        Self {
            name: desc.name,
            focus_name: desc.focus,
            focus: None,
            axial_tilt_deg: desc.axial_tilt_deg,
            spin_rate_deg_per_day: desc.spin_rate_deg_per_day,
            radius: desc.radius,
            orbital_period_days: desc.orbital_period_days,
            ellipse_a: desc.ellipse_a,
            ellipse_b: desc.ellipse_b,
            reference_radius,
            spin_angle_deg: 0.0,
            orbital_phase,
            local_translation,
            mesh: desc.mesh,
            orbit_path,
        }
    }

    pub(crate) fn set_focus(&mut self, focus: BodyId) {
        self.focus = Some(focus);
    }

    /// Accumulate spin. The angle is left unwrapped.
    pub fn advance_spin(&mut self, delta_days: f64) {
        self.spin_angle_deg += delta_days * self.spin_rate_deg_per_day;
    }

    /// Accumulate orbital phase and move the local translation along the
    /// ellipse. Anchors do not move.
    pub fn advance_orbit(&mut self, delta_days: f64) {
        if self.is_anchor() {
            return;
        }
        self.orbital_phase += delta_days / self.orbital_period_days;
        self.local_translation = DMat4::from_translation(ellipse_position(
            self.ellipse_a,
            self.ellipse_b,
            self.orbital_phase,
        ));
    }

    /// Cached translation along the orbit, relative to the focus.
    pub fn local_translation(&self) -> DMat4 {
        self.local_translation
    }

    /// Fixed tilt about +Z by the axial tilt.
    pub fn axial_tilt_rotation(&self) -> DMat4 {
        DMat4::from_rotation_z(self.axial_tilt_deg.to_radians())
    }

    /// Rotation about the body's own vertical axis by the current spin angle.
    pub fn spin_rotation(&self) -> DMat4 {
        DMat4::from_rotation_y(self.spin_angle_deg.to_radians())
    }

    /// Uniform scale of `radius / reference_radius`.
    pub fn uniform_scale(&self) -> DMat4 {
        DMat4::from_scale(DVec3::splat(self.scale_factor()))
    }

    /// The frame this body's satellites orbit in: `focus_frame × local_translation`.
    pub fn orbit_frame(&self, focus_frame: DMat4) -> DMat4 {
        focus_frame * self.local_translation
    }

    /// Final placement:
    /// `focus_frame × local_translation × tilt × spin × scale`.
    ///
    /// `focus_frame` must come from a focus already advanced this tick; pass
    /// [`DMat4::IDENTITY`] for a body without a focus.
    pub fn world_matrix(&self, focus_frame: DMat4) -> DMat4 {
        self.orbit_frame(focus_frame)
            * self.axial_tilt_rotation()
            * self.spin_rotation()
            * self.uniform_scale()
    }

    /// Unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured focus name, empty for none.
    pub fn focus_name(&self) -> &str {
        &self.focus_name
    }

    /// Resolved orbital focus.
    pub fn focus(&self) -> Option<BodyId> {
        self.focus
    }

    /// Period 0 marks a body that does not orbit.
    pub fn is_anchor(&self) -> bool {
        self.orbital_period_days == 0.0
    }

    pub fn spin_angle_deg(&self) -> f64 {
        self.spin_angle_deg
    }

    /// Revolutions completed, including the starting phase.
    pub fn orbital_phase(&self) -> f64 {
        self.orbital_phase
    }

    pub fn orbital_period_days(&self) -> f64 {
        self.orbital_period_days
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn scale_factor(&self) -> f64 {
        self.radius / self.reference_radius
    }

    pub fn mesh(&self) -> MeshHandle {
        self.mesh
    }

    /// Orbit outline in the focus frame, absent for anchors.
    pub fn orbit_path(&self) -> Option<&EllipseGeometry> {
        self.orbit_path.as_ref()
    }
}

/// Point on the orbit ellipse at `phase` revolutions.
pub fn ellipse_position(a: f64, b: f64, phase: f64) -> DVec3 {
    let angle = std::f64::consts::TAU * phase;
    DVec3::new(a * angle.sin(), 0.0, b * angle.cos())
}
