//! Body registry: owns every [`OrbitalBody`] and resolves orbital-focus names.
//!
//! Construction runs in two phases. Phase 1 creates every body with its focus
//! unset and fills the name lookup; phase 2 resolves focus names into
//! [`BodyId`]s. Configuration order is free: a moon may be listed before the
//! planet it orbits.

use glam::DMat4;
use rustc_hash::FxHashMap;

use crate::body::{BodyDescriptor, BodyId, OrbitalBody};
use crate::ellipse::ORBIT_PATH_VERTICES;
use crate::error::OrbitError;

/// Depth bound for focus chains (star → planet → moon needs 2).
pub const MAX_FOCUS_DEPTH: usize = 8;

/// Build-time options for a registry.
#[derive(Clone, Debug, PartialEq)]
pub struct RegistryOptions {
    /// Radius that maps to a uniform scale of 1.
    pub reference_radius: f64,
    /// Vertex count of each body's orbit-path outline.
    pub orbit_path_vertices: u32,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            reference_radius: crate::system::EARTH_RADIUS_KM,
            orbit_path_vertices: ORBIT_PATH_VERTICES,
        }
    }
}

/// Owning arena of bodies with name lookup and a parents-first update order.
///
/// The focus graph is immutable after construction.
#[derive(Clone, Debug)]
pub struct BodyRegistry {
    /// Dense array: index == `BodyId.0`, in configuration order.
    bodies: Vec<OrbitalBody>,
    /// name → `BodyId`.
    name_to_id: FxHashMap<String, BodyId>,
    /// Every id, parents before children.
    update_order: Vec<BodyId>,
}

impl BodyRegistry {
    /// Build a registry with the given scale baseline and default orbit-path
    /// resolution.
    ///
    /// # Errors
    ///
    /// Returns [`OrbitError`] if the body graph is inconsistent.
    pub fn build(
        descriptors: Vec<BodyDescriptor>,
        reference_radius: f64,
    ) -> Result<Self, OrbitError> {
        Self::build_with(
            descriptors,
            &RegistryOptions {
                reference_radius,
                ..RegistryOptions::default()
            },
        )
    }

    /// Build a registry with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`OrbitError`] on invalid parameters, duplicate or empty
    /// names, unknown focus names, an anchor with a focus, or a focus chain
    /// deeper than [`MAX_FOCUS_DEPTH`].
    pub fn build_with(
        descriptors: Vec<BodyDescriptor>,
        options: &RegistryOptions,
    ) -> Result<Self, OrbitError> {
        if !(options.reference_radius.is_finite() && options.reference_radius > 0.0) {
            return Err(OrbitError::InvalidReferenceRadius(options.reference_radius));
        }

        // Phase 1: instantiate bodies, focus unset.
        let mut bodies = Vec::with_capacity(descriptors.len());
        let mut name_to_id = FxHashMap::default();
        for (index, desc) in descriptors.into_iter().enumerate() {
            validate_descriptor(index, &desc)?;
            if name_to_id.contains_key(&desc.name) {
                return Err(OrbitError::DuplicateName(desc.name));
            }
            name_to_id.insert(desc.name.clone(), BodyId(index));
            bodies.push(OrbitalBody::new(
                desc,
                options.reference_radius,
                options.orbit_path_vertices,
            ));
        }

        // Phase 2: resolve focus names.
        for body in &mut bodies {
            if body.focus_name().is_empty() {
                continue;
            }
            if body.is_anchor() {
                return Err(OrbitError::AnchorWithFocus {
                    body: body.name().to_string(),
                    focus: body.focus_name().to_string(),
                });
            }
            let focus = *name_to_id
                .get(body.focus_name())
                .ok_or_else(|| OrbitError::UnknownFocus {
                    body: body.name().to_string(),
                    focus: body.focus_name().to_string(),
                })?;
            log::debug!("{} orbits {}", body.name(), body.focus_name());
            body.set_focus(focus);
        }

        let depths = focus_depths(&bodies)?;
        let mut update_order: Vec<BodyId> = (0..bodies.len()).map(BodyId).collect();
        update_order.sort_by_key(|id| depths[id.0]);

        log::info!(
            "Built body registry: {} bodies, max focus depth {}",
            bodies.len(),
            depths.iter().copied().max().unwrap_or(0)
        );

        Ok(Self {
            bodies,
            name_to_id,
            update_order,
        })
    }

    /// Bodies in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &OrbitalBody)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(index, body)| (BodyId(index), body))
    }

    /// Every id, each body's focus listed before the body itself.
    pub fn update_order(&self) -> &[BodyId] {
        &self.update_order
    }

    pub fn get(&self, id: BodyId) -> Option<&OrbitalBody> {
        self.bodies.get(id.0)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut OrbitalBody> {
        self.bodies.get_mut(id.0)
    }

    /// Look up a body id by name.
    pub fn id_of(&self, name: &str) -> Option<BodyId> {
        self.name_to_id.get(name).copied()
    }

    /// Look up a body by name.
    pub fn by_name(&self, name: &str) -> Option<&OrbitalBody> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Visit every body mutably, parents before children.
    pub(crate) fn for_each_in_update_order(&mut self, mut f: impl FnMut(&mut OrbitalBody)) {
        for id in &self.update_order {
            f(&mut self.bodies[id.0]);
        }
    }

    /// The frame `id` orbits in: the orbit frame of its focus, composed down
    /// from the root. Identity for a body without a focus.
    ///
    /// Walks the chain iteratively; intended for introspection. The per-tick
    /// read pass in [`Simulation`](crate::Simulation) composes frames in
    /// update order instead.
    pub fn focus_frame(&self, id: BodyId) -> DMat4 {
        let mut chain = Vec::with_capacity(MAX_FOCUS_DEPTH);
        let mut current = self.get(id).and_then(OrbitalBody::focus);
        while let Some(focus) = current {
            chain.push(focus);
            current = self.bodies[focus.0].focus();
        }

        chain
            .iter()
            .rev()
            .fold(DMat4::IDENTITY, |frame, focus| {
                self.bodies[focus.0].orbit_frame(frame)
            })
    }

    /// Full world matrix of `id`, or `None` for an unknown id.
    pub fn world_matrix(&self, id: BodyId) -> Option<DMat4> {
        let body = self.get(id)?;
        Some(body.world_matrix(self.focus_frame(id)))
    }
}

fn validate_descriptor(index: usize, desc: &BodyDescriptor) -> Result<(), OrbitError> {
    if desc.name.is_empty() {
        return Err(OrbitError::EmptyName(index));
    }

    let invalid = |field: &'static str, value: f64| OrbitError::InvalidParameter {
        body: desc.name.clone(),
        field,
        value,
    };

    let fields = [
        ("axial_tilt_deg", desc.axial_tilt_deg),
        ("spin_rate_deg_per_day", desc.spin_rate_deg_per_day),
        ("radius", desc.radius),
        ("orbital_period_days", desc.orbital_period_days),
        ("starting_phase_deg", desc.starting_phase_deg),
        ("ellipse_a", desc.ellipse_a),
        ("ellipse_b", desc.ellipse_b),
    ];
    if let Some((field, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
        return Err(invalid(*field, *value));
    }
    if desc.radius < 0.0 {
        return Err(invalid("radius", desc.radius));
    }
    if desc.orbital_period_days < 0.0 {
        return Err(invalid("orbital_period_days", desc.orbital_period_days));
    }
    Ok(())
}

/// Chain depth of every body, failing if any chain exceeds the bound.
fn focus_depths(bodies: &[OrbitalBody]) -> Result<Vec<usize>, OrbitError> {
    bodies
        .iter()
        .map(|body| {
            let mut depth = 0;
            let mut current = body.focus();
            while let Some(focus) = current {
                depth += 1;
                if depth > MAX_FOCUS_DEPTH {
                    return Err(OrbitError::FocusChainTooDeep {
                        body: body.name().to_string(),
                        max_depth: MAX_FOCUS_DEPTH,
                    });
                }
                current = bodies[focus.0].focus();
            }
            Ok(depth)
        })
        .collect()
}
