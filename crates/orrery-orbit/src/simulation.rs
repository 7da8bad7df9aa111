//! Per-frame driver: converts real time into simulated days and runs the
//! update and read passes over a [`BodyRegistry`].
//!
//! The two passes are separate calls and never interleave. The update pass
//! advances every body's own motion state; the read pass composes world
//! matrices once every body has been advanced, so a child never sees its
//! focus's state from the previous tick.

use glam::DMat4;

use crate::body::{BodyId, MeshHandle};
use crate::ellipse::EllipseGeometry;
use crate::registry::BodyRegistry;

/// Frame intervals above this are logged as stalls. They are still applied
/// in full.
pub const LONG_FRAME_SECONDS: f64 = 0.25;

/// Default minimum real time between simulation steps (60 Hz).
pub const DEFAULT_MIN_FRAME_INTERVAL: f64 = 1.0 / 60.0;

/// Rate and enable flags for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSettings {
    /// Simulated days per real second.
    pub days_per_second: f64,
    /// Advance orbital phase.
    pub orbital_motion: bool,
    /// Advance spin angle.
    pub rotational_motion: bool,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            days_per_second: 1.0,
            orbital_motion: true,
            rotational_motion: true,
        }
    }
}

/// Source of elapsed real time.
pub trait Clock {
    /// Real seconds since the previous call.
    fn elapsed_seconds(&mut self) -> f64;
}

/// Source of the user-adjustable motion settings.
pub trait RateControl {
    /// Settings to apply this tick.
    fn motion_settings(&self) -> MotionSettings;

    /// Whether orbit-path overlays should be drawn.
    fn show_orbit_paths(&self) -> bool {
        true
    }
}

impl RateControl for MotionSettings {
    fn motion_settings(&self) -> MotionSettings {
        *self
    }
}

/// Consumer of per-body world matrices.
pub trait Renderer {
    /// Draw one body's mesh at its world matrix.
    fn draw_body(&mut self, transform: &BodyTransform);

    /// Draw one body's orbit outline in its focus frame.
    fn draw_orbit_path(&mut self, overlay: &OrbitOverlay<'_>);
}

/// Read-pass output for one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyTransform {
    pub id: BodyId,
    /// Final placement in scene space.
    pub world: DMat4,
    /// Orbit frame of the body's focus (identity without a focus).
    pub focus_frame: DMat4,
    pub mesh: MeshHandle,
}

/// Orbit outline of a body, positioned in the frame of its focus.
#[derive(Clone, Copy, Debug)]
pub struct OrbitOverlay<'a> {
    pub id: BodyId,
    pub focus_frame: DMat4,
    pub path: &'a EllipseGeometry,
}

/// Fixed-threshold accumulator of real time.
///
/// Real time piles up until it reaches `min_interval`; the whole pile is then
/// released at once. There is no sub-stepping and no interpolation.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameTimer {
    min_interval: f64,
    accumulated: f64,
}

impl FrameTimer {
    /// Create a timer; negative or non-finite intervals are treated as zero.
    pub fn new(min_interval: f64) -> Self {
        let min_interval = if min_interval.is_finite() {
            min_interval.max(0.0)
        } else {
            0.0
        };
        Self {
            min_interval,
            accumulated: 0.0,
        }
    }

    /// Add `real_seconds`; returns the accumulated total once it reaches the
    /// threshold. Negative or non-finite input is dropped.
    pub fn accumulate(&mut self, real_seconds: f64) -> Option<f64> {
        if !real_seconds.is_finite() || real_seconds < 0.0 {
            log::warn!("Ignoring invalid frame time {real_seconds}");
            return None;
        }

        self.accumulated += real_seconds;
        if self.accumulated > 0.0 && self.accumulated >= self.min_interval {
            let released = self.accumulated;
            self.accumulated = 0.0;
            Some(released)
        } else {
            None
        }
    }

    /// Real seconds waiting to be released.
    pub fn pending(&self) -> f64 {
        self.accumulated
    }

    pub fn min_interval(&self) -> f64 {
        self.min_interval
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_FRAME_INTERVAL)
    }
}

/// Owns the registry and drives it one frame at a time.
#[derive(Clone, Debug)]
pub struct Simulation {
    registry: BodyRegistry,
    timer: FrameTimer,
    elapsed_days: f64,
    tick_count: u64,
}

impl Simulation {
    /// Wrap a registry with a frame timer of `min_frame_interval` seconds.
    pub fn new(registry: BodyRegistry, min_frame_interval: f64) -> Self {
        Self {
            registry,
            timer: FrameTimer::new(min_frame_interval),
            elapsed_days: 0.0,
            tick_count: 0,
        }
    }

    /// Feed real time; runs the update pass when the timer fires.
    ///
    /// Returns the simulated days applied, or `None` if no step ran. A
    /// non-finite rate drops the released time without touching any body.
    pub fn advance(&mut self, real_seconds: f64, settings: &MotionSettings) -> Option<f64> {
        let real = self.timer.accumulate(real_seconds)?;
        if real > LONG_FRAME_SECONDS {
            log::warn!(
                "Frame interval {:.1}ms exceeds {:.0}ms, applying in one step",
                real * 1000.0,
                LONG_FRAME_SECONDS * 1000.0
            );
        }

        let days = real * settings.days_per_second;
        if !days.is_finite() {
            log::warn!(
                "Ignoring {:.1}ms frame at non-finite rate {} days/s",
                real * 1000.0,
                settings.days_per_second
            );
            return None;
        }
        self.step(days, settings);
        Some(days)
    }

    /// Update pass: advance every body by `delta_days`, parents first.
    ///
    /// Disabled motions are skipped here; bodies themselves have no enable
    /// state.
    pub fn step(&mut self, delta_days: f64, settings: &MotionSettings) {
        self.registry.for_each_in_update_order(|body| {
            if settings.rotational_motion {
                body.advance_spin(delta_days);
            }
            if settings.orbital_motion {
                body.advance_orbit(delta_days);
            }
        });
        self.elapsed_days += delta_days;
        self.tick_count += 1;
        log::trace!(
            "tick {}: +{delta_days:.5} days (total {:.3})",
            self.tick_count,
            self.elapsed_days
        );
    }

    /// Read pass: world matrices of every body, in configuration order.
    ///
    /// Frames are composed in update order, so each focus frame is computed
    /// once and reused by all of that body's satellites.
    pub fn world_transforms(&self) -> Vec<BodyTransform> {
        let n = self.registry.len();
        let mut orbit_frames = vec![DMat4::IDENTITY; n];
        let mut transforms: Vec<Option<BodyTransform>> = vec![None; n];

        for &id in self.registry.update_order() {
            let Some(body) = self.registry.get(id) else {
                continue;
            };
            let focus_frame = body
                .focus()
                .map_or(DMat4::IDENTITY, |focus| orbit_frames[focus.0]);
            orbit_frames[id.0] = body.orbit_frame(focus_frame);
            transforms[id.0] = Some(BodyTransform {
                id,
                world: body.world_matrix(focus_frame),
                focus_frame,
                mesh: body.mesh(),
            });
        }

        transforms.into_iter().flatten().collect()
    }

    /// One complete frame against the external collaborators: read the
    /// clock, maybe advance, then hand every world matrix to the renderer.
    ///
    /// Returns the simulated days applied this frame, if any.
    pub fn run_frame(
        &mut self,
        clock: &mut impl Clock,
        rate: &impl RateControl,
        renderer: &mut impl Renderer,
    ) -> Option<f64> {
        let settings = rate.motion_settings();
        let applied = self.advance(clock.elapsed_seconds(), &settings);

        let transforms = self.world_transforms();
        for transform in &transforms {
            renderer.draw_body(transform);
        }

        if rate.show_orbit_paths() {
            for transform in &transforms {
                if let Some(body) = self.registry.get(transform.id)
                    && body.focus().is_some()
                    && let Some(path) = body.orbit_path()
                {
                    renderer.draw_orbit_path(&OrbitOverlay {
                        id: transform.id,
                        focus_frame: transform.focus_frame,
                        path,
                    });
                }
            }
        }

        applied
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    /// Total simulated days applied so far.
    pub fn elapsed_days(&self) -> f64 {
        self.elapsed_days
    }

    /// Number of update passes run.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyDescriptor;
    use glam::DVec3;

    const EPS: f64 = 1e-9;

    fn desc(
        name: &str,
        focus: &str,
        radius: f64,
        period: f64,
        start: f64,
        a: f64,
        b: f64,
    ) -> BodyDescriptor {
        BodyDescriptor {
            name: name.to_string(),
            focus: focus.to_string(),
            axial_tilt_deg: 10.0,
            spin_rate_deg_per_day: 36.0,
            radius,
            orbital_period_days: period,
            starting_phase_deg: start,
            ellipse_a: a,
            ellipse_b: b,
            mesh: MeshHandle(0),
        }
    }

    fn earth_moon() -> Simulation {
        let registry = BodyRegistry::build(
            vec![
                desc("moon", "earth", 0.27, 1.5, 140.0, 5.0, 4.0),
                desc("sun", "", 109.0, 0.0, 0.0, 0.0, 0.0),
                desc("earth", "sun", 1.0, 6.0, 30.0, 350.0, 340.0),
            ],
            1.0,
        )
        .unwrap();
        Simulation::new(registry, 0.0)
    }

    fn mat_close(a: DMat4, b: DMat4) -> bool {
        a.abs_diff_eq(b, 1e-9)
    }

    fn translation(m: DMat4) -> DVec3 {
        m.w_axis.truncate()
    }

    #[test]
    fn test_two_body_scenario() {
        let registry = BodyRegistry::build(
            vec![
                BodyDescriptor {
                    axial_tilt_deg: 0.0,
                    spin_rate_deg_per_day: 0.0,
                    ..desc("S", "", 100.0, 0.0, 0.0, 0.0, 0.0)
                },
                BodyDescriptor {
                    axial_tilt_deg: 0.0,
                    ..desc("P", "S", 50.0, 10.0, 0.0, 100.0, 100.0)
                },
            ],
            crate::system::EARTH_RADIUS_KM,
        )
        .unwrap();
        let mut sim = Simulation::new(registry, 0.0);

        let applied = sim.advance(5.0, &MotionSettings::default());
        assert_eq!(applied, Some(5.0));

        let p = sim.registry().by_name("P").unwrap();
        assert!((p.orbital_phase() - 0.5).abs() < EPS);
        let local = translation(p.local_translation());
        assert!(local.x.abs() < 1e-9);
        assert!((local.z + 100.0).abs() < 1e-9);
        assert!(local.y.abs() < EPS);

        let transforms = sim.world_transforms();
        let p_id = sim.registry().id_of("P").unwrap();
        let world = transforms.iter().find(|t| t.id == p_id).unwrap().world;
        assert!((translation(world) - local).length() < 1e-9);
    }

    #[test]
    fn test_child_composes_with_current_focus_frame() {
        let mut sim = earth_moon();
        sim.advance(0.8, &MotionSettings::default());

        let registry = sim.registry();
        let earth = registry.by_name("earth").unwrap();
        let moon = registry.by_name("moon").unwrap();
        let moon_id = registry.id_of("moon").unwrap();

        let earth_frame = earth.orbit_frame(DMat4::IDENTITY);
        let expected = earth_frame
            * moon.local_translation()
            * moon.axial_tilt_rotation()
            * moon.spin_rotation()
            * moon.uniform_scale();

        let transforms = sim.world_transforms();
        let moon_t = transforms.iter().find(|t| t.id == moon_id).unwrap();
        assert!(mat_close(moon_t.world, expected));
        assert!(mat_close(moon_t.focus_frame, earth_frame));
        assert!(mat_close(registry.world_matrix(moon_id).unwrap(), expected));
    }

    #[test]
    fn test_read_pass_sees_this_ticks_focus_position() {
        let mut sim = earth_moon();
        let earth_id = sim.registry().id_of("earth").unwrap();
        let moon_id = sim.registry().id_of("moon").unwrap();

        let before = translation(sim.registry().get(earth_id).unwrap().local_translation());
        sim.advance(1.0, &MotionSettings::default());
        let after = translation(sim.registry().get(earth_id).unwrap().local_translation());
        assert!((after - before).length() > 1.0);

        let transforms = sim.world_transforms();
        let moon_t = transforms.iter().find(|t| t.id == moon_id).unwrap();
        assert!((translation(moon_t.focus_frame) - after).length() < EPS);
    }

    #[test]
    fn test_root_world_ignores_other_bodies() {
        let mut sim = earth_moon();
        let sun_id = sim.registry().id_of("sun").unwrap();
        sim.advance(2.5, &MotionSettings::default());

        let sun = sim.registry().get(sun_id).unwrap();
        let expected = sun.local_translation()
            * sun.axial_tilt_rotation()
            * sun.spin_rotation()
            * sun.uniform_scale();
        let transforms = sim.world_transforms();
        let sun_t = transforms.iter().find(|t| t.id == sun_id).unwrap();
        assert!(mat_close(sun_t.world, expected));
        assert_eq!(sun_t.focus_frame, DMat4::IDENTITY);
    }

    #[test]
    fn test_transforms_in_configuration_order() {
        let sim = earth_moon();
        let ids: Vec<usize> = sim.world_transforms().iter().map(|t| t.id.0).collect();
        assert_eq!(ids, [0, 1, 2]);
    }

    #[test]
    fn test_disabled_motion_is_skipped() {
        let mut sim = earth_moon();
        let settings = MotionSettings {
            days_per_second: 1.0,
            orbital_motion: false,
            rotational_motion: true,
        };
        let phase = sim.registry().by_name("earth").unwrap().orbital_phase();
        sim.advance(1.0, &settings);
        let earth = sim.registry().by_name("earth").unwrap();
        assert_eq!(earth.orbital_phase(), phase);
        assert!((earth.spin_angle_deg() - 36.0).abs() < EPS);

        let frozen = MotionSettings {
            rotational_motion: false,
            ..settings
        };
        sim.advance(1.0, &frozen);
        let earth = sim.registry().by_name("earth").unwrap();
        assert!((earth.spin_angle_deg() - 36.0).abs() < EPS);
        assert_eq!(sim.tick_count(), 2);
    }

    #[test]
    fn test_rate_scales_simulated_days() {
        let mut sim = earth_moon();
        let settings = MotionSettings {
            days_per_second: 3.0,
            ..MotionSettings::default()
        };
        let applied = sim.advance(0.5, &settings).unwrap();
        assert!((applied - 1.5).abs() < EPS);
        assert!((sim.elapsed_days() - 1.5).abs() < EPS);
    }

    #[test]
    fn test_timer_holds_until_threshold() {
        let mut timer = FrameTimer::new(0.1);
        assert_eq!(timer.accumulate(0.04), None);
        assert_eq!(timer.accumulate(0.04), None);
        let released = timer.accumulate(0.04).unwrap();
        assert!((released - 0.12).abs() < 1e-12);
        assert_eq!(timer.pending(), 0.0);
    }

    #[test]
    fn test_timer_ignores_invalid_input() {
        let mut timer = FrameTimer::new(0.0);
        assert_eq!(timer.accumulate(-1.0), None);
        assert_eq!(timer.accumulate(f64::NAN), None);
        assert_eq!(timer.accumulate(0.0), None);
        assert_eq!(timer.pending(), 0.0);
        assert_eq!(FrameTimer::new(f64::INFINITY).min_interval(), 0.0);
    }

    #[test]
    fn test_no_step_below_threshold() {
        let registry = BodyRegistry::build(
            vec![desc("sun", "", 1.0, 0.0, 0.0, 0.0, 0.0)],
            1.0,
        )
        .unwrap();
        let mut sim = Simulation::new(registry, 1.0);
        assert_eq!(sim.advance(0.5, &MotionSettings::default()), None);
        assert_eq!(sim.tick_count(), 0);
        assert!(sim.advance(0.5, &MotionSettings::default()).is_some());
        assert_eq!(sim.tick_count(), 1);
    }

    #[test]
    fn test_long_frame_applied_in_one_step() {
        let mut sim = earth_moon();
        let applied = sim.advance(2.0, &MotionSettings::default()).unwrap();
        assert!((applied - 2.0).abs() < EPS);
        assert_eq!(sim.tick_count(), 1);
    }

    #[test]
    fn test_non_finite_rate_leaves_state_intact() {
        let mut sim = earth_moon();
        let moon_id = sim.registry().id_of("moon").unwrap();
        let phase = sim.registry().get(moon_id).unwrap().orbital_phase();
        let spin = sim.registry().get(moon_id).unwrap().spin_angle_deg();

        for rate in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let settings = MotionSettings {
                days_per_second: rate,
                ..MotionSettings::default()
            };
            assert_eq!(sim.advance(0.1, &settings), None);
        }

        let moon = sim.registry().get(moon_id).unwrap();
        assert_eq!(moon.orbital_phase(), phase);
        assert_eq!(moon.spin_angle_deg(), spin);
        assert_eq!(sim.tick_count(), 0);
        assert_eq!(sim.elapsed_days(), 0.0);
        assert_eq!(sim.timer().pending(), 0.0);

        let applied = sim.advance(0.5, &MotionSettings::default()).unwrap();
        assert!((applied - 0.5).abs() < EPS);
        let moon = sim.registry().get(moon_id).unwrap();
        assert!(moon.orbital_phase().is_finite());
        assert!((moon.spin_angle_deg() - (spin + 18.0)).abs() < EPS);
        assert!(sim.world_transforms().iter().all(|t| t.world.is_finite()));
    }

    #[test]
    fn test_three_level_chain_under_orbiting_root() {
        let registry = BodyRegistry::build(
            vec![
                desc("leaf", "mid", 0.5, 2.0, 200.0, 3.0, 2.0),
                desc("mid", "root", 2.0, 9.0, 45.0, 40.0, 30.0),
                desc("root", "", 5.0, 30.0, 120.0, 500.0, 450.0),
            ],
            1.0,
        )
        .unwrap();
        let mut sim = Simulation::new(registry, 0.0);
        sim.advance(1.7, &MotionSettings::default());
        sim.advance(0.6, &MotionSettings::default());

        let registry = sim.registry();
        let root = registry.by_name("root").unwrap();
        let mid = registry.by_name("mid").unwrap();
        let leaf = registry.by_name("leaf").unwrap();
        let leaf_id = registry.id_of("leaf").unwrap();
        assert!(translation(root.local_translation()).length() > 1.0);

        let leaf_frame = root.local_translation() * mid.local_translation();
        let expected = leaf_frame
            * leaf.local_translation()
            * leaf.axial_tilt_rotation()
            * leaf.spin_rotation()
            * leaf.uniform_scale();

        let transforms = sim.world_transforms();
        let leaf_t = transforms.iter().find(|t| t.id == leaf_id).unwrap();
        assert!(mat_close(leaf_t.focus_frame, leaf_frame));
        assert!(mat_close(leaf_t.world, expected));
        assert!(mat_close(registry.focus_frame(leaf_id), leaf_frame));
        assert!(mat_close(registry.world_matrix(leaf_id).unwrap(), expected));
    }

    struct StepClock(f64);

    impl Clock for StepClock {
        fn elapsed_seconds(&mut self) -> f64 {
            self.0
        }
    }

    #[derive(Default)]
    struct Recorder {
        bodies: Vec<BodyTransform>,
        paths: Vec<(BodyId, usize)>,
    }

    impl Renderer for Recorder {
        fn draw_body(&mut self, transform: &BodyTransform) {
            self.bodies.push(*transform);
        }

        fn draw_orbit_path(&mut self, overlay: &OrbitOverlay<'_>) {
            self.paths.push((overlay.id, overlay.path.vertex_count()));
        }
    }

    struct HiddenPaths;

    impl RateControl for HiddenPaths {
        fn motion_settings(&self) -> MotionSettings {
            MotionSettings::default()
        }

        fn show_orbit_paths(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_run_frame_draws_bodies_and_paths() {
        let mut sim = earth_moon();
        let mut clock = StepClock(0.5);
        let mut recorder = Recorder::default();

        let applied = sim.run_frame(&mut clock, &MotionSettings::default(), &mut recorder);
        assert_eq!(applied, Some(0.5));
        assert_eq!(recorder.bodies.len(), 3);

        // The sun has no focus and no path; earth and moon each draw one.
        let sun_id = sim.registry().id_of("sun").unwrap();
        assert_eq!(recorder.paths.len(), 2);
        assert!(recorder.paths.iter().all(|(id, _)| *id != sun_id));
        assert!(
            recorder
                .paths
                .iter()
                .all(|(_, n)| *n == crate::ellipse::ORBIT_PATH_VERTICES as usize)
        );
    }

    #[test]
    fn test_run_frame_respects_hidden_paths() {
        let mut sim = earth_moon();
        let mut recorder = Recorder::default();
        sim.run_frame(&mut StepClock(0.1), &HiddenPaths, &mut recorder);
        assert_eq!(recorder.bodies.len(), 3);
        assert!(recorder.paths.is_empty());
    }
}
