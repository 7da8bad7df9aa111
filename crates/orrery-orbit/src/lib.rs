//! Hierarchical orbital transforms for an animated solar system.
//!
//! Bodies spin and revolve on fixed closed-form ellipses around the body they
//! orbit (their orbital focus). A [`BodyRegistry`] owns every body and
//! resolves focus names into ids in a second construction phase; a
//! [`Simulation`] advances all bodies each frame and then composes their world
//! matrices down the focus chain.

mod body;
mod ellipse;
mod error;
mod registry;
mod simulation;
mod system;

pub use body::{BodyDescriptor, BodyId, MeshHandle, OrbitalBody, ellipse_position};
pub use ellipse::{EllipseGeometry, ORBIT_PATH_VERTICES};
pub use error::OrbitError;
pub use registry::{BodyRegistry, MAX_FOCUS_DEPTH, RegistryOptions};
pub use simulation::{
    BodyTransform, Clock, DEFAULT_MIN_FRAME_INTERVAL, FrameTimer, LONG_FRAME_SECONDS,
    MotionSettings, OrbitOverlay, RateControl, Renderer, Simulation,
};
pub use system::{BodyTable, EARTH_RADIUS_KM, solar_system};
