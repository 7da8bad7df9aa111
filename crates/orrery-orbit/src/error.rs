//! Errors raised while building a body registry.

/// Configuration errors for the body graph.
///
/// All of these are fatal at startup: the simulation never runs with an
/// inconsistent body graph.
#[derive(Debug, thiserror::Error)]
pub enum OrbitError {
    /// A descriptor names an orbital focus that no other descriptor defines.
    #[error("body '{body}' orbits unknown body '{focus}'")]
    UnknownFocus {
        /// The body whose focus could not be resolved.
        body: String,
        /// The missing focus name.
        focus: String,
    },

    /// An anchor body (orbital period 0) was given an orbital focus.
    #[error("anchor body '{body}' must not orbit anything (focus '{focus}')")]
    AnchorWithFocus {
        /// The anchor body.
        body: String,
        /// The focus it was given.
        focus: String,
    },

    /// Walking a body's focus chain exceeded the depth bound.
    #[error("focus chain of body '{body}' exceeds {max_depth} levels (cycle suspected)")]
    FocusChainTooDeep {
        /// The body whose chain was being walked.
        body: String,
        /// The depth bound that was exceeded.
        max_depth: usize,
    },

    /// Two descriptors share a name.
    #[error("duplicate body name: {0}")]
    DuplicateName(String),

    /// A descriptor has an empty name.
    #[error("body at index {0} has an empty name")]
    EmptyName(usize),

    /// A numeric parameter is out of range or not finite.
    #[error("body '{body}': invalid {field} ({value})")]
    InvalidParameter {
        /// The offending body.
        body: String,
        /// Field name.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The scale baseline must be a positive finite number.
    #[error("invalid reference radius: {0}")]
    InvalidReferenceRadius(f64),

    /// I/O error reading a body table.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// RON deserialization error in a body table.
    #[error("ron parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}
