//! Error taxonomy (§7). Every fallible entry point in this crate returns
//! `Result<_, AlpenglowError>`; there is no panic-based error signaling
//! outside of internal invariant checks that indicate a bug in this crate
//! rather than bad caller input.

use thiserror::Error;

/// The four error categories named by §7, plus the detail needed to act on
/// each at the call site.
#[derive(Debug, Error)]
pub enum AlpenglowError {
    /// An internal consistency check failed — a bug in this crate, not a
    /// caller mistake (e.g. a non-finite vertex slipping past validation, or
    /// a half-edge arena ending up with an unmatched reverse pointer).
    #[error("invariant violation: {detail}")]
    InvariantViolation { detail: String },

    /// Input fell outside the numeric range this pipeline can represent
    /// exactly, e.g. the grid-snap precision budget (§4.B step 1).
    #[error("numeric range exceeded: {detail}")]
    NumericRange { detail: String },

    /// The caller asked for a `RenderProgram` node, clip mode, or config
    /// combination this build does not implement.
    #[error("unsupported capability: {detail}")]
    UnsupportedCapability { detail: String },

    /// A configured limit (tile count, face count, recursion depth) was
    /// exceeded before the operation could complete.
    #[error("resource exhausted: {detail}")]
    ResourceExhausted { detail: String },
}

pub type Result<T> = std::result::Result<T, AlpenglowError>;
