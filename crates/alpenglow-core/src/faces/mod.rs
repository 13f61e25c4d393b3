//! Component C: face / winding engine.
//!
//! Consumes the half-edge arena built by `arrangement` and produces
//! `RationalFace`s (outer boundary + nested holes, each tagged with a
//! per-path winding map), then offers Boolean combination on top of an
//! external face-tagging callback.

pub mod boundary;
pub mod nesting;
pub mod tagging;

pub use boundary::{trace_boundaries, Boundary, BoundaryId};
pub use nesting::{build_faces, FaceId, RationalFace};
pub use tagging::{boolean_op, compute_winding_maps, BooleanOp, PolygonalFace};

use crate::arrangement::{Arrangement, WindingMap};
use crate::error::AlpenglowError;

/// Run boundary tracing, hole nesting, and winding computation over an
/// arrangement, returning every face with its winding map attached.
pub fn build_face_graph(arrangement: &Arrangement) -> Result<Vec<(RationalFace, WindingMap)>, AlpenglowError> {
    let mut arena = arrangement.edges.clone();
    let boundaries = trace_boundaries(&mut arena)?;
    let faces = build_faces(&boundaries, &mut arena)?;
    let windings = compute_winding_maps(&faces, &boundaries, &arena)?;
    Ok(faces.into_iter().zip(windings).collect())
}
