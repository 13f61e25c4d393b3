//! Component B: integer edge arrangement.
//!
//! Snaps input paths onto an exact integer grid, sorts edges for locality,
//! finds every exact pairwise intersection, splits edges at those points,
//! and merges coincident directed sub-segments into a half-edge arena with
//! vertex-local `next`/`previous` pointers ready for boundary tracing.

pub mod grid;
pub mod halfedge;
pub mod hilbert;
pub mod intersect;
pub mod path;
pub mod winding;

pub use grid::{GridSnap, IntegerEdgeEndpoints, DEFAULT_GRID_BITS};
pub use halfedge::{HalfEdgeArena, HalfEdgeId, RationalHalfEdge};
pub(crate) use halfedge::{start_vertex_key, vertex_groups};
pub use path::{FillRule, PathId, RenderPath, Vector2};
pub use winding::WindingMap;

use crate::error::AlpenglowError;

/// The arrangement built from a scene's paths: the snap used to produce it
/// (needed to map results back to input units) and the resulting half-edge
/// arena.
#[derive(Clone, Debug)]
pub struct Arrangement {
    pub snap: GridSnap,
    pub edges: HalfEdgeArena,
}

/// Run the full pipeline (§4.B): grid-snap, Hilbert sort for locality, exact
/// intersection, split, merge, and vertex-rotation linking.
pub fn build_arrangement(paths: &[RenderPath]) -> Result<Arrangement, AlpenglowError> {
    build_arrangement_with_bits(paths, DEFAULT_GRID_BITS)
}

pub fn build_arrangement_with_bits(paths: &[RenderPath], grid_bits: u32) -> Result<Arrangement, AlpenglowError> {
    let (snap, mut raw_edges) = grid::snap_paths_with_bits(paths, grid_bits)?;

    let order = hilbert::sort_by_hilbert(&raw_edges, |e| e.aabb());
    raw_edges = order.into_iter().map(|i| raw_edges[i]).collect();

    let edges = halfedge::build_half_edges(&raw_edges)?;
    Ok(Arrangement { snap, edges })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scene_produces_empty_arrangement() {
        let arrangement = build_arrangement(&[]).unwrap();
        assert!(arrangement.edges.is_empty());
    }

    #[test]
    fn single_square_arrangement_has_one_boundary_worth_of_half_edges() {
        let square = RenderPath::new(
            FillRule::NonZero,
            vec![vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(10.0, 0.0),
                Vector2::new(10.0, 10.0),
                Vector2::new(0.0, 10.0),
            ]],
        );
        let arrangement = build_arrangement(&[square]).unwrap();
        assert_eq!(arrangement.edges.len(), 8);
    }
}
