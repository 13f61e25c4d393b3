//! Boundary tracing (§4.C): walk `next` pointers to closed loops, signed by
//! the shoelace area of their cached `f32` projections.

use crate::arrangement::{HalfEdgeArena, HalfEdgeId};
use crate::error::AlpenglowError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoundaryId(pub u32);

/// One closed loop of half-edges. `signed_area > 0` means an outer
/// boundary; `signed_area < 0` means an inner boundary (a hole, to be
/// nested under some outer boundary by `nesting::build_faces`).
#[derive(Clone, Debug)]
pub struct Boundary {
    pub half_edges: Vec<HalfEdgeId>,
    pub signed_area: f64,
}

impl Boundary {
    pub fn is_outer(&self) -> bool {
        self.signed_area > 0.0
    }

    /// The lexicographically minimal vertex of the loop, used by hole
    /// nesting's winding-number containment test (§4.C).
    pub fn lexicographic_min_vertex(&self, arena: &HalfEdgeArena) -> (f32, f32) {
        self.half_edges
            .iter()
            .map(|&id| arena.get(id).p0_f32())
            .fold((f32::INFINITY, f32::INFINITY), |acc, p| {
                if p.0 < acc.0 || (p.0 == acc.0 && p.1 < acc.1) {
                    p
                } else {
                    acc
                }
            })
    }
}

/// Trace every closed loop in the arena, tagging each visited half-edge with
/// its `BoundaryId` so later passes (winding BFS, face-adjacency) can look
/// up which boundary (and eventually face) a half-edge belongs to.
pub fn trace_boundaries(arena: &mut HalfEdgeArena) -> Result<Vec<Boundary>, AlpenglowError> {
    let mut visited = vec![false; arena.len()];
    let mut boundaries = Vec::new();

    for start in arena.ids() {
        if visited[start.0 as usize] {
            continue;
        }
        let mut loop_edges = Vec::new();
        let mut cur = start;
        loop {
            if visited[cur.0 as usize] {
                if cur != start {
                    return Err(AlpenglowError::InvariantViolation {
                        detail: "boundary walk revisited a half-edge without closing its loop".into(),
                    });
                }
                break;
            }
            visited[cur.0 as usize] = true;
            loop_edges.push(cur);
            cur = arena.get(cur).next.ok_or_else(|| AlpenglowError::InvariantViolation {
                detail: "half-edge missing a next pointer during boundary trace".into(),
            })?;
        }

        let area = shoelace_area(arena, &loop_edges);
        let id = BoundaryId(boundaries.len() as u32);
        for &e in &loop_edges {
            arena.get_mut(e).boundary = Some(id.0);
        }
        boundaries.push(Boundary {
            half_edges: loop_edges,
            signed_area: area,
        });
    }
    Ok(boundaries)
}

fn shoelace_area(arena: &HalfEdgeArena, edges: &[HalfEdgeId]) -> f64 {
    let mut sum = 0.0f64;
    for &id in edges {
        let e = arena.get(id);
        let (x0, y0) = e.p0_f32();
        let (x1, y1) = e.p1_f32();
        sum += (x0 as f64) * (y1 as f64) - (x1 as f64) * (y0 as f64);
    }
    sum * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::{build_arrangement, FillRule, RenderPath, Vector2};

    #[test]
    fn ccw_square_traces_as_a_single_positive_boundary() {
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
        let mut arena = arrangement.edges.clone();
        let boundaries = trace_boundaries(&mut arena).unwrap();
        // 4 forward (outer, +area) and 4 reverse (inner, -area) half-edges
        // trace into exactly two loops of length 4 each.
        assert_eq!(boundaries.len(), 2);
        let outers = boundaries.iter().filter(|b| b.is_outer()).count();
        assert_eq!(outers, 1);
    }
}
