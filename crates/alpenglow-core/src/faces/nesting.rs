//! Hole nesting (§4.C): assign each inner (negative-area) boundary to the
//! innermost outer boundary that contains it, with a synthetic unbounded
//! face collecting every outer boundary that isn't nested inside another.

use crate::arrangement::HalfEdgeArena;
use crate::error::AlpenglowError;

use super::boundary::{Boundary, BoundaryId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaceId(pub u32);

/// One face: an outer boundary (`None` for the synthetic unbounded face)
/// plus the inner boundaries (holes) nested directly inside it.
#[derive(Clone, Debug)]
pub struct RationalFace {
    pub outer: Option<BoundaryId>,
    pub holes: Vec<BoundaryId>,
}

/// Winding number of `point` with respect to the closed polygon `edges`
/// (Sunday's algorithm). Non-zero means `point` is inside.
fn winding_number(point: (f64, f64), edges: &[(f64, f64, f64, f64)]) -> i32 {
    let is_left = |x0: f64, y0: f64, x1: f64, y1: f64, px: f64, py: f64| (x1 - x0) * (py - y0) - (px - x0) * (y1 - y0);
    let mut wn = 0;
    for &(x0, y0, x1, y1) in edges {
        if y0 <= point.1 {
            if y1 > point.1 && is_left(x0, y0, x1, y1, point.0, point.1) > 0.0 {
                wn += 1;
            }
        } else if y1 <= point.1 && is_left(x0, y0, x1, y1, point.0, point.1) < 0.0 {
            wn -= 1;
        }
    }
    wn
}

fn edges_f64(boundary: &Boundary, arena: &HalfEdgeArena) -> Vec<(f64, f64, f64, f64)> {
    boundary
        .half_edges
        .iter()
        .map(|&id| {
            let e = arena.get(id);
            let (x0, y0) = e.p0_f32();
            let (x1, y1) = e.p1_f32();
            (x0 as f64, y0 as f64, x1 as f64, y1 as f64)
        })
        .collect()
}

/// Build the face list and stamp each traced half-edge's `face` field with
/// the index of the face (in the returned `Vec`) that owns its boundary.
pub fn build_faces(boundaries: &[Boundary], arena: &mut HalfEdgeArena) -> Result<Vec<RationalFace>, AlpenglowError> {
    let outer_ids: Vec<BoundaryId> = (0..boundaries.len() as u32)
        .map(BoundaryId)
        .filter(|id| boundaries[id.0 as usize].is_outer())
        .collect();
    let outer_polygons: Vec<Vec<(f64, f64, f64, f64)>> =
        outer_ids.iter().map(|&id| edges_f64(&boundaries[id.0 as usize], arena)).collect();

    // Unbounded face first, then one face per outer boundary, in outer_ids order.
    let mut faces = vec![RationalFace {
        outer: None,
        holes: Vec::new(),
    }];
    let mut outer_face_of: Vec<FaceId> = Vec::with_capacity(outer_ids.len());
    for &outer_id in &outer_ids {
        outer_face_of.push(FaceId(faces.len() as u32));
        faces.push(RationalFace {
            outer: Some(outer_id),
            holes: Vec::new(),
        });
    }

    // Which outer (if any) directly contains each outer boundary, used to
    // decide top-level membership in the unbounded face's hole list.
    for (i, &outer_id) in outer_ids.iter().enumerate() {
        let probe = boundaries[outer_id.0 as usize].lexicographic_min_vertex(arena);
        let probe = (probe.0 as f64, probe.1 as f64);
        let container = innermost_container(i, &outer_polygons, probe, true);
        let owner = match container {
            Some(j) => outer_face_of[j],
            None => FaceId(0),
        };
        faces[owner.0 as usize].holes.push(outer_id);
    }

    // Every inner (negative-area) boundary nests under the innermost outer
    // boundary whose polygon contains its lexicographic-minimal vertex.
    for id in (0..boundaries.len() as u32).map(BoundaryId) {
        if boundaries[id.0 as usize].is_outer() {
            continue;
        }
        let probe = boundaries[id.0 as usize].lexicographic_min_vertex(arena);
        let probe = (probe.0 as f64, probe.1 as f64);
        let container = innermost_container(usize::MAX, &outer_polygons, probe, false);
        let owner = match container {
            Some(j) => outer_face_of[j],
            None => FaceId(0),
        };
        faces[owner.0 as usize].holes.push(id);
    }

    for (face_id, face) in faces.iter().enumerate() {
        if let Some(outer) = face.outer {
            for &e in &boundaries[outer.0 as usize].half_edges {
                arena.get_mut(e).face = Some(face_id as u32);
            }
        }
        for &hole in &face.holes {
            // A face whose `outer` is itself an outer boundary placed as a
            // "hole" of a containing face (a nested island) keeps its own
            // face identity; only genuinely inner (negative-area) loops or
            // nested outer islands recorded here get stamped against this
            // face when they are not already an outer face of their own.
            if boundaries[hole.0 as usize].is_outer() {
                continue;
            }
            for &e in &boundaries[hole.0 as usize].half_edges {
                arena.get_mut(e).face = Some(face_id as u32);
            }
        }
    }
    Ok(faces)
}

/// Find, among outer polygons that contain `probe` (excluding `self_index`
/// when `skip_self` is set), the one with smallest absolute area — the
/// tightest (innermost) enclosing outer boundary.
fn innermost_container(self_index: usize, outer_polygons: &[Vec<(f64, f64, f64, f64)>], probe: (f64, f64), skip_self: bool) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (j, polygon) in outer_polygons.iter().enumerate() {
        if skip_self && j == self_index {
            continue;
        }
        if winding_number(probe, polygon) == 0 {
            continue;
        }
        let area = polygon_area(polygon).abs();
        match best {
            Some((_, best_area)) if best_area <= area => {}
            _ => best = Some((j, area)),
        }
    }
    best.map(|(j, _)| j)
}

fn polygon_area(edges: &[(f64, f64, f64, f64)]) -> f64 {
    edges.iter().map(|&(x0, y0, x1, y1)| x0 * y1 - x1 * y0).sum::<f64>() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::{build_arrangement, FillRule, RenderPath, Vector2};
    use crate::faces::boundary::trace_boundaries;

    fn square(x: f64, y: f64, s: f64) -> RenderPath {
        RenderPath::new(
            FillRule::NonZero,
            vec![vec![
                Vector2::new(x, y),
                Vector2::new(x + s, y),
                Vector2::new(x + s, y + s),
                Vector2::new(x, y + s),
            ]],
        )
    }

    #[test]
    fn single_square_has_one_face_under_the_unbounded_face() {
        let arrangement = build_arrangement(&[square(0.0, 0.0, 10.0)]).unwrap();
        let mut arena = arrangement.edges.clone();
        let boundaries = trace_boundaries(&mut arena).unwrap();
        let faces = build_faces(&boundaries, &mut arena).unwrap();
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].holes.len(), 1);
    }

    #[test]
    fn nested_square_is_a_hole_of_the_unbounded_face_directly() {
        // Two disjoint squares: both are top-level islands under the
        // unbounded face (neither contains the other).
        let arrangement = build_arrangement(&[square(0.0, 0.0, 10.0), square(100.0, 100.0, 10.0)]).unwrap();
        let mut arena = arrangement.edges.clone();
        let boundaries = trace_boundaries(&mut arena).unwrap();
        let faces = build_faces(&boundaries, &mut arena).unwrap();
        assert_eq!(faces[0].holes.len(), 2);
    }
}
