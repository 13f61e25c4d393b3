//! Winding-map BFS and face tagging (§4.C).
//!
//! `compute_winding_maps` propagates each face's per-path winding number
//! outward from the unbounded face. `boolean_op` is a thin wrapper over an
//! external tag function: it marks each face "inside" or "outside" the
//! result under the nonzero rule, then merges adjacent same-tag faces by
//! re-stitching their shared boundary away, the same operation a real
//! `getFaceData`-driven merge performs for arbitrary tags.

use std::collections::VecDeque;

use crate::arrangement::{start_vertex_key, vertex_groups, GridSnap, HalfEdgeArena, HalfEdgeId, PathId, WindingMap};
use crate::error::AlpenglowError;

use super::boundary::Boundary;
use super::nesting::RationalFace;

/// BFS winding computation (§4.C): the unbounded face starts at all-zero
/// winding; crossing a half-edge from the face that owns it into the face
/// on the other side adds that edge's reverse's winding contribution.
pub fn compute_winding_maps(faces: &[RationalFace], _boundaries: &[Boundary], arena: &HalfEdgeArena) -> Result<Vec<WindingMap>, AlpenglowError> {
    let mut by_face: Vec<Vec<HalfEdgeId>> = vec![Vec::new(); faces.len()];
    for id in arena.ids() {
        if let Some(f) = arena.get(id).face {
            by_face[f as usize].push(id);
        }
    }

    let mut windings = vec![WindingMap::new(); faces.len()];
    let mut visited = vec![false; faces.len()];
    visited[0] = true;
    let mut queue = VecDeque::new();
    queue.push_back(0usize);

    while let Some(u) = queue.pop_front() {
        for &eid in &by_face[u] {
            let e = arena.get(eid);
            let rev = arena.get(e.reversed);
            let v = rev.face.ok_or_else(|| AlpenglowError::InvariantViolation {
                detail: "half-edge's reversed twin has no face assigned".into(),
            })? as usize;
            if !visited[v] {
                visited[v] = true;
                windings[v] = windings[u].combine(&rev.winding);
                queue.push_back(v);
            }
        }
    }
    Ok(windings)
}

/// The three standard set operations over two input paths' interiors,
/// evaluated under the nonzero rule (§8's scenarios use this rule).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Intersection,
    Difference,
}

impl BooleanOp {
    fn is_inside(&self, wa: i32, wb: i32) -> bool {
        match self {
            BooleanOp::Union => wa != 0 || wb != 0,
            BooleanOp::Intersection => wa != 0 && wb != 0,
            BooleanOp::Difference => wa != 0 && wb == 0,
        }
    }
}

/// A merged output region: one or more closed rings in input units. Rings
/// with positive shoelace area are outer boundaries; negative-area rings
/// are holes of whichever merged region encloses them.
#[derive(Clone, Debug)]
pub struct PolygonalFace {
    pub rings: Vec<Vec<(f64, f64)>>,
}

/// Apply `op` to paths `a` and `b`, tagging every face "inside"/"outside"
/// under the nonzero rule, then stitching the boundary between
/// same-tag-adjacent faces away. Equivalent to the general
/// `getFaceData`/`isFaceDataCompatible` merge specialized to a boolean tag.
pub fn boolean_op(
    op: BooleanOp,
    a: PathId,
    b: PathId,
    faces: &[RationalFace],
    windings: &[WindingMap],
    arena: &HalfEdgeArena,
    snap: &GridSnap,
) -> Vec<PolygonalFace> {
    let tags: Vec<bool> = windings.iter().map(|w| op.is_inside(w.get(a), w.get(b))).collect();
    merge_tagged_faces(&tags, arena, snap)
}

/// Retain half-edges whose owning face is tagged `true` and whose opposite
/// side is tagged `false` (or absent), then trace the resulting rings by
/// walking each vertex's rotation order but skipping non-retained entries —
/// the standard seam-removal step of a Weiler–Atherton-style merge.
pub(crate) fn merge_tagged_faces(tags: &[bool], arena: &HalfEdgeArena, snap: &GridSnap) -> Vec<PolygonalFace> {
    let is_retained = |id: HalfEdgeId| -> bool {
        let e = arena.get(id);
        let here = e.face.map(|f| tags[f as usize]).unwrap_or(false);
        let there = arena.get(e.reversed).face.map(|f| tags[f as usize]).unwrap_or(false);
        here && !there
    };

    let groups = vertex_groups(arena);
    let mut visited = vec![false; arena.len()];
    let mut rings: Vec<(Vec<(f64, f64)>, f64)> = Vec::new();

    for start in arena.ids() {
        if visited[start.0 as usize] || !is_retained(start) {
            continue;
        }
        let mut points = Vec::new();
        let mut signed_area = 0.0f64;
        let mut cur = start;
        loop {
            visited[cur.0 as usize] = true;
            let e = arena.get(cur);
            let (x0, y0) = unsnap_grid_point(snap, &e.p0);
            points.push((x0, y0));
            let (x1, y1) = unsnap_grid_point(snap, &e.p1);
            signed_area += x0 * y1 - x1 * y0;

            let rev = e.reversed;
            let rev_p0 = arena.get(rev).p0.clone();
            let key = start_vertex_key(&rev_p0);
            let group = groups.get(&key).expect("reversed edge's vertex must have a rotation group");
            let rev_pos = group.iter().position(|&x| x == rev).expect("reversed edge must be in its own group");
            let len = group.len();
            let mut step = 1;
            let next = loop {
                let candidate = group[(rev_pos + len - step % len) % len];
                if is_retained(candidate) || candidate == cur {
                    break candidate;
                }
                step += 1;
                if step > len {
                    break cur; // isolated edge; shouldn't happen in a closed arrangement
                }
            };
            if next == start {
                break;
            }
            cur = next;
        }
        rings.push((points, signed_area));
    }

    // Group rings into PolygonalFaces: each positive-area ring starts a new
    // face; every negative-area ring becomes a hole of the nearest
    // enclosing positive-area ring (by point containment of its first
    // vertex), mirroring the winding-based nesting already used for holes.
    let mut faces: Vec<PolygonalFace> = rings
        .iter()
        .filter(|(_, area)| *area > 0.0)
        .map(|(pts, _)| PolygonalFace { rings: vec![pts.clone()] })
        .collect();
    for (pts, area) in &rings {
        if *area > 0.0 || pts.is_empty() {
            continue;
        }
        if let Some(owner) = find_enclosing_face(&faces, pts[0]) {
            faces[owner].rings.push(pts.clone());
        }
    }
    faces
}

fn find_enclosing_face(faces: &[PolygonalFace], point: (f64, f64)) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, face) in faces.iter().enumerate() {
        let outer = &face.rings[0];
        if !point_in_ring(point, outer) {
            continue;
        }
        let area = ring_area(outer).abs();
        match best {
            Some((_, best_area)) if best_area <= area => {}
            _ => best = Some((i, area)),
        }
    }
    best.map(|(i, _)| i)
}

fn ring_area(ring: &[(f64, f64)]) -> f64 {
    let n = ring.len();
    let mut sum = 0.0;
    for i in 0..n {
        let (x0, y0) = ring[i];
        let (x1, y1) = ring[(i + 1) % n];
        sum += x0 * y1 - x1 * y0;
    }
    sum * 0.5
}

fn point_in_ring(point: (f64, f64), ring: &[(f64, f64)]) -> bool {
    let n = ring.len();
    let mut wn = 0i32;
    for i in 0..n {
        let (x0, y0) = ring[i];
        let (x1, y1) = ring[(i + 1) % n];
        let is_left = (x1 - x0) * (point.1 - y0) - (point.0 - x0) * (y1 - y0);
        if y0 <= point.1 {
            if y1 > point.1 && is_left > 0.0 {
                wn += 1;
            }
        } else if y1 <= point.1 && is_left < 0.0 {
            wn -= 1;
        }
    }
    wn != 0
}

/// Grid-snapped vertices are exact integers; round the rational coordinate
/// back to `i64` before handing it to `GridSnap::unsnap`.
fn unsnap_grid_point(snap: &GridSnap, p: &crate::numeric::BigRationalVector2) -> (f64, f64) {
    let (gx, gy) = p.to_f64();
    let v = snap.unsnap(gx.round() as i64, gy.round() as i64);
    (v.x, v.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::{build_arrangement, FillRule, RenderPath, Vector2};
    use crate::faces::boundary::trace_boundaries;
    use crate::faces::nesting::build_faces;

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
    fn single_square_interior_has_winding_one() {
        let arrangement = build_arrangement(&[square(0.0, 0.0, 1.0)]).unwrap();
        let mut arena = arrangement.edges.clone();
        let boundaries = trace_boundaries(&mut arena).unwrap();
        let faces = build_faces(&boundaries, &mut arena).unwrap();
        let windings = compute_winding_maps(&faces, &boundaries, &arena).unwrap();
        assert_eq!(windings[0].get(PathId(0)), 0);
        assert_eq!(windings[1].get(PathId(0)), 1);
    }

    #[test]
    fn union_of_offset_unit_squares_has_expected_area() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(0.5, 0.0, 1.0);
        let arrangement = build_arrangement(&[a, b]).unwrap();
        let mut arena = arrangement.edges.clone();
        let boundaries = trace_boundaries(&mut arena).unwrap();
        let faces = build_faces(&boundaries, &mut arena).unwrap();
        let windings = compute_winding_maps(&faces, &boundaries, &arena).unwrap();
        let result = boolean_op(BooleanOp::Union, PathId(0), PathId(1), &faces, &windings, &arena, &arrangement.snap);
        let total_area: f64 = result.iter().map(|f| ring_area(&f.rings[0]).abs()).sum();
        assert!((total_area - 1.5).abs() < 1e-3, "union area was {total_area}");
    }

    #[test]
    fn intersection_of_offset_unit_squares_has_expected_area() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(0.5, 0.0, 1.0);
        let arrangement = build_arrangement(&[a, b]).unwrap();
        let mut arena = arrangement.edges.clone();
        let boundaries = trace_boundaries(&mut arena).unwrap();
        let faces = build_faces(&boundaries, &mut arena).unwrap();
        let windings = compute_winding_maps(&faces, &boundaries, &arena).unwrap();
        let result = boolean_op(BooleanOp::Intersection, PathId(0), PathId(1), &faces, &windings, &arena, &arrangement.snap);
        let total_area: f64 = result.iter().map(|f| ring_area(&f.rings[0]).abs()).sum();
        assert!((total_area - 0.5).abs() < 1e-3, "intersection area was {total_area}");
    }
}
