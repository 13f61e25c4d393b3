//! Exact pairwise segment intersection (§4.B step 3).
//!
//! Two integer-endpoint segments either don't meet, meet at one interior
//! point (computed exactly in rationals), or are collinear. Endpoint-only
//! touches are not intersections (§4.B: "Endpoints of edges are NOT counted
//! as intersections").
//!
//! Collinear-overlapping edges are not split here; they are reconciled by
//! the global sort + winding-sum merge in `halfedge.rs` step 5, which
//! collapses identical directed sub-segments. This crate does not attempt to
//! split a segment against a collinear one that only partially overlaps it
//! (see DESIGN.md open question: partial collinear overlap).

use crate::numeric::{BigRational, BigRationalVector2};
use num_bigint::BigInt;
use num_traits::Zero;

use super::grid::IntegerEdgeEndpoints;

/// One interior intersection point found on an edge, with its exact
/// parametric position along that edge.
#[derive(Clone, Debug)]
pub struct RationalIntersection {
    pub point: BigRationalVector2,
    pub t: BigRational,
}

/// Two edges' AABBs overlap in the "open sense" required before attempting
/// an exact intersection test (§4.B step 3): strict inequality, unless a
/// segment is axis-aligned, in which case equality is allowed (an
/// axis-aligned edge's AABB has zero extent on one axis, so requiring strict
/// overlap there would reject every candidate).
pub fn aabbs_overlap_open(a: &IntegerEdgeEndpoints, b: &IntegerEdgeEndpoints) -> bool {
    let (amin_x, amin_y, amax_x, amax_y) = a.aabb();
    let (bmin_x, bmin_y, bmax_x, bmax_y) = b.aabb();
    let overlap_axis = |amin: i64, amax: i64, bmin: i64, bmax: i64, a_degenerate: bool| {
        if a_degenerate {
            amin <= bmax && bmin <= amax
        } else {
            amin < bmax && bmin < amax
        }
    };
    let a_x_degenerate = amin_x == amax_x;
    let a_y_degenerate = amin_y == amax_y;
    overlap_axis(amin_x, amax_x, bmin_x, bmax_x, a_x_degenerate || bmin_x == bmax_x)
        && overlap_axis(amin_y, amax_y, bmin_y, bmax_y, a_y_degenerate || bmin_y == bmax_y)
}

/// Solve the exact intersection of two segments, if they cross at a single
/// interior point on both. Returns `(t, u)`: the parametric position on `a`
/// and on `b`, respectively, each in the open interval `(0, 1)`.
pub fn intersect_segments(
    a: &IntegerEdgeEndpoints,
    b: &IntegerEdgeEndpoints,
) -> Option<(BigRational, BigRational)> {
    let d1x = BigInt::from(a.x1 - a.x0);
    let d1y = BigInt::from(a.y1 - a.y0);
    let d2x = BigInt::from(b.x1 - b.x0);
    let d2y = BigInt::from(b.y1 - b.y0);
    let denom = &d1x * &d2y - &d1y * &d2x;
    if denom.is_zero() {
        // Parallel (including collinear); handled by winding-sum merge.
        return None;
    }
    let ex = BigInt::from(b.x0 - a.x0);
    let ey = BigInt::from(b.y0 - a.y0);
    let t_num = &ex * &d2y - &ey * &d2x;
    let u_num = &ex * &d1y - &ey * &d1x;

    let t = BigRational::new(t_num, denom.clone());
    let u = BigRational::new(u_num, denom);

    let zero = BigRational::zero();
    let one = BigRational::from_integer(1);
    if t.compare_cross_mul(&zero) != std::cmp::Ordering::Greater {
        return None;
    }
    if t.compare_cross_mul(&one) != std::cmp::Ordering::Less {
        return None;
    }
    if u.compare_cross_mul(&zero) != std::cmp::Ordering::Greater {
        return None;
    }
    if u.compare_cross_mul(&one) != std::cmp::Ordering::Less {
        return None;
    }
    Some((t, u))
}

/// Exact point at parameter `t` along edge `e`.
pub fn point_at(e: &IntegerEdgeEndpoints, t: &BigRational) -> BigRationalVector2 {
    let x0 = BigRational::from_integer(e.x0);
    let y0 = BigRational::from_integer(e.y0);
    let dx = BigRational::from_integer(e.x1 - e.x0);
    let dy = BigRational::from_integer(e.y1 - e.y0);
    BigRationalVector2::new(x0.add(&t.mul(&dx)), y0.add(&t.mul(&dy)))
}

/// Run the all-pairs (AABB-prefiltered) intersection pass over a set of
/// edges already sorted for locality (`hilbert::sort_by_hilbert`), returning
/// per-edge intersection lists indexed the same as the input slice.
///
/// A bounds-tree-accelerated variant is named as an alternative by §4.B step
/// 3; this is the straightforward O(n^2) fallback, adequate for the scene
/// sizes this rasterizer targets (tens to low thousands of edges per frame).
pub fn find_all_intersections(edges: &[IntegerEdgeEndpoints]) -> Vec<Vec<RationalIntersection>> {
    let mut out: Vec<Vec<RationalIntersection>> = vec![Vec::new(); edges.len()];
    for i in 0..edges.len() {
        for j in (i + 1)..edges.len() {
            if !aabbs_overlap_open(&edges[i], &edges[j]) {
                continue;
            }
            if let Some((t, u)) = intersect_segments(&edges[i], &edges[j]) {
                let p = point_at(&edges[i], &t);
                out[i].push(RationalIntersection { point: p.clone(), t });
                out[j].push(RationalIntersection { point: p, t: u });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::path::PathId;

    fn edge(x0: i64, y0: i64, x1: i64, y1: i64) -> IntegerEdgeEndpoints {
        IntegerEdgeEndpoints {
            x0,
            y0,
            x1,
            y1,
            path: PathId(0),
        }
    }

    #[test]
    fn crossing_diagonals_meet_at_center() {
        let a = edge(0, 0, 10, 10);
        let b = edge(0, 10, 10, 0);
        let (t, u) = intersect_segments(&a, &b).unwrap();
        assert!((t.to_f64() - 0.5).abs() < 1e-9);
        assert!((u.to_f64() - 0.5).abs() < 1e-9);
        let p = point_at(&a, &t);
        assert!((p.x.to_f64() - 5.0).abs() < 1e-9);
        assert!((p.y.to_f64() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn endpoint_touch_is_not_an_intersection() {
        let a = edge(0, 0, 10, 0);
        let b = edge(10, 0, 10, 10);
        assert!(intersect_segments(&a, &b).is_none());
    }

    #[test]
    fn parallel_segments_never_intersect() {
        let a = edge(0, 0, 10, 0);
        let b = edge(0, 1, 10, 1);
        assert!(intersect_segments(&a, &b).is_none());
    }

    #[test]
    fn disjoint_segments_are_rejected_by_aabb_prefilter() {
        let a = edge(0, 0, 1, 1);
        let b = edge(100, 100, 101, 101);
        assert!(!aabbs_overlap_open(&a, &b));
    }

    #[test]
    fn offset_squares_intersect_exactly_twice_per_pair_of_edges() {
        // Matches the union/intersection scenario in §8: two unit squares
        // offset by (0.5, 0) at grid scale.
        let scale = 1i64 << 10;
        let sq_a = [
            edge(0, 0, scale, 0),
            edge(scale, 0, scale, scale),
            edge(scale, scale, 0, scale),
            edge(0, scale, 0, 0),
        ];
        let sq_b_offset = scale / 2;
        let sq_b = [
            edge(sq_b_offset, 0, sq_b_offset + scale, 0),
            edge(sq_b_offset + scale, 0, sq_b_offset + scale, scale),
            edge(sq_b_offset + scale, scale, sq_b_offset, scale),
            edge(sq_b_offset, scale, sq_b_offset, 0),
        ];
        let mut count = 0;
        for a in &sq_a {
            for b in &sq_b {
                if intersect_segments(a, b).is_some() {
                    count += 1;
                }
            }
        }
        assert_eq!(count, 2, "expected exactly two transversal crossings");
    }
}
