//! Half-edge arena (§4.B steps 4-6): split integer edges at their
//! intersections, merge coincident directed sub-segments by summing winding
//! maps, and link each surviving half-edge to its vertex-local CCW neighbor
//! so module C can trace boundaries by walking `next` pointers.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::AlpenglowError;
use crate::numeric::{BigRational, BigRationalVector2};

use super::grid::IntegerEdgeEndpoints;
use super::intersect::{self, RationalIntersection};
use super::path::PathId;
use super::winding::WindingMap;

/// Index into the `RationalHalfEdge` arena. `u32` keeps the arena compact;
/// scenes with more than four billion half-edges are out of scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HalfEdgeId(pub u32);

/// Which of four direction quadrants a half-edge's direction vector falls
/// in, used both as the primary key for the vertex-local angular sort and as
/// a quick reject before falling back to an exact cross-product comparison.
///
/// `0: dx>0 && dy>=0`, `1: dx<=0 && dy>0`, `2: dx<0 && dy<=0`, `3: dx>=0 && dy<0`.
/// Walking 0..4 in order sweeps a full turn counterclockwise starting at the
/// positive x-axis.
fn discriminator(dx: &BigRational, dy: &BigRational) -> u8 {
    let zero = BigRational::zero();
    let dx_pos = dx.compare_cross_mul(&zero) == Ordering::Greater;
    let dy_pos = dy.compare_cross_mul(&zero) == Ordering::Greater;
    // Evaluated in the order the quadrants are documented: dx>0&&dy>=0,
    // dx<=0&&dy>0, dx<0&&dy<=0, dx>=0&&dy<0. Each input direction matches
    // exactly one, since together they partition every non-zero vector.
    if dx_pos {
        if dy_pos || dy.is_zero() {
            0
        } else {
            3
        }
    } else if dy_pos {
        1
    } else {
        2
    }
}

/// Total order on direction vectors within the same discriminator quadrant:
/// the sign of the cross product tells which of two vectors sweeps less far
/// counterclockwise from the positive x-axis.
fn angle_cmp(a: &BigRationalVector2, b: &BigRationalVector2) -> Ordering {
    let da = discriminator(&a.x, &a.y);
    let db = discriminator(&b.x, &b.y);
    if da != db {
        return da.cmp(&db);
    }
    let cross = a.x.mul(&b.y).sub(&a.y.mul(&b.x));
    match cross.compare_cross_mul(&BigRational::zero()) {
        Ordering::Greater => Ordering::Less,
        Ordering::Less => Ordering::Greater,
        Ordering::Equal => Ordering::Equal,
    }
}

/// One directed, exact-endpoint edge in the arrangement, with cached f32
/// projections for the fast paths that don't need exact arithmetic (e.g.
/// AABB prefilters downstream in module E).
#[derive(Clone, Debug)]
pub struct RationalHalfEdge {
    pub p0: BigRationalVector2,
    pub p1: BigRationalVector2,
    pub winding: WindingMap,
    pub reversed: HalfEdgeId,
    pub next: Option<HalfEdgeId>,
    pub previous: Option<HalfEdgeId>,
    pub boundary: Option<u32>,
    pub face: Option<u32>,
}

impl RationalHalfEdge {
    pub fn direction(&self) -> BigRationalVector2 {
        BigRationalVector2::new(self.p1.x.clone().sub(&self.p0.x), self.p1.y.clone().sub(&self.p0.y))
    }

    pub fn p0_f32(&self) -> (f32, f32) {
        (self.p0.x.to_f32(), self.p0.y.to_f32())
    }

    pub fn p1_f32(&self) -> (f32, f32) {
        (self.p1.x.to_f32(), self.p1.y.to_f32())
    }
}

/// Owns the half-edge arena for one arrangement build.
#[derive(Clone, Debug, Default)]
pub struct HalfEdgeArena {
    edges: Vec<RationalHalfEdge>,
}

impl HalfEdgeArena {
    pub fn get(&self, id: HalfEdgeId) -> &RationalHalfEdge {
        &self.edges[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: HalfEdgeId) -> &mut RationalHalfEdge {
        &mut self.edges[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = HalfEdgeId> {
        (0..self.edges.len() as u32).map(HalfEdgeId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (HalfEdgeId, &RationalHalfEdge)> {
        self.edges.iter().enumerate().map(|(i, e)| (HalfEdgeId(i as u32), e))
    }
}

/// Lexicographic comparison on exact points: `x` first, then `y`.
fn point_cmp(a: &BigRationalVector2, b: &BigRationalVector2) -> Ordering {
    match a.x.compare_cross_mul(&b.x) {
        Ordering::Equal => a.y.compare_cross_mul(&b.y),
        other => other,
    }
}

/// Split every edge at its recorded intersections, producing one exact
/// sub-segment endpoint per consecutive pair of sorted parameters. The
/// degenerate split `t == 0` or `t == 1` cannot occur since
/// `intersect_segments` only reports interior crossings (open interval).
fn split_edge(edge: &IntegerEdgeEndpoints, mut hits: Vec<RationalIntersection>) -> Vec<(BigRationalVector2, BigRationalVector2)> {
    hits.sort_by(|a, b| a.t.compare_cross_mul(&b.t));
    hits.dedup_by(|a, b| a.t.compare_cross_mul(&b.t) == Ordering::Equal);

    let start = BigRationalVector2::new(BigRational::from_integer(edge.x0), BigRational::from_integer(edge.y0));
    let end = BigRationalVector2::new(BigRational::from_integer(edge.x1), BigRational::from_integer(edge.y1));

    let mut points = Vec::with_capacity(hits.len() + 2);
    points.push(start);
    for hit in &hits {
        points.push(intersect::point_at(edge, &hit.t));
    }
    points.push(end);

    let mut segments = Vec::with_capacity(points.len().saturating_sub(1));
    for pair in points.windows(2) {
        segments.push((pair[0].clone(), pair[1].clone()));
    }
    segments
}

/// Build the half-edge arena from snapped integer edges: split at
/// intersections (§4.B step 4), merge coincident directed sub-segments by
/// summing winding maps and dropping all-zero results (§4.B step 5), then
/// assign vertex-local `next`/`previous` pointers (§4.B step 6).
pub fn build_half_edges(edges: &[IntegerEdgeEndpoints]) -> Result<HalfEdgeArena, AlpenglowError> {
    let hits = intersect::find_all_intersections(edges);

    // Accumulate, per undirected canonical segment (lexicographically
    // smaller endpoint first), the summed winding contribution of every
    // oriented sub-segment that lies on it. Since each sub-segment's
    // "forward" contributes +1 and its reverse contributes -1 for the same
    // path, summing only the canonical direction and negating for the
    // opposite direction is exact (see module docs for the argument).
    let mut canonical: Vec<(BigRationalVector2, BigRationalVector2, WindingMap)> = Vec::new();
    let mut index: BTreeMap<(Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>), usize> = BTreeMap::new();

    for (edge, edge_hits) in edges.iter().zip(hits.into_iter()) {
        for (p0, p1) in split_edge(edge, edge_hits) {
            if point_cmp(&p0, &p1) == Ordering::Equal {
                continue;
            }
            let (lo, hi, sign) = if point_cmp(&p0, &p1) == Ordering::Less {
                (p0, p1, 1)
            } else {
                (p1, p0, -1)
            };
            let key = rational_key(&lo, &hi);
            let contribution = WindingMap::single(edge.path, sign);
            match index.get(&key) {
                Some(&i) => {
                    canonical[i].2 = canonical[i].2.combine(&contribution);
                }
                None => {
                    index.insert(key, canonical.len());
                    canonical.push((lo, hi, contribution));
                }
            }
        }
    }

    let mut arena = Vec::with_capacity(canonical.len() * 2);
    for (lo, hi, winding) in canonical {
        if winding.is_all_zero() {
            continue;
        }
        let forward_id = HalfEdgeId(arena.len() as u32);
        let reverse_id = HalfEdgeId(arena.len() as u32 + 1);
        arena.push(RationalHalfEdge {
            p0: lo.clone(),
            p1: hi.clone(),
            winding: winding.clone(),
            reversed: reverse_id,
            next: None,
            previous: None,
            boundary: None,
            face: None,
        });
        arena.push(RationalHalfEdge {
            p0: hi,
            p1: lo,
            winding: winding.negate(),
            reversed: forward_id,
            next: None,
            previous: None,
            boundary: None,
            face: None,
        });
    }

    let mut arena = HalfEdgeArena { edges: arena };
    link_vertex_rotations(&mut arena)?;
    Ok(arena)
}

/// Group half-edges by exact start point and sort each group by CCW angle,
/// then assign `next(e)` as the immediate CCW-predecessor of `reversed(e)`
/// within `reversed(e)`'s start-vertex group (the standard "turn maximally
/// clockwise" DCEL rule, which keeps a traced boundary consistently on one
/// side of the curve).
/// Group every half-edge by its exact start point, sorted by CCW angle
/// within each group. Shared by the original `next`/`previous` assignment
/// here and by the boundary-merge re-stitch in `faces::tagging`, which both
/// need to ask "what's the nearest rotation-order neighbor of this edge at
/// its vertex".
pub(crate) fn vertex_groups(arena: &HalfEdgeArena) -> BTreeMap<(Vec<u8>, Vec<u8>), Vec<HalfEdgeId>> {
    let mut groups: BTreeMap<(Vec<u8>, Vec<u8>), Vec<HalfEdgeId>> = BTreeMap::new();
    for (id, edge) in arena.iter() {
        groups.entry(rational_key2(&edge.p0)).or_default().push(id);
    }
    for ids in groups.values_mut() {
        ids.sort_by(|&a, &b| angle_cmp(&arena.get(a).direction(), &arena.get(b).direction()));
    }
    groups
}

pub(crate) fn start_vertex_key(p: &BigRationalVector2) -> (Vec<u8>, Vec<u8>) {
    rational_key2(p)
}

fn link_vertex_rotations(arena: &mut HalfEdgeArena) -> Result<(), AlpenglowError> {
    let groups = vertex_groups(arena);

    let mut next = vec![None; arena.len()];
    for ids in groups.values() {
        for &id in ids {
            let rev = arena.get(id).reversed;
            let rev_group = groups
                .get(&rational_key2(&arena.get(rev).p0))
                .expect("reversed half-edge's start vertex must have a group");
            let rev_pos = rev_group
                .iter()
                .position(|&x| x == rev)
                .expect("reversed half-edge must be in its own start-vertex group");
            let predecessor = rev_group[(rev_pos + rev_group.len() - 1) % rev_group.len()];
            next[id.0 as usize] = Some(predecessor);
        }
    }
    for (i, n) in next.into_iter().enumerate() {
        let n = n.ok_or_else(|| AlpenglowError::InvariantViolation {
            detail: "half-edge left without a next pointer after vertex rotation pass".into(),
        })?;
        arena.get_mut(HalfEdgeId(i as u32)).next = Some(n);
    }
    for id in arena.ids() {
        let next_id = arena.get(id).next.unwrap();
        arena.get_mut(next_id).previous = Some(id);
    }
    Ok(())
}

fn rational_key(lo: &BigRationalVector2, hi: &BigRationalVector2) -> (Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>) {
    (
        rational_bytes(&lo.x),
        rational_bytes(&lo.y),
        rational_bytes(&hi.x),
        rational_bytes(&hi.y),
    )
}

fn rational_key2(p: &BigRationalVector2) -> (Vec<u8>, Vec<u8>) {
    (rational_bytes(&p.x), rational_bytes(&p.y))
}

/// A reduced, sign-normalized byte encoding of a rational used only as a
/// `BTreeMap` key (exact equality/order via bytes avoids needing `Ord` on
/// `BigRational` itself, which would invite accidental use of cross-multiply
/// comparisons as a sort key on unreduced values).
fn rational_bytes(r: &BigRational) -> Vec<u8> {
    let reduced = r.clone().reduce();
    let mut out = Vec::new();
    let (num_sign, num_bytes) = reduced.numerator.to_bytes_be();
    let (_, den_bytes) = reduced.denominator.to_bytes_be();
    out.push(match num_sign {
        num_bigint::Sign::Minus => 0,
        _ => 1,
    });
    out.extend((num_bytes.len() as u32).to_be_bytes());
    out.extend(num_bytes);
    out.extend((den_bytes.len() as u32).to_be_bytes());
    out.extend(den_bytes);
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

    fn square(scale: i64) -> Vec<IntegerEdgeEndpoints> {
        vec![
            edge(0, 0, scale, 0),
            edge(scale, 0, scale, scale),
            edge(scale, scale, 0, scale),
            edge(0, scale, 0, 0),
        ]
    }

    #[test]
    fn single_square_closes_into_one_four_cycle() {
        let arena = build_half_edges(&square(1024)).unwrap();
        assert_eq!(arena.len(), 8); // 4 edges x (forward + reverse)

        // Follow `next` from the first half-edge with winding +1 and expect
        // to return to the start after exactly 4 steps.
        let start = arena
            .ids()
            .find(|&id| !arena.get(id).winding.is_all_zero() && arena.get(id).winding.get(PathId(0)) == 1)
            .unwrap();
        let mut cur = arena.get(start).next.unwrap();
        let mut steps = 1;
        while cur != start {
            cur = arena.get(cur).next.unwrap();
            steps += 1;
            assert!(steps <= 4, "boundary did not close within 4 steps");
        }
        assert_eq!(steps, 4);
    }

    #[test]
    fn reversed_is_an_involution() {
        let arena = build_half_edges(&square(1024)).unwrap();
        for id in arena.ids() {
            let rev = arena.get(id).reversed;
            assert_eq!(arena.get(rev).reversed, id);
        }
    }

    #[test]
    fn winding_sums_to_zero_across_every_reversed_pair() {
        let arena = build_half_edges(&square(1024)).unwrap();
        for id in arena.ids() {
            let edge = arena.get(id);
            let rev = arena.get(edge.reversed);
            assert!(edge.winding.combine(&rev.winding).is_all_zero());
        }
    }

    #[test]
    fn crossing_diagonals_split_into_four_half_edges_per_diagonal() {
        let edges = vec![edge(0, 0, 10, 10), edge(0, 10, 10, 0)];
        let arena = build_half_edges(&edges).unwrap();
        // Each diagonal splits into two sub-segments at the crossing point,
        // each sub-segment contributing a forward/reverse pair: 2 diagonals
        // x 2 sub-segments x 2 directions = 8 half-edges.
        assert_eq!(arena.len(), 8);
    }
}
