//! `ClipSimplifier` (§4.E): compacts a stream of clip-produced points by
//! dropping consecutive duplicates and folding axis-aligned runs of three
//! collinear points, iterating at loop closure until stable.

/// Drop consecutive duplicate points, fold axis-aligned three-point runs
/// where the middle point is collinear with its neighbors, and repeat at
/// the wrap-around seam until no further point is removed.
pub struct ClipSimplifier {
    pub eps: f64,
}

impl Default for ClipSimplifier {
    fn default() -> Self {
        Self { eps: 1e-9 }
    }
}

impl ClipSimplifier {
    pub fn simplify(&self, points: &[(f64, f64)]) -> Vec<(f64, f64)> {
        let mut ring = dedup_consecutive(points, self.eps);
        loop {
            let folded = fold_collinear(&ring, self.eps);
            if folded.len() == ring.len() {
                return folded;
            }
            ring = folded;
        }
    }
}

fn dedup_consecutive(points: &[(f64, f64)], eps: f64) -> Vec<(f64, f64)> {
    let mut out: Vec<(f64, f64)> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().map(|&q| approx_eq(p, q, eps)).unwrap_or(false) {
            continue;
        }
        out.push(p);
    }
    if out.len() > 1 && approx_eq(out[0], *out.last().unwrap(), eps) {
        out.pop();
    }
    out
}

fn fold_collinear(points: &[(f64, f64)], eps: f64) -> Vec<(f64, f64)> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let cur = points[i];
        let next = points[(i + 1) % n];
        if is_collinear(prev, cur, next, eps) {
            continue;
        }
        out.push(cur);
    }
    if out.is_empty() {
        points.to_vec()
    } else {
        out
    }
}

fn is_collinear(a: (f64, f64), b: (f64, f64), c: (f64, f64), eps: f64) -> bool {
    let cross = (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0);
    cross.abs() <= eps
}

fn approx_eq(a: (f64, f64), b: (f64, f64), eps: f64) -> bool {
    (a.0 - b.0).abs() <= eps && (a.1 - b.1).abs() <= eps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_collinear_midpoint_is_removed_and_closing_duplicate_stripped() {
        let input = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0), (0.0, 0.0)];
        let simplified = ClipSimplifier::default().simplify(&input);
        assert_eq!(simplified, vec![(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)]);
    }
}
