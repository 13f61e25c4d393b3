//! Grid snap (§4.B step 1): map the floating input AABB onto an integer grid
//! of side `2^20`, then round every vertex with symmetric rounding.

use super::path::{PathId, RenderPath, Vector2};
use crate::error::AlpenglowError;

/// Number of bits of grid precision (`2^20`, per §4.B and §7's `NumericRange`
/// check). Exposed via `RasterConfig::grid_bits` (§4.L) rather than hardcoded
/// so callers with a known-small scene can request fewer bits if desired.
pub const DEFAULT_GRID_BITS: u32 = 20;

/// An affine map from input (floating) coordinates to the integer grid,
/// plus its inverse for reporting results back in input units.
#[derive(Clone, Copy, Debug)]
pub struct GridSnap {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl GridSnap {
    /// Compute the scale/translation centering the overall AABB on the
    /// integer grid, per §4.B step 1: `s = 2^(20 - ceil(log2(max(w,h))))`.
    pub fn fit(min: Vector2, max: Vector2, grid_bits: u32) -> Result<Self, AlpenglowError> {
        let w = (max.x - min.x).max(0.0);
        let h = (max.y - min.y).max(0.0);
        let extent = w.max(h).max(f64::MIN_POSITIVE);
        let log2 = extent.log2().ceil();
        if !log2.is_finite() || log2 > (grid_bits as f64) {
            return Err(AlpenglowError::NumericRange {
                detail: format!(
                    "input AABB extent {extent} exceeds the grid-snap precision budget of 2^{grid_bits}"
                ),
            });
        }
        let scale = 2f64.powi(grid_bits as i32 - log2 as i32);
        let cx = (min.x + max.x) * 0.5;
        let cy = (min.y + max.y) * 0.5;
        Ok(Self {
            scale,
            translate_x: cx,
            translate_y: cy,
        })
    }

    /// Round one vertex to the integer grid with symmetric (round-half-away-
    /// from-zero) rounding.
    pub fn snap(&self, p: Vector2) -> (i64, i64) {
        let x = (p.x - self.translate_x) * self.scale;
        let y = (p.y - self.translate_y) * self.scale;
        (round_symmetric(x), round_symmetric(y))
    }

    pub fn unsnap(&self, x: i64, y: i64) -> Vector2 {
        Vector2::new(
            x as f64 / self.scale + self.translate_x,
            y as f64 / self.scale + self.translate_y,
        )
    }
}

fn round_symmetric(v: f64) -> i64 {
    if v >= 0.0 {
        (v + 0.5).floor() as i64
    } else {
        (v - 0.5).ceil() as i64
    }
}

/// One snapped, integer-endpoint segment of an input subpath, not yet split
/// by intersections (that's `RationalHalfEdge`, built in `halfedge.rs`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntegerEdgeEndpoints {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
    pub path: PathId,
}

impl IntegerEdgeEndpoints {
    pub fn aabb(&self) -> (i64, i64, i64, i64) {
        (
            self.x0.min(self.x1),
            self.y0.min(self.y1),
            self.x0.max(self.x1),
            self.y0.max(self.y1),
        )
    }
}

/// Snap every vertex of every path to the integer grid and emit one
/// `IntegerEdgeEndpoints` per non-degenerate subpath edge (implicitly closed,
/// zero-length segments dropped per §4.B step 1).
pub fn snap_paths(paths: &[RenderPath]) -> Result<(GridSnap, Vec<IntegerEdgeEndpoints>), AlpenglowError> {
    snap_paths_with_bits(paths, DEFAULT_GRID_BITS)
}

pub fn snap_paths_with_bits(
    paths: &[RenderPath],
    grid_bits: u32,
) -> Result<(GridSnap, Vec<IntegerEdgeEndpoints>), AlpenglowError> {
    let mut min = Vector2::new(f64::INFINITY, f64::INFINITY);
    let mut max = Vector2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    let mut any = false;
    for path in paths {
        for sub in &path.subpaths {
            for v in sub {
                if !v.is_finite() {
                    return Err(AlpenglowError::InvariantViolation {
                        detail: format!("non-finite path vertex ({}, {})", v.x, v.y),
                    });
                }
                min.x = min.x.min(v.x);
                min.y = min.y.min(v.y);
                max.x = max.x.max(v.x);
                max.y = max.y.max(v.y);
                any = true;
            }
        }
    }
    if !any {
        return Ok((
            GridSnap {
                scale: 1.0,
                translate_x: 0.0,
                translate_y: 0.0,
            },
            Vec::new(),
        ));
    }
    let snap = GridSnap::fit(min, max, grid_bits)?;

    let mut edges = Vec::new();
    for (i, path) in paths.iter().enumerate() {
        let path_id = PathId(i);
        for sub in &path.subpaths {
            if sub.len() < 2 {
                continue;
            }
            let snapped: Vec<(i64, i64)> = sub.iter().map(|v| snap.snap(*v)).collect();
            let n = snapped.len();
            for k in 0..n {
                let (x0, y0) = snapped[k];
                let (x1, y1) = snapped[(k + 1) % n];
                if x0 == x1 && y0 == y1 {
                    continue;
                }
                edges.push(IntegerEdgeEndpoints {
                    x0,
                    y0,
                    x1,
                    y1,
                    path: path_id,
                });
            }
        }
    }
    Ok((snap, edges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::path::FillRule;

    #[test]
    fn snap_unit_square_has_no_degenerate_edges() {
        let square = RenderPath::new(
            FillRule::NonZero,
            vec![vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 0.0),
                Vector2::new(1.0, 1.0),
                Vector2::new(0.0, 1.0),
            ]],
        );
        let (_snap, edges) = snap_paths(&[square]).unwrap();
        assert_eq!(edges.len(), 4);
        for e in &edges {
            assert!(e.x0 != e.x1 || e.y0 != e.y1);
        }
    }

    #[test]
    fn oversized_extent_is_numeric_range_error() {
        let huge = RenderPath::new(
            FillRule::NonZero,
            vec![vec![Vector2::new(0.0, 0.0), Vector2::new(2f64.powi(30), 0.0)]],
        );
        let err = snap_paths_with_bits(&[huge], 20).unwrap_err();
        assert!(matches!(err, AlpenglowError::NumericRange { .. }));
    }

    #[test]
    fn round_symmetric_matches_round_half_away_from_zero() {
        assert_eq!(round_symmetric(0.5), 1);
        assert_eq!(round_symmetric(-0.5), -1);
        assert_eq!(round_symmetric(2.4), 2);
        assert_eq!(round_symmetric(-2.4), -2);
    }
}
