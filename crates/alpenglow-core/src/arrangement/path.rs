//! Input path format (§6.1).

use serde::{Deserialize, Serialize};

/// `"nonzero"` or `"evenodd"` — determines which subregions of a path count
/// as inside. Only used by higher layers that interpret a `WindingMap`
/// (module C); the arrangement itself is fill-rule agnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillRule {
    #[serde(rename = "nonzero")]
    NonZero,
    #[serde(rename = "evenodd")]
    EvenOdd,
}

impl FillRule {
    /// Whether an integer winding number counts as "inside" under this rule.
    pub fn is_inside(&self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding.rem_euclid(2) != 0,
        }
    }
}

/// A 2D point. Each coordinate must be finite (§3.1 note: non-finite input
/// is an `InvariantViolation`, see `error::AlpenglowError`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// `RenderPath { fillRule, subpaths: Vector2[][] }`. Each subpath is
/// implicitly closed (the arrangement connects its last vertex back to its
/// first).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RenderPath {
    pub fill_rule: FillRule,
    pub subpaths: Vec<Vec<Vector2>>,
}

impl RenderPath {
    pub fn new(fill_rule: FillRule, subpaths: Vec<Vec<Vector2>>) -> Self {
        Self { fill_rule, subpaths }
    }

    /// Axis-aligned bounding box over every vertex, or `None` if the path has
    /// no vertices at all.
    pub fn aabb(&self) -> Option<(Vector2, Vector2)> {
        let mut it = self.subpaths.iter().flatten();
        let first = it.next()?;
        let mut min = *first;
        let mut max = *first;
        for p in it {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }
}

/// Identifies one input `RenderPath` by its index in the slice passed to
/// `build_arrangement`. Cheap, `Copy`, and what `WindingMap` keys on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PathId(pub usize);
