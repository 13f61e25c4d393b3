//! `WindingMap`: per-`RenderPath` signed winding contribution.

use super::path::PathId;
use std::collections::BTreeMap;

/// Mapping from `RenderPath` to integer winding contribution. Kept as a
/// sorted map (not a dense array) since most faces/edges only interact with
/// a handful of the scene's paths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindingMap(BTreeMap<PathId, i32>);

impl WindingMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn single(path: PathId, contribution: i32) -> Self {
        let mut m = BTreeMap::new();
        if contribution != 0 {
            m.insert(path, contribution);
        }
        Self(m)
    }

    pub fn get(&self, path: PathId) -> i32 {
        self.0.get(&path).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PathId, i32)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }

    pub fn is_all_zero(&self) -> bool {
        self.0.values().all(|&v| v == 0)
    }

    /// Pointwise sum, dropping any path whose combined contribution is zero.
    pub fn combine(&self, other: &WindingMap) -> WindingMap {
        let mut out = self.0.clone();
        for (&path, &contrib) in &other.0 {
            let entry = out.entry(path).or_insert(0);
            *entry += contrib;
        }
        out.retain(|_, v| *v != 0);
        WindingMap(out)
    }

    pub fn negate(&self) -> WindingMap {
        WindingMap(self.0.iter().map(|(&k, &v)| (k, -v)).collect())
    }

    /// Flip the contribution of crossing a single half-edge belonging to
    /// `path`, used by the winding BFS in module C.
    pub fn flip(&self, path: PathId, delta: i32) -> WindingMap {
        self.combine(&WindingMap::single(path, delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_drops_zero_sums() {
        let a = WindingMap::single(PathId(0), 1);
        let b = WindingMap::single(PathId(0), -1);
        let c = a.combine(&b);
        assert!(c.is_all_zero());
        assert_eq!(c.get(PathId(0)), 0);
    }

    #[test]
    fn negate_is_an_involution() {
        let a = WindingMap::single(PathId(1), 3);
        assert_eq!(a.negate().negate(), a);
    }

    #[test]
    fn reverse_winding_sums_to_zero_with_forward() {
        let fwd = WindingMap::single(PathId(2), 1);
        let rev = fwd.negate();
        assert!(fwd.combine(&rev).is_all_zero());
    }
}
