//! Component H: raster-clip segmented reduction (§4.H) — the data-parallel
//! glue that turns a stream of per-face edge clips into, per output chunk,
//! the contiguous range of surviving edges split into reducible (needs
//! further clipping) and complete (ready to emit) categories.
//!
//! Each step below is a pure array transform built on `parallel`'s
//! primitives, run once over the whole array rather than across real
//! workgroup dispatches (§4.G's note applies here too: the GPU dispatch
//! layer is an external collaborator, not reimplemented).

use crate::parallel::{self, Monoid, ScanKind};

/// One edge produced by clipping a face against the tile/bin grid (§3.5).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeClip {
    pub chunk_index: u32,
    pub is_first_edge: bool,
    pub is_last_edge: bool,
    pub start: (f64, f64),
    pub end: (f64, f64),
    /// Whether this edge still needs further clipping against a finer grid
    /// level, or is ready to emit as-is.
    pub reducible: bool,
}

/// Step 1's classification result: a `(reducible, complete)` count pair,
/// componentwise-additive under combine (§3.5).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplitReduceData {
    pub num_reducible: u32,
    pub num_complete: u32,
}

impl Monoid for SplitReduceData {
    fn identity() -> Self {
        Self::default()
    }
    fn combine(&self, other: &Self) -> Self {
        Self {
            num_reducible: self.num_reducible + other.num_reducible,
            num_complete: self.num_complete + other.num_complete,
        }
    }
}

/// Step 1: classify one clip.
pub fn classify(clip: &EdgeClip) -> SplitReduceData {
    if clip.reducible {
        SplitReduceData { num_reducible: 1, num_complete: 0 }
    } else {
        SplitReduceData { num_reducible: 0, num_complete: 1 }
    }
}

/// Steps 2-3: classify every clip, then scan within `workgroup_size`-sized
/// groups and across the cross-workgroup ladder (`parallel::multi_level_scan`
/// already generalizes the up-to-three-level ladder named in §4.H to any
/// depth), returning each clip's exclusive offset into the reducible and
/// complete output arrays.
pub fn scan_offsets(clips: &[EdgeClip], workgroup_size: usize) -> Vec<SplitReduceData> {
    let classified: Vec<SplitReduceData> = clips.iter().map(classify).collect();
    parallel::multi_level_scan(&classified, workgroup_size.max(1), ScanKind::Exclusive)
}

/// Step 4: scatter each clip into the reducible or complete output array at
/// its scanned offset.
pub fn scatter(clips: &[EdgeClip], offsets: &[SplitReduceData]) -> (Vec<EdgeClip>, Vec<EdgeClip>) {
    let totals = parallel::reduce(&clips.iter().map(classify).collect::<Vec<_>>());
    let mut reducible: Vec<Option<EdgeClip>> = vec![None; totals.num_reducible as usize];
    let mut complete: Vec<Option<EdgeClip>> = vec![None; totals.num_complete as usize];
    for (clip, offset) in clips.iter().zip(offsets) {
        if clip.reducible {
            reducible[offset.num_reducible as usize] = Some(*clip);
        } else {
            complete[offset.num_complete as usize] = Some(*clip);
        }
    }
    (
        reducible.into_iter().map(|c| c.expect("every reducible slot is written exactly once")).collect(),
        complete.into_iter().map(|c| c.expect("every complete slot is written exactly once")).collect(),
    )
}

/// One output chunk's surviving-edge range (§4.H step 6's patch target).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkHeader {
    pub edges_offset: u32,
    pub num_edges: u32,
}

/// Step 5: record each chunk's `[start, end)` position in `clips` by its
/// `isFirstEdge`/`isLastEdge` flags.
pub fn chunk_indices(clips: &[EdgeClip], num_chunks: usize) -> Vec<(Option<u32>, Option<u32>)> {
    let mut out = vec![(None, None); num_chunks];
    for (i, clip) in clips.iter().enumerate() {
        let idx = clip.chunk_index as usize;
        if idx >= out.len() {
            continue;
        }
        if clip.is_first_edge {
            out[idx].0 = Some(i as u32);
        }
        if clip.is_last_edge {
            out[idx].1 = Some(i as u32 + 1);
        }
    }
    out
}

/// Step 6: turn the recorded start/end indices into each chunk's
/// `(edgesOffset, numEdges)` header. A chunk with no edges keeps the
/// zeroed default header.
pub fn patch_chunks(indices: &[(Option<u32>, Option<u32>)]) -> Vec<ChunkHeader> {
    indices
        .iter()
        .map(|&(start, end)| match (start, end) {
            (Some(s), Some(e)) if e >= s => ChunkHeader { edges_offset: s, num_edges: e - s },
            _ => ChunkHeader::default(),
        })
        .collect()
}

/// One chunk-tagged sample carried by a `RasterChunkReduceQuad` run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkReduceData {
    pub chunk_index: u32,
    pub min: f64,
    pub max: f64,
}

/// Segmented min/max reduction per chunk (§3.5/§4.H "Segmented chunk
/// reduction"). Represented as an ordered run list — one run per distinct
/// chunk index in position order — which is a strict generalization of the
/// spec's fixed `(leftMin, leftMax, rightMin, rightMax)` quad: `left()` and
/// `right()` below recover exactly that boundary pair, while the run list
/// additionally tracks any same-chunk interior runs a wider merge produces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RasterChunkReduceQuad {
    runs: Vec<ChunkReduceData>,
}

impl RasterChunkReduceQuad {
    pub fn single(chunk_index: u32, value: f64) -> Self {
        Self { runs: vec![ChunkReduceData { chunk_index, min: value, max: value }] }
    }

    pub fn left(&self) -> Option<ChunkReduceData> {
        self.runs.first().copied()
    }

    pub fn right(&self) -> Option<ChunkReduceData> {
        self.runs.last().copied()
    }

    /// Merge `other` onto this interval's right. The shared boundary fuses
    /// into one run when this interval's rightmost chunk matches `other`'s
    /// leftmost chunk (the "combine merges matching chunk indices from the
    /// right onto the left" rule of §4.H); every other run passes through
    /// untouched, so the operation stays associative regardless of how a
    /// reduction tree groups the merges.
    pub fn combine(&self, other: &Self) -> Self {
        let mut runs = self.runs.clone();
        let mut rest = other.runs.iter().copied().peekable();
        if let (Some(last), Some(&first)) = (runs.last_mut(), rest.peek()) {
            if last.chunk_index == first.chunk_index {
                last.min = last.min.min(first.min);
                last.max = last.max.max(first.max);
                rest.next();
            }
        }
        runs.extend(rest);
        Self { runs }
    }
}
