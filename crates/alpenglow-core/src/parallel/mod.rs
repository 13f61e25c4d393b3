//! Component G: parallel primitives (§4.G).
//!
//! Each primitive is specified against a data-parallel SIMT compute model
//! (workgroups of `workgroup_size` threads, each handling `grain_size`
//! elements), but the GPU dispatch layer itself is an external collaborator
//! (§1 Non-goals: GPU binding, shader text generation). What lives here is
//! the pure array transform each kernel computes — the function a WGSL
//! kernel would realize in parallel, executed sequentially. `executor`
//! drives the same primitives against randomized thread interleavings to
//! catch ordering bugs a lucky sequential schedule would hide.

pub mod executor;

/// An associative (not necessarily commutative) binary operator with
/// identity, the algebraic structure every primitive below is built on.
pub trait Monoid: Copy {
    fn identity() -> Self;
    fn combine(&self, other: &Self) -> Self;
}

/// Standard log₂(n)-depth tree reduction, realized here as a left fold
/// since sequential execution has no warp-exit benefit to chase (§4.G.1's
/// "convergent" variant is a scheduling optimization, not a semantic one).
pub fn reduce<T: Monoid>(items: &[T]) -> T {
    items.iter().fold(T::identity(), |acc, x| acc.combine(x))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanKind {
    Inclusive,
    Exclusive,
}

/// Single-level Hillis–Steele scan (§4.G.2), computed directly rather than
/// by simulating the doubling passes a shared-memory kernel would run.
pub fn scan<T: Monoid>(items: &[T], kind: ScanKind) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    let mut acc = T::identity();
    match kind {
        ScanKind::Inclusive => {
            for x in items {
                acc = acc.combine(x);
                out.push(acc);
            }
        }
        ScanKind::Exclusive => {
            for x in items {
                out.push(acc);
                acc = acc.combine(x);
            }
        }
    }
    out
}

/// Scan with a pre-combined base folded into every output slot, the "scan
/// with added value" propagation step used to thread a per-workgroup base
/// through a multi-level scan (§4.G.2).
pub fn scan_with_base<T: Monoid>(items: &[T], base: T, kind: ScanKind) -> Vec<T> {
    scan(items, kind).into_iter().map(|v| base.combine(&v)).collect()
}

/// Multi-level scan (§4.G.2): split into `workgroup_size`-sized chunks, scan
/// each chunk, reduce each chunk to a total, exclusive-scan those totals
/// into per-chunk bases, then re-scan each chunk with its base folded in.
/// Handles any input length without recursion, the same shape as the
/// cross-workgroup scan ladder in §4.H.
pub fn multi_level_scan<T: Monoid>(items: &[T], workgroup_size: usize, kind: ScanKind) -> Vec<T> {
    if items.is_empty() || workgroup_size == 0 {
        return Vec::new();
    }
    let totals: Vec<T> = items.chunks(workgroup_size).map(reduce).collect();
    let bases = scan(&totals, ScanKind::Exclusive);
    let mut out = Vec::with_capacity(items.len());
    for (chunk, base) in items.chunks(workgroup_size).zip(bases) {
        out.extend(scan_with_base(chunk, base, kind));
    }
    out
}

/// Workgroup-local histogram (§4.G.3): `keys` split into `workgroup_size`
/// chunks, each chunk's atomic shared-memory histogram computed
/// independently, returned as the `(numWorkgroups × numBins)` matrix the
/// next stage (a global scan) consumes.
pub fn workgroup_histograms(keys: &[u32], num_bins: u32, workgroup_size: usize) -> Vec<Vec<u32>> {
    if workgroup_size == 0 {
        return Vec::new();
    }
    keys.chunks(workgroup_size)
        .map(|chunk| {
            let mut bins = vec![0u32; num_bins.max(1) as usize];
            for &k in chunk {
                bins[(k % num_bins.max(1)) as usize] += 1;
            }
            bins
        })
        .collect()
}

fn radix_pass(data: &[u32], shift: u32, workgroup_size: usize) -> Vec<u32> {
    let digit = |k: u32| ((k >> shift) & 0xFF) as usize;
    let workgroup_size = workgroup_size.max(1);
    let num_workgroups = data.chunks(workgroup_size).count().max(1);

    // (a) per-workgroup histogram.
    let mut wg_hist = vec![[0u32; 256]; num_workgroups];
    for (w, chunk) in data.chunks(workgroup_size).enumerate() {
        for &k in chunk {
            wg_hist[w][digit(k)] += 1;
        }
    }

    // (b) global scan of histograms: exclusive prefix within each bin across
    // workgroups, then an exclusive prefix across bins for the bin bases.
    let mut offsets = vec![[0u32; 256]; num_workgroups];
    let mut running = [0u32; 256];
    for bin in 0..256 {
        for w in 0..num_workgroups {
            offsets[w][bin] = running[bin];
            running[bin] += wg_hist[w][bin];
        }
    }
    let mut bin_base = [0u32; 256];
    let mut acc = 0u32;
    for bin in 0..256 {
        bin_base[bin] = acc;
        acc += running[bin];
    }

    // (c) scatter using the scanned offsets.
    let mut out = vec![0u32; data.len()];
    let mut cursor = offsets;
    for (w, chunk) in data.chunks(workgroup_size).enumerate() {
        for &k in chunk {
            let d = digit(k);
            let pos = bin_base[d] + cursor[w][d];
            out[pos as usize] = k;
            cursor[w][d] += 1;
        }
    }
    out
}

/// LSD radix sort over 8-bit digits (§4.G.4), each pass staged as the
/// per-workgroup-histogram → global-scan → scatter pipeline the spec
/// describes rather than a plain counting sort.
pub fn radix_sort_u32(keys: &[u32], workgroup_size: usize) -> Vec<u32> {
    let mut data = keys.to_vec();
    for shift in [0, 8, 16, 24] {
        data = radix_pass(&data, shift, workgroup_size);
    }
    data
}

/// Simple two-pointer merge of two sorted slices (§4.G.5, small-array
/// flavor).
pub fn merge<T: Ord + Copy>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] <= b[j] {
            out.push(a[i]);
            i += 1;
        } else {
            out.push(b[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Binary-search the merge diagonal `diag` for its crossover point in `a`
/// (MergePath, §4.G.5's tile-partitioned flavor): the number of `a`
/// elements that land before position `diag` of the merged output.
fn merge_path_partition<T: Ord + Copy>(a: &[T], b: &[T], diag: usize) -> usize {
    let mut lo = diag.saturating_sub(b.len());
    let mut hi = diag.min(a.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if a[mid] <= b[diag - mid - 1] {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Tile-partitioned MergePath merge (§4.G.5): partitions the merge diagonal
/// every `tile_size` output elements by binary search, then merges each
/// tile independently. Produces the same result as `merge`; the
/// partitioning is what would let a parallel dispatch assign one workgroup
/// per tile without any tile needing the others' data.
pub fn merge_path<T: Ord + Copy>(a: &[T], b: &[T], tile_size: usize) -> Vec<T> {
    if tile_size == 0 {
        return merge(a, b);
    }
    let total = a.len() + b.len();
    let mut out = Vec::with_capacity(total);
    let (mut prev_a, mut prev_b) = (0usize, 0usize);
    let mut diag = 0usize;
    while diag < total {
        diag = (diag + tile_size).min(total);
        let a_idx = merge_path_partition(a, b, diag);
        let b_idx = diag - a_idx;
        out.extend(merge(&a[prev_a..a_idx], &b[prev_b..b_idx]));
        prev_a = a_idx;
        prev_b = b_idx;
    }
    out
}

/// Coalesced raked loop (§4.G.6): thread `local_index`'s `g`-th element sits
/// at `local_index + g * workgroup_size`, the access pattern that keeps a
/// real dispatch's memory reads coalesced; `callback` is only invoked for
/// indices under `length`, guarding the tail.
pub fn raked_loop(workgroup_size: usize, grain_size: usize, length: usize, mut callback: impl FnMut(usize, usize)) {
    if workgroup_size == 0 {
        return;
    }
    for local_index in 0..workgroup_size {
        for g in 0..grain_size {
            let data_index = local_index + g * workgroup_size;
            if data_index < length {
                callback(local_index, data_index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Monoid for i64 {
        fn identity() -> Self {
            0
        }
        fn combine(&self, other: &Self) -> Self {
            self + other
        }
    }

    #[test]
    fn reduce_sums_a_run_of_values() {
        assert_eq!(reduce(&[1i64, 2, 3, 4]), 10);
    }

    #[test]
    fn inclusive_and_exclusive_scans_differ_by_one_shift() {
        let items = [1i64, 2, 3, 4];
        assert_eq!(scan(&items, ScanKind::Inclusive), vec![1, 3, 6, 10]);
        assert_eq!(scan(&items, ScanKind::Exclusive), vec![0, 1, 3, 6]);
    }

    #[test]
    fn multi_level_scan_matches_single_level_scan_regardless_of_chunking() {
        let items: Vec<i64> = (1..=20).collect();
        let expected = scan(&items, ScanKind::Exclusive);
        for workgroup_size in [1, 3, 7, 20, 64] {
            assert_eq!(multi_level_scan(&items, workgroup_size, ScanKind::Exclusive), expected);
        }
    }

    #[test]
    fn radix_sort_matches_a_stable_sort_of_the_same_keys() {
        let keys = vec![500u32, 3, 19, 1_000_000, 0, 42, 7, 255, 256, 65535];
        let mut expected = keys.clone();
        expected.sort();
        assert_eq!(radix_sort_u32(&keys, 4), expected);
    }

    #[test]
    fn merge_path_matches_plain_merge_for_any_tile_size() {
        let a = [1, 3, 5, 7, 9, 11, 13];
        let b = [2, 4, 6, 8, 10];
        let expected = merge(&a, &b);
        for tile_size in [1, 2, 3, 5, 100] {
            assert_eq!(merge_path(&a, &b, tile_size), expected);
        }
    }

    #[test]
    fn raked_loop_visits_every_index_exactly_once() {
        let mut seen = vec![0u32; 10];
        raked_loop(4, 3, 10, |_local, data| seen[data] += 1);
        assert!(seen.iter().all(|&c| c == 1));
    }
}
