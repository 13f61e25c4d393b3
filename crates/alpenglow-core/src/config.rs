//! Pipeline-wide tunables (§4.L): one small `Copy` struct threaded through
//! `pipeline::rasterize` instead of scattered constants, the same role
//! `GeomCfg` plays for the polytope solvers this crate grew out of.

use crate::arrangement::DEFAULT_GRID_BITS;
use crate::raster::output::ColorSpace;

/// Tile/bin sizing and numeric tunables for one `rasterize` call.
#[derive(Clone, Copy, Debug)]
pub struct RasterConfig {
    /// Grid-snap precision budget (§4.B step 1), `2^grid_bits`.
    pub grid_bits: u32,
    /// Bins per tile edge in the coarse pass (§4.F pass 1).
    pub tile_bins: u32,
    /// Pixels per bin edge in the fine pass (§4.F pass 2).
    pub bin_pixels: u32,
    /// Output color space (§6.4).
    pub color_space: ColorSpace,
    /// Whether out-of-[0,1]-gamut pixels are flagged rather than clamped.
    pub show_out_of_gamut: bool,
    /// Workgroup thread count for the parallel primitives (§4.G).
    pub workgroup_size: u32,
    /// Elements processed per thread per workgroup (§4.G raked iteration).
    pub grain_size: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            grid_bits: DEFAULT_GRID_BITS,
            tile_bins: 16,
            bin_pixels: 1,
            color_space: ColorSpace::Srgb,
            show_out_of_gamut: false,
            workgroup_size: 256,
            grain_size: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_tile_shape() {
        let cfg = RasterConfig::default();
        assert_eq!(cfg.grid_bits, 20);
        assert_eq!(cfg.tile_bins, 16);
        assert_eq!(cfg.bin_pixels, 1);
    }
}
