//! Component F: two-pass tile/bin rasterizer (§4.F).
//!
//! Pass 1 clips every renderable face against each coarse tile's bounds,
//! discarding faces that miss the tile entirely. Pass 2 clips each survivor
//! against its fine bins: a bin fully covered by the face writes its color
//! directly, a partially-covered bin is subdivided to individual pixels and
//! each pixel's exact coverage fraction is integrated into the output
//! raster's accumulation buffer (§4.I).

pub mod output;

use std::rc::Rc;

use crate::arrangement::PathId;
use crate::clip::{ClippableFace, PolygonalFace};
use crate::config::RasterConfig;
use crate::error::AlpenglowError;
use crate::program::{Color, RenderEvaluationContext, RenderProgram};
use output::CombinedRaster;

/// One face ready for rasterization: its polygon in pixel-space units, the
/// (already-simplified) program that colors it, and the membership test any
/// surviving `PathBoolean` node needs at evaluation time.
pub struct RenderableFace {
    pub polygon: PolygonalFace,
    pub program: Rc<RenderProgram>,
    pub path_test: Box<dyn Fn(PathId) -> bool>,
}

struct TileFace<'a> {
    polygon: PolygonalFace,
    program: &'a Rc<RenderProgram>,
    path_test: &'a dyn Fn(PathId) -> bool,
}

/// Rasterize `faces` into a `width × height` raster using the tile/bin
/// shape and color space named by `config` (§4.F, §4.L). Tiles are
/// `config.tile_bins * config.bin_pixels` pixels square; bins are
/// `config.bin_pixels` pixels square.
pub fn rasterize_faces(faces: &[RenderableFace], width: u32, height: u32, config: &RasterConfig) -> Result<CombinedRaster, AlpenglowError> {
    let mut raster = CombinedRaster::new(width, height, config.color_space, config.show_out_of_gamut);
    let tile_size = (config.tile_bins * config.bin_pixels).max(1);
    let bin_size = config.bin_pixels.max(1);

    let mut tile_y = 0;
    while tile_y < height {
        let tile_h = tile_size.min(height - tile_y);
        let mut tile_x = 0;
        while tile_x < width {
            let tile_w = tile_size.min(width - tile_x);
            let tile_bounds = (tile_x as f64, tile_y as f64, (tile_x + tile_w) as f64, (tile_y + tile_h) as f64);
            let tile_faces = tile_pass(faces, tile_bounds);
            bin_pass(&tile_faces, tile_x, tile_y, tile_w, tile_h, bin_size, &mut raster)?;
            tile_x += tile_size;
        }
        tile_y += tile_size;
    }
    raster.resolve();
    Ok(raster)
}

/// Pass 1 (§4.F): clip every face against one tile's bounds, dropping
/// faces the tile doesn't intersect at all.
fn tile_pass<'a>(faces: &'a [RenderableFace], tile_bounds: (f64, f64, f64, f64)) -> Vec<TileFace<'a>> {
    faces
        .iter()
        .filter_map(|f| {
            let clipped = f.polygon.clipped(tile_bounds);
            if clipped.area().abs() <= 1e-12 {
                None
            } else {
                Some(TileFace { polygon: clipped, program: &f.program, path_test: f.path_test.as_ref() })
            }
        })
        .collect()
}

/// Pass 2 (§4.F): clip each tile-surviving face against every bin in the
/// tile. A bin the face covers completely writes directly; otherwise each
/// pixel in the bin gets its own exact clip and coverage-weighted
/// accumulation.
fn bin_pass(
    tile_faces: &[TileFace],
    tile_x: u32,
    tile_y: u32,
    tile_w: u32,
    tile_h: u32,
    bin_size: u32,
    raster: &mut CombinedRaster,
) -> Result<(), AlpenglowError> {
    let mut by = 0;
    while by < tile_h {
        let bin_h = bin_size.min(tile_h - by);
        let mut bx = 0;
        while bx < tile_w {
            let bin_w = bin_size.min(tile_w - bx);
            let px = tile_x + bx;
            let py = tile_y + by;
            let bin_bounds = (px as f64, py as f64, (px + bin_w) as f64, (py + bin_h) as f64);
            let bin_area = (bin_bounds.2 - bin_bounds.0) * (bin_bounds.3 - bin_bounds.1);

            for face in tile_faces {
                let bin_clip = face.polygon.clipped(bin_bounds);
                let bin_clip_area = bin_clip.area();
                if bin_clip_area.abs() <= 1e-12 {
                    continue;
                }
                if (bin_clip_area - bin_area).abs() < 1e-9 {
                    let color = evaluate_face(face, &bin_clip, bin_clip_area)?;
                    if !color.is_fully_transparent() {
                        raster.add_client_full_region(color, px, py, bin_w, bin_h);
                    }
                    continue;
                }
                for yy in py..py + bin_h {
                    for xx in px..px + bin_w {
                        let pixel_bounds = (xx as f64, yy as f64, xx as f64 + 1.0, yy as f64 + 1.0);
                        let pixel_clip = bin_clip.clipped(pixel_bounds);
                        let pixel_area = pixel_clip.area();
                        if pixel_area.abs() <= 1e-12 {
                            continue;
                        }
                        let color = evaluate_face(face, &pixel_clip, pixel_area)?;
                        if color.is_fully_transparent() {
                            continue;
                        }
                        raster.add_client_partial_pixel(color, pixel_area.abs(), xx, yy);
                    }
                }
            }
            bx += bin_size;
        }
        by += bin_size;
    }
    Ok(())
}

fn evaluate_face(face: &TileFace, polygon: &PolygonalFace, area: f64) -> Result<Color, AlpenglowError> {
    let ctx = RenderEvaluationContext {
        area: Some(area.abs()),
        centroid: Some(polygon.centroid(area)),
        aabb: Some(polygon.bounds()),
    };
    face.program.evaluate(&ctx, face.path_test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Color;

    fn square_face(rings: Vec<(f64, f64)>, color: Color) -> RenderableFace {
        RenderableFace {
            polygon: PolygonalFace { rings: vec![rings] },
            program: Rc::new(RenderProgram::Color(color)),
            path_test: Box::new(|_| true),
        }
    }

    #[test]
    fn a_face_covering_the_whole_raster_fills_every_pixel_opaque() {
        let face = square_face(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)], Color::new(1.0, 0.0, 0.0, 1.0));
        let mut raster = rasterize_faces(&[face], 2, 2, &RasterConfig::default()).unwrap();
        let image = raster.resolve();
        for chunk in image.chunks(4) {
            assert_eq!(chunk[3], 255, "every pixel should end up fully opaque");
        }
    }

    #[test]
    fn a_face_covering_half_the_raster_leaves_the_other_half_untouched() {
        let face = square_face(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], Color::new(1.0, 1.0, 1.0, 1.0));
        let mut raster = rasterize_faces(&[face], 2, 1, &RasterConfig::default()).unwrap();
        let image = raster.resolve();
        assert_eq!(&image[0..4], &[255, 255, 255, 255]);
        assert_eq!(&image[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn partial_pixel_coverage_resolves_to_a_scaled_alpha() {
        let face = square_face(vec![(0.0, 0.0), (0.5, 0.0), (0.5, 1.0), (0.0, 1.0)], Color::new(1.0, 1.0, 1.0, 1.0));
        let mut raster = rasterize_faces(&[face], 1, 1, &RasterConfig::default()).unwrap();
        let image = raster.resolve();
        assert_eq!(image[3], 128, "half-covered pixel's alpha should land near 50%");
    }
}
