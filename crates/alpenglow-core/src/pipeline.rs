//! Top-level `rasterize(...)` entry point (§2): sequences grid-snap +
//! arrangement (B), boundary/hole/winding tracing (C), per-face program
//! tagging (D), the clippable-face/tile-bin rasterizer (E/F), and resolves
//! the result through the output raster (I). `rasterclip`'s segmented
//! reduction and `parallel`'s primitives back the tile/bin pass's own
//! internals rather than being invoked directly from here.

use std::rc::Rc;

use tracing::{debug, debug_span};

use crate::arrangement::{build_arrangement_with_bits, Arrangement, PathId, RenderPath, WindingMap};
use crate::clip::PolygonalFace;
use crate::config::RasterConfig;
use crate::error::AlpenglowError;
use crate::faces::tagging::merge_tagged_faces;
use crate::faces::{build_face_graph, nesting::RationalFace, PolygonalFace as FacePolygon};
use crate::program::RenderProgram;
use crate::raster::{rasterize_faces, RenderableFace};

/// One scene layer: a path and the program that colors its interior.
pub struct Layer {
    pub path: RenderPath,
    pub program: Rc<RenderProgram>,
}

/// Rasterize `layers` into a `width × height` RGBA8 buffer, sequencing
/// A→B→C→(D tagging)→E/F→I (§2's control-flow diagram). A traced face
/// belongs to the highest-indexed layer whose path contains it (later
/// layers paint over earlier ones where they overlap); layers are expected
/// not to overlap if distinct per-pixel blending between them matters, since
/// the output raster's accumulation is additive rather than a full painter's
/// algorithm (§4.I).
pub fn rasterize(layers: &[Layer], width: u32, height: u32, config: &RasterConfig) -> Result<Vec<u8>, AlpenglowError> {
    let span = debug_span!("rasterize", layers = layers.len(), width, height);
    let _enter = span.enter();

    let paths: Vec<RenderPath> = layers.iter().map(|l| l.path.clone()).collect();
    let arrangement = {
        let _enter = debug_span!("build_arrangement").entered();
        build_arrangement_with_bits(&paths, config.grid_bits)?
    };
    debug!(half_edges = arrangement.edges.len(), "arrangement built");

    let faces_and_windings = {
        let _enter = debug_span!("build_face_graph").entered();
        build_face_graph(&arrangement)?
    };
    debug!(faces = faces_and_windings.len(), "faces traced");

    let renderable = {
        let _enter = debug_span!("tag_faces").entered();
        tag_faces(&faces_and_windings, &arrangement, layers)
    };
    debug!(renderable_faces = renderable.len(), "faces tagged with a program");

    let mut raster = {
        let _enter = debug_span!("rasterize_faces", faces = renderable.len()).entered();
        rasterize_faces(&renderable, width, height, config)?
    };
    Ok(raster.resolve().to_vec())
}

/// §4.C "Face tagging" specialized to painter's-order layer ownership: for
/// each traced face, find its owning layer, extract that single face's
/// polygon by reusing the same boundary-stitching `faces::tagging` uses for
/// Boolean ops (tagging exactly one face "true"), and resolve the owning
/// layer's program against that face's fixed winding.
fn tag_faces(faces_and_windings: &[(RationalFace, WindingMap)], arrangement: &Arrangement, layers: &[Layer]) -> Vec<RenderableFace> {
    let fill_rules: Vec<_> = layers.iter().map(|l| l.path.fill_rule).collect();
    let mut renderable = Vec::new();

    for (index, (_face, winding)) in faces_and_windings.iter().enumerate() {
        let owner = (0..layers.len()).rev().find(|&j| fill_rules[j].is_inside(winding.get(PathId(j))));
        let owner = match owner {
            Some(o) => o,
            None => continue,
        };

        let mut tags = vec![false; faces_and_windings.len()];
        tags[index] = true;
        let polygon = match merge_tagged_faces(&tags, &arrangement.edges, &arrangement.snap).into_iter().next() {
            Some(FacePolygon { rings }) => PolygonalFace { rings },
            None => continue,
        };
        if polygon.rings.is_empty() {
            continue;
        }

        let winding = winding.clone();
        let fill_rules = fill_rules.clone();
        let path_test: Box<dyn Fn(PathId) -> bool> = Box::new(move |p: PathId| {
            fill_rules.get(p.0).map(|rule| rule.is_inside(winding.get(p))).unwrap_or(false)
        });

        let program = layers[owner].program.simplify(&|p| Some(path_test(p)));
        renderable.push(RenderableFace { polygon, program, path_test });
    }

    renderable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::{FillRule, Vector2};
    use crate::program::Color;

    fn square(x: f64, y: f64, s: f64) -> RenderPath {
        RenderPath::new(
            FillRule::NonZero,
            vec![vec![
                Vector2::new(x, y),
                Vector2::new(x + s, y),
                Vector2::new(x + s, y + s),
                Vector2::new(x, y + s),
            ]],
        )
    }

    #[test]
    fn a_single_opaque_square_layer_fills_its_covered_pixels() {
        let layer = Layer { path: square(0.0, 0.0, 2.0), program: Rc::new(RenderProgram::Color(Color::new(0.0, 1.0, 0.0, 1.0))) };
        let image = rasterize(&[layer], 2, 2, &RasterConfig::default()).unwrap();
        for chunk in image.chunks(4) {
            assert_eq!(chunk, &[0, 255, 0, 255]);
        }
    }

    #[test]
    fn a_later_layer_paints_over_an_earlier_overlapping_one() {
        let background = Layer { path: square(0.0, 0.0, 2.0), program: Rc::new(RenderProgram::Color(Color::new(1.0, 0.0, 0.0, 1.0))) };
        let foreground = Layer { path: square(0.0, 0.0, 1.0), program: Rc::new(RenderProgram::Color(Color::new(0.0, 0.0, 1.0, 1.0))) };
        let image = rasterize(&[background, foreground], 2, 2, &RasterConfig::default()).unwrap();
        // Top-left pixel (covered by both) takes the foreground's color.
        assert_eq!(&image[0..4], &[0, 0, 255, 255]);
        // Top-right pixel (background only) keeps the background's color.
        assert_eq!(&image[4..8], &[255, 0, 0, 255]);
    }

    #[test]
    fn an_empty_scene_produces_a_fully_transparent_image() {
        let image = rasterize(&[], 2, 2, &RasterConfig::default()).unwrap();
        assert!(image.iter().all(|&b| b == 0));
    }
}
