//! Component I: output raster (§4.I).
//!
//! Premultiplied-linear f64×4 accumulation per pixel, resolved to an RGBA8
//! buffer in the declared color space. Accumulation is additive so direct
//! full-pixel writes coexist with area-weighted partial writes.

use serde::{Deserialize, Serialize};

use crate::program::{linear_to_srgb, Color};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorSpace {
    #[serde(rename = "srgb")]
    Srgb,
    #[serde(rename = "display-p3")]
    DisplayP3,
}

/// Fixed linear-sRGB → linear-Display-P3 matrix (§6.4: reproduced
/// bit-identically across implementations).
const LINEAR_SRGB_TO_DISPLAY_P3: [[f64; 3]; 3] = [
    [0.8224621, 0.1775380, 0.0000000],
    [0.0331941, 0.9668058, 0.0000000],
    [0.0170827, 0.0723974, 0.9105199],
];

fn linear_srgb_to_display_p3(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let m = LINEAR_SRGB_TO_DISPLAY_P3;
    (
        m[0][0] * r + m[0][1] * g + m[0][2] * b,
        m[1][0] * r + m[1][1] * g + m[1][2] * b,
        m[2][0] * r + m[2][1] * g + m[2][2] * b,
    )
}

/// One pixel's premultiplied-linear f64×4 accumulator.
#[derive(Clone, Copy, Debug, Default)]
struct Accumulator {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

/// The output raster: an accumulation buffer plus the resolved u8 RGBA
/// image, built up by `add_client_partial_pixel`/`add_client_full_pixel`
/// and finalized by `resolve`.
pub struct CombinedRaster {
    width: u32,
    height: u32,
    color_space: ColorSpace,
    show_out_of_gamut: bool,
    accumulation: Vec<Accumulator>,
    image: Vec<u8>,
    resolved: bool,
}

impl CombinedRaster {
    pub fn new(width: u32, height: u32, color_space: ColorSpace, show_out_of_gamut: bool) -> Self {
        let n = (width * height) as usize;
        Self {
            width,
            height,
            color_space,
            show_out_of_gamut,
            accumulation: vec![Accumulator::default(); n],
            image: vec![0u8; n * 4],
            resolved: false,
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Area-weighted accumulation of a partial-coverage pixel (§4.I).
    pub fn add_client_partial_pixel(&mut self, color: Color, weight: f64, x: u32, y: u32) {
        let i = self.index(x, y);
        let acc = &mut self.accumulation[i];
        acc.r += color.r * color.a * weight;
        acc.g += color.g * color.a * weight;
        acc.b += color.b * color.a * weight;
        acc.a += color.a * weight;
        self.resolved = false;
    }

    /// Write a fully-covered pixel directly to the u8 buffer, bypassing
    /// accumulation (§4.I). Additive, to coexist with accumulated pixels.
    pub fn add_client_full_pixel(&mut self, color: Color, x: u32, y: u32) {
        let (r, g, b) = self.to_output_space(color.r, color.g, color.b);
        let idx = self.index(x, y) * 4;
        self.image[idx] = add_u8(self.image[idx], to_u8(r));
        self.image[idx + 1] = add_u8(self.image[idx + 1], to_u8(g));
        self.image[idx + 2] = add_u8(self.image[idx + 2], to_u8(b));
        self.image[idx + 3] = add_u8(self.image[idx + 3], to_u8(color.a));
    }

    /// Write a fully-covered rectangular region `[x, x+width] × [y, y+height]`
    /// (§9's open question: the far corner is inclusive of the boundary
    /// pixel, not exclusive as the source assertions suggested).
    pub fn add_client_full_region(&mut self, color: Color, x: u32, y: u32, width: u32, height: u32) {
        assert!(x + width <= self.width, "region's far corner must stay within the raster");
        assert!(y + height <= self.height, "region's far corner must stay within the raster");
        for py in y..y + height {
            for px in x..x + width {
                self.add_client_full_pixel(color, px, py);
            }
        }
    }

    fn to_output_space(&self, r: f64, g: f64, b: f64) -> (f64, f64, f64) {
        let (r, g, b) = match self.color_space {
            ColorSpace::Srgb => (r, g, b),
            ColorSpace::DisplayP3 => linear_srgb_to_display_p3(r, g, b),
        };
        (linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b))
    }

    /// Unpremultiply, convert to the output OETF, and additively write into
    /// the u8 buffer; clears accumulation afterward. Idempotent: calling
    /// `resolve` again without further accumulation is a no-op.
    pub fn resolve(&mut self) -> &[u8] {
        if !self.resolved {
            for i in 0..self.accumulation.len() {
                let acc = self.accumulation[i];
                if acc.a > 0.0 {
                    let (r, g, b) = (acc.r / acc.a, acc.g / acc.a, acc.b / acc.a);
                    let (r, g, b) = self.to_output_space(r, g, b);
                    if !self.show_out_of_gamut {
                        let idx = i * 4;
                        self.image[idx] = add_u8(self.image[idx], to_u8(r));
                        self.image[idx + 1] = add_u8(self.image[idx + 1], to_u8(g));
                        self.image[idx + 2] = add_u8(self.image[idx + 2], to_u8(b));
                        self.image[idx + 3] = add_u8(self.image[idx + 3], to_u8(acc.a));
                    }
                }
                self.accumulation[i] = Accumulator::default();
            }
            self.resolved = true;
        }
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

fn to_u8(c: f64) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn add_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_area_constant_color_renders_expected_pixels() {
        let mut raster = CombinedRaster::new(2, 2, ColorSpace::Srgb, false);
        let red = Color::new(1.0, 0.0, 0.0, 1.0);
        for y in 0..2 {
            for x in 0..2 {
                raster.add_client_full_pixel(red, x, y);
            }
        }
        let image = raster.resolve();
        for chunk in image.chunks(4) {
            assert_eq!(chunk, &[255, 0, 0, 255]);
        }
    }

    #[test]
    fn resolve_is_idempotent_after_accumulation_clears() {
        let mut raster = CombinedRaster::new(1, 1, ColorSpace::Srgb, false);
        raster.add_client_partial_pixel(Color::new(1.0, 1.0, 1.0, 1.0), 1.0, 0, 0);
        let first = raster.resolve().to_vec();
        let second = raster.resolve().to_vec();
        assert_eq!(first, second);
    }
}
