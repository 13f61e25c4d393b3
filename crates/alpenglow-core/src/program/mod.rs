//! Component D: the `RenderProgram` tree (§4.D).
//!
//! A pure, referentially-transparent expression tree describing the color
//! of a face: constants, path membership tests, compositing, color-space
//! conversion, and gradients. Nodes are shared via `Rc` (§9's "shared
//! ownership with lifetime = longest holder") so `simplify` can return
//! subtrees of the input unchanged instead of cloning them.

pub mod instructions;

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::arrangement::PathId;
use crate::error::AlpenglowError;

/// Straight (non-premultiplied) RGBA in whatever color space the evaluating
/// node operates in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const TRANSPARENT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn scaled(&self, k: f64) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k, self.a * k)
    }

    pub fn is_fully_transparent(&self) -> bool {
        self.a == 0.0
    }

    pub fn is_fully_opaque(&self) -> bool {
        self.a == 1.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComposeOp {
    Over,
    In,
    Out,
    Atop,
    Xor,
}

/// What an evaluation context must supply for a node to evaluate (§4.D:
/// "any node whose input context lacks a required capability ... is a
/// programming error").
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderEvaluationContext {
    pub area: Option<f64>,
    pub centroid: Option<(f64, f64)>,
    pub aabb: Option<(f64, f64, f64, f64)>,
}

impl RenderEvaluationContext {
    /// Whether `path` contains the face this context describes. Scenes pass
    /// their own membership test in via `pipeline::rasterize`; standalone
    /// evaluation (e.g. unit tests) can pass a constant closure.
    pub fn path_test<'a>(&self, test: &'a dyn Fn(PathId) -> bool, path: PathId) -> bool {
        test(path)
    }
}

/// The color-expression tree (§3.3/§4.D). Variants are a representative
/// subset of the full specification: constants, path membership, alpha,
/// blend/compose, a linear gradient, and the premultiply/color-space
/// conversions needed to round-trip through the rasterizer's accumulation
/// buffer (§4.I). Gradient kinds beyond linear, image sampling, and the
/// perspective/barycentric blends are out of scope for this pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum RenderProgram {
    Color(Color),
    PathBoolean(PathId, Rc<RenderProgram>, Rc<RenderProgram>),
    Alpha(Rc<RenderProgram>, f64),
    Blend(Rc<RenderProgram>, Rc<RenderProgram>, BlendMode),
    Compose(Rc<RenderProgram>, Rc<RenderProgram>, ComposeOp),
    LinearGradient {
        start: (f64, f64),
        end: (f64, f64),
        stops: Vec<(f64, Color)>,
    },
    Premultiply(Rc<RenderProgram>),
    Unpremultiply(Rc<RenderProgram>),
    LinearSrgbToSrgb(Rc<RenderProgram>),
    SrgbToLinearSrgb(Rc<RenderProgram>),
}

impl RenderProgram {
    pub fn children(&self) -> Vec<Rc<RenderProgram>> {
        match self {
            RenderProgram::Color(_) | RenderProgram::LinearGradient { .. } => vec![],
            RenderProgram::PathBoolean(_, inside, outside) => vec![inside.clone(), outside.clone()],
            RenderProgram::Alpha(child, _) => vec![child.clone()],
            RenderProgram::Blend(a, b, _) => vec![a.clone(), b.clone()],
            RenderProgram::Compose(a, b, _) => vec![a.clone(), b.clone()],
            RenderProgram::Premultiply(child) => vec![child.clone()],
            RenderProgram::Unpremultiply(child) => vec![child.clone()],
            RenderProgram::LinearSrgbToSrgb(child) => vec![child.clone()],
            RenderProgram::SrgbToLinearSrgb(child) => vec![child.clone()],
        }
    }

    /// Preserve this node's shape but swap in new children, in the same
    /// order `children()` produced them.
    pub fn with_children(&self, mut cs: Vec<Rc<RenderProgram>>) -> Rc<RenderProgram> {
        let take_one = |cs: &mut Vec<Rc<RenderProgram>>| cs.remove(0);
        match self {
            RenderProgram::Color(_) | RenderProgram::LinearGradient { .. } => Rc::new(self.clone()),
            RenderProgram::PathBoolean(path, _, _) => {
                let inside = take_one(&mut cs);
                let outside = take_one(&mut cs);
                Rc::new(RenderProgram::PathBoolean(*path, inside, outside))
            }
            RenderProgram::Alpha(_, a) => Rc::new(RenderProgram::Alpha(take_one(&mut cs), *a)),
            RenderProgram::Blend(_, _, mode) => {
                let a = take_one(&mut cs);
                let b = take_one(&mut cs);
                Rc::new(RenderProgram::Blend(a, b, *mode))
            }
            RenderProgram::Compose(_, _, op) => {
                let a = take_one(&mut cs);
                let b = take_one(&mut cs);
                Rc::new(RenderProgram::Compose(a, b, *op))
            }
            RenderProgram::Premultiply(_) => Rc::new(RenderProgram::Premultiply(take_one(&mut cs))),
            RenderProgram::Unpremultiply(_) => Rc::new(RenderProgram::Unpremultiply(take_one(&mut cs))),
            RenderProgram::LinearSrgbToSrgb(_) => Rc::new(RenderProgram::LinearSrgbToSrgb(take_one(&mut cs))),
            RenderProgram::SrgbToLinearSrgb(_) => Rc::new(RenderProgram::SrgbToLinearSrgb(take_one(&mut cs))),
        }
    }

    pub fn equals(&self, other: &RenderProgram) -> bool {
        format!("{self:?}") == format!("{other:?}")
    }

    pub fn needs_face(&self) -> bool {
        matches!(self, RenderProgram::PathBoolean(..)) || self.children().iter().any(|c| c.needs_face())
    }

    pub fn needs_centroid(&self) -> bool {
        matches!(self, RenderProgram::LinearGradient { .. }) || self.children().iter().any(|c| c.needs_centroid())
    }

    /// §4.D simplification rules (representative subset): zero/one alpha,
    /// constant-folded `Alpha(Color)`, trivially-rejected `PathBoolean`
    /// branches, and color-space conversions cancelling their inverse.
    /// `path_test` returns `Some(b)` when membership is statically known,
    /// `None` when it must be deferred to evaluation.
    pub fn simplify(self: &Rc<Self>, path_test: &dyn Fn(PathId) -> Option<bool>) -> Rc<RenderProgram> {
        let simplified_children: Vec<Rc<RenderProgram>> = self.children().iter().map(|c| c.simplify(path_test)).collect();
        let with_simplified_children = self.with_children(simplified_children);

        match with_simplified_children.as_ref() {
            RenderProgram::Alpha(_, a) if *a == 0.0 => Rc::new(RenderProgram::Color(Color::TRANSPARENT)),
            RenderProgram::Alpha(child, a) if *a == 1.0 => child.clone(),
            RenderProgram::Alpha(child, a) => {
                if let RenderProgram::Color(c) = child.as_ref() {
                    Rc::new(RenderProgram::Color(c.scaled(*a)))
                } else {
                    with_simplified_children
                }
            }
            RenderProgram::PathBoolean(path, inside, outside) => match path_test(*path) {
                Some(true) => inside.clone(),
                Some(false) => outside.clone(),
                None => with_simplified_children,
            },
            RenderProgram::LinearSrgbToSrgb(child) => {
                if let RenderProgram::SrgbToLinearSrgb(inner) = child.as_ref() {
                    inner.clone()
                } else {
                    with_simplified_children
                }
            }
            RenderProgram::SrgbToLinearSrgb(child) => {
                if let RenderProgram::LinearSrgbToSrgb(inner) = child.as_ref() {
                    inner.clone()
                } else {
                    with_simplified_children
                }
            }
            _ => with_simplified_children,
        }
    }

    /// Evaluate this node at one point, given the shared context built for
    /// the enclosing face (§4.D).
    pub fn evaluate(&self, ctx: &RenderEvaluationContext, path_test: &dyn Fn(PathId) -> bool) -> Result<Color, AlpenglowError> {
        match self {
            RenderProgram::Color(c) => Ok(*c),
            RenderProgram::PathBoolean(path, inside, outside) => {
                if path_test(*path) {
                    inside.evaluate(ctx, path_test)
                } else {
                    outside.evaluate(ctx, path_test)
                }
            }
            RenderProgram::Alpha(child, a) => Ok(child.evaluate(ctx, path_test)?.scaled(*a)),
            RenderProgram::Blend(a, b, mode) => {
                let ca = a.evaluate(ctx, path_test)?;
                let cb = b.evaluate(ctx, path_test)?;
                Ok(blend(ca, cb, *mode))
            }
            RenderProgram::Compose(a, b, op) => {
                let ca = a.evaluate(ctx, path_test)?;
                let cb = b.evaluate(ctx, path_test)?;
                Ok(compose(ca, cb, *op))
            }
            RenderProgram::LinearGradient { start, end, stops } => {
                let centroid = ctx.centroid.ok_or_else(|| AlpenglowError::UnsupportedCapability {
                    detail: "LinearGradient requires a centroid in the evaluation context".into(),
                })?;
                Ok(sample_linear_gradient(*start, *end, stops, centroid))
            }
            RenderProgram::Premultiply(child) => {
                let c = child.evaluate(ctx, path_test)?;
                Ok(Color::new(c.r * c.a, c.g * c.a, c.b * c.a, c.a))
            }
            RenderProgram::Unpremultiply(child) => {
                let c = child.evaluate(ctx, path_test)?;
                if c.a == 0.0 {
                    Ok(Color::TRANSPARENT)
                } else {
                    Ok(Color::new(c.r / c.a, c.g / c.a, c.b / c.a, c.a))
                }
            }
            RenderProgram::LinearSrgbToSrgb(child) => {
                let c = child.evaluate(ctx, path_test)?;
                Ok(Color::new(linear_to_srgb(c.r), linear_to_srgb(c.g), linear_to_srgb(c.b), c.a))
            }
            RenderProgram::SrgbToLinearSrgb(child) => {
                let c = child.evaluate(ctx, path_test)?;
                Ok(Color::new(srgb_to_linear(c.r), srgb_to_linear(c.g), srgb_to_linear(c.b), c.a))
            }
        }
    }
}

fn blend(a: Color, b: Color, mode: BlendMode) -> Color {
    match mode {
        BlendMode::Normal => b,
        BlendMode::Multiply => Color::new(a.r * b.r, a.g * b.g, a.b * b.b, a.a.max(b.a)),
        BlendMode::Screen => Color::new(
            1.0 - (1.0 - a.r) * (1.0 - b.r),
            1.0 - (1.0 - a.g) * (1.0 - b.g),
            1.0 - (1.0 - a.b) * (1.0 - b.b),
            a.a.max(b.a),
        ),
    }
}

fn compose(a: Color, b: Color, op: ComposeOp) -> Color {
    let (fa, fb) = match op {
        ComposeOp::Over => (1.0, 1.0 - a.a),
        ComposeOp::In => (b.a, 0.0),
        ComposeOp::Out => (1.0 - b.a, 0.0),
        ComposeOp::Atop => (b.a, 1.0 - a.a),
        ComposeOp::Xor => (1.0 - b.a, 1.0 - a.a),
    };
    Color::new(a.r * fa + b.r * fb, a.g * fa + b.g * fb, a.b * fa + b.b * fb, a.a * fa + b.a * fb)
}

fn sample_linear_gradient(start: (f64, f64), end: (f64, f64), stops: &[(f64, Color)], point: (f64, f64)) -> Color {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let len2 = dx * dx + dy * dy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((point.0 - start.0) * dx + (point.1 - start.1) * dy) / len2).clamp(0.0, 1.0)
    };
    if stops.is_empty() {
        return Color::TRANSPARENT;
    }
    for pair in stops.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t >= t0 && t <= t1 {
            let k = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
            return Color::new(
                c0.r + (c1.r - c0.r) * k,
                c0.g + (c1.g - c0.g) * k,
                c0.b + (c1.b - c0.b) * k,
                c0.a + (c1.a - c0.a) * k,
            );
        }
    }
    if t <= stops[0].0 { stops[0].1 } else { stops[stops.len() - 1].1 }
}

/// sRGB OETF using the precise breakpoint named in §6.4.
pub fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.00313066844250063 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

pub fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.0404482362771082 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_zero_simplifies_to_transparent() {
        let program = Rc::new(RenderProgram::Alpha(Rc::new(RenderProgram::Color(Color::new(1.0, 0.0, 0.0, 1.0))), 0.0));
        let simplified = program.simplify(&|_| None);
        assert!(matches!(simplified.as_ref(), RenderProgram::Color(c) if c.is_fully_transparent()));
    }

    #[test]
    fn alpha_one_simplifies_to_child() {
        let child = Rc::new(RenderProgram::Color(Color::new(0.0, 1.0, 0.0, 1.0)));
        let program = Rc::new(RenderProgram::Alpha(child.clone(), 1.0));
        let simplified = program.simplify(&|_| None);
        assert!(simplified.equals(&child));
    }

    #[test]
    fn path_boolean_resolves_to_known_branch() {
        let inside = Rc::new(RenderProgram::Color(Color::new(1.0, 0.0, 0.0, 1.0)));
        let outside = Rc::new(RenderProgram::Color(Color::new(0.0, 0.0, 1.0, 1.0)));
        let program = Rc::new(RenderProgram::PathBoolean(PathId(0), inside.clone(), outside));
        let simplified = program.simplify(&|p| Some(p == PathId(0)));
        assert!(simplified.equals(&inside));
    }

    #[test]
    fn color_space_round_trip_cancels() {
        let child = Rc::new(RenderProgram::Color(Color::new(0.2, 0.3, 0.4, 1.0)));
        let program = Rc::new(RenderProgram::LinearSrgbToSrgb(Rc::new(RenderProgram::SrgbToLinearSrgb(child.clone()))));
        let simplified = program.simplify(&|_| None);
        assert!(simplified.equals(&child));
    }

    #[test]
    fn simplify_is_idempotent() {
        let program = Rc::new(RenderProgram::Alpha(Rc::new(RenderProgram::Color(Color::new(1.0, 1.0, 1.0, 1.0))), 0.5));
        let once = program.simplify(&|_| None);
        let twice = once.simplify(&|_| None);
        assert!(once.equals(&twice));
    }

    #[test]
    fn constant_color_evaluates_unchanged() {
        let program = RenderProgram::Color(Color::new(1.0, 0.0, 0.0, 1.0));
        let ctx = RenderEvaluationContext::default();
        let result = program.evaluate(&ctx, &|_| false).unwrap();
        assert_eq!(result, Color::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn gradient_without_centroid_is_unsupported_capability() {
        let program = RenderProgram::LinearGradient {
            start: (0.0, 0.0),
            end: (1.0, 0.0),
            stops: vec![(0.0, Color::new(0.0, 0.0, 0.0, 1.0)), (1.0, Color::new(1.0, 1.0, 1.0, 1.0))],
        };
        let ctx = RenderEvaluationContext::default();
        let err = program.evaluate(&ctx, &|_| false).unwrap_err();
        assert!(matches!(err, AlpenglowError::UnsupportedCapability { .. }));
    }
}
