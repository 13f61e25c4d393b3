//! Exact numerics: arbitrary-precision rationals and the GPU-targeted q128 codec.
//!
//! Purpose
//! - Back the integer edge arrangement (module B) with arithmetic that never
//!   loses precision: every intersection point computed during arrangement is
//!   an exact `BigRational`, never a float.
//!
//! Why this design
//! - Reduction is deferred (`BigRational` does not normalize on every op);
//!   callers compare and combine via cross-multiplication instead of forcing
//!   a gcd reduction on every arithmetic step. This keeps the common case
//!   (build up a handful of terms, compare once) cheap.
//! - `q128` packs the same abstraction into two fixed-width machine words so
//!   it can cross into a GPU-style binary buffer (see `crate::raster` packed
//!   formats); it mirrors `BigRational`'s contract on a bounded domain.
//!
//! References
//! - DESIGN.md §A (Exact numerics)

mod bigrational;
mod q128;

pub use bigrational::{BigRational, BigRationalVector2};
pub use q128::Q128;
