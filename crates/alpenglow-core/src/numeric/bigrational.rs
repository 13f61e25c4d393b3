//! Signed rational with `BigInt` numerator/denominator, reduction deferred.
//!
//! Invariant: `denominator != 0`. Canonical (gcd-reduced) form is never
//! required for correctness — `equals`/`compare_cross_mul` cross-multiply
//! instead — but `reduce` is available for callers who want small terms
//! (e.g. before caching a winding-map key).

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};
use std::cmp::Ordering;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A signed rational `numerator / denominator`. Denominator is kept positive
/// by convention but this is not load-bearing for correctness (every
/// comparison and equality check cross-multiplies, which is sign-correct
/// either way); `reduce` restores the positive-denominator convention.
#[derive(Clone, Debug)]
pub struct BigRational {
    pub numerator: BigInt,
    pub denominator: BigInt,
}

impl BigRational {
    /// Division by zero is a programming error: the intersection routines
    /// that construct `BigRational`s never produce a zero denominator, since
    /// every input edge has distinct endpoints (see module B, §4.B).
    #[inline]
    pub fn new(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Self {
        let denominator = denominator.into();
        assert!(
            !denominator.is_zero(),
            "BigRational: zero denominator is a programming error, never produced by exact intersection"
        );
        Self {
            numerator: numerator.into(),
            denominator,
        }
    }

    #[inline]
    pub fn from_integer(n: impl Into<BigInt>) -> Self {
        Self {
            numerator: n.into(),
            denominator: BigInt::from(1),
        }
    }

    pub fn zero() -> Self {
        Self::from_integer(0)
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    /// Cross-multiplication equality; does not require reduced form.
    pub fn equals(&self, other: &BigRational) -> bool {
        &self.numerator * &other.denominator == &other.numerator * &self.denominator
    }

    /// Total order via cross-multiplication, accounting for denominator sign.
    pub fn compare_cross_mul(&self, other: &BigRational) -> Ordering {
        let lhs = &self.numerator * &other.denominator;
        let rhs = &other.numerator * &self.denominator;
        let sign = self.denominator.sign() as i8 * other.denominator.sign() as i8;
        let ord = lhs.cmp(&rhs);
        if sign < 0 {
            ord.reverse()
        } else {
            ord
        }
    }

    pub fn negate(&self) -> Self {
        Self {
            numerator: -&self.numerator,
            denominator: self.denominator.clone(),
        }
    }

    pub fn add(&self, other: &BigRational) -> Self {
        Self {
            numerator: &self.numerator * &other.denominator + &other.numerator * &self.denominator,
            denominator: &self.denominator * &other.denominator,
        }
    }

    pub fn sub(&self, other: &BigRational) -> Self {
        self.add(&other.negate())
    }

    pub fn mul(&self, other: &BigRational) -> Self {
        Self {
            numerator: &self.numerator * &other.numerator,
            denominator: &self.denominator * &other.denominator,
        }
    }

    /// Division is fatal on a zero divisor — a programming error, never
    /// produced by the arrangement routines (see `new`).
    pub fn div(&self, other: &BigRational) -> Self {
        assert!(!other.numerator.is_zero(), "BigRational::div by zero rational");
        Self {
            numerator: &self.numerator * &other.denominator,
            denominator: &self.denominator * &other.numerator,
        }
    }

    /// Reduce to lowest terms with a positive denominator. Not required for
    /// correctness elsewhere; cheap enough to call before long-lived storage.
    pub fn reduce(&self) -> Self {
        if self.numerator.is_zero() {
            return Self::zero();
        }
        let g = self.numerator.gcd(&self.denominator);
        let mut n = &self.numerator / &g;
        let mut d = &self.denominator / &g;
        if d.is_negative() {
            n = -n;
            d = -d;
        }
        Self {
            numerator: n,
            denominator: d,
        }
    }

    pub fn to_f64(&self) -> f64 {
        // BigInt has no direct f64 conversion that preserves magnitude beyond
        // machine precision; for the grid-snap domain (values bounded by
        // roughly 2^41 after doubled precision, see §4.A) this round-trips
        // through f64 division without overflow.
        ratio_to_f64(&self.numerator, &self.denominator)
    }

    pub fn to_f32(&self) -> f32 {
        self.to_f64() as f32
    }
}

fn ratio_to_f64(n: &BigInt, d: &BigInt) -> f64 {
    let (n_f, n_scale) = bigint_to_f64_scaled(n);
    let (d_f, d_scale) = bigint_to_f64_scaled(d);
    (n_f / d_f) * 2f64.powi(n_scale - d_scale)
}

/// Decompose a `BigInt` into `(mantissa_as_f64, exponent)` such that
/// `value == mantissa_as_f64 * 2^exponent`, with `mantissa_as_f64` safely
/// within f64's exact integer range.
fn bigint_to_f64_scaled(n: &BigInt) -> (f64, i32) {
    if n.is_zero() {
        return (0.0, 0);
    }
    let bits = n.bits() as i32;
    let shift = (bits - 53).max(0);
    let shifted = if shift > 0 { n >> shift } else { n.clone() };
    let mantissa: f64 = shifted.to_string().parse().unwrap_or_else(|_| {
        // Fallback for pathological string conversion failure; shifted is
        // guaranteed to fit in ~53 bits so this path is unreachable in
        // practice.
        0.0
    });
    (mantissa, shift)
}

impl PartialEq for BigRational {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}
impl Eq for BigRational {}
impl PartialOrd for BigRational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare_cross_mul(other))
    }
}
impl Ord for BigRational {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_cross_mul(other)
    }
}

impl Add for BigRational {
    type Output = BigRational;
    fn add(self, rhs: Self) -> Self::Output {
        BigRational::add(&self, &rhs)
    }
}
impl Sub for BigRational {
    type Output = BigRational;
    fn sub(self, rhs: Self) -> Self::Output {
        BigRational::sub(&self, &rhs)
    }
}
impl Mul for BigRational {
    type Output = BigRational;
    fn mul(self, rhs: Self) -> Self::Output {
        BigRational::mul(&self, &rhs)
    }
}
impl Div for BigRational {
    type Output = BigRational;
    fn div(self, rhs: Self) -> Self::Output {
        BigRational::div(&self, &rhs)
    }
}
impl Neg for BigRational {
    type Output = BigRational;
    fn neg(self) -> Self::Output {
        BigRational::negate(&self)
    }
}

/// Ordered pair of `BigRational`s.
#[derive(Clone, Debug)]
pub struct BigRationalVector2 {
    pub x: BigRational,
    pub y: BigRational,
}

impl BigRationalVector2 {
    pub fn new(x: BigRational, y: BigRational) -> Self {
        Self { x, y }
    }

    pub fn to_f32(&self) -> (f32, f32) {
        (self.x.to_f32(), self.y.to_f32())
    }

    pub fn to_f64(&self) -> (f64, f64) {
        (self.x.to_f64(), self.y.to_f64())
    }

    pub fn equals(&self, other: &BigRationalVector2) -> bool {
        self.x.equals(&other.x) && self.y.equals(&other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64, d: i64) -> BigRational {
        BigRational::new(n, d)
    }

    #[test]
    fn equals_ignores_representation() {
        assert!(r(1, 2).equals(&r(2, 4)));
        assert!(!r(1, 2).equals(&r(1, 3)));
    }

    #[test]
    fn compare_cross_mul_orders_without_reduction() {
        assert_eq!(r(1, 2).compare_cross_mul(&r(2, 3)), Ordering::Less);
        assert_eq!(r(3, 2).compare_cross_mul(&r(2, 2)), Ordering::Greater);
        assert_eq!(r(2, 4).compare_cross_mul(&r(1, 2)), Ordering::Equal);
    }

    #[test]
    fn compare_respects_negative_denominator() {
        // 1 / -2 == -1/2 < 0
        assert_eq!(r(1, -2).compare_cross_mul(&r(0, 1)), Ordering::Less);
    }

    #[test]
    fn arithmetic_matches_float_reference() {
        let a = r(1, 3);
        let b = r(1, 6);
        let sum = a.clone().add(&b);
        assert!((sum.to_f64() - 0.5).abs() < 1e-12);
        let prod = a.clone().mul(&b);
        assert!((prod.to_f64() - (1.0 / 18.0)).abs() < 1e-12);
        let quot = a.div(&b);
        assert!((quot.to_f64() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn reduce_normalizes_sign_and_gcd() {
        let x = r(-4, -8).reduce();
        assert_eq!(x.numerator, BigInt::from(1));
        assert_eq!(x.denominator, BigInt::from(2));
    }

    #[test]
    #[should_panic]
    fn zero_denominator_is_fatal() {
        let _ = BigRational::new(1, 0);
    }

    #[test]
    fn to_f64_handles_large_products_of_22_bit_grid_coordinates() {
        // Grid coordinates are bounded by 2^20 per §4.B; products arising in
        // intersection arithmetic roughly double that to ~2^41. Exercise a
        // denominator near that scale to make sure the f64 projection used
        // for cached f32 projections and area comparisons stays sane.
        let big = BigInt::from(1i64 << 40) + BigInt::from(12345);
        let x = BigRational::new(big.clone(), BigInt::from(1i64 << 20));
        let expected = (1u64 << 40) as f64 / (1u64 << 20) as f64;
        assert!((x.to_f64() - expected).abs() / expected < 1e-9);
    }
}
