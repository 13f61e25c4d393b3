//! q128: 128-bit packed rational (64-bit signed numerator + 64-bit unsigned
//! denominator), the fixed-width GPU-targeted counterpart of `BigRational`.
//!
//! This is the wire format named in §6.3/§6.4's "GLOSSARY: q128" — exactly
//! two u32 pairs per rational when staged into a packed buffer. The checked
//! arithmetic here bounds what the arrangement's grid-snap budget (2^20,
//! §4.B) can produce without overflowing i64/u64; callers outside that
//! budget should stay on `BigRational`.

use bytemuck::{Pod, Zeroable};

/// `numerator / denominator` with `denominator > 0` as an invariant.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Q128 {
    pub numerator: i64,
    pub denominator: u64,
}

// SAFETY: two plain integer fields, no padding, no invalid bit patterns.
unsafe impl Pod for Q128 {}
unsafe impl Zeroable for Q128 {}

impl Q128 {
    #[inline]
    pub fn new(numerator: i64, denominator: u64) -> Self {
        assert!(denominator != 0, "Q128: zero denominator is a programming error");
        Self {
            numerator,
            denominator,
        }
    }

    #[inline]
    pub fn from_integer(n: i64) -> Self {
        Self {
            numerator: n,
            denominator: 1,
        }
    }

    pub fn add(self, other: Q128) -> Option<Q128> {
        let n = self
            .numerator
            .checked_mul(other.denominator as i64)?
            .checked_add(other.numerator.checked_mul(self.denominator as i64)?)?;
        let d = (self.denominator).checked_mul(other.denominator)?;
        Some(Q128::new(n, d))
    }

    pub fn sub(self, other: Q128) -> Option<Q128> {
        self.add(other.negate()?)
    }

    pub fn negate(self) -> Option<Q128> {
        Some(Q128::new(self.numerator.checked_neg()?, self.denominator))
    }

    pub fn mul(self, other: Q128) -> Option<Q128> {
        let n = self.numerator.checked_mul(other.numerator)?;
        let d = self.denominator.checked_mul(other.denominator)?;
        Some(Q128::new(n, d))
    }

    pub fn div(self, other: Q128) -> Option<Q128> {
        if other.numerator == 0 {
            return None;
        }
        // Keep denominator positive: pull the sign of other.numerator into self.numerator.
        let (n_sign, other_num_abs) = if other.numerator < 0 {
            (-1i64, other.numerator.checked_neg()?)
        } else {
            (1i64, other.numerator)
        };
        let n = self.numerator.checked_mul(n_sign)?.checked_mul(other.denominator as i64)?;
        let d = self.denominator.checked_mul(other_num_abs as u64)?;
        Some(Q128::new(n, d))
    }

    pub fn gcd(&self) -> u64 {
        gcd_u64(self.numerator.unsigned_abs(), self.denominator)
    }

    /// Reduce to lowest terms; `denominator` stays positive by invariant.
    pub fn reduce(self) -> Q128 {
        if self.numerator == 0 {
            return Q128::new(0, 1);
        }
        let g = self.gcd();
        if g <= 1 {
            return self;
        }
        Q128::new(self.numerator / g as i64, self.denominator / g)
    }

    pub fn to_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    pub fn equals(self, other: Q128) -> bool {
        // Cross-multiply in i128 to avoid overflow at the 64-bit domain edges.
        (self.numerator as i128) * (other.denominator as i128)
            == (other.numerator as i128) * (self.denominator as i128)
    }

    pub fn compare(self, other: Q128) -> std::cmp::Ordering {
        let lhs = (self.numerator as i128) * (other.denominator as i128);
        let rhs = (other.numerator as i128) * (self.denominator as i128);
        lhs.cmp(&rhs)
    }
}

fn gcd_u64(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pod_roundtrip_is_two_u32_pairs() {
        assert_eq!(std::mem::size_of::<Q128>(), 16);
        let q = Q128::new(-7, 3);
        let bytes = bytemuck::bytes_of(&q);
        let back: Q128 = bytemuck::pod_read_unaligned(bytes);
        assert_eq!(q, back);
    }

    #[test]
    fn arithmetic_matches_reference() {
        let a = Q128::new(1, 3);
        let b = Q128::new(1, 6);
        assert!((a.add(b).unwrap().to_f64() - 0.5).abs() < 1e-12);
        assert!((a.mul(b).unwrap().to_f64() - 1.0 / 18.0).abs() < 1e-12);
        assert!((a.div(b).unwrap().to_f64() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn reduce_divides_by_gcd() {
        let q = Q128::new(-8, 12).reduce();
        assert_eq!(q.numerator, -2);
        assert_eq!(q.denominator, 3);
    }

    #[test]
    fn div_keeps_denominator_positive() {
        let q = Q128::new(1, 2).div(Q128::new(-1, 3)).unwrap();
        assert!(q.numerator < 0);
        assert_eq!(q.denominator, 2);
    }

    #[test]
    fn overflow_returns_none() {
        let huge = Q128::new(i64::MAX, 1);
        assert!(huge.add(huge).is_none());
    }
}
