//! Real algebraic numbers
//!
//! A real algebraic number is held as a squarefree integer polynomial and an
//! open rational interval that contains exactly one of its roots. Signs and
//! comparisons bisect the interval until it decides the question; sums,
//! products and roots get a defining polynomial from resultants and are then
//! located by interval arithmetic.

use super::polynomial::Polynomial;
use super::resultant::{constant_coefficients, resultant, scaled, shifted, value_relation};
use super::univariate::UniPoly;
use crate::numeric::NumericError;
use crate::semantic::Variable;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::fmt;

/// Largest degree of a defining polynomial built by arithmetic
pub const MAX_ALGEBRAIC_DEGREE: usize = 64;

/// Finest enclosure, in bits, tried while locating a root
const MAX_LOCATE_BITS: usize = 1 << 12;

/// The root of `polynomial` strictly between `lower` and `upper`
///
/// The polynomial is squarefree with integer coefficients and a positive
/// leading coefficient; it does not vanish at either end of the interval.
#[derive(Debug, Clone)]
pub struct AlgebraicNumber {
    polynomial: UniPoly,
    lower: BigRational,
    upper: BigRational,
}

/// Result of locating a value among the roots of a polynomial
#[derive(Debug, Clone)]
pub enum Located {
    Rational(BigRational),
    Root(AlgebraicNumber),
}

impl AlgebraicNumber {
    /// `polynomial` must be squarefree with exactly one root in `(lower, upper)`
    /// and none at the ends
    pub fn new(polynomial: &UniPoly, lower: BigRational, upper: BigRational) -> Self {
        Self {
            polynomial: polynomial.primitive(),
            lower,
            upper,
        }
    }

    /// A rational as the root of a linear polynomial
    pub fn from_rational(value: &BigRational) -> Self {
        Self {
            polynomial: UniPoly::linear_factor(value).primitive(),
            lower: value - BigRational::one(),
            upper: value + BigRational::one(),
        }
    }

    pub fn polynomial(&self) -> &UniPoly {
        &self.polynomial
    }

    pub fn degree(&self) -> usize {
        self.polynomial.degree().unwrap_or(0)
    }

    /// Halve the interval; returns the midpoint when it is the root itself
    fn bisect(&mut self) -> Option<BigRational> {
        let middle = (&self.lower + &self.upper) / BigRational::from_integer(BigInt::from(2));
        let sign = self.polynomial.sign_at(&middle);
        if sign == 0 {
            return Some(middle);
        }
        if sign == self.polynomial.sign_at(&self.lower) {
            self.lower = middle;
        } else {
            self.upper = middle;
        }
        None
    }

    /// Closed bounds at most `width` apart
    pub fn bounds(&self, width: &BigRational) -> (BigRational, BigRational) {
        let mut current = self.clone();
        while &current.upper - &current.lower > *width {
            if let Some(root) = current.bisect() {
                return (root.clone(), root);
            }
        }
        (current.lower, current.upper)
    }

    /// Closed bounds at most `2^-bits` apart
    pub fn bounds_bits(&self, bits: usize) -> (BigRational, BigRational) {
        self.bounds(&BigRational::new(BigInt::one(), BigInt::one() << bits))
    }

    /// Exact comparison with a rational
    pub fn cmp_rational(&self, value: &BigRational) -> Ordering {
        if *value <= self.lower {
            return Ordering::Greater;
        }
        if *value >= self.upper {
            return Ordering::Less;
        }
        match self.polynomial.sign_at(value) {
            0 => Ordering::Equal,
            // Same sign as at the lower end: the root lies above `value`
            s if s == self.polynomial.sign_at(&self.lower) => Ordering::Greater,
            _ => Ordering::Less,
        }
    }

    pub fn signum(&self) -> i8 {
        match self.cmp_rational(&BigRational::zero()) {
            Ordering::Greater => 1,
            Ordering::Less => -1,
            Ordering::Equal => 0,
        }
    }

    /// Exact comparison with another algebraic number
    pub fn cmp_algebraic(&self, other: &Self) -> Ordering {
        if self.upper <= other.lower {
            return Ordering::Less;
        }
        if other.upper <= self.lower {
            return Ordering::Greater;
        }
        // Overlapping intervals: equal exactly when a common root lies in both
        let common = self.polynomial.gcd(&other.polynomial);
        if common.degree().unwrap_or(0) > 0 {
            let low = (&self.lower).max(&other.lower);
            let high = (&self.upper).min(&other.upper);
            if common.count_roots_between(low, high) > 0 {
                return Ordering::Equal;
            }
        }

        let mut a = self.clone();
        let mut b = other.clone();
        loop {
            if a.upper <= b.lower {
                return Ordering::Less;
            }
            if b.upper <= a.lower {
                return Ordering::Greater;
            }
            if let Some(root) = a.bisect() {
                return b.cmp_rational(&root).reverse();
            }
            if let Some(root) = b.bisect() {
                return a.cmp_rational(&root);
            }
        }
    }

    /// The value when it is rational
    ///
    /// A rational root `u/v` of an integer polynomial has `v` dividing the
    /// leading coefficient, so once the interval is narrower than the spacing
    /// of those fractions at most one candidate is left.
    pub fn as_rational(&self) -> Option<BigRational> {
        let lead = self.polynomial.to_primitive_integers().last()?.abs();
        if lead.is_zero() {
            return None;
        }
        let scale = BigRational::from_integer(lead.clone());
        let width = BigRational::new(BigInt::one(), lead * BigInt::from(2));
        let (low, high) = self.bounds(&width);
        if low == high {
            return Some(low);
        }
        let candidate = (&low * &scale).ceil() / &scale;
        if candidate < high && self.polynomial.sign_at(&candidate) == 0 {
            Some(candidate)
        } else {
            None
        }
    }

    /// Exact sign of `q` at this number
    pub fn polynomial_sign(&self, q: &UniPoly) -> i8 {
        if q.is_zero() {
            return 0;
        }
        let common = self.polynomial.gcd(q);
        if common.degree().unwrap_or(0) > 0
            && common.count_roots_between(&self.lower, &self.upper) > 0
        {
            return 0;
        }
        let mut current = self.clone();
        loop {
            let (low, high) = interval_evaluate(q, &current.lower, &current.upper);
            if low.is_positive() {
                return 1;
            }
            if high.is_negative() {
                return -1;
            }
            if let Some(root) = current.bisect() {
                return q.sign_at(&root);
            }
        }
    }

    pub fn neg(&self) -> Self {
        Self {
            polynomial: self.polynomial.reflect().primitive(),
            lower: -self.upper.clone(),
            upper: -self.lower.clone(),
        }
    }

    pub fn add(&self, other: &Self) -> Result<Located, NumericError> {
        check_degree(self.degree() * other.degree())?;
        let polynomial = resultant(
            &shifted(&self.polynomial),
            &constant_coefficients(&other.polynomial),
        )?;
        locate(&polynomial, |bits| {
            let (a_low, a_high) = self.bounds_bits(bits + 1);
            let (b_low, b_high) = other.bounds_bits(bits + 1);
            Some((a_low + b_low, a_high + b_high))
        })
    }

    /// Product of two non-zero numbers
    pub fn mul(&self, other: &Self) -> Result<Located, NumericError> {
        check_degree(self.degree() * other.degree())?;
        let polynomial = resultant(
            &scaled(&self.polynomial),
            &constant_coefficients(&other.polynomial),
        )?;
        locate(&polynomial, |bits| {
            let a = self.bounds_bits(bits);
            let b = other.bounds_bits(bits);
            Some(interval_mul(&a, &b))
        })
    }

    /// Reciprocal of a non-zero number
    pub fn recip(&self) -> Result<Located, NumericError> {
        locate(&self.polynomial.reversed(), |bits| {
            let (low, high) = self.bounds_bits(bits);
            if low.is_positive() || high.is_negative() {
                Some((high.recip(), low.recip()))
            } else {
                None
            }
        })
    }

    /// Principal `k`-th root of a positive number
    pub fn root(&self, k: u32) -> Result<Located, NumericError> {
        check_degree(self.degree() * k as usize)?;
        let polynomial = self.polynomial.compose_power(k as usize);
        locate(&polynomial, |bits| {
            let (low, high) = self.bounds_bits(bits.saturating_mul(k as usize));
            let low = if low.is_negative() {
                BigRational::zero()
            } else {
                low
            };
            Some((root_below(&low, k, bits), root_above(&high, k, bits)))
        })
    }

    /// `numerator(α)/denominator(α)`, `None` when the denominator vanishes at α
    pub fn evaluate_ratio(
        &self,
        numerator: &UniPoly,
        denominator: &UniPoly,
    ) -> Result<Option<Located>, NumericError> {
        if self.polynomial_sign(denominator) == 0 {
            return Ok(None);
        }
        // Keep only the factor of the defining polynomial where the denominator lives
        let common = self.polynomial.gcd(denominator);
        let reduced = match self.polynomial.div_rem(&common) {
            Ok((quotient, _)) if common.degree().unwrap_or(0) > 0 => quotient,
            _ => self.polynomial.clone(),
        };
        let (_, numerator_rest) = numerator.div_rem(&reduced)?;
        let (_, denominator_rest) = denominator.div_rem(&reduced)?;
        let polynomial = resultant(
            &constant_coefficients(&reduced),
            &value_relation(&numerator_rest, &denominator_rest),
        )?;
        let located = locate(&polynomial, |bits| {
            let (low, high) = self.bounds_bits(bits);
            let top = interval_evaluate(&numerator_rest, &low, &high);
            let bottom = interval_evaluate(&denominator_rest, &low, &high);
            interval_div(&top, &bottom)
        })?;
        Ok(Some(located))
    }

    pub fn to_f64(&self) -> f64 {
        let (low, high) = self.bounds_bits(64);
        let middle = (low + high) / BigRational::from_integer(BigInt::from(2));
        num_traits::ToPrimitive::to_f64(&middle).unwrap_or(f64::NAN)
    }

    /// Position among the real roots of the defining polynomial, from zero
    pub fn index(&self) -> usize {
        let below = -self.polynomial.root_bound();
        self.polynomial.count_roots_between(&below, &self.lower)
    }
}

/// The unique root of `polynomial` inside the enclosures `enclose(bits)`
/// produces as `bits` grows
///
/// `enclose` may return `None` while its enclosure is still too coarse.
pub fn locate(
    polynomial: &UniPoly,
    enclose: impl Fn(usize) -> Option<(BigRational, BigRational)>,
) -> Result<Located, NumericError> {
    let polynomial = polynomial.squarefree();
    let degree = polynomial.degree().unwrap_or(0);
    if degree == 0 {
        return Err(NumericError::Unresolved);
    }
    check_degree(degree)?;

    let mut bits = 8;
    while bits <= MAX_LOCATE_BITS {
        if let Some((low, high)) = enclose(bits) {
            if low == high {
                return Ok(Located::Rational(low));
            }
            let at_low = polynomial.sign_at(&low) == 0;
            let at_high = polynomial.sign_at(&high) == 0;
            let closed = polynomial.count_roots_between(&low, &high) + usize::from(at_low);
            if closed == 1 {
                if at_low {
                    return Ok(Located::Rational(low));
                }
                if at_high {
                    return Ok(Located::Rational(high));
                }
                let number = AlgebraicNumber::new(&polynomial, low, high);
                return Ok(match number.as_rational() {
                    Some(value) => Located::Rational(value),
                    None => Located::Root(number),
                });
            }
        }
        bits *= 2;
    }
    Err(NumericError::Unresolved)
}

fn check_degree(degree: usize) -> Result<(), NumericError> {
    if degree > MAX_ALGEBRAIC_DEGREE {
        return Err(NumericError::DegreeTooLarge(degree));
    }
    Ok(())
}

/// Range of `p` over `[low, high]` by Horner's scheme in interval arithmetic
pub fn interval_evaluate(
    p: &UniPoly,
    low: &BigRational,
    high: &BigRational,
) -> (BigRational, BigRational) {
    let point = (low.clone(), high.clone());
    let mut acc = (BigRational::zero(), BigRational::zero());
    for c in p.coefficients().iter().rev() {
        let (a, b) = interval_mul(&acc, &point);
        acc = (a + c, b + c);
    }
    acc
}

pub fn interval_mul(
    a: &(BigRational, BigRational),
    b: &(BigRational, BigRational),
) -> (BigRational, BigRational) {
    let products = [&a.0 * &b.0, &a.0 * &b.1, &a.1 * &b.0, &a.1 * &b.1];
    let low = products.iter().min().cloned().unwrap_or_else(BigRational::zero);
    let high = products.iter().max().cloned().unwrap_or_else(BigRational::zero);
    (low, high)
}

/// `None` while the divisor's range still contains zero
pub fn interval_div(
    a: &(BigRational, BigRational),
    b: &(BigRational, BigRational),
) -> Option<(BigRational, BigRational)> {
    if !(b.0.is_positive() || b.1.is_negative()) {
        return None;
    }
    Some(interval_mul(a, &(b.1.recip(), b.0.recip())))
}

/// A rational at most `value^(1/k)`, within `2^-bits`
pub fn root_below(value: &BigRational, k: u32, bits: usize) -> BigRational {
    let scale = BigInt::one() << bits;
    let scaled = (value * BigRational::from_integer(scale.pow(k))).floor().to_integer();
    BigRational::new(scaled.nth_root(k), scale)
}

/// A rational at least `value^(1/k)`, within `2^-bits`
pub fn root_above(value: &BigRational, k: u32, bits: usize) -> BigRational {
    let scale = BigInt::one() << bits;
    let scaled = (value * BigRational::from_integer(scale.pow(k))).ceil().to_integer();
    let mut root = scaled.nth_root(k);
    if root.pow(k) < scaled {
        root += BigInt::one();
    }
    BigRational::new(root, scale)
}

impl fmt::Display for AlgebraicNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let polynomial = Polynomial::from_univariate(&self.polynomial, &Variable::new("x"));
        write!(f, "CRootOf({}, {})", polynomial.to_expr(), self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(coefficients: &[i64]) -> UniPoly {
        UniPoly::new(
            coefficients
                .iter()
                .map(|c| BigRational::from_integer(BigInt::from(*c)))
                .collect(),
        )
    }

    fn q(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn cube_root_of_two() -> AlgebraicNumber {
        AlgebraicNumber::new(&poly(&[-2, 0, 0, 1]), q(1), q(2))
    }

    #[test]
    fn compares_with_rationals() {
        let root = cube_root_of_two();
        assert_eq!(root.cmp_rational(&BigRational::new(5.into(), 4.into())), Ordering::Greater);
        assert_eq!(root.cmp_rational(&BigRational::new(13.into(), 10.into())), Ordering::Less);
        assert_eq!(root.signum(), 1);
        assert_eq!(root.neg().signum(), -1);
    }

    #[test]
    fn display_names_the_root() {
        assert_eq!(cube_root_of_two().to_string(), "CRootOf(x**3 - 2, 0)");
        // x³ - 3x + 1 has roots near -1.88, 0.35 and 1.53
        let middle = AlgebraicNumber::new(&poly(&[1, -3, 0, 1]), q(0), q(1));
        assert_eq!(middle.to_string(), "CRootOf(x**3 - 3*x + 1, 1)");
    }

    #[test]
    fn cube_of_the_cube_root_is_rational() {
        let root = cube_root_of_two();
        let cube = root.evaluate_ratio(&poly(&[0, 0, 0, 1]), &poly(&[1])).unwrap();
        assert!(matches!(cube, Some(Located::Rational(value)) if value == q(2)));
    }

    #[test]
    fn equal_roots_of_different_polynomials() {
        // ∛2 is also a root of (x³ - 2)(x - 5)
        let a = cube_root_of_two();
        let b = AlgebraicNumber::new(&poly(&[10, 0, 0, -5, 1]), q(1), q(2));
        assert_eq!(a.cmp_algebraic(&b), Ordering::Equal);
        let c = AlgebraicNumber::new(&poly(&[-3, 0, 0, 1]), q(1), q(2));
        assert_eq!(a.cmp_algebraic(&c), Ordering::Less);
    }

    #[test]
    fn sum_and_product_are_located() {
        let root = cube_root_of_two();
        let Located::Root(sum) = root.add(&root).unwrap() else {
            panic!("2∛2 is irrational");
        };
        assert_eq!(sum.cmp_rational(&BigRational::new(252.into(), 100.into())), Ordering::Greater);
        assert_eq!(sum.cmp_rational(&BigRational::new(253.into(), 100.into())), Ordering::Less);

        let Located::Root(square) = root.mul(&root).unwrap() else {
            panic!("∛4 is irrational");
        };
        assert_eq!(square.to_string(), "CRootOf(x**3 - 4, 0)");
        let cube = square.mul(&root).unwrap();
        assert!(matches!(cube, Located::Rational(value) if value == q(2)));
    }

    #[test]
    fn rational_roots_are_recognised() {
        // 2x² - x - 1 = (2x + 1)(x - 1)
        let number = AlgebraicNumber::new(&poly(&[-1, -1, 2]), q(0), q(3));
        assert_eq!(number.as_rational(), Some(q(1)));
        assert_eq!(cube_root_of_two().as_rational(), None);
    }

    #[test]
    fn square_root_of_an_algebraic_number() {
        // √(∛2) = 2^(1/6) ≈ 1.1225
        let Located::Root(root) = cube_root_of_two().root(2).unwrap() else {
            panic!("2^(1/6) is irrational");
        };
        assert_eq!(root.cmp_rational(&BigRational::new(112.into(), 100.into())), Ordering::Greater);
        assert_eq!(root.cmp_rational(&BigRational::new(113.into(), 100.into())), Ordering::Less);
    }
}
