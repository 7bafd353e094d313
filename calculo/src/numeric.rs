//! Exact real numbers
//!
//! Every number the engine handles is rational, a quadratic surd
//! `p + q·√d` with rational `p`, `q` and a squarefree integer `d > 1`, or a
//! real algebraic number held as a root of an integer polynomial together
//! with an isolating interval. Sign decisions are always exact; floating
//! point is only used for display hints.

use crate::algebra::algebraic::{AlgebraicNumber, Located};
use crate::algebra::roots::quadratic_roots;
use crate::algebra::univariate::UniPoly;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;

/// Largest prime tried when splitting a radicand into square and squarefree parts
const TRIAL_DIVISION_LIMIT: u64 = 100_000;

/// Precision (in bits) at which enclosure refinement gives up and falls back to `f64`
const MAX_ENCLOSURE_BITS: usize = 1 << 14;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumericError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("an algebraic number of degree {0} exceeds the supported maximum")]
    DegreeTooLarge(usize),

    #[error("could not isolate an algebraic number")]
    Unresolved,
}

/// An exact real number.
///
/// The representation is normalised: rationals and quadratic irrationals are
/// always surds, with radicand one when the coefficient is zero and a
/// squarefree radicand greater than one otherwise. Only numbers of degree
/// three or more are held as polynomial roots.
#[derive(Debug, Clone)]
pub struct RealNumber {
    form: Form,
}

#[derive(Debug, Clone)]
enum Form {
    /// `rational + coefficient·√radicand`
    Surd {
        rational: BigRational,
        coefficient: BigRational,
        radicand: BigInt,
    },
    Root(AlgebraicNumber),
}

impl RealNumber {
    pub fn zero() -> Self {
        Self::from_rational(BigRational::zero())
    }

    pub fn one() -> Self {
        Self::from_rational(BigRational::one())
    }

    pub fn integer(value: i64) -> Self {
        Self::from_rational(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn from_rational(value: BigRational) -> Self {
        Self {
            form: Form::Surd {
                rational: value,
                coefficient: BigRational::zero(),
                radicand: BigInt::one(),
            },
        }
    }

    /// Build `rational + coefficient·√radicand`, pulling square factors out of the radicand.
    pub fn surd(rational: BigRational, coefficient: BigRational, radicand: BigInt) -> Self {
        if coefficient.is_zero() || radicand.is_zero() {
            return Self::from_rational(rational);
        }
        debug_assert!(radicand.is_positive(), "radicand must be positive");

        let (square_root, squarefree) = split_power(&radicand, 2);
        let coefficient = coefficient * BigRational::from_integer(square_root);
        if squarefree.is_one() {
            return Self::from_rational(rational + coefficient);
        }
        Self {
            form: Form::Surd {
                rational,
                coefficient,
                radicand: squarefree,
            },
        }
    }

    /// Exact square root of a non-negative rational
    pub fn sqrt(value: &BigRational) -> Option<Self> {
        if value.is_negative() {
            return None;
        }
        // √(n/m) = √(n·m) / m
        let product = value.numer() * value.denom();
        let coefficient = BigRational::new(BigInt::one(), value.denom().clone());
        Some(Self::surd(BigRational::zero(), coefficient, product))
    }

    /// The number an isolating interval describes, in its simplest form
    pub fn algebraic(number: AlgebraicNumber) -> Self {
        let polynomial = number.polynomial();
        match polynomial.degree() {
            Some(1) => {
                Self::from_rational(-polynomial.coefficient(0) / polynomial.coefficient(1))
            }
            Some(2) => {
                let roots = quadratic_roots(
                    &polynomial.coefficient(2),
                    &polynomial.coefficient(1),
                    &polynomial.coefficient(0),
                );
                match roots.into_iter().nth(number.index()) {
                    Some(root) => root,
                    None => Self { form: Form::Root(number) },
                }
            }
            _ => match number.as_rational() {
                Some(value) => Self::from_rational(value),
                None => Self { form: Form::Root(number) },
            },
        }
    }

    fn from_located(located: Located) -> Self {
        match located {
            Located::Rational(value) => Self::from_rational(value),
            Located::Root(number) => Self::algebraic(number),
        }
    }

    /// `(rational, coefficient, radicand)` unless the number is a polynomial root
    fn surd_parts(&self) -> Option<(&BigRational, &BigRational, &BigInt)> {
        match &self.form {
            Form::Surd {
                rational,
                coefficient,
                radicand,
            } => Some((rational, coefficient, radicand)),
            Form::Root(_) => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_rational().is_some_and(|r| r.is_zero())
    }

    pub fn is_rational(&self) -> bool {
        self.as_rational().is_some()
    }

    pub fn as_rational(&self) -> Option<&BigRational> {
        match self.surd_parts() {
            Some((rational, coefficient, _)) if coefficient.is_zero() => Some(rational),
            _ => None,
        }
    }

    /// Exact sign: -1, 0 or 1
    pub fn signum(&self) -> i8 {
        let (rational, coefficient, radicand) = match &self.form {
            Form::Root(number) => return number.signum(),
            Form::Surd {
                rational,
                coefficient,
                radicand,
            } => (rational, coefficient, radicand),
        };
        let a = rational_sign(rational);
        let b = rational_sign(coefficient);
        if b == 0 {
            return a;
        }
        if a == 0 || a == b {
            return b;
        }
        // Opposite signs: the larger magnitude wins, p² and q²·d are never equal.
        let rational_square = rational * rational;
        let surd_square = coefficient * coefficient * BigRational::from_integer(radicand.clone());
        if rational_square > surd_square {
            a
        } else {
            b
        }
    }

    /// The common radicand when both numbers are surds that combine in one field
    fn shared_radicand(&self, other: &Self) -> Option<BigInt> {
        let (_, a, d) = self.surd_parts()?;
        let (_, b, e) = other.surd_parts()?;
        if a.is_zero() {
            Some(e.clone())
        } else if b.is_zero() || d == e {
            Some(d.clone())
        } else {
            None
        }
    }

    /// The number as an isolated root of its defining polynomial
    fn to_algebraic(&self) -> AlgebraicNumber {
        let (rational, coefficient, radicand) = match &self.form {
            Form::Root(number) => return number.clone(),
            Form::Surd {
                rational,
                coefficient,
                radicand,
            } => (rational, coefficient, radicand),
        };
        if coefficient.is_zero() {
            return AlgebraicNumber::from_rational(rational);
        }
        // (x - p)² - q²·d
        let two = BigRational::from_integer(BigInt::from(2));
        let polynomial = UniPoly::new(vec![
            rational * rational
                - coefficient * coefficient * BigRational::from_integer(radicand.clone()),
            -(two * rational),
            BigRational::one(),
        ]);
        // The conjugates differ, so a fine enough enclosure holds only one of them
        let mut bits = 8;
        loop {
            let (low, high) = self.enclosure(bits);
            if polynomial.count_roots_between(&low, &high) == 1 {
                return AlgebraicNumber::new(&polynomial, low, high);
            }
            bits *= 2;
        }
    }

    pub fn checked_add(&self, other: &Self) -> Result<Self, NumericError> {
        if let (Some(radicand), Some((p, q, _)), Some((r, s, _))) = (
            self.shared_radicand(other),
            self.surd_parts(),
            other.surd_parts(),
        ) {
            return Ok(Self::surd(p + r, q + s, radicand));
        }
        let sum = self.to_algebraic().add(&other.to_algebraic())?;
        Ok(Self::from_located(sum))
    }

    pub fn checked_sub(&self, other: &Self) -> Result<Self, NumericError> {
        self.checked_add(&other.neg())
    }

    pub fn checked_mul(&self, other: &Self) -> Result<Self, NumericError> {
        if let (Some(radicand), Some((p, q, _)), Some((r, s, _))) = (
            self.shared_radicand(other),
            self.surd_parts(),
            other.surd_parts(),
        ) {
            let d = BigRational::from_integer(radicand.clone());
            let rational = p * r + q * s * d;
            let coefficient = p * s + q * r;
            return Ok(Self::surd(rational, coefficient, radicand));
        }
        if self.is_zero() || other.is_zero() {
            return Ok(Self::zero());
        }
        let product = self.to_algebraic().mul(&other.to_algebraic())?;
        Ok(Self::from_located(product))
    }

    pub fn checked_div(&self, other: &Self) -> Result<Self, NumericError> {
        if other.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        if let Some(divisor) = other.as_rational() {
            if let Some((p, q, d)) = self.surd_parts() {
                return Ok(Self::surd(p / divisor, q / divisor, d.clone()));
            }
        }
        if let (Some(_), Some((p, q, d))) = (self.shared_radicand(other), other.surd_parts()) {
            // Multiply by the conjugate: (p - q√d) / (p² - q²d)
            let conjugate = Self::surd(p.clone(), -q.clone(), d.clone());
            let norm = p * p - q * q * BigRational::from_integer(d.clone());
            let numerator = self.checked_mul(&conjugate)?;
            return numerator.checked_div(&Self::from_rational(norm));
        }
        let inverse = Self::from_located(other.to_algebraic().recip()?);
        self.checked_mul(&inverse)
    }

    pub fn neg(&self) -> Self {
        match &self.form {
            Form::Surd {
                rational,
                coefficient,
                radicand,
            } => Self {
                form: Form::Surd {
                    rational: -rational.clone(),
                    coefficient: -coefficient.clone(),
                    radicand: radicand.clone(),
                },
            },
            Form::Root(number) => Self {
                form: Form::Root(number.neg()),
            },
        }
    }

    pub fn abs(&self) -> Self {
        if self.signum() < 0 {
            self.neg()
        } else {
            self.clone()
        }
    }

    pub fn powi(&self, exponent: i64) -> Result<Self, NumericError> {
        if exponent < 0 {
            let positive = self.powi(-exponent)?;
            return Self::one().checked_div(&positive);
        }
        if exponent == 0 {
            return Ok(Self::one());
        }
        if let Form::Root(number) = &self.form {
            let mut coefficients = vec![BigRational::zero(); exponent as usize + 1];
            coefficients[exponent as usize] = BigRational::one();
            let power = UniPoly::new(coefficients);
            return match number.evaluate_ratio(&power, &UniPoly::constant(BigRational::one()))? {
                Some(located) => Ok(Self::from_located(located)),
                None => Err(NumericError::DivisionByZero),
            };
        }
        let mut result = Self::one();
        let mut base = self.clone();
        let mut remaining = exponent as u64;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.checked_mul(&base)?;
            }
            remaining >>= 1;
            if remaining > 0 {
                base = base.checked_mul(&base)?;
            }
        }
        Ok(result)
    }

    /// Principal real `k`-th root; `None` for an even root of a negative number
    pub fn root(&self, k: u32) -> Result<Option<Self>, NumericError> {
        match (k, self.signum()) {
            (0, _) => Ok(None),
            (1, _) | (_, 0) => Ok(Some(self.clone())),
            (_, -1) if k % 2 == 0 => Ok(None),
            (_, -1) => Ok(self.neg().root(k)?.map(|root| root.neg())),
            _ => {
                if let (2, Some(value)) = (k, self.as_rational()) {
                    return Ok(Self::sqrt(value));
                }
                let root = self.to_algebraic().root(k)?;
                Ok(Some(Self::from_located(root)))
            }
        }
    }

    /// `numerator(self) / denominator(self)`, `None` when the denominator vanishes
    pub fn evaluate_ratio(
        &self,
        numerator: &UniPoly,
        denominator: &UniPoly,
    ) -> Result<Option<Self>, NumericError> {
        if let Form::Root(number) = &self.form {
            return Ok(number
                .evaluate_ratio(numerator, denominator)?
                .map(Self::from_located));
        }
        let bottom = denominator.evaluate(self)?;
        if bottom.is_zero() {
            return Ok(None);
        }
        Ok(Some(numerator.evaluate(self)?.checked_div(&bottom)?))
    }

    /// Exact sign of `p(self)`
    pub fn polynomial_sign(&self, p: &UniPoly) -> Result<i8, NumericError> {
        match &self.form {
            Form::Root(number) => Ok(number.polynomial_sign(p)),
            Form::Surd { .. } => Ok(p.evaluate(self)?.signum()),
        }
    }

    /// Rational bounds `lo <= self <= hi` that shrink as `bits` grows.
    fn enclosure(&self, bits: usize) -> (BigRational, BigRational) {
        let (rational, coefficient, radicand) = match &self.form {
            Form::Root(number) => return number.bounds_bits(bits),
            Form::Surd {
                rational,
                coefficient,
                radicand,
            } => (rational, coefficient, radicand),
        };
        if coefficient.is_zero() {
            return (rational.clone(), rational.clone());
        }
        let scale = BigInt::one() << bits;
        let floor_root = (radicand * &scale * &scale).sqrt();
        let low = BigRational::new(floor_root.clone(), scale.clone());
        let high = BigRational::new(floor_root + BigInt::one(), scale);
        let a = rational + coefficient * low;
        let b = rational + coefficient * high;
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// A rational strictly between `lower` and `upper`; requires `lower < upper`.
    pub fn rational_between(lower: &Self, upper: &Self) -> BigRational {
        if let (Some(a), Some(b)) = (lower.as_rational(), upper.as_rational()) {
            return (a + b) / BigRational::from_integer(BigInt::from(2));
        }
        let mut bits = 32;
        while bits <= MAX_ENCLOSURE_BITS {
            let (_, high) = lower.enclosure(bits);
            let (low, _) = upper.enclosure(bits);
            if high < low {
                return (high + low) / BigRational::from_integer(BigInt::from(2));
            }
            bits *= 2;
        }
        BigRational::from_float((lower.to_f64() + upper.to_f64()) / 2.0)
            .unwrap_or_else(|| lower.enclosure(bits).1)
    }

    /// An integer strictly below `self`
    pub fn rational_below(&self) -> BigRational {
        let (low, _) = self.enclosure(32);
        BigRational::from_integer(low.floor().to_integer() - BigInt::one())
    }

    /// An integer strictly above `self`
    pub fn rational_above(&self) -> BigRational {
        let (_, high) = self.enclosure(32);
        BigRational::from_integer(high.ceil().to_integer() + BigInt::one())
    }

    pub fn to_f64(&self) -> f64 {
        let (rational, coefficient, radicand) = match &self.form {
            Form::Root(number) => return number.to_f64(),
            Form::Surd {
                rational,
                coefficient,
                radicand,
            } => (rational, coefficient, radicand),
        };
        let rational_value = rational.to_f64().unwrap_or(f64::NAN);
        if coefficient.is_zero() {
            return rational_value;
        }
        let coefficient = coefficient.to_f64().unwrap_or(f64::NAN);
        let radicand = radicand.to_f64().unwrap_or(f64::NAN);
        rational_value + coefficient * radicand.sqrt()
    }
}

impl Ord for RealNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.form, &other.form) {
            (Form::Root(a), Form::Root(b)) => a.cmp_algebraic(b),
            (Form::Root(a), _) => match other.as_rational() {
                Some(value) => a.cmp_rational(value),
                None => a.cmp_algebraic(&other.to_algebraic()),
            },
            (_, Form::Root(_)) => other.cmp(self).reverse(),
            _ => {
                if self.shared_radicand(other).is_some() {
                    if let Ok(difference) = self.checked_sub(other) {
                        return difference.signum().cmp(&0);
                    }
                }
                // Different radicands: 1, √d₁ and √d₂ are linearly independent over ℚ
                self.to_algebraic().cmp_algebraic(&other.to_algebraic())
            }
        }
    }
}

impl PartialOrd for RealNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RealNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RealNumber {}

impl From<BigRational> for RealNumber {
    fn from(value: BigRational) -> Self {
        Self::from_rational(value)
    }
}

impl From<i64> for RealNumber {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}

impl fmt::Display for RealNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rational, coefficient, radicand) = match &self.form {
            Form::Root(number) => return write!(f, "{}", number),
            Form::Surd {
                rational,
                coefficient,
                radicand,
            } => (rational, coefficient, radicand),
        };
        if coefficient.is_zero() {
            return write!(f, "{}", format_rational(rational));
        }
        let magnitude = coefficient.abs();
        let mut term = String::new();
        if !magnitude.numer().is_one() {
            term.push_str(&format!("{}*", magnitude.numer()));
        }
        term.push_str(&format!("sqrt({})", radicand));
        if !magnitude.denom().is_one() {
            term.push_str(&format!("/{}", magnitude.denom()));
        }

        let negative = coefficient.is_negative();
        if rational.is_zero() {
            if negative {
                write!(f, "-")?;
            }
            write!(f, "{}", term)
        } else {
            let sign = if negative { '-' } else { '+' };
            write!(f, "{} {} {}", format_rational(rational), sign, term)
        }
    }
}

impl serde::Serialize for RealNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Render a rational the way the calculator prints numbers: `3`, `-1/2`
pub fn format_rational(value: &BigRational) -> String {
    if value.is_integer() {
        value.numer().to_string()
    } else {
        format!("{}/{}", value.numer(), value.denom())
    }
}

/// Exact rational value of a decimal literal
pub fn rational_from_decimal(value: &Decimal) -> BigRational {
    let mantissa = BigInt::from(value.mantissa());
    let denominator = BigInt::from(10u32).pow(value.scale());
    BigRational::new(mantissa, denominator)
}

pub fn rational_sign(value: &BigRational) -> i8 {
    if value.is_positive() {
        1
    } else if value.is_negative() {
        -1
    } else {
        0
    }
}

/// Split `n > 0` into `(s, r)` with `n = sᵏ·r` and `r` free of `k`-th powers.
pub fn split_power(n: &BigInt, k: u32) -> (BigInt, BigInt) {
    let mut outside = BigInt::one();
    let mut inside = BigInt::one();
    let mut rest = n.clone();

    let mut p: u64 = 2;
    while p <= TRIAL_DIVISION_LIMIT && BigInt::from(p * p) <= rest {
        let prime = BigInt::from(p);
        let mut count = 0u32;
        while rest.is_multiple_of(&prime) {
            rest /= &prime;
            count += 1;
        }
        outside *= prime.pow(count / k);
        inside *= prime.pow(count % k);
        p += if p == 2 { 1 } else { 2 };
    }

    let root = rest.nth_root(k);
    if root.pow(k) == rest {
        outside *= root;
    } else {
        inside *= rest;
    }
    (outside, inside)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn sqrt_of_perfect_square_is_rational() {
        let root = RealNumber::sqrt(&q(9, 4)).unwrap();
        assert_eq!(root, RealNumber::from_rational(q(3, 2)));
    }

    #[test]
    fn sqrt_pulls_out_square_factors() {
        let root = RealNumber::sqrt(&q(8, 1)).unwrap();
        assert_eq!(root.to_string(), "2*sqrt(2)");
        let half = RealNumber::sqrt(&q(1, 2)).unwrap();
        assert_eq!(half.to_string(), "sqrt(2)/2");
    }

    #[test]
    fn surd_sign_is_exact() {
        // 1 - sqrt(2) < 0, 2 - sqrt(3) > 0
        let a = RealNumber::surd(q(1, 1), q(-1, 1), BigInt::from(2));
        let b = RealNumber::surd(q(2, 1), q(-1, 1), BigInt::from(3));
        assert_eq!(a.signum(), -1);
        assert_eq!(b.signum(), 1);
    }

    #[test]
    fn conjugate_division_stays_exact() {
        let a = RealNumber::surd(q(1, 1), q(1, 1), BigInt::from(2));
        let b = RealNumber::surd(q(1, 1), q(-1, 1), BigInt::from(2));
        // (1 + √2)(1 - √2) = -1
        assert_eq!(a.checked_mul(&b).unwrap(), RealNumber::integer(-1));
        // (1 + √2) / (1 + √2) = 1
        assert_eq!(a.checked_div(&a).unwrap(), RealNumber::one());
    }

    #[test]
    fn mixed_radicands_combine_exactly() {
        let a = RealNumber::sqrt(&q(2, 1)).unwrap();
        let b = RealNumber::sqrt(&q(3, 1)).unwrap();
        assert_eq!(a.checked_mul(&b).unwrap().to_string(), "sqrt(6)");
        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.to_string(), "CRootOf(x**4 - 10*x**2 + 1, 3)");
        assert_eq!(sum.checked_sub(&b).unwrap(), a);
    }

    #[test]
    fn ordering_across_radicands() {
        let mut values = vec![
            RealNumber::sqrt(&q(3, 1)).unwrap(),
            RealNumber::integer(1),
            RealNumber::sqrt(&q(2, 1)).unwrap(),
            RealNumber::sqrt(&q(2, 1)).unwrap().neg(),
        ];
        values.sort();
        let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        assert_eq!(rendered, vec!["-sqrt(2)", "1", "sqrt(2)", "sqrt(3)"]);
    }

    #[test]
    fn rational_between_surds() {
        let lower = RealNumber::sqrt(&q(2, 1)).unwrap();
        let upper = RealNumber::sqrt(&q(3, 1)).unwrap();
        let middle = RealNumber::from_rational(RealNumber::rational_between(&lower, &upper));
        assert!(lower < middle && middle < upper);
    }

    #[test]
    fn decimal_literals_convert_exactly() {
        let value: Decimal = "2.5".parse().unwrap();
        assert_eq!(rational_from_decimal(&value), q(5, 2));
    }

    #[test]
    fn negative_powers_invert() {
        let two = RealNumber::integer(2);
        assert_eq!(two.powi(-2).unwrap(), RealNumber::from_rational(q(1, 4)));
        assert_eq!(
            RealNumber::zero().powi(-1),
            Err(NumericError::DivisionByZero)
        );
    }
}
