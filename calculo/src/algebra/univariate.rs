//! Dense univariate polynomials

use crate::numeric::{rational_sign, NumericError, RealNumber};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// Coefficients from the constant term up; never has trailing zeros
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniPoly {
    coefficients: Vec<BigRational>,
}

impl UniPoly {
    pub fn new(mut coefficients: Vec<BigRational>) -> Self {
        while coefficients.last().is_some_and(|c| c.is_zero()) {
            coefficients.pop();
        }
        Self { coefficients }
    }

    pub fn zero() -> Self {
        Self::new(Vec::new())
    }

    pub fn constant(value: BigRational) -> Self {
        Self::new(vec![value])
    }

    /// `x - root`
    pub fn linear_factor(root: &BigRational) -> Self {
        Self::new(vec![-root.clone(), BigRational::one()])
    }

    pub fn coefficients(&self) -> &[BigRational] {
        &self.coefficients
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// `None` for the zero polynomial
    pub fn degree(&self) -> Option<usize> {
        self.coefficients.len().checked_sub(1)
    }

    pub fn leading(&self) -> BigRational {
        self.coefficients
            .last()
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }

    pub fn coefficient(&self, power: usize) -> BigRational {
        self.coefficients
            .get(power)
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }

    pub fn add(&self, other: &Self) -> Self {
        let len = self.coefficients.len().max(other.coefficients.len());
        Self::new(
            (0..len)
                .map(|i| self.coefficient(i) + other.coefficient(i))
                .collect(),
        )
    }

    pub fn neg(&self) -> Self {
        Self::new(self.coefficients.iter().map(|c| -c.clone()).collect())
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn scale(&self, factor: &BigRational) -> Self {
        Self::new(self.coefficients.iter().map(|c| c * factor).collect())
    }

    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let mut product =
            vec![BigRational::zero(); self.coefficients.len() + other.coefficients.len() - 1];
        for (i, a) in self.coefficients.iter().enumerate() {
            for (j, b) in other.coefficients.iter().enumerate() {
                product[i + j] += a * b;
            }
        }
        Self::new(product)
    }

    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self), NumericError> {
        let divisor_degree = divisor.degree().ok_or(NumericError::DivisionByZero)?;
        let lead = divisor.leading();
        let mut remainder = self.coefficients.clone();
        let Some(degree) = self.degree().filter(|d| *d >= divisor_degree) else {
            return Ok((Self::zero(), self.clone()));
        };
        let mut quotient = vec![BigRational::zero(); degree - divisor_degree + 1];
        for shift in (0..quotient.len()).rev() {
            let factor = &remainder[shift + divisor_degree] / &lead;
            if factor.is_zero() {
                continue;
            }
            for (i, c) in divisor.coefficients.iter().enumerate() {
                remainder[shift + i] -= &factor * c;
            }
            quotient[shift] = factor;
        }
        Ok((Self::new(quotient), Self::new(remainder)))
    }

    pub fn monic(&self) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        self.scale(&(BigRational::one() / self.leading()))
    }

    /// Monic greatest common divisor
    pub fn gcd(&self, other: &Self) -> Self {
        let mut a = self.clone();
        let mut b = other.clone();
        while !b.is_zero() {
            let remainder = match a.div_rem(&b) {
                Ok((_, r)) => r,
                Err(_) => break,
            };
            a = b;
            b = remainder;
        }
        a.monic()
    }

    pub fn derivative(&self) -> Self {
        Self::new(
            self.coefficients
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * BigRational::from_integer(BigInt::from(i)))
                .collect(),
        )
    }

    /// Same roots, each with multiplicity one
    pub fn squarefree(&self) -> Self {
        let common = self.gcd(&self.derivative());
        match self.div_rem(&common) {
            Ok((quotient, _)) => quotient.monic(),
            Err(_) => self.monic(),
        }
    }

    pub fn evaluate_rational(&self, at: &BigRational) -> BigRational {
        self.coefficients
            .iter()
            .rev()
            .fold(BigRational::zero(), |acc, c| acc * at + c)
    }

    pub fn evaluate(&self, at: &RealNumber) -> Result<RealNumber, NumericError> {
        let mut acc = RealNumber::zero();
        for c in self.coefficients.iter().rev() {
            acc = acc
                .checked_mul(at)?
                .checked_add(&RealNumber::from_rational(c.clone()))?;
        }
        Ok(acc)
    }

    /// Primitive integer coefficients with the same roots
    pub fn to_primitive_integers(&self) -> Vec<BigInt> {
        let lcm = self
            .coefficients
            .iter()
            .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()));
        let scaled: Vec<BigInt> = self
            .coefficients
            .iter()
            .map(|c| (c * BigRational::from_integer(lcm.clone())).to_integer())
            .collect();
        let content = scaled.iter().fold(BigInt::zero(), |acc, c| acc.gcd(c));
        if content.is_zero() {
            return scaled;
        }
        scaled.into_iter().map(|c| c / &content).collect()
    }

    /// Number of distinct real roots by Sturm's theorem
    pub fn count_real_roots(&self) -> usize {
        if self.degree().unwrap_or(0) == 0 {
            return 0;
        }
        let sequence = SturmSequence::new(self);
        sequence
            .changes_at_negative_infinity()
            .saturating_sub(sequence.changes_at_positive_infinity())
    }

    pub fn sign_at(&self, at: &BigRational) -> i8 {
        rational_sign(&self.evaluate_rational(at))
    }

    /// Integer coefficients without common factor and a positive leading coefficient
    pub fn primitive(&self) -> Self {
        let mut integers = self.to_primitive_integers();
        if integers.last().is_some_and(|c| c.is_negative()) {
            integers = integers.into_iter().map(|c| -c).collect();
        }
        Self::new(integers.into_iter().map(BigRational::from_integer).collect())
    }

    /// `p(-x)`
    pub fn reflect(&self) -> Self {
        Self::new(
            self.coefficients
                .iter()
                .enumerate()
                .map(|(i, c)| if i % 2 == 1 { -c.clone() } else { c.clone() })
                .collect(),
        )
    }

    /// `xⁿ·p(1/x)`, whose roots are the reciprocals of the non-zero roots
    pub fn reversed(&self) -> Self {
        let mut coefficients = self.coefficients.clone();
        coefficients.reverse();
        Self::new(coefficients)
    }

    /// `p(xᵏ)`
    pub fn compose_power(&self, k: usize) -> Self {
        if self.is_zero() || k == 0 {
            return self.clone();
        }
        let mut coefficients = vec![BigRational::zero(); (self.coefficients.len() - 1) * k + 1];
        for (i, c) in self.coefficients.iter().enumerate() {
            coefficients[i * k] = c.clone();
        }
        Self::new(coefficients)
    }

    /// Every real root lies strictly inside `(-bound, bound)`
    pub fn root_bound(&self) -> BigRational {
        let lead = self.leading().abs();
        let largest = self
            .coefficients
            .iter()
            .rev()
            .skip(1)
            .map(|c| c.abs() / &lead)
            .max()
            .unwrap_or_else(BigRational::zero);
        BigRational::one() + largest
    }

    /// Isolating intervals of the real roots of a squarefree polynomial, in
    /// increasing order
    ///
    /// Each interval is either a single rational root `(r, r)` or an open
    /// interval `(a, b)` holding exactly one root, with `p(a)` and `p(b)`
    /// non-zero and of opposite signs.
    pub fn isolate_real_roots(&self) -> Vec<(BigRational, BigRational)> {
        if self.degree().unwrap_or(0) == 0 {
            return Vec::new();
        }
        let sequence = SturmSequence::new(self);
        let bound = self.root_bound();
        let mut intervals = Vec::new();
        let low = -bound.clone();
        let count = sequence.count_between(&low, &bound);
        self.isolate(&sequence, low, bound, count, &mut intervals);
        intervals
    }

    fn isolate(
        &self,
        sequence: &SturmSequence,
        low: BigRational,
        high: BigRational,
        count: usize,
        intervals: &mut Vec<(BigRational, BigRational)>,
    ) {
        if count == 0 {
            return;
        }
        if count == 1 {
            intervals.push((low, high));
            return;
        }
        let two = BigRational::from_integer(BigInt::from(2));
        let middle = (&low + &high) / &two;
        if !self.evaluate_rational(&middle).is_zero() {
            let left = sequence.count_between(&low, &middle);
            self.isolate(sequence, low, middle.clone(), left, intervals);
            self.isolate(sequence, middle, high, count - left, intervals);
            return;
        }

        // The midpoint is a root: fence it off with non-roots on both sides
        let mut radius = (&high - &low) / BigRational::from_integer(BigInt::from(4));
        loop {
            let below = &middle - &radius;
            let above = &middle + &radius;
            if !self.evaluate_rational(&below).is_zero()
                && !self.evaluate_rational(&above).is_zero()
                && sequence.count_between(&below, &above) == 1
            {
                let left = sequence.count_between(&low, &below);
                let right = sequence.count_between(&above, &high);
                self.isolate(sequence, low, below, left, intervals);
                intervals.push((middle.clone(), middle));
                self.isolate(sequence, above, high, right, intervals);
                return;
            }
            radius = radius / &two;
        }
    }

    /// Number of distinct roots in `(low, high]`
    pub fn count_roots_between(&self, low: &BigRational, high: &BigRational) -> usize {
        if self.degree().unwrap_or(0) == 0 || low >= high {
            return 0;
        }
        SturmSequence::new(&self.squarefree()).count_between(low, high)
    }
}

/// Sturm sequence `p, p', -rem(p, p'), ...` of a polynomial
struct SturmSequence {
    polynomials: Vec<UniPoly>,
}

impl SturmSequence {
    fn new(polynomial: &UniPoly) -> Self {
        let mut polynomials = vec![polynomial.clone(), polynomial.derivative()];
        loop {
            let n = polynomials.len();
            if polynomials[n - 1].is_zero() {
                polynomials.pop();
                break;
            }
            let remainder = match polynomials[n - 2].div_rem(&polynomials[n - 1]) {
                Ok((_, r)) => r,
                Err(_) => break,
            };
            if remainder.is_zero() {
                break;
            }
            polynomials.push(remainder.neg());
        }
        Self { polynomials }
    }

    fn changes_at(&self, at: &BigRational) -> usize {
        let signs: Vec<i8> = self.polynomials.iter().map(|p| p.sign_at(at)).collect();
        sign_changes(&signs)
    }

    fn changes_at_positive_infinity(&self) -> usize {
        let signs: Vec<i8> = self
            .polynomials
            .iter()
            .map(|p| rational_sign(&p.leading()))
            .collect();
        sign_changes(&signs)
    }

    fn changes_at_negative_infinity(&self) -> usize {
        let signs: Vec<i8> = self
            .polynomials
            .iter()
            .map(|p| {
                let sign = rational_sign(&p.leading());
                if p.degree().unwrap_or(0) % 2 == 1 {
                    -sign
                } else {
                    sign
                }
            })
            .collect();
        sign_changes(&signs)
    }

    /// Distinct roots in `(low, high]`
    fn count_between(&self, low: &BigRational, high: &BigRational) -> usize {
        self.changes_at(low).saturating_sub(self.changes_at(high))
    }
}

fn sign_changes(signs: &[i8]) -> usize {
    let nonzero: Vec<i8> = signs.iter().copied().filter(|s| *s != 0).collect();
    nonzero.windows(2).filter(|w| w[0] != w[1]).count()
}
