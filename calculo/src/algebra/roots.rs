//! Exact real roots of univariate polynomials
//!
//! The squarefree part is split into isolating intervals by Sturm's theorem.
//! Each isolated root is then recognised as rational (its denominator divides
//! the leading coefficient), as a quadratic surd when the polynomial is
//! quadratic or biquadratic, and otherwise kept as an algebraic number.

use super::algebraic::AlgebraicNumber;
use super::univariate::UniPoly;
use crate::error::EngineError;
use crate::numeric::RealNumber;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use tracing::trace;

/// Distinct real roots of `polynomial`, in increasing order
pub fn real_roots(polynomial: &UniPoly) -> Result<Vec<RealNumber>, EngineError> {
    if polynomial.degree().unwrap_or(0) == 0 {
        return Ok(Vec::new());
    }

    let squarefree = polynomial.squarefree();
    let mut rationals = Vec::new();
    for (low, high) in squarefree.isolate_real_roots() {
        if low == high {
            rationals.push(low);
        } else if let Some(root) = AlgebraicNumber::new(&squarefree, low, high).as_rational() {
            rationals.push(root);
        }
    }

    let mut remaining = squarefree;
    for root in &rationals {
        let (quotient, _) = remaining.div_rem(&UniPoly::linear_factor(root))?;
        remaining = quotient;
    }

    let mut roots: Vec<RealNumber> = rationals.into_iter().map(RealNumber::from_rational).collect();
    roots.extend(irrational_roots(&remaining));
    roots.sort();
    trace!(count = roots.len(), "real roots found");
    Ok(roots)
}

/// Roots of a squarefree polynomial without rational roots
fn irrational_roots(polynomial: &UniPoly) -> Vec<RealNumber> {
    if polynomial.degree().unwrap_or(0) <= 2 {
        return low_degree_roots(polynomial);
    }
    if polynomial.degree() == Some(4) && is_biquadratic(polynomial) {
        if let Some(roots) = biquadratic_roots(polynomial) {
            return roots;
        }
    }
    polynomial
        .isolate_real_roots()
        .into_iter()
        .map(|(low, high)| RealNumber::algebraic(AlgebraicNumber::new(polynomial, low, high)))
        .collect()
}

fn low_degree_roots(polynomial: &UniPoly) -> Vec<RealNumber> {
    match polynomial.degree() {
        Some(1) => {
            let root = -polynomial.coefficient(0) / polynomial.coefficient(1);
            vec![RealNumber::from_rational(root)]
        }
        Some(2) => quadratic_roots(
            &polynomial.coefficient(2),
            &polynomial.coefficient(1),
            &polynomial.coefficient(0),
        ),
        _ => Vec::new(),
    }
}

/// Real roots of `a·x² + b·x + c`, possibly irrational, in increasing order
pub fn quadratic_roots(a: &BigRational, b: &BigRational, c: &BigRational) -> Vec<RealNumber> {
    let four = BigRational::from_integer(BigInt::from(4));
    let two = BigRational::from_integer(BigInt::from(2));
    let discriminant = b * b - four * a * c;
    if discriminant.is_negative() {
        return Vec::new();
    }
    let center = -b / (&two * a);
    if discriminant.is_zero() {
        return vec![RealNumber::from_rational(center)];
    }
    // (-b ± √Δ) / 2a, with √Δ = √(n·m)/m
    let half_width = BigRational::one() / (&two * a).abs();
    let product = discriminant.numer() * discriminant.denom();
    let scale = half_width / BigRational::from_integer(discriminant.denom().clone());
    vec![
        RealNumber::surd(center.clone(), -scale.clone(), product.clone()),
        RealNumber::surd(center, scale, product),
    ]
}

fn is_biquadratic(polynomial: &UniPoly) -> bool {
    polynomial
        .coefficients()
        .iter()
        .enumerate()
        .all(|(power, c)| power % 2 == 0 || c.is_zero())
}

/// Roots of `a·x⁴ + b·x² + c` through `y = x²`, when every positive `y` is rational
fn biquadratic_roots(polynomial: &UniPoly) -> Option<Vec<RealNumber>> {
    let mut roots = Vec::new();
    for y in quadratic_roots(
        &polynomial.coefficient(4),
        &polynomial.coefficient(2),
        &polynomial.coefficient(0),
    ) {
        if y.signum() <= 0 {
            continue;
        }
        // Nested square roots are left to isolation
        let root = RealNumber::sqrt(y.as_rational()?)?;
        roots.push(root.neg());
        roots.push(root);
    }
    roots.sort();
    Some(roots)
}
