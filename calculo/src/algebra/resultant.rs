//! Resultants of polynomials with polynomial coefficients
//!
//! A polynomial in `y` whose coefficients are polynomials in `x` is held as
//! its coefficient list, constant term first. The resultant with respect to
//! `y` is the determinant of the Sylvester matrix, computed with Bareiss'
//! fraction-free elimination so every division is exact.

use super::univariate::UniPoly;
use crate::numeric::NumericError;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

/// `Σ coefficients[k]·yᵏ` with coefficients in `ℚ[x]`
pub type Bivariate = Vec<UniPoly>;

/// `Res_y(a, b)`, a polynomial in `x`
pub fn resultant(a: &[UniPoly], b: &[UniPoly]) -> Result<UniPoly, NumericError> {
    let a = trimmed(a);
    let b = trimmed(b);
    let (Some(m), Some(n)) = (a.len().checked_sub(1), b.len().checked_sub(1)) else {
        return Ok(UniPoly::zero());
    };
    if m == 0 {
        return Ok(power(&a[0], n));
    }
    if n == 0 {
        return Ok(power(&b[0], m));
    }

    let size = m + n;
    let mut matrix = vec![vec![UniPoly::zero(); size]; size];
    for row in 0..n {
        for (k, c) in a.iter().enumerate() {
            matrix[row][row + m - k] = c.clone();
        }
    }
    for row in 0..m {
        for (k, c) in b.iter().enumerate() {
            matrix[n + row][row + n - k] = c.clone();
        }
    }
    determinant(matrix)
}

/// `p(x - y)` as a polynomial in `y`
pub fn shifted(p: &UniPoly) -> Bivariate {
    let degree = p.degree().unwrap_or(0);
    let mut result = vec![UniPoly::zero(); degree + 1];
    for (i, c) in p.coefficients().iter().enumerate() {
        // (x - y)^i = Σ C(i, k)·x^(i-k)·(-y)^k
        let mut binomial = BigInt::one();
        for k in 0..=i {
            let mut coefficient = c * BigRational::from_integer(binomial.clone());
            if k % 2 == 1 {
                coefficient = -coefficient;
            }
            result[k] = result[k].add(&monomial(coefficient, i - k));
            binomial = binomial * BigInt::from(i - k) / BigInt::from(k + 1);
        }
    }
    result
}

/// `yᵐ·p(x/y)` as a polynomial in `y`, with `m` the degree of `p`
pub fn scaled(p: &UniPoly) -> Bivariate {
    let degree = p.degree().unwrap_or(0);
    let mut result = vec![UniPoly::zero(); degree + 1];
    for (i, c) in p.coefficients().iter().enumerate() {
        result[degree - i] = monomial(c.clone(), i);
    }
    result
}

/// A polynomial in `y` with constant coefficients
pub fn constant_coefficients(p: &UniPoly) -> Bivariate {
    p.coefficients()
        .iter()
        .map(|c| UniPoly::constant(c.clone()))
        .collect()
}

/// `denominator(y)·x - numerator(y)` as a polynomial in `y`, for
/// `Res_y(p(y), ·)` whose roots are the values `numerator(α)/denominator(α)`
pub fn value_relation(numerator: &UniPoly, denominator: &UniPoly) -> Bivariate {
    let len = numerator
        .coefficients()
        .len()
        .max(denominator.coefficients().len());
    (0..len)
        .map(|k| {
            UniPoly::new(vec![
                -numerator.coefficient(k),
                denominator.coefficient(k),
            ])
        })
        .collect()
}

fn monomial(coefficient: BigRational, degree: usize) -> UniPoly {
    let mut coefficients = vec![BigRational::zero(); degree + 1];
    coefficients[degree] = coefficient;
    UniPoly::new(coefficients)
}

fn trimmed(p: &[UniPoly]) -> Vec<UniPoly> {
    let mut p = p.to_vec();
    while p.last().is_some_and(|c| c.is_zero()) {
        p.pop();
    }
    p
}

fn power(p: &UniPoly, exponent: usize) -> UniPoly {
    (0..exponent).fold(UniPoly::constant(BigRational::one()), |acc, _| acc.mul(p))
}

fn exact_quotient(a: &UniPoly, b: &UniPoly) -> Result<UniPoly, NumericError> {
    let (quotient, _) = a.div_rem(b)?;
    Ok(quotient)
}

/// Bareiss elimination; every intermediate entry is a minor of the matrix
fn determinant(mut matrix: Vec<Vec<UniPoly>>) -> Result<UniPoly, NumericError> {
    let size = matrix.len();
    let mut negate = false;
    let mut previous = UniPoly::constant(BigRational::one());

    for k in 0..size.saturating_sub(1) {
        if matrix[k][k].is_zero() {
            let Some(pivot) = (k + 1..size).find(|&i| !matrix[i][k].is_zero()) else {
                return Ok(UniPoly::zero());
            };
            matrix.swap(k, pivot);
            negate = !negate;
        }
        for i in k + 1..size {
            for j in k + 1..size {
                let cross = matrix[i][j]
                    .mul(&matrix[k][k])
                    .sub(&matrix[i][k].mul(&matrix[k][j]));
                matrix[i][j] = exact_quotient(&cross, &previous)?;
            }
        }
        previous = matrix[k][k].clone();
    }

    let last = matrix[size - 1][size - 1].clone();
    Ok(if negate { last.neg() } else { last })
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

    #[test]
    fn sum_of_square_roots() {
        // √2 + √3 is a root of x⁴ - 10x² + 1
        let two = poly(&[-2, 0, 1]);
        let three = poly(&[-3, 0, 1]);
        let sum = resultant(&shifted(&two), &constant_coefficients(&three)).unwrap();
        assert_eq!(sum.monic(), poly(&[1, 0, -10, 0, 1]));
    }

    #[test]
    fn product_of_cube_roots() {
        // ∛2·∛3 is a root of x³ - 6; every product of conjugates repeats three times
        let two = poly(&[-2, 0, 0, 1]);
        let three = poly(&[-3, 0, 0, 1]);
        let product = resultant(&scaled(&two), &constant_coefficients(&three)).unwrap();
        assert_eq!(product.degree(), Some(9));
        assert_eq!(product.squarefree(), poly(&[-6, 0, 0, 1]));
    }

    #[test]
    fn value_of_a_polynomial_at_a_root() {
        // α² with α³ = 2 is a root of x³ - 4
        let cube = poly(&[-2, 0, 0, 1]);
        let square = poly(&[0, 0, 1]);
        let relation = value_relation(&square, &poly(&[1]));
        let result = resultant(&constant_coefficients(&cube), &relation).unwrap();
        assert_eq!(result.monic(), poly(&[-4, 0, 0, 1]));
    }
}
