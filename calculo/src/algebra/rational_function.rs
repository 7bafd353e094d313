//! Quotients of polynomials in canonical form

use super::polynomial::Polynomial;
use crate::numeric::NumericError;
use crate::semantic::{Expr, Variable};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed};
use std::collections::BTreeSet;

/// `numerator / denominator` with a non-zero denominator
///
/// Functions of at most one variable are fully reduced (gcd removed,
/// monic denominator), so equal functions have equal fields. With more
/// variables only common monomial factors, exact quotients and the
/// leading coefficient of the denominator are normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationalFunction {
    numerator: Polynomial,
    denominator: Polynomial,
}

impl RationalFunction {
    pub fn new(numerator: Polynomial, denominator: Polynomial) -> Result<Self, NumericError> {
        if denominator.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        Ok(Self {
            numerator,
            denominator,
        }
        .reduced())
    }

    pub fn from_polynomial(polynomial: Polynomial) -> Self {
        Self {
            numerator: polynomial,
            denominator: Polynomial::one(),
        }
    }

    pub fn constant(value: BigRational) -> Self {
        Self::from_polynomial(Polynomial::constant(value))
    }

    pub fn variable(variable: &Variable) -> Self {
        Self::from_polynomial(Polynomial::variable(variable))
    }

    pub fn numerator(&self) -> &Polynomial {
        &self.numerator
    }

    pub fn denominator(&self) -> &Polynomial {
        &self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn as_constant(&self) -> Option<BigRational> {
        let numerator = self.numerator.as_constant()?;
        let denominator = self.denominator.as_constant()?;
        Some(numerator / denominator)
    }

    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut variables = self.numerator.variables();
        variables.extend(self.denominator.variables());
        variables
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.denominator == other.denominator {
            return Self {
                numerator: self.numerator.add(&other.numerator),
                denominator: self.denominator.clone(),
            }
            .reduced();
        }
        Self {
            numerator: self
                .numerator
                .mul(&other.denominator)
                .add(&other.numerator.mul(&self.denominator)),
            denominator: self.denominator.mul(&other.denominator),
        }
        .reduced()
    }

    pub fn neg(&self) -> Self {
        Self {
            numerator: self.numerator.neg(),
            denominator: self.denominator.clone(),
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self {
            numerator: self.numerator.mul(&other.numerator),
            denominator: self.denominator.mul(&other.denominator),
        }
        .reduced()
    }

    pub fn recip(&self) -> Result<Self, NumericError> {
        Self::new(self.denominator.clone(), self.numerator.clone())
    }

    pub fn div(&self, other: &Self) -> Result<Self, NumericError> {
        Ok(self.mul(&other.recip()?))
    }

    pub fn powi(&self, exponent: i64) -> Result<Self, NumericError> {
        let magnitude = u32::try_from(exponent.unsigned_abs()).unwrap_or(u32::MAX);
        let raised = Self {
            numerator: self.numerator.pow(magnitude),
            denominator: self.denominator.pow(magnitude),
        };
        if exponent < 0 {
            raised.recip()
        } else {
            Ok(raised)
        }
    }

    /// Substitute `variable -> variable + shift` in numerator and denominator
    pub fn shift(&self, variable: &Variable, shift: &BigRational) -> Self {
        Self {
            numerator: self.numerator.shift(variable, shift),
            denominator: self.denominator.shift(variable, shift),
        }
        .reduced()
    }

    fn reduced(self) -> Self {
        if self.numerator.is_zero() {
            return Self::from_polynomial(Polynomial::zero());
        }
        let variables = self.variables();
        let mut reduced = if variables.len() <= 1 {
            self.reduce_univariate(variables.iter().next())
        } else {
            self.reduce_multivariate()
        };
        reduced.normalise_leading();
        reduced
    }

    fn reduce_univariate(self, variable: Option<&Variable>) -> Self {
        let Some(variable) = variable else {
            return self;
        };
        let (Some(numerator), Some(denominator)) = (
            self.numerator.to_univariate(variable),
            self.denominator.to_univariate(variable),
        ) else {
            return self;
        };
        let common = numerator.gcd(&denominator);
        match (numerator.div_rem(&common), denominator.div_rem(&common)) {
            (Ok((n, _)), Ok((d, _))) => Self {
                numerator: Polynomial::from_univariate(&n, variable),
                denominator: Polynomial::from_univariate(&d, variable),
            },
            _ => self,
        }
    }

    fn reduce_multivariate(self) -> Self {
        let mut content = self.numerator.monomial_content();
        let denominator_content = self.denominator.monomial_content();
        content.retain(|variable, exponent| match denominator_content.get(variable) {
            Some(other) => {
                *exponent = (*exponent).min(*other);
                true
            }
            None => false,
        });
        let (numerator, denominator) = match (
            self.numerator.divide_by_monomial(&content),
            self.denominator.divide_by_monomial(&content),
        ) {
            (Some(n), Some(d)) => (n, d),
            _ => (self.numerator, self.denominator),
        };

        if let Some(quotient) = numerator.exact_div(&denominator) {
            return Self::from_polynomial(quotient);
        }
        if let Some(quotient) = denominator.exact_div(&numerator) {
            return Self {
                numerator: Polynomial::one(),
                denominator: quotient,
            };
        }
        Self {
            numerator,
            denominator,
        }
    }

    /// Make the denominator's leading coefficient one
    fn normalise_leading(&mut self) {
        let Some((_, lead)) = self.denominator.leading_term() else {
            return;
        };
        if lead.is_one() {
            return;
        }
        let factor = BigRational::one() / lead;
        self.numerator = self.numerator.scale(&factor);
        self.denominator = self.denominator.scale(&factor);
    }

    /// Display form with integer coefficients, e.g. `-1/x**2`, `(x + 1)/(2*x)`
    pub fn to_expr(&self) -> Expr {
        if let Some(denominator) = self.denominator.as_constant() {
            return self
                .numerator
                .scale(&(BigRational::one() / denominator))
                .to_expr();
        }

        let lcm = self
            .numerator
            .denominator_lcm()
            .lcm(&self.denominator.denominator_lcm());
        let scale = BigRational::from_integer(lcm);
        let mut numerator = self.numerator.scale(&scale);
        let mut denominator = self.denominator.scale(&scale);
        let content = numerator
            .integer_content()
            .gcd(&denominator.integer_content());
        if content > BigInt::one() {
            let shrink = BigRational::new(BigInt::one(), content);
            numerator = numerator.scale(&shrink);
            denominator = denominator.scale(&shrink);
        }
        if denominator
            .leading_term()
            .is_some_and(|(_, lead)| lead.is_negative())
        {
            numerator = numerator.neg();
            denominator = denominator.neg();
        }

        let single_negative_term = numerator.terms().count() == 1
            && numerator.terms().all(|(_, c)| c.is_negative());
        if single_negative_term {
            Expr::negate(Expr::div(numerator.neg().to_expr(), denominator.to_expr()))
        } else {
            Expr::div(numerator.to_expr(), denominator.to_expr())
        }
    }
}

impl From<Polynomial> for RationalFunction {
    fn from(polynomial: Polynomial) -> Self {
        Self::from_polynomial(polynomial)
    }
}
