//! Puiseux expansions next to a point
//!
//! Near a finite point `a` the variable is written `a + s` (from above) or
//! `a - s` (from below), near `±∞` as `±1/s`, always with `s → 0⁺`. A
//! branch-free expression then expands into a sum of rational powers of `s`
//! with coefficients in a [`RadicalField`]. Expansions are truncated: every
//! term below a series' precision is exact, nothing is known above it.

use super::convert::constant_exponent;
use super::germ::{Approach, Side};
use super::radical::RadicalField;
use crate::algebra::RationalFunction;
use crate::error::EngineError;
use crate::resource_limits::ResourceLimits;
use crate::semantic::{ArithmeticOperation, Expr, Point};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::collections::BTreeMap;
use tracing::trace;

/// Absolute truncation orders tried in turn
const CUTOFFS: [i64; 5] = [1, 2, 4, 8, 16];

/// Most terms one binomial expansion may produce
const MAX_BINOMIAL_TERMS: usize = 256;

/// The leading behaviour of an expansion
#[derive(Debug, Clone)]
pub enum Leading {
    /// Identically zero next to the point
    Zero,
    /// `coefficient · s^order`
    Term {
        order: BigRational,
        coefficient: RationalFunction,
    },
    /// No term found, but the expression is `O(s^precision)` with a positive precision
    Vanishing,
}

/// Leading term of a branch-free expression on one side of a point
///
/// The returned field interprets the coefficient.
pub fn leading(
    expr: &Expr,
    approach: &Approach<'_>,
    limits: &ResourceLimits,
) -> Result<(Leading, RadicalField), EngineError> {
    let mut vanishing = None;
    for cutoff in CUTOFFS {
        let mut expansion = Expansion {
            field: RadicalField::new(limits),
            approach,
            cutoff: BigRational::from_integer(BigInt::from(cutoff)),
            limits,
        };
        let series = match expansion.expand(expr) {
            Ok(series) => series,
            Err(Shortfall::Truncated) => continue,
            Err(Shortfall::Engine(err)) => return Err(err),
        };
        trace!(%expr, cutoff, terms = series.terms.len(), "expansion");
        if let Some((order, coefficient)) = series.terms.iter().next() {
            let leading = Leading::Term {
                order: order.clone(),
                coefficient: coefficient.clone(),
            };
            return Ok((leading, expansion.field));
        }
        match &series.precision {
            None => return Ok((Leading::Zero, expansion.field)),
            Some(precision) if precision.is_positive() => {
                vanishing = Some(expansion.field);
            }
            Some(_) => {}
        }
    }
    match vanishing {
        Some(field) => Ok((Leading::Vanishing, field)),
        None => Err(EngineError::Indeterminate(format!(
            "could not find the leading behaviour of {} as {}",
            expr, approach
        ))),
    }
}

/// `Σ coefficient · s^exponent`, exact below `precision` (everywhere when `None`)
#[derive(Debug, Clone)]
struct Series {
    terms: BTreeMap<BigRational, RationalFunction>,
    precision: Option<BigRational>,
}

impl Series {
    fn exact(terms: BTreeMap<BigRational, RationalFunction>) -> Self {
        Self {
            terms,
            precision: None,
        }
    }

    fn monomial(exponent: BigRational, coefficient: RationalFunction) -> Self {
        let mut terms = BTreeMap::new();
        if !coefficient.is_zero() {
            terms.insert(exponent, coefficient);
        }
        Self::exact(terms)
    }

    fn valuation(&self) -> Option<&BigRational> {
        self.terms.keys().next()
    }

    /// Lowest order this series may still have a term at
    fn floor(&self) -> Option<&BigRational> {
        self.valuation().or(self.precision.as_ref())
    }
}

fn min_precision(a: Option<BigRational>, b: Option<BigRational>) -> Option<BigRational> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

enum Shortfall {
    /// More terms are needed than the cutoff allows
    Truncated,
    Engine(EngineError),
}

impl From<EngineError> for Shortfall {
    fn from(err: EngineError) -> Self {
        Shortfall::Engine(err)
    }
}

struct Expansion<'a> {
    field: RadicalField,
    approach: &'a Approach<'a>,
    cutoff: BigRational,
    limits: &'a ResourceLimits,
}

impl Expansion<'_> {
    fn expand(&mut self, expr: &Expr) -> Result<Series, Shortfall> {
        match expr {
            Expr::Number(n) => Ok(Series::monomial(
                BigRational::zero(),
                RationalFunction::constant(n.clone()),
            )),
            Expr::Symbol(v) if v == self.approach.variable => Ok(self.variable()),
            Expr::Symbol(v) => Ok(Series::monomial(
                BigRational::zero(),
                RationalFunction::variable(v),
            )),
            Expr::Negation(inner) => {
                let inner = self.expand(inner)?;
                self.scale(&inner, &RationalFunction::constant(-BigRational::one()))
            }
            Expr::Arithmetic(l, op, r) => {
                let lhs = self.expand(l)?;
                let rhs = self.expand(r)?;
                match op {
                    ArithmeticOperation::Add => self.add(&lhs, &rhs),
                    ArithmeticOperation::Subtract => {
                        let negated =
                            self.scale(&rhs, &RationalFunction::constant(-BigRational::one()))?;
                        self.add(&lhs, &negated)
                    }
                    ArithmeticOperation::Multiply => self.mul(&lhs, &rhs),
                    ArithmeticOperation::Divide => {
                        let inverse = self.power(&rhs, &-BigRational::one(), expr)?;
                        self.mul(&lhs, &inverse)
                    }
                    ArithmeticOperation::Power => {
                        let exponent = constant_exponent(r, self.limits)?;
                        self.power(&lhs, &exponent, expr)
                    }
                }
            }
            Expr::Abs(_) | Expr::Piecewise(_) => Err(EngineError::Unsupported(format!(
                "'{}' has branches that must be resolved before expansion",
                expr
            ))
            .into()),
        }
    }

    /// The approach variable in terms of `s`
    fn variable(&self) -> Series {
        let one = RationalFunction::constant(BigRational::one());
        let minus_one = RationalFunction::constant(-BigRational::one());
        let mut terms = BTreeMap::new();
        match self.approach.point {
            Point::Finite(a) => {
                if !a.is_zero() {
                    terms.insert(BigRational::zero(), RationalFunction::constant(a.clone()));
                }
                let direction = match self.approach.side {
                    Side::Above => one,
                    Side::Below => minus_one,
                };
                terms.insert(BigRational::one(), direction);
            }
            Point::PositiveInfinity => {
                terms.insert(-BigRational::one(), one);
            }
            Point::NegativeInfinity => {
                terms.insert(-BigRational::one(), minus_one);
            }
        }
        Series::exact(terms)
    }

    fn add(&self, a: &Series, b: &Series) -> Result<Series, Shortfall> {
        let precision = min_precision(a.precision.clone(), b.precision.clone());
        let mut terms: BTreeMap<BigRational, RationalFunction> = BTreeMap::new();
        for (exponent, coefficient) in a.terms.iter().chain(&b.terms) {
            if precision.as_ref().is_some_and(|p| exponent >= p) {
                continue;
            }
            let sum = match terms.get(exponent) {
                Some(existing) => self.field.add(existing, coefficient)?,
                None => coefficient.clone(),
            };
            terms.insert(exponent.clone(), sum);
        }
        let mut kept = BTreeMap::new();
        for (exponent, coefficient) in terms {
            if !self.field.is_zero(&coefficient)? {
                kept.insert(exponent, coefficient);
            }
        }
        Ok(Series {
            terms: kept,
            precision,
        })
    }

    fn scale(&self, a: &Series, factor: &RationalFunction) -> Result<Series, Shortfall> {
        let mut terms = BTreeMap::new();
        for (exponent, coefficient) in &a.terms {
            terms.insert(exponent.clone(), self.field.mul(coefficient, factor)?);
        }
        Ok(Series {
            terms,
            precision: a.precision.clone(),
        })
    }

    fn mul(&self, a: &Series, b: &Series) -> Result<Series, Shortfall> {
        // O(s^pa)·b is O(s^(pa + vb))
        let precision = match (a.floor(), b.floor()) {
            (None, _) | (_, None) => return Ok(Series::exact(BTreeMap::new())),
            (Some(va), Some(vb)) => min_precision(
                a.precision.as_ref().map(|pa| pa + vb),
                b.precision.as_ref().map(|pb| pb + va),
            ),
        };
        let mut product = Series {
            terms: BTreeMap::new(),
            precision: precision.clone(),
        };
        for (ea, ca) in &a.terms {
            let mut row = BTreeMap::new();
            for (eb, cb) in &b.terms {
                let exponent = ea + eb;
                if precision.as_ref().is_some_and(|p| &exponent >= p) {
                    break;
                }
                row.insert(exponent, self.field.mul(ca, cb)?);
            }
            product = self.add(
                &product,
                &Series {
                    terms: row,
                    precision: precision.clone(),
                },
            )?;
        }
        Ok(product)
    }

    /// `a^exponent` as `c^α·s^(vα)·(1 + u)^α` with `c·s^v` the leading term of `a`
    fn power(
        &mut self,
        a: &Series,
        exponent: &BigRational,
        expr: &Expr,
    ) -> Result<Series, Shortfall> {
        let Some((order, coefficient)) = a.terms.iter().next() else {
            return match &a.precision {
                None if exponent.is_positive() => Ok(Series::exact(BTreeMap::new())),
                None => Err(EngineError::Undefined(format!(
                    "{} divides by zero as {}",
                    expr, self.approach
                ))
                .into()),
                // O(s^p)^α with α > 0 is O(s^(pα))
                Some(p) if exponent.is_positive() => Ok(Series {
                    terms: BTreeMap::new(),
                    precision: Some(p * exponent),
                }),
                Some(_) => Err(Shortfall::Truncated),
            };
        };
        let (order, coefficient) = (order.clone(), coefficient.clone());

        if exponent.is_integer() && !exponent.is_negative() {
            let mut result = Series::monomial(
                BigRational::zero(),
                RationalFunction::constant(BigRational::one()),
            );
            let mut remaining = exponent.to_integer();
            while remaining.is_positive() {
                result = self.mul(&result, a)?;
                remaining -= BigInt::one();
            }
            return Ok(result);
        }

        if !exponent.is_integer() && self.field.sign(&coefficient)? == Some(-1) {
            return Err(EngineError::Undefined(format!(
                "{} takes a fractional power of a negative quantity as {}",
                expr, self.approach
            ))
            .into());
        }
        let leading = self.field.power(&coefficient, exponent)?;
        let shift = &order * exponent;

        // u = a / (c·s^v) - 1, every exponent positive
        let mut rest = BTreeMap::new();
        for (e, c) in a.terms.iter().skip(1) {
            rest.insert(e - &order, self.field.div(c, &coefficient)?);
        }
        let u = Series {
            terms: rest,
            precision: a.precision.as_ref().map(|p| p - &order),
        };

        let inner_target = &self.cutoff - &shift;
        let binomial = self.binomial(&u, exponent, inner_target)?;
        let mut terms = BTreeMap::new();
        for (e, c) in &binomial.terms {
            terms.insert(e + &shift, self.field.mul(c, &leading)?);
        }
        Ok(Series {
            terms,
            precision: binomial.precision.map(|p| p + &shift),
        })
    }

    /// `(1 + u)^α` for `u` of positive valuation, known below `target`
    fn binomial(
        &mut self,
        u: &Series,
        exponent: &BigRational,
        target: BigRational,
    ) -> Result<Series, Shortfall> {
        let one = RationalFunction::constant(BigRational::one());
        if u.terms.is_empty() && u.precision.is_none() {
            return Ok(Series::monomial(BigRational::zero(), one));
        }
        let precision = min_precision(u.precision.clone(), Some(target)).unwrap_or_default();
        if !precision.is_positive() {
            return Ok(Series {
                terms: BTreeMap::new(),
                precision: Some(precision),
            });
        }
        let Some(step) = u.valuation().cloned() else {
            return Ok(truncated(Series::monomial(BigRational::zero(), one), &precision));
        };

        let mut result = Series {
            terms: BTreeMap::new(),
            precision: Some(precision.clone()),
        };
        let mut power = Series::monomial(BigRational::zero(), one);
        let mut binomial = BigRational::one();
        for k in 0..=MAX_BINOMIAL_TERMS {
            let index = BigRational::from_integer(BigInt::from(k));
            // u^k starts at order k·step or later
            if &index * &step >= precision {
                return Ok(result);
            }
            let term = self.scale(&power, &RationalFunction::constant(binomial.clone()))?;
            result = self.add(&result, &term)?;

            // C(α, k+1) = C(α, k)·(α - k)/(k + 1)
            binomial = binomial * (exponent - &index) / (index + BigRational::one());
            if binomial.is_zero() {
                return Ok(result);
            }
            power = truncated(self.mul(&power, u)?, &precision);
        }
        Err(EngineError::ResourceLimit(format!(
            "more than {} terms in one expansion",
            MAX_BINOMIAL_TERMS
        ))
        .into())
    }
}

/// Forget everything at or above `precision`
fn truncated(series: Series, precision: &BigRational) -> Series {
    let precision = min_precision(series.precision, Some(precision.clone()));
    let terms = series
        .terms
        .into_iter()
        .filter(|(e, _)| precision.as_ref().is_none_or(|p| e < p))
        .collect();
    Series { terms, precision }
}

impl Leading {
    /// Whether the expression tends to zero
    pub fn vanishes(&self) -> bool {
        match self {
            Leading::Zero | Leading::Vanishing => true,
            Leading::Term { order, .. } => order.is_positive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `coefficient s^order` of the leading term
    fn leading_text(expr: &str, point: Point, side: Side) -> String {
        let limits = ResourceLimits::default();
        let variable = crate::semantic::Variable::new("x");
        let approach = Approach {
            variable: &variable,
            point: &point,
            side,
        };
        let expr = crate::parser::parse_expression(expr, &limits).unwrap();
        match leading(&expr, &approach, &limits).unwrap() {
            (Leading::Term { order, coefficient }, field) => {
                format!("{} s^{}", field.to_expr(&coefficient), order)
            }
            (Leading::Zero, _) => "0".to_string(),
            (Leading::Vanishing, _) => "o(1)".to_string(),
        }
    }

    fn finite(n: i64) -> Point {
        Point::integer(n)
    }

    #[test]
    fn square_root_at_zero_from_above() {
        assert_eq!(leading_text("sqrt(x)", finite(0), Side::Above), "1 s^1/2");
    }

    #[test]
    fn square_root_below_zero_is_undefined() {
        let limits = ResourceLimits::default();
        let variable = crate::semantic::Variable::new("x");
        let point = finite(0);
        let approach = Approach {
            variable: &variable,
            point: &point,
            side: Side::Below,
        };
        let expr = crate::parser::parse_expression("sqrt(x)", &limits).unwrap();
        assert!(matches!(
            leading(&expr, &approach, &limits),
            Err(EngineError::Undefined(_))
        ));
    }

    #[test]
    fn cancellation_needs_a_second_term() {
        assert_eq!(
            leading_text("(sqrt(x) - 1)/(x - 1)", finite(1), Side::Below),
            "1/2 s^0"
        );
    }

    #[test]
    fn difference_at_infinity() {
        assert_eq!(
            leading_text("sqrt(x**2 + 1) - x", Point::PositiveInfinity, Side::Below),
            "1/2 s^1"
        );
        assert_eq!(
            leading_text("sqrt(x**2 + 1) + x", Point::NegativeInfinity, Side::Above),
            "1/2 s^1"
        );
    }

    #[test]
    fn rational_functions_expand_exactly() {
        assert_eq!(leading_text("x**2 - x", finite(0), Side::Above), "-1 s^1");
        assert_eq!(leading_text("(x - 1)**2 - x**2 + 2x - 1", finite(3), Side::Above), "0");
    }

    #[test]
    fn cube_root_of_a_polynomial() {
        assert_eq!(
            leading_text("(x**3 + x)**(1/3)", Point::PositiveInfinity, Side::Below),
            "1 s^-1"
        );
    }

    #[test]
    fn vanishing_without_a_known_term() {
        // √x·√x - x is zero, but the expansion only sees truncated sums
        let text = leading_text("sqrt(x + 1)*sqrt(x + 1) - x - 1", finite(0), Side::Above);
        assert!(text == "0" || text == "o(1)", "{}", text);
    }
}
