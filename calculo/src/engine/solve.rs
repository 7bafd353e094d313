//! Sign partition of the real line
//!
//! Critical points (zeros and poles of every rational piece, every `abs`
//! argument and every piecewise condition) cut ℝ into open intervals and
//! isolated points. The sign of the expression is constant on each
//! interval, so one exact evaluation per region classifies it. With
//! radicals the zeros come from the norm of each part over all conjugates
//! of its radicals, and every radicand's zeros and poles bound the domain.

use super::convert::{constant_exponent, to_rational_function};
use super::evaluate::{evaluate, evaluate_condition};
use super::radical::{has_radicals, RadicalField};
use crate::algebra::{real_roots, Polynomial};
use crate::error::EngineError;
use crate::numeric::RealNumber;
use crate::resource_limits::ResourceLimits;
use crate::semantic::{ArithmeticOperation, Expr, Relation, Variable};
use crate::solution::{Bound, SingularitySet, SolutionSet};
use num_traits::Signed;
use std::cmp::Ordering;
use tracing::debug;

/// Sign of an expression on one region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignClass {
    Positive,
    Negative,
    Zero,
    Undefined,
}

/// One region of the partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    Open { min: Bound, max: Bound },
    Point(RealNumber),
}

impl Region {
    fn into_set(self) -> SolutionSet {
        match self {
            Region::Open { min, max } => SolutionSet::Interval { min, max },
            Region::Point(value) => SolutionSet::point(value),
        }
    }
}

/// Real values of `variable` where `expr relation 0` holds
pub fn solve(
    expr: &Expr,
    variable: &Variable,
    relation: Relation,
    limits: &ResourceLimits,
) -> Result<SolutionSet, EngineError> {
    let parts = partition(expr, variable, limits)?
        .into_iter()
        .filter(|(_, class)| accepts(relation, *class))
        .map(|(region, _)| region.into_set())
        .collect();
    Ok(SolutionSet::from_parts(parts))
}

/// Real values of `variable` where `expr` is undefined
pub fn singularities(
    expr: &Expr,
    variable: &Variable,
    limits: &ResourceLimits,
) -> Result<SingularitySet, EngineError> {
    let parts = partition(expr, variable, limits)?
        .into_iter()
        .filter(|(_, class)| *class == SignClass::Undefined)
        .map(|(region, _)| region.into_set())
        .collect();
    Ok(SingularitySet::new(SolutionSet::from_parts(parts)))
}

fn accepts(relation: Relation, class: SignClass) -> bool {
    match class {
        SignClass::Positive => relation.holds(Ordering::Greater),
        SignClass::Negative => relation.holds(Ordering::Less),
        SignClass::Zero => relation.holds(Ordering::Equal),
        SignClass::Undefined => false,
    }
}

/// Classified regions in increasing order, covering ℝ exactly once
pub fn partition(
    expr: &Expr,
    variable: &Variable,
    limits: &ResourceLimits,
) -> Result<Vec<(Region, SignClass)>, EngineError> {
    let foreign: Vec<String> = expr
        .symbols()
        .into_iter()
        .filter(|s| s != variable)
        .map(|s| s.to_string())
        .collect();
    if !foreign.is_empty() {
        return Err(EngineError::Unsupported(format!(
            "{} contains symbols other than {}: {}",
            expr,
            variable,
            foreign.join(", ")
        )));
    }

    let points = critical_points(expr, variable, limits)?;
    debug!(expression = %expr, critical_points = points.len(), "partitioning real line");

    let mut regions = Vec::with_capacity(2 * points.len() + 1);
    if points.is_empty() {
        let class = classify_at(expr, variable, &RealNumber::zero(), limits)?;
        regions.push((
            Region::Open {
                min: Bound::Unbounded,
                max: Bound::Unbounded,
            },
            class,
        ));
        return Ok(regions);
    }

    let mut previous: Option<&RealNumber> = None;
    for point in &points {
        let sample = match previous {
            None => point.rational_below(),
            Some(lower) => RealNumber::rational_between(lower, point),
        };
        let class = classify_at(expr, variable, &RealNumber::from_rational(sample), limits)?;
        let min = previous.map_or(Bound::Unbounded, |p| Bound::Exclusive(p.clone()));
        regions.push((
            Region::Open {
                min,
                max: Bound::Exclusive(point.clone()),
            },
            class,
        ));
        regions.push((Region::Point(point.clone()), classify_at(expr, variable, point, limits)?));
        previous = Some(point);
    }
    if let Some(last) = previous {
        let sample = RealNumber::from_rational(last.rational_above());
        regions.push((
            Region::Open {
                min: Bound::Exclusive(last.clone()),
                max: Bound::Unbounded,
            },
            classify_at(expr, variable, &sample, limits)?,
        ));
    }
    Ok(regions)
}

fn classify_at(
    expr: &Expr,
    variable: &Variable,
    at: &RealNumber,
    limits: &ResourceLimits,
) -> Result<SignClass, EngineError> {
    if !at.is_rational() {
        if let Some(class) = classify_fraction_at(expr, variable, at, limits)? {
            return Ok(class);
        }
    }
    Ok(match evaluate(expr, Some((variable, at)))? {
        None => SignClass::Undefined,
        Some(value) => sign_class(value.signum()),
    })
}

fn sign_class(sign: i8) -> SignClass {
    match sign {
        1 => SignClass::Positive,
        -1 => SignClass::Negative,
        _ => SignClass::Zero,
    }
}

/// Class at an irrational point from the signs of the reduced numerator and
/// denominator; `None` when `expr` is not a rational function of `variable`
fn classify_fraction_at(
    expr: &Expr,
    variable: &Variable,
    at: &RealNumber,
    limits: &ResourceLimits,
) -> Result<Option<SignClass>, EngineError> {
    let Ok(function) = to_rational_function(expr, limits) else {
        return Ok(None);
    };
    let mut divisors = vec![function.denominator().clone()];
    for divisor in divisor_expressions(expr, limits) {
        match to_rational_function(&divisor, limits) {
            Ok(function) => divisors.push(function.numerator().clone()),
            Err(EngineError::Undefined(_)) => return Ok(Some(SignClass::Undefined)),
            Err(err) => return Err(err),
        }
    }
    for divisor in &divisors {
        let Some(divisor) = divisor.to_univariate(variable) else {
            return Ok(None);
        };
        if at.polynomial_sign(&divisor)? == 0 {
            return Ok(Some(SignClass::Undefined));
        }
    }
    let (Some(numerator), Some(denominator)) = (
        function.numerator().to_univariate(variable),
        function.denominator().to_univariate(variable),
    ) else {
        return Ok(None);
    };
    let sign = at.polynomial_sign(&numerator)? * at.polynomial_sign(&denominator)?;
    Ok(Some(sign_class(sign)))
}

/// Sorted, distinct points where the sign of `expr` may change
fn critical_points(
    expr: &Expr,
    variable: &Variable,
    limits: &ResourceLimits,
) -> Result<Vec<RealNumber>, EngineError> {
    let mut guards = Vec::new();
    collect_guards(expr, &mut guards);
    let mut breakpoints = Vec::new();
    for guard in &guards {
        breakpoints.extend(critical_points(guard, variable, limits)?);
    }
    breakpoints.sort();
    breakpoints.dedup();

    // Between breakpoints every branch choice is fixed
    let mut points = breakpoints.clone();
    let mut lower: Option<&RealNumber> = None;
    for upper in breakpoints.iter().map(Some).chain(std::iter::once(None)) {
        let sample = match (lower, upper) {
            (None, None) => RealNumber::zero(),
            (None, Some(u)) => RealNumber::from_rational(u.rational_below()),
            (Some(l), None) => RealNumber::from_rational(l.rational_above()),
            (Some(l), Some(u)) => RealNumber::from_rational(RealNumber::rational_between(l, u)),
        };
        if let Some(branch_free) = select_branches(expr, variable, &sample)? {
            let inside = |p: &RealNumber| {
                lower.is_none_or(|l| p > l) && upper.is_none_or(|u| p < u)
            };
            points.extend(
                branch_free_points(&branch_free, variable, limits)?
                    .into_iter()
                    .filter(|p| inside(p)),
            );
        }
        lower = upper;
    }
    points.sort();
    points.dedup();
    Ok(points)
}

/// Outermost `abs` arguments and piecewise condition differences
fn collect_guards(expr: &Expr, guards: &mut Vec<Expr>) {
    match expr {
        Expr::Number(_) | Expr::Symbol(_) => {}
        Expr::Arithmetic(l, _, r) => {
            collect_guards(l, guards);
            collect_guards(r, guards);
        }
        Expr::Negation(inner) => collect_guards(inner, guards),
        Expr::Abs(inner) => guards.push(inner.as_ref().clone()),
        Expr::Piecewise(pw) => {
            for branch in &pw.branches {
                for (l, r) in branch.condition.comparisons() {
                    guards.push(Expr::sub(l.clone(), r.clone()));
                }
                collect_guards(&branch.value, guards);
            }
        }
    }
}

/// The branch-free form of `expr` valid around `sample`; `None` when no
/// piecewise branch applies there
fn select_branches(
    expr: &Expr,
    variable: &Variable,
    sample: &RealNumber,
) -> Result<Option<Expr>, EngineError> {
    match expr {
        Expr::Number(_) | Expr::Symbol(_) => Ok(Some(expr.clone())),
        Expr::Arithmetic(l, op, r) => {
            let (Some(l), Some(r)) = (
                select_branches(l, variable, sample)?,
                select_branches(r, variable, sample)?,
            ) else {
                return Ok(None);
            };
            Ok(Some(Expr::binary(l, *op, r)))
        }
        Expr::Negation(inner) => Ok(select_branches(inner, variable, sample)?.map(Expr::negate)),
        Expr::Abs(inner) => {
            let Some(inner) = select_branches(inner, variable, sample)? else {
                return Ok(None);
            };
            let negative = evaluate(&inner, Some((variable, sample)))?
                .is_some_and(|v| v.signum() < 0);
            Ok(Some(if negative { Expr::negate(inner) } else { inner }))
        }
        Expr::Piecewise(pw) => {
            for branch in &pw.branches {
                if evaluate_condition(&branch.condition, Some((variable, sample)))? == Some(true) {
                    return select_branches(&branch.value, variable, sample);
                }
            }
            Ok(None)
        }
    }
}

/// Zeros of the numerator and of every divisor of a branch-free expression
fn branch_free_points(
    expr: &Expr,
    variable: &Variable,
    limits: &ResourceLimits,
) -> Result<Vec<RealNumber>, EngineError> {
    let polynomials = if has_radicals(expr, limits) {
        radical_polynomials(expr, limits)?
    } else {
        rational_polynomials(expr, limits)?
    };

    let mut points = Vec::new();
    for polynomial in polynomials {
        if polynomial.is_zero() {
            continue;
        }
        let Some(univariate) = polynomial.to_univariate(variable) else {
            continue;
        };
        points.extend(real_roots(&univariate)?);
    }
    Ok(points)
}

fn rational_polynomials(
    expr: &Expr,
    limits: &ResourceLimits,
) -> Result<Vec<Polynomial>, EngineError> {
    let mut polynomials = Vec::new();
    match to_rational_function(expr, limits) {
        Ok(function) => {
            polynomials.push(function.numerator().clone());
            polynomials.push(function.denominator().clone());
        }
        // Undefined on the whole region: evaluation classifies it
        Err(EngineError::Undefined(_)) => return Ok(Vec::new()),
        Err(err) => return Err(err),
    }
    for divisor in divisor_expressions(expr, limits) {
        match to_rational_function(&divisor, limits) {
            Ok(function) => polynomials.push(function.numerator().clone()),
            Err(EngineError::Undefined(_)) => {}
            Err(err) => return Err(err),
        }
    }
    Ok(polynomials)
}

fn radical_polynomials(
    expr: &Expr,
    limits: &ResourceLimits,
) -> Result<Vec<Polynomial>, EngineError> {
    let mut field = RadicalField::new(limits);
    let element = match field.convert(expr) {
        Ok(element) => element,
        Err(EngineError::Undefined(_)) => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    let mut parts = vec![element.numerator().clone(), element.denominator().clone()];
    for divisor in divisor_expressions(expr, limits) {
        match field.convert(&divisor) {
            Ok(function) => parts.push(function.numerator().clone()),
            Err(EngineError::Undefined(_)) => {}
            Err(err) => return Err(err),
        }
    }

    let mut polynomials = field.radicand_boundaries()?;
    for part in parts {
        let norm = field.norm(&part)?;
        if norm.is_zero() && !part.is_zero() {
            return Err(EngineError::Unsupported(format!(
                "cannot separate the branches of the radicals in {}",
                expr
            )));
        }
        polynomials.push(norm.numerator().clone());
        polynomials.push(norm.denominator().clone());
    }
    Ok(polynomials)
}

/// Every divisor and every base raised to a negative power
fn divisor_expressions(expr: &Expr, limits: &ResourceLimits) -> Vec<Expr> {
    let mut divisors = Vec::new();
    collect_divisors(expr, limits, &mut divisors);
    divisors
}

fn collect_divisors(expr: &Expr, limits: &ResourceLimits, divisors: &mut Vec<Expr>) {
    match expr {
        Expr::Number(_) | Expr::Symbol(_) | Expr::Piecewise(_) => {}
        Expr::Negation(inner) | Expr::Abs(inner) => collect_divisors(inner, limits, divisors),
        Expr::Arithmetic(l, op, r) => {
            collect_divisors(l, limits, divisors);
            collect_divisors(r, limits, divisors);
            match op {
                ArithmeticOperation::Divide => divisors.push(r.as_ref().clone()),
                ArithmeticOperation::Power
                    if constant_exponent(r, limits).is_ok_and(|e| e.is_negative()) =>
                {
                    divisors.push(l.as_ref().clone())
                }
                _ => {}
            }
        }
    }
}
