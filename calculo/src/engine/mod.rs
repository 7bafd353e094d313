//! The symbolic engine
//!
//! Exact engine for rational expressions with rational powers (so `sqrt`
//! and other radicals), `abs` and piecewise parts. Anything outside that
//! class is reported as [`EngineError::Unsupported`]; there is no numeric
//! fallback.

pub mod convert;
pub mod evaluate;
pub mod germ;
pub mod limits;
pub mod radical;
pub mod series;
pub mod solve;

use crate::error::{CalcError, EngineError};
use crate::parser;
use crate::resource_limits::ResourceLimits;
use crate::semantic::{ArithmeticOperation, Direction, Expr, Point, Relation, Value, Variable};
use crate::solution::{SingularitySet, SolutionSet};
use crate::CalcResult;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};
use radical::RadicalField;

/// Capabilities the analysis layer relies on
///
/// Implementations hold no per-request state, so calls are independent.
pub trait SymbolicEngine: Send + Sync {
    /// Real solutions of `expr relation 0`
    fn solve(
        &self,
        expr: &Expr,
        variable: &Variable,
        relation: Relation,
    ) -> Result<SolutionSet, EngineError>;

    fn limit(
        &self,
        expr: &Expr,
        variable: &Variable,
        point: &Point,
        direction: Direction,
    ) -> Result<Value, EngineError>;

    /// Replace `variable` by `value` everywhere in `expr`
    fn substitute(
        &self,
        expr: &Expr,
        variable: &Variable,
        value: &Expr,
    ) -> Result<Expr, EngineError>;

    fn singularities(&self, expr: &Expr, variable: &Variable)
        -> Result<SingularitySet, EngineError>;

    /// Closed form of a variable-free expression
    ///
    /// Returns [`EngineError::Undefined`] when the expression has no value.
    fn evaluate(&self, expr: &Expr) -> Result<Value, EngineError>;

    /// Canonical value equality
    fn equals(&self, a: &Value, b: &Value) -> bool;
}

/// The built-in exact engine
#[derive(Debug, Clone, Default)]
pub struct Engine {
    limits: ResourceLimits,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom resource limits
    pub fn with_limits(limits: ResourceLimits) -> Self {
        Self { limits }
    }

    /// Get the current resource limits
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Parse user input under this engine's limits
    pub fn parse_expression(&self, text: &str) -> CalcResult<Expr> {
        let expr = parser::parse_expression(text, &self.limits)?;
        self.check(&expr)
            .map_err(|err| CalcError::Engine(err.to_string()))?;
        Ok(expr)
    }

    /// Reject expressions outside the configured resource limits
    fn check(&self, expr: &Expr) -> Result<(), EngineError> {
        let depth = expr.depth();
        if depth > self.limits.max_expression_depth {
            return Err(EngineError::ResourceLimit(format!(
                "expression depth {} exceeds the maximum of {}",
                depth, self.limits.max_expression_depth
            )));
        }
        self.check_node(expr)
    }

    fn check_node(&self, expr: &Expr) -> Result<(), EngineError> {
        match expr {
            Expr::Number(_) | Expr::Symbol(_) => Ok(()),
            Expr::Negation(inner) | Expr::Abs(inner) => self.check_node(inner),
            Expr::Arithmetic(l, op, r) => {
                if *op == ArithmeticOperation::Power {
                    let literal = match r.as_ref() {
                        Expr::Negation(inner) => inner.as_number(),
                        other => other.as_number(),
                    };
                    let exceeds = |part: &BigInt| {
                        part.abs()
                            .to_u32()
                            .is_none_or(|e| e > self.limits.max_polynomial_degree)
                    };
                    let too_large = literal
                        .is_some_and(|n| exceeds(&n.to_integer()) || exceeds(n.denom()));
                    if too_large {
                        return Err(EngineError::ResourceLimit(format!(
                            "exponent {} exceeds the maximum of {}",
                            r, self.limits.max_polynomial_degree
                        )));
                    }
                }
                self.check_node(l)?;
                self.check_node(r)
            }
            Expr::Piecewise(pw) => {
                if pw.branches.len() > self.limits.max_piecewise_branches {
                    return Err(EngineError::ResourceLimit(format!(
                        "{} piecewise branches exceed the maximum of {}",
                        pw.branches.len(),
                        self.limits.max_piecewise_branches
                    )));
                }
                for branch in &pw.branches {
                    self.check_node(&branch.value)?;
                    for (l, r) in branch.condition.comparisons() {
                        self.check_node(l)?;
                        self.check_node(r)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl SymbolicEngine for Engine {
    fn solve(
        &self,
        expr: &Expr,
        variable: &Variable,
        relation: Relation,
    ) -> Result<SolutionSet, EngineError> {
        self.check(expr)?;
        solve::solve(expr, variable, relation, &self.limits)
    }

    fn limit(
        &self,
        expr: &Expr,
        variable: &Variable,
        point: &Point,
        direction: Direction,
    ) -> Result<Value, EngineError> {
        self.check(expr)?;
        limits::limit(expr, variable, point, direction, &self.limits)
    }

    fn substitute(
        &self,
        expr: &Expr,
        variable: &Variable,
        value: &Expr,
    ) -> Result<Expr, EngineError> {
        let substituted = expr.substitute(variable, value);
        self.check(&substituted)?;
        Ok(substituted)
    }

    fn singularities(
        &self,
        expr: &Expr,
        variable: &Variable,
    ) -> Result<SingularitySet, EngineError> {
        self.check(expr)?;
        solve::singularities(expr, variable, &self.limits)
    }

    fn evaluate(&self, expr: &Expr) -> Result<Value, EngineError> {
        self.check(expr)?;
        if let Some(symbol) = expr.symbols().into_iter().next() {
            return Err(EngineError::Unsupported(format!(
                "{} still depends on {}",
                expr, symbol
            )));
        }
        let value = evaluate::evaluate(expr, None)?
            .ok_or_else(|| EngineError::Undefined(format!("{} has no value", expr)))?;
        if let Some(rational) = value.as_rational() {
            return Ok(Value::Finite(Expr::Number(rational.clone())));
        }
        let mut field = RadicalField::new(&self.limits);
        match field.convert(expr) {
            Ok(element) => Ok(Value::Finite(field.to_expr(&element))),
            Err(err) => Err(EngineError::NoClosedForm(format!(
                "{} evaluates to the irrational number {} ({})",
                expr, value, err
            ))),
        }
    }

    fn equals(&self, a: &Value, b: &Value) -> bool {
        limits::same_value(a, b, &self.limits)
    }
}
