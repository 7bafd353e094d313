//! Sign studies, limits, derivatives by definition and continuity checks
//!
//! Every operation is a pure function of its arguments and the engine. Engine
//! errors become a [`Failure`] of the operation's [`ErrorKind`] with the
//! engine diagnostic preserved; a panic inside the engine becomes
//! [`ErrorKind::EngineFault`].

use crate::engine::SymbolicEngine;
use crate::error::{EngineError, ErrorKind, Failure};
use crate::semantic::{Direction, Expr, Point, Relation, Value, Variable};
use crate::solution::{SingularitySet, SolutionSet};
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Positive, negative, zero and undefined sets of one expression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignReport {
    pub expression: Expr,
    pub variable: Variable,
    pub positive: SolutionSet,
    pub negative: SolutionSet,
    pub zero: SolutionSet,
    pub undefined: SingularitySet,
}

/// A quantity of a continuity check that may have failed to compute
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Quantity {
    Known(Value),
    /// Holds the diagnostic explaining why
    Unavailable(String),
}

impl Quantity {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Quantity::Known(value) => Some(value),
            Quantity::Unavailable(_) => None,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Known(value) => write!(f, "{}", value),
            Quantity::Unavailable(reason) => write!(f, "unavailable ({})", reason),
        }
    }
}

/// Why a function is not continuous at a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Discontinuity {
    /// `f(a)` has no value
    UndefinedAtPoint,
    /// Both one-sided limits agree but differ from `f(a)`
    Removable,
    /// The one-sided limits are finite and differ
    Jump,
    /// A one-sided limit is infinite
    Infinite,
    /// A one-sided limit could not be computed
    Undetermined,
}

impl Discontinuity {
    pub fn description(&self) -> &'static str {
        match self {
            Discontinuity::UndefinedAtPoint => "undefined at point",
            Discontinuity::Removable => "removable",
            Discontinuity::Jump => "jump",
            Discontinuity::Infinite => "infinite",
            Discontinuity::Undetermined => "limit not determined",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "kind", rename_all = "snake_case")]
pub enum Verdict {
    Continuous,
    Discontinuous(Discontinuity),
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Continuous => write!(f, "continuous"),
            Verdict::Discontinuous(kind) => write!(f, "discontinuous ({})", kind.description()),
        }
    }
}

/// Right limit, left limit and value at a point, each computed independently
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinuityReport {
    pub function: Expr,
    pub variable: Variable,
    pub point: Point,
    pub right_limit: Quantity,
    pub left_limit: Quantity,
    pub value: Quantity,
    pub verdict: Verdict,
}

impl ContinuityReport {
    pub fn is_continuous(&self) -> bool {
        self.verdict == Verdict::Continuous
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run one engine call, mapping its error to `kind` and a panic to `EngineFault`
fn guarded<T>(
    kind: ErrorKind,
    call: impl FnOnce() -> Result<T, EngineError>,
) -> Result<T, Failure> {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(Failure::new(kind, err.to_string())),
        Err(payload) => Err(Failure::new(
            ErrorKind::EngineFault,
            format!("the engine crashed: {}", panic_message(payload)),
        )),
    }
}

fn logged<T>(result: Result<T, Failure>) -> Result<T, Failure> {
    if let Err(failure) = &result {
        warn!(kind = %failure.kind, message = %failure.message, "analysis failed");
    }
    result
}

/// Solve `expr relation 0` over the reals
pub fn solve_inequality<E: SymbolicEngine + ?Sized>(
    engine: &E,
    expr: &Expr,
    variable: &Variable,
    relation: Relation,
) -> Result<SolutionSet, Failure> {
    debug!(expression = %expr, %variable, %relation, "solve inequality");
    if !relation.is_order() {
        return logged(Err(Failure::new(
            ErrorKind::InvalidRelation,
            format!(
                "'{}' is not an inequality (expected one of <, >, <=, >=)",
                relation
            ),
        )));
    }
    logged(guarded(ErrorKind::SolveFailure, || {
        engine.solve(expr, variable, relation)
    }))
}

/// Where `expr` is positive, negative, zero and undefined
pub fn sign_study<E: SymbolicEngine + ?Sized>(
    engine: &E,
    expr: &Expr,
    variable: &Variable,
) -> Result<SignReport, Failure> {
    debug!(expression = %expr, %variable, "sign study");
    logged(guarded(ErrorKind::AnalysisFailure, || {
        Ok(SignReport {
            expression: expr.clone(),
            variable: variable.clone(),
            positive: engine.solve(expr, variable, Relation::GreaterThan)?,
            negative: engine.solve(expr, variable, Relation::LessThan)?,
            zero: engine.solve(expr, variable, Relation::Equal)?,
            undefined: engine.singularities(expr, variable)?,
        })
    }))
}

/// Two-sided limit at a finite point, or the limit at ±∞
pub fn limit_at<E: SymbolicEngine + ?Sized>(
    engine: &E,
    expr: &Expr,
    variable: &Variable,
    point: &Point,
) -> Result<Value, Failure> {
    debug!(expression = %expr, %variable, %point, "limit");
    logged(guarded(ErrorKind::LimitFailure, || {
        engine.limit(expr, variable, point, Direction::TwoSided)
    }))
}

/// `lim h→0 (f(x+h) − f(x)) / h`
pub fn derivative_by_definition<E: SymbolicEngine + ?Sized>(
    engine: &E,
    function: &Expr,
    variable: &Variable,
    increment: &Variable,
) -> Result<Value, Failure> {
    debug!(function = %function, %variable, %increment, "derivative by definition");
    if increment == variable || function.contains_symbol(increment) {
        return logged(Err(Failure::new(
            ErrorKind::DerivativeFailure,
            format!(
                "the increment '{}' must be a symbol that does not occur in {} (variable {})",
                increment, function, variable
            ),
        )));
    }
    logged(guarded(ErrorKind::DerivativeFailure, || {
        let moved = Expr::add(Expr::symbol(variable), Expr::symbol(increment));
        let shifted = engine.substitute(function, variable, &moved)?;
        let quotient = Expr::div(
            Expr::sub(shifted, function.clone()),
            Expr::symbol(increment),
        );
        debug!(%quotient, "difference quotient");
        engine.limit(&quotient, increment, &Point::integer(0), Direction::TwoSided)
    }))
}

/// Compare the one-sided limits with the value at a finite point
pub fn check_continuity<E: SymbolicEngine + ?Sized>(
    engine: &E,
    function: &Expr,
    variable: &Variable,
    point: &Point,
) -> Result<ContinuityReport, Failure> {
    debug!(function = %function, %variable, %point, "continuity check");
    let Some(at) = point.to_expr() else {
        return logged(Err(Failure::new(
            ErrorKind::AnalysisFailure,
            format!("continuity is checked at finite points, not at {}", point),
        )));
    };

    let quantity = |result: Result<Value, Failure>| match result {
        Ok(value) => Quantity::Known(value),
        Err(failure) => {
            debug!(kind = %failure.kind, message = %failure.message, "quantity unavailable");
            Quantity::Unavailable(failure.message)
        }
    };
    let right_limit = quantity(guarded(ErrorKind::LimitFailure, || {
        engine.limit(function, variable, point, Direction::Right)
    }));
    let left_limit = quantity(guarded(ErrorKind::LimitFailure, || {
        engine.limit(function, variable, point, Direction::Left)
    }));
    let value = quantity(guarded(ErrorKind::AnalysisFailure, || {
        let substituted = engine.substitute(function, variable, &at)?;
        engine.evaluate(&substituted)
    }));

    let verdict = logged(guarded(ErrorKind::AnalysisFailure, || {
        Ok(classify(engine, &right_limit, &left_limit, &value))
    }))?;

    Ok(ContinuityReport {
        function: function.clone(),
        variable: variable.clone(),
        point: point.clone(),
        right_limit,
        left_limit,
        value,
        verdict,
    })
}

fn classify<E: SymbolicEngine + ?Sized>(
    engine: &E,
    right: &Quantity,
    left: &Quantity,
    value: &Quantity,
) -> Verdict {
    let (Some(right), Some(left)) = (right.value(), left.value()) else {
        return match value {
            Quantity::Unavailable(_) => Verdict::Discontinuous(Discontinuity::UndefinedAtPoint),
            Quantity::Known(_) => Verdict::Discontinuous(Discontinuity::Undetermined),
        };
    };
    let Some(value) = value.value() else {
        return Verdict::Discontinuous(Discontinuity::UndefinedAtPoint);
    };

    let sides_agree = engine.equals(right, left);
    if sides_agree && engine.equals(right, value) {
        return Verdict::Continuous;
    }
    if !right.is_finite() || !left.is_finite() {
        Verdict::Discontinuous(Discontinuity::Infinite)
    } else if sides_agree {
        Verdict::Discontinuous(Discontinuity::Removable)
    } else {
        Verdict::Discontinuous(Discontinuity::Jump)
    }
}
