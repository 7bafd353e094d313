//! # Calculo
//!
//! **Exact single-variable calculus**
//!
//! Calculo studies real functions of one variable: where an expression is
//! positive, negative, zero or undefined, the solution set of an inequality,
//! limits at finite points and at infinity, derivatives from the limit
//! definition and continuity at a point. Every answer is exact.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use calculo::{limit_at, Engine, Point, Variable};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Engine::new();
//!     let f = engine.parse_expression("(x**2 - 4)/(x - 2)")?;
//!
//!     let value = limit_at(&engine, &f, &Variable::new("x"), &Point::integer(2))?;
//!     assert_eq!(value.to_string(), "4");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Expressions
//!
//! Rational expressions with integer or rational constant powers,
//! `sqrt(...)`, `abs(...)` and `piecewise((value, condition), ..., default)`. Variables are single
//! letters; `2x` and `xy` are products.
//!
//! ## Engines
//!
//! The analysis functions are generic over [`SymbolicEngine`], so callers can
//! supply their own engine. Engine errors are reported as a [`Failure`] with
//! an [`ErrorKind`] and the engine diagnostic; an engine that panics is
//! reported as [`ErrorKind::EngineFault`].

pub mod algebra;
pub mod analysis;
pub mod ast;
pub mod engine;
pub mod error;
pub mod numeric;
pub mod parser;
pub mod resource_limits;
pub mod response;
pub mod semantic;
pub mod solution;

pub use analysis::{
    check_continuity, derivative_by_definition, limit_at, sign_study, solve_inequality,
    ContinuityReport, Discontinuity, Quantity, SignReport, Verdict,
};
pub use ast::Span;
pub use engine::{Engine, SymbolicEngine};
pub use error::{CalcError, EngineError, ErrorKind, Failure};
pub use numeric::RealNumber;
pub use parser::{parse_expression, parse_point, parse_relation, parse_variable};
pub use resource_limits::ResourceLimits;
pub use response::AnalysisResult;
pub use semantic::*;
pub use solution::{Bound, SingularitySet, SolutionSet};

/// Result type for parsing and input validation
pub type CalcResult<T> = Result<T, CalcError>;

#[cfg(test)]
mod tests;
