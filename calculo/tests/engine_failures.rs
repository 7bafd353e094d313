//! Analysis functions against engines that fail or misbehave

use calculo::{
    check_continuity, derivative_by_definition, limit_at, sign_study, solve_inequality,
    Direction, Discontinuity, Engine, EngineError, ErrorKind, Expr, Point, Quantity, Relation,
    SingularitySet, SolutionSet, SymbolicEngine, Value, Variable, Verdict,
};

/// Every call fails with the same engine error
struct FailingEngine;

impl SymbolicEngine for FailingEngine {
    fn solve(&self, _: &Expr, _: &Variable, _: Relation) -> Result<SolutionSet, EngineError> {
        Err(EngineError::Unsupported("solver offline".to_string()))
    }

    fn limit(&self, _: &Expr, _: &Variable, _: &Point, _: Direction) -> Result<Value, EngineError> {
        Err(EngineError::Indeterminate("limit offline".to_string()))
    }

    fn substitute(&self, expr: &Expr, _: &Variable, _: &Expr) -> Result<Expr, EngineError> {
        Ok(expr.clone())
    }

    fn singularities(&self, _: &Expr, _: &Variable) -> Result<SingularitySet, EngineError> {
        Err(EngineError::Unsupported("singularities offline".to_string()))
    }

    fn evaluate(&self, _: &Expr) -> Result<Value, EngineError> {
        Err(EngineError::Undefined("no value".to_string()))
    }

    fn equals(&self, a: &Value, b: &Value) -> bool {
        a == b
    }
}

/// Every call panics
struct CrashingEngine;

impl SymbolicEngine for CrashingEngine {
    fn solve(&self, _: &Expr, _: &Variable, _: Relation) -> Result<SolutionSet, EngineError> {
        panic!("solver crashed")
    }

    fn limit(&self, _: &Expr, _: &Variable, _: &Point, _: Direction) -> Result<Value, EngineError> {
        panic!("limit crashed")
    }

    fn substitute(&self, _: &Expr, _: &Variable, _: &Expr) -> Result<Expr, EngineError> {
        panic!("substitution crashed")
    }

    fn singularities(&self, _: &Expr, _: &Variable) -> Result<SingularitySet, EngineError> {
        panic!("singularities crashed")
    }

    fn evaluate(&self, _: &Expr) -> Result<Value, EngineError> {
        panic!("evaluation crashed")
    }

    fn equals(&self, _: &Value, _: &Value) -> bool {
        panic!("equality crashed")
    }
}

/// Returns equal values in different, unsimplified shapes
struct UnsimplifiedEngine {
    canonical: bool,
}

impl UnsimplifiedEngine {
    fn value(text: &str) -> Value {
        Value::Finite(Engine::new().parse_expression(text).unwrap())
    }
}

impl SymbolicEngine for UnsimplifiedEngine {
    fn solve(&self, _: &Expr, _: &Variable, _: Relation) -> Result<SolutionSet, EngineError> {
        Ok(SolutionSet::Empty)
    }

    fn limit(&self, _: &Expr, _: &Variable, _: &Point, direction: Direction) -> Result<Value, EngineError> {
        Ok(match direction {
            Direction::Right => Self::value("(1 + 1)/2"),
            _ => Self::value("2 - 1"),
        })
    }

    fn substitute(&self, expr: &Expr, _: &Variable, _: &Expr) -> Result<Expr, EngineError> {
        Ok(expr.clone())
    }

    fn singularities(&self, _: &Expr, _: &Variable) -> Result<SingularitySet, EngineError> {
        Ok(SingularitySet::empty())
    }

    fn evaluate(&self, _: &Expr) -> Result<Value, EngineError> {
        Ok(Self::value("1"))
    }

    fn equals(&self, a: &Value, b: &Value) -> bool {
        if self.canonical {
            Engine::new().equals(a, b)
        } else {
            a == b
        }
    }
}

fn x() -> Variable {
    Variable::new("x")
}

fn f() -> Expr {
    Expr::symbol(&x())
}

#[test]
fn engine_errors_map_to_operation_kinds() {
    let engine = FailingEngine;
    let one = Point::integer(1);

    let failure = solve_inequality(&engine, &f(), &x(), Relation::LessThan).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::SolveFailure);
    assert_eq!(failure.message, "unsupported expression: solver offline");

    let failure = sign_study(&engine, &f(), &x()).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::AnalysisFailure);

    let failure = limit_at(&engine, &f(), &x(), &one).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::LimitFailure);
    assert_eq!(failure.message, "cannot be determined: limit offline");

    let failure = derivative_by_definition(&engine, &f(), &x(), &Variable::new("h")).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::DerivativeFailure);
}

#[test]
fn failed_quantities_are_reported_not_hidden() {
    let report = check_continuity(&FailingEngine, &f(), &x(), &Point::integer(1)).unwrap();
    assert!(matches!(report.right_limit, Quantity::Unavailable(ref m) if m.contains("limit offline")));
    assert!(matches!(report.left_limit, Quantity::Unavailable(_)));
    assert!(matches!(report.value, Quantity::Unavailable(ref m) if m.contains("no value")));
    assert_eq!(
        report.verdict,
        Verdict::Discontinuous(Discontinuity::UndefinedAtPoint)
    );
}

#[test]
fn panics_become_engine_faults() {
    let engine = CrashingEngine;
    let one = Point::integer(1);

    let failure = solve_inequality(&engine, &f(), &x(), Relation::GreaterThan).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::EngineFault);
    assert!(failure.message.contains("solver crashed"), "{}", failure.message);

    let failure = sign_study(&engine, &f(), &x()).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::EngineFault);

    let failure = limit_at(&engine, &f(), &x(), &one).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::EngineFault);

    let failure = derivative_by_definition(&engine, &f(), &x(), &Variable::new("h")).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::EngineFault);
}

#[test]
fn continuity_with_crashing_engine() {
    let report = check_continuity(&CrashingEngine, &f(), &x(), &Point::integer(1));
    // Limits and value are unavailable, so the verdict never reaches `equals`
    let report = report.unwrap();
    assert!(matches!(report.right_limit, Quantity::Unavailable(ref m) if m.contains("limit crashed")));
    assert!(!report.is_continuous());
}

#[test]
fn invalid_relation_never_reaches_the_engine() {
    let failure = solve_inequality(&CrashingEngine, &f(), &x(), Relation::Equal).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::InvalidRelation);
}

#[test]
fn structural_equality_misreports_equal_values() {
    let engine = UnsimplifiedEngine { canonical: false };
    let report = check_continuity(&engine, &f(), &x(), &Point::integer(1)).unwrap();
    assert_eq!(report.verdict, Verdict::Discontinuous(Discontinuity::Jump));
}

#[test]
fn canonical_equality_sees_through_unsimplified_values() {
    let engine = UnsimplifiedEngine { canonical: true };
    let report = check_continuity(&engine, &f(), &x(), &Point::integer(1)).unwrap();
    assert_eq!(report.right_limit, Quantity::Known(UnsimplifiedEngine::value("(1 + 1)/2")));
    assert_eq!(report.left_limit, Quantity::Known(UnsimplifiedEngine::value("2 - 1")));
    assert_eq!(report.verdict, Verdict::Continuous);
}
