use calculo::{check_continuity, sign_study, AnalysisResult, Engine, Point, Variable};
use insta::assert_snapshot;

fn x() -> Variable {
    Variable::new("x")
}

#[test]
fn sign_report_display() {
    let engine = Engine::new();
    let f = engine.parse_expression("(2 - x)/(3 - x)").unwrap();
    let result = AnalysisResult::from(sign_study(&engine, &f, &x()));
    assert_snapshot!(result.to_string(), @r"
    sign of (2 - x)/(3 - x) in x
      positive:  (-∞, 2) ∪ (3, +∞)
      negative:  (2, 3)
      zero:      {2}
      undefined: {3}
    ");
}

#[test]
fn continuity_report_display() {
    let engine = Engine::new();
    let f = engine.parse_expression("piecewise((2x, x <= 1), 1)").unwrap();
    let result = AnalysisResult::from(check_continuity(&engine, &f, &x(), &Point::integer(1)));
    assert_snapshot!(result.to_string(), @r"
    continuity of Piecewise((2*x, x <= 1), (1, True)) at x = 1
      right limit: 1
      left limit:  2
      value:       2
      verdict:     discontinuous (jump)
    ");
}

#[test]
fn failure_display() {
    let engine = Engine::new();
    let f = engine.parse_expression("1/x").unwrap();
    let result = AnalysisResult::from(calculo::limit_at(&engine, &f, &x(), &Point::integer(0)));
    assert!(result.is_failure());
    assert_snapshot!(result.to_string(), @"limit failure: limit does not exist: the limit of 1/x as x -> 0 from the left is -oo, from the right oo");
}

#[test]
fn json_shape() {
    let engine = Engine::new();
    let f = engine.parse_expression("x**2 - 1").unwrap();
    let result = AnalysisResult::from(calculo::solve_inequality(
        &engine,
        &f,
        &x(),
        calculo::Relation::LessThanOrEqual,
    ));
    let json = serde_json::to_string(&result).unwrap();
    assert_snapshot!(json, @r#"{"type":"solution","solution":{"type":"interval","min":{"type":"inclusive","value":"-1"},"max":{"type":"inclusive","value":"1"}}}"#);
}
