use calculo::{
    check_continuity, derivative_by_definition, limit_at, sign_study, solve_inequality,
    Discontinuity, Engine, ErrorKind, Point, Quantity, Relation, SolutionSet, Value, Variable,
    Verdict,
};

fn x() -> Variable {
    Variable::new("x")
}

fn h() -> Variable {
    Variable::new("h")
}

fn known(quantity: &Quantity) -> String {
    match quantity {
        Quantity::Known(value) => value.to_string(),
        Quantity::Unavailable(reason) => panic!("quantity unavailable: {}", reason),
    }
}

#[test]
fn sign_study_of_a_rational_function() {
    let engine = Engine::new();
    let f = engine.parse_expression("(2 - x)/(3 - x)").unwrap();
    let report = sign_study(&engine, &f, &x()).unwrap();

    assert_eq!(report.positive.to_string(), "(-∞, 2) ∪ (3, +∞)");
    assert_eq!(report.negative.to_string(), "(2, 3)");
    assert_eq!(report.zero.to_string(), "{2}");
    assert_eq!(report.undefined.to_string(), "{3}");
}

#[test]
fn sign_study_with_irrational_roots() {
    let engine = Engine::new();
    let f = engine.parse_expression("x**3 - 2").unwrap();
    let report = sign_study(&engine, &f, &x()).unwrap();
    assert_eq!(report.zero.to_string(), "{CRootOf(x**3 - 2, 0)}");
    assert_eq!(report.positive.to_string(), "(CRootOf(x**3 - 2, 0), +∞)");

    let g = engine.parse_expression("x**5 - x - 1").unwrap();
    let report = sign_study(&engine, &g, &x()).unwrap();
    assert_eq!(report.negative.to_string(), "(-∞, CRootOf(x**5 - x - 1, 0))");
}

#[test]
fn sign_study_sets_partition_the_line() {
    let engine = Engine::new();
    for input in ["(2 - x)/(3 - x)", "x**3 - x", "1/(x**2 - 2)", "abs(x - 1) - 2"] {
        let f = engine.parse_expression(input).unwrap();
        let report = sign_study(&engine, &f, &x()).unwrap();
        let sets = [
            report.positive.clone(),
            report.negative.clone(),
            report.zero.clone(),
            report.undefined.as_set().clone(),
        ];
        for (i, a) in sets.iter().enumerate() {
            for b in sets.iter().skip(i + 1) {
                assert!(
                    a.clone().intersection(b.clone()).is_empty(),
                    "{}: {} and {} overlap",
                    input,
                    a,
                    b
                );
            }
        }
        let union = sets
            .into_iter()
            .fold(SolutionSet::Empty, |acc, set| acc.union(set));
        assert_eq!(union, SolutionSet::Reals, "{} does not cover ℝ", input);
    }
}

#[test]
fn removable_discontinuity_limit() {
    let engine = Engine::new();
    let f = engine.parse_expression("(x**2 - 4)/(x - 2)").unwrap();
    let value = limit_at(&engine, &f, &x(), &Point::integer(2)).unwrap();
    assert_eq!(value, Value::number(4));
}

#[test]
fn limit_that_does_not_exist() {
    let engine = Engine::new();
    let f = engine.parse_expression("1/x").unwrap();
    let failure = limit_at(&engine, &f, &x(), &Point::integer(0)).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::LimitFailure);
    assert!(failure.message.contains("does not exist"), "{}", failure.message);
}

#[test]
fn limit_at_infinity() {
    let engine = Engine::new();
    let f = engine.parse_expression("(3x**2 - x)/(1 - x**2)").unwrap();
    let value = limit_at(&engine, &f, &x(), &Point::PositiveInfinity).unwrap();
    assert_eq!(value.to_string(), "-3");
}

#[test]
fn derivative_of_square() {
    let engine = Engine::new();
    let f = engine.parse_expression("x**2").unwrap();
    let derivative = derivative_by_definition(&engine, &f, &x(), &h()).unwrap();
    assert_eq!(derivative.to_string(), "2*x");
}

#[test]
fn derivatives_of_other_functions() {
    let engine = Engine::new();
    let cases = [
        ("x**3", "3*x**2"),
        ("1/x", "-1/x**2"),
        ("5x + 7", "5"),
        ("4", "0"),
    ];
    for (input, expected) in cases {
        let f = engine.parse_expression(input).unwrap();
        let derivative = derivative_by_definition(&engine, &f, &x(), &h()).unwrap();
        assert_eq!(derivative.to_string(), expected, "derivative of {}", input);
    }
}

#[test]
fn derivative_of_abs_is_not_determined() {
    let engine = Engine::new();
    let f = engine.parse_expression("abs(x)").unwrap();
    let failure = derivative_by_definition(&engine, &f, &x(), &h()).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::DerivativeFailure);
    for fragment in ["abs(x + h)", "h approaches 0", "the sign of x,"] {
        assert!(failure.message.contains(fragment), "{}", failure.message);
    }
}

#[test]
fn derivative_of_piecewise_names_the_branch_condition() {
    let engine = Engine::new();
    let f = engine
        .parse_expression("piecewise((x**2, x <= 1), 2x)")
        .unwrap();
    let failure = derivative_by_definition(&engine, &f, &x(), &h()).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::DerivativeFailure);
    for fragment in ["x + h <= 1", "h approaches 0 from above", "x - 1"] {
        assert!(failure.message.contains(fragment), "{}", failure.message);
    }
}

#[test]
fn derivative_of_square_roots() {
    let engine = Engine::new();
    for (input, expected) in [
        ("sqrt(x)", "1/(2*sqrt(x))"),
        ("x**(3/2)", "3*sqrt(x)/2"),
    ] {
        let f = engine.parse_expression(input).unwrap();
        let derivative = derivative_by_definition(&engine, &f, &x(), &h()).unwrap();
        assert_eq!(derivative.to_string(), expected, "{}", input);
    }
}

#[test]
fn derivative_increment_must_be_fresh() {
    let engine = Engine::new();
    let f = engine.parse_expression("x*h").unwrap();
    let failure = derivative_by_definition(&engine, &f, &x(), &h()).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::DerivativeFailure);

    let g = engine.parse_expression("x**2").unwrap();
    let failure = derivative_by_definition(&engine, &g, &x(), &x()).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::DerivativeFailure);
}

#[test]
fn continuity_of_square_at_one() {
    let engine = Engine::new();
    let f = engine.parse_expression("x**2").unwrap();
    let report = check_continuity(&engine, &f, &x(), &Point::integer(1)).unwrap();

    assert_eq!(known(&report.right_limit), "1");
    assert_eq!(known(&report.left_limit), "1");
    assert_eq!(known(&report.value), "1");
    assert_eq!(report.verdict, Verdict::Continuous);
    assert!(report.is_continuous());
}

#[test]
fn continuity_of_piecewise_jump() {
    let engine = Engine::new();
    let f = engine
        .parse_expression("piecewise((2x, x <= 1), 1)")
        .unwrap();
    let report = check_continuity(&engine, &f, &x(), &Point::integer(1)).unwrap();

    assert_eq!(known(&report.right_limit), "1");
    assert_eq!(known(&report.left_limit), "2");
    assert_eq!(known(&report.value), "2");
    assert_eq!(
        report.verdict,
        Verdict::Discontinuous(Discontinuity::Jump)
    );
    assert!(!report.is_continuous());
}

#[test]
fn continuity_with_removable_gap() {
    let engine = Engine::new();
    let f = engine
        .parse_expression("piecewise(((x**2 - 1)/(x - 1), x != 1), 5)")
        .unwrap();
    let report = check_continuity(&engine, &f, &x(), &Point::integer(1)).unwrap();

    assert_eq!(known(&report.right_limit), "2");
    assert_eq!(known(&report.left_limit), "2");
    assert_eq!(known(&report.value), "5");
    assert_eq!(
        report.verdict,
        Verdict::Discontinuous(Discontinuity::Removable)
    );
}

#[test]
fn continuity_where_undefined() {
    let engine = Engine::new();
    let f = engine.parse_expression("1/x").unwrap();
    let report = check_continuity(&engine, &f, &x(), &Point::integer(0)).unwrap();

    assert_eq!(known(&report.right_limit), "oo");
    assert_eq!(known(&report.left_limit), "-oo");
    assert!(matches!(report.value, Quantity::Unavailable(_)));
    assert_eq!(
        report.verdict,
        Verdict::Discontinuous(Discontinuity::UndefinedAtPoint)
    );
}

#[test]
fn continuity_with_infinite_limit() {
    let engine = Engine::new();
    let f = engine
        .parse_expression("piecewise((1/x**2, x != 0), 0)")
        .unwrap();
    let report = check_continuity(&engine, &f, &x(), &Point::integer(0)).unwrap();
    assert_eq!(known(&report.value), "0");
    assert_eq!(
        report.verdict,
        Verdict::Discontinuous(Discontinuity::Infinite)
    );
}

#[test]
fn continuity_is_checked_at_finite_points() {
    let engine = Engine::new();
    let f = engine.parse_expression("x").unwrap();
    let failure = check_continuity(&engine, &f, &x(), &Point::PositiveInfinity).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::AnalysisFailure);
}

#[test]
fn solve_inequality_relations() {
    let engine = Engine::new();
    let f = engine.parse_expression("x**2 - 4").unwrap();
    let cases = [
        (Relation::LessThan, "(-2, 2)"),
        (Relation::LessThanOrEqual, "[-2, 2]"),
        (Relation::GreaterThan, "(-∞, -2) ∪ (2, +∞)"),
        (Relation::GreaterThanOrEqual, "(-∞, -2] ∪ [2, +∞)"),
    ];
    for (relation, expected) in cases {
        let set = solve_inequality(&engine, &f, &x(), relation).unwrap();
        assert_eq!(set.to_string(), expected, "x**2 - 4 {} 0", relation);
    }
}

#[test]
fn unrecognized_relation_is_invalid() {
    let engine = Engine::new();
    let f = engine.parse_expression("x - 1").unwrap();
    for relation in [Relation::Equal, Relation::NotEqual] {
        let failure = solve_inequality(&engine, &f, &x(), relation).unwrap_err();
        assert_eq!(failure.kind, ErrorKind::InvalidRelation);
    }
    let failure = calculo::parse_relation("≈").unwrap_err();
    assert_eq!(failure.kind, ErrorKind::InvalidRelation);
}

#[test]
fn solve_failure_keeps_engine_message() {
    let engine = Engine::new();
    let f = engine.parse_expression("x + y").unwrap();
    let failure = solve_inequality(&engine, &f, &x(), Relation::GreaterThan).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::SolveFailure);
    assert!(
        failure.message.contains("symbols other than"),
        "{}",
        failure.message
    );
}

#[test]
fn analyses_are_idempotent() {
    let engine = Engine::new();
    let f = engine
        .parse_expression("piecewise((2x, x <= 1), 1)")
        .unwrap();
    let g = engine.parse_expression("(2 - x)/(3 - x)").unwrap();
    let one = Point::integer(1);

    assert_eq!(sign_study(&engine, &g, &x()), sign_study(&engine, &g, &x()));
    assert_eq!(
        limit_at(&engine, &f, &x(), &one),
        limit_at(&engine, &f, &x(), &one)
    );
    assert_eq!(
        derivative_by_definition(&engine, &g, &x(), &h()),
        derivative_by_definition(&engine, &g, &x(), &h())
    );
    assert_eq!(
        check_continuity(&engine, &f, &x(), &one),
        check_continuity(&engine, &f, &x(), &one)
    );
}

#[test]
fn engine_is_shared_across_threads() {
    let engine = Engine::new();
    let f = engine.parse_expression("(x**2 - 4)/(x - 2)").unwrap();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| limit_at(&engine, &f, &x(), &Point::integer(2))))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(Value::number(4)));
        }
    });
}
