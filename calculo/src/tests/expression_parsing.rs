use crate::error::{CalcError, ErrorKind};
use crate::parser::{parse_expression, parse_relation, parse_variable};
use crate::resource_limits::ResourceLimits;
use crate::semantic::{Condition, Expr, Relation, Variable};

fn parse(input: &str) -> Expr {
    parse_expression(input, &ResourceLimits::default())
        .unwrap_or_else(|e| panic!("failed to parse {}: {}", input, e))
}

fn render(input: &str) -> String {
    parse(input).to_string()
}

#[test]
fn test_arithmetic_operations_work() {
    let cases = vec![
        "2 + 3", "2+1", "5 * 6", "5* 6", "7 - 3", "3/2", "2 ^ 3", "2**3", "-x", "+x",
    ];
    for expr in cases {
        let result = parse_expression(expr, &ResourceLimits::default());
        assert!(result.is_ok(), "Failed to parse {}: {:?}", expr, result.err());
    }
}

#[test]
fn test_precedence() {
    assert_eq!(render("1 + 2*x"), "1 + 2*x");
    assert_eq!(render("(1 + 2)*x"), "(1 + 2)*x");
    assert_eq!(render("(x**2 - 4)/(x - 2)"), "(x**2 - 4)/(x - 2)");
    assert_eq!(render("x - (y - 1)"), "x - (y - 1)");
}

#[test]
fn test_power_is_right_associative() {
    let expr = parse("2**3**2");
    assert_eq!(expr, Expr::pow(Expr::number(2), Expr::pow(Expr::number(3), Expr::number(2))));
    assert_eq!(render("x^2"), "x**2");
}

#[test]
fn test_unary_minus_binds_looser_than_power() {
    let expr = parse("-x**2");
    assert_eq!(
        expr,
        Expr::negate(Expr::pow(Expr::symbol(&Variable::new("x")), Expr::number(2)))
    );
    assert_eq!(parse("-2"), Expr::number(-2));
    assert_eq!(render("x**-1"), "x**(-1)");
}

#[test]
fn test_implicit_multiplication() {
    assert_eq!(render("2x"), "2*x");
    assert_eq!(render("2 x"), "2*x");
    assert_eq!(render("x(x + 1)"), "x*(x + 1)");
    assert_eq!(render("(x - 1)(x + 1)"), "(x - 1)*(x + 1)");
    assert_eq!(render("3x**2"), "3*x**2");
}

#[test]
fn test_letter_runs_are_products() {
    let x = Expr::symbol(&Variable::new("x"));
    let y = Expr::symbol(&Variable::new("y"));
    assert_eq!(parse("xy"), Expr::mul(x, y));
}

#[test]
fn test_decimals_are_exact() {
    assert_eq!(render("0.5x"), "1/2*x");
    assert_eq!(render(".25"), "1/4");
    assert_eq!(render("2."), "2");
}

#[test]
fn test_large_integers() {
    let digits = "123456789012345678901234567890123456789";
    assert_eq!(render(digits), digits);
}

#[test]
fn test_abs() {
    assert_eq!(render("abs(x - 1)"), "Abs(x - 1)");
    assert_eq!(render("Abs(x)"), "Abs(x)");
    assert!(parse_expression("abs(x, 1)", &ResourceLimits::default()).is_err());
}

#[test]
fn test_piecewise() {
    let expr = parse("piecewise((2x, x <= 1), 1)");
    let Expr::Piecewise(pw) = &expr else {
        panic!("expected a piecewise expression, got {}", expr);
    };
    assert_eq!(pw.branches.len(), 2);
    assert!(matches!(
        pw.branches[0].condition,
        Condition::Comparison(_, Relation::LessThanOrEqual, _)
    ));
    assert_eq!(pw.branches[1].condition, Condition::Always);
    assert_eq!(expr.to_string(), "Piecewise((2*x, x <= 1), (1, True))");
}

#[test]
fn test_piecewise_default_spellings() {
    let a = parse("piecewise((x, x < 0), (0, true))");
    let b = parse("Piecewise((x, x < 0), (0, otherwise))");
    let c = parse("piecewise((x, x < 0), 0)");
    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn test_piecewise_compound_conditions() {
    let expr = parse("piecewise((1, x > 0 and x < 1), (2, x <= 0 or x >= 1))");
    let Expr::Piecewise(pw) = expr else {
        panic!("expected a piecewise expression");
    };
    assert!(matches!(pw.branches[0].condition, Condition::And(_, _)));
    assert!(matches!(pw.branches[1].condition, Condition::Or(_, _)));
}

#[test]
fn test_piecewise_default_must_be_last() {
    let result = parse_expression("piecewise(1, (x, x < 0))", &ResourceLimits::default());
    assert!(matches!(result, Err(CalcError::Parse(_))));
}

#[test]
fn test_square_root() {
    assert_eq!(parse("sqrt(x)"), Expr::sqrt(Expr::symbol(&Variable::new("x"))));
    assert_eq!(render("sqrt(x**2 + 1) - x"), "sqrt(x**2 + 1) - x");
    assert_eq!(render("1/(2*sqrt(x))"), "1/(2*sqrt(x))");
    assert_eq!(render("sqrt(x)**3"), "sqrt(x)**3");
    assert!(matches!(
        parse_expression("sqrt(x, 2)", &ResourceLimits::default()),
        Err(CalcError::Parse(_))
    ));
}

#[test]
fn test_unknown_function_has_span_and_suggestion() {
    let input = "1 + sin(x)";
    let Err(CalcError::Parse(details)) = parse_expression(input, &ResourceLimits::default())
    else {
        panic!("expected a parse error");
    };
    assert!(details.message.contains("sin"));
    assert_eq!(&input[details.span.start..details.span.end], "sin");
    assert_eq!(
        details.suggestion.as_deref(),
        Some("supported functions: abs, sqrt, piecewise")
    );
}

#[test]
fn test_syntax_errors() {
    for input in ["", "2 +", "(x", "x)", "x ** ", "3 $ 4", "x <= 1"] {
        let result = parse_expression(input, &ResourceLimits::default());
        assert!(
            matches!(result, Err(CalcError::Parse(_))),
            "expected a parse error for {:?}, got {:?}",
            input,
            result
        );
    }
}

#[test]
fn test_input_size_limit() {
    let limits = ResourceLimits {
        max_input_bytes: 8,
        ..ResourceLimits::default()
    };
    let result = parse_expression("x + x + x + x", &limits);
    assert!(matches!(
        result,
        Err(CalcError::ResourceLimitExceeded { ref limit_name, .. }) if limit_name == "max_input_bytes"
    ));
}

#[test]
fn test_nesting_limit() {
    let limits = ResourceLimits {
        max_expression_depth: 5,
        ..ResourceLimits::default()
    };
    let input = format!("{}x{}", "(".repeat(10), ")".repeat(10));
    let result = parse_expression(&input, &limits);
    assert!(matches!(result, Err(CalcError::ResourceLimitExceeded { .. })));
}

#[test]
fn test_sign_chains_count_towards_nesting() {
    let limits = ResourceLimits::default();
    let input = format!("{}x", "-".repeat(4000));
    let result = parse_expression(&input, &limits);
    assert!(matches!(
        result,
        Err(CalcError::ResourceLimitExceeded { ref limit_name, .. }) if limit_name == "max_expression_depth"
    ));

    let input = format!("x{}", "**-x".repeat(1000));
    let result = parse_expression(&input, &limits);
    assert!(matches!(result, Err(CalcError::ResourceLimitExceeded { .. })));
}

#[test]
fn test_short_sign_chains_still_parse() {
    assert_eq!(render("--x"), "-(-x)");
    assert_eq!(render("x - -1"), "x - (-1)");
    let input = format!("{}x", "-+".repeat(20));
    assert!(parse_expression(&input, &ResourceLimits::default()).is_ok());
    let chain = (0..30).map(|_| "x - -x").collect::<Vec<_>>().join(" + ");
    assert!(parse_expression(&chain, &ResourceLimits::default()).is_ok());
}

#[test]
fn test_variables() {
    assert_eq!(parse_variable(" h ").unwrap(), Variable::new("h"));
    assert!(parse_variable("xy").is_err());
    assert!(parse_variable("1").is_err());
    assert!(parse_variable("").is_err());
}

#[test]
fn test_relations() {
    assert_eq!(parse_relation("<").unwrap(), Relation::LessThan);
    assert_eq!(parse_relation("≥").unwrap(), Relation::GreaterThanOrEqual);
    assert_eq!(parse_relation(" <= ").unwrap(), Relation::LessThanOrEqual);
    for token in ["=", "!=", "=>>", "lt", ""] {
        let failure = parse_relation(token).unwrap_err();
        assert_eq!(failure.kind, ErrorKind::InvalidRelation, "token {:?}", token);
    }
}
