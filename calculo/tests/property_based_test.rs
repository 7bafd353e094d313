use calculo::{
    derivative_by_definition, limit_at, sign_study, solve_inequality, Engine, Point, Relation,
    SolutionSet, Value, Variable,
};
use proptest::prelude::*;

fn x() -> Variable {
    Variable::new("x")
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_linear_inequality_threshold(a in 1i64..20, b in -50i64..50) {
        let engine = Engine::new();
        let f = engine.parse_expression(&format!("{}x - ({})", a, b)).unwrap();
        let set = solve_inequality(&engine, &f, &x(), Relation::GreaterThan).unwrap();
        let root = calculo::RealNumber::from_rational(
            num_rational::BigRational::new(b.into(), a.into()),
        );
        prop_assert_eq!(set, SolutionSet::above(calculo::Bound::Exclusive(root)));
    }

    #[test]
    fn prop_complementary_relations_cover_the_line(r1 in -10i64..10, r2 in -10i64..10) {
        let engine = Engine::new();
        let f = engine
            .parse_expression(&format!("(x - ({}))*(x - ({}))", r1, r2))
            .unwrap();
        let below = solve_inequality(&engine, &f, &x(), Relation::LessThan).unwrap();
        let above = solve_inequality(&engine, &f, &x(), Relation::GreaterThanOrEqual).unwrap();
        prop_assert!(below.clone().intersection(above.clone()).is_empty());
        prop_assert_eq!(below.union(above), SolutionSet::Reals);
    }

    #[test]
    fn prop_sign_study_is_a_partition(p in -5i64..5, q in -5i64..5) {
        prop_assume!(p != q);
        let engine = Engine::new();
        let f = engine
            .parse_expression(&format!("(x - ({}))/(x - ({}))", p, q))
            .unwrap();
        let report = sign_study(&engine, &f, &x()).unwrap();
        let union = report
            .positive
            .clone()
            .union(report.negative.clone())
            .union(report.zero.clone())
            .union(report.undefined.as_set().clone());
        prop_assert_eq!(union, SolutionSet::Reals);
        prop_assert_eq!(report.undefined.points().len(), 1);
    }

    #[test]
    fn prop_polynomial_limit_is_the_value(a in -20i64..20, b in -20i64..20, c in -20i64..20, at in -10i64..10) {
        let engine = Engine::new();
        let f = engine
            .parse_expression(&format!("({})x**2 + ({})x + ({})", a, b, c))
            .unwrap();
        let value = limit_at(&engine, &f, &x(), &Point::integer(at)).unwrap();
        prop_assert_eq!(value, Value::number(a * at * at + b * at + c));
    }

    #[test]
    fn prop_derivative_of_quadratic(a in -20i64..20, b in -20i64..20, c in -20i64..20) {
        let engine = Engine::new();
        let f = engine
            .parse_expression(&format!("({})x**2 + ({})x + ({})", a, b, c))
            .unwrap();
        let derivative =
            derivative_by_definition(&engine, &f, &x(), &Variable::new("h")).unwrap();
        let expected = engine
            .parse_expression(&format!("2*({})x + ({})", a, b))
            .unwrap();
        prop_assert!(
            engine_equals(&engine, &derivative, &Value::Finite(expected)),
            "derivative was {}",
            derivative
        );
    }
}

fn engine_equals(engine: &Engine, a: &Value, b: &Value) -> bool {
    use calculo::SymbolicEngine;
    engine.equals(a, b)
}
