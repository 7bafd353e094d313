use crate::error::{ErrorKind, Failure};
use crate::numeric::format_rational;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A named free variable such as `x` or `h`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Variable(String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A symbolic expression over one or more variables
///
/// Expressions are immutable values: every transformation (substitution,
/// simplification) builds a new tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Number(BigRational),
    Symbol(Variable),
    Arithmetic(Box<Expr>, ArithmeticOperation, Box<Expr>),
    Negation(Box<Expr>),
    Abs(Box<Expr>),
    Piecewise(Piecewise),
}

/// Arithmetic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl ArithmeticOperation {
    /// Returns a human-readable name for the operation
    pub fn name(&self) -> &'static str {
        match self {
            ArithmeticOperation::Add => "addition",
            ArithmeticOperation::Subtract => "subtraction",
            ArithmeticOperation::Multiply => "multiplication",
            ArithmeticOperation::Divide => "division",
            ArithmeticOperation::Power => "exponentiation",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOperation::Add => "+",
            ArithmeticOperation::Subtract => "-",
            ArithmeticOperation::Multiply => "*",
            ArithmeticOperation::Divide => "/",
            ArithmeticOperation::Power => "**",
        }
    }
}

/// Relational operators
///
/// Inequalities accept the four order relations; piecewise conditions may
/// also test equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Relation {
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
}

impl Relation {
    /// Returns a human-readable name for the relation
    pub fn name(&self) -> &'static str {
        match self {
            Relation::LessThan => "less than",
            Relation::GreaterThan => "greater than",
            Relation::LessThanOrEqual => "less than or equal",
            Relation::GreaterThanOrEqual => "greater than or equal",
            Relation::Equal => "equal",
            Relation::NotEqual => "not equal",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::LessThan => "<",
            Relation::GreaterThan => ">",
            Relation::LessThanOrEqual => "<=",
            Relation::GreaterThanOrEqual => ">=",
            Relation::Equal => "==",
            Relation::NotEqual => "!=",
        }
    }

    /// One of `<`, `>`, `<=`, `>=`
    pub fn is_order(&self) -> bool {
        !matches!(self, Relation::Equal | Relation::NotEqual)
    }

    /// Whether `lhs rel rhs` holds given the ordering of `lhs` against `rhs`
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Relation::LessThan => ordering == Ordering::Less,
            Relation::GreaterThan => ordering == Ordering::Greater,
            Relation::LessThanOrEqual => ordering != Ordering::Greater,
            Relation::GreaterThanOrEqual => ordering != Ordering::Less,
            Relation::Equal => ordering == Ordering::Equal,
            Relation::NotEqual => ordering != Ordering::Equal,
        }
    }
}

impl FromStr for Relation {
    type Err = Failure;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim() {
            "<" => Ok(Relation::LessThan),
            ">" => Ok(Relation::GreaterThan),
            "<=" | "≤" | "=<" => Ok(Relation::LessThanOrEqual),
            ">=" | "≥" | "=>" => Ok(Relation::GreaterThanOrEqual),
            "==" | "=" => Ok(Relation::Equal),
            "!=" | "≠" | "<>" => Ok(Relation::NotEqual),
            other => Err(Failure::new(
                ErrorKind::InvalidRelation,
                format!(
                    "unrecognized relation '{}' (expected one of <, >, <=, >=)",
                    other
                ),
            )),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A real-valued condition guarding a piecewise branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Comparison(Box<Expr>, Relation, Box<Expr>),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Always,
}

impl Condition {
    pub fn comparison(lhs: Expr, relation: Relation, rhs: Expr) -> Self {
        Condition::Comparison(Box::new(lhs), relation, Box::new(rhs))
    }

    fn substitute(&self, variable: &Variable, replacement: &Expr) -> Condition {
        match self {
            Condition::Comparison(l, rel, r) => Condition::Comparison(
                Box::new(l.substitute(variable, replacement)),
                *rel,
                Box::new(r.substitute(variable, replacement)),
            ),
            Condition::And(a, b) => Condition::And(
                Box::new(a.substitute(variable, replacement)),
                Box::new(b.substitute(variable, replacement)),
            ),
            Condition::Or(a, b) => Condition::Or(
                Box::new(a.substitute(variable, replacement)),
                Box::new(b.substitute(variable, replacement)),
            ),
            Condition::Always => Condition::Always,
        }
    }

    /// The expressions compared anywhere inside this condition
    pub fn comparisons(&self) -> Vec<(&Expr, &Expr)> {
        match self {
            Condition::Comparison(l, _, r) => vec![(l.as_ref(), r.as_ref())],
            Condition::And(a, b) | Condition::Or(a, b) => {
                let mut all = a.comparisons();
                all.extend(b.comparisons());
                all
            }
            Condition::Always => Vec::new(),
        }
    }
}

/// One `(value, condition)` pair of a piecewise expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiecewiseBranch {
    pub value: Expr,
    pub condition: Condition,
}

/// Ordered branches; the first branch whose condition holds supplies the value.
///
/// A trailing default is stored as a branch with [`Condition::Always`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piecewise {
    pub branches: Vec<PiecewiseBranch>,
}

impl Expr {
    pub fn number(value: i64) -> Self {
        Expr::Number(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn rational(value: BigRational) -> Self {
        Expr::Number(value)
    }

    pub fn symbol(variable: &Variable) -> Self {
        Expr::Symbol(variable.clone())
    }

    pub fn binary(lhs: Expr, op: ArithmeticOperation, rhs: Expr) -> Self {
        Expr::Arithmetic(Box::new(lhs), op, Box::new(rhs))
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(lhs, ArithmeticOperation::Add, rhs)
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(lhs, ArithmeticOperation::Subtract, rhs)
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(lhs, ArithmeticOperation::Multiply, rhs)
    }

    pub fn div(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(lhs, ArithmeticOperation::Divide, rhs)
    }

    pub fn pow(base: Expr, exponent: Expr) -> Self {
        Self::binary(base, ArithmeticOperation::Power, exponent)
    }

    /// `inner ** (1/2)`, shown as `sqrt(inner)`
    pub fn sqrt(inner: Expr) -> Self {
        Self::pow(
            inner,
            Expr::Number(BigRational::new(BigInt::from(1), BigInt::from(2))),
        )
    }

    /// The radicand when the expression is a square root
    pub fn as_sqrt(&self) -> Option<&Expr> {
        match self {
            Expr::Arithmetic(base, ArithmeticOperation::Power, exponent)
                if exponent
                    .as_number()
                    .is_some_and(|e| *e == BigRational::new(BigInt::from(1), BigInt::from(2))) =>
            {
                Some(base)
            }
            _ => None,
        }
    }

    pub fn negate(inner: Expr) -> Self {
        Expr::Negation(Box::new(inner))
    }

    pub fn abs(inner: Expr) -> Self {
        Expr::Abs(Box::new(inner))
    }

    pub fn piecewise(branches: Vec<PiecewiseBranch>) -> Self {
        Expr::Piecewise(Piecewise { branches })
    }

    /// The numeric value when the expression is a literal
    pub fn as_number(&self) -> Option<&BigRational> {
        match self {
            Expr::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn contains_symbol(&self, variable: &Variable) -> bool {
        self.symbols().contains(variable)
    }

    /// All variables occurring in the expression, conditions included
    pub fn symbols(&self) -> BTreeSet<Variable> {
        let mut found = BTreeSet::new();
        self.collect_symbols(&mut found);
        found
    }

    fn collect_symbols(&self, found: &mut BTreeSet<Variable>) {
        match self {
            Expr::Number(_) => {}
            Expr::Symbol(v) => {
                found.insert(v.clone());
            }
            Expr::Arithmetic(l, _, r) => {
                l.collect_symbols(found);
                r.collect_symbols(found);
            }
            Expr::Negation(inner) | Expr::Abs(inner) => inner.collect_symbols(found),
            Expr::Piecewise(pw) => {
                for branch in &pw.branches {
                    branch.value.collect_symbols(found);
                    for (l, r) in branch.condition.comparisons() {
                        l.collect_symbols(found);
                        r.collect_symbols(found);
                    }
                }
            }
        }
    }

    /// Whether the expression contains `abs` or a piecewise construct
    pub fn has_branches(&self) -> bool {
        match self {
            Expr::Number(_) | Expr::Symbol(_) => false,
            Expr::Arithmetic(l, _, r) => l.has_branches() || r.has_branches(),
            Expr::Negation(inner) => inner.has_branches(),
            Expr::Abs(_) | Expr::Piecewise(_) => true,
        }
    }

    /// Nesting depth of the expression tree
    pub fn depth(&self) -> usize {
        match self {
            Expr::Number(_) | Expr::Symbol(_) => 1,
            Expr::Arithmetic(l, _, r) => 1 + l.depth().max(r.depth()),
            Expr::Negation(inner) | Expr::Abs(inner) => 1 + inner.depth(),
            Expr::Piecewise(pw) => {
                1 + pw
                    .branches
                    .iter()
                    .map(|b| {
                        let condition_depth = b
                            .condition
                            .comparisons()
                            .iter()
                            .map(|(l, r)| l.depth().max(r.depth()))
                            .max()
                            .unwrap_or(0);
                        b.value.depth().max(condition_depth)
                    })
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    /// Replace every occurrence of `variable` with `replacement`
    pub fn substitute(&self, variable: &Variable, replacement: &Expr) -> Expr {
        match self {
            Expr::Number(_) => self.clone(),
            Expr::Symbol(v) if v == variable => replacement.clone(),
            Expr::Symbol(_) => self.clone(),
            Expr::Arithmetic(l, op, r) => Expr::Arithmetic(
                Box::new(l.substitute(variable, replacement)),
                *op,
                Box::new(r.substitute(variable, replacement)),
            ),
            Expr::Negation(inner) => Expr::negate(inner.substitute(variable, replacement)),
            Expr::Abs(inner) => Expr::abs(inner.substitute(variable, replacement)),
            Expr::Piecewise(pw) => Expr::Piecewise(Piecewise {
                branches: pw
                    .branches
                    .iter()
                    .map(|b| PiecewiseBranch {
                        value: b.value.substitute(variable, replacement),
                        condition: b.condition.substitute(variable, replacement),
                    })
                    .collect(),
            }),
        }
    }

    fn precedence(&self) -> u8 {
        if self.as_sqrt().is_some() {
            return 5;
        }
        match self {
            Expr::Number(n) => {
                if n.is_negative() || !n.is_integer() {
                    2
                } else {
                    5
                }
            }
            Expr::Symbol(_) | Expr::Abs(_) | Expr::Piecewise(_) => 5,
            Expr::Arithmetic(_, op, _) => match op {
                ArithmeticOperation::Add | ArithmeticOperation::Subtract => 1,
                ArithmeticOperation::Multiply | ArithmeticOperation::Divide => 2,
                ArithmeticOperation::Power => 4,
            },
            Expr::Negation(_) => 2,
        }
    }

    fn is_signed(&self) -> bool {
        match self {
            Expr::Negation(_) => true,
            Expr::Number(n) => n.is_negative(),
            _ => false,
        }
    }
}

fn wrap(expr: &Expr, parens: bool) -> String {
    if parens {
        format!("({})", expr)
    } else {
        expr.to_string()
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(radicand) = self.as_sqrt() {
            return write!(f, "sqrt({})", radicand);
        }
        match self {
            Expr::Number(n) => write!(f, "{}", format_rational(n)),
            Expr::Symbol(v) => write!(f, "{}", v),
            Expr::Arithmetic(l, op, r) => match op {
                ArithmeticOperation::Add => match r.as_ref() {
                    Expr::Negation(inner) => {
                        write!(f, "{} - {}", l, wrap(inner, inner.precedence() <= 1))
                    }
                    Expr::Number(n) if n.is_negative() => {
                        write!(f, "{} - {}", l, format_rational(&-n.clone()))
                    }
                    _ => write!(f, "{} + {}", l, r),
                },
                ArithmeticOperation::Subtract => {
                    write!(f, "{} - {}", l, wrap(r, r.precedence() <= 1 || r.is_signed()))
                }
                ArithmeticOperation::Multiply => {
                    let right_parens = r.precedence() < 2
                        || r.is_signed()
                        || matches!(
                            r.as_ref(),
                            Expr::Arithmetic(_, ArithmeticOperation::Divide, _)
                        );
                    write!(
                        f,
                        "{}*{}",
                        wrap(l, l.precedence() < 2),
                        wrap(r, right_parens)
                    )
                }
                ArithmeticOperation::Divide => write!(
                    f,
                    "{}/{}",
                    wrap(l, l.precedence() < 2),
                    wrap(r, r.precedence() <= 2)
                ),
                ArithmeticOperation::Power => write!(
                    f,
                    "{}**{}",
                    wrap(l, l.precedence() < 5),
                    wrap(r, r.precedence() < 5)
                ),
            },
            Expr::Negation(inner) => write!(
                f,
                "-{}",
                wrap(inner, inner.precedence() < 2 || inner.is_signed())
            ),
            Expr::Abs(inner) => write!(f, "Abs({})", inner),
            Expr::Piecewise(pw) => {
                write!(f, "Piecewise(")?;
                for (i, branch) in pw.branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "({}, {})", branch.value, branch.condition)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Comparison(l, rel, r) => write!(f, "{} {} {}", l, rel, r),
            Condition::And(a, b) => write!(f, "({}) and ({})", a, b),
            Condition::Or(a, b) => write!(f, "({}) or ({})", a, b),
            Condition::Always => write!(f, "True"),
        }
    }
}

impl Serialize for Expr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Target of a limit or test point of a continuity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Point {
    Finite(BigRational),
    PositiveInfinity,
    NegativeInfinity,
}

impl Point {
    pub fn integer(value: i64) -> Self {
        Point::Finite(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn as_finite(&self) -> Option<&BigRational> {
        match self {
            Point::Finite(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_infinite(&self) -> bool {
        !matches!(self, Point::Finite(_))
    }

    /// The point as an expression, for substitution
    pub fn to_expr(&self) -> Option<Expr> {
        self.as_finite().map(|v| Expr::Number(v.clone()))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Point::Finite(value) => write!(f, "{}", format_rational(value)),
            Point::PositiveInfinity => write!(f, "oo"),
            Point::NegativeInfinity => write!(f, "-oo"),
        }
    }
}

impl Serialize for Point {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Side from which a limit approaches its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    TwoSided,
    /// From above (`+`)
    Right,
    /// From below (`-`)
    Left,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::TwoSided => write!(f, "+-"),
            Direction::Right => write!(f, "+"),
            Direction::Left => write!(f, "-"),
        }
    }
}

/// A computed quantity: a closed-form expression or a signed infinity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Finite(Expr),
    PositiveInfinity,
    NegativeInfinity,
}

impl Value {
    pub fn number(value: i64) -> Self {
        Value::Finite(Expr::number(value))
    }

    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            Value::Finite(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, Value::Finite(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Finite(expr) => write!(f, "{}", expr),
            Value::PositiveInfinity => write!(f, "oo"),
            Value::NegativeInfinity => write!(f, "-oo"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
