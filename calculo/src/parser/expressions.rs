use crate::ast::Span;
use crate::error::CalcError;
use crate::parser::literals::parse_number;
use crate::parser::Rule;
use crate::semantic::*;
use pest::iterators::Pair;
use std::sync::Arc;

const SUPPORTED_FUNCTIONS: &str = "supported functions: abs, sqrt, piecewise";

/// State shared while building one expression tree
pub(crate) struct BuildContext {
    source: Arc<str>,
    depth: usize,
    max_depth: usize,
}

impl BuildContext {
    pub(crate) fn new(source: Arc<str>, max_depth: usize) -> Self {
        Self {
            source,
            depth: 0,
            max_depth,
        }
    }

    fn push_depth(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(CalcError::ResourceLimitExceeded {
                limit_name: "max_expression_depth".to_string(),
                limit_value: self.max_depth.to_string(),
                actual_value: self.depth.to_string(),
                suggestion: "Simplify nested expressions to reduce depth".to_string(),
            });
        }
        Ok(())
    }

    fn pop_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn error(&self, message: impl Into<String>, pair: &Pair<Rule>) -> CalcError {
        CalcError::parse(
            message,
            Span::from_pest_span(pair.as_span()),
            "<input>",
            self.source.clone(),
        )
    }
}

fn empty(what: &str) -> CalcError {
    CalcError::Engine(format!("Empty {}", what))
}

pub(crate) fn parse_expression(
    pair: Pair<Rule>,
    context: &mut BuildContext,
) -> Result<Expr, CalcError> {
    context.push_depth()?;
    let result = parse_sum(pair, context);
    context.pop_depth();
    result
}

// expression = { term ~ ((add_plus | add_minus) ~ term)* }
fn parse_sum(pair: Pair<Rule>, context: &mut BuildContext) -> Result<Expr, CalcError> {
    let mut pairs = pair.into_inner();
    let first = pairs.next().ok_or_else(|| empty("expression"))?;
    let mut result = parse_term(first, context)?;

    while let Some(op) = pairs.next() {
        let operation = match op.as_rule() {
            Rule::add_plus => ArithmeticOperation::Add,
            Rule::add_minus => ArithmeticOperation::Subtract,
            other => {
                return Err(CalcError::Engine(format!(
                    "Unexpected operator in expression: {:?}",
                    other
                )))
            }
        };
        let rhs = pairs.next().ok_or_else(|| empty("right operand"))?;
        result = Expr::binary(result, operation, parse_term(rhs, context)?);
    }
    Ok(result)
}

// term = { signed_power ~ (((mul_star | mul_slash) ~ signed_power) | implicit_power)* }
fn parse_term(pair: Pair<Rule>, context: &mut BuildContext) -> Result<Expr, CalcError> {
    let mut pairs = pair.into_inner();
    let first = pairs.next().ok_or_else(|| empty("term"))?;
    let mut result = parse_signed_power(first, context)?;

    while let Some(next) = pairs.next() {
        result = match next.as_rule() {
            Rule::mul_star | Rule::mul_slash => {
                let rhs = pairs.next().ok_or_else(|| empty("right operand"))?;
                let rhs = parse_signed_power(rhs, context)?;
                if next.as_rule() == Rule::mul_star {
                    Expr::mul(result, rhs)
                } else {
                    Expr::div(result, rhs)
                }
            }
            Rule::implicit_power => {
                let power = next.into_inner().next().ok_or_else(|| empty("factor"))?;
                Expr::mul(result, parse_power(power, context)?)
            }
            other => {
                return Err(CalcError::Engine(format!(
                    "Unexpected token in term: {:?}",
                    other
                )))
            }
        };
    }
    Ok(result)
}

// signed_power = { (unary_minus | unary_plus) ~ signed_power | power }
// exponent     = { (unary_minus | unary_plus) ~ exponent | power }
fn parse_signed_power(pair: Pair<Rule>, context: &mut BuildContext) -> Result<Expr, CalcError> {
    let mut pairs = pair.into_inner();
    let first = pairs.next().ok_or_else(|| empty("factor"))?;
    match first.as_rule() {
        Rule::unary_minus => {
            let operand = pairs.next().ok_or_else(|| empty("negated operand"))?;
            context.push_depth()?;
            let result = parse_signed_power(operand, context);
            context.pop_depth();
            Ok(negated(result?))
        }
        Rule::unary_plus => {
            let operand = pairs.next().ok_or_else(|| empty("operand"))?;
            context.push_depth()?;
            let result = parse_signed_power(operand, context);
            context.pop_depth();
            result
        }
        Rule::power => parse_power(first, context),
        other => Err(CalcError::Engine(format!(
            "Unexpected factor: {:?}",
            other
        ))),
    }
}

/// Literal negations fold into the number so `-2` is the number minus two
fn negated(operand: Expr) -> Expr {
    match operand {
        Expr::Number(n) => Expr::Number(-n),
        other => Expr::negate(other),
    }
}

// power = { primary ~ (pow_op ~ exponent)? }
fn parse_power(pair: Pair<Rule>, context: &mut BuildContext) -> Result<Expr, CalcError> {
    let mut pairs = pair.into_inner();
    let base = pairs.next().ok_or_else(|| empty("power"))?;
    let base = parse_primary(base, context)?;
    let Some(exponent) = pairs.next() else {
        return Ok(base);
    };
    context.push_depth()?;
    let exponent = parse_signed_power(exponent, context);
    context.pop_depth();
    Ok(Expr::pow(base, exponent?))
}

// primary = { number | function_call | symbol_run | "(" ~ expression ~ ")" }
fn parse_primary(pair: Pair<Rule>, context: &mut BuildContext) -> Result<Expr, CalcError> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| empty("primary expression"))?;
    match inner.as_rule() {
        Rule::number => Ok(Expr::Number(parse_number(&inner, &context.source)?)),
        Rule::symbol_run => Ok(parse_symbol_run(inner.as_str())),
        Rule::function_call => parse_function_call(inner, context),
        Rule::expression => parse_expression(inner, context),
        other => Err(CalcError::Engine(format!(
            "Unexpected primary expression: {:?}",
            other
        ))),
    }
}

/// Variables are single letters, so `xy` reads as `x*y`
fn parse_symbol_run(run: &str) -> Expr {
    let mut letters = run.chars().map(|c| Expr::Symbol(Variable::new(c.to_string())));
    let first = letters.next();
    letters.fold(first.unwrap_or_else(|| Expr::number(1)), Expr::mul)
}

// function_call = { function_name ~ "(" ~ (call_argument ~ ("," ~ call_argument)*)? ~ ")" }
fn parse_function_call(pair: Pair<Rule>, context: &mut BuildContext) -> Result<Expr, CalcError> {
    let call = pair.clone();
    let mut pairs = pair.into_inner();
    let name = pairs.next().ok_or_else(|| empty("function name"))?;
    let arguments: Vec<Pair<Rule>> = pairs.collect();

    match name.as_str() {
        "abs" | "Abs" => Ok(Expr::abs(single_argument("abs", &call, &arguments, context)?)),
        "sqrt" => Ok(Expr::sqrt(single_argument("sqrt", &call, &arguments, context)?)),
        "piecewise" | "Piecewise" => parse_piecewise(&call, arguments, context),
        unknown => Err(CalcError::parse_with_suggestion(
            format!("Unknown function '{}'", unknown),
            Span::from_pest_span(name.as_span()),
            "<input>",
            context.source.clone(),
            SUPPORTED_FUNCTIONS,
        )),
    }
}

fn single_argument(
    function: &str,
    call: &Pair<Rule>,
    arguments: &[Pair<Rule>],
    context: &mut BuildContext,
) -> Result<Expr, CalcError> {
    let [argument] = arguments else {
        return Err(context.error(
            format!("{} takes exactly one argument, got {}", function, arguments.len()),
            call,
        ));
    };
    let inner = argument
        .clone()
        .into_inner()
        .next()
        .ok_or_else(|| empty("argument"))?;
    if inner.as_rule() != Rule::expression {
        return Err(context.error(
            format!("{} takes an expression, not a branch", function),
            &inner,
        ));
    }
    parse_expression(inner, context)
}

/// `piecewise((value, condition), ..., default)`
fn parse_piecewise(
    call: &Pair<Rule>,
    arguments: Vec<Pair<Rule>>,
    context: &mut BuildContext,
) -> Result<Expr, CalcError> {
    if arguments.is_empty() {
        return Err(context.error("piecewise needs at least one branch", call));
    }
    let last = arguments.len() - 1;
    let mut branches = Vec::with_capacity(arguments.len());

    for (index, argument) in arguments.into_iter().enumerate() {
        let inner = argument
            .into_inner()
            .next()
            .ok_or_else(|| empty("piecewise argument"))?;
        match inner.as_rule() {
            Rule::branch => branches.push(parse_branch(inner, context)?),
            Rule::expression if index == last => branches.push(PiecewiseBranch {
                value: parse_expression(inner, context)?,
                condition: Condition::Always,
            }),
            Rule::expression => {
                return Err(context.error(
                    "only the last piecewise argument may be a default value; write branches as (value, condition)",
                    &inner,
                ))
            }
            other => {
                return Err(CalcError::Engine(format!(
                    "Unexpected piecewise argument: {:?}",
                    other
                )))
            }
        }
    }
    Ok(Expr::piecewise(branches))
}

// branch = { "(" ~ expression ~ "," ~ condition ~ ")" }
fn parse_branch(pair: Pair<Rule>, context: &mut BuildContext) -> Result<PiecewiseBranch, CalcError> {
    let mut pairs = pair.into_inner();
    let value = pairs.next().ok_or_else(|| empty("branch value"))?;
    let condition = pairs.next().ok_or_else(|| empty("branch condition"))?;
    Ok(PiecewiseBranch {
        value: parse_expression(value, context)?,
        condition: parse_condition(condition, context)?,
    })
}

// condition = { conjunction ~ (or_keyword ~ conjunction)* }
fn parse_condition(pair: Pair<Rule>, context: &mut BuildContext) -> Result<Condition, CalcError> {
    let mut result: Option<Condition> = None;
    for inner in pair.into_inner() {
        if inner.as_rule() != Rule::conjunction {
            continue;
        }
        let conjunction = parse_conjunction(inner, context)?;
        result = Some(match result {
            Some(left) => Condition::Or(Box::new(left), Box::new(conjunction)),
            None => conjunction,
        });
    }
    result.ok_or_else(|| empty("condition"))
}

// conjunction = { condition_atom ~ (and_keyword ~ condition_atom)* }
fn parse_conjunction(pair: Pair<Rule>, context: &mut BuildContext) -> Result<Condition, CalcError> {
    let mut result: Option<Condition> = None;
    for inner in pair.into_inner() {
        if inner.as_rule() != Rule::condition_atom {
            continue;
        }
        let atom = parse_condition_atom(inner, context)?;
        result = Some(match result {
            Some(left) => Condition::And(Box::new(left), Box::new(atom)),
            None => atom,
        });
    }
    result.ok_or_else(|| empty("condition"))
}

// condition_atom = { always | comparison | "(" ~ condition ~ ")" }
fn parse_condition_atom(
    pair: Pair<Rule>,
    context: &mut BuildContext,
) -> Result<Condition, CalcError> {
    let inner = pair.into_inner().next().ok_or_else(|| empty("condition"))?;
    match inner.as_rule() {
        Rule::always => Ok(Condition::Always),
        Rule::comparison => parse_comparison(inner, context),
        Rule::condition => parse_condition(inner, context),
        other => Err(CalcError::Engine(format!(
            "Unexpected condition: {:?}",
            other
        ))),
    }
}

// comparison = { expression ~ relation_op ~ expression }
fn parse_comparison(pair: Pair<Rule>, context: &mut BuildContext) -> Result<Condition, CalcError> {
    let mut pairs = pair.into_inner();
    let lhs = pairs.next().ok_or_else(|| empty("comparison"))?;
    let op = pairs.next().ok_or_else(|| empty("comparison operator"))?;
    let rhs = pairs.next().ok_or_else(|| empty("comparison"))?;

    let relation: Relation = op
        .as_str()
        .parse()
        .map_err(|failure: crate::error::Failure| context.error(failure.message, &op))?;
    Ok(Condition::comparison(
        parse_expression(lhs, context)?,
        relation,
        parse_expression(rhs, context)?,
    ))
}
