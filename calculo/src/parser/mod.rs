use crate::ast::Span;
use crate::error::{CalcError, ErrorKind, Failure};
use crate::resource_limits::ResourceLimits;
use crate::semantic::*;
use pest::Parser;
use pest_derive::Parser;
use std::sync::Arc;

pub mod expressions;
pub mod literals;

#[derive(Parser)]
#[grammar = "src/parser/calculo.pest"]
pub struct CalculoParser;

const SOURCE_ID: &str = "<input>";

/// Parse an expression such as `(x**2 - 4)/(x - 2)` or `piecewise((2x, x <= 1), 1)`
pub fn parse_expression(content: &str, limits: &ResourceLimits) -> Result<Expr, CalcError> {
    check_input_size(content, limits)?;
    check_nesting(content, limits)?;

    let source: Arc<str> = Arc::from(content);
    let pairs = CalculoParser::parse(Rule::expression_input, content)
        .map_err(|e| pest_error(e, &source))?;

    let mut context = expressions::BuildContext::new(source.clone(), limits.max_expression_depth);
    for pair in pairs {
        if pair.as_rule() == Rule::expression_input {
            for inner in pair.into_inner() {
                if inner.as_rule() == Rule::expression {
                    return expressions::parse_expression(inner, &mut context);
                }
            }
        }
    }
    Err(CalcError::parse(
        "Empty expression",
        Span::at(0),
        SOURCE_ID,
        source,
    ))
}

/// Parse a limit target or test point: `2`, `-1/2`, `0.25`, `oo`, `-inf`, `∞`
pub fn parse_point(content: &str) -> Result<Point, CalcError> {
    let source: Arc<str> = Arc::from(content);
    let pairs =
        CalculoParser::parse(Rule::point_input, content).map_err(|e| pest_error(e, &source))?;
    for pair in pairs {
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::point {
                return literals::parse_point(inner, &source);
            }
        }
    }
    Err(CalcError::parse("Empty point", Span::at(0), SOURCE_ID, source))
}

/// Parse a variable name: a single letter
pub fn parse_variable(content: &str) -> Result<Variable, CalcError> {
    let name = content.trim();
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(Variable::new(name)),
        _ => Err(CalcError::parse_with_suggestion(
            format!("'{}' is not a variable name", name),
            Span {
                start: 0,
                end: content.len(),
                line: 1,
                col: 1,
            },
            SOURCE_ID,
            Arc::from(content),
            "variables are single letters such as x or h",
        )),
    }
}

/// Parse the relation of an inequality: `<`, `>`, `<=`, `>=`, `≤` or `≥`
pub fn parse_relation(token: &str) -> Result<Relation, Failure> {
    let relation: Relation = token.parse()?;
    if relation.is_order() {
        Ok(relation)
    } else {
        Err(Failure::new(
            ErrorKind::InvalidRelation,
            format!(
                "'{}' is not an inequality (expected one of <, >, <=, >=)",
                token.trim()
            ),
        ))
    }
}

fn check_input_size(content: &str, limits: &ResourceLimits) -> Result<(), CalcError> {
    if content.len() > limits.max_input_bytes {
        return Err(CalcError::ResourceLimitExceeded {
            limit_name: "max_input_bytes".to_string(),
            limit_value: format!("{} bytes", limits.max_input_bytes),
            actual_value: format!("{} bytes", content.len()),
            suggestion: "Enter a shorter expression".to_string(),
        });
    }
    Ok(())
}

/// Bound how deeply the recursive grammar nests before handing it the input.
///
/// Every open parenthesis adds a level, and so does every unary sign and
/// every `**` or `^` in a chain such as `--x` or `x**-x**-x`. A binary
/// operator or a comma ends the chain of its parenthesis level.
fn check_nesting(content: &str, limits: &ResourceLimits) -> Result<(), CalcError> {
    let mut chains: Vec<usize> = vec![0];
    let mut after_operand = false;
    let mut deepest = 0usize;
    let mut chars = content.chars().filter(|c| !c.is_whitespace()).peekable();

    while let Some(c) = chars.next() {
        let chain = chains.len() - 1;
        match c {
            '(' => {
                chains.push(0);
                after_operand = false;
            }
            ')' => {
                if chains.len() > 1 {
                    chains.pop();
                }
                after_operand = true;
            }
            '+' | '-' if !after_operand => chains[chain] += 1,
            '^' => {
                chains[chain] += 1;
                after_operand = false;
            }
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                chains[chain] += 1;
                after_operand = false;
            }
            '+' | '-' | '*' | '/' | ',' | '<' | '>' | '=' | '!' | '≤' | '≥' | '≠' | '&' | '|' => {
                chains[chain] = 0;
                after_operand = false;
            }
            _ => after_operand = true,
        }
        let depth = chains.len() - 1 + chains.iter().sum::<usize>();
        deepest = deepest.max(depth);
    }

    if deepest > limits.max_expression_depth {
        return Err(CalcError::ResourceLimitExceeded {
            limit_name: "max_expression_depth".to_string(),
            limit_value: limits.max_expression_depth.to_string(),
            actual_value: deepest.to_string(),
            suggestion: "Simplify nested expressions to reduce depth".to_string(),
        });
    }
    Ok(())
}

fn pest_error(e: pest::error::Error<Rule>, source: &Arc<str>) -> CalcError {
    let (start, end) = match e.location {
        pest::error::InputLocation::Pos(pos) => (pos, pos),
        pest::error::InputLocation::Span((start, end)) => (start, end),
    };
    let (line, col) = match e.line_col {
        pest::error::LineColLocation::Pos((line, col)) => (line, col),
        pest::error::LineColLocation::Span((line, col), _) => (line, col),
    };
    let message = match &e.variant {
        pest::error::ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
            let expected: Vec<String> = positives.iter().map(describe_rule).collect();
            format!("expected {}", expected.join(" or "))
        }
        pest::error::ErrorVariant::ParsingError { .. } => "unexpected input".to_string(),
        pest::error::ErrorVariant::CustomError { message } => message.clone(),
    };
    CalcError::parse(
        message,
        Span {
            start,
            end,
            line,
            col,
        },
        SOURCE_ID,
        source.clone(),
    )
}

fn describe_rule(rule: &Rule) -> String {
    match rule {
        Rule::EOI => "end of input".to_string(),
        Rule::expression | Rule::term | Rule::signed_power | Rule::power | Rule::primary => {
            "an expression".to_string()
        }
        Rule::exponent => "an exponent".to_string(),
        Rule::number => "a number".to_string(),
        Rule::add_plus | Rule::add_minus | Rule::mul_star | Rule::mul_slash => {
            "an operator".to_string()
        }
        Rule::relation_op => "a comparison such as <= or >".to_string(),
        Rule::condition | Rule::conjunction | Rule::condition_atom | Rule::comparison => {
            "a condition".to_string()
        }
        Rule::point | Rule::infinity | Rule::signed_rational => {
            "a number, a fraction or oo".to_string()
        }
        other => format!("{:?}", other),
    }
}
