//! Expressions with radicals as elements of a field extension
//!
//! Every distinct radical `b^(1/q)` becomes a fresh symbol `r` with the rule
//! `r^q = b`. Elements are rational functions in the ordinary variables and
//! these symbols, with the power of each symbol kept below its index.
//! Constant radicands are normalised exactly; a radicand that still depends
//! on a variable is taken to be positive, so zero tests with such radicals
//! only see what the reduction rules expose.

use super::convert::{check_degree, constant_exponent};
use crate::algebra::{Monomial, Polynomial, RationalFunction};
use crate::error::EngineError;
use crate::numeric::{split_power, NumericError, RealNumber};
use crate::resource_limits::ResourceLimits;
use crate::semantic::{ArithmeticOperation, Expr, Variable};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::collections::BTreeSet;

/// Most radicals one computation may introduce
const MAX_RADICALS: usize = 16;

/// Largest basis `Π r_i^(e_i)` a norm is computed over
const MAX_NORM_BASIS: usize = 32;

#[derive(Debug, Clone)]
struct Radical {
    symbol: Variable,
    base: RationalFunction,
    index: u32,
}

/// Whether `expr` raises anything to a non-integer constant power
pub fn has_radicals(expr: &Expr, limits: &ResourceLimits) -> bool {
    match expr {
        Expr::Number(_) | Expr::Symbol(_) => false,
        Expr::Negation(inner) | Expr::Abs(inner) => has_radicals(inner, limits),
        Expr::Arithmetic(l, op, r) => {
            let fractional = *op == ArithmeticOperation::Power
                && constant_exponent(r, limits).is_ok_and(|e| !e.is_integer());
            fractional || has_radicals(l, limits) || has_radicals(r, limits)
        }
        Expr::Piecewise(pw) => pw.branches.iter().any(|branch| {
            has_radicals(&branch.value, limits)
                || branch
                    .condition
                    .comparisons()
                    .into_iter()
                    .any(|(l, r)| has_radicals(l, limits) || has_radicals(r, limits))
        }),
    }
}

#[derive(Debug, Clone)]
pub struct RadicalField {
    radicals: Vec<Radical>,
    limits: ResourceLimits,
}

impl RadicalField {
    pub fn new(limits: &ResourceLimits) -> Self {
        Self {
            radicals: Vec::new(),
            limits: limits.clone(),
        }
    }

    /// Convert a branch-free expression
    pub fn convert(&mut self, expr: &Expr) -> Result<RationalFunction, EngineError> {
        let converted = match expr {
            Expr::Number(n) => RationalFunction::constant(n.clone()),
            Expr::Symbol(v) => RationalFunction::variable(v),
            Expr::Negation(inner) => self.convert(inner)?.neg(),
            Expr::Arithmetic(l, op, r) => {
                let lhs = self.convert(l)?;
                match op {
                    ArithmeticOperation::Add => {
                        let rhs = self.convert(r)?;
                        self.add(&lhs, &rhs)?
                    }
                    ArithmeticOperation::Subtract => {
                        let rhs = self.convert(r)?;
                        self.sub(&lhs, &rhs)?
                    }
                    ArithmeticOperation::Multiply => {
                        let rhs = self.convert(r)?;
                        self.mul(&lhs, &rhs)?
                    }
                    ArithmeticOperation::Divide => {
                        let rhs = self.convert(r)?;
                        self.div(&lhs, &rhs).map_err(|err| match err {
                            EngineError::Numeric(NumericError::DivisionByZero) => {
                                EngineError::Undefined(format!("division by zero in {}", expr))
                            }
                            other => other,
                        })?
                    }
                    ArithmeticOperation::Power => {
                        let exponent = constant_exponent(r, &self.limits)?;
                        self.power(&lhs, &exponent).map_err(|err| match err {
                            EngineError::Numeric(NumericError::DivisionByZero) => {
                                EngineError::Undefined(format!(
                                    "zero raised to a negative power in {}",
                                    expr
                                ))
                            }
                            other => other,
                        })?
                    }
                }
            }
            Expr::Abs(_) | Expr::Piecewise(_) => {
                return Err(EngineError::Unsupported(format!(
                    "'{}' has branches that must be resolved before algebraic manipulation",
                    expr
                )))
            }
        };
        check_degree(&converted, &self.limits)?;
        Ok(converted)
    }

    pub fn add(
        &self,
        a: &RationalFunction,
        b: &RationalFunction,
    ) -> Result<RationalFunction, EngineError> {
        self.reduce(&a.add(b))
    }

    pub fn sub(
        &self,
        a: &RationalFunction,
        b: &RationalFunction,
    ) -> Result<RationalFunction, EngineError> {
        self.reduce(&a.sub(b))
    }

    pub fn mul(
        &self,
        a: &RationalFunction,
        b: &RationalFunction,
    ) -> Result<RationalFunction, EngineError> {
        self.reduce(&a.mul(b))
    }

    pub fn div(
        &self,
        a: &RationalFunction,
        b: &RationalFunction,
    ) -> Result<RationalFunction, EngineError> {
        if self.is_zero(b)? {
            return Err(NumericError::DivisionByZero.into());
        }
        self.reduce(&a.div(b)?)
    }

    pub fn powi(
        &self,
        base: &RationalFunction,
        exponent: i64,
    ) -> Result<RationalFunction, EngineError> {
        let mut result = RationalFunction::constant(BigRational::one());
        let mut square = base.clone();
        let mut remaining = exponent.unsigned_abs();
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = self.mul(&result, &square)?;
            }
            remaining >>= 1;
            if remaining > 0 {
                square = self.mul(&square, &square)?;
            }
        }
        if exponent < 0 {
            self.div(&RationalFunction::constant(BigRational::one()), &result)
        } else {
            Ok(result)
        }
    }

    /// `base^exponent` for a constant rational exponent
    pub fn power(
        &mut self,
        base: &RationalFunction,
        exponent: &BigRational,
    ) -> Result<RationalFunction, EngineError> {
        let too_large = |value: &BigInt| {
            value
                .abs()
                .to_u32()
                .is_none_or(|v| v > self.limits.max_polynomial_degree)
        };
        if too_large(exponent.numer()) || too_large(exponent.denom()) {
            return Err(EngineError::ResourceLimit(format!(
                "exponent {} exceeds the maximum of {}",
                exponent, self.limits.max_polynomial_degree
            )));
        }
        let numerator = exponent.numer().to_i64().unwrap_or_default();
        let index = exponent.denom().to_u32().unwrap_or(1);
        if index == 1 {
            return self.powi(base, numerator);
        }
        if self.is_zero(base)? {
            return if numerator > 0 {
                Ok(RationalFunction::from_polynomial(Polynomial::zero()))
            } else {
                Err(NumericError::DivisionByZero.into())
            };
        }
        let root = self.radical(base, index)?;
        self.powi(&root, numerator)
    }

    /// The element `base^(1/index)`
    pub fn radical(
        &mut self,
        base: &RationalFunction,
        index: u32,
    ) -> Result<RationalFunction, EngineError> {
        if let Some(value) = base.as_constant() {
            return self.constant_radical(&value, index);
        }
        if let Some(value) = self.value(base)? {
            if value.signum() < 0 {
                return Err(EngineError::Undefined(format!(
                    "{} has a fractional power of the negative number {}",
                    self.to_expr(base),
                    value
                )));
            }
        }
        if base
            .denominator()
            .variables()
            .iter()
            .any(|v| self.position(v).is_some())
        {
            return Err(EngineError::Unsupported(format!(
                "the radical ({})**(1/{}) has another radical in a denominator",
                self.to_expr(base),
                index
            )));
        }
        Ok(RationalFunction::variable(&self.intern(base.clone(), index)?))
    }

    fn constant_radical(
        &mut self,
        value: &BigRational,
        index: u32,
    ) -> Result<RationalFunction, EngineError> {
        if value.is_negative() {
            return Err(EngineError::Undefined(format!(
                "fractional power of the negative number {}",
                value
            )));
        }
        if value.is_zero() {
            return Ok(RationalFunction::from_polynomial(Polynomial::zero()));
        }
        // (n/d)^(1/q) = (n·d^(q-1))^(1/q) / d
        let denominator = value.denom().clone();
        let whole = value.numer() * num_traits::pow(denominator.clone(), index as usize - 1);
        let (outside, inside) = split_power(&whole, index);
        let factor = RationalFunction::constant(BigRational::new(outside, denominator));
        if inside.is_one() {
            return Ok(factor);
        }
        let base = RationalFunction::constant(BigRational::from_integer(inside));
        let symbol = self.intern(base, index)?;
        self.mul(&factor, &RationalFunction::variable(&symbol))
    }

    fn intern(&mut self, base: RationalFunction, index: u32) -> Result<Variable, EngineError> {
        if let Some(existing) = self
            .radicals
            .iter()
            .find(|r| r.index == index && r.base == base)
        {
            return Ok(existing.symbol.clone());
        }
        if self.radicals.len() >= MAX_RADICALS {
            return Err(EngineError::ResourceLimit(format!(
                "more than {} distinct radicals",
                MAX_RADICALS
            )));
        }
        let symbol = Variable::new(format!("√{}", self.radicals.len()));
        self.radicals.push(Radical {
            symbol: symbol.clone(),
            base,
            index,
        });
        Ok(symbol)
    }

    fn position(&self, symbol: &Variable) -> Option<usize> {
        self.radicals.iter().position(|r| &r.symbol == symbol)
    }

    /// Apply `r^q = b` to every term: `(numerator, denominator)` with the
    /// denominator free of radicals
    fn reduce_polynomial(&self, polynomial: &Polynomial) -> (Polynomial, Polynomial) {
        let mut numerator = polynomial.clone();
        let mut denominator = Polynomial::one();
        for radical in self.radicals.iter().rev() {
            let collected = numerator.collect_in(&radical.symbol);
            let Some(top) = collected.keys().next_back().map(|e| e / radical.index) else {
                continue;
            };
            if top == 0 {
                continue;
            }
            let base_numerator = radical.base.numerator();
            let base_denominator = radical.base.denominator();
            let mut reduced = Polynomial::zero();
            for (exponent, coefficient) in collected {
                let whole = exponent / radical.index;
                let mut monomial = Monomial::new();
                if exponent % radical.index > 0 {
                    monomial.insert(radical.symbol.clone(), exponent % radical.index);
                }
                let term = coefficient
                    .mul(&Polynomial::term(monomial, BigRational::one()))
                    .mul(&base_numerator.pow(whole))
                    .mul(&base_denominator.pow(top - whole));
                reduced = reduced.add(&term);
            }
            numerator = reduced;
            denominator = denominator.mul(&base_denominator.pow(top));
        }
        (numerator, denominator)
    }

    /// Bring an element back to reduced form
    pub fn reduce(&self, function: &RationalFunction) -> Result<RationalFunction, EngineError> {
        if self.radicals.is_empty() {
            return Ok(function.clone());
        }
        let (numerator, numerator_denominator) = self.reduce_polynomial(function.numerator());
        let (denominator, denominator_denominator) =
            self.reduce_polynomial(function.denominator());
        Ok(RationalFunction::new(
            numerator.mul(&denominator_denominator),
            denominator.mul(&numerator_denominator),
        )?)
    }

    pub fn is_zero(&self, element: &RationalFunction) -> Result<bool, EngineError> {
        if element.is_zero() {
            return Ok(true);
        }
        Ok(self.value(element)?.is_some_and(|v| v.is_zero()))
    }

    /// Exact sign when the element is a number
    pub fn sign(&self, element: &RationalFunction) -> Result<Option<i8>, EngineError> {
        if element.is_zero() {
            return Ok(Some(0));
        }
        Ok(self.value(element)?.map(|v| v.signum()))
    }

    /// The exact value when no ordinary variable is involved
    pub fn value(&self, element: &RationalFunction) -> Result<Option<RealNumber>, EngineError> {
        if let Some(constant) = element.as_constant() {
            return Ok(Some(RealNumber::from_rational(constant)));
        }
        if !self.free_variables(element).is_empty() {
            return Ok(None);
        }
        let mut values: Vec<Option<RealNumber>> = Vec::with_capacity(self.radicals.len());
        for radical in &self.radicals {
            let value = match self.evaluate(&radical.base, &values)? {
                Some(base) => Some(base.root(radical.index)?.ok_or_else(|| {
                    EngineError::Undefined(format!(
                        "even root of the negative number {}",
                        base
                    ))
                })?),
                None => None,
            };
            values.push(value);
        }
        self.evaluate(element, &values)
    }

    fn evaluate(
        &self,
        function: &RationalFunction,
        values: &[Option<RealNumber>],
    ) -> Result<Option<RealNumber>, EngineError> {
        let numerator = self.evaluate_polynomial(function.numerator(), values)?;
        let denominator = self.evaluate_polynomial(function.denominator(), values)?;
        match (numerator, denominator) {
            (Some(n), Some(d)) => Ok(Some(n.checked_div(&d)?)),
            _ => Ok(None),
        }
    }

    fn evaluate_polynomial(
        &self,
        polynomial: &Polynomial,
        values: &[Option<RealNumber>],
    ) -> Result<Option<RealNumber>, EngineError> {
        let mut total = RealNumber::zero();
        for (monomial, coefficient) in polynomial.terms() {
            let mut term = RealNumber::from_rational(coefficient.clone());
            for (symbol, exponent) in monomial {
                let Some(Some(value)) = self.position(symbol).and_then(|i| values.get(i)) else {
                    return Ok(None);
                };
                term = term.checked_mul(&value.powi(i64::from(*exponent))?)?;
            }
            total = total.checked_add(&term)?;
        }
        Ok(Some(total))
    }

    /// Ordinary variables of the element, including those inside its radicals
    pub fn free_variables(&self, element: &RationalFunction) -> BTreeSet<Variable> {
        let mut pending: Vec<Variable> = element.variables().into_iter().collect();
        let mut seen = BTreeSet::new();
        let mut free = BTreeSet::new();
        while let Some(variable) = pending.pop() {
            if !seen.insert(variable.clone()) {
                continue;
            }
            match self.position(&variable) {
                Some(i) => pending.extend(self.radicals[i].base.variables()),
                None => {
                    free.insert(variable);
                }
            }
        }
        free
    }

    /// Display form with the radicals written back as powers
    pub fn to_expr(&self, element: &RationalFunction) -> Expr {
        let mut expr = self.rationalise_square_roots(element).to_expr();
        for radical in self.radicals.iter().rev() {
            let power = Expr::pow(
                radical.base.to_expr(),
                Expr::rational(BigRational::new(BigInt::one(), BigInt::from(radical.index))),
            );
            expr = expr.substitute(&radical.symbol, &power);
        }
        expr
    }

    /// `r·a / (b·c)` with `r² = b` becomes `a / (r·c)`
    fn rationalise_square_roots(&self, element: &RationalFunction) -> RationalFunction {
        let mut element = element.clone();
        for radical in &self.radicals {
            let polynomial_base = radical.base.as_constant().is_none()
                && radical.base.denominator().as_constant().is_some_and(|d| d.is_one());
            if radical.index != 2 || !polynomial_base {
                continue;
            }
            let mut symbol = Monomial::new();
            symbol.insert(radical.symbol.clone(), 1);
            let (Some(numerator), Some(denominator)) = (
                element.numerator().divide_by_monomial(&symbol),
                element.denominator().exact_div(radical.base.numerator()),
            ) else {
                continue;
            };
            if numerator.variables().contains(&radical.symbol) {
                continue;
            }
            let denominator = denominator.mul(&Polynomial::term(symbol, BigRational::one()));
            if let Ok(rewritten) = RationalFunction::new(numerator, denominator) {
                element = rewritten;
            }
        }
        element
    }

    /// A rational function in the ordinary variables that vanishes wherever
    /// some conjugate of `polynomial` does: the product over all conjugates
    /// of its radicals
    pub fn norm(&self, polynomial: &Polynomial) -> Result<RationalFunction, EngineError> {
        if polynomial.variables().iter().all(|v| self.position(v).is_none()) {
            return Ok(RationalFunction::from_polynomial(polynomial.clone()));
        }
        let mut basis: Vec<Monomial> = vec![Monomial::new()];
        for radical in &self.radicals {
            let mut extended = Vec::with_capacity(basis.len() * radical.index as usize);
            for monomial in &basis {
                for exponent in 0..radical.index {
                    let mut next = monomial.clone();
                    if exponent > 0 {
                        next.insert(radical.symbol.clone(), exponent);
                    }
                    extended.push(next);
                }
            }
            if extended.len() > MAX_NORM_BASIS {
                return Err(EngineError::ResourceLimit(format!(
                    "the radicals span more than {} conjugates",
                    MAX_NORM_BASIS
                )));
            }
            basis = extended;
        }

        let size = basis.len();
        let zero = RationalFunction::from_polynomial(Polynomial::zero());
        let mut matrix = vec![vec![zero; size]; size];
        for (column, monomial) in basis.iter().enumerate() {
            let product = polynomial.mul(&Polynomial::term(monomial.clone(), BigRational::one()));
            let (numerator, denominator) = self.reduce_polynomial(&product);
            let mut entries = vec![Polynomial::zero(); size];
            for (term, coefficient) in numerator.terms() {
                let (radical_part, rest): (Monomial, Monomial) = term
                    .iter()
                    .map(|(v, e)| (v.clone(), *e))
                    .partition(|(v, _)| self.position(v).is_some());
                let Some(row) = basis.iter().position(|b| *b == radical_part) else {
                    return Err(EngineError::Numeric(NumericError::Unresolved));
                };
                entries[row] = entries[row].add(&Polynomial::term(rest, coefficient.clone()));
            }
            for (row, entry) in entries.into_iter().enumerate() {
                matrix[row][column] = RationalFunction::new(entry, denominator.clone())?;
            }
        }
        determinant(matrix)
    }

    /// Numerators and denominators of every radicand, as polynomials in the
    /// ordinary variables
    pub fn radicand_boundaries(&self) -> Result<Vec<Polynomial>, EngineError> {
        let mut boundaries = Vec::new();
        for radical in &self.radicals {
            let norm = self.norm(radical.base.numerator())?;
            boundaries.push(norm.numerator().clone());
            boundaries.push(norm.denominator().clone());
            boundaries.push(radical.base.denominator().clone());
        }
        Ok(boundaries)
    }
}

/// Gaussian elimination over rational functions
fn determinant(mut matrix: Vec<Vec<RationalFunction>>) -> Result<RationalFunction, EngineError> {
    let size = matrix.len();
    let mut result = RationalFunction::constant(BigRational::one());
    for k in 0..size {
        let Some(pivot) = (k..size).find(|&i| !matrix[i][k].is_zero()) else {
            return Ok(RationalFunction::from_polynomial(Polynomial::zero()));
        };
        if pivot != k {
            matrix.swap(k, pivot);
            result = result.neg();
        }
        result = result.mul(&matrix[k][k]);
        for i in k + 1..size {
            if matrix[i][k].is_zero() {
                continue;
            }
            let factor = matrix[i][k].div(&matrix[k][k])?;
            for j in k..size {
                let scaled = factor.mul(&matrix[k][j]);
                matrix[i][j] = matrix[i][j].sub(&scaled);
            }
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(field: &mut RadicalField, text: &str) -> RationalFunction {
        let expr = crate::parser::parse_expression(text, &ResourceLimits::default()).unwrap();
        field.convert(&expr).unwrap()
    }

    fn field() -> RadicalField {
        RadicalField::new(&ResourceLimits::default())
    }

    #[test]
    fn square_root_squared_is_the_radicand() {
        let mut field = field();
        let squared = convert(&mut field, "sqrt(x)*sqrt(x) - x");
        assert!(field.is_zero(&squared).unwrap());
        let cubed = convert(&mut field, "(x + 1)**(1/3) * (x + 1)**(2/3)");
        assert_eq!(field.to_expr(&cubed).to_string(), "x + 1");
    }

    #[test]
    fn constant_radicands_are_normalised() {
        let mut field = field();
        let value = convert(&mut field, "sqrt(8) - 2*sqrt(2)");
        assert!(field.is_zero(&value).unwrap());
        let half = convert(&mut field, "sqrt(1/2)");
        assert_eq!(field.to_expr(&half).to_string(), "sqrt(2)/2");
        let cube_root = convert(&mut field, "8**(1/3)");
        assert_eq!(field.value(&cube_root).unwrap(), Some(RealNumber::integer(2)));
    }

    #[test]
    fn products_of_different_square_roots_are_decided_exactly() {
        let mut field = field();
        let value = convert(&mut field, "sqrt(2)*sqrt(3) - sqrt(6)");
        assert!(field.is_zero(&value).unwrap());
        let difference = convert(&mut field, "sqrt(2) - 3/2");
        assert_eq!(field.sign(&difference).unwrap(), Some(-1));
    }

    #[test]
    fn negative_constant_radicands_are_undefined() {
        let mut field = field();
        let expr = crate::parser::parse_expression("sqrt(-4)", &ResourceLimits::default()).unwrap();
        assert!(matches!(field.convert(&expr), Err(EngineError::Undefined(_))));
    }

    #[test]
    fn reciprocal_square_root_display() {
        let mut field = field();
        let value = convert(&mut field, "sqrt(x)/(2*x)");
        assert_eq!(field.to_expr(&value).to_string(), "1/(2*sqrt(x))");
        assert_eq!(field.free_variables(&value).len(), 1);
    }

    #[test]
    fn norm_of_a_square_root_expression() {
        // (√x - 2)(-√x - 2) = 4 - x
        let mut field = field();
        let value = convert(&mut field, "sqrt(x) - 2");
        let norm = field.norm(value.numerator()).unwrap();
        assert_eq!(norm.to_expr().to_string(), "-x + 4");
    }

    #[test]
    fn nested_radicals_reduce_in_order() {
        let mut field = field();
        let value = convert(&mut field, "sqrt(1 + sqrt(x))**2 - sqrt(x)");
        assert_eq!(field.to_expr(&value).to_string(), "1");
    }
}
