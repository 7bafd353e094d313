//! Sparse multivariate polynomials with exact rational coefficients

use super::univariate::UniPoly;
use crate::semantic::{Expr, Variable};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// Exponent of each variable in a term; absent variables have exponent zero
pub type Monomial = BTreeMap<Variable, u32>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, BigRational>,
}

/// Graded lexicographic order: total degree first, then exponents of the
/// alphabetically first variables.
pub fn monomial_cmp(a: &Monomial, b: &Monomial) -> Ordering {
    let degree_a: u32 = a.values().sum();
    let degree_b: u32 = b.values().sum();
    degree_a.cmp(&degree_b).then_with(|| {
        let variables: BTreeSet<&Variable> = a.keys().chain(b.keys()).collect();
        for variable in variables {
            let ea = a.get(variable).copied().unwrap_or(0);
            let eb = b.get(variable).copied().unwrap_or(0);
            if ea != eb {
                return ea.cmp(&eb);
            }
        }
        Ordering::Equal
    })
}

fn multiply_monomials(a: &Monomial, b: &Monomial) -> Monomial {
    let mut product = a.clone();
    for (variable, exponent) in b {
        *product.entry(variable.clone()).or_insert(0) += exponent;
    }
    product
}

fn divide_monomials(a: &Monomial, b: &Monomial) -> Option<Monomial> {
    let mut quotient = a.clone();
    for (variable, exponent) in b {
        let current = quotient.get(variable).copied().unwrap_or(0);
        if current < *exponent {
            return None;
        }
        if current == *exponent {
            quotient.remove(variable);
        } else {
            quotient.insert(variable.clone(), current - exponent);
        }
    }
    Some(quotient)
}

impl Polynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    pub fn constant(value: BigRational) -> Self {
        let mut polynomial = Self::zero();
        polynomial.add_term(Monomial::new(), value);
        polynomial
    }

    pub fn variable(variable: &Variable) -> Self {
        let mut monomial = Monomial::new();
        monomial.insert(variable.clone(), 1);
        let mut polynomial = Self::zero();
        polynomial.add_term(monomial, BigRational::one());
        polynomial
    }

    /// A single term `coefficient·monomial`
    pub fn term(monomial: Monomial, coefficient: BigRational) -> Self {
        let mut polynomial = Self::zero();
        polynomial.add_term(monomial, coefficient);
        polynomial
    }

    fn add_term(&mut self, monomial: Monomial, coefficient: BigRational) {
        if coefficient.is_zero() {
            return;
        }
        match self.terms.entry(monomial) {
            Entry::Vacant(slot) => {
                slot.insert(coefficient);
            }
            Entry::Occupied(mut slot) => {
                *slot.get_mut() += coefficient;
                if slot.get().is_zero() {
                    slot.remove();
                }
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// The value when the polynomial has no variables
    pub fn as_constant(&self) -> Option<BigRational> {
        match self.terms.len() {
            0 => Some(BigRational::zero()),
            1 => self.terms.get(&Monomial::new()).cloned(),
            _ => None,
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &BigRational)> {
        self.terms.iter()
    }

    pub fn variables(&self) -> BTreeSet<Variable> {
        self.terms
            .keys()
            .flat_map(|m| m.keys().cloned())
            .collect()
    }

    pub fn total_degree(&self) -> u32 {
        self.terms
            .keys()
            .map(|m| m.values().sum())
            .max()
            .unwrap_or(0)
    }

    pub fn degree_in(&self, variable: &Variable) -> u32 {
        self.terms
            .keys()
            .map(|m| m.get(variable).copied().unwrap_or(0))
            .max()
            .unwrap_or(0)
    }

    /// Leading term under graded lexicographic order
    pub fn leading_term(&self) -> Option<(&Monomial, &BigRational)> {
        self.terms.iter().max_by(|a, b| monomial_cmp(a.0, b.0))
    }

    /// Terms ordered from the leading term down
    pub fn sorted_terms(&self) -> Vec<(&Monomial, &BigRational)> {
        let mut terms: Vec<_> = self.terms.iter().collect();
        terms.sort_by(|a, b| monomial_cmp(b.0, a.0));
        terms
    }

    pub fn add(&self, other: &Self) -> Self {
        let mut sum = self.clone();
        for (monomial, coefficient) in &other.terms {
            sum.add_term(monomial.clone(), coefficient.clone());
        }
        sum
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn neg(&self) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), -c.clone()))
                .collect(),
        }
    }

    pub fn scale(&self, factor: &BigRational) -> Self {
        let mut scaled = Self::zero();
        for (monomial, coefficient) in &self.terms {
            scaled.add_term(monomial.clone(), coefficient * factor);
        }
        scaled
    }

    pub fn mul(&self, other: &Self) -> Self {
        let mut product = Self::zero();
        for (ma, ca) in &self.terms {
            for (mb, cb) in &other.terms {
                product.add_term(multiply_monomials(ma, mb), ca * cb);
            }
        }
        product
    }

    pub fn pow(&self, exponent: u32) -> Self {
        let mut result = Self::one();
        let mut base = self.clone();
        let mut remaining = exponent;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.mul(&base);
            }
            remaining >>= 1;
            if remaining > 0 {
                base = base.mul(&base);
            }
        }
        result
    }

    /// Exact quotient `self / divisor`, or `None` when the division leaves a remainder
    pub fn exact_div(&self, divisor: &Self) -> Option<Self> {
        let (lead_monomial, lead_coefficient) = divisor.leading_term()?;
        let mut remainder = self.clone();
        let mut quotient = Self::zero();
        while let Some((monomial, coefficient)) = remainder.leading_term() {
            let factor = divide_monomials(monomial, lead_monomial)?;
            let mut term = Self::zero();
            term.add_term(factor, coefficient / lead_coefficient);
            remainder = remainder.sub(&term.mul(divisor));
            quotient = quotient.add(&term);
        }
        Some(quotient)
    }

    /// Greatest monomial dividing every term
    pub fn monomial_content(&self) -> Monomial {
        let mut terms = self.terms.keys();
        let Some(first) = terms.next() else {
            return Monomial::new();
        };
        let mut content = first.clone();
        for monomial in terms {
            content.retain(|variable, exponent| match monomial.get(variable) {
                Some(other) => {
                    *exponent = (*exponent).min(*other);
                    true
                }
                None => false,
            });
        }
        content
    }

    pub fn divide_by_monomial(&self, divisor: &Monomial) -> Option<Self> {
        let mut quotient = Self::zero();
        for (monomial, coefficient) in &self.terms {
            quotient.add_term(divide_monomials(monomial, divisor)?, coefficient.clone());
        }
        Some(quotient)
    }

    /// Substitute `variable -> variable + shift`
    pub fn shift(&self, variable: &Variable, shift: &BigRational) -> Self {
        if shift.is_zero() {
            return self.clone();
        }
        let binomial = Self::variable(variable).add(&Self::constant(shift.clone()));
        let mut shifted = Self::zero();
        for (monomial, coefficient) in &self.terms {
            let mut rest = monomial.clone();
            let exponent = rest.remove(variable).unwrap_or(0);
            let mut term = Self::zero();
            term.add_term(rest, coefficient.clone());
            shifted = shifted.add(&term.mul(&binomial.pow(exponent)));
        }
        shifted
    }

    /// Collect by powers of `variable`: `exponent -> coefficient polynomial`
    pub fn collect_in(&self, variable: &Variable) -> BTreeMap<u32, Polynomial> {
        let mut collected: BTreeMap<u32, Polynomial> = BTreeMap::new();
        for (monomial, coefficient) in &self.terms {
            let mut rest = monomial.clone();
            let exponent = rest.remove(variable).unwrap_or(0);
            collected
                .entry(exponent)
                .or_default()
                .add_term(rest, coefficient.clone());
        }
        collected
    }

    /// Lowest power of `variable` with its coefficient
    pub fn lowest_in(&self, variable: &Variable) -> Option<(u32, Polynomial)> {
        self.collect_in(variable).into_iter().next()
    }

    /// Highest power of `variable` with its coefficient
    pub fn highest_in(&self, variable: &Variable) -> Option<(u32, Polynomial)> {
        self.collect_in(variable).into_iter().next_back()
    }

    /// Dense form when `variable` is the only variable present
    pub fn to_univariate(&self, variable: &Variable) -> Option<UniPoly> {
        let mut coefficients = vec![BigRational::zero(); self.degree_in(variable) as usize + 1];
        for (monomial, coefficient) in &self.terms {
            if monomial.keys().any(|v| v != variable) {
                return None;
            }
            let exponent = monomial.get(variable).copied().unwrap_or(0) as usize;
            coefficients[exponent] = coefficient.clone();
        }
        Some(UniPoly::new(coefficients))
    }

    pub fn from_univariate(polynomial: &UniPoly, variable: &Variable) -> Self {
        let mut result = Self::zero();
        for (exponent, coefficient) in polynomial.coefficients().iter().enumerate() {
            let mut monomial = Monomial::new();
            if exponent > 0 {
                monomial.insert(variable.clone(), exponent as u32);
            }
            result.add_term(monomial, coefficient.clone());
        }
        result
    }

    /// Least common multiple of the coefficient denominators
    pub fn denominator_lcm(&self) -> BigInt {
        self.terms
            .values()
            .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()))
    }

    /// Greatest common divisor of the numerators of integer coefficients
    pub fn integer_content(&self) -> BigInt {
        self.terms
            .values()
            .fold(BigInt::zero(), |acc, c| acc.gcd(c.numer()))
    }

    /// Render with terms in descending order, e.g. `x**2 - 2*x*y + 1/2`
    pub fn to_expr(&self) -> Expr {
        let mut expr: Option<Expr> = None;
        for (monomial, coefficient) in self.sorted_terms() {
            let term = term_expr(monomial, &coefficient.abs());
            let negative = coefficient.is_negative();
            expr = Some(match expr {
                None if negative => match term {
                    Expr::Number(n) => Expr::Number(-n),
                    other => Expr::negate(other),
                },
                None => term,
                Some(acc) if negative => Expr::sub(acc, term),
                Some(acc) => Expr::add(acc, term),
            });
        }
        expr.unwrap_or_else(|| Expr::number(0))
    }
}

fn monomial_expr(monomial: &Monomial) -> Option<Expr> {
    monomial
        .iter()
        .map(|(variable, exponent)| {
            let symbol = Expr::symbol(variable);
            if *exponent == 1 {
                symbol
            } else {
                Expr::pow(symbol, Expr::number(i64::from(*exponent)))
            }
        })
        .reduce(Expr::mul)
}

/// One term with a positive coefficient: `x`, `3*x**2`, `x/2`, `3*x/2`
fn term_expr(monomial: &Monomial, coefficient: &BigRational) -> Expr {
    let Some(variables) = monomial_expr(monomial) else {
        return Expr::Number(coefficient.clone());
    };
    let numerator = coefficient.numer();
    let denominator = coefficient.denom();
    let scaled = if numerator.is_one() {
        variables
    } else {
        Expr::mul(
            Expr::Number(BigRational::from_integer(numerator.clone())),
            variables,
        )
    };
    if denominator.is_one() {
        scaled
    } else {
        Expr::div(
            scaled,
            Expr::Number(BigRational::from_integer(denominator.clone())),
        )
    }
}
