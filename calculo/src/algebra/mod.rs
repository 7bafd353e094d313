//! Exact polynomial algebra used by the engine

pub mod algebraic;
pub mod polynomial;
pub mod rational_function;
pub mod resultant;
pub mod roots;
pub mod univariate;

pub use algebraic::AlgebraicNumber;
pub use polynomial::{Monomial, Polynomial};
pub use rational_function::RationalFunction;
pub use roots::real_roots;
pub use univariate::UniPoly;
