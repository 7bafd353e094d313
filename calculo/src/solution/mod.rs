//! Subsets of the real line produced by the solver

pub mod ops;
pub mod set;

pub use set::{Bound, SingularitySet, SolutionSet};
