use super::ops;
use crate::numeric::RealNumber;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// A subset of the real line
///
/// Sets built through [`SolutionSet::normalized`] are canonical: disjoint
/// parts in increasing order, adjacent intervals merged, isolated points
/// grouped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionSet {
    /// No real number
    Empty,

    /// Every real number
    Reals,

    /// A single connected range
    Interval { min: Bound, max: Bound },

    /// Isolated points
    Finite(Vec<RealNumber>),

    /// Disjoint parts in increasing order
    Union(Vec<SolutionSet>),
}

/// Bound of an interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    /// Inclusive bound [value
    Inclusive(RealNumber),

    /// Exclusive bound (value
    Exclusive(RealNumber),

    /// Unbounded (-∞ or +∞)
    Unbounded,
}

impl Bound {
    pub fn value(&self) -> Option<&RealNumber> {
        match self {
            Bound::Inclusive(v) | Bound::Exclusive(v) => Some(v),
            Bound::Unbounded => None,
        }
    }
}

impl SolutionSet {
    pub fn open(min: RealNumber, max: RealNumber) -> Self {
        SolutionSet::Interval {
            min: Bound::Exclusive(min),
            max: Bound::Exclusive(max),
        }
    }

    pub fn below(max: Bound) -> Self {
        SolutionSet::Interval {
            min: Bound::Unbounded,
            max,
        }
    }

    pub fn above(min: Bound) -> Self {
        SolutionSet::Interval {
            min,
            max: Bound::Unbounded,
        }
    }

    pub fn point(value: RealNumber) -> Self {
        SolutionSet::Finite(vec![value])
    }

    /// Canonical union of the given parts
    pub fn from_parts(parts: Vec<SolutionSet>) -> Self {
        ops::normalize(SolutionSet::Union(parts))
    }

    pub fn normalized(self) -> Self {
        ops::normalize(self)
    }

    pub fn union(self, other: SolutionSet) -> Self {
        ops::normalize(ops::set_union(self, other))
    }

    pub fn intersection(self, other: SolutionSet) -> Self {
        ops::normalize(ops::set_intersection(self, other))
    }

    pub fn complement(self) -> Self {
        ops::normalize(ops::set_complement(self))
    }

    pub fn contains(&self, value: &RealNumber) -> bool {
        match self {
            SolutionSet::Empty => false,
            SolutionSet::Reals => true,
            SolutionSet::Interval { min, max } => ops::value_within(value, min, max),
            SolutionSet::Finite(points) => points.contains(value),
            SolutionSet::Union(parts) => parts.iter().any(|p| p.contains(value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.clone().normalized(), SolutionSet::Empty)
    }

    /// Isolated points of the set, in increasing order
    pub fn points(&self) -> Vec<RealNumber> {
        match self {
            SolutionSet::Finite(points) => points.clone(),
            SolutionSet::Union(parts) => parts.iter().flat_map(|p| p.points()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Points (or ranges) where an expression is undefined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingularitySet(SolutionSet);

impl SingularitySet {
    pub fn new(set: SolutionSet) -> Self {
        Self(set.normalized())
    }

    pub fn empty() -> Self {
        Self(SolutionSet::Empty)
    }

    pub fn as_set(&self) -> &SolutionSet {
        &self.0
    }

    pub fn into_set(self) -> SolutionSet {
        self.0
    }

    pub fn points(&self) -> Vec<RealNumber> {
        self.0.points()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, value: &RealNumber) -> bool {
        self.0.contains(value)
    }
}

impl fmt::Display for SolutionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionSet::Empty => write!(f, "∅"),
            SolutionSet::Reals => write!(f, "ℝ"),
            SolutionSet::Finite(points) => {
                write!(f, "{{")?;
                for (i, point) in points.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", point)?;
                }
                write!(f, "}}")
            }
            SolutionSet::Interval { min, max } => {
                let left_bracket = match min {
                    Bound::Inclusive(_) => '[',
                    Bound::Exclusive(_) | Bound::Unbounded => '(',
                };
                let right_bracket = match max {
                    Bound::Inclusive(_) => ']',
                    Bound::Exclusive(_) | Bound::Unbounded => ')',
                };
                let left = match min {
                    Bound::Unbounded => "-∞".to_string(),
                    Bound::Inclusive(v) | Bound::Exclusive(v) => v.to_string(),
                };
                let right = match max {
                    Bound::Unbounded => "+∞".to_string(),
                    Bound::Inclusive(v) | Bound::Exclusive(v) => v.to_string(),
                };
                write!(f, "{}{}, {}{}", left_bracket, left, right, right_bracket)
            }
            SolutionSet::Union(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ∪ ")?;
                    }
                    write!(f, "{}", part)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Unbounded => write!(f, "∞"),
            Bound::Inclusive(v) => write!(f, "[{}", v),
            Bound::Exclusive(v) => write!(f, "({}", v),
        }
    }
}

impl fmt::Display for SingularitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for SolutionSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SolutionSet::Empty => {
                let mut st = serializer.serialize_struct("set", 1)?;
                st.serialize_field("type", "empty")?;
                st.end()
            }
            SolutionSet::Reals => {
                let mut st = serializer.serialize_struct("set", 1)?;
                st.serialize_field("type", "reals")?;
                st.end()
            }
            SolutionSet::Finite(points) => {
                let mut st = serializer.serialize_struct("set", 2)?;
                st.serialize_field("type", "finite")?;
                st.serialize_field("points", points)?;
                st.end()
            }
            SolutionSet::Interval { min, max } => {
                let mut st = serializer.serialize_struct("set", 3)?;
                st.serialize_field("type", "interval")?;
                st.serialize_field("min", min)?;
                st.serialize_field("max", max)?;
                st.end()
            }
            SolutionSet::Union(parts) => {
                let mut st = serializer.serialize_struct("set", 2)?;
                st.serialize_field("type", "union")?;
                st.serialize_field("parts", parts)?;
                st.end()
            }
        }
    }
}

impl Serialize for Bound {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Bound::Unbounded => {
                let mut st = serializer.serialize_struct("bound", 1)?;
                st.serialize_field("type", "unbounded")?;
                st.end()
            }
            Bound::Inclusive(v) => {
                let mut st = serializer.serialize_struct("bound", 2)?;
                st.serialize_field("type", "inclusive")?;
                st.serialize_field("value", v)?;
                st.end()
            }
            Bound::Exclusive(v) => {
                let mut st = serializer.serialize_struct("bound", 2)?;
                st.serialize_field("type", "exclusive")?;
                st.serialize_field("value", v)?;
                st.end()
            }
        }
    }
}

impl Serialize for SingularitySet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}
