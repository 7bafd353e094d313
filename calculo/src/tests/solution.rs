use crate::numeric::RealNumber;
use crate::solution::{Bound, SingularitySet, SolutionSet};

fn n(value: i64) -> RealNumber {
    RealNumber::integer(value)
}

fn open(min: i64, max: i64) -> SolutionSet {
    SolutionSet::open(n(min), n(max))
}

#[test]
fn test_display() {
    assert_eq!(SolutionSet::Empty.to_string(), "∅");
    assert_eq!(SolutionSet::Reals.to_string(), "ℝ");
    assert_eq!(SolutionSet::Finite(vec![n(1), n(2)]).to_string(), "{1, 2}");
    assert_eq!(
        SolutionSet::below(Bound::Exclusive(n(2))).to_string(),
        "(-∞, 2)"
    );
    assert_eq!(
        SolutionSet::above(Bound::Inclusive(n(3))).to_string(),
        "[3, +∞)"
    );
}

#[test]
fn test_adjacent_intervals_stay_apart_without_the_shared_point() {
    let set = SolutionSet::from_parts(vec![open(2, 3), open(0, 2)]);
    assert_eq!(set.to_string(), "(0, 2) ∪ (2, 3)");
}

#[test]
fn test_shared_point_joins_intervals() {
    let set = SolutionSet::from_parts(vec![
        open(0, 2),
        SolutionSet::point(n(2)),
        open(2, 3),
    ]);
    assert_eq!(set, open(0, 3));
}

#[test]
fn test_endpoint_is_absorbed() {
    let set = SolutionSet::from_parts(vec![
        SolutionSet::below(Bound::Exclusive(n(2))),
        SolutionSet::point(n(2)),
    ]);
    assert_eq!(set.to_string(), "(-∞, 2]");
}

#[test]
fn test_points_are_ordered_between_intervals() {
    let set = SolutionSet::from_parts(vec![
        SolutionSet::point(n(10)),
        open(0, 1),
        SolutionSet::point(n(5)),
        open(6, 7),
        SolutionSet::point(n(-3)),
    ]);
    assert_eq!(set.to_string(), "{-3} ∪ (0, 1) ∪ {5} ∪ (6, 7) ∪ {10}");
}

#[test]
fn test_whole_line_collapses_to_reals() {
    let set = SolutionSet::from_parts(vec![
        SolutionSet::below(Bound::Exclusive(n(0))),
        SolutionSet::point(n(0)),
        SolutionSet::above(Bound::Exclusive(n(0))),
    ]);
    assert_eq!(set, SolutionSet::Reals);
    assert_eq!(SolutionSet::from_parts(Vec::new()), SolutionSet::Empty);
}

#[test]
fn test_intersection() {
    let set = open(0, 5).intersection(open(3, 8));
    assert_eq!(set, open(3, 5));
    assert!(open(0, 1).intersection(open(2, 3)).is_empty());
}

#[test]
fn test_complement() {
    let set = open(0, 1).complement();
    assert_eq!(set.to_string(), "(-∞, 0] ∪ [1, +∞)");
    assert_eq!(SolutionSet::Reals.complement(), SolutionSet::Empty);
    assert_eq!(SolutionSet::Empty.complement(), SolutionSet::Reals);
}

#[test]
fn test_complement_of_a_point() {
    let set = SolutionSet::point(n(3)).complement();
    assert_eq!(set.to_string(), "(-∞, 3) ∪ (3, +∞)");
}

#[test]
fn test_contains() {
    let set = SolutionSet::from_parts(vec![open(0, 2), SolutionSet::point(n(5))]);
    assert!(set.contains(&n(1)));
    assert!(set.contains(&n(5)));
    assert!(!set.contains(&n(2)));
    assert_eq!(set.points(), vec![n(5)]);
}

#[test]
fn test_singularity_set_normalizes() {
    let set = SingularitySet::new(SolutionSet::Union(vec![
        SolutionSet::point(n(3)),
        SolutionSet::point(n(1)),
        SolutionSet::point(n(3)),
    ]));
    assert_eq!(set.to_string(), "{1, 3}");
    assert_eq!(set.points(), vec![n(1), n(3)]);
    assert!(SingularitySet::empty().is_empty());
}

#[test]
fn test_serialization() {
    let json = serde_json::to_value(open(0, 1)).unwrap();
    assert_eq!(json["type"], "interval");
    assert_eq!(json["min"]["type"], "exclusive");
    assert_eq!(json["min"]["value"], "0");
}
