//! Set operations on subsets of the real line

use super::set::{Bound, SolutionSet};
use crate::numeric::RealNumber;
use std::cmp::Ordering;

pub fn value_within(v: &RealNumber, min: &Bound, max: &Bound) -> bool {
    let ge_min = match min {
        Bound::Unbounded => true,
        Bound::Inclusive(m) => v >= m,
        Bound::Exclusive(m) => v > m,
    };
    let le_max = match max {
        Bound::Unbounded => true,
        Bound::Inclusive(m) => v <= m,
        Bound::Exclusive(m) => v < m,
    };
    ge_min && le_max
}

pub fn bounds_contradict(min: &Bound, max: &Bound) -> bool {
    use Bound as B;
    match (min, max) {
        (B::Unbounded, _) | (_, B::Unbounded) => false,
        (B::Inclusive(a), B::Inclusive(b)) => a > b,
        (B::Inclusive(a), B::Exclusive(b)) => a >= b,
        (B::Exclusive(a), B::Inclusive(b)) => a >= b,
        (B::Exclusive(a), B::Exclusive(b)) => a >= b,
    }
}

pub fn set_union(a: SolutionSet, b: SolutionSet) -> SolutionSet {
    match (a, b) {
        (SolutionSet::Union(mut v1), SolutionSet::Union(v2)) => {
            v1.extend(v2);
            SolutionSet::Union(v1)
        }
        (SolutionSet::Union(mut v1), d2) => {
            v1.push(d2);
            SolutionSet::Union(v1)
        }
        (d1, SolutionSet::Union(mut v2)) => {
            v2.push(d1);
            SolutionSet::Union(v2)
        }
        (d1, d2) => SolutionSet::Union(vec![d1, d2]),
    }
}

pub fn set_intersection(a: SolutionSet, b: SolutionSet) -> SolutionSet {
    let Some((intervals_a, points_a)) = flatten(a) else {
        return b;
    };
    let Some((intervals_b, points_b)) = flatten(b) else {
        return SolutionSet::Union(rebuild(intervals_a, points_a));
    };

    let mut parts = Vec::new();
    for (min_a, max_a) in &intervals_a {
        for (min_b, max_b) in &intervals_b {
            let min = tighter_lower(min_a, min_b);
            let max = tighter_upper(max_a, max_b);
            if !bounds_contradict(&min, &max) {
                parts.push(SolutionSet::Interval { min, max });
            }
        }
    }
    let within_b = |p: &RealNumber| {
        points_b.contains(p) || intervals_b.iter().any(|(min, max)| value_within(p, min, max))
    };
    let within_a = |p: &RealNumber| intervals_a.iter().any(|(min, max)| value_within(p, min, max));
    let mut points: Vec<RealNumber> = points_a.iter().filter(|p| within_b(p)).cloned().collect();
    points.extend(points_b.iter().filter(|p| within_a(p)).cloned());
    if !points.is_empty() {
        parts.push(SolutionSet::Finite(points));
    }
    SolutionSet::Union(parts)
}

pub fn set_complement(set: SolutionSet) -> SolutionSet {
    use Bound as B;
    let Some((intervals, points)) = flatten(set) else {
        return SolutionSet::Empty;
    };

    let mut acc = SolutionSet::Reals;
    for (min, max) in intervals {
        let mut parts = Vec::new();
        match min {
            B::Unbounded => {}
            B::Inclusive(v) => parts.push(SolutionSet::below(B::Exclusive(v))),
            B::Exclusive(v) => parts.push(SolutionSet::below(B::Inclusive(v))),
        }
        match max {
            B::Unbounded => {}
            B::Inclusive(v) => parts.push(SolutionSet::above(B::Exclusive(v))),
            B::Exclusive(v) => parts.push(SolutionSet::above(B::Inclusive(v))),
        }
        acc = set_intersection(acc, SolutionSet::Union(parts));
    }
    for point in points {
        let around = SolutionSet::Union(vec![
            SolutionSet::below(B::Exclusive(point.clone())),
            SolutionSet::above(B::Exclusive(point)),
        ]);
        acc = set_intersection(acc, around);
    }
    acc
}

pub fn normalize(set: SolutionSet) -> SolutionSet {
    let Some((intervals, mut points)) = flatten(set) else {
        return SolutionSet::Reals;
    };
    let mut intervals = merge_intervals(intervals);

    points.sort();
    points.dedup();
    let mut isolated = Vec::new();
    let mut absorbed_any = false;
    for point in points {
        if intervals
            .iter()
            .any(|(min, max)| value_within(&point, min, max))
        {
            continue;
        }
        let mut absorbed = false;
        for (min, max) in intervals.iter_mut() {
            if matches!(min, Bound::Exclusive(v) if *v == point) {
                *min = Bound::Inclusive(point.clone());
                absorbed = true;
            }
            if matches!(max, Bound::Exclusive(v) if *v == point) {
                *max = Bound::Inclusive(point.clone());
                absorbed = true;
            }
        }
        if absorbed {
            absorbed_any = true;
        } else {
            isolated.push(point);
        }
    }
    if absorbed_any {
        intervals = merge_intervals(intervals);
    }

    if let [(Bound::Unbounded, Bound::Unbounded)] = intervals.as_slice() {
        return SolutionSet::Reals;
    }

    let mut parts = rebuild(intervals, isolated);
    match parts.len() {
        0 => SolutionSet::Empty,
        1 => parts.remove(0),
        _ => SolutionSet::Union(parts),
    }
}

/// Intervals and points of a set; `None` when the set is all of ℝ
fn flatten(set: SolutionSet) -> Option<(Vec<(Bound, Bound)>, Vec<RealNumber>)> {
    let mut intervals = Vec::new();
    let mut points = Vec::new();
    let mut pending = vec![set];
    while let Some(set) = pending.pop() {
        match set {
            SolutionSet::Empty => {}
            SolutionSet::Reals => return None,
            SolutionSet::Interval { min, max } => {
                if !bounds_contradict(&min, &max) {
                    intervals.push((min, max));
                }
            }
            SolutionSet::Finite(values) => points.extend(values),
            SolutionSet::Union(parts) => pending.extend(parts),
        }
    }
    Some((intervals, points))
}

/// Parts in increasing order, consecutive points grouped together
fn rebuild(intervals: Vec<(Bound, Bound)>, points: Vec<RealNumber>) -> Vec<SolutionSet> {
    let mut parts = Vec::new();
    let mut points = points.into_iter().peekable();
    for (min, max) in intervals {
        let mut before = Vec::new();
        while let Some(point) = points.next_if(|p| min.value().is_some_and(|start| p < start)) {
            before.push(point);
        }
        if !before.is_empty() {
            parts.push(SolutionSet::Finite(before));
        }
        parts.push(SolutionSet::Interval { min, max });
    }
    let rest: Vec<RealNumber> = points.collect();
    if !rest.is_empty() {
        parts.push(SolutionSet::Finite(rest));
    }
    parts
}

fn merge_intervals(mut intervals: Vec<(Bound, Bound)>) -> Vec<(Bound, Bound)> {
    if intervals.is_empty() {
        return intervals;
    }
    intervals.sort_by(|a, b| compare_lower(&a.0, &b.0));

    let mut merged: Vec<(Bound, Bound)> = Vec::new();
    let mut current = intervals[0].clone();
    for next in intervals.into_iter().skip(1) {
        if adjacent_or_overlap(&current, &next) {
            if compare_upper(&next.1, &current.1) == Ordering::Greater {
                current.1 = next.1;
            }
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);
    merged
}

/// Order of lower bounds: unbounded first, `[a` before `(a`
fn compare_lower(a: &Bound, b: &Bound) -> Ordering {
    use Bound as B;
    match (a, b) {
        (B::Unbounded, B::Unbounded) => Ordering::Equal,
        (B::Unbounded, _) => Ordering::Less,
        (_, B::Unbounded) => Ordering::Greater,
        (B::Inclusive(v1), B::Inclusive(v2)) | (B::Exclusive(v1), B::Exclusive(v2)) => v1.cmp(v2),
        (B::Inclusive(v1), B::Exclusive(v2)) => v1.cmp(v2).then(Ordering::Less),
        (B::Exclusive(v1), B::Inclusive(v2)) => v1.cmp(v2).then(Ordering::Greater),
    }
}

/// Order of upper bounds: unbounded last, `a)` before `a]`
fn compare_upper(a: &Bound, b: &Bound) -> Ordering {
    use Bound as B;
    match (a, b) {
        (B::Unbounded, B::Unbounded) => Ordering::Equal,
        (B::Unbounded, _) => Ordering::Greater,
        (_, B::Unbounded) => Ordering::Less,
        (B::Inclusive(v1), B::Inclusive(v2)) | (B::Exclusive(v1), B::Exclusive(v2)) => v1.cmp(v2),
        (B::Inclusive(v1), B::Exclusive(v2)) => v1.cmp(v2).then(Ordering::Greater),
        (B::Exclusive(v1), B::Inclusive(v2)) => v1.cmp(v2).then(Ordering::Less),
    }
}

fn tighter_lower(a: &Bound, b: &Bound) -> Bound {
    if compare_lower(a, b) == Ordering::Greater {
        a.clone()
    } else {
        b.clone()
    }
}

fn tighter_upper(a: &Bound, b: &Bound) -> Bound {
    if compare_upper(a, b) == Ordering::Less {
        a.clone()
    } else {
        b.clone()
    }
}

fn adjacent_or_overlap(r1: &(Bound, Bound), r2: &(Bound, Bound)) -> bool {
    use Bound as B;
    match (&r1.1, &r2.0) {
        (B::Unbounded, _) | (_, B::Unbounded) => true,
        (B::Inclusive(v1), B::Inclusive(v2)) | (B::Inclusive(v1), B::Exclusive(v2)) => v1 >= v2,
        (B::Exclusive(v1), B::Inclusive(v2)) => v1 >= v2,
        (B::Exclusive(v1), B::Exclusive(v2)) => v1 > v2,
    }
}
