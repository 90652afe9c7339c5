//! Interval-tree containment (spec §8): `query_point(t)` yields exactly
//! the intervals containing `t`, `query_range(qs,qe)` yields exactly the
//! intervals overlapping `[qs,qe]`, and `coalesce` is size-monotone and
//! coverage-preserving for any interval set.

use deltalog::interval::{coalesce, IntervalTree, ResolvedInterval};
use proptest::prelude::*;

fn interval_strategy() -> impl Strategy<Value = ResolvedInterval> {
    (-100i64..100, 0i64..50).prop_map(|(start, len)| ResolvedInterval::new(start, start + len))
}

fn covers(t: i64, intervals: &[ResolvedInterval]) -> bool {
    intervals.iter().any(|i| i.contains_point(t))
}

fn overlaps_range(qs: i64, qe: i64, intervals: &[ResolvedInterval]) -> Vec<ResolvedInterval> {
    let mut hits: Vec<_> = intervals
        .iter()
        .copied()
        .filter(|i| i.start <= qe && i.end >= qs)
        .collect();
    hits.sort_by_key(|i| (i.start, i.end));
    hits
}

proptest! {
    #[test]
    fn query_point_matches_brute_force_containment(
        intervals in prop::collection::vec(interval_strategy(), 0..40),
        t in -150i64..150,
    ) {
        let mut tree = IntervalTree::new();
        for iv in &intervals {
            tree.insert(*iv);
        }

        let mut expected: Vec<_> = intervals.iter().copied().filter(|i| i.contains_point(t)).collect();
        expected.sort_by_key(|i| (i.start, i.end));

        let mut got = tree.query_point(t);
        got.sort_by_key(|i| (i.start, i.end));

        prop_assert_eq!(got, expected);
    }

    #[test]
    fn query_range_matches_brute_force_overlap(
        intervals in prop::collection::vec(interval_strategy(), 0..40),
        qs in -150i64..150,
        span in 0i64..80,
    ) {
        let qe = qs + span;
        let mut tree = IntervalTree::new();
        for iv in &intervals {
            tree.insert(*iv);
        }

        let expected = overlaps_range(qs, qe, &intervals);
        let mut got = tree.query_range(qs, qe);
        got.sort_by_key(|i| (i.start, i.end));

        prop_assert_eq!(got, expected);
    }

    #[test]
    fn coalesce_is_size_monotone_and_coverage_preserving(
        intervals in prop::collection::vec(interval_strategy(), 0..40),
    ) {
        let mut tree = IntervalTree::new();
        for iv in &intervals {
            tree.insert(*iv);
        }
        let before_len = tree.len();
        let before_points: Vec<bool> = (-150..150).map(|t| covers(t, &tree.all())).collect();

        coalesce(&mut tree);

        prop_assert!(tree.len() <= before_len);
        let after_points: Vec<bool> = (-150..150).map(|t| covers(t, &tree.all())).collect();
        prop_assert_eq!(before_points, after_points);

        // coalescing again is a fixpoint: no further merging possible.
        let len_after_first = tree.len();
        coalesce(&mut tree);
        prop_assert_eq!(tree.len(), len_after_first);
    }
}
