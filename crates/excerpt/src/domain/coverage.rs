//! Coverage algebra over fragment sets.
//!
//! Every binary operation walks both sets once with two cursors, like the merge step of a merge
//! sort. At each step the current fragments `fa = a[i]` and `fb = b[j]` are either disjoint with
//! `fa` first, disjoint with `fb` first, or overlapping. Fragments that merely touch
//! (`fa.end + 1 == fb.begin`) count as disjoint.

use std::cmp::{max, min};

use crate::domain::codec::total_size;
use crate::domain::model::{Fragment, FragmentSet};

/// Relative position of two fragments.
enum Relation {
    Before,
    After,
    Overlap,
}

fn relate(fa: &Fragment, fb: &Fragment) -> Relation {
    if fa.end() < fb.begin() {
        Relation::Before
    } else if fb.end() < fa.begin() {
        Relation::After
    } else {
        Relation::Overlap
    }
}

/// Size of the span covering both overlapping fragments.
fn merged_size(fa: &Fragment, fb: &Fragment) -> u64 {
    max(fa.end(), fb.end()) - min(fa.begin(), fb.begin()) + 1
}

/// Yields the size each sweep step contributes to the combined coverage of `a` and `b`.
///
/// An overlapping pair is consumed as one merged span and advances both cursors.
struct CoverageSweep<'a> {
    a: &'a [Fragment],
    b: &'a [Fragment],
    i: usize,
    j: usize,
}

impl<'a> CoverageSweep<'a> {
    fn new(a: &'a FragmentSet, b: &'a FragmentSet) -> Self {
        Self {
            a: a.fragments(),
            b: b.fragments(),
            i: 0,
            j: 0,
        }
    }
}

impl Iterator for CoverageSweep<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        match (self.a.get(self.i), self.b.get(self.j)) {
            (Some(fa), Some(fb)) => match relate(fa, fb) {
                Relation::Before => {
                    self.i += 1;
                    Some(fa.size())
                }
                Relation::After => {
                    self.j += 1;
                    Some(fb.size())
                }
                Relation::Overlap => {
                    self.i += 1;
                    self.j += 1;
                    Some(merged_size(fa, fb))
                }
            },
            (Some(fa), None) => {
                self.i += 1;
                Some(fa.size())
            }
            (None, Some(fb)) => {
                self.j += 1;
                Some(fb.size())
            }
            (None, None) => None,
        }
    }
}

/// Number of segments covered by `a` and `b` together.
pub fn combined_coverage(a: &FragmentSet, b: &FragmentSet) -> u64 {
    if b.is_empty() {
        return total_size(a);
    }
    CoverageSweep::new(a, b).fold(0, u64::saturating_add)
}

/// Whether `combined_coverage(a, b) > limit`, stopping as soon as the answer is known.
pub fn exceeds_limit(a: &FragmentSet, b: &FragmentSet, limit: u64) -> bool {
    let mut used = 0u64;
    for step in CoverageSweep::new(a, b) {
        used = used.saturating_add(step);
        if used > limit {
            return true;
        }
    }
    false
}

/// Segments covered by both `a` and `b`.
pub fn intersect(a: &FragmentSet, b: &FragmentSet) -> FragmentSet {
    let (a, b) = (a.fragments(), b.fragments());
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);

    while let (Some(fa), Some(fb)) = (a.get(i), b.get(j)) {
        match relate(fa, fb) {
            Relation::Before => i += 1,
            Relation::After => j += 1,
            Relation::Overlap => {
                let begin = max(fa.begin(), fb.begin());
                let end = min(fa.end(), fb.end());
                // Both bounds come from valid fragments, so begin <= end and begin >= 1.
                if let Ok(fragment) = Fragment::new(begin, end) {
                    result.push(fragment);
                }
                if fa.end() <= fb.end() {
                    i += 1;
                }
                if fb.end() <= fa.end() {
                    j += 1;
                }
            }
        }
    }

    FragmentSet::from(result)
}

/// Normalized union of `a` and `b`.
///
/// Overlapping fragments are merged into one; touching fragments stay separate, matching the
/// accounting of [`combined_coverage`].
pub fn union(a: &FragmentSet, b: &FragmentSet) -> FragmentSet {
    let (a, b) = (a.fragments(), b.fragments());
    let mut merged: Vec<Fragment> = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);

    loop {
        let next = match (a.get(i), b.get(j)) {
            (Some(fa), Some(fb)) if fa <= fb => {
                i += 1;
                *fa
            }
            (Some(_), Some(fb)) => {
                j += 1;
                *fb
            }
            (Some(fa), None) => {
                i += 1;
                *fa
            }
            (None, Some(fb)) => {
                j += 1;
                *fb
            }
            (None, None) => break,
        };

        match merged.last_mut() {
            Some(last) if next.begin() <= last.end() => {
                if next.end() > last.end()
                    && let Ok(grown) = Fragment::new(last.begin(), next.end())
                {
                    *last = grown;
                }
            }
            _ => merged.push(next),
        }
    }

    FragmentSet::from(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::codec::parse_fragments;

    fn set(text: &str) -> FragmentSet {
        parse_fragments(text).unwrap()
    }

    #[test]
    fn coverage_merges_overlaps() {
        assert_eq!(combined_coverage(&set("1-5"), &set("3-8")), 8);
        assert_eq!(combined_coverage(&set("3-8"), &set("1-5")), 8);
        assert_eq!(combined_coverage(&set("1-10"), &set("4-6")), 10);
    }

    #[test]
    fn coverage_saturates_near_the_top_of_the_range() {
        let a = set("1-18446744073709551615");
        let b = set("1,2-18446744073709551615");
        assert!(a.is_normalized() && b.is_normalized());
        assert_eq!(combined_coverage(&a, &b), u64::MAX);
        assert!(exceeds_limit(&a, &b, u64::MAX - 1));
        assert!(!exceeds_limit(&a, &b, u64::MAX));
    }

    #[test]
    fn coverage_keeps_adjacent_spans_additive() {
        assert_eq!(combined_coverage(&set("1-5"), &set("6-8")), 8);
        assert_eq!(combined_coverage(&set("6-8"), &set("1-5")), 8);
    }

    #[test]
    fn coverage_with_empty_side_is_total_size() {
        let a = set("3,5-8,12");
        assert_eq!(combined_coverage(&a, &FragmentSet::new()), 6);
        assert_eq!(combined_coverage(&FragmentSet::new(), &a), 6);
        assert_eq!(combined_coverage(&FragmentSet::new(), &FragmentSet::new()), 0);
    }

    #[test]
    fn coverage_adds_leftover_tails() {
        assert_eq!(combined_coverage(&set("1-2,10-12,20"), &set("2-3")), 3 + 3 + 1);
        assert_eq!(combined_coverage(&set("5"), &set("1,2,3,9-10")), 6);
    }

    #[test]
    fn exceeds_limit_matches_full_count() {
        let quota = set("1-10,40-49");
        let excerpt = set("5-14,60-61");
        let used = combined_coverage(&quota, &excerpt);
        assert_eq!(used, 14 + 10 + 2);
        assert!(!exceeds_limit(&quota, &excerpt, used));
        assert!(exceeds_limit(&quota, &excerpt, used - 1));
    }

    #[test]
    fn exceeds_limit_sees_the_tail() {
        let quota = set("1-2");
        let excerpt = set("10-20");
        assert!(exceeds_limit(&quota, &excerpt, 12));
        assert!(!exceeds_limit(&quota, &excerpt, 13));
        assert!(!exceeds_limit(&FragmentSet::new(), &FragmentSet::new(), 0));
    }

    #[test]
    fn intersects_overlapping_spans() {
        assert_eq!(intersect(&set("1-10"), &set("5-15")), set("5-10"));
        assert_eq!(intersect(&set("1-10,20-30"), &set("5-25")), set("5-10,20-25"));
        assert_eq!(intersect(&set("1-5"), &set("6-8")), FragmentSet::new());
        assert_eq!(intersect(&set("1-5,7"), &set("5-7")), set("5,7"));
    }

    #[test]
    fn intersect_with_empty_is_empty() {
        let a = set("1-3,7-9");
        assert!(intersect(&a, &FragmentSet::new()).is_empty());
        assert!(intersect(&FragmentSet::new(), &a).is_empty());
    }

    #[test]
    fn intersect_advances_both_cursors_on_ties() {
        assert_eq!(intersect(&set("1-5,8-9"), &set("3-5,8")), set("3-5,8"));
    }

    #[test]
    fn union_merges_overlaps_but_not_neighbours() {
        assert_eq!(union(&set("1-5"), &set("3-8")), set("1-8"));
        assert_eq!(union(&set("1-5"), &set("6-8")), set("1-5,6-8"));
        assert_eq!(union(&set("1-10"), &set("2-3,5-6,12")), set("1-10,12"));
        assert_eq!(union(&set("4"), &FragmentSet::new()), set("4"));
    }
}
