//! Domain models for fragments and fragment sets.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::codec;
use crate::domain::errors::FragmentError;

/// A closed, 1-based run of document segments `[begin, end]`.
///
/// Construction goes through [`Fragment::new`], so `1 <= begin <= end` always holds and the size
/// of a fragment is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fragment {
    begin: u64,
    end: u64,
}

impl Fragment {
    /// Create a fragment spanning `begin..=end`.
    pub fn new(begin: u64, end: u64) -> Result<Self, FragmentError> {
        if begin == 0 || begin > end {
            return Err(FragmentError::InvalidRange { begin, end });
        }
        Ok(Self { begin, end })
    }

    /// Create a fragment covering exactly one segment.
    pub fn single(segment: u64) -> Result<Self, FragmentError> {
        Self::new(segment, segment)
    }

    /// First segment covered by the fragment.
    pub fn begin(&self) -> u64 {
        self.begin
    }

    /// Last segment covered by the fragment.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of segments covered.
    pub fn size(&self) -> u64 {
        self.end - self.begin + 1
    }

    /// Whether `segment` lies inside the fragment.
    pub fn contains(&self, segment: u64) -> bool {
        self.begin <= segment && segment <= self.end
    }

    /// Whether `other` lies completely inside this fragment.
    pub fn covers(&self, other: &Fragment) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }

    /// Iterate every segment index in the fragment.
    pub fn segments(&self) -> RangeInclusive<u64> {
        self.begin..=self.end
    }

    /// Move both bounds by `offset`, e.g. to place a per-part fragment into a global numbering.
    pub fn shifted(&self, offset: u64) -> Result<Self, FragmentError> {
        match self.end.checked_add(offset) {
            Some(end) => Ok(Self {
                begin: self.begin + offset,
                end,
            }),
            None => Err(FragmentError::ShiftOverflow {
                begin: self.begin,
                end: self.end,
                offset,
            }),
        }
    }

    /// Grow the fragment by one when `segment` directly follows it.
    fn try_extend(&mut self, segment: u64) -> bool {
        if self.end.checked_add(1) == Some(segment) {
            self.end = segment;
            return true;
        }
        false
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.begin == self.end {
            write!(f, "{}", self.begin)
        } else {
            write!(f, "{}-{}", self.begin, self.end)
        }
    }
}

impl FromStr for Fragment {
    type Err = FragmentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        codec::parse_fragment(value)
    }
}

/// Ordered sequence of fragments.
///
/// Sets are expected to be sorted by `begin` and free of overlaps. The coverage algebra relies on
/// that convention without checking it; use [`FragmentSet::is_normalized`] at trust boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FragmentSet {
    fragments: Vec<Fragment>,
}

impl FragmentSet {
    /// The empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from ascending segment indices, joining consecutive indices into one fragment.
    ///
    /// Duplicates are skipped. Zero is not a valid segment and is rejected.
    pub fn from_segments<I>(segments: I) -> Result<Self, FragmentError>
    where
        I: IntoIterator<Item = u64>,
    {
        let mut fragments: Vec<Fragment> = Vec::new();
        for segment in segments {
            if let Some(last) = fragments.last_mut()
                && (last.contains(segment) || last.try_extend(segment))
            {
                continue;
            }
            fragments.push(Fragment::single(segment)?);
        }
        Ok(Self { fragments })
    }

    /// Number of fragments (not segments) in the set.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// The fragments in stored order.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Iterate the fragments in stored order.
    pub fn iter(&self) -> std::slice::Iter<'_, Fragment> {
        self.fragments.iter()
    }

    /// Whether the set is sorted ascending and no two fragments share a segment.
    pub fn is_normalized(&self) -> bool {
        self.fragments
            .windows(2)
            .all(|pair| pair[0].end < pair[1].begin)
    }

    /// Copy of the set with every fragment moved by `offset`.
    pub fn shifted(&self, offset: u64) -> Result<Self, FragmentError> {
        self.fragments.iter().map(|f| f.shifted(offset)).collect()
    }
}

impl From<Vec<Fragment>> for FragmentSet {
    fn from(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }
}

impl FromIterator<Fragment> for FragmentSet {
    fn from_iter<I: IntoIterator<Item = Fragment>>(iter: I) -> Self {
        Self {
            fragments: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FragmentSet {
    type Item = &'a Fragment;
    type IntoIter = std::slice::Iter<'a, Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.iter()
    }
}

impl fmt::Display for FragmentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&codec::format_fragments(self))
    }
}

impl FromStr for FragmentSet {
    type Err = FragmentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        codec::parse_fragments(value)
    }
}

impl Serialize for FragmentSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FragmentSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        codec::parse_fragments(&encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_and_zero_based_ranges() {
        assert_eq!(
            Fragment::new(5, 3),
            Err(FragmentError::InvalidRange { begin: 5, end: 3 })
        );
        assert!(Fragment::new(0, 3).is_err());
        assert!(Fragment::single(0).is_err());
        assert_eq!(Fragment::new(4, 4).unwrap().size(), 1);
    }

    #[test]
    fn containment_checks() {
        let fragment = Fragment::new(5, 8).unwrap();
        assert!(fragment.contains(5));
        assert!(fragment.contains(8));
        assert!(!fragment.contains(9));
        assert!(fragment.covers(&Fragment::new(6, 8).unwrap()));
        assert!(!fragment.covers(&Fragment::new(4, 6).unwrap()));
        assert_eq!(fragment.segments().collect::<Vec<_>>(), vec![5, 6, 7, 8]);
    }

    #[test]
    fn orders_by_begin_then_end() {
        let a = Fragment::new(1, 2).unwrap();
        let b = Fragment::new(1, 3).unwrap();
        let c = Fragment::new(2, 2).unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn builds_sets_from_segment_indices() {
        let set = FragmentSet::from_segments([1, 2, 3, 3, 7, 9, 10]).unwrap();
        assert_eq!(set.to_string(), "1-3,7,9-10");
        assert!(set.is_normalized());
        assert!(FragmentSet::from_segments([0, 1]).is_err());
        assert!(FragmentSet::from_segments(std::iter::empty()).unwrap().is_empty());
    }

    #[test]
    fn shifting_moves_every_fragment() {
        let set: FragmentSet = "1-3,7".parse().unwrap();
        assert_eq!(set.shifted(10).unwrap().to_string(), "11-13,17");
    }

    #[test]
    fn shifting_past_the_last_segment_fails() {
        let set: FragmentSet = "1-3,7".parse().unwrap();
        assert_eq!(
            set.shifted(u64::MAX - 5),
            Err(FragmentError::ShiftOverflow {
                begin: 7,
                end: 7,
                offset: u64::MAX - 5,
            })
        );
        let last = Fragment::single(1).unwrap().shifted(u64::MAX - 1).unwrap();
        assert_eq!(last.begin(), u64::MAX);
    }

    #[test]
    fn detects_unsorted_or_overlapping_sets() {
        let overlapping: FragmentSet = "1-5,3-8".parse().unwrap();
        let unsorted: FragmentSet = "7,1-3".parse().unwrap();
        let adjacent: FragmentSet = "1-5,6-8".parse().unwrap();
        assert!(!overlapping.is_normalized());
        assert!(!unsorted.is_normalized());
        assert!(adjacent.is_normalized());
    }

    #[test]
    fn serializes_as_encoded_string() {
        let set: FragmentSet = "3,5-8,12".parse().unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "\"3,5-8,12\"");
        let back: FragmentSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert!(serde_json::from_str::<FragmentSet>("\"5-\"").is_err());
    }
}
