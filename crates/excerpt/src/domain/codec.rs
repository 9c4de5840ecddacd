//! Text codec for fragment lists such as `3,5-8,12`.

use std::fmt::Write;

use crate::domain::errors::FragmentError;
use crate::domain::model::{Fragment, FragmentSet};

const LIST_SEP: char = ',';
const RANGE_SEP: char = '-';

/// Decode a single fragment, either `N` or `A-B`.
pub fn parse_fragment(text: &str) -> Result<Fragment, FragmentError> {
    decode_piece(text, 0)
}

/// Decode a comma separated fragment list. The empty string is the empty set.
pub fn parse_fragments(text: &str) -> Result<FragmentSet, FragmentError> {
    if text.is_empty() {
        return Ok(FragmentSet::new());
    }
    text.split(LIST_SEP)
        .enumerate()
        .map(|(index, piece)| decode_piece(piece, index))
        .collect()
}

/// Encode a set in list form; the inverse of [`parse_fragments`].
pub fn format_fragments(set: &FragmentSet) -> String {
    let mut out = String::with_capacity(set.len() * 4);
    for (idx, fragment) in set.iter().enumerate() {
        if idx > 0 {
            out.push(LIST_SEP);
        }
        // Writing into a String cannot fail.
        let _ = write!(out, "{fragment}");
    }
    out
}

/// Encode a set with every bound moved by `offset`. Fails if a bound would pass `u64::MAX`.
pub fn format_fragments_shifted(set: &FragmentSet, offset: u64) -> Result<String, FragmentError> {
    Ok(format_fragments(&set.shifted(offset)?))
}

/// Number of segments in one fragment.
pub fn size_of(fragment: &Fragment) -> u64 {
    fragment.size()
}

/// Sum of fragment sizes, saturating at `u64::MAX`. Overlaps inside `set` are counted twice.
pub fn total_size(set: &FragmentSet) -> u64 {
    set.iter().map(Fragment::size).fold(0, u64::saturating_add)
}

/// Binary search `set[from..to]` for the fragment containing `segment`.
///
/// `to` is clamped to the set length. Returns the index into `set`, or `None` when no fragment in
/// the searched range contains the segment.
pub fn find_fragment(set: &FragmentSet, segment: u64, from: usize, to: usize) -> Option<usize> {
    let fragments = set.fragments();
    let mut low = from;
    let mut high = to.min(fragments.len());

    while low < high {
        let mid = low + (high - low) / 2;
        let fragment = &fragments[mid];
        if fragment.end() < segment {
            low = mid + 1;
        } else if fragment.begin() > segment {
            high = mid;
        } else {
            return Some(mid);
        }
    }
    None
}

fn decode_piece(piece: &str, index: usize) -> Result<Fragment, FragmentError> {
    let malformed = |reason| FragmentError::MalformedFragment {
        piece: piece.to_owned(),
        index,
        reason,
    };

    if piece.is_empty() {
        return Err(malformed("empty fragment"));
    }

    let (begin, end) = match piece.split_once(RANGE_SEP) {
        None => {
            let value = parse_bound(piece).map_err(malformed)?;
            (value, value)
        }
        Some((begin, end)) => {
            if begin.is_empty() {
                return Err(malformed("missing begin"));
            }
            if end.is_empty() {
                return Err(malformed("missing end"));
            }
            if end.contains(RANGE_SEP) {
                return Err(malformed("unexpected separator"));
            }
            (
                parse_bound(begin).map_err(malformed)?,
                parse_bound(end).map_err(malformed)?,
            )
        }
    };

    if begin == 0 {
        return Err(malformed("segments are numbered from 1"));
    }
    if begin > end {
        return Err(malformed("begin after end"));
    }
    Fragment::new(begin, end).map_err(|_| malformed("invalid range"))
}

fn parse_bound(text: &str) -> Result<u64, &'static str> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err("not a number");
    }
    text.parse().map_err(|_| "number out of range")
}
