//! Interval coverage algebra for quota-limited excerpts of segmented documents.
//!
//! A document is split into numbered segments. Selections are [`FragmentSet`]s, sorted runs of
//! segments encoded as text like `3,5-8,12`. The algebra answers how many segments two selections
//! cover together, whether that exceeds a limit, and which segments they share.
//!
//! ```
//! use excerpt::domain::codec::parse_fragments;
//! use excerpt::domain::coverage::{combined_coverage, exceeds_limit, intersect};
//!
//! let quota = parse_fragments("1-5").unwrap();
//! let excerpt = parse_fragments("3-8").unwrap();
//!
//! assert_eq!(combined_coverage(&quota, &excerpt), 8);
//! assert!(exceeds_limit(&quota, &excerpt, 7));
//! assert_eq!(intersect(&quota, &excerpt).to_string(), "3-5");
//! ```

pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;

pub use domain::{Fragment, FragmentError, FragmentSet, QuotaError};

/// Install the stderr log subscriber; `verbose` enables debug output.
pub fn init(verbose: bool) {
    infra::logging::init(verbose);
}
