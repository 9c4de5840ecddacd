//! Evaluating excerpts against a usage quota.
//!
//! A [`QuotaState`] bundles the quota already used up for a document with the document size and
//! the limit. It is a plain value: callers keep the state returned by [`QuotaState::commit`] and
//! pass it into the next evaluation.

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::codec::total_size;
use crate::domain::coverage::{combined_coverage, exceeds_limit, intersect, union};
use crate::domain::errors::{FragmentError, QuotaError};
use crate::domain::model::{Fragment, FragmentSet};

/// Default share of a document that may be revealed, in percent.
pub const DEFAULT_LIMIT_PERCENT: f64 = 15.0;

/// Quota bookkeeping for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaState {
    quota: FragmentSet,
    segments: u64,
    limit: u64,
}

impl QuotaState {
    /// Create a state with an absolute limit.
    pub fn new(quota: FragmentSet, segments: u64, limit: u64) -> Self {
        Self {
            quota,
            segments,
            limit,
        }
    }

    /// Create a state whose limit is `percent` of the document size, rounded down.
    pub fn with_limit_percent(quota: FragmentSet, segments: u64, percent: f64) -> Self {
        Self::new(quota, segments, limit_from_percent(segments, percent))
    }

    pub fn quota(&self) -> &FragmentSet {
        &self.quota
    }

    pub fn segments(&self) -> u64 {
        self.segments
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Compute every figure the slice view displays for `excerpt`.
    pub fn evaluate(&self, excerpt: &FragmentSet) -> SliceReport {
        let excerpt_size = total_size(excerpt);
        let quota_size = total_size(&self.quota);
        let used = combined_coverage(&self.quota, excerpt);
        let overlap = total_size(&intersect(&self.quota, excerpt));
        let exceeded = used > self.limit;

        debug!(
            excerpt = %excerpt,
            quota = %self.quota,
            used,
            limit = self.limit,
            exceeded,
            "evaluated excerpt"
        );

        SliceReport {
            excerpt: excerpt.clone(),
            quota: self.quota.clone(),
            segments: self.segments,
            limit: self.limit,
            excerpt_size,
            quota_size,
            used,
            overlap,
            remaining: self.limit.saturating_sub(used),
            excerpt_percent: percent_of(excerpt_size, self.segments),
            used_percent: percent_of(used, self.segments),
            exceeded,
        }
    }

    /// Evaluate a contiguous window `begin..=end`, as picked with a range slider.
    pub fn evaluate_window(&self, begin: u64, end: u64) -> Result<SliceReport, FragmentError> {
        let excerpt = FragmentSet::from(vec![Fragment::new(begin, end)?]);
        Ok(self.evaluate(&excerpt))
    }

    /// Whether `excerpt` fits next to the quota without exceeding the limit.
    pub fn admits(&self, excerpt: &FragmentSet) -> bool {
        !exceeds_limit(&self.quota, excerpt, self.limit)
    }

    /// Account `excerpt` against the quota, returning the state that includes it.
    ///
    /// Rejects the excerpt when quota and excerpt together exceed the limit.
    pub fn commit(&self, excerpt: &FragmentSet) -> Result<QuotaState, QuotaError> {
        if !self.admits(excerpt) {
            let used = combined_coverage(&self.quota, excerpt);
            warn!(
                used,
                limit = self.limit,
                excerpt = %excerpt,
                "rejecting excerpt exceeding quota"
            );
            return Err(QuotaError::Exceeded {
                used,
                limit: self.limit,
            });
        }

        Ok(Self {
            quota: union(&self.quota, excerpt),
            segments: self.segments,
            limit: self.limit,
        })
    }
}

/// Figures describing one excerpt evaluated against a quota.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceReport {
    pub excerpt: FragmentSet,
    pub quota: FragmentSet,
    pub segments: u64,
    pub limit: u64,
    /// Segments in the excerpt alone.
    pub excerpt_size: u64,
    /// Segments already used up by the quota.
    pub quota_size: u64,
    /// Segments covered by quota and excerpt together.
    pub used: u64,
    /// Excerpt segments that are already part of the quota.
    pub overlap: u64,
    pub remaining: u64,
    pub excerpt_percent: f64,
    pub used_percent: f64,
    pub exceeded: bool,
}

fn limit_from_percent(segments: u64, percent: f64) -> u64 {
    if !percent.is_finite() || percent <= 0.0 {
        return 0;
    }
    ((segments as f64) * percent / 100.0).floor() as u64
}

fn percent_of(value: u64, segments: u64) -> f64 {
    if segments == 0 {
        0.0
    } else {
        value as f64 / segments as f64 * 100.0
    }
}
