//! Configuration settings for the repo tally core functionality.
//!
//! This module centralizes the paging limits, truncation thresholds and the
//! analysis window used throughout the crate.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::TallyError;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// The year analysed when none is configured
pub const DEFAULT_ANALYSIS_YEAR: i32 = 2025;

/// Page size used for every paged listing
pub const PAGE_SIZE: u32 = 100;

/// Upper bound on the number of commits collected for one repository
pub const MAX_COMMITS_PER_REPOSITORY: usize = 5000;

/// Upper bound on the number of repository pages requested, guards against runaway paging
pub const MAX_REPOSITORY_PAGES: u32 = 1000;

/// GitHub stops listing files of a commit at this many entries
pub const TRUNCATED_FILE_COUNT: usize = 300;

/// Commits changing more lines than this lose their per-file breakdown
pub const TRUNCATED_TOTAL_CHANGES: u64 = 50_000;

/// The number of entries shown in each top-N section of the summary
pub const SUMMARY_TOP_N: usize = 10;

/// The closed time window over which commits are counted.
///
/// # Examples
///
/// ```
/// use repo_tally_core::config::AnalysisPeriod;
///
/// let period = AnalysisPeriod::for_year(2024).unwrap();
/// assert_eq!(period.since.to_rfc3339(), "2024-01-01T00:00:00+00:00");
/// assert_eq!(period.until.to_rfc3339(), "2024-12-31T23:59:59+00:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    /// The calendar year being analysed
    pub year: i32,

    /// First instant of the window, inclusive
    pub since: DateTime<Utc>,

    /// Last instant of the window, inclusive
    pub until: DateTime<Utc>,
}

impl AnalysisPeriod {
    /// Creates the window covering a full calendar year in UTC.
    ///
    /// # Errors
    ///
    /// Returns `TallyError::InvalidPeriod` for years outside 1970 to 9999.
    pub fn for_year(year: i32) -> Result<Self, TallyError> {
        if !(1970..=9999).contains(&year) {
            return Err(TallyError::InvalidPeriod(format!(
                "year {} is outside the supported range 1970-9999",
                year
            )));
        }

        let start = NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        let end = NaiveDate::from_ymd_opt(year, 12, 31).and_then(|d| d.and_hms_opt(23, 59, 59));
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self {
                year,
                since: Utc.from_utc_datetime(&start),
                until: Utc.from_utc_datetime(&end),
            }),
            _ => Err(TallyError::InvalidPeriod(format!(
                "year {} has no valid calendar bounds",
                year
            ))),
        }
    }

    /// Whether the instant lies inside the window, bounds included.
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.since && *instant <= self.until
    }
}
