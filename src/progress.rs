//! Progress tracking and elapsed-time formatting for long passes.
//!
//! The dereplicator reports progress via callbacks, allowing callers to
//! monitor a pass over a large file.
//!
//! # Example
//!
//! ```rust
//! use seqsift::progress::{format_hms, Progress};
//! use std::time::Duration;
//!
//! let progress = Progress { records_processed: 50, total_records: Some(200) };
//! assert_eq!(progress.percent_complete(), Some(25.0));
//! assert_eq!(format_hms(Duration::from_secs(3725)), "1:02:05");
//! ```

use std::time::Duration;

/// Progress snapshot during a pass over sequence records.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Progress {
    /// Number of records processed so far.
    pub records_processed: u64,
    /// Expected number of records, when known in advance.
    pub total_records: Option<u64>,
}

impl Progress {
    /// Percentage of the expected records processed, if a total is known.
    ///
    /// Capped at 100 since the total is an estimate.
    #[must_use]
    pub fn percent_complete(&self) -> Option<f64> {
        match self.total_records {
            Some(0) | None => None,
            Some(total) => Some((100.0 * self.records_processed as f64 / total as f64).min(100.0)),
        }
    }
}

/// Counts records and decides when a progress report is due.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    records: u64,
    total: Option<u64>,
    interval: u64,
}

impl ProgressTracker {
    /// Default number of records between reports.
    pub const DEFAULT_INTERVAL: u64 = 10_000;

    /// Create a tracker with an optional expected total.
    #[must_use]
    pub fn new(total: Option<u64>) -> Self {
        Self {
            records: 0,
            total,
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    /// Report every `interval` records (minimum 1).
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Record one processed record.
    ///
    /// Returns a snapshot when a report is due.
    pub fn record(&mut self) -> Option<Progress> {
        self.records += 1;
        (self.records % self.interval == 0).then(|| self.snapshot())
    }

    /// Get a snapshot of the current progress.
    #[must_use]
    pub fn snapshot(&self) -> Progress {
        Progress {
            records_processed: self.records,
            total_records: self.total,
        }
    }
}

/// Formats a duration as `H:MM:SS`, truncating fractional seconds.
#[must_use]
pub fn format_hms(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
