//! Output generation for finished analyses.
//!
//! # Submodules
//!
//! - [`text`]: terminal rendering printed to stdout
//! - [`json`]: machine-readable report file
//! - [`markdown`]: human-readable report file
//!
//! # Report Layout
//!
//! ```text
//! report_dir/
//! └── 2025-05-06/
//!     ├── 201530-042_flight-mh370-found-in-2024.json
//!     └── 201530-042_flight-mh370-found-in-2024.md
//! ```

pub mod json;
pub mod markdown;
pub mod text;

use crate::utils::slugify_title;
use chrono::{DateTime, Local};

const SLUG_LEN: usize = 60;

/// Where the reports of one analysis go.
///
/// Computed once per analysis so the JSON and Markdown files share a
/// directory and a stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLocation {
    /// `report_dir/YYYY-MM-DD`
    pub dir: String,
    /// `HHMMSS-mmm_slug`, without extension
    pub stem: String,
}

impl ReportLocation {
    /// Location for a report on `claim` written at `now`.
    ///
    /// # Arguments
    ///
    /// * `report_dir` - Root report directory given on the command line
    /// * `claim` - The analyzed claim, slugified into the file name
    /// * `now` - Timestamp that picks the date directory and the time prefix
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let loc = ReportLocation::new("reports", "Flight MH370 found", now);
    /// // reports/2025-05-06 and 201530-042_flight-mh370-found
    /// ```
    pub fn new(report_dir: &str, claim: &str, now: DateTime<Local>) -> Self {
        Self {
            dir: format!("{}/{}", report_dir.trim_end_matches('/'), now.date_naive()),
            stem: format!(
                "{}_{}",
                now.format("%H%M%S-%3f"),
                slugify_title(claim, SLUG_LEN)
            ),
        }
    }

    /// Full path of the report file with extension `ext`.
    pub fn path(&self, ext: &str) -> String {
        format!("{}/{}.{ext}", self.dir, self.stem)
    }
}

/// Filled/empty bar for a 0..=100 percentage, `width` cells wide.
pub fn confidence_bar(percent: u8, width: usize) -> String {
    let filled = usize::from(percent.min(100)) * width / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
