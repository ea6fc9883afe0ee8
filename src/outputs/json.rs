//! JSON report output.
//!
//! The whole [`Analysis`] is serialized, including the evidence, the warnings
//! and the raw model reply, so a report can be inspected or re-parsed later.

use super::ReportLocation;
use crate::pipeline::Analysis;
use crate::utils::ensure_writable_dir;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// Write `analysis` as pretty JSON at `location` and return the file path.
#[instrument(level = "info", skip_all, fields(dir = %location.dir))]
pub async fn write_report(
    analysis: &Analysis,
    location: &ReportLocation,
) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(analysis)?;
    ensure_writable_dir(&location.dir).await?;

    let path = location.path("json");
    fs::write(&path, json).await?;
    info!(%path, "Wrote JSON report");
    Ok(path)
}
