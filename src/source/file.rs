//! Loading report exports from disk.

use crate::models::Report;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Read a JSON array of reports, as returned by `GET /reports/admin/all`.
pub fn load_reports_file(path: &Path) -> Result<Vec<Report>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read reports file: {}", path.display()))?;

    let reports: Vec<Report> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse reports file: {}", path.display()))?;

    info!("Loaded {} reports from {}", reports.len(), path.display());
    Ok(reports)
}
