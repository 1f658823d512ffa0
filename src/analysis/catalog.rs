//! Catalog search: filtering, pagination, and the pending queue.

use crate::analysis::buckets::parse_timestamp;
use crate::models::{Page, Report, Status};
use chrono::{NaiveDate, TimeZone};

/// Default page size for catalog listings.
pub const DEFAULT_LIMIT: usize = 10;

/// Criteria for narrowing the report catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    /// Exact report id, compared as text.
    pub id: Option<String>,
    pub category_id: Option<i64>,
    pub status_id: Option<i64>,
    /// Inclusive lower bound on the creation date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date.
    pub date_to: Option<NaiveDate>,
}

impl ReportFilter {
    /// Only reports waiting for triage.
    pub fn pending() -> Self {
        Self {
            status_id: Some(Status::Pending.id()),
            ..Default::default()
        }
    }

    /// Query parameters understood by `GET /reports/admin/all`.
    ///
    /// The id filter has no server-side counterpart and is applied locally.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(category) = self.category_id {
            params.push(("categoryId", category.to_string()));
        }
        if let Some(status) = self.status_id {
            params.push(("statusId", status.to_string()));
        }
        if let Some(from) = self.date_from {
            params.push(("dateFrom", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.date_to {
            params.push(("dateTo", to.format("%Y-%m-%d").to_string()));
        }
        params
    }

    /// Check a report against every criterion. Dates are compared in `tz`.
    pub fn matches<Tz: TimeZone>(&self, report: &Report, tz: &Tz) -> bool {
        if let Some(ref id) = self.id {
            let id = id.trim();
            if !id.is_empty() && report.id.to_string() != id {
                return false;
            }
        }
        if self.category_id.is_some_and(|c| c != report.category_id) {
            return false;
        }
        if self.status_id.is_some_and(|s| s != report.status_id) {
            return false;
        }

        if self.date_from.is_none() && self.date_to.is_none() {
            return true;
        }

        let Some(created) = parse_timestamp(&report.created_at, tz) else {
            return false;
        };
        let day = created.date_naive();
        if self.date_from.is_some_and(|from| day < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| day > to) {
            return false;
        }

        true
    }

    /// Keep only the reports that match, preserving order.
    pub fn apply<Tz: TimeZone>(&self, reports: Vec<Report>, tz: &Tz) -> Vec<Report> {
        reports
            .into_iter()
            .filter(|report| self.matches(report, tz))
            .collect()
    }
}

/// Slice `items` into a 1-based page of `limit` entries.
pub fn paginate<T: Clone>(items: &[T], page: usize, limit: usize) -> Page<T> {
    let page = page.max(1);
    let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
    let start = (page - 1).saturating_mul(limit);

    let data = items.iter().skip(start).take(limit).cloned().collect();

    Page {
        data,
        total: items.len(),
        page,
        limit,
        total_pages: items.len().div_ceil(limit),
    }
}

/// The first report still waiting for triage, if any.
pub fn next_pending(reports: &[Report]) -> Option<&Report> {
    reports
        .iter()
        .find(|report| report.status() == Some(Status::Pending))
}
