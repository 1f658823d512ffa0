//! Markdown and JSON rendering.
//!
//! This module renders dashboard statistics, catalog pages, single
//! reports, comment threads and the help-request queue for the terminal
//! or a file.

use crate::analysis::help::StatusTab;
use crate::models::{
    category_label, status_label, DashboardStats, HelpRequest, Page, Report, ReportComment,
};
use anyhow::Result;
use serde::Serialize;

/// Width of the inline bar charts, in characters.
const BAR_WIDTH: usize = 20;

/// Generate the complete Markdown dashboard.
pub fn generate_markdown_dashboard(stats: &DashboardStats, source: &str, reference: &str) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# oFraud Dashboard\n\n");

    output.push_str(&generate_metadata_section(stats, source, reference));
    output.push_str(&generate_breakdown_section(stats));
    output.push_str(&generate_timeline_section(stats));
    output.push_str(&generate_resolution_section(stats));

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(stats: &DashboardStats, source: &str, reference: &str) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", source));
    section.push_str(&format!("- **Reference Time:** {}\n", reference));
    section.push_str(&format!("- **Total Reports:** {}\n", stats.total_reports));
    section.push('\n');

    section
}

/// Generate the category and status breakdowns.
fn generate_breakdown_section(stats: &DashboardStats) -> String {
    let mut section = String::new();

    section.push_str("## Reports by Category\n\n");
    if stats.reports_by_type.is_empty() {
        section.push_str("No reports.\n\n");
    } else {
        section.push_str("| Category | Count |\n");
        section.push_str("|:---|:---:|\n");
        for entry in &stats.reports_by_type {
            section.push_str(&format!("| {} | {} |\n", entry.category, entry.count));
        }
        section.push('\n');
    }

    section.push_str("## Reports by Status\n\n");
    if stats.reports_by_status.is_empty() {
        section.push_str("No reports.\n\n");
    } else {
        section.push_str("| Status | Count |\n");
        section.push_str("|:---|:---:|\n");
        for entry in &stats.reports_by_status {
            section.push_str(&format!("| {} | {} |\n", entry.status, entry.count));
        }
        section.push('\n');
    }

    section
}

/// Generate the weekly and monthly volume charts.
fn generate_timeline_section(stats: &DashboardStats) -> String {
    let mut section = String::new();

    section.push_str("## Weekly Volume\n\n```\n");
    let max = stats.reports_by_week.iter().map(|w| w.count).max().unwrap_or(0);
    for entry in &stats.reports_by_week {
        section.push_str(&format!(
            "{:<7} {:<width$} {}\n",
            entry.week,
            bar(entry.count, max),
            entry.count,
            width = BAR_WIDTH
        ));
    }
    section.push_str("```\n\n");

    section.push_str("## Monthly Volume\n\n```\n");
    let max = stats.reports_by_month.iter().map(|m| m.count).max().unwrap_or(0);
    for entry in &stats.reports_by_month {
        section.push_str(&format!(
            "{:<7} {:<width$} {}\n",
            entry.month,
            bar(entry.count, max),
            entry.count,
            width = BAR_WIDTH
        ));
    }
    section.push_str("```\n\n");

    section
}

/// Generate response time, admin workload, and acceptance trend tables.
fn generate_resolution_section(stats: &DashboardStats) -> String {
    let mut section = String::new();

    section.push_str("## Response Time\n\n");
    if stats.response_time.is_empty() {
        section.push_str("No resolved reports yet.\n\n");
    } else {
        section.push_str("| Status | Avg. Days | Reports |\n");
        section.push_str("|:---|:---:|:---:|\n");
        for entry in &stats.response_time {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                entry.status, entry.avg_days, entry.count
            ));
        }
        section.push('\n');
    }

    section.push_str("## Admin Workload\n\n");
    if stats.reports_by_admin.is_empty() {
        section.push_str("No reports.\n\n");
    } else {
        section.push_str("| Admin | Reports | Resolved | Pending |\n");
        section.push_str("|:---|:---:|:---:|:---:|\n");
        for entry in &stats.reports_by_admin {
            section.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                entry.admin_name, entry.count, entry.resolved, entry.pending
            ));
        }
        section.push('\n');
    }

    section.push_str("## Acceptance Trend\n\n");
    section.push_str("| Period | Accepted | Rejected | Acceptance % | Rejection % |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|\n");
    for point in &stats.acceptance_trend {
        section.push_str(&format!(
            "| {} | {} | {} | {}% | {}% |\n",
            point.period, point.accepted, point.rejected, point.acceptance_rate, point.rejection_rate
        ));
    }
    section.push('\n');

    section
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (count * BAR_WIDTH).div_ceil(max);
    "█".repeat(len)
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Generated by fraudboard*\n".to_string()
}

/// Render one page of the catalog as a Markdown table.
pub fn generate_markdown_catalog(page: &Page<Report>) -> String {
    let mut output = String::new();

    output.push_str("# Report Catalog\n\n");
    output.push_str(&format!(
        "Showing {} of {} reports (page {} of {})\n\n",
        page.data.len(),
        page.total,
        page.page,
        page.total_pages.max(1)
    ));

    if page.data.is_empty() {
        output.push_str("No reports match the search.\n");
        return output;
    }

    output.push_str("| ID | Title | Category | Status | Admin | Created |\n");
    output.push_str("|:---:|:---|:---|:---|:---:|:---|\n");
    for report in &page.data {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            report.id,
            escape_cell(&report.title),
            category_label(report.category_id),
            status_label(report.status_id),
            report
                .assigned_admin()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            report.created_at
        ));
    }

    output
}

/// Render a single report with all its fields.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    let title = if report.title.is_empty() {
        "(sin título)"
    } else {
        &report.title
    };
    output.push_str(&format!("# Report #{}: {}\n\n", report.id, title));
    output.push_str(&format!("- **Category:** {}\n", category_label(report.category_id)));
    output.push_str(&format!("- **Status:** {}\n", status_label(report.status_id)));
    match report.assigned_admin() {
        Some(id) => output.push_str(&format!("- **Assigned Admin:** {}\n", id)),
        None => output.push_str("- **Assigned Admin:** Sin asignar\n"),
    }
    if let Some(ref date) = report.incident_date {
        output.push_str(&format!("- **Incident Date:** {}\n", date));
    }
    if let Some(ref location) = report.location {
        output.push_str(&format!("- **Location:** {}\n", location));
    }
    if let Some(ref url) = report.evidence_url {
        output.push_str(&format!("- **Evidence:** {}\n", url));
    }
    output.push_str(&format!("- **Anonymous:** {}\n", if report.is_anonymous { "yes" } else { "no" }));
    output.push_str(&format!("- **Created:** {}\n", report.created_at));
    output.push_str(&format!("- **Updated:** {}\n\n", report.updated_at));

    if !report.description.is_empty() {
        output.push_str(&report.description);
        output.push('\n');
    }

    output
}

/// Render the comment thread of a report.
pub fn generate_markdown_comments(report_id: i64, comments: &[ReportComment]) -> String {
    let mut output = format!("# Comments on report #{}\n\n", report_id);

    if comments.is_empty() {
        output.push_str("No comments.\n");
        return output;
    }

    for comment in comments {
        let author = comment
            .admin_name
            .clone()
            .unwrap_or_else(|| format!("Admin {}", comment.admin_id));
        let visibility = if comment.is_internal { " (internal)" } else { "" };
        output.push_str(&format!(
            "- **{}**{} at {}: {}\n",
            author, visibility, comment.created_at, comment.comment
        ));
    }

    output
}

/// Render the help-request queue with its status tab counts.
pub fn generate_markdown_help_requests(queue: &[HelpRequest], tabs: &[StatusTab]) -> String {
    let mut output = String::from("# Help Requests\n\n");

    let summary: Vec<String> = tabs
        .iter()
        .map(|tab| format!("{} ({})", tab.label, tab.count))
        .collect();
    output.push_str(&format!("{}\n\n", summary.join(" · ")));

    if queue.is_empty() {
        output.push_str("No help requests to show.\n");
        return output;
    }

    output.push_str("| ID | Priority | Status | Title | User | Assigned | Created |\n");
    output.push_str("|:---:|:---|:---|:---|:---|:---|:---|\n");
    for request in queue {
        let priority = request
            .priority()
            .map(|p| p.label())
            .unwrap_or(request.priority.as_str());
        let user = request
            .user_name
            .clone()
            .or_else(|| request.user_id.map(|id| format!("Usuario {}", id)))
            .unwrap_or_else(|| "-".to_string());
        let assigned = request
            .assigned_admin_name
            .clone()
            .or_else(|| request.assigned_admin().map(|id| format!("Admin {}", id)))
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            request.id,
            priority,
            request.status_label(),
            escape_cell(&request.title),
            escape_cell(&user),
            escape_cell(&assigned),
            request.created_at
        ));
    }

    let answered: Vec<&HelpRequest> = queue
        .iter()
        .filter(|request| request.admin_response.is_some())
        .collect();
    if !answered.is_empty() {
        output.push_str("\n## Responses\n\n");
        for request in answered {
            output.push_str(&format!(
                "- **#{}** {}: {}\n",
                request.id,
                request.responded_at.as_deref().unwrap_or("-"),
                request.admin_response.as_deref().unwrap_or_default()
            ));
        }
    }

    output
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Generate a JSON document.
pub fn generate_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
