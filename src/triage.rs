//! Triage actions: accepting or rejecting a report, editing comments,
//! and answering help requests.

use crate::models::{
    CreateCommentRequest, HelpRequest, HelpStatus, Report, ReportComment, RespondHelpRequest,
    Status, UpdateReportRequest,
};
use crate::source::ReportsClient;
use anyhow::{bail, Context, Result};
use tracing::{debug, info};

/// Outcome an administrator assigns to a pending report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn status(self) -> Status {
        match self {
            Decision::Accept => Status::Accepted,
            Decision::Reject => Status::Rejected,
        }
    }
}

/// Choose the administrator who takes over an accepted report.
///
/// The choice is spread over the pool by report id, so retries of the same
/// report land on the same admin.
pub fn pick_admin(pool: &[i64], report_id: i64) -> Option<i64> {
    if pool.is_empty() {
        return None;
    }
    let slot = report_id.rem_euclid(pool.len() as i64) as usize;
    pool.get(slot).copied()
}

/// Build the update sent for a decision.
pub fn decision_update(decision: Decision, report_id: i64, admin_pool: &[i64]) -> UpdateReportRequest {
    let assigned_admin_id = match decision {
        Decision::Accept => pick_admin(admin_pool, report_id),
        Decision::Reject => None,
    };

    UpdateReportRequest {
        status_id: Some(decision.status().id()),
        assigned_admin_id,
        ..Default::default()
    }
}

/// Build a comment body, or `None` when the text is blank.
pub fn comment_request(comment: Option<&str>, is_internal: bool) -> Option<CreateCommentRequest> {
    let comment = comment?.trim();
    if comment.is_empty() {
        return None;
    }
    Some(CreateCommentRequest {
        comment: comment.to_string(),
        is_internal,
    })
}

/// Apply a decision to a report, then attach the optional comment.
pub async fn resolve(
    client: &ReportsClient,
    report_id: i64,
    decision: Decision,
    comment: Option<&str>,
    is_internal: bool,
    admin_pool: &[i64],
) -> Result<Report> {
    let update = decision_update(decision, report_id, admin_pool);
    debug!("Resolving report {} with {:?}", report_id, update);

    let report = client
        .update(report_id, &update)
        .await
        .with_context(|| format!("Failed to update report {}", report_id))?;
    info!("Report {} marked as {}", report_id, decision.status());

    if let Some(body) = comment_request(comment, is_internal) {
        client
            .add_comment(report_id, &body)
            .await
            .with_context(|| format!("Report {} updated but the comment was not saved", report_id))?;
        info!("Comment added to report {}", report_id);
    }

    Ok(report)
}

/// Replace the text of a comment. Blank text is refused.
pub async fn edit_comment(
    client: &ReportsClient,
    comment_id: i64,
    comment: &str,
    is_internal: bool,
) -> Result<ReportComment> {
    let Some(body) = comment_request(Some(comment), is_internal) else {
        bail!("Comment text cannot be empty");
    };

    let updated = client
        .update_comment(comment_id, &body)
        .await
        .with_context(|| format!("Failed to update comment {}", comment_id))?;
    info!("Comment {} updated", comment_id);
    Ok(updated)
}

/// Build a help response body, or `None` when the text is blank.
pub fn respond_request(response: &str, status: HelpStatus) -> Option<RespondHelpRequest> {
    let response = response.trim();
    if response.is_empty() {
        return None;
    }
    Some(RespondHelpRequest {
        admin_response: response.to_string(),
        status,
    })
}

/// Take ownership of a pending, unassigned help request.
pub async fn claim_help_request(client: &ReportsClient, id: i64) -> Result<HelpRequest> {
    let current = client
        .help_request(id)
        .await
        .with_context(|| format!("Failed to fetch help request {}", id))?;
    if !current.can_assign() {
        bail!(
            "Help request {} cannot be assigned (status: {}, admin: {})",
            id,
            current.status_label(),
            current
                .assigned_admin()
                .map(|admin| admin.to_string())
                .unwrap_or_else(|| "none".to_string())
        );
    }

    let claimed = client
        .assign_help_request(id)
        .await
        .with_context(|| format!("Failed to assign help request {}", id))?;
    info!("Help request {} assigned", id);
    Ok(claimed)
}

/// Answer an open help request and move it to `status`.
pub async fn answer_help_request(
    client: &ReportsClient,
    id: i64,
    response: &str,
    status: HelpStatus,
) -> Result<HelpRequest> {
    let Some(body) = respond_request(response, status) else {
        bail!("Response text cannot be empty");
    };

    let current = client
        .help_request(id)
        .await
        .with_context(|| format!("Failed to fetch help request {}", id))?;
    if !current.can_respond() {
        bail!(
            "Help request {} is {} and no longer accepts responses",
            id,
            current.status_label()
        );
    }

    let answered = client
        .respond_help_request(id, &body)
        .await
        .with_context(|| format!("Failed to respond to help request {}", id))?;
    info!("Help request {} answered ({})", id, status);
    Ok(answered)
}
