//! HTTP client for the oFraud reports API.
//!
//! Wraps the admin endpoints used by the console: listing, reading,
//! updating and deleting reports, managing report comments, and working
//! the help-request queue.

use crate::analysis::ReportFilter;
use crate::models::{
    CreateCommentRequest, HelpRequest, Report, ReportComment, RespondHelpRequest,
    UpdateReportRequest,
};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors returned by the reports API client.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to reports API at {0}. Is the backend running?")]
    Connect(String),

    #[error("reports API error {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode API response: {0}")]
    Decode(String),

    #[error("failed to send request: {0}")]
    Request(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// Connection settings for the reports API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

/// Client for the reports endpoints.
pub struct ReportsClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl ReportsClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SourceError::Config(e.to_string()))?;

        debug!("Reports client targeting {}", config.base_url);
        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout(self.config.timeout_seconds)
        } else if e.is_connect() {
            SourceError::Connect(self.config.base_url.clone())
        } else {
            SourceError::Request(e.to_string())
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response, SourceError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status { status, body });
        }

        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SourceError> {
        self.execute(request)
            .await?
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }

    /// Fetch every report visible to an administrator.
    ///
    /// Category, status and date criteria are forwarded to the API; the id
    /// criterion is left to the caller.
    pub async fn list_all(&self, filter: &ReportFilter) -> Result<Vec<Report>, SourceError> {
        let request = self
            .http_client
            .get(self.endpoint("/reports/admin/all"))
            .query(&filter.query_params());

        // The API answers `null` when there is nothing to list.
        let reports: Option<Vec<Report>> = self.fetch(request).await?;
        let reports = reports.unwrap_or_default();
        info!("Fetched {} reports", reports.len());
        Ok(reports)
    }

    /// Like [`list_all`](Self::list_all), but degrades to an empty list when the
    /// API cannot be reached, so the dashboard still renders.
    pub async fn list_all_or_empty(&self, filter: &ReportFilter) -> Vec<Report> {
        match self.list_all(filter).await {
            Ok(reports) => reports,
            Err(e) => {
                warn!("Error fetching reports, continuing with none: {}", e);
                Vec::new()
            }
        }
    }

    /// Fetch a single report.
    pub async fn get(&self, id: i64) -> Result<Report, SourceError> {
        let request = self.http_client.get(self.endpoint(&format!("/reports/{}", id)));
        self.fetch(request).await
    }

    /// Update a report through the admin endpoint.
    pub async fn update(&self, id: i64, update: &UpdateReportRequest) -> Result<Report, SourceError> {
        debug!("Updating report {}: {:?}", id, update);
        let request = self
            .http_client
            .put(self.endpoint(&format!("/reports/admin/{}", id)))
            .json(update);
        self.fetch(request).await
    }

    /// Delete a report.
    pub async fn delete(&self, id: i64) -> Result<(), SourceError> {
        let request = self
            .http_client
            .delete(self.endpoint(&format!("/reports/{}", id)));
        self.execute(request).await?;
        Ok(())
    }

    /// List the comments attached to a report.
    pub async fn comments(&self, report_id: i64) -> Result<Vec<ReportComment>, SourceError> {
        let request = self
            .http_client
            .get(self.endpoint(&format!("/reports/{}/comments", report_id)));
        self.fetch(request).await
    }

    /// Attach a comment to a report.
    pub async fn add_comment(
        &self,
        report_id: i64,
        comment: &CreateCommentRequest,
    ) -> Result<ReportComment, SourceError> {
        let request = self
            .http_client
            .post(self.endpoint(&format!("/reports/{}/comments", report_id)))
            .json(comment);
        self.fetch(request).await
    }

    /// Replace the text and visibility of an existing comment.
    pub async fn update_comment(
        &self,
        comment_id: i64,
        comment: &CreateCommentRequest,
    ) -> Result<ReportComment, SourceError> {
        let request = self
            .http_client
            .put(self.endpoint(&format!("/reports/comments/{}", comment_id)))
            .json(comment);
        self.fetch(request).await
    }

    /// Delete a comment.
    pub async fn delete_comment(&self, comment_id: i64) -> Result<(), SourceError> {
        let request = self
            .http_client
            .delete(self.endpoint(&format!("/reports/comments/{}", comment_id)));
        self.execute(request).await?;
        Ok(())
    }

    /// List help requests, either all of them or only the pending ones.
    pub async fn help_requests(&self, pending_only: bool) -> Result<Vec<HelpRequest>, SourceError> {
        let path = if pending_only {
            "/help-requests/admin/pending"
        } else {
            "/help-requests/admin/all"
        };
        let requests: Option<Vec<HelpRequest>> =
            self.fetch(self.http_client.get(self.endpoint(path))).await?;
        let requests = requests.unwrap_or_default();
        info!("Fetched {} help requests", requests.len());
        Ok(requests)
    }

    pub async fn help_request(&self, id: i64) -> Result<HelpRequest, SourceError> {
        let request = self
            .http_client
            .get(self.endpoint(&format!("/help-requests/{}", id)));
        self.fetch(request).await
    }

    /// Claim a help request for the authenticated administrator.
    pub async fn assign_help_request(&self, id: i64) -> Result<HelpRequest, SourceError> {
        let request = self
            .http_client
            .patch(self.endpoint(&format!("/help-requests/{}/assign", id)));
        self.fetch(request).await
    }

    /// Answer a help request and move it to a new status.
    pub async fn respond_help_request(
        &self,
        id: i64,
        response: &RespondHelpRequest,
    ) -> Result<HelpRequest, SourceError> {
        debug!("Responding to help request {} with status {}", id, response.status);
        let request = self
            .http_client
            .patch(self.endpoint(&format!("/help-requests/{}/respond", id)))
            .json(response);
        self.fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_client() -> ReportsClient {
        ReportsClient::new(ClientConfig {
            // Port 1 is reserved and refuses connections on loopback.
            base_url: "http://127.0.0.1:1/".to_string(),
            token: Some("secret".to_string()),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let client = unreachable_client();
        assert_eq!(
            client.endpoint("/reports/admin/all"),
            "http://127.0.0.1:1/reports/admin/all"
        );
    }

    #[test]
    fn test_connect_failure_is_reported() {
        let client = unreachable_client();
        let err = tokio_test::block_on(client.get(7)).unwrap_err();
        assert!(matches!(err, SourceError::Connect(_)), "got {:?}", err);
    }

    #[test]
    fn test_list_all_or_empty_falls_back() {
        let client = unreachable_client();
        let reports = tokio_test::block_on(client.list_all_or_empty(&ReportFilter::default()));
        assert!(reports.is_empty());
    }

    #[test]
    fn test_help_and_comment_calls_report_connect_errors() {
        let client = unreachable_client();
        let err = tokio_test::block_on(client.help_requests(true)).unwrap_err();
        assert!(matches!(err, SourceError::Connect(_)), "got {:?}", err);
        let err = tokio_test::block_on(client.delete_comment(3)).unwrap_err();
        assert!(matches!(err, SourceError::Connect(_)), "got {:?}", err);
    }

    #[test]
    fn test_status_error_message() {
        let err = SourceError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: "invalid token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "reports API error 401 Unauthorized: invalid token"
        );
    }
}
