// # HTTP Record Updater
//
// This crate provides the record updater for the password-authenticated
// update API.
//
// ## Behavior
//
// - Makes ONE HTTP request per update, no retries
// - Returns the raw status code; classification is the orchestrator's job
// - Transport failures are returned as errors, never panics
// - Dry-run mode logs the intended request and answers 200
//
// ## Security Requirements
//
// - The password travels as a query parameter, so the request URL is
//   NEVER logged or included in error messages
//
// ## API Reference
//
// ```http
// GET /api/v1/remote/updatepw?record={id}&password={password}&content={value}
// ```

use async_trait::async_trait;
use dynip_core::traits::{RecordUpdateRequest, RecordUpdater};
use dynip_core::{ApiEndpoint, Error, Result};
use std::time::Duration;

/// Path of the update endpoint
pub const UPDATE_PATH: &str = "/api/v1/remote/updatepw";

/// Connection establishment timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// TCP keep-alive interval
const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

/// Status reported for updates skipped in dry-run mode
const DRY_RUN_STATUS: u16 = 200;

/// Record updater for the `updatepw` endpoint
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the updater will:
/// - Log the intended request with the password redacted
/// - **NOT** contact the API
/// - Report status 200
pub struct HttpRecordUpdater {
    /// Scheme and host of the update API
    endpoint: ApiEndpoint,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, skip the request
    dry_run: bool,
}

impl std::fmt::Debug for HttpRecordUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRecordUpdater")
            .field("endpoint", &self.endpoint)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl HttpRecordUpdater {
    /// Create a new updater
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Scheme and host of the update API
    /// - `dry_run`: If true, log updates instead of sending them
    pub fn new(endpoint: ApiEndpoint, dry_run: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .tcp_keepalive(TCP_KEEPALIVE)
            .no_proxy()
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            client,
            dry_run,
        })
    }

    /// Build the update URL
    ///
    /// Values are interpolated as-is, without escaping.
    pub fn update_url(&self, request: &RecordUpdateRequest) -> String {
        self.endpoint.url(&format!(
            "{}?record={}&password={}&content={}",
            UPDATE_PATH, request.id, request.password, request.value
        ))
    }
}

#[async_trait]
impl RecordUpdater for HttpRecordUpdater {
    async fn update_record(&self, request: &RecordUpdateRequest) -> Result<u16> {
        tracing::info!(
            "Updating record {} on {} -> {} [mode: {}]",
            request.id,
            self.endpoint.host(),
            request.value,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send GET {}",
                self.endpoint.url(&format!(
                    "{}?record={}&password=<REDACTED>&content={}",
                    UPDATE_PATH, request.id, request.value
                ))
            );
            return Ok(DRY_RUN_STATUS);
        }

        let response = self
            .client
            .get(self.update_url(request))
            .send()
            .await
            .map_err(|e| {
                Error::http(format!(
                    "Update request for record {} failed: {}",
                    request.id,
                    e.without_url()
                ))
            })?;

        let status = response.status().as_u16();
        tracing::debug!("Record {} answered {}", request.id, status);
        Ok(status)
    }

    fn updater_name(&self) -> &'static str {
        "updatepw"
    }
}
