// # Record Updater Trait
//
// Defines the interface for pushing a value to a remote record.
//
// ## Implementations
//
// - Password-authenticated `updatepw` endpoint: `dynip-provider-http` crate

use async_trait::async_trait;

/// One pending record update
///
/// Built right before dispatch and dropped after the call. The API host is
/// not part of the request; each updater is bound to its endpoint.
/// The Debug implementation does NOT expose the password.
#[derive(Clone, PartialEq, Eq)]
pub struct RecordUpdateRequest {
    /// Opaque record identifier
    pub id: String,
    /// New record content
    pub value: String,
    /// Password for the record
    pub password: String,
}

impl RecordUpdateRequest {
    pub fn new(
        id: impl Into<String>,
        value: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for RecordUpdateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordUpdateRequest")
            .field("id", &self.id)
            .field("value", &self.value)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

/// Trait for record update implementations
///
/// Implementations are stateless and single-shot: one HTTP request per
/// call, no retries. The returned status code is not interpreted here;
/// classification belongs to the orchestrator.
#[async_trait]
pub trait RecordUpdater: Send + Sync {
    /// Apply one update and return the raw HTTP status code
    ///
    /// # Returns
    ///
    /// - `Ok(status)`: The service answered
    /// - `Err(Error)`: Transport failure (resolution, connect, timeout)
    async fn update_record(&self, request: &RecordUpdateRequest) -> Result<u16, crate::Error>;

    /// Updater name (for logging)
    fn updater_name(&self) -> &'static str;
}
