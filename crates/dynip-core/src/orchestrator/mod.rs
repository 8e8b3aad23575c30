//! Update orchestrator
//!
//! The Orchestrator is responsible for:
//! - Deciding which of the four record updates were requested
//! - Running internal and external discovery (once each, shared by A and AAAA)
//! - Dispatching one update per requested record
//! - Reporting the outcome of each update as a status line
//!
//! ## Flow
//!
//! ```text
//! ┌───────────────┐     ┌──────────────────┐
//! │ UpdaterConfig │────▶│   Orchestrator   │
//! └───────────────┘     └──────────────────┘
//!                          │      │      │
//!          ┌───────────────┘      │      └────────────────┐
//!          ▼                      ▼                       ▼
//! ┌─────────────────┐   ┌─────────────────┐      ┌───────────────┐
//! │ AddressSource   │   │ RecordUpdater   │      │   Reporter    │
//! │ (internal/ext.) │   │ (one call/rec.) │      │ (status line) │
//! └─────────────────┘   └─────────────────┘      └───────────────┘
//! ```
//!
//! 1. No host configured → one `[INFO]` line, nothing else
//! 2. Internal phase, if an internal id was supplied
//! 3. External phase, if an external id was supplied
//!
//! The phases are independent: a failure in one never prevents the other.

use crate::config::UpdaterConfig;
use crate::error::{Error, Result};
use crate::report::{ErrorCategory, RecordType, Reporter, StatusLine};
use crate::traits::{AddressKind, AddressSource, Discovered, IpFamily, RecordUpdateRequest, RecordUpdater};
use std::io::Write;
use tracing::{debug, error, info, warn};

/// Printed when no host is configured
pub const NO_HOST_MESSAGE: &str = "No host to be updated, my job is done. Exiting";

/// Counts produced by one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Updates answered with a status below 300
    pub updated: usize,
    /// Updates answered with any other status
    pub rejected: usize,
    /// Records that could not be dispatched or whose dispatch failed in transport
    pub failed: usize,
}

impl RunSummary {
    /// Whether every requested record reached the service
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// One-shot update orchestrator
///
/// Holds no state between runs: running twice with the same sources
/// produces the same lines.
pub struct Orchestrator<W: Write> {
    config: UpdaterConfig,
    internal: Box<dyn AddressSource>,
    external: Box<dyn AddressSource>,
    updater: Box<dyn RecordUpdater>,
    reporter: Reporter<W>,
}

impl<W: Write> Orchestrator<W> {
    /// Create a new orchestrator
    ///
    /// # Parameters
    ///
    /// - `config`: Validated before use
    /// - `internal`: Source for internal addresses
    /// - `external`: Source for external addresses
    /// - `updater`: Record updater
    /// - `out`: Sink for status lines (stdout in the binary)
    pub fn new(
        config: UpdaterConfig,
        internal: Box<dyn AddressSource>,
        external: Box<dyn AddressSource>,
        updater: Box<dyn RecordUpdater>,
        out: W,
    ) -> Result<Self> {
        config.validate()?;

        for (source, expected) in [
            (&internal, AddressKind::Internal),
            (&external, AddressKind::External),
        ] {
            if source.kind() != expected {
                return Err(Error::config(format!(
                    "{} address source wired in place of the {} one",
                    source.kind(),
                    expected
                )));
            }
        }

        Ok(Self {
            config,
            internal,
            external,
            updater,
            reporter: Reporter::new(out),
        })
    }

    /// Run the full update sequence once
    ///
    /// # Returns
    ///
    /// - `Ok(RunSummary)`: All phases ran; failures are counted, not raised
    /// - `Err(Error)`: The status sink could not be written
    pub async fn run(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        let Some(host) = self.config.host.clone() else {
            info!("No host configured, nothing to do");
            self.reporter.emit(&StatusLine::info(NO_HOST_MESSAGE))?;
            return Ok(summary);
        };

        if self.config.records.is_empty() {
            warn!("No record ids supplied for {}, nothing to update", host);
        }

        for kind in [AddressKind::Internal, AddressKind::External] {
            if self.config.records.wants(kind) {
                self.run_phase(kind, &host, &mut summary).await?;
            } else {
                debug!("No {} records requested", kind);
            }
        }

        info!(
            "Run finished: {} updated, {} rejected, {} failed",
            summary.updated, summary.rejected, summary.failed
        );
        Ok(summary)
    }

    /// Give back the status sink
    pub fn into_output(self) -> W {
        self.reporter.into_inner()
    }

    async fn run_phase(
        &mut self,
        kind: AddressKind,
        host: &str,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let source = match kind {
            AddressKind::Internal => &self.internal,
            AddressKind::External => &self.external,
        };

        info!("Discovering {} addresses", kind);
        let stack = match source.discover().await {
            Ok(stack) => stack,
            Err(e) if e.is_interface_not_found() => {
                warn!("Skipping internal records: {}", e);
                self.reporter.emit(&StatusLine::info(e.to_string()))?;
                return Ok(());
            }
            Err(e) => {
                error!("{} address discovery failed: {}", kind, e);
                summary.failed += self.requested(kind).len();
                return Ok(());
            }
        };
        debug!("{} stack: {:?}", kind, stack);

        for (record_type, id) in self.requested(kind) {
            let family = record_type.family();
            let value = match stack.get(family) {
                Discovered::Found(ip) => ip,
                Discovered::NotFound => {
                    self.reporter
                        .emit(&StatusLine::info(missing_address_note(kind, family)))?;
                    family.unspecified()
                }
                Discovered::Failed(reason) => {
                    error!(
                        "Skipping {} record {} ({}): {} discovery failed: {}",
                        kind, id, record_type, family, reason
                    );
                    summary.failed += 1;
                    continue;
                }
            };

            let request =
                RecordUpdateRequest::new(id, value.to_string(), self.config.password.clone());
            debug!(
                "Dispatching {} record {} ({}) -> {} via {}",
                kind,
                request.id,
                record_type,
                request.value,
                self.updater.updater_name()
            );

            let status = match self.updater.update_record(&request).await {
                Ok(status) => status,
                Err(e) => {
                    error!(
                        "Update of {} record {} ({}) failed: {}",
                        kind, request.id, record_type, e
                    );
                    summary.failed += 1;
                    continue;
                }
            };

            if status < 300 {
                summary.updated += 1;
                self.reporter.emit(&StatusLine::Updated {
                    host: host.to_string(),
                    id: request.id,
                    record_type,
                    value: request.value,
                })?;
                continue;
            }

            summary.rejected += 1;
            match (kind, ErrorCategory::from_status(status)) {
                (AddressKind::External, Some(category)) => {
                    self.reporter.emit(&StatusLine::Rejected {
                        host: host.to_string(),
                        id: request.id,
                        record_type,
                        category,
                    })?;
                }
                _ => {
                    debug!(
                        "{} record {} ({}) answered with status {}",
                        kind, request.id, record_type, status
                    );
                }
            }
        }

        Ok(())
    }

    /// Requested `(type, id)` pairs of one kind, A first
    fn requested(&self, kind: AddressKind) -> Vec<(RecordType, String)> {
        RecordType::ALL
            .into_iter()
            .filter_map(|record_type| {
                self.config
                    .records
                    .get(kind, record_type)
                    .map(|id| (record_type, id.to_string()))
            })
            .collect()
    }
}

/// Note printed before substituting the unspecified address
pub fn missing_address_note(kind: AddressKind, family: IpFamily) -> String {
    match kind {
        AddressKind::Internal => format!("No {} found on the machine", family),
        AddressKind::External => format!("No external {} found on the machine", family),
    }
}
