//! Test doubles and common utilities for orchestrator contract tests
//!
//! These doubles replace discovery and the update API so the contract
//! tests can run without touching the network.

#![allow(dead_code)]

use dynip_core::error::{Error, Result};
use dynip_core::traits::{AddressKind, AddressSource, IpStack, RecordUpdateRequest, RecordUpdater};
use dynip_core::{Orchestrator, RecordIds, RunSummary, UpdaterConfig};
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What a scripted source answers
#[derive(Debug, Clone)]
pub enum SourceScript {
    /// Return this stack
    Stack(IpStack),
    /// Fail with `Error::InterfaceNotFound`
    MissingInterface(String),
    /// Fail with a generic address source error
    Broken(String),
}

/// An AddressSource that answers from a script and counts calls
#[derive(Clone)]
pub struct ScriptedAddressSource {
    kind: AddressKind,
    script: SourceScript,
    discover_call_count: Arc<AtomicUsize>,
}

impl ScriptedAddressSource {
    pub fn new(kind: AddressKind, script: SourceScript) -> Self {
        Self {
            kind,
            script,
            discover_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Source returning the given addresses
    pub fn with_addresses(
        kind: AddressKind,
        ipv4: Option<Ipv4Addr>,
        ipv6: Option<Ipv6Addr>,
    ) -> Self {
        Self::new(kind, SourceScript::Stack(IpStack::new(ipv4, ipv6)))
    }

    /// Source returning an empty stack
    pub fn empty(kind: AddressKind) -> Self {
        Self::new(kind, SourceScript::Stack(IpStack::empty()))
    }

    /// Get the number of times discover() was called
    pub fn discover_call_count(&self) -> usize {
        self.discover_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AddressSource for ScriptedAddressSource {
    async fn discover(&self) -> Result<IpStack> {
        self.discover_call_count.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            SourceScript::Stack(stack) => Ok(stack.clone()),
            SourceScript::MissingInterface(name) => Err(Error::interface_not_found(name.clone())),
            SourceScript::Broken(msg) => Err(Error::ip_source(msg.clone())),
        }
    }

    fn kind(&self) -> AddressKind {
        self.kind
    }
}

/// What the fake update API answers for one record id
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Status(u16),
    TransportFailure,
}

/// A RecordUpdater that answers from a per-id script and records requests
///
/// Unscripted ids answer 200.
#[derive(Clone, Default)]
pub struct RecordingUpdater {
    replies: Arc<Mutex<HashMap<String, Reply>>>,
    requests: Arc<Mutex<Vec<RecordUpdateRequest>>>,
}

impl RecordingUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reply for one record id
    pub fn reply(self, id: &str, reply: Reply) -> Self {
        self.replies.lock().unwrap().insert(id.to_string(), reply);
        self
    }

    /// Requests received so far, in dispatch order
    pub fn requests(&self) -> Vec<RecordUpdateRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of update calls
    pub fn update_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl RecordUpdater for RecordingUpdater {
    async fn update_record(&self, request: &RecordUpdateRequest) -> Result<u16> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&request.id)
            .copied()
            .unwrap_or(Reply::Status(200));

        match reply {
            Reply::Status(status) => Ok(status),
            Reply::TransportFailure => Err(Error::http("connection refused")),
        }
    }

    fn updater_name(&self) -> &'static str {
        "recording"
    }
}

/// Config for `example.com` with the given record ids
pub fn config_with(records: RecordIds) -> UpdaterConfig {
    UpdaterConfig::new("example.com")
        .with_password("secret")
        .with_records(records)
}

/// Record ids from `(ia, iaaaa, ea, eaaaa)`
pub fn ids(ia: &str, iaaaa: &str, ea: &str, eaaaa: &str) -> RecordIds {
    RecordIds::new(
        Some(ia.to_string()),
        Some(iaaaa.to_string()),
        Some(ea.to_string()),
        Some(eaaaa.to_string()),
    )
}

/// Run one orchestrator pass and return the printed lines and summary
pub async fn run_once(
    config: UpdaterConfig,
    internal: &ScriptedAddressSource,
    external: &ScriptedAddressSource,
    updater: &RecordingUpdater,
) -> (String, RunSummary) {
    let mut orchestrator = Orchestrator::new(
        config,
        Box::new(internal.clone()),
        Box::new(external.clone()),
        Box::new(updater.clone()),
        Vec::new(),
    )
    .expect("orchestrator construction succeeds");

    let summary = orchestrator.run().await.expect("run succeeds");
    let output = String::from_utf8(orchestrator.into_output()).expect("utf-8 output");
    (output, summary)
}
