//! Contract Test: Phase Independence & Partial Results
//!
//! A problem in one branch must not take down the others.
//!
//! Constraints verified:
//! - A missing interface is reported and the external phase still runs
//! - A malformed answer for one family skips only that family's record
//! - A transport failure on one update does not stop the next update
//! - Identical inputs produce byte-identical output across runs

mod common;

use common::*;
use dynip_core::traits::{Discovered, IpStack};
use dynip_core::{AddressKind, Orchestrator, UpdaterConfig};
use std::net::Ipv4Addr;

#[tokio::test]
async fn missing_interface_does_not_block_external_phase() {
    let internal = ScriptedAddressSource::new(
        AddressKind::Internal,
        SourceScript::MissingInterface("lo9".to_string()),
    );
    let external = ScriptedAddressSource::with_addresses(
        AddressKind::External,
        Some(Ipv4Addr::new(198, 51, 100, 9)),
        None,
    );
    let updater = RecordingUpdater::new();

    let (output, summary) = run_once(
        config_with(ids("1", "", "7", "")),
        &internal,
        &external,
        &updater,
    )
    .await;

    assert_eq!(
        output,
        "[INFO]Interface not found: lo9\n\
         [UPDATED]host:example.com,id:7,type:A,value:198.51.100.9\n"
    );
    assert_eq!(updater.update_call_count(), 1);
    assert!(summary.is_clean(), "missing interface is not a failure");
}

#[tokio::test]
async fn broken_discovery_counts_every_requested_record() {
    let internal = ScriptedAddressSource::new(
        AddressKind::Internal,
        SourceScript::Broken("permission denied".to_string()),
    );
    let external = ScriptedAddressSource::empty(AddressKind::External);
    let updater = RecordingUpdater::new();

    let (output, summary) = run_once(
        config_with(ids("1", "2", "", "")),
        &internal,
        &external,
        &updater,
    )
    .await;

    assert_eq!(output, "");
    assert_eq!(summary.failed, 2);
    assert_eq!(updater.update_call_count(), 0);
}

#[tokio::test]
async fn malformed_family_skips_only_that_record() {
    let internal = ScriptedAddressSource::empty(AddressKind::Internal);
    let external = ScriptedAddressSource::new(
        AddressKind::External,
        SourceScript::Stack(IpStack {
            ipv4: Discovered::Found(Ipv4Addr::new(203, 0, 113, 5)),
            ipv6: Discovered::Failed("Invalid json body".to_string()),
        }),
    );
    let updater = RecordingUpdater::new();

    let (output, summary) = run_once(
        config_with(ids("", "", "7", "8")),
        &internal,
        &external,
        &updater,
    )
    .await;

    assert_eq!(
        output,
        "[UPDATED]host:example.com,id:7,type:A,value:203.0.113.5\n"
    );
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 1);
    assert!(!summary.is_clean());
}

#[tokio::test]
async fn transport_failure_does_not_stop_other_updates() {
    let internal = ScriptedAddressSource::with_addresses(
        AddressKind::Internal,
        Some(Ipv4Addr::new(10, 0, 0, 5)),
        None,
    );
    let external = ScriptedAddressSource::with_addresses(
        AddressKind::External,
        Some(Ipv4Addr::new(198, 51, 100, 9)),
        None,
    );
    let updater = RecordingUpdater::new().reply("1", Reply::TransportFailure);

    let (output, summary) = run_once(
        config_with(ids("1", "", "7", "")),
        &internal,
        &external,
        &updater,
    )
    .await;

    assert_eq!(
        output,
        "[UPDATED]host:example.com,id:7,type:A,value:198.51.100.9\n"
    );
    assert_eq!(updater.update_call_count(), 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.updated, 1);
}

#[tokio::test]
async fn repeated_runs_are_byte_identical() {
    let internal = ScriptedAddressSource::empty(AddressKind::Internal);
    let external = ScriptedAddressSource::with_addresses(
        AddressKind::External,
        Some(Ipv4Addr::new(198, 51, 100, 9)),
        None,
    );
    let updater = RecordingUpdater::new()
        .reply("7", Reply::Status(403))
        .reply("8", Reply::Status(200));

    let config = config_with(ids("1", "2", "7", "8"));

    let (first, first_summary) =
        run_once(config.clone(), &internal, &external, &updater).await;
    let (second, second_summary) = run_once(config, &internal, &external, &updater).await;

    assert_eq!(first, second);
    assert_eq!(first_summary, second_summary);
    assert!(!first.is_empty());
}

#[tokio::test]
async fn invalid_config_is_rejected_before_running() {
    let internal = ScriptedAddressSource::empty(AddressKind::Internal);
    let external = ScriptedAddressSource::empty(AddressKind::External);
    let updater = RecordingUpdater::new();

    let result = Orchestrator::new(
        UpdaterConfig::new("bad host").with_records(ids("1", "", "", "")),
        Box::new(internal.clone()),
        Box::new(external.clone()),
        Box::new(updater.clone()),
        Vec::new(),
    );

    assert!(result.is_err());
    assert_eq!(internal.discover_call_count(), 0);
}

#[tokio::test]
async fn swapped_sources_are_rejected() {
    let internal = ScriptedAddressSource::empty(AddressKind::Internal);
    let external = ScriptedAddressSource::empty(AddressKind::External);
    let updater = RecordingUpdater::new();

    let result = Orchestrator::new(
        config_with(ids("1", "", "7", "")),
        Box::new(external.clone()),
        Box::new(internal.clone()),
        Box::new(updater.clone()),
        Vec::new(),
    );

    let err = result.err().expect("swapped sources must be rejected");
    assert!(matches!(err, dynip_core::Error::Config(_)), "unexpected error: {}", err);
    assert_eq!(internal.discover_call_count(), 0);
    assert_eq!(external.discover_call_count(), 0);
    assert_eq!(updater.update_call_count(), 0);
}

#[tokio::test]
async fn host_without_record_ids_prints_nothing() {
    let internal = ScriptedAddressSource::empty(AddressKind::Internal);
    let external = ScriptedAddressSource::empty(AddressKind::External);
    let updater = RecordingUpdater::new();

    let (output, summary) =
        run_once(config_with(ids("", "", "", "")), &internal, &external, &updater).await;

    assert_eq!(output, "");
    assert!(summary.is_clean());
    assert_eq!(internal.discover_call_count(), 0);
    assert_eq!(external.discover_call_count(), 0);
    assert_eq!(updater.update_call_count(), 0);
}
