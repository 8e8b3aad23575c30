//! Core traits for the dynip updater
//!
//! - [`AddressSource`]: Discover internal or external addresses
//! - [`RecordUpdater`]: Push a value to a remote record

pub mod address_source;
pub mod record_updater;

pub use address_source::{AddressKind, AddressSource, Discovered, IpFamily, IpStack};
pub use record_updater::{RecordUpdateRequest, RecordUpdater};
