// # dynip-core
//
// Core library for the dynip address updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for one-shot record updates:
// - **AddressSource**: Trait for discovering internal or external addresses
// - **RecordUpdater**: Trait for pushing a value to a remote record
// - **Orchestrator**: Runs discovery and dispatch, reports one line per update
// - **UpdaterConfig**: Validated, immutable run configuration
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Explicit Context**: The target host is passed to every component, never global
// 3. **Partial Results**: A failure in one branch never aborts the others
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod orchestrator;
pub mod config;
pub mod error;
pub mod report;

// Re-export core types for convenience
pub use traits::{AddressKind, AddressSource, Discovered, IpFamily, IpStack, RecordUpdateRequest, RecordUpdater};
pub use orchestrator::{Orchestrator, RunSummary};
pub use config::{ApiEndpoint, RecordIds, UpdaterConfig};
pub use error::{Error, Result};
pub use report::{ErrorCategory, RecordType, StatusLine};
