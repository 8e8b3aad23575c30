//! Error types for the dynip updater
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for dynip operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dynip updater
#[derive(Error, Debug)]
pub enum Error {
    /// The requested network interface does not exist
    #[error("Interface not found: {0}")]
    InterfaceNotFound(String),

    /// Address source errors (unexpected discovery responses)
    #[error("Address source error: {0}")]
    IpSource(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    /// JSON deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),
}

impl Error {
    /// Create an "interface not found" error
    pub fn interface_not_found(name: impl Into<String>) -> Self {
        Self::InterfaceNotFound(name.into())
    }

    /// Create an address source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Whether this error means the interface is simply absent
    pub fn is_interface_not_found(&self) -> bool {
        matches!(self, Self::InterfaceNotFound(_))
    }
}
