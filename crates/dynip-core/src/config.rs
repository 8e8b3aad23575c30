//! Configuration types for the dynip updater
//!
//! Configuration is loaded once at startup (flags and environment in the
//! binary) and is immutable afterwards.

use crate::report::RecordType;
use crate::traits::AddressKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Placeholder password used when none is supplied
pub const DEFAULT_PASSWORD: &str = "123456";

/// Primary interface name typical for the platform
#[cfg(target_os = "macos")]
pub const DEFAULT_INTERFACE: &str = "en0";

/// Primary interface name typical for the platform
#[cfg(not(target_os = "macos"))]
pub const DEFAULT_INTERFACE: &str = "eth0";

/// Scheme used to reach the update API unless overridden
pub const DEFAULT_SCHEME: &str = "https";

/// Main updater configuration
///
/// The Debug implementation does NOT expose the password.
#[derive(Clone, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// Host implementing the update API, optionally with `:port`
    ///
    /// `None` means there is nothing to do.
    #[serde(default, deserialize_with = "deserialize_non_blank")]
    pub host: Option<String>,

    /// Password sent with every update
    #[serde(default = "default_password")]
    pub password: String,

    /// Interface inspected for internal addresses
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Record identifiers to update
    #[serde(default)]
    pub records: RecordIds,

    /// URL scheme for both API endpoints (`https` or `http`)
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Log updates instead of sending them
    #[serde(default)]
    pub dry_run: bool,
}

impl std::fmt::Debug for UpdaterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdaterConfig")
            .field("host", &self.host)
            .field("password", &"<REDACTED>")
            .field("interface", &self.interface)
            .field("records", &self.records)
            .field("scheme", &self.scheme)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl UpdaterConfig {
    /// Create a configuration targeting `host`
    ///
    /// A blank host is treated as absent.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: non_blank(Some(host.into())),
            password: default_password(),
            interface: default_interface(),
            records: RecordIds::default(),
            scheme: default_scheme(),
            dry_run: false,
        }
    }

    /// Set the update password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the interface used for internal discovery
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = interface.into();
        self
    }

    /// Set the record identifiers
    pub fn with_records(mut self, records: RecordIds) -> Self {
        self.records = records;
        self
    }

    /// Set the URL scheme
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The API endpoint, if a host is configured
    pub fn endpoint(&self) -> Option<ApiEndpoint> {
        self.host
            .as_deref()
            .map(|host| ApiEndpoint::new(self.scheme.clone(), host))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if let Some(host) = &self.host {
            validate_host(host)?;
        }

        if self.interface.trim().is_empty() {
            return Err(crate::Error::config("Interface name cannot be empty"));
        }

        match self.scheme.as_str() {
            "https" => {}
            "http" => {
                tracing::warn!("Update API is reached over plain HTTP; the password is sent in clear");
            }
            other => {
                return Err(crate::Error::config(format!(
                    "Unsupported scheme '{}'. Supported: https, http",
                    other
                )));
            }
        }

        Ok(())
    }
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self::new("")
    }
}

/// The four optional record identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordIds {
    /// Internal IPv4 (A) record
    #[serde(default, deserialize_with = "deserialize_non_blank")]
    pub internal_a: Option<String>,
    /// Internal IPv6 (AAAA) record
    #[serde(default, deserialize_with = "deserialize_non_blank")]
    pub internal_aaaa: Option<String>,
    /// External IPv4 (A) record
    #[serde(default, deserialize_with = "deserialize_non_blank")]
    pub external_a: Option<String>,
    /// External IPv6 (AAAA) record
    #[serde(default, deserialize_with = "deserialize_non_blank")]
    pub external_aaaa: Option<String>,
}

impl RecordIds {
    /// Build from raw flag values; blank values count as absent
    pub fn new(
        internal_a: Option<String>,
        internal_aaaa: Option<String>,
        external_a: Option<String>,
        external_aaaa: Option<String>,
    ) -> Self {
        Self {
            internal_a: non_blank(internal_a),
            internal_aaaa: non_blank(internal_aaaa),
            external_a: non_blank(external_a),
            external_aaaa: non_blank(external_aaaa),
        }
    }

    /// Identifier for one of the four record slots
    pub fn get(&self, kind: AddressKind, record_type: RecordType) -> Option<&str> {
        let id = match (kind, record_type) {
            (AddressKind::Internal, RecordType::A) => &self.internal_a,
            (AddressKind::Internal, RecordType::Aaaa) => &self.internal_aaaa,
            (AddressKind::External, RecordType::A) => &self.external_a,
            (AddressKind::External, RecordType::Aaaa) => &self.external_aaaa,
        };
        id.as_deref()
    }

    /// Whether any record of this kind was requested
    pub fn wants(&self, kind: AddressKind) -> bool {
        self.get(kind, RecordType::A).is_some() || self.get(kind, RecordType::Aaaa).is_some()
    }

    /// Whether no record was requested at all
    pub fn is_empty(&self) -> bool {
        !self.wants(AddressKind::Internal) && !self.wants(AddressKind::External)
    }
}

/// Scheme and host of the update API
///
/// Passed explicitly to every component that talks to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    scheme: String,
    host: String,
}

impl ApiEndpoint {
    /// Create an endpoint with an explicit scheme
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    /// Create an HTTPS endpoint
    pub fn https(host: impl Into<String>) -> Self {
        Self::new(DEFAULT_SCHEME, host)
    }

    /// Host as configured (may include a port)
    pub fn host(&self) -> &str {
        &self.host
    }

    /// URL scheme
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Build a URL for `path_and_query` (must start with `/`)
    ///
    /// Values are interpolated as-is.
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}://{}{}", self.scheme, self.host, path_and_query)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn deserialize_non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(non_blank)
}

/// Validate a host of the form `name`, `name:port`, `1.2.3.4[:port]` or `[v6][:port]`
fn validate_host(host: &str) -> Result<(), crate::Error> {
    let (name, port) = if let Some(rest) = host.strip_prefix('[') {
        let (inner, tail) = rest.split_once(']').ok_or_else(|| {
            crate::Error::config(format!("Unterminated IPv6 literal in host: '{}'", host))
        })?;
        if inner.parse::<Ipv6Addr>().is_err() {
            return Err(crate::Error::config(format!(
                "Invalid IPv6 literal in host: '{}'",
                host
            )));
        }
        let port = match tail {
            "" => None,
            t => Some(t.strip_prefix(':').ok_or_else(|| {
                crate::Error::config(format!("Unexpected text after IPv6 literal: '{}'", host))
            })?),
        };
        (None, port)
    } else {
        match host.matches(':').count() {
            0 => (Some(host), None),
            1 => {
                let (name, port) = host.split_once(':').unwrap_or((host, ""));
                (Some(name), Some(port))
            }
            _ => {
                return Err(crate::Error::config(format!(
                    "IPv6 hosts must be bracketed, e.g. [2001:db8::1]. Got: '{}'",
                    host
                )));
            }
        }
    };

    if let Some(port) = port {
        match port.parse::<u16>() {
            Ok(p) if p > 0 => {}
            _ => {
                return Err(crate::Error::config(format!(
                    "Invalid port in host: '{}'",
                    host
                )));
            }
        }
    }

    match name {
        Some(name) if name.parse::<Ipv4Addr>().is_ok() => Ok(()),
        Some(name) => validate_domain_name(name),
        None => Ok(()),
    }
}

/// DNS name validation after RFC 1035, relaxed for real-world hosts
///
/// Underscores and a single trailing dot are accepted.
fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    if domain.is_empty() {
        return Err(crate::Error::config("Host name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Host name too long: {} chars (max 253)",
            domain.len()
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Host name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Host label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(crate::Error::config(format!(
                "Host label contains invalid characters: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Host label cannot start or end with hyphen: '{}'",
                label
            )));
        }
    }

    Ok(())
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

fn default_interface() -> String {
    DEFAULT_INTERFACE.to_string()
}

fn default_scheme() -> String {
    DEFAULT_SCHEME.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_host_means_nothing_to_do() {
        assert!(UpdaterConfig::new("").host.is_none());
        assert!(UpdaterConfig::new("   ").endpoint().is_none());
        assert_eq!(
            UpdaterConfig::new("example.com").host.as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn defaults() {
        let config = UpdaterConfig::default();
        assert_eq!(config.password, "123456");
        assert_eq!(config.interface, DEFAULT_INTERFACE);
        assert_eq!(config.scheme, "https");
        assert!(!config.dry_run);
        assert!(config.records.is_empty());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: UpdaterConfig =
            serde_json::from_str(r#"{"host":"example.com","records":{"external_a":"7"}}"#)
                .unwrap();
        assert_eq!(config.password, DEFAULT_PASSWORD);
        assert_eq!(config.records.external_a.as_deref(), Some("7"));
        assert!(config.records.wants(AddressKind::External));
        assert!(!config.records.wants(AddressKind::Internal));
    }

    #[test]
    fn blank_values_deserialize_as_absent() {
        let config: UpdaterConfig = serde_json::from_str(
            r#"{"host":"  ","records":{"internal_a":" 5 ","external_a":"","external_aaaa":"   "}}"#,
        )
        .unwrap();
        assert!(config.host.is_none());
        assert_eq!(config.records.internal_a.as_deref(), Some("5"));
        assert_eq!(config.records.external_a, None);
        assert_eq!(config.records.external_aaaa, None);
        assert!(!config.records.wants(AddressKind::External));
    }

    #[test]
    fn blank_record_ids_are_absent() {
        let ids = RecordIds::new(Some(" ".into()), Some("9".into()), Some(String::new()), None);
        assert_eq!(ids.get(AddressKind::Internal, RecordType::A), None);
        assert_eq!(ids.get(AddressKind::Internal, RecordType::Aaaa), Some("9"));
        assert!(ids.wants(AddressKind::Internal));
        assert!(!ids.wants(AddressKind::External));
    }

    #[test]
    fn accepts_valid_hosts() {
        for host in [
            "example.com",
            "dns.example.com:8443",
            "localhost",
            "127.0.0.1",
            "127.0.0.1:8080",
            "[::1]",
            "[2001:db8::1]:443",
            "my_host.lan",
            "example.com.",
            "example.com.:8443",
        ] {
            assert!(
                UpdaterConfig::new(host).validate().is_ok(),
                "host {} should be valid",
                host
            );
        }
    }

    #[test]
    fn rejects_invalid_hosts() {
        for host in [
            "exa mple.com",
            "-bad.example.com",
            "example..com",
            "example.com:0",
            "example.com:http",
            "2001:db8::1",
            "[2001:db8::1",
            "[not-v6]",
            "[::1]8080",
            "example.com..",
            ".",
        ] {
            assert!(
                UpdaterConfig::new(host).validate().is_err(),
                "host {} should be rejected",
                host
            );
        }
    }

    #[test]
    fn rejects_unknown_scheme_and_empty_interface() {
        let config = UpdaterConfig::new("example.com").with_scheme("ftp");
        assert!(config.validate().is_err());

        let config = UpdaterConfig::new("example.com").with_interface("");
        assert!(config.validate().is_err());

        let config = UpdaterConfig::new("example.com").with_scheme("http");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn endpoint_builds_urls() {
        let endpoint = UpdaterConfig::new("example.com").endpoint().unwrap();
        assert_eq!(
            endpoint.url("/api/v1/remote/ip"),
            "https://example.com/api/v1/remote/ip"
        );
        assert_eq!(endpoint.host(), "example.com");
        assert_eq!(endpoint.scheme(), "https");
    }

    #[test]
    fn password_not_exposed_in_debug() {
        let config = UpdaterConfig::new("example.com").with_password("hunter2-secret");
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("hunter2-secret"));
        assert!(debug_str.contains("UpdaterConfig"));
    }
}
