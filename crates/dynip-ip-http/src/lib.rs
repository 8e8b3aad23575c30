// # HTTP Address Source
//
// This crate provides the external address source: the addresses the
// update API sees this machine connecting from.
//
// ## Architecture
//
// For IPv4 and IPv6 independently:
// 1. Resolve the API host and keep only addresses of that family
// 2. Connect to one of them with the local socket bound to `0.0.0.0` / `::`
// 3. `GET /api/v1/remote/ip` and decode `{"IP": "<address>"}`
//
// Pinning both ends of the connection to one family replaces a dialer
// hook that rejects the wrong family after the fact.
//
// ## Failure Policy
//
// - Transport problems (resolution, connect, timeout, body read) mean
//   "no address of this family" and are only logged
// - A body that is not the expected JSON, a non-2xx status, or an address
//   of the wrong family marks that family as failed
// - One family never affects the other

use dynip_core::traits::{AddressKind, AddressSource, Discovered, IpFamily, IpStack};
use dynip_core::{ApiEndpoint, Error, Result};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Path of the "what is my IP" endpoint
pub const REMOTE_IP_PATH: &str = "/api/v1/remote/ip";

/// Connection establishment timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// TCP keep-alive interval
const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

/// Body of the remote IP endpoint
///
/// The field is matched as `IP` or `ip`; a missing field decodes as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteIpResponse {
    #[serde(rename = "IP", alias = "ip", default)]
    pub ip: String,
}

/// External address source using the update API's remote IP endpoint
#[derive(Debug, Clone)]
pub struct HttpAddressSource {
    endpoint: ApiEndpoint,
}

impl HttpAddressSource {
    /// Create a new HTTP address source
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Scheme and host of the API (e.g. `https://example.com`)
    pub fn new(endpoint: ApiEndpoint) -> Self {
        Self { endpoint }
    }

    /// Discover the address of a single family
    pub async fn discover_family(&self, family: IpFamily) -> Discovered<IpAddr> {
        match self.fetch_ip(family).await {
            Ok(Some(ip)) => Discovered::Found(ip),
            Ok(None) => Discovered::NotFound,
            Err(e) => {
                tracing::error!("External {} lookup failed: {}", family, e);
                Discovered::Failed(e.to_string())
            }
        }
    }

    /// Fetch the address the API sees over a `family`-only connection
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ip))`: The API reported an address
    /// - `Ok(None)`: No connection over this family was possible, or the
    ///   API reported an empty address
    /// - `Err(Error)`: The API answered with something unusable
    async fn fetch_ip(&self, family: IpFamily) -> Result<Option<IpAddr>> {
        let url = self.endpoint.url(REMOTE_IP_PATH);
        let parsed = reqwest::Url::parse(&url)
            .map_err(|e| Error::config(format!("Invalid API URL {}: {}", url, e)))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| Error::config(format!("API URL has no host: {}", url)))?
            .to_string();
        let port = parsed.port_or_known_default().unwrap_or(443);

        let Some(target) = resolve_for_family(&host, port, family).await else {
            return Ok(None);
        };
        tracing::debug!("Querying {} over {} ({})", url, family, target);

        let mut builder = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .tcp_keepalive(TCP_KEEPALIVE)
            .no_proxy()
            .local_address(family.unspecified());
        if literal_ip(&host).is_none() {
            builder = builder.resolve(&host, target);
        }
        let client = builder
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        let response = match client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("{} request to {} failed: {}", family, url, e);
                return Ok(None);
            }
        };

        let status = response.status();
        // The body is consumed here and released whatever the decode outcome.
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to read {} response from {}: {}", family, url, e);
                return Ok(None);
            }
        };

        if !status.is_success() {
            return Err(Error::http(format!("Remote IP endpoint answered {}", status)));
        }

        parse_remote_ip(&body, family)
    }
}

#[async_trait::async_trait]
impl AddressSource for HttpAddressSource {
    async fn discover(&self) -> Result<IpStack> {
        let mut stack = IpStack::empty();
        for family in IpFamily::ALL {
            stack.set(family, self.discover_family(family).await);
        }
        Ok(stack)
    }

    fn kind(&self) -> AddressKind {
        AddressKind::External
    }
}

/// Decode a remote IP body and check it against the requested family
pub fn parse_remote_ip(body: &[u8], family: IpFamily) -> Result<Option<IpAddr>> {
    if serde_json::from_slice::<serde_json::Value>(body).is_err() {
        tracing::warn!("Invalid json body");
    }
    let decoded: RemoteIpResponse = serde_json::from_slice(body)?;

    let text = decoded.ip.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let ip: IpAddr = text
        .parse()
        .map_err(|_| Error::ip_source(format!("Invalid IP address: {}", text)))?;

    if !family.matches(&ip) {
        return Err(Error::ip_source(format!("Expected {}, got: {}", family, ip)));
    }

    Ok(Some(ip))
}

/// First resolved address of `family`, or `None` if there is none
async fn resolve_for_family(host: &str, port: u16, family: IpFamily) -> Option<SocketAddr> {
    if let Some(ip) = literal_ip(host) {
        return family.matches(&ip).then(|| SocketAddr::new(ip, port));
    }

    match tokio::net::lookup_host((host, port)).await {
        Ok(addrs) => {
            let found = addrs.into_iter().find(|addr| family.matches(&addr.ip()));
            if found.is_none() {
                tracing::debug!("{} has no {} address", host, family);
            }
            found
        }
        Err(e) => {
            tracing::warn!("Failed to resolve {}: {}", host, e);
            None
        }
    }
}

/// Parse a URL host that is an IP literal (`1.2.3.4` or `[::1]`)
fn literal_ip(host: &str) -> Option<IpAddr> {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse()
        .ok()
}
