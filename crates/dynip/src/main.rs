// # dynip - One-Shot Address Updater
//
// This binary is a THIN integration layer:
// 1. Reading configuration from flags and environment variables
// 2. Initializing tracing and the runtime
// 3. Wiring the address sources and the record updater
// 4. Running the orchestrator once and mapping the outcome to an exit code
//
// All update logic lives in dynip-core.
//
// ## Configuration
//
// Every flag can also be set from the environment:
//
// - `-ia` / `DYNIP_INTERNAL_A`: Internal IPv4 (A) record id
// - `-iaaaa` / `DYNIP_INTERNAL_AAAA`: Internal IPv6 (AAAA) record id
// - `-ea` / `DYNIP_EXTERNAL_A`: External IPv4 (A) record id
// - `-eaaaa` / `DYNIP_EXTERNAL_AAAA`: External IPv6 (AAAA) record id
// - `-pass` / `DYNIP_PASSWORD`: Update password
// - `-host` / `DYNIP_HOST`: Host implementing the update API
// - `-i` / `DYNIP_INTERFACE`: Interface for internal addresses
// - `--dry-run` / `DYNIP_DRY_RUN`: Log updates instead of sending them
// - `DYNIP_LOG_LEVEL`: trace, debug, info, warn (default), error
//
// Status lines go to stdout; diagnostics go to stderr.
//
// ## Example
//
// ```bash
// dynip -host=dns.example.com -pass=secret -ia=42 -ea=43 -i=eth0
// ```

use anyhow::{Context, Result};
use clap::Parser;
use dynip_core::config::{DEFAULT_INTERFACE, DEFAULT_PASSWORD, DEFAULT_SCHEME};
use dynip_core::{ApiEndpoint, Orchestrator, RecordIds, UpdaterConfig};
use dynip_ip_http::HttpAddressSource;
use dynip_ip_iface::InterfaceAddressSource;
use dynip_provider_http::HttpRecordUpdater;
use std::env;
use std::ffi::OsString;
use std::io::Stdout;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Every requested update reached the service (or nothing to do)
/// - 1: Configuration or startup error
/// - 2: At least one discovery or update failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DynipExitCode {
    /// Normal exit
    Clean = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Some records could not be updated
    RuntimeError = 2,
}

impl From<DynipExitCode> for ExitCode {
    fn from(code: DynipExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Flag names accepted in single-dash form (`-ia=42`)
const SINGLE_DASH_FLAGS: [&str; 9] = [
    "ia", "iaaaa", "ea", "eaaaa", "pass", "host", "i", "dry-run", "scheme",
];

/// Command line
#[derive(Debug, Parser)]
#[command(name = "dynip", version, about = "Push internal and external IP addresses to remote records")]
struct Cli {
    /// Internal IPv4 (A) record id
    #[arg(long = "ia", env = "DYNIP_INTERNAL_A", value_name = "ID")]
    internal_a: Option<String>,

    /// Internal IPv6 (AAAA) record id
    #[arg(long = "iaaaa", env = "DYNIP_INTERNAL_AAAA", value_name = "ID")]
    internal_aaaa: Option<String>,

    /// External IPv4 (A) record id
    #[arg(long = "ea", env = "DYNIP_EXTERNAL_A", value_name = "ID")]
    external_a: Option<String>,

    /// External IPv6 (AAAA) record id
    #[arg(long = "eaaaa", env = "DYNIP_EXTERNAL_AAAA", value_name = "ID")]
    external_aaaa: Option<String>,

    /// Password sent with every update
    #[arg(
        long = "pass",
        env = "DYNIP_PASSWORD",
        default_value = DEFAULT_PASSWORD,
        hide_default_value = true,
        hide_env_values = true
    )]
    password: String,

    /// Host implementing the update API, optionally with `:port`
    #[arg(long = "host", env = "DYNIP_HOST", default_value = "")]
    host: String,

    /// Interface inspected for internal addresses
    #[arg(long = "i", env = "DYNIP_INTERFACE", default_value = DEFAULT_INTERFACE, value_name = "INTERFACE")]
    interface: String,

    /// Log updates instead of sending them
    #[arg(long = "dry-run", env = "DYNIP_DRY_RUN")]
    dry_run: bool,

    /// URL scheme for the API (`https` or `http`)
    #[arg(long = "scheme", env = "DYNIP_API_SCHEME", default_value = DEFAULT_SCHEME, hide = true)]
    scheme: String,
}

impl Cli {
    /// Build the run configuration
    fn into_config(self) -> UpdaterConfig {
        UpdaterConfig::new(self.host)
            .with_password(self.password)
            .with_interface(self.interface)
            .with_records(RecordIds::new(
                self.internal_a,
                self.internal_aaaa,
                self.external_a,
                self.external_aaaa,
            ))
            .with_scheme(self.scheme)
            .with_dry_run(self.dry_run)
    }
}

/// Rewrite single-dash long flags (`-ia=42`, `-host x`) to `--ia=42`, `--host x`
///
/// Only names in [`SINGLE_DASH_FLAGS`] are touched, so `-h` and `-V` keep
/// working. Everything after a bare `--` is left alone.
fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;

    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            let Some(flag) = text.strip_prefix('-').filter(|rest| !rest.starts_with('-')) else {
                return arg;
            };
            let name = flag.split_once('=').map_or(flag, |(name, _)| name);
            if SINGLE_DASH_FLAGS.contains(&name) {
                OsString::from(format!("-{}", text))
            } else {
                arg
            }
        })
        .collect()
}

/// Parse `DYNIP_LOG_LEVEL`
fn parse_log_level(value: &str) -> Result<Level> {
    match value.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DYNIP_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            value
        ),
    }
}

/// Wire the concrete components around `config`
fn build_orchestrator(config: UpdaterConfig) -> Result<Orchestrator<Stdout>> {
    let internal = InterfaceAddressSource::new(config.interface.clone());
    let endpoint = config
        .endpoint()
        .unwrap_or_else(|| ApiEndpoint::new(config.scheme.clone(), String::new()));
    let updater = HttpRecordUpdater::new(endpoint.clone(), config.dry_run)
        .context("Failed to create record updater")?;
    let external = HttpAddressSource::new(endpoint);

    let orchestrator = Orchestrator::new(
        config,
        Box::new(internal),
        Box::new(external),
        Box::new(updater),
        std::io::stdout(),
    )?;
    Ok(orchestrator)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(normalize_args(env::args_os())) {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version come through here as well
            let code = if e.use_stderr() {
                DynipExitCode::ConfigError
            } else {
                DynipExitCode::Clean
            };
            let _ = e.print();
            return code.into();
        }
    };

    let log_level = match parse_log_level(
        &env::var("DYNIP_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string()),
    ) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DynipExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DynipExitCode::ConfigError.into();
    }

    let config = cli.into_config();
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DynipExitCode::ConfigError.into();
    }
    info!("Configuration loaded: {:?}", config);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DynipExitCode::ConfigError.into();
        }
    };

    let mut orchestrator = match build_orchestrator(config) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DynipExitCode::ConfigError.into();
        }
    };

    let result = rt.block_on(orchestrator.run());

    match result {
        Ok(summary) if summary.is_clean() => DynipExitCode::Clean.into(),
        Ok(summary) => {
            error!("{} record(s) could not be updated", summary.failed);
            DynipExitCode::RuntimeError.into()
        }
        Err(e) => {
            error!("Run error: {}", e);
            DynipExitCode::RuntimeError.into()
        }
    }
}
