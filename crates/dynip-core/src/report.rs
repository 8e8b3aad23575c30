//! Operator-facing status lines
//!
//! These lines are written to stdout and grepped by scripts, so their
//! prefixes and field order are fixed:
//!
//! ```text
//! [INFO]<message>
//! [UPDATED]host:<host>,id:<id>,type:<A|AAAA>,value:<value>
//! [ERROR]host:<host>,id:<id>,type:<A|AAAA>,error:<permissions|notfound|argumentmissing>
//! ```
//!
//! Diagnostics go through `tracing` instead.

use crate::traits::IpFamily;
use std::fmt;
use std::io::Write;

/// Record type label used in status lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// IPv4 record
    A,
    /// IPv6 record
    Aaaa,
}

impl RecordType {
    /// Both record types, A first
    pub const ALL: [RecordType; 2] = [RecordType::A, RecordType::Aaaa];

    /// IP family carried by this record type
    pub fn family(self) -> IpFamily {
        match self {
            RecordType::A => IpFamily::V4,
            RecordType::Aaaa => IpFamily::V6,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::Aaaa => write!(f, "AAAA"),
        }
    }
}

/// Known reasons for a rejected update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 403: wrong password
    Permissions,
    /// 404: unknown record
    NotFound,
    /// 422: a required argument was missing
    ArgumentMissing,
}

impl ErrorCategory {
    /// Map an HTTP status code to a known category
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            403 => Some(ErrorCategory::Permissions),
            404 => Some(ErrorCategory::NotFound),
            422 => Some(ErrorCategory::ArgumentMissing),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Permissions => write!(f, "permissions"),
            ErrorCategory::NotFound => write!(f, "notfound"),
            ErrorCategory::ArgumentMissing => write!(f, "argumentmissing"),
        }
    }
}

/// One console status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    /// Informational message
    Info(String),

    /// A record was updated
    Updated {
        host: String,
        id: String,
        record_type: RecordType,
        value: String,
    },

    /// The service rejected an update for a known reason
    Rejected {
        host: String,
        id: String,
        record_type: RecordType,
        category: ErrorCategory,
    },
}

impl StatusLine {
    pub fn info(message: impl Into<String>) -> Self {
        StatusLine::Info(message.into())
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLine::Info(message) => write!(f, "[INFO]{}", message),
            StatusLine::Updated {
                host,
                id,
                record_type,
                value,
            } => write!(
                f,
                "[UPDATED]host:{},id:{},type:{},value:{}",
                host, id, record_type, value
            ),
            StatusLine::Rejected {
                host,
                id,
                record_type,
                category,
            } => write!(
                f,
                "[ERROR]host:{},id:{},type:{},error:{}",
                host, id, record_type, category
            ),
        }
    }
}

/// Writes status lines to a sink, one per line
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write one line and flush it
    pub fn emit(&mut self, line: &StatusLine) -> std::io::Result<()> {
        writeln!(self.out, "{}", line)?;
        self.out.flush()
    }

    /// Give back the underlying sink
    pub fn into_inner(self) -> W {
        self.out
    }
}
