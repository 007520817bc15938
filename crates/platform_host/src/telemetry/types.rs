//! Value types shared by telemetry sinks and the runtime that feeds them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured key/value payload attached to a telemetry event.
pub type TelemetryFields = Map<String, Value>;

/// Dimension tags attached to a gauge sample.
pub type TelemetryTags = BTreeMap<String, String>;

/// Severity level attached to a recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetrySeverity {
    /// High-frequency diagnostics such as drag/resize updates.
    Debug,
    /// Regular lifecycle transitions.
    Info,
    /// Unexpected but recoverable conditions.
    Warn,
    /// Failures.
    Error,
}

impl TelemetrySeverity {
    /// Returns a stable string token for diagnostics and exporters.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Typed error reported by a telemetry sink that could not accept a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// The backend is not reachable or not configured.
    Unavailable,
    /// The backend refused the record.
    Rejected {
        /// Backend-provided reason.
        reason: String,
    },
}

impl std::fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "telemetry backend unavailable"),
            Self::Rejected { reason } => write!(f, "telemetry record rejected: {reason}"),
        }
    }
}

impl std::error::Error for TelemetryError {}
