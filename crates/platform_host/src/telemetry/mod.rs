//! Telemetry-domain contracts and lightweight adapters.

mod service;
mod types;

pub use service::{MemoryTelemetrySink, NoopTelemetrySink, RecordedTelemetry, TelemetrySink};
pub use types::{TelemetryError, TelemetryFields, TelemetrySeverity, TelemetryTags};
