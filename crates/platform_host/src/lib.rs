//! Typed host-domain contracts shared by the window runtime and its host adapters.
//!
//! This crate is the API-first boundary for platform services. It exposes the telemetry sink
//! contract the window runtime reports into, the host service bundle the runtime is composed
//! with, and time helpers used to stamp recorded data.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod host;
pub mod telemetry;
pub mod time;

pub use host::{HostServices, HostStrategy};
pub use telemetry::{
    MemoryTelemetrySink, NoopTelemetrySink, RecordedTelemetry, TelemetryError, TelemetryFields,
    TelemetrySeverity, TelemetrySink, TelemetryTags,
};
pub use time::telemetry_timestamp_ms;
