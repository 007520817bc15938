//! Telemetry sink contracts and no-op/in-memory adapters.

use std::sync::Arc;

use parking_lot::Mutex;

use super::types::{TelemetryError, TelemetryFields, TelemetrySeverity, TelemetryTags};
use crate::time::telemetry_timestamp_ms;

/// Host service receiving operational events and gauge samples.
///
/// Implementations must return quickly: callers invoke the sink inline after a state transition
/// and treat it as fire-and-forget. Backends that talk to the network should queue internally.
pub trait TelemetrySink: Send + Sync {
    /// Records a named event with structured fields.
    fn record_event(
        &self,
        name: &str,
        severity: TelemetrySeverity,
        fields: &TelemetryFields,
    ) -> Result<(), TelemetryError>;

    /// Records a gauge sample with dimension tags.
    fn record_gauge(&self, name: &str, value: f64, tags: &TelemetryTags)
        -> Result<(), TelemetryError>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op telemetry sink for hosts without a telemetry backend.
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record_event(
        &self,
        _name: &str,
        _severity: TelemetrySeverity,
        _fields: &TelemetryFields,
    ) -> Result<(), TelemetryError> {
        Ok(())
    }

    fn record_gauge(
        &self,
        _name: &str,
        _value: f64,
        _tags: &TelemetryTags,
    ) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// One record captured by [`MemoryTelemetrySink`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedTelemetry {
    /// A captured event.
    Event {
        /// Event name.
        name: String,
        /// Event severity.
        severity: TelemetrySeverity,
        /// Event fields.
        fields: TelemetryFields,
        /// Unix milliseconds at capture time.
        recorded_at_ms: u64,
    },
    /// A captured gauge sample.
    Gauge {
        /// Gauge name.
        name: String,
        /// Sampled value.
        value: f64,
        /// Dimension tags.
        tags: TelemetryTags,
        /// Unix milliseconds at capture time.
        recorded_at_ms: u64,
    },
}

impl RecordedTelemetry {
    /// Returns the event or gauge name.
    pub fn name(&self) -> &str {
        match self {
            Self::Event { name, .. } | Self::Gauge { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory telemetry sink that keeps every record, for tests and local inspection.
///
/// Clones share the same buffer.
pub struct MemoryTelemetrySink {
    inner: Arc<Mutex<Vec<RecordedTelemetry>>>,
}

impl MemoryTelemetrySink {
    /// Returns a copy of all captured records in arrival order.
    pub fn records(&self) -> Vec<RecordedTelemetry> {
        self.inner.lock().clone()
    }

    /// Returns the names of captured events (gauges excluded) in arrival order.
    pub fn event_names(&self) -> Vec<String> {
        self.inner
            .lock()
            .iter()
            .filter_map(|record| match record {
                RecordedTelemetry::Event { name, .. } => Some(name.clone()),
                RecordedTelemetry::Gauge { .. } => None,
            })
            .collect()
    }

    /// Returns the most recent value sampled for gauge `name`.
    pub fn last_gauge(&self, name: &str) -> Option<f64> {
        self.inner.lock().iter().rev().find_map(|record| match record {
            RecordedTelemetry::Gauge {
                name: gauge, value, ..
            } if gauge == name => Some(*value),
            _ => None,
        })
    }

    /// Drops all captured records.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl TelemetrySink for MemoryTelemetrySink {
    fn record_event(
        &self,
        name: &str,
        severity: TelemetrySeverity,
        fields: &TelemetryFields,
    ) -> Result<(), TelemetryError> {
        self.inner.lock().push(RecordedTelemetry::Event {
            name: name.to_string(),
            severity,
            fields: fields.clone(),
            recorded_at_ms: telemetry_timestamp_ms(),
        });
        Ok(())
    }

    fn record_gauge(
        &self,
        name: &str,
        value: f64,
        tags: &TelemetryTags,
    ) -> Result<(), TelemetryError> {
        self.inner.lock().push(RecordedTelemetry::Gauge {
            name: name.to_string(),
            value,
            tags: tags.clone(),
            recorded_at_ms: telemetry_timestamp_ms(),
        });
        Ok(())
    }
}
