//! Telemetry records emitted by the window reducer and their isolated delivery to a sink.
//!
//! The reducer never talks to a sink directly. It returns [`TelemetryRecord`] values which the
//! engine hands to [`deliver`] after the state lock is released. Delivery is advisory: sink
//! errors and sink panics are logged at debug level and dropped, and never reach the caller.
//!
//! Panic isolation relies on `std::panic::catch_unwind` and so only holds on targets that
//! unwind. `wasm32-unknown-unknown` builds abort on panic, so there a panicking sink takes the
//! whole module down; browser sinks must report failures through [`TelemetryError`] instead.

use std::panic::{self, AssertUnwindSafe};

use leptos::logging;
use platform_host::{
    TelemetryError, TelemetryFields, TelemetrySeverity, TelemetrySink, TelemetryTags,
};
use serde_json::json;

use crate::model::{WindowManagerState, WindowRecord};

pub const EVENT_OPEN: &str = "window.open";
pub const EVENT_RESTORE: &str = "window.restore";
pub const EVENT_REFOCUS: &str = "window.refocus";
pub const EVENT_CLOSE: &str = "window.close";
pub const EVENT_MINIMIZE: &str = "window.minimize";
pub const EVENT_MAXIMIZE: &str = "window.maximize";
pub const EVENT_POSITION_UPDATE: &str = "window.position_update";
pub const EVENT_RESIZE: &str = "window.resize";
pub const GAUGE_ACTIVE_COUNT: &str = "window.active_count";

#[derive(Debug, Clone, PartialEq)]
/// One telemetry side effect produced by a window transition.
pub enum TelemetryRecord {
    /// Named event with structured fields.
    Event {
        /// Event name, one of the `EVENT_*` constants.
        name: &'static str,
        /// Event severity.
        severity: TelemetrySeverity,
        /// Event payload.
        fields: TelemetryFields,
    },
    /// Gauge sample.
    Gauge {
        /// Gauge name.
        name: &'static str,
        /// Sampled value.
        value: f64,
        /// Dimension tags.
        tags: TelemetryTags,
    },
}

impl TelemetryRecord {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Event { name, .. } | Self::Gauge { name, .. } => *name,
        }
    }

    /// Lifecycle event carrying the window id and title.
    pub(crate) fn window_event(name: &'static str, window: &WindowRecord) -> Self {
        Self::Event {
            name,
            severity: TelemetrySeverity::Info,
            fields: fields(json!({
                "window_id": window.id.as_str(),
                "window_title": window.title,
            })),
        }
    }

    pub(crate) fn opened(window: &WindowRecord) -> Self {
        Self::Event {
            name: EVENT_OPEN,
            severity: TelemetrySeverity::Info,
            fields: fields(json!({
                "window_id": window.id.as_str(),
                "window_title": window.title,
                "width": window.rect.w,
                "height": window.rect.h,
            })),
        }
    }

    pub(crate) fn position_updated(window: &WindowRecord) -> Self {
        Self::Event {
            name: EVENT_POSITION_UPDATE,
            severity: TelemetrySeverity::Debug,
            fields: fields(json!({
                "window_id": window.id.as_str(),
                "x": window.rect.x,
                "y": window.rect.y,
            })),
        }
    }

    pub(crate) fn resized(window: &WindowRecord) -> Self {
        Self::Event {
            name: EVENT_RESIZE,
            severity: TelemetrySeverity::Debug,
            fields: fields(json!({
                "window_id": window.id.as_str(),
                "width": window.rect.w,
                "height": window.rect.h,
            })),
        }
    }

    pub(crate) fn active_count(state: &WindowManagerState) -> Self {
        Self::Gauge {
            name: GAUGE_ACTIVE_COUNT,
            value: state.active_count() as f64,
            tags: TelemetryTags::new(),
        }
    }
}

fn fields(value: serde_json::Value) -> TelemetryFields {
    match value {
        serde_json::Value::Object(map) => map,
        _ => TelemetryFields::new(),
    }
}

/// Hands `records` to `sink` in order, isolating the caller from sink errors and panics.
///
/// Returns how many records the sink accepted. Panics are only caught on unwinding targets.
pub fn deliver(sink: &dyn TelemetrySink, records: &[TelemetryRecord]) -> usize {
    let mut accepted = 0;
    for record in records {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match record {
            TelemetryRecord::Event {
                name,
                severity,
                fields,
            } => sink.record_event(name, *severity, fields),
            TelemetryRecord::Gauge { name, value, tags } => sink.record_gauge(name, *value, tags),
        }));
        match outcome {
            Ok(Ok(())) => accepted += 1,
            Ok(Err(err)) => report_failure(record.name(), &err),
            Err(_) => {
                logging::debug_warn!("telemetry sink panicked on `{}`", record.name());
            }
        }
    }
    accepted
}

fn report_failure(name: &str, err: &TelemetryError) {
    logging::debug_warn!("telemetry sink dropped `{name}`: {err}");
}
