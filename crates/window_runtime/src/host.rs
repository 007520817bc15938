//! Host-side adapters for composing the window runtime in a browser.

use std::sync::Arc;

use leptos::logging;
use platform_host::{
    HostServices, TelemetryError, TelemetryFields, TelemetrySeverity, TelemetrySink, TelemetryTags,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Telemetry sink that writes records to the browser console (stderr off-wasm).
pub struct ConsoleTelemetrySink {
    min_severity: TelemetrySeverity,
}

impl Default for ConsoleTelemetrySink {
    fn default() -> Self {
        Self {
            min_severity: TelemetrySeverity::Info,
        }
    }
}

impl ConsoleTelemetrySink {
    /// Sink that drops events below `min_severity`. Gauges are always written.
    pub const fn with_min_severity(min_severity: TelemetrySeverity) -> Self {
        Self { min_severity }
    }

    pub fn accepts(&self, severity: TelemetrySeverity) -> bool {
        severity >= self.min_severity
    }
}

impl TelemetrySink for ConsoleTelemetrySink {
    fn record_event(
        &self,
        name: &str,
        severity: TelemetrySeverity,
        fields: &TelemetryFields,
    ) -> Result<(), TelemetryError> {
        if !self.accepts(severity) {
            return Ok(());
        }
        let fields = serde_json::to_string(fields).map_err(|err| TelemetryError::Rejected {
            reason: err.to_string(),
        })?;
        match severity {
            TelemetrySeverity::Warn | TelemetrySeverity::Error => {
                logging::warn!("[{}] {name} {fields}", severity.as_str());
            }
            TelemetrySeverity::Debug | TelemetrySeverity::Info => {
                logging::log!("[{}] {name} {fields}", severity.as_str());
            }
        }
        Ok(())
    }

    fn record_gauge(
        &self,
        name: &str,
        value: f64,
        tags: &TelemetryTags,
    ) -> Result<(), TelemetryError> {
        if tags.is_empty() {
            logging::log!("[gauge] {name}={value}");
        } else {
            logging::log!("[gauge] {name}={value} {tags:?}");
        }
        Ok(())
    }
}

/// Browser host bundle reporting window telemetry to the console.
pub fn browser_host_services() -> HostServices {
    HostServices::browser(Arc::new(ConsoleTelemetrySink::default()))
}
