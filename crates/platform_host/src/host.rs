//! Shared host-bundle models for browser and headless runtime composition.

use std::sync::Arc;

use crate::{NoopTelemetrySink, TelemetrySink};

/// Stable host strategy selected for the current build/runtime composition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser-backed runtime composition.
    Browser,
    /// Headless composition used by tests and server-side tooling.
    Headless,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics and runtime inspection.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Headless => "headless",
        }
    }
}

/// Runtime-selected host service bundle injected into the window runtime.
///
/// All environment-specific service selection happens before this bundle crosses into
/// `window_runtime`, which keeps the engine decoupled from telemetry backend details.
#[derive(Clone)]
pub struct HostServices {
    /// Telemetry sink observing window transitions.
    pub telemetry: Arc<dyn TelemetrySink>,
    /// Stable strategy identifier for diagnostics.
    pub host_strategy: HostStrategy,
}

impl HostServices {
    /// Browser bundle wired to the supplied telemetry sink.
    pub fn browser(telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            telemetry,
            host_strategy: HostStrategy::Browser,
        }
    }

    /// Headless bundle with telemetry disabled.
    pub fn headless() -> Self {
        Self {
            telemetry: Arc::new(NoopTelemetrySink),
            host_strategy: HostStrategy::Headless,
        }
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices")
            .field("host_strategy", &self.host_strategy)
            .finish_non_exhaustive()
    }
}
