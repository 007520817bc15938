pub mod config;
pub mod engine;
pub mod host;
pub mod model;
pub mod reducer;
pub mod runtime_context;
pub mod telemetry;
pub mod window_manager;

pub use config::{ConfigError, WindowManagerConfig};
pub use engine::{SubscriptionId, WindowManagerEngine};
pub use host::{browser_host_services, ConsoleTelemetrySink};
pub use model::*;
pub use reducer::{cascade_open_request, reduce_windows, WindowAction};
pub use runtime_context::{
    try_use_window_manager, use_window_manager, WindowManagerContext, WindowManagerProvider,
};
pub use telemetry::TelemetryRecord;
