//! Runtime provider and context wiring for window manager consumers.
//!
//! This module owns the Leptos-facing side of the engine: the context handed to UI components,
//! the provider component that installs it, and the accessor components use to reach it. Every
//! mutation goes through the shared [`WindowManagerEngine`]; the reactive `state` signal only
//! mirrors the engine's latest published snapshot.
//!
//! The mirror is an engine subscription, so it follows every mutation, including calls made
//! directly on the engine or through another `Arc` holder. The signal lives in the reactive
//! runtime of the thread that created the context; snapshots delivered on other threads are
//! picked up by the next delivery on that thread.

use std::sync::Arc;

use leptos::*;
use platform_host::HostServices;

use crate::{
    config::WindowManagerConfig,
    engine::WindowManagerEngine,
    model::{OpenWindowRequest, WindowId, WindowManagerState, WindowRecord},
    reducer::WindowAction,
};

#[derive(Clone, Copy)]
/// Leptos context for reading window state and dispatching [`WindowAction`] values.
pub struct WindowManagerContext {
    /// Shared engine owning the authoritative window state.
    pub engine: StoredValue<Arc<WindowManagerEngine>>,
    /// Reactive mirror of the latest published snapshot.
    pub state: RwSignal<WindowManagerState>,
    /// Engine dispatch callback.
    pub dispatch: Callback<WindowAction>,
}

impl WindowManagerContext {
    /// Wraps `engine` in reactive handles. Must run inside a Leptos runtime.
    ///
    /// The engine subscription is removed when the owning reactive scope is cleaned up.
    pub fn new(engine: Arc<WindowManagerEngine>) -> Self {
        let state = create_rw_signal(engine.snapshot().as_ref().clone());

        let subscription = engine.subscribe(move |snapshot| mirror_snapshot(state, snapshot));
        // Catch anything published between the initial read and the subscription.
        mirror_snapshot(state, &engine.snapshot());
        let unsubscribe_from = Arc::clone(&engine);
        on_cleanup(move || {
            unsubscribe_from.unsubscribe(subscription);
        });

        let engine = store_value(engine);
        let dispatch = Callback::new(move |action: WindowAction| {
            engine.with_value(|engine| {
                engine.dispatch(action);
            });
        });

        Self {
            engine,
            state,
            dispatch,
        }
    }

    /// Dispatches an action through the runtime context callback.
    pub fn dispatch_action(&self, action: WindowAction) {
        self.dispatch.call(action);
    }

    pub fn open(&self, request: OpenWindowRequest) {
        self.dispatch_action(WindowAction::OpenWindow(request));
    }

    pub fn close(&self, window_id: impl Into<WindowId>) {
        self.dispatch_action(WindowAction::CloseWindow {
            window_id: window_id.into(),
        });
    }

    pub fn minimize(&self, window_id: impl Into<WindowId>) {
        self.dispatch_action(WindowAction::MinimizeWindow {
            window_id: window_id.into(),
        });
    }

    pub fn maximize(&self, window_id: impl Into<WindowId>) {
        self.dispatch_action(WindowAction::MaximizeWindow {
            window_id: window_id.into(),
        });
    }

    pub fn restore(&self, window_id: impl Into<WindowId>) {
        self.dispatch_action(WindowAction::RestoreWindow {
            window_id: window_id.into(),
        });
    }

    pub fn focus(&self, window_id: impl Into<WindowId>) {
        self.dispatch_action(WindowAction::FocusWindow {
            window_id: window_id.into(),
        });
    }

    pub fn toggle_taskbar_window(&self, window_id: impl Into<WindowId>) {
        self.dispatch_action(WindowAction::ToggleTaskbarWindow {
            window_id: window_id.into(),
        });
    }

    pub fn update_window_position(&self, window_id: impl Into<WindowId>, x: i32, y: i32) {
        self.dispatch_action(WindowAction::UpdateWindowPosition {
            window_id: window_id.into(),
            x,
            y,
        });
    }

    pub fn update_window_size(&self, window_id: impl Into<WindowId>, width: i32, height: i32) {
        self.dispatch_action(WindowAction::UpdateWindowSize {
            window_id: window_id.into(),
            width,
            height,
        });
    }

    /// Tracked read of the current windows.
    pub fn windows(&self) -> Vec<WindowRecord> {
        self.state.with(|state| state.windows.clone())
    }

    /// Tracked read of the top z-index counter.
    pub fn top_z_index(&self) -> u32 {
        self.state.with(|state| state.top_z_index)
    }
}

fn mirror_snapshot(state: RwSignal<WindowManagerState>, snapshot: &Arc<WindowManagerState>) {
    // `None` when the signal belongs to another thread's runtime or was disposed.
    let stale = state
        .try_with_untracked(|current| current != snapshot.as_ref())
        .unwrap_or(false);
    if stale {
        let _ = state.try_set(snapshot.as_ref().clone());
    }
}

#[component]
/// Provides [`WindowManagerContext`] to descendant components.
pub fn WindowManagerProvider(
    /// Injected browser or headless host bundle assembled by the entry layer.
    host_services: HostServices,
    /// Engine configuration; defaults apply when omitted.
    #[prop(optional)]
    config: Option<WindowManagerConfig>,
    children: Children,
) -> impl IntoView {
    let engine = WindowManagerEngine::with_config(
        config.unwrap_or_default(),
        Arc::clone(&host_services.telemetry),
    );
    logging::log!(
        "window manager ready ({} host)",
        host_services.host_strategy.as_str()
    );
    provide_context(WindowManagerContext::new(Arc::new(engine)));

    children().into_view()
}

/// Returns the current [`WindowManagerContext`].
///
/// # Panics
///
/// Panics if called outside [`WindowManagerProvider`].
pub fn use_window_manager() -> WindowManagerContext {
    use_context::<WindowManagerContext>().expect("WindowManagerContext not provided")
}

/// Returns the current [`WindowManagerContext`], or `None` outside [`WindowManagerProvider`].
pub fn try_use_window_manager() -> Option<WindowManagerContext> {
    use_context::<WindowManagerContext>()
}
