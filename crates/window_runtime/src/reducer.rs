//! Reducer actions and transition logic for the window manager.

use crate::{
    model::{OpenWindowRequest, WindowId, WindowManagerState, WindowRecord, WindowRect},
    telemetry::{
        TelemetryRecord, EVENT_CLOSE, EVENT_MAXIMIZE, EVENT_MINIMIZE, EVENT_REFOCUS,
        EVENT_RESTORE,
    },
    window_manager::{find_window_mut, focus_window_internal, push_focused_window},
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_windows`] to mutate [`WindowManagerState`].
pub enum WindowAction {
    /// Open a window, or focus/restore it when the id is already present.
    OpenWindow(OpenWindowRequest),
    /// Close a window by id.
    CloseWindow {
        /// Window to close.
        window_id: WindowId,
    },
    /// Focus (and raise) a window by id.
    FocusWindow {
        /// Window to focus.
        window_id: WindowId,
    },
    /// Minimize a window.
    MinimizeWindow {
        /// Window to minimize.
        window_id: WindowId,
    },
    /// Toggle the maximized layout flag of a window.
    MaximizeWindow {
        /// Window to maximize or un-maximize.
        window_id: WindowId,
    },
    /// Restore a minimized window and focus it.
    RestoreWindow {
        /// Window to restore.
        window_id: WindowId,
    },
    /// Toggle taskbar behavior for a window (restore, minimize, or focus).
    ToggleTaskbarWindow {
        /// Window associated with the taskbar button.
        window_id: WindowId,
    },
    /// Move a window.
    UpdateWindowPosition {
        /// Window being moved.
        window_id: WindowId,
        /// New left edge.
        x: i32,
        /// New top edge.
        y: i32,
    },
    /// Resize a window. Dimensions are applied as given.
    UpdateWindowSize {
        /// Window being resized.
        window_id: WindowId,
        /// New width.
        width: i32,
        /// New height.
        height: i32,
    },
}

impl WindowAction {
    /// Window targeted by this action.
    pub fn window_id(&self) -> &WindowId {
        match self {
            Self::OpenWindow(req) => &req.id,
            Self::CloseWindow { window_id }
            | Self::FocusWindow { window_id }
            | Self::MinimizeWindow { window_id }
            | Self::MaximizeWindow { window_id }
            | Self::RestoreWindow { window_id }
            | Self::ToggleTaskbarWindow { window_id }
            | Self::UpdateWindowPosition { window_id, .. }
            | Self::UpdateWindowSize { window_id, .. } => window_id,
        }
    }
}

/// Applies a [`WindowAction`] to the window manager state and collects resulting telemetry.
///
/// This function is the authoritative state transition engine for window management. It is
/// total: an action naming a window that is not present leaves the state unchanged and yields no
/// telemetry.
pub fn reduce_windows(
    state: &mut WindowManagerState,
    action: WindowAction,
) -> Vec<TelemetryRecord> {
    let mut telemetry = Vec::new();
    match action {
        WindowAction::OpenWindow(req) => {
            let existing_minimized = state.window(&req.id).map(|w| w.minimized);
            match existing_minimized {
                None => {
                    let record = WindowRecord {
                        id: req.id,
                        title: req.title,
                        rect: req.rect,
                        z_index: 0,
                        is_focused: false,
                        minimized: false,
                        maximized: req.maximized,
                        payload: req.payload,
                    };
                    telemetry.push(TelemetryRecord::opened(&record));
                    push_focused_window(state, record);
                    telemetry.push(TelemetryRecord::active_count(state));
                }
                Some(was_minimized) => {
                    let name = if was_minimized {
                        EVENT_RESTORE
                    } else {
                        EVENT_REFOCUS
                    };
                    if let Some(window) = focus_window_internal(state, &req.id) {
                        telemetry.push(TelemetryRecord::window_event(name, window));
                    }
                }
            }
        }
        WindowAction::CloseWindow { window_id } => {
            if let Some(index) = state.windows.iter().position(|w| w.id == window_id) {
                let closed = state.windows.remove(index);
                telemetry.push(TelemetryRecord::window_event(EVENT_CLOSE, &closed));
                telemetry.push(TelemetryRecord::active_count(state));
            }
        }
        WindowAction::FocusWindow { window_id } => {
            focus_window_internal(state, &window_id);
        }
        WindowAction::MinimizeWindow { window_id } => {
            if let Some(window) = find_window_mut(state, &window_id) {
                if !window.minimized {
                    window.minimized = true;
                    window.is_focused = false;
                    telemetry.push(TelemetryRecord::window_event(EVENT_MINIMIZE, window));
                }
            }
        }
        WindowAction::MaximizeWindow { window_id } => {
            if let Some(window) = find_window_mut(state, &window_id) {
                window.maximized = !window.maximized;
                let name = if window.maximized {
                    EVENT_MAXIMIZE
                } else {
                    EVENT_RESTORE
                };
                telemetry.push(TelemetryRecord::window_event(name, window));
            }
        }
        WindowAction::RestoreWindow { window_id } => {
            if let Some(window) = focus_window_internal(state, &window_id) {
                telemetry.push(TelemetryRecord::window_event(EVENT_RESTORE, window));
            }
        }
        WindowAction::ToggleTaskbarWindow { window_id } => {
            let Some(window) = state.window(&window_id) else {
                return telemetry;
            };
            let next = if window.minimized {
                WindowAction::RestoreWindow { window_id }
            } else if window.is_focused {
                WindowAction::MinimizeWindow { window_id }
            } else {
                WindowAction::FocusWindow { window_id }
            };
            telemetry.extend(reduce_windows(state, next));
        }
        WindowAction::UpdateWindowPosition { window_id, x, y } => {
            if let Some(window) = find_window_mut(state, &window_id) {
                window.rect = window.rect.moved_to(x, y);
                telemetry.push(TelemetryRecord::position_updated(window));
            }
        }
        WindowAction::UpdateWindowSize {
            window_id,
            width,
            height,
        } => {
            if let Some(window) = find_window_mut(state, &window_id) {
                window.rect = window.rect.resized_to(width, height);
                telemetry.push(TelemetryRecord::resized(window));
            }
        }
    }

    debug_assert_eq!(state.check_invariants(), Ok(()));
    telemetry
}

/// Builds an [`OpenWindowRequest`] for a window with a default cascade position.
///
/// The n-th window (zero-based `slot`) is offset diagonally so freshly opened windows do not
/// fully overlap.
pub fn cascade_open_request(
    id: impl Into<WindowId>,
    title: impl Into<String>,
    slot: usize,
    width: i32,
    height: i32,
) -> OpenWindowRequest {
    let offset = (slot % 8) as i32 * 20;
    OpenWindowRequest::new(
        id,
        title,
        WindowRect::new(40 + offset, 48 + offset, width, height),
    )
}
