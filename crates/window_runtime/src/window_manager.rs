//! Shared window-manager transition helpers used by the window reducer.

use crate::model::{WindowId, WindowManagerState, WindowRecord};

/// Advances the top z-index counter by one and returns the new value.
///
/// The counter never decreases. It saturates at `u32::MAX`: from then on every focus reuses
/// `u32::MAX`, so the "strictly increases by one" guarantee holds only while the counter is below
/// the ceiling. Focus and single-focus guarantees still hold, but windows focused after
/// saturation share the top z-index and stack by insertion order. A session needs about four
/// billion focus operations above the base to get there, and config rejects a base of `u32::MAX`.
pub fn next_z_index(state: &mut WindowManagerState) -> u32 {
    state.top_z_index = state.top_z_index.saturating_add(1);
    state.top_z_index
}

/// Focuses and raises `window_id`, clearing focus everywhere else.
///
/// A minimized target is un-minimized since a minimized window cannot hold focus. Allocates a
/// fresh z-index on every call, including when the window is already focused on top.
///
/// Returns the raised window, or `None` when `window_id` is not present.
pub fn focus_window_internal<'a>(
    state: &'a mut WindowManagerState,
    window_id: &WindowId,
) -> Option<&'a WindowRecord> {
    let index = state.windows.iter().position(|w| &w.id == window_id)?;
    let z_index = next_z_index(state);

    for window in &mut state.windows {
        window.is_focused = false;
    }
    let window = &mut state.windows[index];
    window.is_focused = true;
    window.minimized = false;
    window.z_index = z_index;
    Some(&*window)
}

/// Inserts a freshly opened window as the focused top window.
pub fn push_focused_window(state: &mut WindowManagerState, mut window: WindowRecord) {
    let z_index = next_z_index(state);
    for existing in &mut state.windows {
        existing.is_focused = false;
    }
    window.z_index = z_index;
    window.is_focused = true;
    window.minimized = false;
    state.windows.push(window);
}

pub(crate) fn find_window_mut<'a>(
    state: &'a mut WindowManagerState,
    window_id: &WindowId,
) -> Option<&'a mut WindowRecord> {
    state.windows.iter_mut().find(|w| &w.id == window_id)
}
