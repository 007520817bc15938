use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Default seed for the top z-index counter, leaving headroom for statically stacked chrome.
pub const DEFAULT_BASE_Z_INDEX: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub String);

impl WindowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WindowId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl WindowRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn moved_to(self, x: i32, y: i32) -> Self {
        Self { x, y, ..self }
    }

    pub fn resized_to(self, w: i32, h: i32) -> Self {
        Self { w, h, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub id: WindowId,
    pub title: String,
    pub rect: WindowRect,
    pub z_index: u32,
    pub is_focused: bool,
    pub minimized: bool,
    pub maximized: bool,
    /// Caller-defined data carried alongside the window and never inspected by the engine.
    #[serde(default)]
    pub payload: Value,
}

/// Request accepted by `open`: every window field except the engine-owned stacking and focus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenWindowRequest {
    pub id: WindowId,
    pub title: String,
    pub rect: WindowRect,
    #[serde(default)]
    pub minimized: bool,
    #[serde(default)]
    pub maximized: bool,
    #[serde(default)]
    pub payload: Value,
}

impl OpenWindowRequest {
    pub fn new(id: impl Into<WindowId>, title: impl Into<String>, rect: WindowRect) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            rect,
            minimized: false,
            maximized: false,
            payload: Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn maximized(mut self) -> Self {
        self.maximized = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowManagerState {
    pub windows: Vec<WindowRecord>,
    pub top_z_index: u32,
}

impl Default for WindowManagerState {
    fn default() -> Self {
        Self::with_base_z_index(DEFAULT_BASE_Z_INDEX)
    }
}

impl WindowManagerState {
    pub fn with_base_z_index(base_z_index: u32) -> Self {
        Self {
            windows: Vec::new(),
            top_z_index: base_z_index,
        }
    }

    pub fn window(&self, window_id: &WindowId) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| &w.id == window_id)
    }

    pub fn focused_window_id(&self) -> Option<&WindowId> {
        self.windows.iter().find(|w| w.is_focused).map(|w| &w.id)
    }

    pub fn active_count(&self) -> usize {
        self.windows.len()
    }

    /// Ids of visible windows from bottom to top; insertion order breaks z-index ties.
    pub fn stacking_order(&self) -> Vec<&WindowId> {
        let mut visible: Vec<(usize, &WindowRecord)> = self
            .windows
            .iter()
            .enumerate()
            .filter(|(_, w)| !w.minimized)
            .collect();
        visible.sort_by_key(|(idx, w)| (w.z_index, *idx));
        visible.into_iter().map(|(_, w)| &w.id).collect()
    }

    /// Verifies the focus, minimize, uniqueness, and stacking invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let focused = self.windows.iter().filter(|w| w.is_focused).count();
        if focused > 1 {
            return Err(InvariantViolation::MultipleFocused { count: focused });
        }
        for (idx, window) in self.windows.iter().enumerate() {
            if window.minimized && window.is_focused {
                return Err(InvariantViolation::MinimizedFocused {
                    window_id: window.id.clone(),
                });
            }
            if window.z_index > self.top_z_index {
                return Err(InvariantViolation::ZIndexAboveTop {
                    window_id: window.id.clone(),
                    z_index: window.z_index,
                    top_z_index: self.top_z_index,
                });
            }
            if self.windows[..idx].iter().any(|w| w.id == window.id) {
                return Err(InvariantViolation::DuplicateId {
                    window_id: window.id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// A broken window-collection invariant reported by [`WindowManagerState::check_invariants`].
pub enum InvariantViolation {
    /// More than one window is focused.
    #[error("{count} windows are focused at once")]
    MultipleFocused {
        /// Number of focused windows.
        count: usize,
    },
    /// A minimized window still holds focus.
    #[error("minimized window `{window_id}` is focused")]
    MinimizedFocused {
        /// Offending window.
        window_id: WindowId,
    },
    /// Two windows share one id.
    #[error("window id `{window_id}` appears more than once")]
    DuplicateId {
        /// Duplicated id.
        window_id: WindowId,
    },
    /// A window sits above the top z-index counter.
    #[error("window `{window_id}` has z-index {z_index} above top {top_z_index}")]
    ZIndexAboveTop {
        /// Offending window.
        window_id: WindowId,
        /// Its z-index.
        z_index: u32,
        /// Counter value.
        top_z_index: u32,
    },
}
