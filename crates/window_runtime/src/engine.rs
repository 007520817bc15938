//! Shared, thread-safe window manager engine.
//!
//! The engine owns the only mutable copy of [`WindowManagerState`]. Each operation runs the
//! reducer under one mutex covering both the window collection and the top z-index counter, then
//! publishes an immutable snapshot. Readers take the latest snapshot without waiting for an
//! in-flight operation. Subscribers and the telemetry sink run after the state lock is released.
//!
//! Each published snapshot carries a sequence number assigned under the state lock. Only one
//! thread delivers to subscribers at a time, and it always hands out the newest snapshot, so a
//! dispatch racing with delivery (from another thread or from inside a subscriber) can never
//! leave a subscriber holding an older state than the engine. Intermediate snapshots published
//! while a delivery is running are coalesced into the newest one.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use platform_host::{NoopTelemetrySink, TelemetrySink};

use crate::{
    config::WindowManagerConfig,
    model::{OpenWindowRequest, WindowId, WindowManagerState, WindowRecord},
    reducer::{reduce_windows, WindowAction},
    telemetry::{self, TelemetryRecord},
};

/// Handle returned by [`WindowManagerEngine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(&Arc<WindowManagerState>) + Send + Sync>;

#[derive(Default)]
struct SubscriberRegistry {
    next_id: u64,
    entries: Vec<(SubscriptionId, Subscriber)>,
}

struct Published {
    seq: u64,
    snapshot: Arc<WindowManagerState>,
}

#[derive(Default)]
struct Delivery {
    draining: bool,
    delivered_seq: u64,
}

/// Clears `draining` when a subscriber panics, so later publications still go out.
struct DrainGuard<'a>(&'a Mutex<Delivery>);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.lock().draining = false;
        }
    }
}

/// Window manager state engine shared by every UI component of the desktop.
pub struct WindowManagerEngine {
    config: WindowManagerConfig,
    state: Mutex<WindowManagerState>,
    published: RwLock<Published>,
    telemetry: Arc<dyn TelemetrySink>,
    subscribers: Mutex<SubscriberRegistry>,
    delivery: Mutex<Delivery>,
}

impl Default for WindowManagerEngine {
    fn default() -> Self {
        Self::new(Arc::new(NoopTelemetrySink))
    }
}

impl std::fmt::Debug for WindowManagerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowManagerEngine")
            .field("config", &self.config)
            .field("state", &*self.published.read().snapshot)
            .finish_non_exhaustive()
    }
}

impl WindowManagerEngine {
    /// Creates an engine with default configuration reporting into `telemetry`.
    pub fn new(telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self::with_config(WindowManagerConfig::default(), telemetry)
    }

    /// Creates an engine seeded from `config`.
    pub fn with_config(config: WindowManagerConfig, telemetry: Arc<dyn TelemetrySink>) -> Self {
        let initial = WindowManagerState::with_base_z_index(config.base_z_index);
        Self {
            config,
            published: RwLock::new(Published {
                seq: 0,
                snapshot: Arc::new(initial.clone()),
            }),
            state: Mutex::new(initial),
            telemetry,
            subscribers: Mutex::new(SubscriberRegistry::default()),
            delivery: Mutex::new(Delivery::default()),
        }
    }

    pub fn config(&self) -> &WindowManagerConfig {
        &self.config
    }

    /// Applies one action and returns the snapshot current after it.
    ///
    /// When another thread is already delivering to subscribers, this call returns without
    /// waiting and that thread delivers the new snapshot.
    pub fn dispatch(&self, action: WindowAction) -> Arc<WindowManagerState> {
        let (snapshot, changed, records) = {
            let mut state = self.state.lock();
            let top_before = state.top_z_index;
            let records = reduce_windows(&mut state, action);
            // Every transition either allocates a z-index or reports telemetry.
            let changed = !records.is_empty() || state.top_z_index != top_before;
            let snapshot = if changed {
                let snapshot = Arc::new(state.clone());
                let mut published = self.published.write();
                published.seq += 1;
                published.snapshot = Arc::clone(&snapshot);
                snapshot
            } else {
                self.snapshot()
            };
            (snapshot, changed, records)
        };

        if changed {
            self.notify_subscribers();
        }
        self.emit(records);
        snapshot
    }

    pub fn open(&self, request: OpenWindowRequest) -> Arc<WindowManagerState> {
        self.dispatch(WindowAction::OpenWindow(request))
    }

    pub fn close(&self, window_id: impl Into<WindowId>) -> Arc<WindowManagerState> {
        self.dispatch(WindowAction::CloseWindow {
            window_id: window_id.into(),
        })
    }

    pub fn minimize(&self, window_id: impl Into<WindowId>) -> Arc<WindowManagerState> {
        self.dispatch(WindowAction::MinimizeWindow {
            window_id: window_id.into(),
        })
    }

    /// Toggles the maximized flag.
    pub fn maximize(&self, window_id: impl Into<WindowId>) -> Arc<WindowManagerState> {
        self.dispatch(WindowAction::MaximizeWindow {
            window_id: window_id.into(),
        })
    }

    pub fn restore(&self, window_id: impl Into<WindowId>) -> Arc<WindowManagerState> {
        self.dispatch(WindowAction::RestoreWindow {
            window_id: window_id.into(),
        })
    }

    pub fn focus(&self, window_id: impl Into<WindowId>) -> Arc<WindowManagerState> {
        self.dispatch(WindowAction::FocusWindow {
            window_id: window_id.into(),
        })
    }

    pub fn toggle_taskbar_window(&self, window_id: impl Into<WindowId>) -> Arc<WindowManagerState> {
        self.dispatch(WindowAction::ToggleTaskbarWindow {
            window_id: window_id.into(),
        })
    }

    pub fn update_window_position(
        &self,
        window_id: impl Into<WindowId>,
        x: i32,
        y: i32,
    ) -> Arc<WindowManagerState> {
        self.dispatch(WindowAction::UpdateWindowPosition {
            window_id: window_id.into(),
            x,
            y,
        })
    }

    /// Applies `width`/`height` unvalidated; bounds belong to the gesture issuing the resize.
    pub fn update_window_size(
        &self,
        window_id: impl Into<WindowId>,
        width: i32,
        height: i32,
    ) -> Arc<WindowManagerState> {
        self.dispatch(WindowAction::UpdateWindowSize {
            window_id: window_id.into(),
            width,
            height,
        })
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<WindowManagerState> {
        Arc::clone(&self.published.read().snapshot)
    }

    pub fn windows(&self) -> Vec<WindowRecord> {
        self.snapshot().windows.clone()
    }

    pub fn top_z_index(&self) -> u32 {
        self.published.read().snapshot.top_z_index
    }

    pub fn focused_window_id(&self) -> Option<WindowId> {
        self.published.read().snapshot.focused_window_id().cloned()
    }

    pub fn window(&self, window_id: &WindowId) -> Option<WindowRecord> {
        self.published.read().snapshot.window(window_id).cloned()
    }

    pub fn active_count(&self) -> usize {
        self.published.read().snapshot.active_count()
    }

    /// Registers `callback` to receive snapshots published after a state change.
    ///
    /// Snapshots published while a delivery is in progress are coalesced: the callback may skip
    /// intermediate states, but always receives the newest one last.
    pub fn subscribe(
        &self,
        callback: impl Fn(&Arc<WindowManagerState>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let mut registry = self.subscribers.lock();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.entries.push((id, Arc::new(callback)));
        id
    }

    /// Removes a subscription. Returns `false` when it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.subscribers.lock();
        let before = registry.entries.len();
        registry.entries.retain(|(entry, _)| *entry != id);
        registry.entries.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().entries.len()
    }

    fn notify_subscribers(&self) {
        {
            let mut delivery = self.delivery.lock();
            if delivery.draining {
                return;
            }
            delivery.draining = true;
        }
        let _guard = DrainGuard(&self.delivery);

        loop {
            // Read under the delivery lock: a publisher that saw `draining` has already
            // bumped the sequence, so the drain cannot stop short of its snapshot.
            let snapshot = {
                let mut delivery = self.delivery.lock();
                let published = self.published.read();
                if delivery.delivered_seq >= published.seq {
                    delivery.draining = false;
                    return;
                }
                delivery.delivered_seq = published.seq;
                Arc::clone(&published.snapshot)
            };

            let subscribers: Vec<Subscriber> = self
                .subscribers
                .lock()
                .entries
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect();
            for callback in subscribers {
                callback(&snapshot);
            }
        }
    }

    fn emit(&self, mut records: Vec<TelemetryRecord>) {
        if !self.config.telemetry_enabled {
            return;
        }
        if !self.config.active_count_gauge {
            records.retain(|record| !matches!(record, TelemetryRecord::Gauge { .. }));
        }
        if !records.is_empty() {
            telemetry::deliver(self.telemetry.as_ref(), &records);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
            Weak,
        },
        thread,
    };

    use platform_host::{
        MemoryTelemetrySink, TelemetryError, TelemetryFields, TelemetrySeverity, TelemetryTags,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        model::WindowRect,
        telemetry::{EVENT_CLOSE, EVENT_MINIMIZE, EVENT_OPEN, EVENT_REFOCUS, GAUGE_ACTIVE_COUNT},
    };

    struct PanickingSink;

    impl TelemetrySink for PanickingSink {
        fn record_event(
            &self,
            name: &str,
            _severity: TelemetrySeverity,
            _fields: &TelemetryFields,
        ) -> Result<(), TelemetryError> {
            panic!("sink down while recording {name}");
        }

        fn record_gauge(
            &self,
            _name: &str,
            _value: f64,
            _tags: &TelemetryTags,
        ) -> Result<(), TelemetryError> {
            Err(TelemetryError::Rejected {
                reason: "offline".to_string(),
            })
        }
    }

    fn request(id: &str) -> OpenWindowRequest {
        OpenWindowRequest::new(id, "Notes", WindowRect::new(0, 0, 400, 300))
    }

    fn recording_engine() -> (WindowManagerEngine, MemoryTelemetrySink) {
        let sink = MemoryTelemetrySink::default();
        (WindowManagerEngine::new(Arc::new(sink.clone())), sink)
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WindowManagerEngine>();
    }

    #[test]
    fn operations_publish_snapshots_and_telemetry() {
        let (engine, sink) = recording_engine();

        let after_open = engine.open(request("a"));
        assert_eq!(after_open.windows.len(), 1);
        assert_eq!(after_open.top_z_index, 101);
        assert_eq!(engine.snapshot(), after_open);

        engine.open(request("b"));
        engine.open(request("a"));
        engine.minimize("b");
        engine.close("a");

        assert_eq!(
            sink.event_names(),
            vec![EVENT_OPEN, EVENT_OPEN, EVENT_REFOCUS, EVENT_MINIMIZE, EVENT_CLOSE]
        );
        assert_eq!(sink.last_gauge(GAUGE_ACTIVE_COUNT), Some(1.0));
        assert_eq!(engine.active_count(), 1);
        assert_eq!(engine.focused_window_id(), None);
    }

    #[test]
    fn noop_operations_keep_the_published_snapshot() {
        let (engine, sink) = recording_engine();
        engine.open(request("a"));
        let before = engine.snapshot();
        sink.clear();

        let after = engine.close("missing");

        assert!(Arc::ptr_eq(&before, &after));
        assert!(sink.records().is_empty());
    }

    #[test]
    fn focus_publishes_even_without_telemetry() {
        let (engine, sink) = recording_engine();
        engine.open(request("a"));
        engine.open(request("b"));
        sink.clear();

        let after = engine.focus("a");

        assert_eq!(after.top_z_index, 103);
        assert_eq!(engine.window(&WindowId::from("a")).map(|w| w.z_index), Some(103));
        assert!(sink.records().is_empty());
    }

    #[test]
    fn failing_sink_never_affects_state() {
        let engine = WindowManagerEngine::new(Arc::new(PanickingSink));

        engine.open(request("a"));
        engine.open(request("b"));
        engine.maximize("a");
        engine.close("b");

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.windows.len(), 1);
        assert!(snapshot.windows[0].maximized);
        assert_eq!(snapshot.check_invariants(), Ok(()));
    }

    #[test]
    fn config_controls_seed_and_telemetry_filtering() {
        let sink = MemoryTelemetrySink::default();
        let engine = WindowManagerEngine::with_config(
            WindowManagerConfig {
                base_z_index: 10,
                telemetry_enabled: true,
                active_count_gauge: false,
            },
            Arc::new(sink.clone()),
        );
        engine.open(request("a"));
        assert_eq!(engine.top_z_index(), 11);
        assert_eq!(sink.records().len(), 1);
        assert_eq!(sink.last_gauge(GAUGE_ACTIVE_COUNT), None);

        let muted = MemoryTelemetrySink::default();
        let engine = WindowManagerEngine::with_config(
            WindowManagerConfig {
                telemetry_enabled: false,
                ..WindowManagerConfig::default()
            },
            Arc::new(muted.clone()),
        );
        engine.open(request("a"));
        assert!(muted.records().is_empty());
        assert_eq!(engine.windows().len(), 1);
    }

    #[test]
    fn subscribers_see_changes_until_unsubscribed() {
        let engine = WindowManagerEngine::default();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_by_callback = Arc::clone(&seen);
        let id = engine.subscribe(move |snapshot| {
            seen_by_callback.store(snapshot.windows.len(), Ordering::SeqCst);
        });

        engine.open(request("a"));
        engine.open(request("b"));
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        assert!(engine.unsubscribe(id));
        assert!(!engine.unsubscribe(id));
        assert_eq!(engine.subscriber_count(), 0);
        engine.close("a");
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn subscriber_ends_on_latest_snapshot_when_another_thread_dispatches_mid_delivery() {
        let engine = Arc::new(WindowManagerEngine::default());
        engine.open(request("a"));
        engine.open(request("b"));

        let last_seen_top = Arc::new(AtomicU32::new(0));
        let first_call = Arc::new(AtomicBool::new(true));
        let weak: Weak<WindowManagerEngine> = Arc::downgrade(&engine);
        let seen = Arc::clone(&last_seen_top);
        engine.subscribe(move |snapshot| {
            if first_call.swap(false, Ordering::SeqCst) {
                if let Some(engine) = weak.upgrade() {
                    thread::spawn(move || {
                        engine.focus("b");
                    })
                    .join()
                    .expect("focus thread");
                }
            }
            seen.store(snapshot.top_z_index, Ordering::SeqCst);
        });

        engine.focus("a");

        assert_eq!(engine.top_z_index(), 104);
        assert_eq!(last_seen_top.load(Ordering::SeqCst), engine.top_z_index());
        assert_eq!(engine.focused_window_id(), Some(WindowId::from("b")));
    }

    #[test]
    fn dispatch_from_inside_a_subscriber_is_delivered_after_it_returns() {
        let engine = Arc::new(WindowManagerEngine::default());
        engine.open(request("a"));

        let seen_tops = Arc::new(Mutex::new(Vec::new()));
        let weak = Arc::downgrade(&engine);
        let seen = Arc::clone(&seen_tops);
        engine.subscribe(move |snapshot| {
            seen.lock().push(snapshot.top_z_index);
            if snapshot.windows.len() == 1 {
                if let Some(engine) = weak.upgrade() {
                    engine.open(request("b"));
                }
            }
        });

        engine.focus("a");

        assert_eq!(*seen_tops.lock(), vec![102, 103]);
        assert_eq!(engine.windows().len(), 2);
    }

    #[test]
    fn panicking_subscriber_does_not_stall_later_deliveries() {
        let engine = WindowManagerEngine::default();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_by_callback = Arc::clone(&seen);
        engine.subscribe(move |snapshot| {
            seen_by_callback.store(snapshot.windows.len(), Ordering::SeqCst);
            if snapshot.windows.len() == 1 {
                panic!("subscriber failed");
            }
        });

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            engine.open(request("a"));
        }));
        assert!(outcome.is_err());

        engine.open(request("b"));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_focus_calls_allocate_unique_z_indices() {
        const THREADS: usize = 8;
        const ROUNDS: usize = 250;

        let engine = Arc::new(WindowManagerEngine::default());
        for idx in 0..THREADS {
            engine.open(request(&format!("w{idx}")));
        }

        let handles: Vec<_> = (0..THREADS)
            .map(|idx| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    for _ in 0..ROUNDS {
                        engine.focus(format!("w{idx}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker");
        }

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.check_invariants(), Ok(()));
        assert_eq!(snapshot.top_z_index, 100 + (THREADS * (ROUNDS + 1)) as u32);
        let mut z: Vec<u32> = snapshot.windows.iter().map(|w| w.z_index).collect();
        z.sort_unstable();
        z.dedup();
        assert_eq!(z.len(), THREADS);
        let focused = snapshot.focused_window_id().expect("one focused window");
        assert_eq!(
            snapshot.window(focused).map(|w| w.z_index),
            Some(snapshot.top_z_index)
        );
    }
}
