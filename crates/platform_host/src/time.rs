//! Timestamps for recorded telemetry.
//!
//! Wall clocks can step backwards (NTP corrections, manual changes). Telemetry stamps are
//! clamped so that, within one process, a later record never carries an earlier stamp than one
//! already handed out, on any thread.

use std::sync::atomic::{AtomicU64, Ordering};

static LAST_STAMP_MS: AtomicU64 = AtomicU64::new(0);

/// Returns a unix-epoch millisecond stamp that never goes backwards across calls.
pub fn telemetry_timestamp_ms() -> u64 {
    let wall = wall_clock_ms();
    let previous = LAST_STAMP_MS.fetch_max(wall, Ordering::AcqRel);
    previous.max(wall)
}

#[cfg(target_arch = "wasm32")]
fn wall_clock_ms() -> u64 {
    js_sys::Date::now().max(0.0) as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn wall_clock_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn stamps_are_unix_epoch_milliseconds() {
        // 2020-01-01T00:00:00Z
        assert!(telemetry_timestamp_ms() > 1_577_836_800_000);
    }

    #[test]
    fn stamps_never_go_backwards_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                thread::spawn(|| {
                    let mut last = 0;
                    for _ in 0..1_000 {
                        let stamp = telemetry_timestamp_ms();
                        assert!(stamp >= last);
                        last = stamp;
                    }
                    last
                })
            })
            .collect();
        let latest = handles
            .into_iter()
            .map(|handle| handle.join().expect("stamping thread"))
            .max()
            .unwrap_or_default();

        assert!(telemetry_timestamp_ms() >= latest);
    }

    #[test]
    fn stamp_is_clamped_above_a_future_high_water_mark() {
        let ahead = wall_clock_ms() + 60_000;
        LAST_STAMP_MS.fetch_max(ahead, Ordering::AcqRel);

        assert!(telemetry_timestamp_ms() >= ahead);
    }
}
