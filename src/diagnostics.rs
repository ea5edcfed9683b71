//! Internal counters of a logger.
//!
//! Every [`Logger`](crate::Logger) carries its own [`Diagnostics`]; read them
//! through `Logger::diagnostics()`. Updates are relaxed atomics and never
//! block the logging path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct Diagnostics {
    start_time: Option<Instant>,

    /// Events that reached output dispatch
    events_emitted: AtomicU64,

    /// Events dropped because the lock gate was busy
    events_dropped_busy: AtomicU64,

    /// Events dropped by topic lookup or topic level
    events_dropped_topic: AtomicU64,

    /// Handler calls, one per output an event was delivered to
    handler_invocations: AtomicU64,

    /// Calls into a capability that is not enabled
    disabled_calls: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsSnapshot {
    pub uptime: Option<Duration>,
    pub events_emitted: u64,
    pub events_dropped_busy: u64,
    pub events_dropped_topic: u64,
    pub handler_invocations: u64,
    pub disabled_calls: u64,
    /// Busy plus topic drops
    pub total_events_dropped: u64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Records an event that was dispatched to `invocations` handlers.
    pub fn record_emitted(&self, invocations: usize) {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
        self.handler_invocations
            .fetch_add(invocations as u64, Ordering::Relaxed);
    }

    pub fn increment_dropped_busy(&self) {
        self.events_dropped_busy.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_dropped_topic(&self) {
        self.events_dropped_topic.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_disabled_calls(&self) {
        self.disabled_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        let events_dropped_busy = self.events_dropped_busy.load(Ordering::Relaxed);
        let events_dropped_topic = self.events_dropped_topic.load(Ordering::Relaxed);

        DiagnosticsSnapshot {
            uptime: self.start_time.map(|start| start.elapsed()),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            events_dropped_busy,
            events_dropped_topic,
            handler_invocations: self.handler_invocations.load(Ordering::Relaxed),
            disabled_calls: self.disabled_calls.load(Ordering::Relaxed),
            total_events_dropped: events_dropped_busy + events_dropped_topic,
        }
    }

    /// Zeroes every counter (mainly for tests).
    pub fn reset(&self) {
        self.events_emitted.store(0, Ordering::Relaxed);
        self.events_dropped_busy.store(0, Ordering::Relaxed);
        self.events_dropped_topic.store(0, Ordering::Relaxed);
        self.handler_invocations.store(0, Ordering::Relaxed);
        self.disabled_calls.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_diagnostics_creation() {
        let diagnostics = Diagnostics::new();
        let snapshot = diagnostics.snapshot();

        assert!(snapshot.uptime.is_some());
        assert_eq!(snapshot.events_emitted, 0);
        assert_eq!(snapshot.total_events_dropped, 0);
    }

    #[test]
    fn test_record_and_drop_counts() {
        let diagnostics = Diagnostics::new();

        diagnostics.record_emitted(3);
        diagnostics.record_emitted(0);
        diagnostics.increment_dropped_busy();
        diagnostics.increment_dropped_topic();
        diagnostics.increment_dropped_topic();

        let snapshot = diagnostics.snapshot();
        assert_eq!(snapshot.events_emitted, 2);
        assert_eq!(snapshot.handler_invocations, 3);
        assert_eq!(snapshot.events_dropped_busy, 1);
        assert_eq!(snapshot.events_dropped_topic, 2);
        assert_eq!(snapshot.total_events_dropped, 3);
    }

    #[test]
    fn test_reset_functionality() {
        let diagnostics = Diagnostics::new();
        diagnostics.record_emitted(1);
        diagnostics.increment_disabled_calls();
        diagnostics.reset();

        let snapshot = diagnostics.snapshot();
        assert_eq!(snapshot.events_emitted, 0);
        assert_eq!(snapshot.disabled_calls, 0);
    }

    #[test]
    fn test_concurrent_access() {
        let diagnostics = Arc::new(Diagnostics::new());
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let diagnostics = diagnostics.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        diagnostics.record_emitted(2);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = diagnostics.snapshot();
        assert_eq!(snapshot.events_emitted, 1000);
        assert_eq!(snapshot.handler_invocations, 2000);
    }
}
