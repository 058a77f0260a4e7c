pub mod drain;
pub mod logging;

use bytes::Bytes;
use http_body_util::Full;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[inline]
pub fn empty_body() -> Full<Bytes> {
    Full::new(Bytes::new())
}

#[inline]
pub fn byte_body<B: Into<Bytes>>(bytes: B) -> Full<Bytes> {
    Full::new(bytes.into())
}

/// Request tallies shared by every virtual user of a run.
///
/// Cloning hands out another handle to the same counters. Each update is a single
/// atomic read-modify-write, so concurrent recorders never lose an increment.
#[derive(Clone, Default)]
pub struct RunCounters {
    inner: Arc<Counters>,
}

struct Counters {
    attempted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    total_rtt_micros: AtomicU64,
    min_rtt_micros: AtomicU64,
    max_rtt_micros: AtomicU64,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            attempted: AtomicU64::new(0),
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            total_rtt_micros: AtomicU64::new(0),
            min_rtt_micros: AtomicU64::new(u64::MAX),
            max_rtt_micros: AtomicU64::new(0),
        }
    }
}

impl RunCounters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one finished request.
    ///
    /// The outcome counter is bumped before `attempted`, so once every recorder
    /// has returned `attempted == succeeded + failed` holds.
    #[inline]
    pub fn record(&self, success: bool, rtt: Duration) {
        let c = &self.inner;
        if success {
            c.succeeded.fetch_add(1, Ordering::AcqRel);
        } else {
            c.failed.fetch_add(1, Ordering::AcqRel);
        }
        let micros = u64::try_from(rtt.as_micros()).unwrap_or(u64::MAX);
        c.total_rtt_micros.fetch_add(micros, Ordering::AcqRel);
        c.min_rtt_micros.fetch_min(micros, Ordering::AcqRel);
        c.max_rtt_micros.fetch_max(micros, Ordering::AcqRel);
        c.attempted.fetch_add(1, Ordering::AcqRel);
    }

    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> CountersSnapshot {
        let c = &self.inner;
        let attempted = c.attempted.load(Ordering::Acquire);
        let min = c.min_rtt_micros.load(Ordering::Acquire);
        CountersSnapshot {
            attempted,
            succeeded: c.succeeded.load(Ordering::Acquire),
            failed: c.failed.load(Ordering::Acquire),
            total_rtt_micros: c.total_rtt_micros.load(Ordering::Acquire),
            min_rtt_micros: if attempted == 0 { 0 } else { min },
            max_rtt_micros: c.max_rtt_micros.load(Ordering::Acquire),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CountersSnapshot {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub total_rtt_micros: u64,
    pub min_rtt_micros: u64,
    pub max_rtt_micros: u64,
}

impl CountersSnapshot {
    #[inline]
    #[must_use]
    pub fn mean_rtt_micros(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        self.total_rtt_micros as f64 / self.attempted as f64
    }
}

/// One-shot flag telling virtual users to stop after their current request.
#[derive(Clone, Default)]
pub struct StopSignal {
    raised: Arc<AtomicBool>,
}

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` only for the call that actually flipped the flag.
    #[inline]
    pub fn raise(&self) -> bool {
        !self.raised.swap(true, Ordering::AcqRel)
    }

    #[inline]
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::{CountersSnapshot, RunCounters, StopSignal};
    use std::time::Duration;

    #[test]
    fn fresh_counters_are_zero() {
        assert_eq!(RunCounters::new().snapshot(), CountersSnapshot::default());
    }

    #[test]
    fn record_tracks_outcomes_and_latency() {
        let counters = RunCounters::new();
        counters.record(true, Duration::from_micros(100));
        counters.record(false, Duration::from_micros(300));
        counters.record(true, Duration::from_micros(200));
        let snap = counters.snapshot();
        assert_eq!(snap.attempted, 3);
        assert_eq!(snap.succeeded, 2);
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.min_rtt_micros, 100);
        assert_eq!(snap.max_rtt_micros, 300);
        assert!((snap.mean_rtt_micros() - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn concurrent_records_are_not_lost() {
        const THREADS: u64 = 8;
        const PER_THREAD: u64 = 10_000;
        let counters = RunCounters::new();
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let counters = counters.clone();
                std::thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        counters.record((t + i) % 2 == 0, Duration::from_micros(i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let snap = counters.snapshot();
        assert_eq!(snap.attempted, THREADS * PER_THREAD);
        assert_eq!(snap.attempted, snap.succeeded + snap.failed);
        assert_eq!(snap.succeeded, THREADS * PER_THREAD / 2);
        assert_eq!(snap.min_rtt_micros, 0);
        assert_eq!(snap.max_rtt_micros, PER_THREAD - 1);
    }

    #[test]
    fn snapshot_serializes_as_json() {
        let counters = RunCounters::new();
        counters.record(true, Duration::from_micros(5));
        let json = serde_json::to_value(counters.snapshot()).unwrap();
        assert_eq!(json["attempted"], 1);
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["failed"], 0);
    }

    #[test]
    fn stop_signal_raises_once() {
        let stop = StopSignal::new();
        let observer = stop.clone();
        assert!(!observer.is_raised());
        assert!(stop.raise());
        assert!(!stop.raise());
        assert!(observer.is_raised());
    }
}
