//! In-process metrics registry for storage instrumentation.
//!
//! The registry is an explicit, shareable object rather than process-wide
//! state. It owns the enabled flag that gates recording, and hands out named
//! instruments:
//! - [`Timer`]: count, min, mean, max and total of operation latencies
//! - [`Meter`]: monotonically increasing count (bytes, misses)
//!
//! All instruments are lock-free atomics and safe to update concurrently.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;

/// Latency timer with nanosecond resolution.
#[derive(Debug)]
pub struct Timer {
    count: AtomicU64,
    sum_ns: AtomicU64,
    min_ns: AtomicU64,
    max_ns: AtomicU64,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_ns: AtomicU64::new(0),
            min_ns: AtomicU64::new(u64::MAX),
            max_ns: AtomicU64::new(0),
        }
    }

    /// Record one sample.
    ///
    /// Samples are clamped to at least 1ns, so a recorded operation never
    /// reports a zero duration.
    pub fn update(&self, elapsed: Duration) {
        let ns = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX).max(1);

        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum_ns.fetch_add(ns, Ordering::Relaxed);
        self.min_ns.fetch_min(ns, Ordering::Relaxed);
        self.max_ns.fetch_max(ns, Ordering::Relaxed);
    }

    /// Record the time elapsed since `start`.
    pub fn update_since(&self, start: Instant) {
        self.update(start.elapsed());
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Smallest sample, or zero if nothing was recorded.
    pub fn min(&self) -> Duration {
        match self.min_ns.load(Ordering::Relaxed) {
            u64::MAX => Duration::ZERO,
            ns => Duration::from_nanos(ns),
        }
    }

    pub fn max(&self) -> Duration {
        Duration::from_nanos(self.max_ns.load(Ordering::Relaxed))
    }

    pub fn mean(&self) -> Duration {
        let count = self.count();
        if count == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.sum_ns.load(Ordering::Relaxed) / count)
    }

    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.sum_ns.load(Ordering::Relaxed))
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            count: self.count(),
            min_ns: self.min().as_nanos() as u64,
            mean_ns: self.mean().as_nanos() as u64,
            max_ns: self.max().as_nanos() as u64,
            total_ns: self.total().as_nanos() as u64,
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonic event counter.
#[derive(Debug, Default)]
pub struct Meter {
    count: AtomicU64,
}

impl Meter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `n` to the count.
    pub fn mark(&self, n: u64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Point-in-time view of a [`Timer`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub count: u64,
    pub min_ns: u64,
    pub mean_ns: u64,
    pub max_ns: u64,
    pub total_ns: u64,
}

/// Point-in-time view of every instrument in a registry, sorted by name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub enabled: bool,
    pub timers: BTreeMap<String, TimerSnapshot>,
    pub meters: BTreeMap<String, u64>,
}

/// Named timers and meters plus the flag that gates recording.
#[derive(Debug)]
pub struct MetricsRegistry {
    enabled: AtomicBool,
    timers: DashMap<String, Arc<Timer>>,
    meters: DashMap<String, Arc<Meter>>,
}

impl MetricsRegistry {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            timers: DashMap::new(),
            meters: DashMap::new(),
        }
    }

    /// Whether instruments handed out by this registry should record.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Toggle recording. Takes effect on the next operation of every
    /// metered store bound to this registry.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Get or register the timer called `name`.
    pub fn timer(&self, name: &str) -> Arc<Timer> {
        if let Some(timer) = self.timers.get(name) {
            return Arc::clone(timer.value());
        }
        Arc::clone(
            self.timers
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Timer::new()))
                .value(),
        )
    }

    /// Get or register the meter called `name`.
    pub fn meter(&self, name: &str) -> Arc<Meter> {
        if let Some(meter) = self.meters.get(name) {
            return Arc::clone(meter.value());
        }
        Arc::clone(
            self.meters
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Meter::new()))
                .value(),
        )
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            enabled: self.is_enabled(),
            timers: self
                .timers
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().snapshot()))
                .collect(),
            meters: self
                .meters
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().count()))
                .collect(),
        }
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new(false)
    }
}
