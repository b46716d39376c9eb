//! Fixed-window usage counters backing rate limits.

use crate::RateUnit;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Result of a rate-limit query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageCheck {
    /// The current window still has room.
    Ok,
    /// The window's count has reached the limit; it reopens at `reset_at`.
    Exceeded { reset_at: DateTime<Utc> },
}

#[derive(Debug, Clone, Copy)]
struct Counter {
    window_start: DateTime<Utc>,
    count: u32,
}

/// Tracks uses of each feature per fixed calendar window.
///
/// Windows are aligned to UTC calendar boundaries: a `Minute` window covers
/// one wall-clock minute, `Hour` one hour, `Day` midnight to midnight.
/// Counters are created lazily per `(feature, unit)` pair and roll over when
/// a query or record lands in a new window.
///
/// All counters live behind a single mutex. Contention is expected to be
/// light, so one critical section per operation is enough to keep `check`,
/// `record`, and `reset_all` serialized. `check` and `record` are separate
/// on purpose: callers probe before acting and record only after the action
/// succeeded, so two concurrent callers can both pass `check` before either
/// records. That transient overshoot is accepted.
#[derive(Debug, Default)]
pub struct UsageTracker {
    counters: Mutex<HashMap<(String, RateUnit), Counter>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Would one more use stay within `max` for the window containing `at`?
    ///
    /// Read-only apart from lazily creating a zero counter the first time a
    /// `(feature, unit)` pair is seen. A stored counter from a different
    /// window counts as zero without being rewritten; only
    /// [`record`](Self::record) mutates counts, so repeated checks always
    /// return the same answer.
    pub fn check(
        &self,
        feature_id: &str,
        unit: RateUnit,
        max: u32,
        at: DateTime<Utc>,
    ) -> UsageCheck {
        let start = window_start(unit, at);
        let mut counters = self.lock();
        let entry = counters
            .entry((feature_id.to_string(), unit))
            .or_insert(Counter {
                window_start: start,
                count: 0,
            });
        let count = if entry.window_start == start {
            entry.count
        } else {
            0
        };
        if count >= max {
            UsageCheck::Exceeded {
                reset_at: window_end(unit, start),
            }
        } else {
            UsageCheck::Ok
        }
    }

    /// Record one use at `at`, rolling the counter into a fresh window first
    /// if the stored window no longer matches. The only mutating operation.
    pub fn record(&self, feature_id: &str, unit: RateUnit, at: DateTime<Utc>) {
        let start = window_start(unit, at);
        let mut counters = self.lock();
        let entry = counters
            .entry((feature_id.to_string(), unit))
            .or_insert(Counter {
                window_start: start,
                count: 0,
            });
        if entry.window_start != start {
            *entry = Counter {
                window_start: start,
                count: 0,
            };
        }
        entry.count += 1;
    }

    /// Clear every counter. Administrative escape hatch, not part of the
    /// evaluation path.
    pub fn reset_all(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(String, RateUnit), Counter>> {
        // A poisoned map still holds valid counters; keep going.
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn window_start(unit: RateUnit, at: DateTime<Utc>) -> DateTime<Utc> {
    at.duration_trunc(span(unit)).unwrap_or(at)
}

fn window_end(unit: RateUnit, start: DateTime<Utc>) -> DateTime<Utc> {
    start.checked_add_signed(span(unit)).unwrap_or(start)
}

fn span(unit: RateUnit) -> TimeDelta {
    match unit {
        RateUnit::Minute => TimeDelta::minutes(1),
        RateUnit::Hour => TimeDelta::hours(1),
        RateUnit::Day => TimeDelta::days(1),
    }
}
