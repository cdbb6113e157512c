// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction.
//!
//! The Rate-Limit Tracker and Cycle Detector both reason about "now" relative
//! to recorded timestamps. Routing every comparison through a `Clock` trait
//! instead of calling `SystemTime::now()`/`Instant::now()` directly keeps
//! their floor/expiry arithmetic deterministic under test.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds since the Unix epoch, for metadata timestamps.
    fn epoch_ms(&self) -> u64 {
        self.now().timestamp_millis().max(0) as u64
    }
}

/// Production clock backed by the OS.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests; advances only when told to.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<DateTime<Utc>>>,
}

impl FakeClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let mut guard = self.inner.lock();
        *guard += delta;
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.inner.lock() = at;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.inner.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
