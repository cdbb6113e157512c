// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-executable rate-limit bookkeeping: a floored reset time so false
//! "retry in 30s" claims from an agent can't thrash the fleet, output-pattern
//! detection for recognizing a rate limit from raw process output, and
//! fallback-chain resolution for picking an alternate executable.

use ao_core::{Clock, RateLimitEntry};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::LazyLock;

/// Minimum time an executable stays marked rate-limited, regardless of what
/// the agent itself reported.
pub const DEFAULT_MIN_RESET_FLOOR_MS: i64 = 15 * 60 * 1000;
/// Below this gap between a runtime create and its exit, an unexplained
/// process death is treated as a probable rate limit.
pub const DEFAULT_RAPID_EXIT_THRESHOLD_MS: i64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDetection {
    pub detected: bool,
    pub reset_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

impl OutputDetection {
    fn none() -> Self {
        Self {
            detected: false,
            reset_at: None,
            reason: None,
        }
    }
}

static RATE_LIMIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)rate[_ -]?limit|too many requests|\b429\b|quota exceeded|throttled")
        .expect("constant regex pattern is valid")
});

static RELATIVE_DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:try again in|retry after|wait|resets? in)\s+(\d+)\s*(sec|second|min|minute|hour|hr)s?",
    )
    .expect("constant regex pattern is valid")
});

static ABSOLUTE_RESET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)resets? at\s+(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(?::\d{2})?)")
        .expect("constant regex pattern is valid")
});

fn unit_to_seconds(unit: &str) -> i64 {
    match unit.to_ascii_lowercase().as_str() {
        "sec" | "second" => 1,
        "min" | "minute" => 60,
        "hour" | "hr" => 3600,
        _ => 1,
    }
}

/// Scans free-form process output for a rate-limit signature and, if one is
/// found, extracts a best-effort reset time. Callers still pass the result
/// through [`RateLimitTracker::record_rate_limit`], which re-applies the
/// floor regardless of what was parsed here.
pub fn detect_from_output(text: &str, now: DateTime<Utc>) -> OutputDetection {
    if !RATE_LIMIT_PATTERN.is_match(text) {
        return OutputDetection::none();
    }

    if let Some(caps) = RELATIVE_DURATION_PATTERN.captures(text) {
        let amount: i64 = caps[1].parse().unwrap_or(0);
        let seconds = amount * unit_to_seconds(&caps[2]);
        return OutputDetection {
            detected: true,
            reset_at: Some(now + ChronoDuration::seconds(seconds)),
            reason: Some(text.trim().to_string()),
        };
    }

    if let Some(caps) = ABSOLUTE_RESET_PATTERN.captures(text) {
        let raw = &caps[1];
        let parsed = if raw.len() == 16 {
            format!("{raw}:00Z")
        } else {
            format!("{raw}Z")
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(&parsed) {
            return OutputDetection {
                detected: true,
                reset_at: Some(dt.with_timezone(&Utc)),
                reason: Some(text.trim().to_string()),
            };
        }
    }

    OutputDetection {
        detected: true,
        reset_at: None,
        reason: Some(text.trim().to_string()),
    }
}

/// True iff an unexplained process exit happened inside the rapid-exit
/// window, a signal an exit was a silent rate limit rather than real work.
pub fn detect_rapid_exit(start_ms: u64, end_ms: u64, threshold_ms: u64) -> bool {
    end_ms >= start_ms && end_ms - start_ms < threshold_ms
}

struct Inner {
    entries: HashMap<String, RateLimitEntry>,
    fallback_chains: HashMap<String, Vec<String>>,
}

/// Tracks which executables are currently rate-limited and resolves
/// fallbacks. Single owner behind a mutex; entry count is small (one per
/// distinct agent executable) so contention isn't a concern.
pub struct RateLimitTracker {
    clock: Arc<dyn Clock>,
    min_reset_floor_ms: i64,
    rapid_exit_threshold_ms: u64,
    inner: Mutex<Inner>,
}

impl RateLimitTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            min_reset_floor_ms: DEFAULT_MIN_RESET_FLOOR_MS,
            rapid_exit_threshold_ms: DEFAULT_RAPID_EXIT_THRESHOLD_MS,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                fallback_chains: HashMap::new(),
            }),
        }
    }

    pub fn with_min_reset_floor_ms(mut self, floor_ms: i64) -> Self {
        self.min_reset_floor_ms = floor_ms;
        self
    }

    pub fn with_rapid_exit_threshold_ms(mut self, threshold_ms: u64) -> Self {
        self.rapid_exit_threshold_ms = threshold_ms;
        self
    }

    pub fn set_fallback_chain(&self, executable: impl Into<String>, chain: Vec<String>) {
        self.inner
            .lock()
            .fallback_chains
            .insert(executable.into(), chain);
    }

    /// Records a rate limit, flooring `reset_at` to at least
    /// `now + min_reset_floor_ms` regardless of what the caller requested.
    pub fn record_rate_limit(
        &self,
        executable: impl Into<String>,
        reset_at: DateTime<Utc>,
        reason: impl Into<String>,
    ) {
        let executable = executable.into();
        let now = self.clock.now();
        let floor = now + ChronoDuration::milliseconds(self.min_reset_floor_ms);
        let reset_at = reset_at.max(floor);

        self.inner.lock().entries.insert(
            executable.clone(),
            RateLimitEntry {
                executable,
                rate_limited_at: now,
                reset_at,
                reason: reason.into(),
            },
        );
    }

    pub fn get_entry(&self, executable: &str) -> Option<RateLimitEntry> {
        self.inner.lock().entries.get(executable).cloned()
    }

    /// True if `executable` is currently rate-limited. Lazily evicts expired
    /// entries so callers never need a separate sweep.
    pub fn is_rate_limited(&self, executable: &str) -> bool {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let Some(entry) = inner.entries.get(executable) else {
            return false;
        };
        if entry.reset_at <= now {
            inner.entries.remove(executable);
            return false;
        }
        true
    }

    /// Returns `preferred` if it isn't limited; otherwise walks its
    /// configured fallback chain for the first unlimited executable; if none
    /// is available, returns `preferred` anyway and lets the caller decide.
    pub fn get_available_executable(&self, preferred: &str) -> String {
        if !self.is_rate_limited(preferred) {
            return preferred.to_string();
        }
        let chain = self
            .inner
            .lock()
            .fallback_chains
            .get(preferred)
            .cloned()
            .unwrap_or_default();
        for candidate in &chain {
            if !self.is_rate_limited(candidate) {
                return candidate.clone();
            }
        }
        preferred.to_string()
    }

    pub fn detect_from_output(&self, text: &str) -> OutputDetection {
        detect_from_output(text, self.clock.now())
    }

    pub fn detect_rapid_exit(&self, start_ms: u64, end_ms: u64) -> bool {
        detect_rapid_exit(start_ms, end_ms, self.rapid_exit_threshold_ms)
    }
}

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;
