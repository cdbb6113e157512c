// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation abstractions

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for truncating identifiers to a short prefix.
pub trait ShortId {
    /// Returns a string slice truncated to at most `n` characters.
    fn short(&self, n: usize) -> &str;
}

impl ShortId for str {
    fn short(&self, n: usize) -> &str {
        if self.len() <= n {
            self
        } else {
            &self[..n]
        }
    }
}

/// Define a newtype ID wrapper around `String`.
///
/// Generates `new()`, `as_str()`, `short()`, `Display`, `From<String>`, `From<&str>`,
/// `PartialEq<str>`, `PartialEq<&str>`, and `Borrow<str>` implementations.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns a string slice truncated to at most `n` characters.
            pub fn short(&self, n: usize) -> &str {
                if self.0.len() <= n {
                    &self.0
                } else {
                    &self.0[..n]
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a project (one managed repository/config pair).
    pub struct ProjectId;
}

define_id! {
    /// Unique identifier for a session: `<projectPrefix>-<monotonic>`.
    ///
    /// Immutable once assigned and never reused across restarts, even though
    /// the format itself is just a display convention — callers must not
    /// parse it back apart.
    pub struct SessionId;
}

/// Generates unique identifiers, scoped to whatever `prefix` the caller
/// passes (a session's id is `<projectPrefix>-<monotonic>`, so callers pass
/// the owning project's id as the prefix).
pub trait IdGen: Send + Sync {
    fn next(&self, prefix: &str) -> String;
}

/// UUID-based ID generator for production use.
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self, prefix: &str) -> String {
        format!("{prefix}-{}", uuid::Uuid::new_v4())
    }
}

/// Sequential monotonic generator, the scheme `SessionId` uses: `spawn`
/// allocates `<prefix>-<n>` where `n` only ever increases. Each distinct
/// prefix (one per project) gets its own independent counter, so one
/// project's restart-rehydration never perturbs another's numbering.
#[derive(Clone, Default)]
pub struct SequentialIdGen {
    counters: Arc<Mutex<HashMap<String, Arc<AtomicU64>>>>,
}

impl SequentialIdGen {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn counter_for(&self, prefix: &str) -> Arc<AtomicU64> {
        self.counters
            .lock()
            .entry(prefix.to_string())
            .or_insert_with(|| Arc::new(AtomicU64::new(1)))
            .clone()
    }

    /// Bumps `prefix`'s counter so the next id issued is greater than
    /// `high_watermark`, without ever moving it backwards. Called during
    /// restart rehydration, once per project, with the highest monotonic
    /// suffix seen among that project's recovered sessions, so a recovered
    /// id is never reissued.
    pub fn resume_after(&self, prefix: &str, high_watermark: u64) {
        self.counter_for(prefix)
            .fetch_max(high_watermark + 1, Ordering::SeqCst);
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self, prefix: &str) -> String {
        let n = self.counter_for(prefix).fetch_add(1, Ordering::SeqCst);
        format!("{prefix}-{n}")
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
