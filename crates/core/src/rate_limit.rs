// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rate-limit record type. The detection/tracking logic lives in
//! `ao-engine::rate_limit`; this is just the durable value shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitEntry {
    pub executable: String,
    pub rate_limited_at: DateTime<Utc>,
    pub reset_at: DateTime<Utc>,
    pub reason: String,
}
