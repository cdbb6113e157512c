// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error for session {session_id}: {source}")]
    Io {
        session_id: String,
        #[source]
        source: std::io::Error,
    },
    #[error("metadata corrupt for session {session_id}: {reason}")]
    Corrupt { session_id: String, reason: String },
    #[error("value for key {key:?} contains a newline")]
    ValueHasNewline { key: String },
}
