// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metadata Store: one `KEY=VALUE` file per session under
//! `<sessionsDir>/<sessionId>`. Writes are atomic via temp-file + rename
//! (POSIX rename is atomic within a filesystem), so a reader never observes
//! a partially written file.

use crate::error::StorageError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reserved keys every writer is expected to understand; plugins may add
/// further keys and they round-trip untouched.
pub const RESERVED_KEYS: &[&str] = &[
    "worktree",
    "branch",
    "status",
    "phase",
    "reviewRound",
    "issue",
    "pr",
    "project",
    "activity",
    "agentSessionId",
    "cost.inputTokens",
    "cost.outputTokens",
    "cost.usd",
    "subSessionInfo.role",
    "subSessionInfo.parentSessionId",
    "subSessionInfo.round",
];

pub type Record = HashMap<String, String>;

/// Durable per-session key-value file store with atomic writes and
/// per-session update mutexes.
pub struct MetadataStore {
    sessions_dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl MetadataStore {
    pub fn new(sessions_dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions_dir: sessions_dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.sessions_dir.join(session_id)
    }

    fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn io_err(session_id: &str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            session_id: session_id.to_string(),
            source,
        }
    }

    /// Write the full record, replacing whatever was there. Atomic: writers
    /// never leave a partially written file visible to readers.
    pub fn write(&self, session_id: &str, record: &Record) -> Result<(), StorageError> {
        for (key, value) in record {
            if value.contains('\n') {
                return Err(StorageError::ValueHasNewline { key: key.clone() });
            }
        }

        fs::create_dir_all(&self.sessions_dir).map_err(|e| Self::io_err(session_id, e))?;

        let mut keys: Vec<&String> = record.keys().collect();
        keys.sort();
        let mut body = String::new();
        for key in keys {
            body.push_str(key);
            body.push('=');
            body.push_str(&record[key]);
            body.push('\n');
        }

        let tmp_path = self
            .sessions_dir
            .join(format!(".{session_id}.tmp-{}", std::process::id()));
        {
            let mut file =
                fs::File::create(&tmp_path).map_err(|e| Self::io_err(session_id, e))?;
            file.write_all(body.as_bytes())
                .map_err(|e| Self::io_err(session_id, e))?;
            file.sync_all().map_err(|e| Self::io_err(session_id, e))?;
        }
        fs::rename(&tmp_path, self.session_path(session_id))
            .map_err(|e| Self::io_err(session_id, e))?;
        Ok(())
    }

    /// Read the full record, or `None` if the session has no metadata file.
    pub fn read_raw(&self, session_id: &str) -> Result<Option<Record>, StorageError> {
        let path = self.session_path(session_id);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_err(session_id, e)),
        };
        Ok(Some(parse_record(&content)))
    }

    /// Read-modify-write under the per-session mutex; returns the resulting
    /// full record. Keys not present in `partial` are preserved.
    pub fn update(&self, session_id: &str, partial: Record) -> Result<Record, StorageError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock();

        let mut record = self.read_raw(session_id)?.unwrap_or_default();
        record.extend(partial);
        self.write(session_id, &record)?;
        Ok(record)
    }

    /// List session IDs present in the store. Ignores non-regular files
    /// (directories, sockets) and temp files from an in-flight write.
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        let entries = match fs::read_dir(&self.sessions_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_err("*", e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Self::io_err("*", e))?;
            let file_type = entry.file_type().map_err(|e| Self::io_err("*", e))?;
            if !file_type.is_file() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') {
                continue;
            }
            ids.push(name.into_owned());
        }
        ids.sort();
        Ok(ids)
    }
}

fn parse_record(content: &str) -> Record {
    let mut record = Record::new();
    for line in content.lines() {
        if let Some((key, value)) = line.split_once('=') {
            record.insert(key.to_string(), value.to_string());
        }
    }
    record
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
