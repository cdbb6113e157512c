// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake terminal adapter for testing.

use super::{TerminalAdapter, TerminalError};
use ao_core::Session;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct FakeTerminalAdapter {
    opened: Arc<Mutex<HashSet<String>>>,
}

impl FakeTerminalAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened_session_ids(&self) -> Vec<String> {
        self.opened.lock().iter().cloned().collect()
    }
}

#[async_trait]
impl TerminalAdapter for FakeTerminalAdapter {
    async fn open_session(&self, session: &Session) -> Result<(), TerminalError> {
        self.opened.lock().insert(session.id.as_str().to_string());
        Ok(())
    }

    async fn is_session_open(&self, session: &Session) -> Result<bool, TerminalError> {
        Ok(self.opened.lock().contains(session.id.as_str()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
