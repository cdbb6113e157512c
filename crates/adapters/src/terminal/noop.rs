// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op terminal adapter for headless deployments.

use super::{TerminalAdapter, TerminalError};
use ao_core::Session;
use async_trait::async_trait;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpTerminalAdapter;

impl NoOpTerminalAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TerminalAdapter for NoOpTerminalAdapter {
    async fn open_session(&self, _session: &Session) -> Result<(), TerminalError> {
        Ok(())
    }

    async fn is_session_open(&self, _session: &Session) -> Result<bool, TerminalError> {
        Ok(false)
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
