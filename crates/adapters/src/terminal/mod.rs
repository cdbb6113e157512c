// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal plugins: opens a human-visible window or pane onto a running
//! session (a local terminal emulator, a web terminal, …).

mod noop;

pub use noop::NoOpTerminalAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTerminalAdapter;

use ao_core::Session;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("terminal open failed: {0}")]
    OpenFailed(String),
}

#[async_trait]
pub trait TerminalAdapter: Send + Sync + 'static {
    async fn open_session(&self, session: &Session) -> Result<(), TerminalError>;

    async fn open_all(&self, sessions: &[Session]) -> Result<(), TerminalError> {
        for session in sessions {
            self.open_session(session).await?;
        }
        Ok(())
    }

    async fn is_session_open(&self, session: &Session) -> Result<bool, TerminalError>;
}
