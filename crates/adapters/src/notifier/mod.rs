// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notifier plugins: where escalations and lifecycle events surface to a
//! human (desktop banners, Slack, a webhook, …).

mod desktop;
mod noop;

pub use desktop::DesktopNotifyAdapter;
pub use noop::NoOpNotifyAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifyAdapter, NotifyCall};

use ao_core::OrchestratorEvent;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notify send failed: {0}")]
    SendFailed(String),
}

#[derive(Debug, Clone)]
pub struct NotifyAction {
    pub label: String,
    pub command: String,
}

#[async_trait]
pub trait NotifyAdapter: Send + Sync + 'static {
    async fn notify(&self, event: &OrchestratorEvent) -> Result<(), NotifyError>;

    async fn notify_with_actions(
        &self,
        event: &OrchestratorEvent,
        _actions: &[NotifyAction],
    ) -> Result<(), NotifyError> {
        self.notify(event).await
    }

    async fn post(&self, _message: &str, _context: Option<&str>) -> Result<Option<String>, NotifyError> {
        Ok(None)
    }
}
