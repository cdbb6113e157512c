// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notifier recording every call for assertions.

use super::{NotifyAction, NotifyAdapter, NotifyError};
use ao_core::OrchestratorEvent;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum NotifyCall {
    Notify { event_id: String },
    NotifyWithActions { event_id: String, action_count: usize },
    Post { message: String },
}

#[derive(Clone, Default)]
pub struct FakeNotifyAdapter {
    calls: Arc<Mutex<Vec<NotifyCall>>>,
}

impl FakeNotifyAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<NotifyCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl NotifyAdapter for FakeNotifyAdapter {
    async fn notify(&self, event: &OrchestratorEvent) -> Result<(), NotifyError> {
        self.calls.lock().push(NotifyCall::Notify {
            event_id: event.id.clone(),
        });
        Ok(())
    }

    async fn notify_with_actions(
        &self,
        event: &OrchestratorEvent,
        actions: &[NotifyAction],
    ) -> Result<(), NotifyError> {
        self.calls.lock().push(NotifyCall::NotifyWithActions {
            event_id: event.id.clone(),
            action_count: actions.len(),
        });
        Ok(())
    }

    async fn post(&self, message: &str, _context: Option<&str>) -> Result<Option<String>, NotifyError> {
        self.calls.lock().push(NotifyCall::Post {
            message: message.to_string(),
        });
        Ok(Some("fake-message-id".to_string()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
