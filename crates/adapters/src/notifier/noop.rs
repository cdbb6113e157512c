// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op notifier; used when notifications are disabled.

use super::{NotifyAdapter, NotifyError};
use ao_core::OrchestratorEvent;
use async_trait::async_trait;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpNotifyAdapter;

impl NoOpNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for NoOpNotifyAdapter {
    async fn notify(&self, _event: &OrchestratorEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
