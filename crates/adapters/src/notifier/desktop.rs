// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop notification adapter using notify-rust.
//!
//! On macOS, `notify-rust` uses `mac-notification-sys` (Cocoa bindings) to
//! send notifications via the Notification Center. The first notification
//! triggers `ensure_application_set()`, which runs an AppleScript to look up
//! a bundle identifier; in a daemon context without Automation permissions
//! that AppleScript blocks forever. Pre-setting the bundle identifier at
//! construction time bypasses the lookup entirely.

use super::{NotifyAdapter, NotifyError};
use ao_core::OrchestratorEvent;
use async_trait::async_trait;

#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopNotifyAdapter;

impl DesktopNotifyAdapter {
    pub fn new() -> Self {
        #[cfg(target_os = "macos")]
        {
            let _ = mac_notification_sys::set_application("com.apple.Terminal");
        }
        Self
    }
}

#[async_trait]
impl NotifyAdapter for DesktopNotifyAdapter {
    async fn notify(&self, event: &OrchestratorEvent) -> Result<(), NotifyError> {
        let title = format!("{:?}", event.event_type);
        let message = event.message.clone();
        // notify_rust::Notification::show() is synchronous on macOS; run it
        // on the blocking pool so it never stalls the async runtime.
        tokio::task::spawn_blocking(move || {
            tracing::info!(%title, %message, "sending desktop notification");
            match notify_rust::Notification::new()
                .summary(&title)
                .body(&message)
                .show()
            {
                Ok(_) => tracing::info!(%title, "desktop notification sent"),
                Err(e) => tracing::warn!(%title, error = %e, "desktop notification failed"),
            }
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "desktop_tests.rs"]
mod tests;
