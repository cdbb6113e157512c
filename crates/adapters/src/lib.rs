// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Plugin contracts and built-in adapters for the seven extension slots:
//! runtime, agent, workspace, tracker, SCM, notifier, terminal. The core
//! (`ao-engine`) only ever depends on the traits here, never on a concrete
//! plugin; this crate is where the concrete implementations live.

pub mod agent;
pub mod notifier;
pub mod registry;
pub mod runtime;
pub mod scm;
pub mod subprocess;
pub mod terminal;
pub mod tracker;
pub mod workspace;

pub use agent::{AgentAdapter, AgentError, AgentLaunchConfig, NoOpAgentAdapter};
pub use notifier::{DesktopNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError};
pub use registry::{PluginManifest, PluginRegistry, Slot};
pub use runtime::{
    NoOpRuntimeAdapter, RuntimeAdapter, RuntimeError, RuntimeHandle, RuntimeLaunchConfig,
    TmuxRuntimeAdapter,
};
pub use scm::{NoOpScmAdapter, ScmAdapter, ScmError};
pub use terminal::{NoOpTerminalAdapter, TerminalAdapter, TerminalError};
pub use tracker::{NoOpTrackerAdapter, TrackerAdapter, TrackerError};
pub use workspace::{GitWorktreeAdapter, NoOpWorkspaceAdapter, WorkspaceAdapter, WorkspaceError};

#[cfg(any(test, feature = "test-support"))]
pub use agent::{AgentCall, FakeAgentAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use notifier::{FakeNotifyAdapter, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use runtime::{FakeRuntimeAdapter, RuntimeCall};
#[cfg(any(test, feature = "test-support"))]
pub use scm::FakeScmAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use terminal::FakeTerminalAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use tracker::FakeTrackerAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use workspace::{FakeWorkspaceAdapter, WorkspaceCall};
