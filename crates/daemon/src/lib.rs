// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent Orchestrator daemon library.
//!
//! Exposes the IPC protocol types and wire codec for use by `ao` (the CLI
//! client) and owns the daemon lifecycle (startup/shutdown/recovery) and
//! the Unix-socket listener that dispatches requests into `ao-engine`'s
//! `SessionManager`.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod env;
pub mod lifecycle;
pub mod listener;
pub mod protocol;
pub mod protocol_types;
pub mod protocol_wire;

pub use lifecycle::{Config, Daemon, LifecycleError};
pub use listener::Listener;
pub use protocol::{Query, Request, Response};
pub use protocol_types::{DaemonStatusPayload, ProjectSummary, SessionDetail, SessionSummary};
pub use protocol_wire::{ProtocolError, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE, PROTOCOL_VERSION};
