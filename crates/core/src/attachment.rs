// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Descriptor returned by a Runtime/Terminal plugin's `getAttachInfo`, so an
//! external CLI can tell the operator how to attach to a live session
//! without the core needing to know the runtime's attach mechanics.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Tmux,
    Ssh,
    Docker,
    Lxc,
    Process,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentInfo {
    pub kind: AttachmentKind,
    pub target: String,
    pub command: String,
}
