// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin Registry: registers plugin instances by `(slot, name)` and looks
//! them up for the Session Manager. Built-in plugins are enumerated by a
//! static table; loading a plugin that isn't registered is never fatal —
//! callers get `None` and fall back or skip, the same as a missing config
//! block.

use crate::agent::AgentAdapter;
use crate::notifier::NotifyAdapter;
use crate::runtime::RuntimeAdapter;
use crate::scm::ScmAdapter;
use crate::terminal::TerminalAdapter;
use crate::tracker::TrackerAdapter;
use crate::workspace::WorkspaceAdapter;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Runtime,
    Agent,
    Workspace,
    Tracker,
    Scm,
    Notifier,
    Terminal,
}

impl Slot {
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Runtime => "runtime",
            Slot::Agent => "agent",
            Slot::Workspace => "workspace",
            Slot::Tracker => "tracker",
            Slot::Scm => "scm",
            Slot::Notifier => "notifier",
            Slot::Terminal => "terminal",
        }
    }
}

/// Describes one registered plugin instance, independent of its slot's
/// concrete trait. `package_ref` is `ao-plugin-<slot>-<name>` for built-ins
/// normalized from a bare config name.
#[derive(Debug, Clone)]
pub struct PluginManifest {
    pub slot: Slot,
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Normalizes a bare plugin name referenced from config into the built-in
/// package-ref pattern. Plugins given as an explicit path or `pkg:` prefix
/// pass through unchanged.
pub fn normalize_package_ref(slot: Slot, name: &str) -> String {
    if name.contains(['/', ':']) {
        name.to_string()
    } else {
        format!("ao-plugin-{}-{}", slot.as_str(), name)
    }
}

/// Holds one registered instance per `(slot, name)`, typed per-slot since
/// each slot's trait has a distinct, non-object-unifiable shape.
#[derive(Default)]
pub struct PluginRegistry {
    manifests: Vec<PluginManifest>,
    runtimes: HashMap<String, Arc<dyn RuntimeAdapter>>,
    agents: HashMap<String, Arc<dyn AgentAdapter>>,
    workspaces: HashMap<String, Arc<dyn WorkspaceAdapter>>,
    trackers: HashMap<String, Arc<dyn TrackerAdapter>>,
    scms: HashMap<String, Arc<dyn ScmAdapter>>,
    notifiers: HashMap<String, Arc<dyn NotifyAdapter>>,
    terminals: HashMap<String, Arc<dyn TerminalAdapter>>,
}

macro_rules! slot_accessors {
    ($register:ident, $get:ident, $map:ident, $trait:ident, $slot:expr) => {
        pub fn $register(
            &mut self,
            name: impl Into<String>,
            description: impl Into<String>,
            instance: Arc<dyn $trait>,
        ) {
            let name = name.into();
            self.manifests.push(PluginManifest {
                slot: $slot,
                name: name.clone(),
                version: "0.1.0".to_string(),
                description: description.into(),
            });
            self.$map.insert(name, instance);
        }

        pub fn $get(&self, name: &str) -> Option<Arc<dyn $trait>> {
            self.$map.get(name).cloned()
        }
    };
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    slot_accessors!(register_runtime, runtime, runtimes, RuntimeAdapter, Slot::Runtime);
    slot_accessors!(register_agent, agent, agents, AgentAdapter, Slot::Agent);
    slot_accessors!(register_workspace, workspace, workspaces, WorkspaceAdapter, Slot::Workspace);
    slot_accessors!(register_tracker, tracker, trackers, TrackerAdapter, Slot::Tracker);
    slot_accessors!(register_scm, scm, scms, ScmAdapter, Slot::Scm);
    slot_accessors!(register_notifier, notifier, notifiers, NotifyAdapter, Slot::Notifier);
    slot_accessors!(register_terminal, terminal, terminals, TerminalAdapter, Slot::Terminal);

    /// All manifests for a slot, in registration order.
    pub fn list(&self, slot: Slot) -> Vec<&PluginManifest> {
        self.manifests.iter().filter(|m| m.slot == slot).collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
