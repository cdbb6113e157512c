// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Paths Resolver: a pure function mapping `(configPath, projectPath)` to
//! the directories the rest of the system reads and writes. The hash
//! decouples the on-disk layout from human-friendly project names and
//! prevents collisions when two configs reference the same repo.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub project_base_dir: PathBuf,
    pub sessions_dir: PathBuf,
    pub worktree_dir: PathBuf,
}

/// Resolve the deterministic directory layout for a `(config_path,
/// project_path)` pair. No I/O beyond what the caller does with the result;
/// this function does not create any directories.
pub fn resolve_paths(config_dir: &Path, config_path: &Path, project_path: &Path) -> ProjectPaths {
    let hash = stable_hash(config_path, project_path);
    let project_base_dir = config_dir.join(".ao").join("projects").join(hash);
    let sessions_dir = project_base_dir.join("sessions");
    let worktree_dir = project_base_dir.join("worktrees");
    ProjectPaths {
        project_base_dir,
        sessions_dir,
        worktree_dir,
    }
}

fn stable_hash(config_path: &Path, project_path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(config_path.to_string_lossy().as_bytes());
    hasher.update([0u8]);
    hasher.update(project_path.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    // First 16 hex chars is plenty of collision resistance for a directory
    // name and keeps paths readable in logs.
    digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
