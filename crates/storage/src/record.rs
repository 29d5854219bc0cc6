// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use dock_core::{ProjectId, ProjectState};
use serde::{Deserialize, Serialize};

fn managed_default() -> bool {
    true
}

/// What survives a restart of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "managed_default")]
    pub managed: bool,
    #[serde(default)]
    pub auto_start: bool,
    /// Last observed state, echoed back for display only.
    #[serde(default)]
    pub state: ProjectState,
}

impl ProjectRecord {
    pub fn new(id: ProjectId) -> Self {
        ProjectRecord {
            id,
            url: None,
            name: None,
            path: None,
            managed: true,
            auto_start: false,
            state: ProjectState::Unknown,
        }
    }
}
