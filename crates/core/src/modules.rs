// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle of a project's package installation, build and server

use serde::{Deserialize, Serialize};

use crate::message::{dispatch, Message};
use crate::message::{
    ModulesBuildEndNotification, ModulesBuildErrorNotification, ModulesBuildRequest,
    ModulesBuildStartNotification, ModulesInstallEndNotification,
    ModulesInstallErrorNotification, ModulesInstallRequest, ModulesInstallStartNotification,
    ModulesStartErrorNotification, ModulesStartRequest, ModulesStartStartNotification,
    ModulesStartStartedNotification, ModulesStopEndNotification, ModulesStopNotification,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModulesState {
    #[default]
    Idle,
    Installing,
    Installed,
    Building,
    Built,
    Starting,
    Started,
    Stopping,
    Stopped,
    Errored,
}

impl ModulesState {
    /// Apply one message seen by a module manager.
    ///
    /// `Errored` absorbs every notification; only a fresh request leaves it.
    /// A start request on a stopped manager returns it to `Idle`.
    pub fn advance(self, message: &Message) -> ModulesState {
        let mut next = self;
        let m = dispatch(message);

        let retry = message.is::<ModulesInstallRequest>()
            || message.is::<ModulesBuildRequest>()
            || message.is::<ModulesStartRequest>();
        if retry {
            if matches!(self, ModulesState::Errored | ModulesState::Stopped) {
                return ModulesState::Idle;
            }
            return self;
        }
        if self == ModulesState::Errored {
            return self;
        }

        m.on::<ModulesInstallStartNotification>(|_| next = ModulesState::Installing);
        m.on::<ModulesInstallEndNotification>(|_| next = ModulesState::Installed);
        m.on::<ModulesBuildStartNotification>(|_| next = ModulesState::Building);
        m.on::<ModulesBuildEndNotification>(|_| next = ModulesState::Built);
        m.on::<ModulesStartStartNotification>(|_| next = ModulesState::Starting);
        m.on::<ModulesStartStartedNotification>(|_| next = ModulesState::Started);
        m.on::<ModulesStopNotification>(|_| next = ModulesState::Stopping);
        m.on::<ModulesStopEndNotification>(|_| next = ModulesState::Stopped);
        m.on::<ModulesInstallErrorNotification>(|_| next = ModulesState::Errored);
        m.on::<ModulesBuildErrorNotification>(|_| next = ModulesState::Errored);
        m.on::<ModulesStartErrorNotification>(|_| next = ModulesState::Errored);
        next
    }

    pub fn is_running(self) -> bool {
        matches!(self, ModulesState::Starting | ModulesState::Started)
    }

    pub fn is_busy(self) -> bool {
        matches!(
            self,
            ModulesState::Installing
                | ModulesState::Building
                | ModulesState::Starting
                | ModulesState::Stopping
        )
    }
}

#[cfg(test)]
#[path = "modules_tests.rs"]
mod tests;
