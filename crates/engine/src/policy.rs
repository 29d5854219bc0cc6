// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestration policy: what a project does next after observing one of
//! its own notifications.
//!
//! Pure function of the project facts, its current state and the message.
//! The project applies the returned [`Transition`] and publishes its
//! effects one scheduler tick later.

use dock_core::message::{
    ModulesBuildEndNotification, ModulesConfigureRequest, ModulesConfigureResponse,
    ModulesInstallEndNotification, ModulesInstallRequest, ModulesStartStartedNotification,
    ProjectAnalyseResponse, ProjectBuildRequest, ProjectConfigureRequest, ProjectOpenRequest,
    ProjectReadResponse, ProjectStartRequest, VcsAnalyseRequest, VcsAnalyseResponse,
    VcsCloneEndNotification, VcsCloneRequest, VcsFetchEndNotification, VcsFetchRequest,
    VcsReadResponse,
};
use dock_core::{dispatch, Effect, Message, ProjectState};

/// What the policy needs to know about the project beyond its state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Facts {
    pub managed: bool,
    pub auto_start: bool,
    /// Dependencies are present in the working copy.
    pub installed: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    /// `None` keeps the current state.
    pub next: Option<ProjectState>,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: Option<ProjectState>) -> Self {
        Transition { next, effects: Vec::new() }
    }

    /// Messages the effects will publish, in order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.effects.iter().filter_map(Effect::message)
    }
}

pub fn advance(facts: &Facts, state: ProjectState, message: &Message) -> Transition {
    let mut transition = Transition::to(ProjectState::observe(message));
    let m = dispatch(message);

    m.on::<VcsAnalyseResponse>(|r| transition = analysed(facts, state, message, r));
    m.on::<VcsCloneEndNotification>(|_| {
        transition.effects.push(Effect::request(message, ModulesInstallRequest {}));
    });
    m.on::<VcsFetchEndNotification>(|end| {
        transition.effects.push(Effect::request(message, VcsAnalyseRequest {}));
        if !end.synced() {
            transition.effects.push(Effect::request(message, ModulesInstallRequest {}));
        }
    });
    m.on::<ModulesInstallEndNotification>(|_| {
        transition.effects.push(Effect::request(message, ProjectConfigureRequest {}));
        transition.effects.push(Effect::request(message, ProjectBuildRequest {}));
    });
    m.on::<ModulesConfigureResponse>(|r| {
        if let Some(config) = r.payload.get("config").filter(|c| !c.is_null()) {
            transition.effects.push(Effect::SetConfig { config: config.clone() });
        }
    });
    m.on::<ModulesBuildEndNotification>(|_| {
        if facts.auto_start {
            transition.effects.push(Effect::request(message, ProjectStartRequest { open: false }));
        }
    });
    m.on::<ModulesStartStartedNotification>(|started| {
        if started.instance.open {
            transition
                .effects
                .push(Effect::request(message, ProjectOpenRequest { id: started.id.clone() }));
        }
    });
    m.on::<VcsReadResponse>(|read| {
        if let Some(name) = &read.name {
            transition.effects.push(Effect::SetName { name: name.clone() });
        }
        if let Some(url) = &read.url {
            transition.effects.push(Effect::SetUrl { url: url.clone() });
        }
        transition.effects.push(Effect::notify(
            message,
            ProjectReadResponse { name: read.name.clone(), url: read.url.clone() },
        ));
    });
    if state == ProjectState::Removed {
        transition.next = None;
    }
    transition
}

fn analysed(
    facts: &Facts,
    state: ProjectState,
    message: &Message,
    response: &VcsAnalyseResponse,
) -> Transition {
    let synced = response.synced == Some(true);
    let mut transition = Transition::default();

    if facts.managed && !response.exists {
        transition.effects.push(Effect::request(message, VcsCloneRequest {}));
    } else if facts.managed && response.synced == Some(false) {
        transition.effects.push(Effect::request(message, VcsFetchRequest {}));
    }
    if response.exists && facts.installed {
        transition.effects.push(Effect::request(message, ModulesConfigureRequest {}));
    }
    transition.effects.push(Effect::notify(
        message,
        ProjectAnalyseResponse {
            synced,
            installed: facts.installed,
            diff: response.diff.clone(),
        },
    ));

    transition.next = if !facts.managed {
        Some(ProjectState::Built)
    } else if facts.installed && response.exists && response.diff.is_empty() {
        Some(ProjectState::Built)
    } else if facts.installed && response.exists {
        Some(ProjectState::Installed)
    } else if synced {
        Some(ProjectState::Fetched)
    } else {
        None
    };
    // never move a running project backwards on a routine analyse
    if state.is_started() && transition.next.is_some_and(|next| !next.reached(state)) {
        transition.next = None;
    }
    transition
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
