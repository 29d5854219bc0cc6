// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod lifecycle;
pub mod project;

use anyhow::{bail, Result};
use dock_core::message::{
    ModulesBuildErrorNotification, ModulesInstallErrorNotification, ModulesStartErrorNotification,
    VcsErrorNotification,
};
use dock_core::{dispatch, Message, Subscription};

use crate::app::CliProject;
use crate::output::{self, OutputFormat};

/// What a command makes of one message while following a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    Done,
    Failed(String),
}

/// The error an error-kind notification carries.
pub fn failure(message: &Message) -> Option<String> {
    let mut error = None;
    dispatch(message)
        .on::<VcsErrorNotification>(|e| error = Some(e.error.clone()))
        .on::<ModulesInstallErrorNotification>(|e| error = Some(e.error.clone()))
        .on::<ModulesBuildErrorNotification>(|e| error = Some(e.error.clone()))
        .on::<ModulesStartErrorNotification>(|e| error = Some(e.error.clone()));
    error
}

/// [`Step::Failed`] for error notifications, else [`Step::Continue`].
pub fn continue_unless_failed(message: &Message) -> Step {
    failure(message).map_or(Step::Continue, Step::Failed)
}

/// Print what `project` reports on `up` until `step` settles the outcome.
pub async fn follow(
    project: &CliProject,
    up: &mut Subscription,
    format: OutputFormat,
    mut step: impl FnMut(&Message) -> Step,
) -> Result<()> {
    let label = project.label();
    while let Some(message) = up.recv().await {
        output::print_event(format, &label, &message);
        match step(&message) {
            Step::Continue => {}
            Step::Done => return Ok(()),
            Step::Failed(error) => bail!("{label}: {error}"),
        }
    }
    bail!("{label}: project went away")
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
