// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dock process|analyse|install|build|start`

use anyhow::{bail, Result};
use dock_core::message::{
    ModulesBuildEndNotification, ModulesInstallEndNotification, ModulesInstallStartNotification,
    ModulesStartStartedNotification, ModulesStopEndNotification, ProjectAnalyseRequest,
    ProjectAnalyseResponse, ProjectBuildRequest, ProjectInstallRequest, ProjectOpenNotification,
    ProjectOpenedNotification, ProjectProcessRequest, ProjectStartRequest, ProjectStopRequest,
    VcsCloneEndNotification, VcsFetchEndNotification,
};
use dock_core::{Message, Subscription};
use dock_engine::instance_url;

use super::{continue_unless_failed, follow, Step};
use crate::app::{App, CliProject};
use crate::output::{self, OutputFormat};
use crate::provision;

/// Clone or analyse, then install and build as needed. Keeps serving when
/// the project starts itself.
pub async fn process(app: &App, id: &str, format: OutputFormat) -> Result<()> {
    let project = app.project(id)?;
    app.provision(&provision::required())?;
    let mut up = project.channel().up.subscribe();
    let mut progress = ProcessProgress::new(project.managed(), project.auto_start());
    project.request(Message::fresh(ProjectProcessRequest {}));

    follow(&project, &mut up, format, |message| match progress.observe(message) {
        Reaction::Install => {
            project.request(message.reply(ProjectInstallRequest {}));
            Step::Continue
        }
        Reaction::Step(step) => step,
    })
    .await?;

    match progress.url {
        Some(url) => serve(&project, &mut up, format, &url).await,
        None => {
            report(format, &project, "up to date");
            Ok(())
        }
    }
}

/// What `dock process` does about one message.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Reaction {
    Step(Step),
    /// The checkout is current but its dependencies are missing.
    Install,
}

/// Follows the chain a process request sets off: analyse, then clone or
/// fetch, install, build and maybe start.
#[derive(Debug, Default)]
struct ProcessProgress {
    managed: bool,
    auto_start: bool,
    /// An install is running or chained, so the build is still to come.
    building: bool,
    url: Option<String>,
}

impl ProcessProgress {
    fn new(managed: bool, auto_start: bool) -> Self {
        ProcessProgress { managed, auto_start, ..Default::default() }
    }

    fn observe(&mut self, message: &Message) -> Reaction {
        if message.is::<VcsCloneEndNotification>() || message.is::<ModulesInstallStartNotification>()
        {
            self.building = true;
        }
        if let Some(end) = message.narrow::<VcsFetchEndNotification>() {
            self.building |= !end.synced();
        }
        if let Some(analysis) = message.narrow::<ProjectAnalyseResponse>() {
            if self.building {
                return Reaction::Step(Step::Continue);
            }
            return match (analysis.installed, analysis.synced || !self.managed) {
                (false, true) => {
                    self.building = true;
                    Reaction::Install
                }
                (true, true) => Reaction::Step(Step::Done),
                _ => Reaction::Step(Step::Continue),
            };
        }
        if message.is::<ModulesBuildEndNotification>() && !self.auto_start {
            return Reaction::Step(Step::Done);
        }
        if let Some(started) = message.narrow::<ModulesStartStartedNotification>() {
            self.url = Some(instance_url(&started.instance));
            return Reaction::Step(Step::Done);
        }
        Reaction::Step(continue_unless_failed(message))
    }
}

pub async fn analyse(app: &App, id: &str, format: OutputFormat) -> Result<()> {
    let project = app.project(id)?;
    app.provision(&provision::required())?;
    let mut up = project.channel().up.subscribe();
    project.request(Message::fresh(ProjectAnalyseRequest {}));

    let mut summary = None;
    follow(&project, &mut up, format, |message| match message.narrow::<ProjectAnalyseResponse>() {
        Some(analysis) => {
            summary = Some(analysis.clone());
            Step::Done
        }
        None => continue_unless_failed(message),
    })
    .await?;

    if let (Some(analysis), OutputFormat::Text) = (summary, format) {
        for file in &analysis.diff {
            println!("  {:?}  {}", file.status, file.path);
        }
    }
    Ok(())
}

pub async fn install(app: &App, id: &str, format: OutputFormat) -> Result<()> {
    let project = app.project(id)?;
    app.provision(&provision::required())?;
    let mut up = project.channel().up.subscribe();
    project.request(Message::fresh(ProjectInstallRequest {}));
    follow(&project, &mut up, format, |message| {
        if message.is::<ModulesInstallEndNotification>() {
            Step::Done
        } else {
            continue_unless_failed(message)
        }
    })
    .await
}

pub async fn build(app: &App, id: &str, format: OutputFormat) -> Result<()> {
    let project = app.project(id)?;
    app.provision(&provision::required())?;
    let mut up = project.channel().up.subscribe();
    project.request(Message::fresh(ProjectBuildRequest {}));
    follow(&project, &mut up, format, |message| {
        if message.is::<ModulesBuildEndNotification>() {
            Step::Done
        } else {
            continue_unless_failed(message)
        }
    })
    .await
}

/// Start the server and keep it running until interrupted.
pub async fn start(app: &App, id: &str, open: bool, format: OutputFormat) -> Result<()> {
    let project = app.project(id)?;
    let mut bins = provision::required();
    bins.push(dock_adapters::env::server_bin());
    app.provision(&bins)?;
    let mut up = project.channel().up.subscribe();
    project.request(Message::fresh(ProjectStartRequest { open }));

    let mut url = None;
    follow(&project, &mut up, format, |message| {
        match message.narrow::<ModulesStartStartedNotification>() {
            Some(started) => {
                url = Some(instance_url(&started.instance));
                Step::Done
            }
            None => continue_unless_failed(message),
        }
    })
    .await?;
    let Some(url) = url else {
        bail!("{}: server did not report its port", project.label());
    };
    serve(&project, &mut up, format, &url).await
}

async fn serve(
    project: &CliProject,
    up: &mut Subscription,
    format: OutputFormat,
    url: &str,
) -> Result<()> {
    let label = project.label();
    report(format, project, &format!("serving at {url} (Ctrl-C to stop)"));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            message = up.recv() => {
                let Some(message) = message else {
                    bail!("{label}: project went away");
                };
                output::print_event(format, &label, &message);
                if let Some(open) = message.narrow::<ProjectOpenNotification>() {
                    report(format, project, &format!("open {url}"));
                    project
                        .channel()
                        .up
                        .next(message.reply(ProjectOpenedNotification { id: open.id.clone() }));
                }
                if let Step::Failed(error) = continue_unless_failed(&message) {
                    bail!("{label}: {error}");
                }
            }
        }
    }

    project.request(Message::fresh(ProjectStopRequest {}));
    follow(project, up, format, |message| {
        if message.is::<ModulesStopEndNotification>() {
            Step::Done
        } else {
            Step::Continue
        }
    })
    .await
}

fn report(format: OutputFormat, project: &CliProject, text: &str) {
    match format {
        OutputFormat::Text => println!("{}: {text}", project.label()),
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "project": project.label(), "status": text }))
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
