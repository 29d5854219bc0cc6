// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dock add|open|list|remove|input`

use std::path::Path;

use anyhow::{Context, Result};
use dock_core::message::{ProjectReadResponse, ProjectRemoveRequest, VcsRemoveResponse};
use dock_core::Message;
use dock_storage::ProjectRecord;

use super::{continue_unless_failed, follow, Step};
use crate::app::{App, CliProject};
use crate::output::{self, OutputFormat};

pub fn add(app: &App, url: &str, auto_start: bool, format: OutputFormat) -> Result<()> {
    let project = app.collection.add_by_url(url, auto_start || app.config.auto_start)?;
    app.collection.set_input(url)?;
    print_record(format, "Added", &project);
    Ok(())
}

/// Reference an existing directory. Its name and remote are read from
/// the working copy before returning.
pub async fn open(app: &App, path: &Path, format: OutputFormat) -> Result<()> {
    let path = std::fs::canonicalize(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let mut observed = app.collection.channel().up.subscribe();
    let project = app.collection.add_from_path(&path)?;

    let read = tokio::time::timeout(crate::env::read_timeout(), async {
        while let Some(message) = observed.recv().await {
            if message.is::<ProjectReadResponse>() {
                return true;
            }
        }
        false
    })
    .await;
    if !matches!(read, Ok(true)) {
        tracing::warn!(project = %project.id(), "remote not read in time");
    }
    app.collection.persist()?;
    print_record(format, "Opened", &project);
    Ok(())
}

pub fn list(app: &App, format: OutputFormat) -> Result<()> {
    let records: Vec<ProjectRecord> = app.collection.items().iter().map(|p| p.record()).collect();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No projects");
                return Ok(());
            }
            output::project_table(&records).render(&mut std::io::stdout());
        }
    }
    Ok(())
}

/// Stop the project, delete a managed checkout and forget the project.
pub async fn remove(app: &App, id: &str, format: OutputFormat) -> Result<()> {
    let project = app.project(id)?;
    app.provision(&[dock_adapters::env::git_bin()])?;
    let mut up = project.channel().up.subscribe();
    project.request(Message::fresh(ProjectRemoveRequest {}));
    follow(&project, &mut up, format, |message| {
        if message.is::<VcsRemoveResponse>() {
            Step::Done
        } else {
            continue_unless_failed(message)
        }
    })
    .await?;

    app.collection.forget(&project.id());
    app.collection.persist()?;
    print_record(format, "Removed", &project);
    Ok(())
}

/// Show the last entered url, or replace it.
pub fn input(app: &App, url: Option<&str>) -> Result<()> {
    match url {
        Some(url) => app.collection.set_input(url)?,
        None => {
            let input = app.collection.input();
            if !input.is_empty() {
                println!("{input}");
            }
        }
    }
    Ok(())
}

fn print_record(format: OutputFormat, verb: &str, project: &CliProject) {
    match format {
        OutputFormat::Text => {
            println!("{verb} {} ({})", project.label(), project.id().short(8))
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&project.record()) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "cannot encode project"),
        },
    }
}
