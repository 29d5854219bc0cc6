// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wiring of the in-process engine for one CLI invocation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use dock_adapters::{GitCli, NodeModules, TerminalOAuth, TracedModules, TracedOAuth, TracedVcs};
use dock_core::ReadinessGate;
use dock_engine::{Config, CredentialBroker, Project, ProjectCollection, ProjectDeps};
use dock_storage::Store;

use crate::provision;

pub type Vcs = TracedVcs<GitCli>;
pub type Modules = TracedModules<NodeModules>;
pub type CliProject = Project<Vcs, Modules>;

pub struct App {
    pub config: Config,
    pub collection: ProjectCollection<Vcs, Modules>,
}

impl App {
    /// Restore the project list and attach the credential broker. Must run
    /// inside a Tokio runtime.
    pub fn open(config: Config) -> Result<App> {
        let store = Store::open(&config.store_path)
            .with_context(|| format!("cannot open {}", config.store_path.display()))?;
        let gate = ReadinessGate::new();
        let deps = ProjectDeps {
            vcs: TracedVcs::new(GitCli::new()),
            modules: TracedModules::new(NodeModules::new()),
            gate: gate.clone(),
            settings: config.modules_settings(),
            projects_dir: config.projects_dir.clone(),
            auto_start: config.auto_start,
        };
        let collection = ProjectCollection::from_store(store, deps);
        gate.follow(collection.channel().down.subscribe());
        CredentialBroker::new(TracedOAuth::new(TerminalOAuth::new()), config.oauth.clone())
            .attach(&collection);
        Ok(App { config, collection })
    }

    /// Check `bins` and let deferred work through.
    pub fn provision(&self, bins: &[PathBuf]) -> Result<()> {
        provision::provision(&self.collection.channel().down, bins).map_err(anyhow::Error::msg)
    }

    pub fn project(&self, id: &str) -> Result<CliProject> {
        Ok(self.collection.get(id)?)
    }
}

/// Log to `<state_dir>/dock.log`, filtered by `RUST_LOG` (default `info`).
pub fn setup_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = config.log_path.parent().context("log path has no parent directory")?;
    std::fs::create_dir_all(dir)?;
    let file = config.log_path.file_name().context("log path has no file name")?;

    let file_appender = tracing_appender::rolling::never(dir, file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(guard)
}
