// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dock - clone, install, build and serve pattern library projects

mod app;
mod color;
mod commands;
mod env;
mod output;
mod provision;
mod table;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{lifecycle, project};
use dock_engine::Config;
use output::OutputFormat;

use crate::app::App;

#[derive(Parser)]
#[command(name = "dock", version, about = "Clone, install, build and serve pattern library projects")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a project from a git remote
    Add {
        url: String,
        /// Start the server whenever a build finishes
        #[arg(long)]
        auto_start: bool,
    },
    /// Add an existing directory as an unmanaged project
    Open { path: PathBuf },
    /// List projects
    List,
    /// Bring a project up to date: clone or analyse, install, build
    Process { id: String },
    /// Compare a working copy with its upstream
    Analyse { id: String },
    /// Install a project's dependencies
    Install { id: String },
    /// Run a project's build script
    Build { id: String },
    /// Serve a project until interrupted
    Start {
        id: String,
        /// Announce the server url once it is up
        #[arg(long)]
        open: bool,
    },
    /// Stop a project, delete its managed checkout and forget it
    Remove { id: String },
    /// Show or set the last entered url
    Input { url: Option<String> },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", format_error(&e));
        std::process::exit(1);
    }
}

/// Format an anyhow error, skipping causes the top-level message already
/// includes.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err.chain().skip(1).all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }
    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load()?;
    let _guard = app::setup_logging(&config)?;
    tracing::debug!(state_dir = %config.state_dir.display(), "starting");
    let app = App::open(config)?;

    match command {
        Commands::Add { url, auto_start } => project::add(&app, &url, auto_start, format),
        Commands::Open { path } => project::open(&app, &path, format).await,
        Commands::List => project::list(&app, format),
        Commands::Input { url } => project::input(&app, url.as_deref()),
        Commands::Remove { id } => project::remove(&app, &id, format).await,
        Commands::Process { id } => {
            let result = lifecycle::process(&app, &id, format).await;
            app.collection.persist()?;
            result
        }
        Commands::Analyse { id } => lifecycle::analyse(&app, &id, format).await,
        Commands::Install { id } => {
            let result = lifecycle::install(&app, &id, format).await;
            app.collection.persist()?;
            result
        }
        Commands::Build { id } => {
            let result = lifecycle::build(&app, &id, format).await;
            app.collection.persist()?;
            result
        }
        Commands::Start { id, open } => {
            let result = lifecycle::start(&app, &id, open, format).await;
            app.collection.persist()?;
            result
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
