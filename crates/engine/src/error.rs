// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use dock_storage::StoreError;
use thiserror::Error;

/// Errors from loading `config.toml` and resolving state paths
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot resolve a state directory: set DOCK_STATE_DIR or HOME")]
    NoStateDir,
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors surfaced by the project collection to its caller
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("project not found: {0}")]
    ProjectNotFound(String),
    #[error("ambiguous project id {prefix}: matches {count} projects")]
    AmbiguousProject { prefix: String, count: usize },
    #[error("a project for {0} already exists")]
    DuplicateUrl(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
