// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Projects, their subsystems and the orchestration between them

mod collection;
mod config;
mod credentials;
pub mod env;
mod error;
mod host;
mod liveness;
mod modules;
pub mod policy;
mod project;
mod vcs;

#[cfg(test)]
mod test_helpers;

pub use collection::ProjectCollection;
pub use config::Config;
pub use credentials::CredentialBroker;
pub use error::{ConfigError, EngineError};
pub use host::Host;
pub use liveness::{Liveness, LivenessMonitor};
pub use modules::{instance_url, ModuleManager, ModulesSettings};
pub use project::{Project, ProjectDeps};
pub use vcs::{VersionControl, MAX_CLONE_ATTEMPTS};
