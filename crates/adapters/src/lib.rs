// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O

pub mod env;
pub mod modules;
pub mod oauth;
pub mod subprocess;
pub mod traced;
pub mod vcs;

pub use modules::{
    ChildControl, ChildController, ChildEvent, ChildHandle, ChildRemote, Installer, Manifest,
    ModulesAdapter, ModulesError, NodeModules,
};
pub use oauth::{OAuthAnswer, OAuthClient, OAuthError, OAuthProvider, OAuthRequest, TerminalOAuth};
pub use traced::{TracedModules, TracedOAuth, TracedVcs};
pub use vcs::{GitCli, ProgressTx, VcsClient, VcsError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use modules::{FakeModules, ModulesCall, ServerBehaviour};
#[cfg(any(test, feature = "test-support"))]
pub use oauth::{FakeOAuth, OAuthCall};
#[cfg(any(test, feature = "test-support"))]
pub use vcs::{FakeVcs, VcsCall};
