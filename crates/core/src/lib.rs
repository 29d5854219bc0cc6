// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dock-core: messages, channels and lifecycle state for the dock orchestrator

pub mod channel;
pub mod codec;
pub mod correlation;
pub mod diff;
pub mod effect;
pub mod gate;
pub mod git_url;
pub mod id;
pub mod message;
pub mod modules;
pub mod project;
pub mod traced;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use channel::{Channel, Direction, Stream, Subscription};
pub use codec::{CodecError, Envelope};
pub use correlation::Correlator;
pub use diff::{DiffFile, DiffStatus};
pub use effect::Effect;
pub use gate::ReadinessGate;
pub use git_url::GitUrl;
pub use message::{dispatch, Body, Family, Matches, Message, StartedInstance, Tid, TransferProgress};
pub use modules::ModulesState;
pub use project::{ProjectId, ProjectState};
pub use traced::TracedEffect;
