// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed messages, their wire form and family membership

#[macro_use]
mod declare;
mod catalog;
mod matching;
mod summary;

pub use catalog::*;
pub use matching::{dispatch, Match, Matches};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Transaction id shared by a request and everything it causes.
    pub struct Tid;
}

/// A message on a [`Channel`](crate::channel::Channel).
///
/// On the wire the body's fields sit next to `tid` and `type`:
/// `{"tid":"…","type":"vcs:clone-end","url":"…","path":"…"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub tid: Tid,
    #[serde(flatten)]
    pub body: Body,
}

impl Message {
    pub fn new(tid: impl Into<Tid>, body: impl Into<Body>) -> Self {
        Message { tid: tid.into(), body: body.into() }
    }

    /// A message opening a new transaction.
    pub fn fresh(body: impl Into<Body>) -> Self {
        Message { tid: Tid::generate(), body: body.into() }
    }

    /// A message in the same transaction as `self`.
    pub fn reply(&self, body: impl Into<Body>) -> Self {
        Message { tid: self.tid.clone(), body: body.into() }
    }

    pub fn name(&self) -> &'static str {
        self.body.name()
    }

    pub fn family(&self) -> Family {
        self.body.family()
    }

    pub fn is<M: Matches>(&self) -> bool {
        M::is(self)
    }

    pub fn narrow<M: Matches>(&self) -> Option<&M::Target> {
        M::narrow(self)
    }
}

impl Default for Message {
    fn default() -> Self {
        Message::new(Tid::default(), AppModulesUnpackStarted {})
    }
}

/// A running project server as announced by the child process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartedInstance {
    pub port: u16,
    pub cwd: PathBuf,
    /// Whether the start was requested with auto-open.
    #[serde(default)]
    pub open: bool,
}

/// Object transfer counters reported while cloning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferProgress {
    pub received_objects: u64,
    pub total_objects: u64,
}

impl TransferProgress {
    pub fn percent(&self) -> u8 {
        if self.total_objects == 0 {
            return 0;
        }
        let pct = self.received_objects.saturating_mul(100) / self.total_objects;
        pct.min(100) as u8
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
