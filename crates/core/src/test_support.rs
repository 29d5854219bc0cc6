// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use std::time::Duration;

use crate::channel::Subscription;
use crate::diff::{DiffFile, DiffStatus};
use crate::message::{Matches, Message};

// ── Factories ───────────────────────────────────────────────────────────────

pub fn diff_file(path: &str, status: DiffStatus) -> DiffFile {
    DiffFile {
        path: path.to_string(),
        sha: "0000000".to_string(),
        sha1: "1111111".to_string(),
        size: 1,
        status,
        hunks: Vec::new(),
    }
}

// ── Stream observation ──────────────────────────────────────────────────────

/// Wait up to `within` for the next message matching `M`, skipping others.
pub async fn next_matching<M: Matches>(sub: &mut Subscription, within: Duration) -> Option<Message> {
    tokio::time::timeout(within, async {
        while let Some(message) = sub.recv().await {
            if M::is(&message) {
                return Some(message);
            }
        }
        None
    })
    .await
    .ok()
    .flatten()
}

/// Everything that arrives within `window`.
pub async fn collect_for(sub: &mut Subscription, window: Duration) -> Vec<Message> {
    let mut seen = Vec::new();
    let deadline = tokio::time::Instant::now() + window;
    while let Ok(Some(message)) = tokio::time::timeout_at(deadline, sub.recv()).await {
        seen.push(message);
    }
    seen
}

/// Wire tags of `messages`, for compact assertions.
pub fn names(messages: &[Message]) -> Vec<&'static str> {
    messages.iter().map(Message::name).collect()
}

pub fn count<M: Matches>(messages: &[Message]) -> usize {
    messages.iter().filter(|m| M::is(m)).count()
}
