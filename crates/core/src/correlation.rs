// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot reply waiters keyed by transaction id

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::message::{Message, Tid};

/// Pairs a request with exactly one reply.
///
/// A waiter is registered before the request goes out; the first message
/// with the same tid fulfils it and removes it. Cloning shares the map.
#[derive(Clone, Default)]
pub struct Correlator {
    waiters: Arc<Mutex<HashMap<Tid, oneshot::Sender<Message>>>>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a waiter for `tid`, replacing any previous one.
    pub fn register(&self, tid: Tid) -> oneshot::Receiver<Message> {
        let (tx, rx) = oneshot::channel();
        if self.waiters.lock().insert(tid.clone(), tx).is_some() {
            tracing::debug!(tid = %tid, "replaced pending waiter");
        }
        rx
    }

    /// Deliver `message` to the waiter for its tid. Hands the message back
    /// when nobody is waiting (or the waiter has gone away).
    pub fn fulfill(&self, message: Message) -> Result<(), Message> {
        let waiter = self.waiters.lock().remove(&message.tid);
        match waiter {
            Some(tx) => tx.send(message),
            None => Err(message),
        }
    }

    pub fn is_pending(&self, tid: &Tid) -> bool {
        self.waiters.lock().contains_key(tid)
    }

    pub fn cancel(&self, tid: &Tid) -> bool {
        self.waiters.lock().remove(tid).is_some()
    }

    pub fn pending(&self) -> usize {
        self.waiters.lock().len()
    }
}

#[cfg(test)]
#[path = "correlation_tests.rs"]
mod tests;
