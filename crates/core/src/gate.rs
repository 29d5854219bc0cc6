// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-way readiness latch for the provisioned runtime

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::channel::Subscription;
use crate::message::{dispatch, AppModulesUnpackError, AppModulesUnpackReady};

/// Starts closed and, once opened, stays open. Clones share the latch.
#[derive(Clone, Debug)]
pub struct ReadinessGate {
    tx: Arc<watch::Sender<bool>>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        ReadinessGate { tx: Arc::new(tx) }
    }

    /// A gate that is already open, for hosts that need no provisioning.
    pub fn opened_now() -> Self {
        let gate = Self::new();
        gate.open();
        gate
    }

    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn open(&self) {
        let was_open = self.tx.send_replace(true);
        if !was_open {
            tracing::info!("readiness gate opened");
        }
    }

    /// Resolves once the gate is open; immediately if it already is.
    pub async fn opened(&self) {
        let mut rx = self.tx.subscribe();
        // the sender lives in self, so the wait cannot fail
        let _ = rx.wait_for(|open| *open).await;
    }

    /// Open the gate when the unpack collaborator reports ready.
    /// Start and error signals leave it as it is.
    pub fn follow(&self, mut subscription: Subscription) -> JoinHandle<()> {
        let gate = self.clone();
        tokio::spawn(async move {
            while let Some(message) = subscription.recv().await {
                dispatch(&message)
                    .on::<AppModulesUnpackReady>(|_| gate.open())
                    .on::<AppModulesUnpackError>(|e| {
                        tracing::warn!(error = %e.error, "runtime unpack failed, gate stays closed")
                    });
                if gate.is_open() {
                    break;
                }
            }
        })
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
