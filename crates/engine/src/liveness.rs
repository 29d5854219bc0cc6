// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat bookkeeping for the application server

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    /// More heartbeats than the budget allows went unanswered.
    Lost { missed: u32 },
}

/// Counts heartbeats sent since the last acknowledgement.
///
/// The monitor is armed by the first acknowledgement: a server that never
/// answers heartbeats at all is not judged by them.
#[derive(Debug, Clone)]
pub struct LivenessMonitor {
    interval: Duration,
    max_missed: u32,
    armed: bool,
    missed: u32,
}

impl LivenessMonitor {
    pub fn new(interval: Duration, max_missed: u32) -> Self {
        LivenessMonitor { interval, max_missed, armed: false, missed: 0 }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn ack(&mut self) {
        self.armed = true;
        self.missed = 0;
    }

    /// Record that a heartbeat was sent.
    pub fn beat(&mut self) -> Liveness {
        if !self.armed {
            return Liveness::Alive;
        }
        self.missed = self.missed.saturating_add(1);
        if self.missed > self.max_missed {
            Liveness::Lost { missed: self.missed }
        } else {
            Liveness::Alive
        }
    }
}

#[cfg(test)]
#[path = "liveness_tests.rs"]
mod tests;
