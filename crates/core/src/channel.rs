// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Paired up/down broadcast streams owned by every stateful entity

use std::fmt;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::message::Message;

pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Observations leaving the entity.
    Up,
    /// Requests addressed to the entity.
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// One direction of a [`Channel`]. Cloning shares the stream.
#[derive(Clone)]
pub struct Stream {
    direction: Direction,
    tx: broadcast::Sender<Message>,
}

impl Stream {
    fn new(direction: Direction, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Stream { direction, tx }
    }

    /// Publish to every current subscriber, in order. Never waits; a
    /// stream nobody listens to drops the message.
    pub fn next(&self, message: impl Into<Message>) {
        let message = message.into();
        tracing::trace!(direction = %self.direction, message = %message.log_summary(), "publish");
        let _ = self.tx.send(message);
    }

    /// Messages published from now on. Nothing is replayed.
    pub fn subscribe(&self) -> Subscription {
        Subscription { direction: self.direction, rx: self.tx.subscribe() }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("direction", &self.direction)
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}

pub struct Subscription {
    direction: Direction,
    rx: broadcast::Receiver<Message>,
}

impl Subscription {
    /// Next message, or `None` once every publisher is gone.
    /// A subscriber that falls behind skips the overwritten messages.
    pub async fn recv(&mut self) -> Option<Message> {
        loop {
            match self.rx.recv().await {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(direction = %self.direction, skipped, "subscriber lagged, messages dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv); `None` when nothing is queued.
    pub fn try_recv(&mut self) -> Option<Message> {
        loop {
            match self.rx.try_recv() {
                Ok(message) => return Some(message),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(direction = %self.direction, skipped, "subscriber lagged, messages dropped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

/// `up` carries observations out of an entity, `down` carries requests in.
/// A channel never filters; subscribers narrow with [`dispatch`](crate::message::dispatch).
#[derive(Clone, Debug)]
pub struct Channel {
    pub up: Stream,
    pub down: Stream,
}

impl Channel {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Channel {
            up: Stream::new(Direction::Up, capacity),
            down: Stream::new(Direction::Down, capacity),
        }
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
