// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects the orchestration policy asks a project to carry out

use serde::{Deserialize, Serialize};

use crate::git_url;
use crate::message::{Body, Message};

/// Side effects produced by a lifecycle transition, executed in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Publish on the project's `down` stream (a request to itself).
    Request { message: Message },

    /// Publish on the project's `up` stream (an observation).
    Notify { message: Message },

    SetName { name: String },

    SetUrl { url: String },

    SetConfig { config: serde_json::Value },
}

impl Effect {
    /// A request in the transaction of `cause`.
    pub fn request(cause: &Message, body: impl Into<Body>) -> Self {
        Effect::Request { message: cause.reply(body) }
    }

    /// A notification in the transaction of `cause`.
    pub fn notify(cause: &Message, body: impl Into<Body>) -> Self {
        Effect::Notify { message: cause.reply(body) }
    }

    pub fn message(&self) -> Option<&Message> {
        match self {
            Effect::Request { message } | Effect::Notify { message } => Some(message),
            _ => None,
        }
    }
}

impl crate::traced::TracedEffect for Effect {
    fn name(&self) -> &'static str {
        match self {
            Effect::Request { .. } => "request",
            Effect::Notify { .. } => "notify",
            Effect::SetName { .. } => "set_name",
            Effect::SetUrl { .. } => "set_url",
            Effect::SetConfig { .. } => "set_config",
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Request { message } | Effect::Notify { message } => {
                vec![("message", message.log_summary())]
            }
            Effect::SetName { name } => vec![("name", name.clone())],
            Effect::SetUrl { url } => vec![("url", git_url::redact(url))],
            Effect::SetConfig { config } => {
                let keys = config
                    .as_object()
                    .map(|o| o.keys().cloned().collect::<Vec<_>>().join(","))
                    .unwrap_or_default();
                vec![("keys", keys)]
            }
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
