// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth authorization for hosted git remotes

mod terminal;

pub use terminal::TerminalOAuth;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeOAuth, OAuthCall};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from OAuth providers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OAuthError {
    #[error("no OAuth client configured for {0}")]
    UnknownHost(String),
    #[error("authorization needs an interactive terminal")]
    NonInteractive,
    #[error("authorization denied")]
    Denied,
    #[error("{0}")]
    Io(String),
}

/// One row of the static per-host client table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthClient {
    pub hostname: String,
    pub client_id: String,
    pub authorize_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthRequest {
    pub client: OAuthClient,
    /// Opaque value the answer must echo back.
    pub state: String,
}

impl OAuthRequest {
    pub fn new(client: OAuthClient, state: impl Into<String>) -> Self {
        OAuthRequest { client, state: state.into() }
    }

    /// Link the user follows to grant access.
    pub fn authorize_link(&self) -> String {
        let sep = if self.client.authorize_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{sep}client_id={}&state={}&scope=repo",
            self.client.authorize_url, self.client.client_id, self.state
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthAnswer {
    pub access_token: String,
    pub state: String,
}

/// Adapter for interactive OAuth flows
#[async_trait]
pub trait OAuthProvider: Clone + Send + Sync + 'static {
    async fn authorize(&self, request: &OAuthRequest) -> Result<OAuthAnswer, OAuthError>;
}

#[cfg(test)]
#[path = "oauth_tests.rs"]
mod tests;
