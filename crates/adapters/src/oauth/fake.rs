// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake OAuth provider for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{OAuthAnswer, OAuthError, OAuthProvider, OAuthRequest};

/// Recorded authorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCall {
    pub hostname: String,
    pub state: String,
}

#[derive(Default)]
struct FakeOAuthState {
    calls: Vec<OAuthCall>,
    results: VecDeque<Result<OAuthAnswer, OAuthError>>,
    token: String,
}

/// Echoes the request state with a fixed token unless a result was queued.
#[derive(Clone)]
pub struct FakeOAuth {
    inner: Arc<Mutex<FakeOAuthState>>,
}

impl Default for FakeOAuth {
    fn default() -> Self {
        Self::with_token("fake-token")
    }
}

impl FakeOAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        FakeOAuth {
            inner: Arc::new(Mutex::new(FakeOAuthState {
                token: token.to_string(),
                ..FakeOAuthState::default()
            })),
        }
    }

    pub fn calls(&self) -> Vec<OAuthCall> {
        self.inner.lock().calls.clone()
    }

    pub fn push_result(&self, result: Result<OAuthAnswer, OAuthError>) {
        self.inner.lock().results.push_back(result);
    }
}

#[async_trait]
impl OAuthProvider for FakeOAuth {
    async fn authorize(&self, request: &OAuthRequest) -> Result<OAuthAnswer, OAuthError> {
        let mut state = self.inner.lock();
        state.calls.push(OAuthCall {
            hostname: request.client.hostname.clone(),
            state: request.state.clone(),
        });
        match state.results.pop_front() {
            Some(result) => result,
            None => {
                Ok(OAuthAnswer { access_token: state.token.clone(), state: request.state.clone() })
            }
        }
    }
}
