// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::IsTerminal;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{OAuthAnswer, OAuthError, OAuthProvider, OAuthRequest};
use crate::env;

/// Authorizes through the controlling terminal.
///
/// A token in `DOCK_OAUTH_TOKEN` is used without prompting. Otherwise the
/// authorize link is printed and the token is read from stdin, which must
/// be a terminal.
#[derive(Debug, Clone, Default)]
pub struct TerminalOAuth;

impl TerminalOAuth {
    pub fn new() -> Self {
        TerminalOAuth
    }
}

#[async_trait]
impl OAuthProvider for TerminalOAuth {
    async fn authorize(&self, request: &OAuthRequest) -> Result<OAuthAnswer, OAuthError> {
        if let Some(access_token) = env::oauth_token() {
            return Ok(OAuthAnswer { access_token, state: request.state.clone() });
        }
        if !std::io::stdin().is_terminal() {
            return Err(OAuthError::NonInteractive);
        }

        eprintln!("Authorize access to {}:", request.client.hostname);
        eprintln!("  {}", request.authorize_link());
        eprint!("Paste the access token: ");

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| OAuthError::Io(e.to_string()))?;
        let access_token = line.trim().to_string();
        if access_token.is_empty() {
            return Err(OAuthError::Denied);
        }
        Ok(OAuthAnswer { access_token, state: request.state.clone() })
    }
}
