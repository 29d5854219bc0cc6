// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Answers credential challenges raised by clones over https.

use dock_adapters::{ModulesAdapter, OAuthClient, OAuthProvider, OAuthRequest, VcsClient};
use dock_core::message::{VcsCredentialAnswer, VcsCredentialChallenge};
use dock_core::{git_url, Message};
use rand::distr::Alphanumeric;
use rand::Rng;
use tokio::task::JoinHandle;

use crate::collection::ProjectCollection;

const STATE_LEN: usize = 32;

#[derive(Clone)]
pub struct CredentialBroker<O> {
    provider: O,
    clients: Vec<OAuthClient>,
}

impl<O: OAuthProvider> CredentialBroker<O> {
    pub fn new(provider: O, clients: Vec<OAuthClient>) -> Self {
        CredentialBroker { provider, clients }
    }

    /// Follow `collection`'s `up` and answer every challenge on it.
    pub fn attach<V: VcsClient, M: ModulesAdapter>(
        &self,
        collection: &ProjectCollection<V, M>,
    ) -> JoinHandle<()> {
        let mut observed = collection.channel().up.subscribe();
        let broker = self.clone();
        let collection = collection.clone();
        tokio::spawn(async move {
            while let Some(message) = observed.recv().await {
                if !message.is::<VcsCredentialChallenge>() {
                    continue;
                }
                let broker = broker.clone();
                let collection = collection.clone();
                tokio::spawn(async move {
                    if let Some(answer) = broker.resolve(&message).await {
                        collection.broadcast(&answer);
                    }
                });
            }
        })
    }

    /// Run the authorization flow for one challenge. `None` when there is
    /// nothing trustworthy to answer with.
    pub async fn resolve(&self, challenge: &Message) -> Option<Message> {
        let url = &challenge.narrow::<VcsCredentialChallenge>()?.url;
        let Some(host) = git_url::host(url) else {
            tracing::warn!(url = %git_url::redact(url), "challenge for a url without a host");
            return None;
        };
        let Some(client) = self.client(&host) else {
            tracing::warn!(%host, "no OAuth client configured");
            return None;
        };

        let state = random_state();
        let request = OAuthRequest::new(client.clone(), state.clone());
        let answer = match self.provider.authorize(&request).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(%host, error = %e, "authorization failed");
                return None;
            }
        };
        if answer.state != state {
            tracing::warn!(%host, "authorization state mismatch, dropping token");
            return None;
        }
        tracing::info!(%host, "credentials obtained");
        Some(Message::new(
            challenge.tid.clone(),
            VcsCredentialAnswer { host, token: answer.access_token },
        ))
    }

    fn client(&self, host: &str) -> Option<&OAuthClient> {
        self.clients.iter().find(|c| c.hostname.eq_ignore_ascii_case(host))
    }
}

fn random_state() -> String {
    rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
