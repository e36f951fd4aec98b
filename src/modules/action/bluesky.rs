use reqwest::Client;
use anyhow::{Result, Context, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use tracing::{info, error};

use super::post::{PostRef, PostRequest, POST_COLLECTION};

/// 登录后的会话 (createSession)
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub did: String,
    pub handle: String,
    pub access_jwt: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Creates posts on the social network.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn authenticate(&self, identifier: &str, password: &str) -> Result<Session>;

    async fn publish(&self, session: &Session, request: &PostRequest) -> Result<PostRef>;
}

pub struct BlueskyPublisher {
    client: Client,
    service: String,
}

impl BlueskyPublisher {
    pub fn new(client: Client, service: impl Into<String>) -> Self {
        Self { client, service: service.into() }
    }

    fn xrpc_url(&self, method: &str) -> String {
        format!("{}/xrpc/{}", self.service.trim_end_matches('/'), method)
    }
}

#[async_trait]
impl Publisher for BlueskyPublisher {
    async fn authenticate(&self, identifier: &str, password: &str) -> Result<Session> {
        let url = self.xrpc_url("com.atproto.server.createSession");
        let resp = self.client.post(&url)
            .json(&json!({ "identifier": identifier, "password": password }))
            .send()
            .await
            .context("Bluesky login request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Bluesky login failed ({}): {}", status, err));
        }

        let session: Session = resp.json().await.context("Malformed createSession response")?;
        info!("🔑 Logged in to Bluesky as {} ({})", session.handle, session.did);
        Ok(session)
    }

    async fn publish(&self, session: &Session, request: &PostRequest) -> Result<PostRef> {
        let url = self.xrpc_url("com.atproto.repo.createRecord");
        let body = json!({
            "repo": session.did,
            "collection": POST_COLLECTION,
            "record": request.to_record(Utc::now()),
        });

        let resp = self.client.post(&url)
            .bearer_auth(&session.access_jwt)
            .json(&body)
            .send()
            .await
            .context("Bluesky createRecord request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            error!("❌ Error posting to Bluesky ({}): {}", status, err);
            return Err(anyhow!("Bluesky createRecord returned {}: {}", status, err));
        }

        let post: PostRef = resp.json().await.context("Malformed createRecord response")?;
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_parses_and_hides_token() {
        let session: Session = serde_json::from_value(json!({
            "did": "did:plc:crier",
            "handle": "crier.bsky.social",
            "accessJwt": "secret-token",
            "refreshJwt": "other-secret",
        })).unwrap();
        assert_eq!(session.did, "did:plc:crier");
        assert_eq!(session.access_jwt, "secret-token");
        assert!(!format!("{:?}", session).contains("secret-token"));
    }

    #[test]
    fn xrpc_urls_ignore_trailing_slash() {
        let publisher = BlueskyPublisher::new(Client::new(), "https://bsky.social/");
        assert_eq!(
            publisher.xrpc_url("com.atproto.repo.createRecord"),
            "https://bsky.social/xrpc/com.atproto.repo.createRecord"
        );
    }
}
