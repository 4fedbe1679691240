use anyhow::{Context, Result};
use async_trait::async_trait;
use domain::{ActionKind, ItemId, ItemKind, QueueItem};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

use crate::error::ActionError;
use crate::traits::{ItemMutator, ItemResolver, QueueSource};

const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the moderation platform gateway, e.g. `https://gateway.example/v1`.
    pub base_url: String,
    pub token: String,
    pub subreddit: String,
}

/// HTTP client for the moderation platform gateway.
#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .user_agent(concat!("modnuke/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build gateway HTTP client")?;
        Ok(Self { http, config })
    }

    pub fn subreddit(&self) -> &str {
        &self.config.subreddit
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.config.token)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        let resp = self
            .authed(self.http.get(&url))
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("GET {} returned an error status", url))?;
        resp.json().await.with_context(|| format!("Invalid response body from {}", url))
    }

    async fn post_action(&self, id: &ItemId, action: ActionKind) -> Result<(), ActionError> {
        let segment = match action {
            ActionKind::Remove => "remove",
            ActionKind::Approve => "approve",
            ActionKind::SuppressReports => "ignore-reports",
        };
        let url = self.url(&format!("/items/{}/{}", id, segment));
        let resp = self
            .authed(self.http.post(&url))
            .json(&serde_json::json!({ "spam": false }))
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;

        let status = resp.status();
        if status.is_success() {
            debug!("{} {}", action.past(), id);
            Ok(())
        } else if status == StatusCode::NOT_IMPLEMENTED {
            Err(ActionError::Unsupported {
                action,
                kind: id.kind(),
            })
        } else {
            Err(anyhow::anyhow!("POST {} returned {}", url, status).into())
        }
    }
}

#[async_trait]
impl QueueSource for GatewayClient {
    async fn list_queue(&self, kind: ItemKind, limit: Option<u32>) -> Result<Vec<QueueItem>> {
        let mut query = vec![("type", kind.as_str().to_string())];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.get_json(&format!("/r/{}/modqueue", self.config.subreddit), &query)
            .await
    }

    async fn list_moderators(&self) -> Result<HashSet<String>> {
        let names: Vec<String> = self
            .get_json(&format!("/r/{}/moderators", self.config.subreddit), &[])
            .await?;
        Ok(names.into_iter().collect())
    }

    async fn moderator_permissions(&self, actor: &str) -> Result<Vec<String>> {
        self.get_json(
            &format!("/r/{}/moderators/{}/permissions", self.config.subreddit, actor),
            &[],
        )
        .await
    }
}

#[async_trait]
impl ItemMutator for GatewayClient {
    async fn remove(&self, item: &QueueItem) -> Result<(), ActionError> {
        self.post_action(&item.id, ActionKind::Remove).await
    }

    async fn approve(&self, item: &QueueItem) -> Result<(), ActionError> {
        self.post_action(&item.id, ActionKind::Approve).await
    }

    async fn suppress_reports(&self, item: &QueueItem) -> Result<(), ActionError> {
        if item.kind() == ItemKind::Comment {
            return Err(ActionError::Unsupported {
                action: ActionKind::SuppressReports,
                kind: ItemKind::Comment,
            });
        }
        self.post_action(&item.id, ActionKind::SuppressReports).await
    }

    async fn remove_by_id(&self, id: &ItemId) -> Result<(), ActionError> {
        self.post_action(id, ActionKind::Remove).await
    }
}

#[async_trait]
impl ItemResolver for GatewayClient {
    async fn resolve(&self, id: &ItemId) -> Result<QueueItem> {
        let collection = match id.kind() {
            ItemKind::Comment => "comments",
            ItemKind::Post => "posts",
        };
        self.get_json(&format!("/{}/{}", collection, id), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> GatewayClient {
        GatewayClient::new(GatewayConfig {
            base_url: base_url.into(),
            token: "secret".into(),
            subreddit: "pics".into(),
        })
        .unwrap()
    }

    #[test]
    fn joins_paths_without_double_slash() {
        assert_eq!(
            client("http://gw.local/v1/").url("/r/pics/modqueue"),
            "http://gw.local/v1/r/pics/modqueue"
        );
    }

    #[tokio::test]
    async fn comment_report_suppression_is_unsupported_without_a_request() {
        // Unroutable base URL: any request would fail with a transport error instead.
        let gateway = client("http://127.0.0.1:9");
        let comment: QueueItem = serde_json::from_value(serde_json::json!({
            "id": "t1_c",
            "author_name": "a",
            "score": 1,
            "created_at": "2024-05-01T10:00:00Z",
            "kind": "comment",
            "post_id": "t3_p"
        }))
        .unwrap();
        let err = gateway.suppress_reports(&comment).await.unwrap_err();
        assert!(matches!(
            err,
            ActionError::Unsupported {
                action: ActionKind::SuppressReports,
                kind: ItemKind::Comment
            }
        ));
    }
}
