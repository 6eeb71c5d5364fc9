use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::PublishError;
use crate::utils::oauth::{Credentials, OAuthSigner};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostReceipt {
    pub post_id: Option<String>,
}

/// Anything that can publish one status update.
#[allow(async_fn_in_trait)]
pub trait StatusPoster {
    async fn post(&self, text: &str) -> Result<PostReceipt, PublishError>;
}

/// `POST /2/tweets`, signed with OAuth 1.0a user context.
pub struct TwitterPoster {
    client: Client,
    endpoint: String,
    signer: OAuthSigner,
}

impl TwitterPoster {
    pub fn new(client: Client, base_url: &str, credentials: Credentials) -> Self {
        Self {
            client,
            endpoint: format!("{}/2/tweets", base_url.trim_end_matches('/')),
            signer: OAuthSigner::new(credentials),
        }
    }
}

impl StatusPoster for TwitterPoster {
    async fn post(&self, text: &str) -> Result<PostReceipt, PublishError> {
        // JSON body 不参与 OAuth 签名
        let auth = self.signer.authorization_header("POST", &self.endpoint, &[]);

        let resp = self.client.post(&self.endpoint)
            .header(AUTHORIZATION, auth)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| PublishError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(PublishError::Rejected { status: status.as_u16(), detail: error_detail(&body) });
        }

        let post_id = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v["data"]["id"].as_str().map(str::to_string));
        Ok(PostReceipt { post_id })
    }
}

/// Pulls the human-readable reason out of an error payload.
fn error_detail(body: &str) -> String {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return body.chars().take(300).collect(),
    };
    parsed["detail"]
        .as_str()
        .or_else(|| parsed["title"].as_str())
        .or_else(|| parsed["errors"][0]["message"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.chars().take(300).collect())
}

/// Logs instead of posting. Enabled with `DRY_RUN=1`.
#[derive(Debug, Default)]
pub struct DryRunPoster;

impl StatusPoster for DryRunPoster {
    async fn post(&self, text: &str) -> Result<PostReceipt, PublishError> {
        info!("📝 [DRY RUN] would post:\n{}\n-------------------", text);
        Ok(PostReceipt::default())
    }
}

/// Runtime choice between the real endpoint and dry-run.
pub enum ConfiguredPoster {
    Twitter(TwitterPoster),
    DryRun(DryRunPoster),
}

impl StatusPoster for ConfiguredPoster {
    async fn post(&self, text: &str) -> Result<PostReceipt, PublishError> {
        match self {
            ConfiguredPoster::Twitter(p) => p.post(text).await,
            ConfiguredPoster::DryRun(p) => p.post(text).await,
        }
    }
}
