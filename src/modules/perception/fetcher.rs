use reqwest::Client;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::retry::{is_retryable_status, RetryPolicy};
use super::window::QueryWindow;
use crate::config::bot_profile::{NvdConfig, RetryConfig};
use crate::errors::FetchError;

/// A successfully fetched NVD page.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub body: Value,
    pub attempts: u32,
}

impl FetchedDocument {
    pub fn total_results(&self) -> Option<u64> {
        self.body.get("totalResults").and_then(Value::as_u64)
    }
}

pub struct NvdFetcher {
    client: Client,
    endpoint: String,
    keyword: String,
    page_size: u32,
    include_end_date: bool,
    api_key: Option<String>,
    policy: RetryPolicy,
}

impl NvdFetcher {
    pub fn new(client: Client, nvd: &NvdConfig, retry: &RetryConfig, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: nvd.endpoint.clone(),
            keyword: nvd.keyword.clone(),
            page_size: nvd.page_size,
            include_end_date: nvd.include_end_date,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            policy: RetryPolicy::from_config(retry),
        }
    }

    pub fn query_params(&self, window: &QueryWindow) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("keyword", self.keyword.clone()),
            ("startIndex", "0".to_string()),
            ("resultsPerPage", self.page_size.to_string()),
            ("pubStartDate", window.start_param()),
        ];
        if self.include_end_date {
            params.push(("pubEndDate", window.end_param()));
        }
        if let Some(key) = &self.api_key {
            params.push(("apiKey", key.clone()));
        }
        params
    }

    /// 拉取窗口内发布的 CVE；连接错误、超时、5xx/429 按指数退避重试
    pub async fn fetch(&self, window: &QueryWindow) -> Result<FetchedDocument, FetchError> {
        let params = self.query_params(window);
        let max_attempts = self.policy.max_attempts();
        let mut last_reason = String::from("no attempt made");

        info!(
            "🔎 Polling NVD for '{}' published {} .. {}",
            self.keyword,
            window.start_param(),
            window.end_param()
        );

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                let delay = self.policy.backoff_for(attempt - 1);
                warn!(
                    "⚠️ NVD attempt {}/{} failed ({}). Retrying in {:?}...",
                    attempt - 1, max_attempts, last_reason, delay
                );
                sleep(delay).await;
            }

            let resp = match self.client.get(&self.endpoint).query(&params).send().await {
                Ok(resp) => resp,
                Err(e) if e.is_builder() => return Err(FetchError::Request(e.to_string())),
                Err(e) => {
                    last_reason = describe_transport_error(&e);
                    continue;
                }
            };

            let status = resp.status();
            if status.is_success() {
                let text = match resp.text().await {
                    Ok(text) => text,
                    Err(e) => {
                        last_reason = format!("body read failed: {}", e);
                        continue;
                    }
                };
                let body: Value = serde_json::from_str(&text)
                    .map_err(|e| FetchError::Decode(e.to_string()))?;

                info!("NVD API status code: {} (attempt {}/{})", status.as_u16(), attempt, max_attempts);
                let doc = FetchedDocument { body, attempts: attempt };
                self.check_page_coverage(&doc);
                return Ok(doc);
            }

            let text = resp.text().await.unwrap_or_default();
            if is_retryable_status(status) {
                last_reason = format!("HTTP {}", status.as_u16());
                continue;
            }

            return Err(FetchError::Rejected {
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            });
        }

        Err(FetchError::Exhausted { attempts: max_attempts, reason: last_reason })
    }

    fn check_page_coverage(&self, doc: &FetchedDocument) {
        match doc.total_results() {
            Some(total) if total > u64::from(self.page_size) => warn!(
                "NVD reports {} results but only {} fit in one page; the rest are skipped this cycle",
                total, self.page_size
            ),
            Some(total) => debug!("NVD reports {} results", total),
            None => debug!("NVD response has no totalResults field"),
        }
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timeout: {}", e)
    } else if e.is_connect() {
        format!("connection error: {}", e)
    } else {
        format!("request error: {}", e)
    }
}
