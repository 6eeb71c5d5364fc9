use reqwest::Client;
use std::time::Duration;
use anyhow::Result;
use tracing::info;

use crate::config::bot_profile::RetryConfig;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// NVD 查询用的 Client：每次尝试都受 connect/total 超时约束，超时由重试逻辑接管
    pub fn create_for_nvd(retry: &RetryConfig) -> Result<Client> {
        let builder = Client::builder()
            .timeout(Duration::from_secs(retry.request_timeout_sec))
            .connect_timeout(Duration::from_secs(retry.connect_timeout_sec))
            .user_agent(concat!("cve_herald/", env!("CARGO_PKG_VERSION")));

        info!(
            "🌐 [Http Client] NVD client ready (connect {}s, total {}s)",
            retry.connect_timeout_sec, retry.request_timeout_sec
        );

        let client = builder.build()?;
        Ok(client)
    }

    /// 发帖用的 Client
    pub fn create_for_posting() -> Result<Client> {
        let builder = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("cve_herald/", env!("CARGO_PKG_VERSION")));

        let client = builder.build()?;
        Ok(client)
    }
}
