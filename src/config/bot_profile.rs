use serde::Deserialize;
use config::{Config, Environment, File};
use anyhow::{Result, anyhow, Context};
use chrono::FixedOffset;
use std::time::Duration;

use crate::modules::extraction::PairingStrategy;

pub const MAX_FETCH_RETRIES: u32 = 10;
/// NVD 单次查询允许的最大发布日期跨度: 120 天
pub const MAX_LOOKBACK_MINUTES: i64 = 120 * 24 * 60;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NvdConfig {
    pub endpoint: String,
    pub keyword: String,
    pub page_size: u32,
    pub lookback_minutes: i64,
    /// NVD 要求时间带时区标签，例如 "-05:00"
    pub utc_offset: String,
    pub include_end_date: bool,
}

impl Default for NvdConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://services.nvd.nist.gov/rest/json/cves/1.0".to_string(),
            keyword: "hackerone".to_string(),
            page_size: 50,
            lookback_minutes: 60,
            utc_offset: "-05:00".to_string(),
            include_end_date: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub connect_timeout_sec: u64,
    pub request_timeout_sec: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff_ms: 1_000,
            max_backoff_ms: 30_000,
            connect_timeout_sec: 5,
            request_timeout_sec: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExtractionConfig {
    pub id_key: String,
    pub url_key: String,
    pub marker: String,
    pub pairing: PairingStrategy,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            id_key: "ID".to_string(),
            url_key: "url".to_string(),
            marker: "hackerone".to_string(),
            pairing: PairingStrategy::Joint,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnnounceConfig {
    pub handle: String,
    pub detail_base_url: String,
    pub post_delay_ms: u64,
}

impl Default for AnnounceConfig {
    fn default() -> Self {
        Self {
            handle: "@Hacker0x01".to_string(),
            detail_base_url: "https://nvd.nist.gov/vuln/detail/".to_string(),
            post_delay_ms: 1_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TwitterConfig {
    pub base_url: String,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self { base_url: "https://api.twitter.com".to_string() }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    Once,
    Loop,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScheduleConfig {
    pub mode: ScheduleMode,
    pub interval_sec: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { mode: ScheduleMode::Loop, interval_sec: 3_600 }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct BotProfile {
    pub nvd: NvdConfig,
    pub retry: RetryConfig,
    pub extraction: ExtractionConfig,
    pub announce: AnnounceConfig,
    pub twitter: TwitterConfig,
    pub schedule: ScheduleConfig,
}

impl BotProfile {
    /// 读取 bot_config.{toml,yaml,...}（可选），再用 CVE_HERALD__SECTION__KEY 环境变量覆盖
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name("bot_config").required(false))
            .add_source(
                Environment::with_prefix("CVE_HERALD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let profile: BotProfile = settings
            .try_deserialize()
            .context("bot_config could not be deserialized")?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        if self.nvd.lookback_minutes <= 0 || self.nvd.lookback_minutes > MAX_LOOKBACK_MINUTES {
            return Err(anyhow!(
                "nvd.lookback_minutes must be in 1..={}, got {}",
                MAX_LOOKBACK_MINUTES, self.nvd.lookback_minutes
            ));
        }
        if self.nvd.page_size == 0 {
            return Err(anyhow!("nvd.page_size must be at least 1"));
        }
        if self.retry.max_retries > MAX_FETCH_RETRIES {
            return Err(anyhow!(
                "retry.max_retries must be at most {}, got {}",
                MAX_FETCH_RETRIES, self.retry.max_retries
            ));
        }
        if self.extraction.marker.is_empty() {
            return Err(anyhow!("extraction.marker must not be empty"));
        }
        self.utc_offset()?;
        Ok(())
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        parse_utc_offset(&self.nvd.utc_offset)
    }

    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.nvd.lookback_minutes)
    }

    pub fn lookback_secs(&self) -> u64 {
        u64::try_from(self.nvd.lookback_minutes).unwrap_or(0).saturating_mul(60)
    }

    pub fn post_delay(&self) -> Duration {
        Duration::from_millis(self.announce.post_delay_ms)
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.interval_sec)
    }
}

/// Accepts `+HH:MM` / `-HH:MM`.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let raw = raw.trim();
    let (sign, rest) = match raw.chars().next() {
        Some('+') => (1, &raw[1..]),
        Some('-') => (-1, &raw[1..]),
        _ => return Err(anyhow!("utc offset '{}' must start with + or -", raw)),
    };
    let (hours, minutes) = rest
        .split_once(':')
        .context(format!("utc offset '{}' must look like -05:00", raw))?;
    let hours: i32 = hours.parse().context("utc offset hours")?;
    let minutes: i32 = minutes.parse().context("utc offset minutes")?;
    if hours > 23 || minutes > 59 {
        return Err(anyhow!("utc offset '{}' is out of range", raw));
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .context(format!("utc offset '{}' is out of range", raw))
}
