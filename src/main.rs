mod config;
mod errors;
mod utils;
mod modules;

use anyhow::Context;
use chrono::Utc;
use dotenvy::dotenv;
use std::env;
use tokio::time::sleep;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::bot_profile::ScheduleMode;
use crate::config::BotProfile;
use crate::modules::action::{ConfiguredPoster, DryRunPoster, StatusPoster, TwitterPoster};
use crate::modules::{CycleReport, Pipeline};
use crate::utils::http_client::HttpClientFactory;
use crate::utils::oauth::Credentials;

fn log_cycle(report: &CycleReport) {
    info!(
        "✅ Cycle done: window {} .. {}, {} attempt(s), {} result(s), {} to announce, {}/{} posted, {} failed",
        report.window.start_param(),
        report.window.end_param(),
        report.fetch_attempts,
        report.total_results.map(|t| t.to_string()).unwrap_or_else(|| "?".to_string()),
        report.records,
        report.publish.posted,
        report.publish.attempted,
        report.publish.failed.len()
    );
    if !report.publish.failed.is_empty() {
        warn!("Not announced this cycle: {}", report.publish.failed.join(", "));
    }
}

async fn run<P: StatusPoster>(pipeline: &Pipeline<P>, profile: &BotProfile) -> anyhow::Result<()> {
    match profile.schedule.mode {
        ScheduleMode::Once => match pipeline.run_cycle(Utc::now()).await {
            Ok(report) => {
                log_cycle(&report);
                Ok(())
            }
            Err(e) => {
                error!("🔥 Cycle failed: {}", e);
                Err(e.into())
            }
        },
        ScheduleMode::Loop => {
            let interval = profile.cycle_interval();
            loop {
                info!("==================== 🛰️ NVD POLL ====================");
                match pipeline.run_cycle(Utc::now()).await {
                    Ok(report) => log_cycle(&report),
                    Err(e) if e.is_transient() => warn!("⚠️ {}. Will retry next tick.", e),
                    Err(e) => error!("🔥 {}", e),
                }
                info!("💤 Sleeping {}s...", interval.as_secs());
                sleep(interval).await;
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!("Starting cve_herald v{}...", env!("CARGO_PKG_VERSION"));

    // 1. 配置
    let profile = BotProfile::load().context("Failed to load bot config")?;
    let is_dry = env::var("DRY_RUN").unwrap_or("0".to_string()) == "1";
    let nvd_key = env::var("NVD_KEY").ok();

    if profile.schedule.mode == ScheduleMode::Loop
        && profile.schedule.interval_sec > profile.lookback_secs()
    {
        warn!(
            "⚠️ Loop interval ({}s) is longer than the lookback ({}m); CVEs published in between will be missed.",
            profile.schedule.interval_sec, profile.nvd.lookback_minutes
        );
    }

    // 2. 客户端
    let nvd_client = HttpClientFactory::create_for_nvd(&profile.retry)?;
    let poster = if is_dry {
        warn!("DRY_RUN=1: announcements are logged, not posted.");
        ConfiguredPoster::DryRun(DryRunPoster)
    } else {
        let credentials = Credentials::from_env().context("Posting credentials must be set in .env")?;
        ConfiguredPoster::Twitter(TwitterPoster::new(
            HttpClientFactory::create_for_posting()?,
            &profile.twitter.base_url,
            credentials,
        ))
    };

    let pipeline = Pipeline::from_profile(&profile, nvd_client, nvd_key, poster)?;
    info!("✅ Initialized ({:?} mode, pairing {:?}).", profile.schedule.mode, profile.extraction.pairing);

    run(&pipeline, &profile).await
}
