use anyhow::Result;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use reqwest::Client;
use tracing::info;

use crate::config::bot_profile::{BotProfile, ExtractionConfig};
use crate::errors::CycleError;
use crate::modules::action::{AnnouncementTemplate, PublishReport, Publisher, StatusPoster};
use crate::modules::extraction::build_mapping;
use crate::modules::perception::{NvdFetcher, QueryWindow};

/// Outcome of one successful fetch → extract → publish pass.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub window: QueryWindow,
    pub fetch_attempts: u32,
    pub total_results: Option<u64>,
    pub records: usize,
    pub publish: PublishReport,
}

pub struct Pipeline<P> {
    fetcher: NvdFetcher,
    extraction: ExtractionConfig,
    publisher: Publisher<P>,
    lookback: Duration,
    offset: FixedOffset,
}

impl<P: StatusPoster> Pipeline<P> {
    pub fn from_profile(profile: &BotProfile, nvd_client: Client, nvd_key: Option<String>, poster: P) -> Result<Self> {
        Ok(Self {
            fetcher: NvdFetcher::new(nvd_client, &profile.nvd, &profile.retry, nvd_key),
            extraction: profile.extraction.clone(),
            publisher: Publisher::new(
                poster,
                AnnouncementTemplate::from_config(&profile.announce),
                profile.post_delay(),
            ),
            lookback: profile.lookback(),
            offset: profile.utc_offset()?,
        })
    }

    /// 拉取失败直接返回 Err，本轮跳过；拉取成功但无匹配是正常结果
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> Result<CycleReport, CycleError> {
        let window = QueryWindow::trailing(now, self.lookback, self.offset)?;
        let doc = self.fetcher.fetch(&window).await?;

        let mapping = build_mapping(&doc.body, &self.extraction);
        if mapping.is_empty() {
            info!("No new '{}' CVEs in this window.", self.extraction.marker);
        } else {
            info!("📣 {} CVE(s) to announce", mapping.len());
        }

        let publish = self.publisher.publish(&mapping).await;

        Ok(CycleReport {
            total_results: doc.total_results(),
            fetch_attempts: doc.attempts,
            records: mapping.len(),
            publish,
            window,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchError;
    use crate::modules::action::publisher::tests::RecordingPoster;
    use crate::modules::extraction::json_walk::tests::nvd_page;
    use crate::utils::test_http::{spawn_scripted_http, test_client, ScriptedResponse};
    use chrono::TimeZone;

    fn profile(endpoint: String) -> BotProfile {
        let mut profile = BotProfile::default();
        profile.nvd.endpoint = endpoint;
        profile.retry.base_backoff_ms = 1;
        profile.retry.max_backoff_ms = 5;
        profile.announce.post_delay_ms = 0;
        profile
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn announces_each_hackerone_cve_once() {
        let (base, server) = spawn_scripted_http(vec![
            ScriptedResponse::new(503, "{}"),
            ScriptedResponse::new(200, nvd_page().to_string()),
        ])
        .await;
        let pipeline = Pipeline::from_profile(&profile(base), test_client(), None, RecordingPoster::default()).unwrap();

        let report = pipeline.run_cycle(now()).await.unwrap();

        assert_eq!(report.fetch_attempts, 2);
        assert_eq!(report.total_results, Some(3));
        assert_eq!(report.records, 2);
        assert_eq!(report.publish.posted, 2);
        assert_eq!(report.window.start_param(), "2024-03-01T08:00:00:000 UTC-05:00");

        let sent = pipeline.publisher_poster().sent.lock().unwrap().clone();
        assert_eq!(
            sent,
            vec![
                "CVE-2024-0001 reported via @Hacker0x01 has been published: https://nvd.nist.gov/vuln/detail/CVE-2024-0001\r\n\r\nhttps://hackerone.com/reports/1".to_string(),
                "CVE-2024-0003 reported via @Hacker0x01 has been published: https://nvd.nist.gov/vuln/detail/CVE-2024-0003\r\n\r\nhttps://hackerone.com/reports/3".to_string(),
            ]
        );
        assert_eq!(server.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_fetch_skips_publishing() {
        let (base, _server) = spawn_scripted_http(vec![ScriptedResponse::new(403, "{}")]).await;
        let pipeline = Pipeline::from_profile(&profile(base), test_client(), None, RecordingPoster::default()).unwrap();

        let err = pipeline.run_cycle(now()).await.unwrap_err();

        assert!(matches!(err, CycleError::Fetch(FetchError::Rejected { status: 403, .. })));
        assert!(pipeline.publisher_poster().sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_matches_is_not_an_error() {
        let body = r#"{"totalResults":0,"result":{"CVE_Items":[]}}"#;
        let (base, _server) = spawn_scripted_http(vec![ScriptedResponse::new(200, body)]).await;
        let pipeline = Pipeline::from_profile(&profile(base), test_client(), None, RecordingPoster::default()).unwrap();

        let report = pipeline.run_cycle(now()).await.unwrap();

        assert_eq!(report.records, 0);
        assert_eq!(report.publish, PublishReport::default());
    }

    impl<P> Pipeline<P> {
        fn publisher_poster(&self) -> &P {
            self.publisher.poster()
        }
    }
}
