use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

use super::message::AnnouncementTemplate;
use super::poster::StatusPoster;
use crate::modules::extraction::PublishMapping;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub attempted: usize,
    pub posted: usize,
    pub failed: Vec<String>,
}

pub struct Publisher<P> {
    poster: P,
    template: AnnouncementTemplate,
    delay: Duration,
}

impl<P: StatusPoster> Publisher<P> {
    pub fn new(poster: P, template: AnnouncementTemplate, delay: Duration) -> Self {
        Self { poster, template, delay }
    }

    /// 逐条发布；单条失败只记录，不中断整批。两次发送之间固定等待以避开限流
    pub async fn publish(&self, mapping: &PublishMapping) -> PublishReport {
        let mut report = PublishReport::default();

        for (idx, (cve_id, report_url)) in mapping.iter().enumerate() {
            if idx > 0 && !self.delay.is_zero() {
                sleep(self.delay).await;
            }

            let text = self.template.render(cve_id, report_url);
            report.attempted += 1;

            match self.poster.post(&text).await {
                Ok(receipt) => {
                    report.posted += 1;
                    info!(
                        "✅ Announced {} (post id {})",
                        cve_id,
                        receipt.post_id.as_deref().unwrap_or("-")
                    );
                }
                Err(e) => {
                    error!("❌ Posting error for {}: {}", cve_id, e);
                    report.failed.push(cve_id.to_string());
                }
            }
        }

        report
    }
}

#[cfg(test)]
impl<P> Publisher<P> {
    pub(crate) fn poster(&self) -> &P {
        &self.poster
    }
}
