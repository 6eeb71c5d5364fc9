use crate::config::bot_profile::AnnounceConfig;

/// Text of one CVE announcement.
#[derive(Debug, Clone)]
pub struct AnnouncementTemplate {
    handle: String,
    detail_base_url: String,
}

impl AnnouncementTemplate {
    pub fn new(handle: impl Into<String>, detail_base_url: impl Into<String>) -> Self {
        Self { handle: handle.into(), detail_base_url: detail_base_url.into() }
    }

    pub fn from_config(cfg: &AnnounceConfig) -> Self {
        Self::new(cfg.handle.clone(), cfg.detail_base_url.clone())
    }

    pub fn render(&self, cve_id: &str, report_url: &str) -> String {
        format!(
            "{} reported via {} has been published: {}{}\r\n\r\n{}",
            cve_id, self.handle, self.detail_base_url, cve_id, report_url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_default_announcement() {
        let template = AnnouncementTemplate::from_config(&AnnounceConfig::default());
        assert_eq!(
            template.render("CVE-2024-0001", "https://hackerone.com/reports/1"),
            "CVE-2024-0001 reported via @Hacker0x01 has been published: https://nvd.nist.gov/vuln/detail/CVE-2024-0001\r\n\r\nhttps://hackerone.com/reports/1"
        );
    }

    #[test]
    fn handle_and_detail_page_are_configurable() {
        let template = AnnouncementTemplate::new("@someone", "https://cve.example/");
        assert_eq!(
            template.render("CVE-1", "u"),
            "CVE-1 reported via @someone has been published: https://cve.example/CVE-1\r\n\r\nu"
        );
    }
}
