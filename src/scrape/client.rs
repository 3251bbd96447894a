use crate::config::ScraperConfig;
use crate::scrape::ScrapeError;
use reqwest::blocking::Client;
use std::time::Duration;

/// Anything that can hand back the markup behind a URL.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Blocking reqwest client. One attempt per page: a non-200 answer or a
/// transport failure is returned to the caller as is.
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(cfg: &ScraperConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(network)?;

        Ok(Self { client })
    }
}

impl PageSource for HttpClient {
    fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let start = std::time::Instant::now();

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(network)?;

        let status = resp.status();
        if status.as_u16() != 200 {
            tracing::error!(%url, status = status.as_u16(), "request rejected");
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = resp.text().map_err(network)?;
        tracing::debug!(%url, elapsed = ?start.elapsed(), bytes = text.len(), "fetched");
        Ok(text)
    }
}

fn network(e: reqwest::Error) -> ScrapeError {
    ScrapeError::Network(e.to_string())
}
