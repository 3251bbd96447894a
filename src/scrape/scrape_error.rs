use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {status} while fetching {url}")]
    Status { url: String, status: u16 },
    #[error("HTML parse error: {0}")]
    HtmlParse(String),
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
    #[error("Missing mandatory field `{0}`")]
    MissingField(&'static str),
}
