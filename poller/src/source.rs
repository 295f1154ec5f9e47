//! Time sources: where the poller gets the server's notion of "now".

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use thiserror::Error;

/// A request that did not produce a usable body.
///
/// Network errors and non-success statuses are not distinguished; both
/// carry only a status text for the diagnostic log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status_text}")]
pub struct RequestFailure {
    pub status_text: String,
}

impl RequestFailure {
    pub fn new(status_text: impl Into<String>) -> Self {
        Self { status_text: status_text.into() }
    }

    fn from_status(status: StatusCode) -> Self {
        let text = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_u16().to_string());
        Self::new(text)
    }

    fn from_transport(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid endpoint url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Anything that can answer "what time is it" with an opaque string.
#[async_trait]
pub trait TimeSource: Send + Sync {
    /// Where requests go, for logs.
    fn endpoint(&self) -> &str;

    async fn fetch(&self) -> Result<String, RequestFailure>;
}

/// Plain HTTP GET against a fixed endpoint.
pub struct HttpTimeSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpTimeSource {
    /// `path` is resolved against `base_url` the way a browser resolves a
    /// relative link, so `http://host/` + `xml/za` gives `http://host/xml/za`.
    pub fn new(base_url: &str, path: &str, timeout: Option<Duration>) -> Result<Self, SourceError> {
        let invalid = |reason: String| SourceError::InvalidUrl {
            url: format!("{base_url} + {path}"),
            reason,
        };
        let base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        let url = base.join(path).map_err(|e| invalid(e.to_string()))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self { client: builder.build()?, url })
    }
}

#[async_trait]
impl TimeSource for HttpTimeSource {
    fn endpoint(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch(&self) -> Result<String, RequestFailure> {
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(RequestFailure::from_transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RequestFailure::from_status(status));
        }
        resp.text().await.map_err(RequestFailure::from_transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_resolves_relative_path() {
        let src = HttpTimeSource::new("http://127.0.0.1:8080/", "xml/za", None).unwrap();
        assert_eq!(src.endpoint(), "http://127.0.0.1:8080/xml/za");

        let src = HttpTimeSource::new("http://clock.local", "xml/za", None).unwrap();
        assert_eq!(src.endpoint(), "http://clock.local/xml/za");

        // Relative to the page, not the site root.
        let src = HttpTimeSource::new("http://clock.local/app/index.html", "xml/tok", None).unwrap();
        assert_eq!(src.endpoint(), "http://clock.local/app/xml/tok");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = HttpTimeSource::new("not a url", "xml/za", None).err().unwrap();
        assert!(matches!(err, SourceError::InvalidUrl { .. }));
    }

    #[test]
    fn test_status_text_uses_reason_phrase() {
        assert_eq!(RequestFailure::from_status(StatusCode::NOT_FOUND).status_text, "Not Found");
        assert_eq!(
            RequestFailure::from_status(StatusCode::INTERNAL_SERVER_ERROR).status_text,
            "Internal Server Error"
        );
        let odd = StatusCode::from_u16(599).unwrap();
        assert_eq!(RequestFailure::from_status(odd).status_text, "599");
    }
}
