//! Shared HTTP client construction for the outbound adapters.

use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("persona-council/", env!("CARGO_PKG_VERSION"));

/// Failure to set up an HTTP adapter
#[derive(Error, Debug)]
pub enum HttpClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl HttpClientError {
    fn invalid(url: &str, reason: impl Into<String>) -> Self {
        HttpClientError::InvalidBaseUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Build a `reqwest` client with the crate's user agent and an optional
/// default request timeout.
pub(crate) fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, HttpClientError> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Parse an http(s) base URL that has a host
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, HttpClientError> {
    let url = Url::parse(base_url.trim())
        .map_err(|e| HttpClientError::invalid(base_url, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(HttpClientError::invalid(
            base_url,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(HttpClientError::invalid(base_url, "missing host"));
    }

    Ok(url)
}

/// `base` with `segments` appended to its path, each one percent-encoded
pub(crate) fn join_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut url = base.clone();
    // http(s) URLs with a host always have a hierarchical path
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
