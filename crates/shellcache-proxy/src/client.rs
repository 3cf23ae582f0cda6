//! Asset fetch client

use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use url::{Origin, Url};

use crate::error::FetchError;

/// How a fetched response relates to the application origin.
///
/// Mirrors the response types a browser runtime reports: `Basic` for
/// same-origin responses, `Cors` for cross-origin responses the server has
/// opened up via `Access-Control-Allow-Origin`, and `Opaque` for everything
/// else (servable as-is but never cacheable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Basic,
    Cors,
    Opaque,
}

impl ResponseKind {
    /// Classify a response given the app origin, the request URL, and the
    /// `Access-Control-Allow-Origin` header value if present
    pub fn classify(app_origin: &Origin, request_url: &Url, allow_origin: Option<&str>) -> Self {
        if request_url.origin() == *app_origin {
            return ResponseKind::Basic;
        }
        match allow_origin {
            Some("*") => ResponseKind::Cors,
            Some(value) if value == app_origin.ascii_serialization() => ResponseKind::Cors,
            _ => ResponseKind::Opaque,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Basic => "basic",
            ResponseKind::Cors => "cors",
            ResponseKind::Opaque => "opaque",
        }
    }
}

/// A response fetched over the network
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: u16,
    /// Headers with lowercase names
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
    pub kind: ResponseKind,
}

impl FetchedResponse {
    /// Whether this response may be written into a cache partition:
    /// status 200 and not an opaque cross-origin response
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && matches!(self.kind, ResponseKind::Basic | ResponseKind::Cors)
    }
}

/// Network fetch abstraction
///
/// The seam between cache strategies and the real network, so strategy
/// behavior is observable without sockets.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, method: &Method, url: &Url) -> Result<FetchedResponse, FetchError>;
}

/// HTTP fetcher over reqwest
pub struct HttpFetcher {
    client: reqwest::Client,
    app_origin: Origin,
}

impl HttpFetcher {
    /// Create a fetcher classifying responses relative to `app_origin`
    pub fn new(app_origin: &Url) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().build()?;

        debug!(
            "Created fetcher for origin {}",
            app_origin.origin().ascii_serialization()
        );

        Ok(Self {
            client,
            app_origin: app_origin.origin(),
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, method: &Method, url: &Url) -> Result<FetchedResponse, FetchError> {
        debug!("Fetching {} {}", method, url);

        let response = self
            .client
            .request(method.clone(), url.clone())
            .send()
            .await?;

        let status = response.status().as_u16();

        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), value.to_string());
            }
        }

        let kind = ResponseKind::classify(
            &self.app_origin,
            url,
            headers.get("access-control-allow-origin").map(String::as_str),
        );

        let body = response.bytes().await?;

        debug!(
            "Fetched {} {} -> {} ({}, {} bytes)",
            method,
            url,
            status,
            kind.as_str(),
            body.len()
        );

        Ok(FetchedResponse {
            status,
            headers,
            body,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(s: &str) -> Origin {
        Url::parse(s).unwrap().origin()
    }

    #[test]
    fn test_same_origin_is_basic() {
        let app = origin("https://app.example");
        let url = Url::parse("https://app.example/assets/main.js").unwrap();
        assert_eq!(ResponseKind::classify(&app, &url, None), ResponseKind::Basic);
    }

    #[test]
    fn test_cross_origin_with_wildcard_is_cors() {
        let app = origin("https://app.example");
        let url = Url::parse("https://cdn.example/lib.js").unwrap();
        assert_eq!(
            ResponseKind::classify(&app, &url, Some("*")),
            ResponseKind::Cors
        );
    }

    #[test]
    fn test_cross_origin_with_matching_origin_is_cors() {
        let app = origin("https://app.example");
        let url = Url::parse("https://cdn.example/lib.js").unwrap();
        assert_eq!(
            ResponseKind::classify(&app, &url, Some("https://app.example")),
            ResponseKind::Cors
        );
    }

    #[test]
    fn test_cross_origin_without_cors_is_opaque() {
        let app = origin("https://app.example");
        let url = Url::parse("https://cdn.example/lib.js").unwrap();
        assert_eq!(ResponseKind::classify(&app, &url, None), ResponseKind::Opaque);
        assert_eq!(
            ResponseKind::classify(&app, &url, Some("https://other.example")),
            ResponseKind::Opaque
        );
    }

    #[test]
    fn test_cacheability() {
        let ok = FetchedResponse {
            status: 200,
            headers: BTreeMap::new(),
            body: Bytes::new(),
            kind: ResponseKind::Basic,
        };
        assert!(ok.is_cacheable());

        let opaque = FetchedResponse {
            kind: ResponseKind::Opaque,
            ..ok.clone()
        };
        assert!(!opaque.is_cacheable());

        let not_found = FetchedResponse {
            status: 404,
            ..ok.clone()
        };
        assert!(!not_found.is_cacheable());
    }
}
