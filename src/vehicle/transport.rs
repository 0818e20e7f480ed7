use super::error::VehicleError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Outbound HTTP transport for the vehicle cloud
///
/// The cloud sits behind bot protection, so every request carries
/// browser-like headers, and a 403 Forbidden is logged as a likely block
/// before the response is handed back to the caller unchanged.
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
}

impl Transport {
    pub fn new() -> Result<Self, VehicleError> {
        let client = reqwest::Client::builder()
            .default_headers(browser_headers())
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    pub async fn send(&self, request: RequestBuilder) -> Result<Response, VehicleError> {
        let response = request.send().await?;

        debug!("{} -> {}", response.url(), response.status());

        if response.status() == StatusCode::FORBIDDEN {
            warn!(
                "403 Forbidden from {} - bot protection might be blocking",
                response.url()
            );
        }

        Ok(response)
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}
