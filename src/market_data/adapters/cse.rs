// reqwest-backed adapter for the exchange's undocumented POST API

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use super::{Endpoint, Upstream};
use crate::config::UpstreamSettings;
use crate::error::{BridgeError, UpstreamError};

pub struct CseAdapter {
    client: reqwest::Client,
    base_url: String, // always ends with '/'
}

impl CseAdapter {
    pub fn new(settings: &UpstreamSettings) -> Result<Self, BridgeError> {
        let header = |name: &str, value: &str| {
            HeaderValue::from_str(value)
                .map_err(|e| BridgeError::Config(format!("invalid {name} header '{value}': {e}")))
        };

        // The API rejects requests that don't look like they came from the site.
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header("user-agent", &settings.user_agent)?);
        headers.insert(ORIGIN, header("origin", &settings.site_url)?);
        headers.insert(REFERER, header("referer", &format!("{}/", settings.site_url.trim_end_matches('/')))?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| BridgeError::Config(format!("failed to create HTTP client: {e}")))?;

        let mut base_url = settings.base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl Upstream for CseAdapter {
    async fn post(&self, endpoint: Endpoint, form: &[(&'static str, String)])
        -> Result<Value, UpstreamError>
    {
        let path = endpoint.path();
        let url = format!("{}{}", self.base_url, path);
        debug!(endpoint = path, fields = form.len(), "POST {}", url);

        let http = |source| UpstreamError::Http { endpoint: path, source };
        let response = self
            .client
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(http)?
            .error_for_status()
            .map_err(http)?;

        let body = response.text().await.map_err(http)?;
        serde_json::from_str(&body).map_err(|e| UpstreamError::Decode {
            endpoint: path,
            reason: e.to_string(),
        })
    }
}
