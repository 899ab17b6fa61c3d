// HTTP transport with custom user-agent support
use super::transport::{HttpReply, Transport};
use crate::config::DashboardConfig;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// [`Transport`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a client for the configured backend
    ///
    /// # Errors
    ///
    /// Will return `Err` if the underlying HTTP client cannot be built
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<HttpReply> {
        let url = self.url_for(path);
        debug!("GET {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("GET {url} -> {status} ({} bytes)", body.len());
        Ok(HttpReply { status, body })
    }
}
