//! HttpPayloadSource - fetch the randomization page with a plain GET.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, redirect::Policy};
use tracing::debug;

use super::extract::{PayloadMarker, extract_payload};
use crate::domain::{FetchError, Record};
use crate::ports::PayloadSource;

pub struct HttpPayloadSource {
    http: Client,
    url: String,
    marker: PayloadMarker,
}

impl HttpPayloadSource {
    pub fn new(
        url: impl Into<String>,
        marker: PayloadMarker,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        // the endpoint answers with a redirect chain before the page that
        // carries the payload
        let http = Client::builder()
            .user_agent(user_agent)
            .redirect(Policy::limited(8))
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            http,
            url: url.into(),
            marker,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PayloadSource for HttpPayloadSource {
    async fn fetch(&self) -> Result<Record, FetchError> {
        debug!(url = %self.url, "GET");
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = res.status();
        let final_url = res.url().to_string();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: final_url,
            });
        }

        let body = res
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        debug!(url = %final_url, bytes = body.len(), "page received");

        extract_payload(&body, &self.marker)
    }
}
