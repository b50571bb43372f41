use super::Probe;
use crate::error::{Result, RuntimeError};
use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;
use waitready_core::ProbeOutcome;

/// Issues one GET per check and expects exactly `200`
///
/// Redirects are never followed: a `301` from a web front end that is
/// still bootstrapping is reported as-is and fails the check.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    url: Url,
    client: Client,
}

impl HttpProbe {
    /// `timeout` bounds the whole request, connect included
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .no_proxy()
            .user_agent(concat!("waitready/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RuntimeError::http_client(e.to_string()))?;

        Ok(Self { url, client })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn check(&self) -> ProbeOutcome {
        match self.client.get(self.url.clone()).send().await {
            Ok(response) => {
                let status = response.status();
                debug!("HTTP probe to {} returned status {}", self.url, status);
                ProbeOutcome::from_http_status(status.as_u16())
            }
            Err(e) => {
                debug!("HTTP probe to {} failed: {}", self.url, e);
                ProbeOutcome::transport_failure()
            }
        }
    }
}
