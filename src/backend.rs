use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::{BaseUrlResolver, PROBE_TIMEOUT};
use crate::errors::ClientError;
use crate::types::{DownloadRequest, DownloadResponse, ErrorBody, StatusReport};

/// The remote fetch/transcode service.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Starts a task and returns its id.
    async fn submit(&self, request: &DownloadRequest) -> Result<String, ClientError>;

    async fn poll(&self, task_id: &str) -> Result<StatusReport, ClientError>;

    /// True when anything at `base_url` answers over HTTP.
    async fn probe(&self, base_url: &str) -> bool;

    fn artifact_url(&self, task_id: &str) -> String;
}

pub struct HttpBackend {
    client: reqwest::Client,
    resolver: BaseUrlResolver,
    probe_timeout: Duration,
}

impl HttpBackend {
    pub fn new(client: reqwest::Client, resolver: BaseUrlResolver) -> Self {
        Self {
            client,
            resolver,
            probe_timeout: PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> String {
        self.resolver.resolve()
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn submit(&self, request: &DownloadRequest) -> Result<String, ClientError> {
        let url = format!("{}/download", self.base_url());
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                warn!("submit to {url} failed: {err}");
                ClientError::submission(None)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ErrorBody>().await.ok();
            warn!("submit rejected with {status}");
            return Err(ClientError::submission(body.and_then(|body| body.message)));
        }

        let body = response.json::<DownloadResponse>().await.map_err(|err| {
            warn!("submit response unreadable: {err}");
            ClientError::submission(None)
        })?;
        Ok(body.task_id)
    }

    async fn poll(&self, task_id: &str) -> Result<StatusReport, ClientError> {
        let url = format!("{}/status/{task_id}", self.base_url());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ClientError::poll)?
            .error_for_status()
            .map_err(ClientError::poll)?;
        response
            .json::<StatusReport>()
            .await
            .map_err(ClientError::poll)
    }

    async fn probe(&self, base_url: &str) -> bool {
        let url = format!("{base_url}/status/test");
        match self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            // Any HTTP answer, error statuses included, proves a server is there.
            Ok(response) => {
                debug!("probe {url} answered {}", response.status());
                true
            }
            Err(err) => {
                debug!("probe {url} failed: {err}");
                false
            }
        }
    }

    fn artifact_url(&self, task_id: &str) -> String {
        format!("{}/file/{task_id}", self.base_url())
    }
}
