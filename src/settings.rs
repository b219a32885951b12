use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::backend::Backend;
use crate::config::{normalize_server_url, BackendConfig};
use crate::errors::ClientError;
use crate::store::{Store, SERVER_URL_KEY};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Reachability {
    #[default]
    Unknown,
    Checking,
    Connected,
    Error,
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Reachability::Unknown => "unknown",
            Reachability::Checking => "checking...",
            Reachability::Connected => "connected",
            Reachability::Error => "connection failed",
        };
        f.write_str(label)
    }
}

/// Owns the backend override and the reachability badge.
pub struct ServerSettings {
    store: Arc<dyn Store>,
    backend: Arc<dyn Backend>,
    config: watch::Sender<BackendConfig>,
    reachability: watch::Sender<Reachability>,
}

impl ServerSettings {
    pub fn new(
        store: Arc<dyn Store>,
        backend: Arc<dyn Backend>,
        config: watch::Sender<BackendConfig>,
    ) -> Self {
        let (reachability, _) = watch::channel(Reachability::Unknown);
        Self {
            store,
            backend,
            config,
            reachability,
        }
    }

    /// Restores the persisted override. Called once at startup.
    pub fn load(&self) {
        let saved = self
            .store
            .read(SERVER_URL_KEY)
            .map(|value| BackendConfig::new(&value))
            .unwrap_or_default();
        if let Some(url) = &saved.url {
            info!("using saved server {url}");
        }
        self.config.send_replace(saved);
    }

    pub fn current(&self) -> BackendConfig {
        self.config.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Reachability> {
        self.reachability.subscribe()
    }

    pub fn reachability(&self) -> Reachability {
        *self.reachability.borrow()
    }

    /// Opening the panel or editing the field forgets the last verdict.
    pub fn mark_unknown(&self) {
        self.reachability.send_replace(Reachability::Unknown);
    }

    pub async fn probe(&self, base_url: &str) -> bool {
        self.reachability.send_replace(Reachability::Checking);
        let reachable = self.backend.probe(base_url).await;
        self.reachability.send_replace(if reachable {
            Reachability::Connected
        } else {
            Reachability::Error
        });
        reachable
    }

    /// Normalizes `input`, and stores it only if the server answers.
    /// An empty value clears the override.
    pub async fn save(&self, input: &str) -> Result<BackendConfig, ClientError> {
        let url = normalize_server_url(input);
        if url.is_empty() {
            if let Err(err) = self.store.delete(SERVER_URL_KEY) {
                warn!("failed to clear saved server: {err:#}");
            }
            self.config.send_replace(BackendConfig::default());
            self.mark_unknown();
            info!("server override cleared");
            return Ok(BackendConfig::default());
        }

        if !self.probe(&url).await {
            return Err(ClientError::ProbeUnreachable(url));
        }

        if let Err(err) = self.store.write(SERVER_URL_KEY, &url) {
            warn!("failed to persist server url: {err:#}");
        }
        let config = BackendConfig { url: Some(url) };
        info!("server set to {}", config.url.as_deref().unwrap_or_default());
        self.config.send_replace(config.clone());
        Ok(config)
    }
}
