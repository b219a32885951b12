use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod artifact;
mod backend;
mod config;
mod errors;
mod history;
mod session;
mod settings;
mod store;
mod types;
mod view;

use artifact::HttpArtifactSaver;
use backend::HttpBackend;
use config::{BackendConfig, BaseUrlResolver, ClientConfig};
use history::HistoryRecorder;
use session::{SessionController, SessionOptions};
use settings::ServerSettings;
use store::FileStore;
use view::{SystemClipboard, ViewAdapter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    let store = Arc::new(FileStore::new(config.data_dir.clone()));
    info!("data in {}", store.dir().display());
    let client = reqwest::Client::new();

    let (backend_config, backend_config_rx) = watch::channel(BackendConfig::default());
    let resolver = BaseUrlResolver::new(
        backend_config_rx,
        config.build_default.clone(),
        config.origin.clone(),
    );
    let backend = Arc::new(
        HttpBackend::new(client.clone(), resolver.clone()).with_probe_timeout(config.probe_timeout),
    );

    let settings = Arc::new(ServerSettings::new(
        store.clone(),
        backend.clone(),
        backend_config,
    ));
    settings.load();

    let history = Arc::new(HistoryRecorder::new(store));
    history.load().await;

    let saver = Arc::new(HttpArtifactSaver::new(client, config.download_dir.clone()));
    let controller = SessionController::new(
        backend,
        history.clone(),
        saver,
        SessionOptions {
            poll_interval: config.poll_interval,
            save_reset_delay: config.save_reset_delay,
        },
    );

    info!("saving downloads to {}", config.download_dir.display());
    let view = ViewAdapter::new(
        controller,
        settings,
        history,
        Arc::new(SystemClipboard),
        Box::new(move || resolver.resolve()),
    );
    view.run().await
}
