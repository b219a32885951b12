use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::watch;

/// Compiled-in backend, used when the user has not configured one.
pub const BUILD_DEFAULT_BACKEND: Option<&str> = option_env!("VIDGRAB_DEFAULT_BACKEND");

const DEFAULT_ORIGIN: &str = "http://localhost:5000";
pub const SAVE_RESET_DELAY: Duration = Duration::from_millis(1500);
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub origin: String,
    pub build_default: Option<String>,
    pub data_dir: PathBuf,
    pub download_dir: PathBuf,
    pub poll_interval: Duration,
    pub save_reset_delay: Duration,
    pub probe_timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let origin = env_value("VIDGRAB_ORIGIN")
            .map(|value| normalize_server_url(&value))
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());

        let data_dir = env_value("VIDGRAB_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("vidgrab")
            });

        let download_dir = env_value("VIDGRAB_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let save_reset_delay = reset_delay_from(env_value("VIDGRAB_SAVE_RESET_MS").as_deref());

        Self {
            origin,
            build_default: BUILD_DEFAULT_BACKEND
                .map(normalize_server_url)
                .filter(|value| !value.is_empty()),
            data_dir,
            download_dir,
            poll_interval: POLL_INTERVAL,
            save_reset_delay,
            probe_timeout: PROBE_TIMEOUT,
        }
    }
}

/// Milliseconds from `VIDGRAB_SAVE_RESET_MS`; anything unparsable falls back.
fn reset_delay_from(value: Option<&str>) -> Duration {
    value
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(SAVE_RESET_DELAY)
}

fn env_value(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// User override for the backend location. `None` means fall back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: Option<String>,
}

impl BackendConfig {
    pub fn new(url: &str) -> Self {
        let url = normalize_server_url(url);
        Self {
            url: if url.is_empty() { None } else { Some(url) },
        }
    }
}

/// Trim, drop trailing slashes, default the scheme to `http://`.
pub fn normalize_server_url(input: &str) -> String {
    let trimmed = input
        .trim_start()
        .trim_end_matches(|c: char| c == '/' || c.is_whitespace());
    if trimmed.is_empty() {
        return String::new();
    }
    if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

fn has_http_scheme(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Picks the base URL on every request: user override, then the
/// compiled-in default, then the origin the client was served from.
#[derive(Clone, Debug)]
pub struct BaseUrlResolver {
    config: watch::Receiver<BackendConfig>,
    build_default: Option<String>,
    origin: String,
}

impl BaseUrlResolver {
    pub fn new(
        config: watch::Receiver<BackendConfig>,
        build_default: Option<String>,
        origin: String,
    ) -> Self {
        Self {
            config,
            build_default,
            origin,
        }
    }

    pub fn resolve(&self) -> String {
        if let Some(url) = self.config.borrow().url.clone() {
            return url;
        }
        self.build_default
            .clone()
            .unwrap_or_else(|| self.origin.clone())
    }
}
