use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use sanitize_filename::sanitize;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Pulls a finished artifact onto the user's machine.
#[async_trait]
pub trait ArtifactSaver: Send + Sync {
    async fn save(&self, url: &str, filename: &str) -> Result<PathBuf>;
}

pub struct HttpArtifactSaver {
    client: reqwest::Client,
    dir: PathBuf,
}

impl HttpArtifactSaver {
    pub fn new(client: reqwest::Client, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dir: dir.into(),
        }
    }
}

#[async_trait]
impl ArtifactSaver for HttpArtifactSaver {
    async fn save(&self, url: &str, filename: &str) -> Result<PathBuf> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to request {url}"))?;
        if !response.status().is_success() {
            return Err(anyhow!("artifact request returned {}", response.status()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let name = file_name_for(filename, content_type.as_deref());

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let target = unique_path(&self.dir, &name);
        let partial = PathBuf::from(format!("{}.part", target.display()));

        if let Err(err) = write_body(&mut response, &partial).await {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                warn!("could not remove {}: {cleanup}", partial.display());
            }
            return Err(err);
        }

        tokio::fs::rename(&partial, &target)
            .await
            .with_context(|| format!("failed to move download to {}", target.display()))?;
        info!("saved {}", target.display());
        Ok(target)
    }
}

async fn write_body(response: &mut reqwest::Response, partial: &Path) -> Result<()> {
    let mut file = tokio::fs::File::create(partial)
        .await
        .with_context(|| format!("failed to create {}", partial.display()))?;
    while let Some(chunk) = response.chunk().await.context("artifact transfer interrupted")? {
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(())
}

/// Sanitized name; borrows an extension from the content type if it has none.
pub fn file_name_for(filename: &str, content_type: Option<&str>) -> String {
    let mut name = sanitize(filename.trim());
    if name.is_empty() {
        name = "video".to_string();
    }
    if Path::new(&name).extension().is_some() {
        return name;
    }
    let extension = content_type
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .and_then(|mime| {
            let extensions = mime_guess::get_mime_extensions_str(mime)?;
            let subtype = mime.rsplit('/').next().unwrap_or_default();
            extensions
                .iter()
                .find(|extension| **extension == subtype)
                .or_else(|| extensions.first())
                .copied()
        });
    match extension {
        Some(extension) => format!("{name}.{extension}"),
        None => name,
    }
}

fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name);
    let extension = path.extension().and_then(|ext| ext.to_str());
    (1..)
        .map(|n| match extension {
            Some(extension) => dir.join(format!("{stem} ({n}).{extension}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
