use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Video,
    Audio,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }

    pub fn action_label(&self) -> &'static str {
        match self {
            MediaKind::Video => "Download Video",
            MediaKind::Audio => "Convert to MP3",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Quality {
    #[default]
    #[serde(rename = "best")]
    Best,
    #[serde(rename = "1080")]
    P1080,
    #[serde(rename = "720")]
    P720,
    #[serde(rename = "480")]
    P480,
    #[serde(rename = "360")]
    P360,
}

impl Quality {
    pub const ALL: [Quality; 5] = [
        Quality::Best,
        Quality::P1080,
        Quality::P720,
        Quality::P480,
        Quality::P360,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Best => "best",
            Quality::P1080 => "1080",
            Quality::P720 => "720",
            Quality::P480 => "480",
            Quality::P360 => "360",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quality::Best => "Best Available",
            Quality::P1080 => "Full HD (1080p)",
            Quality::P720 => "HD (720p)",
            Quality::P480 => "Standard (480p)",
            Quality::P360 => "Data Saver (360p)",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().trim_end_matches(['p', 'P']);
        Self::ALL
            .into_iter()
            .find(|quality| quality.as_str().eq_ignore_ascii_case(value))
    }

    /// Audio downloads always ask for the best stream.
    pub fn for_kind(self, kind: MediaKind) -> Self {
        match kind {
            MediaKind::Audio => Quality::Best,
            MediaKind::Video => self,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub format: MediaKind,
    pub quality: Quality,
}

#[derive(Deserialize)]
pub struct DownloadResponse {
    pub task_id: String,
}

#[derive(Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Downloading,
    Ready,
    Error,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StatusReport {
    pub status: TaskStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub speed: String,
    #[serde(default)]
    pub eta: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<String>>,
}

impl StatusReport {
    pub fn new(status: TaskStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            progress: 0.0,
            speed: String::new(),
            eta: String::new(),
            filename: None,
            file_size_str: None,
            logs: None,
        }
    }

    /// Placeholder shown between submit and the first real report.
    pub fn starting() -> Self {
        Self::new(TaskStatus::Queued, "Starting download...")
    }

    pub fn clamp_progress(mut self) -> Self {
        self.progress = if self.progress.is_nan() {
            0.0
        } else {
            self.progress.clamp(0.0, 100.0)
        };
        self
    }

    pub fn recent_logs(&self, count: usize) -> &[String] {
        let logs = self.logs.as_deref().unwrap_or(&[]);
        &logs[logs.len().saturating_sub(count)..]
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub link: String,
    pub filename: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}
