//! Terminal front end. Reads intents from stdin, renders controller state
//! to stdout. Holds no session state of its own beyond the selected mode.

use std::fmt::Write as _;
use std::ops::ControlFlow;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::config::BackendConfig;
use crate::errors::ClientError;
use crate::history::HistoryRecorder;
use crate::session::{Session, SessionController, SessionState};
use crate::settings::{Reachability, ServerSettings};
use crate::types::{HistoryEntry, MediaKind, Quality, TaskStatus};

const HELP: &str = "\
commands:
  video | audio          switch mode
  quality <q>            best, 1080, 720, 480, 360 (video only)
  url <link>             set the link to download
  paste                  take the link from the clipboard
  clear                  empty the link
  get [link]             start the download
  save                   save the finished file
  reset                  forget the current download
  server [url]           set the backend (empty clears it)
  probe [url]            check whether a backend answers
  history                list recent downloads
  pick <n>               reuse the link of history entry n
  status                 show the current state
  help | quit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Mode(MediaKind),
    Quality(Quality),
    SetUrl(String),
    Paste,
    Clear,
    Submit(Option<String>),
    Save,
    Reset,
    Server(String),
    Probe(Option<String>),
    History,
    Pick(usize),
    Status,
    Help,
    Quit,
}

pub fn parse_intent(line: &str) -> Result<Intent, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let arg = if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    };

    let intent = match word.to_ascii_lowercase().as_str() {
        "video" => Intent::Mode(MediaKind::Video),
        "audio" | "mp3" => Intent::Mode(MediaKind::Audio),
        "quality" => {
            let quality = arg
                .as_deref()
                .and_then(Quality::parse)
                .ok_or_else(|| "quality must be one of best, 1080, 720, 480, 360".to_string())?;
            Intent::Quality(quality)
        }
        "url" => Intent::SetUrl(arg.unwrap_or_default()),
        "paste" => Intent::Paste,
        "clear" => Intent::Clear,
        "get" | "download" => Intent::Submit(arg),
        "save" => Intent::Save,
        "reset" => Intent::Reset,
        "server" => Intent::Server(arg.unwrap_or_default()),
        "probe" => Intent::Probe(arg),
        "history" => Intent::History,
        "pick" => {
            let index = arg
                .as_deref()
                .and_then(|value| value.parse::<usize>().ok())
                .filter(|value| *value > 0)
                .ok_or_else(|| "pick needs a history number".to_string())?;
            Intent::Pick(index - 1)
        }
        "status" | "" => Intent::Status,
        "help" | "?" => Intent::Help,
        "quit" | "exit" => Intent::Quit,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(intent)
}

pub fn render_session(session: &Session, mode: MediaKind, quality: Quality) -> String {
    let mut out = String::new();
    let url = if session.submitted_url.is_empty() {
        "(none)"
    } else {
        session.submitted_url.as_str()
    };
    let _ = writeln!(out, "[{}] link: {url}", mode.as_str());
    if mode == MediaKind::Video {
        let _ = writeln!(out, "quality: {}", quality.label());
    }

    let action = match &session.state {
        SessionState::Ready {
            filename,
            file_size,
            ..
        } => match file_size {
            Some(size) => format!("Save {filename} ({size})"),
            None => format!("Save {filename}"),
        },
        state if state.is_loading() => "Processing...".to_string(),
        _ => mode.action_label().to_string(),
    };
    let _ = writeln!(out, "> {action}");

    if let Some(status) = &session.last_status {
        let marker = match status.status {
            TaskStatus::Error => "!",
            TaskStatus::Ready => "ok",
            TaskStatus::Downloading => "..",
            TaskStatus::Queued => "--",
        };
        let _ = writeln!(out, "{marker} {}", status.message);
        if status.status == TaskStatus::Downloading {
            let _ = writeln!(
                out,
                "   {:.1}%  {}  {}",
                status.progress, status.speed, status.eta
            );
        }
        for line in status.recent_logs(2) {
            let _ = writeln!(out, "   | {line}");
        }
    }
    out
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "no recent downloads\n".to_string();
    }
    let mut out = String::from("Recent Downloads\n");
    for (index, entry) in entries.iter().enumerate() {
        let marker = match entry.kind {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        };
        let _ = writeln!(
            out,
            "{:>2}. [{marker}] {}  {}",
            index + 1,
            entry.filename,
            entry.date
        );
    }
    out
}

pub fn render_server(config: &BackendConfig, resolved: &str, reachability: Reachability) -> String {
    match &config.url {
        Some(url) => format!("server: {url} ({reachability})\n"),
        None => format!("server: default {resolved} ({reachability})\n"),
    }
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn read_text(&self) -> Result<String, ClientError>;
}

/// Reads the desktop clipboard. `arboard` blocks, so it runs off the runtime.
pub struct SystemClipboard;

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn read_text(&self) -> Result<String, ClientError> {
        let read = tokio::task::spawn_blocking(|| {
            arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text())
        })
        .await
        .map_err(|err| ClientError::ClipboardDenied(err.to_string()))?;
        clipboard_text(read)
    }
}

fn clipboard_text(read: Result<String, arboard::Error>) -> Result<String, ClientError> {
    read.map(|text| text.trim().to_string())
        .map_err(|err| ClientError::ClipboardDenied(err.to_string()))
}

/// Forwards intents to the controllers and prints what they report.
pub struct ViewAdapter {
    controller: SessionController,
    settings: Arc<ServerSettings>,
    history: Arc<HistoryRecorder>,
    clipboard: Arc<dyn Clipboard>,
    resolve_base: Box<dyn Fn() -> String + Send + Sync>,
    mode: MediaKind,
    quality: Quality,
}

impl ViewAdapter {
    pub fn new(
        controller: SessionController,
        settings: Arc<ServerSettings>,
        history: Arc<HistoryRecorder>,
        clipboard: Arc<dyn Clipboard>,
        resolve_base: Box<dyn Fn() -> String + Send + Sync>,
    ) -> Self {
        Self {
            controller,
            settings,
            history,
            clipboard,
            resolve_base,
            mode: MediaKind::Video,
            quality: Quality::Best,
        }
    }

    pub fn mode(&self) -> MediaKind {
        self.mode
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Applies one intent. Returns text to show, or `Break` on quit.
    pub async fn handle(&mut self, intent: Intent) -> ControlFlow<(), String> {
        let text = match intent {
            Intent::Quit => return ControlFlow::Break(()),
            Intent::Help => format!("{HELP}\n"),
            Intent::Mode(kind) => {
                self.mode = kind;
                self.render().await
            }
            Intent::Quality(quality) => {
                if self.mode == MediaKind::Audio {
                    "audio downloads always use the best quality\n".to_string()
                } else if self.controller.snapshot().await.state.is_loading() {
                    "quality is locked while a download is in progress\n".to_string()
                } else {
                    self.quality = quality;
                    format!("quality: {}\n", quality.label())
                }
            }
            Intent::SetUrl(url) => self.set_url(&url).await,
            Intent::Clear => self.set_url("").await,
            Intent::Paste => match self.clipboard.read_text().await {
                Ok(text) => self.set_url(&text).await,
                Err(err) => {
                    warn!("paste failed: {err}");
                    String::new()
                }
            },
            Intent::Submit(url) => {
                if let Some(url) = url {
                    if !self.controller.set_url(&url).await {
                        return ControlFlow::Continue(
                            "a download is already in progress\n".to_string(),
                        );
                    }
                }
                let url = self.controller.snapshot().await.submitted_url;
                let controller = self.controller.clone();
                let (mode, quality) = (self.mode, self.quality);
                tokio::spawn(async move {
                    if let Err(err) = controller.submit(&url, mode, quality).await {
                        debug!("submit ignored: {err}");
                    }
                });
                String::new()
            }
            Intent::Save => match self.controller.save().await {
                Ok(()) => "saving...\n".to_string(),
                Err(err) => format!("{err}\n"),
            },
            Intent::Reset => {
                self.controller.reset().await;
                self.render().await
            }
            Intent::Server(input) => {
                self.settings.mark_unknown();
                match self.settings.save(&input).await {
                    Ok(_) => self.render_server(),
                    Err(err) => format!("{err}\n{}", self.render_server()),
                }
            }
            Intent::Probe(url) => {
                let url = url
                    .map(|value| BackendConfig::new(&value))
                    .and_then(|config| config.url)
                    .unwrap_or_else(|| (self.resolve_base)());
                self.settings.probe(&url).await;
                format!("{url}: {}\n", self.settings.reachability())
            }
            Intent::History => render_history(&self.history.entries().await),
            Intent::Pick(index) => match self.history.select(index).await {
                Some(link) => self.set_url(&link).await,
                None => "no such history entry\n".to_string(),
            },
            Intent::Status => {
                let mut text = self.render().await;
                text.push_str(&self.render_server());
                text
            }
        };
        ControlFlow::Continue(text)
    }

    async fn set_url(&self, url: &str) -> String {
        if self.controller.set_url(url.trim()).await {
            self.render().await
        } else {
            "the link can't change while a download is in progress\n".to_string()
        }
    }

    async fn render(&self) -> String {
        render_session(&self.controller.snapshot().await, self.mode, self.quality)
    }

    fn render_server(&self) -> String {
        render_server(
            &self.settings.current(),
            &(self.resolve_base)(),
            self.settings.reachability(),
        )
    }

    /// Runs until stdin closes or the user quits. Session changes made by
    /// background polling are printed as they happen.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut updates = self.controller.subscribe();
        let (mode_tx, mut mode_watch) = tokio::sync::watch::channel((self.mode, self.quality));
        let printer = tokio::spawn(async move {
            let mut last_state = None;
            let mut last_status = None;
            while updates.changed().await.is_ok() {
                let session = updates.borrow_and_update().clone();
                if last_state.as_ref() == Some(&session.state)
                    && last_status.as_ref() == Some(&session.last_status)
                {
                    continue;
                }
                let (mode, quality) = *mode_watch.borrow_and_update();
                print!("{}", render_session(&session, mode, quality));
                if session.state.is_terminal() {
                    println!("(save | get | reset)");
                }
                last_state = Some(session.state);
                last_status = Some(session.last_status);
            }
        });

        println!("{HELP}");
        print!("{}", self.render_server());
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let intent = match parse_intent(&line) {
                Ok(intent) => intent,
                Err(message) => {
                    println!("{message}");
                    continue;
                }
            };
            match self.handle(intent).await {
                ControlFlow::Continue(text) => print!("{text}"),
                ControlFlow::Break(()) => break,
            }
            mode_tx.send_replace((self.mode, self.quality));
        }

        printer.abort();
        self.shutdown().await;
        Ok(())
    }

    /// Lets artifact transfers finish, then forgets the session.
    pub async fn shutdown(&self) {
        let pending = self.controller.pending_transfers();
        if pending > 0 {
            println!("waiting for {pending} download(s) to finish saving...");
            info!("waiting for {pending} artifact transfer(s)");
        }
        self.controller.wait_for_transfers().await;
        self.controller.reset().await;
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use super::*;
    use crate::artifact::ArtifactSaver;
    use crate::backend::Backend;
    use crate::session::SessionOptions;
    use crate::store::memory::MemoryStore;
    use crate::types::{DownloadRequest, StatusReport};

    #[test]
    fn parses_intents() {
        assert_eq!(parse_intent("audio"), Ok(Intent::Mode(MediaKind::Audio)));
        assert_eq!(parse_intent("quality 720p"), Ok(Intent::Quality(Quality::P720)));
        assert!(parse_intent("quality 4k").is_err());
        assert_eq!(
            parse_intent("  get https://example.com/v "),
            Ok(Intent::Submit(Some("https://example.com/v".to_string())))
        );
        assert_eq!(parse_intent("get"), Ok(Intent::Submit(None)));
        assert_eq!(parse_intent("server"), Ok(Intent::Server(String::new())));
        assert_eq!(parse_intent("pick 3"), Ok(Intent::Pick(2)));
        assert!(parse_intent("pick 0").is_err());
        assert_eq!(parse_intent(""), Ok(Intent::Status));
        assert!(parse_intent("fly").is_err());
    }

    #[test]
    fn renders_downloading_progress_and_last_logs() {
        let mut report = StatusReport::new(TaskStatus::Downloading, "Downloading...");
        report.progress = 42.25;
        report.speed = "2.0MiB/s".to_string();
        report.eta = "00:12".to_string();
        report.logs = Some(vec!["one".into(), "two".into(), "three".into()]);
        let session = Session {
            submitted_url: "https://example.com/v".to_string(),
            state: SessionState::Polling {
                task_id: "T1".to_string(),
            },
            last_status: Some(report),
            ..Session::default()
        };

        let text = render_session(&session, MediaKind::Video, Quality::P720);

        assert!(text.contains("link: https://example.com/v"));
        assert!(text.contains("quality: HD (720p)"));
        assert!(text.contains("Processing..."));
        assert!(text.contains("42.2%") || text.contains("42.3%"));
        assert!(text.contains("2.0MiB/s"));
        assert!(!text.contains("| one"));
        assert!(text.contains("| two") && text.contains("| three"));
    }

    #[test]
    fn renders_save_action_when_ready() {
        let session = Session {
            state: SessionState::Ready {
                task_id: "T1".to_string(),
                filename: "v.mp4".to_string(),
                file_size: Some("12.3 MB".to_string()),
            },
            ..Session::default()
        };
        let text = render_session(&session, MediaKind::Audio, Quality::Best);
        assert!(text.contains("Save v.mp4 (12.3 MB)"));
        assert!(!text.contains("quality:"));

        let idle = render_session(&Session::default(), MediaKind::Audio, Quality::Best);
        assert!(idle.contains("Convert to MP3"));
        assert!(idle.contains("link: (none)"));
    }

    #[test]
    fn renders_history_with_type_markers() {
        let entries = vec![HistoryEntry {
            link: "https://example.com/a".to_string(),
            filename: "a.mp3".to_string(),
            date: "1/2/2026, 3:04:05 PM".to_string(),
            kind: MediaKind::Audio,
        }];
        let text = render_history(&entries);
        assert!(text.contains(" 1. [audio] a.mp3  1/2/2026, 3:04:05 PM"));
        assert_eq!(render_history(&[]), "no recent downloads\n");
    }

    struct DeniedClipboard;

    #[async_trait]
    impl Clipboard for DeniedClipboard {
        async fn read_text(&self) -> Result<String, ClientError> {
            Err(ClientError::ClipboardDenied("denied".to_string()))
        }
    }

    struct FixedClipboard(&'static str);

    #[async_trait]
    impl Clipboard for FixedClipboard {
        async fn read_text(&self) -> Result<String, ClientError> {
            Ok(self.0.to_string())
        }
    }

    struct NeverBackend;

    #[async_trait]
    impl Backend for NeverBackend {
        async fn submit(&self, _request: &DownloadRequest) -> Result<String, ClientError> {
            Err(ClientError::SubmissionFailed("offline".to_string()))
        }

        async fn poll(&self, _task_id: &str) -> Result<StatusReport, ClientError> {
            Err(ClientError::poll("offline"))
        }

        async fn probe(&self, _base_url: &str) -> bool {
            false
        }

        fn artifact_url(&self, task_id: &str) -> String {
            format!("/file/{task_id}")
        }
    }

    struct NoSaver;

    #[async_trait]
    impl ArtifactSaver for NoSaver {
        async fn save(&self, _url: &str, filename: &str) -> anyhow::Result<PathBuf> {
            Ok(PathBuf::from(filename))
        }
    }

    struct HangingBackend;

    #[async_trait]
    impl Backend for HangingBackend {
        async fn submit(&self, _request: &DownloadRequest) -> Result<String, ClientError> {
            std::future::pending().await
        }

        async fn poll(&self, _task_id: &str) -> Result<StatusReport, ClientError> {
            std::future::pending().await
        }

        async fn probe(&self, _base_url: &str) -> bool {
            false
        }

        fn artifact_url(&self, task_id: &str) -> String {
            format!("/file/{task_id}")
        }
    }

    struct ReadyBackend;

    #[async_trait]
    impl Backend for ReadyBackend {
        async fn submit(&self, _request: &DownloadRequest) -> Result<String, ClientError> {
            Ok("T1".to_string())
        }

        async fn poll(&self, _task_id: &str) -> Result<StatusReport, ClientError> {
            let mut report = StatusReport::new(TaskStatus::Ready, "Ready");
            report.filename = Some("v.mp4".to_string());
            Ok(report)
        }

        async fn probe(&self, _base_url: &str) -> bool {
            true
        }

        fn artifact_url(&self, task_id: &str) -> String {
            format!("/file/{task_id}")
        }
    }

    #[derive(Default)]
    struct SlowSaver {
        saved: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl ArtifactSaver for SlowSaver {
        async fn save(&self, _url: &str, filename: &str) -> anyhow::Result<PathBuf> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            self.saved.lock().unwrap().push(filename.to_string());
            Ok(PathBuf::from(filename))
        }
    }

    fn adapter(clipboard: Arc<dyn Clipboard>) -> (ViewAdapter, Arc<HistoryRecorder>) {
        adapter_with(Arc::new(NeverBackend), Arc::new(NoSaver), clipboard)
    }

    fn adapter_with(
        backend: Arc<dyn Backend>,
        saver: Arc<dyn ArtifactSaver>,
        clipboard: Arc<dyn Clipboard>,
    ) -> (ViewAdapter, Arc<HistoryRecorder>) {
        let store = Arc::new(MemoryStore::default());
        let history = Arc::new(HistoryRecorder::new(store.clone()));
        let controller = SessionController::new(
            backend.clone(),
            history.clone(),
            saver,
            SessionOptions::default(),
        );
        let (config, _) = tokio::sync::watch::channel(BackendConfig::default());
        let settings = Arc::new(ServerSettings::new(store, backend, config));
        let view = ViewAdapter::new(
            controller,
            settings,
            history.clone(),
            clipboard,
            Box::new(|| "http://localhost:5000".to_string()),
        );
        (view, history)
    }

    async fn wait_for_session<F>(view: &ViewAdapter, done: F) -> Session
    where
        F: FnMut(&Session) -> bool,
    {
        let mut rx = view.controller.subscribe();
        let session = tokio::time::timeout(Duration::from_secs(60), rx.wait_for(done))
            .await
            .expect("session never settled")
            .expect("controller dropped")
            .clone();
        session
    }

    #[test]
    fn clipboard_text_is_trimmed_and_errors_are_denied() {
        assert_eq!(
            clipboard_text(Ok(" https://example.com/c \n".to_string())),
            Ok("https://example.com/c".to_string())
        );
        assert!(matches!(
            clipboard_text(Err(arboard::Error::ContentNotAvailable)),
            Err(ClientError::ClipboardDenied(_))
        ));
    }

    #[tokio::test]
    async fn hung_submit_leaves_the_view_responsive() {
        let (mut view, _) = adapter_with(
            Arc::new(HangingBackend),
            Arc::new(NoSaver),
            Arc::new(DeniedClipboard),
        );

        let handled = tokio::time::timeout(
            Duration::from_secs(2),
            view.handle(Intent::Submit(Some("https://example.com/slow".to_string()))),
        )
        .await
        .expect("submit must return while the backend is still working");
        assert_eq!(handled, ControlFlow::Continue(String::new()));
        wait_for_session(&view, |s| s.state == SessionState::Submitting).await;

        tokio::time::timeout(Duration::from_secs(2), view.handle(Intent::Reset))
            .await
            .expect("reset must get through during a hung submit");
        let session = view.controller.snapshot().await;
        assert_eq!(session.state, SessionState::Idle);
        assert_eq!(session.submitted_url, "https://example.com/slow");

        assert!(view
            .handle(Intent::SetUrl("https://example.com/other".to_string()))
            .await
            .is_continue());
        assert_eq!(
            view.controller.snapshot().await.submitted_url,
            "https://example.com/other"
        );
        assert!(view.handle(Intent::Quit).await.is_break());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_waits_for_slow_save() {
        let saver = Arc::new(SlowSaver::default());
        let (mut view, _) =
            adapter_with(Arc::new(ReadyBackend), saver.clone(), Arc::new(DeniedClipboard));

        view.handle(Intent::Submit(Some("https://example.com/v".to_string())))
            .await;
        wait_for_session(&view, |s| matches!(s.state, SessionState::Ready { .. })).await;
        assert_eq!(
            view.handle(Intent::Save).await,
            ControlFlow::Continue("saving...\n".to_string())
        );
        assert!(view.handle(Intent::Quit).await.is_break());
        assert!(saver.saved.lock().unwrap().is_empty());

        view.shutdown().await;

        assert_eq!(*saver.saved.lock().unwrap(), vec!["v.mp4".to_string()]);
        assert_eq!(view.controller.pending_transfers(), 0);
        assert_eq!(view.controller.snapshot().await.state, SessionState::Idle);
    }

    #[tokio::test]
    async fn denied_paste_changes_nothing() {
        let (mut view, _) = adapter(Arc::new(DeniedClipboard));
        view.handle(Intent::SetUrl("https://example.com/keep".to_string()))
            .await;
        assert_eq!(view.handle(Intent::Paste).await, ControlFlow::Continue(String::new()));
        assert_eq!(
            view.controller.snapshot().await.submitted_url,
            "https://example.com/keep"
        );
    }

    #[tokio::test]
    async fn paste_fills_url_without_submitting() {
        let (mut view, _) = adapter(Arc::new(FixedClipboard(" https://example.com/p \n")));
        view.handle(Intent::Paste).await;
        let session = view.controller.snapshot().await;
        assert_eq!(session.submitted_url, "https://example.com/p");
        assert_eq!(session.state, SessionState::Idle);
    }

    #[tokio::test]
    async fn picking_history_refills_url_only() {
        let (mut view, history) = adapter(Arc::new(DeniedClipboard));
        history
            .record(HistoryEntry {
                link: "https://example.com/old".to_string(),
                filename: "old.mp4".to_string(),
                date: "d".to_string(),
                kind: MediaKind::Video,
            })
            .await;

        view.handle(Intent::Pick(0)).await;
        let session = view.controller.snapshot().await;
        assert_eq!(session.submitted_url, "https://example.com/old");
        assert_eq!(session.state, SessionState::Idle);

        let missing = view.handle(Intent::Pick(5)).await;
        assert_eq!(
            missing,
            ControlFlow::Continue("no such history entry\n".to_string())
        );
    }

    #[tokio::test]
    async fn audio_mode_ignores_quality_and_submit_failure_shows() {
        let (mut view, _) = adapter(Arc::new(DeniedClipboard));
        view.handle(Intent::Mode(MediaKind::Audio)).await;
        view.handle(Intent::Quality(Quality::P360)).await;
        assert_eq!(view.quality(), Quality::Best);
        assert_eq!(view.mode(), MediaKind::Audio);

        view.handle(Intent::Submit(Some("https://example.com/a".to_string())))
            .await;
        let session = wait_for_session(&view, |s| s.state.is_terminal()).await;
        assert_eq!(
            session.state,
            SessionState::Failed {
                message: "offline".to_string()
            }
        );
        assert_eq!(session.kind, MediaKind::Audio);
    }

    #[tokio::test]
    async fn unreachable_server_is_reported() {
        let (mut view, _) = adapter(Arc::new(DeniedClipboard));
        let ControlFlow::Continue(text) = view.handle(Intent::Server("dead:1".to_string())).await
        else {
            panic!("server intent must not quit");
        };
        assert!(text.contains("http://dead:1 is unreachable"));
        assert!(text.contains("connection failed"));
        assert!(view.handle(Intent::Quit).await.is_break());
    }
}
