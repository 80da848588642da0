mod action;
mod app;
mod clipboard;
mod config;
mod model;
mod service;
mod toast;
mod ui;
mod ui_state;

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use action::Action;
use app::{join_outcome, spawn_submission, App, ServiceHealth, Submission, SubmissionOutcome};
use clipboard::{ClipboardWriter, SystemClipboard};
use config::{Config, ConfigError};
use model::Audience;
use service::{ConversionService, HttpConversionService};
use ui::draw;

#[derive(Parser, Debug)]
#[command(name = "biztone", about = "Rewrite casual text in a business tone")]
struct Args {
    /// Base URL of the conversion service
    #[arg(long)]
    server_url: Option<String>,
    /// Initial audience: boss, colleague or client
    #[arg(long)]
    target: Option<Audience>,
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Defaults, then the config file, then command line flags
    fn resolve_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(url) = &self.server_url {
            config.server_url = url.clone();
        }
        if let Some(target) = self.target {
            config.default_target = target;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = secs;
        }
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.resolve_config()?;
    init_logging(&config.log_file_path())?;
    tracing::info!(server_url = %config.server_url, "starting biztone");

    let service: Arc<dyn ConversionService> = Arc::new(HttpConversionService::new(
        &config.server_url,
        config.request_timeout(),
    )?);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config);

    let result = run_app(&mut terminal, &mut app, service, &config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!(error = %e, "terminal loop failed");
        eprintln!("Error: {}", e);
    }

    Ok(())
}

/// The single conversion request that may be in flight
struct Submissions {
    service: Arc<dyn ConversionService>,
    pending: Option<Submission>,
}

impl Submissions {
    fn new(service: Arc<dyn ConversionService>) -> Self {
        Self {
            service,
            pending: None,
        }
    }

    /// Apply a user action, spawning the request it produces
    fn dispatch(
        &mut self,
        app: &mut App,
        action: Action,
        clipboard: &mut dyn ClipboardWriter,
        now: Instant,
    ) {
        if let Some(request) = app.handle_action(action, clipboard, now) {
            self.pending = Some(spawn_submission(Arc::clone(&self.service), request));
        }
    }

    /// Wait for the in-flight submission, or forever when there is none
    async fn next_outcome(&mut self) -> SubmissionOutcome {
        match self.pending.as_mut() {
            Some(handle) => join_outcome(handle.await),
            None => std::future::pending().await,
        }
    }

    /// Hand a finished outcome to the form and forget its handle
    fn settle(&mut self, app: &mut App, outcome: SubmissionOutcome) {
        self.pending = None;
        app.settle(outcome);
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    service: Arc<dyn ConversionService>,
    config: &Config,
) -> io::Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(config.tick_rate());
    let mut clipboard = SystemClipboard::new();

    let probe_service = Arc::clone(&service);
    let mut health_probe = tokio::spawn(async move { probe_service.health().await });
    let mut probing = true;
    let mut submissions = Submissions::new(service);

    loop {
        terminal.draw(|frame| draw(frame, app, Instant::now()))?;

        tokio::select! {
            _ = ticker.tick() => app.tick(Instant::now()),
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => {
                    let Some(action) = Action::from_event(event) else {
                        continue;
                    };
                    submissions.dispatch(app, action, &mut clipboard, Instant::now());
                }
                Some(Err(e)) => return Err(e),
                None => return Ok(()),
            },
            outcome = submissions.next_outcome() => submissions.settle(app, outcome),
            joined = &mut health_probe, if probing => {
                probing = false;
                let health = match joined {
                    Ok(probe) => ServiceHealth::from_probe(probe),
                    Err(e) => ServiceHealth::Unreachable(e.to_string()),
                };
                tracing::info!(?health, "service health probed");
                app.set_service_health(health);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::ClipboardError;
    use crate::service::{ConvertRequest, ConvertResponse, HealthStatus, ServiceError};
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "biztone",
            "--server-url",
            "http://tone.local:8080",
            "--target",
            "colleague",
            "--timeout-secs",
            "3",
        ]);

        let config = args.resolve_config().unwrap();

        assert_eq!(config.server_url, "http://tone.local:8080");
        assert_eq!(config.default_target, Audience::Colleague);
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_zero_timeout_flag_rejected() {
        assert!(Args::try_parse_from(["biztone", "--timeout-secs", "0"]).is_err());
    }

    #[test]
    fn test_config_file_cannot_move_counter_or_toast() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "soft_limit = 100").unwrap();
        writeln!(file, "toast_duration_ms = 50").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = Args::parse_from(["biztone", "--config", path.as_str()])
            .resolve_config()
            .unwrap();
        let mut app = App::new(&config);
        app.insert_str("hello");
        let now = Instant::now();
        app.toast.trigger(now);

        assert_eq!(crate::ui_state::form_view(&app, now).counter.label, "5/500");
        assert!(app.toast.is_visible(now + Duration::from_millis(1000)));
        assert!(app.toast.is_visible(now + Duration::from_millis(1999)));
    }

    #[test]
    fn test_zero_tick_rate_in_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tick_rate_ms = 0").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let err = Args::parse_from(["biztone", "--config", path.as_str()])
            .resolve_config()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server_url = \"http://from-file:5000\"").unwrap();
        writeln!(file, "default_target = \"client\"").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let args = Args::parse_from(["biztone", "--config", path.as_str(), "--server-url", "http://from-flag"]);
        let config = args.resolve_config().unwrap();

        assert_eq!(config.server_url, "http://from-flag");
        assert_eq!(config.default_target, Audience::Client);
    }

    #[test]
    fn test_invalid_target_flag_rejected() {
        assert!(Args::try_parse_from(["biztone", "--target", "ceo"]).is_err());
    }

    /// Uppercases the text and counts calls
    #[derive(Default)]
    struct ShoutingService {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ConversionService for ShoutingService {
        async fn convert(&self, request: &ConvertRequest) -> SubmissionOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ConvertResponse {
                converted: request.text.to_uppercase(),
            })
        }

        async fn health(&self) -> Result<HealthStatus, ServiceError> {
            Err(ServiceError::Transport("offline".to_string()))
        }
    }

    struct NullClipboard;

    impl ClipboardWriter for NullClipboard {
        fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_no_pending_submission_never_resolves() {
        let mut submissions = Submissions::new(Arc::new(ShoutingService::default()));
        let waited = tokio::time::timeout(Duration::from_millis(20), submissions.next_outcome()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_finished_submission_settles_once_and_clears() {
        let service = Arc::new(ShoutingService::default());
        let mut submissions = Submissions::new(service.clone());
        let mut app = App::new(&Config::default());
        app.insert_str("hello");

        submissions.dispatch(&mut app, Action::Submit, &mut NullClipboard, Instant::now());
        submissions.dispatch(&mut app, Action::Submit, &mut NullClipboard, Instant::now());
        assert!(submissions.pending.is_some());
        assert!(app.state.is_submitting());

        let outcome = submissions.next_outcome().await;
        submissions.settle(&mut app, outcome);

        assert!(submissions.pending.is_none());
        assert_eq!(app.state.success_text(), Some("HELLO"));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);

        let again = tokio::time::timeout(Duration::from_millis(20), submissions.next_outcome()).await;
        assert!(again.is_err());
    }

    #[tokio::test]
    async fn test_blank_submit_spawns_nothing() {
        let service = Arc::new(ShoutingService::default());
        let mut submissions = Submissions::new(service.clone());
        let mut app = App::new(&Config::default());

        submissions.dispatch(&mut app, Action::Submit, &mut NullClipboard, Instant::now());

        assert!(submissions.pending.is_none());
        assert!(app.alert.is_some());
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }
}
