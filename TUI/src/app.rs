use std::sync::Arc;
use std::time::Instant;

use tokio::task::{JoinError, JoinHandle};

use crate::action::Action;
use crate::clipboard::ClipboardWriter;
use crate::config::{Config, SOFT_LIMIT};
use crate::model::{ConversionResult, InteractionState, RequestDraft};
use crate::service::{
    ConversionService, ConvertRequest, ConvertResponse, HealthStatus, ServiceError,
};
use crate::toast::Toast;

pub const SUBMITTING_PLACEHOLDER: &str = "Converting...";
pub const ERROR_FALLBACK: &str = "Something went wrong. Please try again in a moment.";
pub const EMPTY_INPUT_PROMPT: &str = "Please enter some text to convert.";
pub const COPY_FAILED_MESSAGE: &str = "Failed to copy to clipboard.";

pub type SubmissionOutcome = Result<ConvertResponse, ServiceError>;
pub type Submission = JoinHandle<SubmissionOutcome>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServiceHealth {
    #[default]
    Unknown,
    Healthy,
    Unreachable(String),
}

impl ServiceHealth {
    pub fn from_probe(probe: Result<HealthStatus, ServiceError>) -> Self {
        match probe {
            Ok(status) if status.is_healthy() => ServiceHealth::Healthy,
            Ok(status) => ServiceHealth::Unreachable(format!("status {}", status.status)),
            Err(ServiceError::Service { status, .. }) => {
                ServiceHealth::Unreachable(format!("HTTP {}", status))
            }
            Err(ServiceError::Transport(_)) => ServiceHealth::Unreachable("no connection".to_string()),
            Err(ServiceError::Malformed(_)) => ServiceHealth::Unreachable("bad response".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// A request is already in flight
    Busy,
    /// Nothing but whitespace to convert
    EmptyInput,
}

/// The conversion form controller. Owns every piece of interactive state.
pub struct App {
    pub draft: RequestDraft,
    pub state: InteractionState,
    pub toast: Toast,
    /// Blocking notice; swallows input until dismissed
    pub alert: Option<String>,
    pub service_health: ServiceHealth,
    pub server_url: String,
    pub animation_frame: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            draft: RequestDraft::new(config.default_target),
            state: InteractionState::Idle,
            toast: Toast::default(),
            alert: None,
            service_health: ServiceHealth::Unknown,
            server_url: config.server_url.clone(),
            animation_frame: 0,
            should_quit: false,
        }
    }

    /// Apply one user action. Returns the request to send when a submission
    /// was accepted.
    pub fn handle_action(
        &mut self,
        action: Action,
        clipboard: &mut dyn ClipboardWriter,
        now: Instant,
    ) -> Option<ConvertRequest> {
        if self.alert.is_some() {
            match action {
                Action::Escape | Action::Submit => self.dismiss_alert(),
                Action::Quit => self.should_quit = true,
                _ => {}
            }
            return None;
        }

        match action {
            Action::Insert(c) => self.insert_char(c),
            Action::Paste(text) => self.insert_str(&text),
            Action::Newline => self.insert_char('\n'),
            Action::Backspace => self.backspace(),
            Action::NextTarget => self.cycle_target(true),
            Action::PrevTarget => self.cycle_target(false),
            Action::Submit => return self.begin_submission().ok(),
            Action::Copy => {
                self.copy_result(clipboard, now);
            }
            Action::Escape => {
                if self.draft.text.is_empty() {
                    self.should_quit = true;
                } else {
                    self.clear_input();
                }
            }
            Action::Quit => self.should_quit = true,
        }
        None
    }

    pub fn insert_char(&mut self, c: char) {
        self.draft.text.push(c);
    }

    /// Paste keeps line breaks but drops carriage returns
    pub fn insert_str(&mut self, text: &str) {
        self.draft.text.extend(text.chars().filter(|c| *c != '\r'));
    }

    pub fn backspace(&mut self) {
        self.draft.text.pop();
    }

    pub fn clear_input(&mut self) {
        self.draft.text.clear();
    }

    pub fn cycle_target(&mut self, forward: bool) {
        self.draft.target = if forward {
            self.draft.target.next()
        } else {
            self.draft.target.prev()
        };
    }

    pub fn char_count(&self) -> usize {
        self.draft.char_count()
    }

    pub fn over_limit(&self) -> bool {
        self.char_count() > SOFT_LIMIT
    }

    /// Validate the draft and enter `Submitting`.
    ///
    /// The soft limit is advisory only; long drafts are still sent.
    pub fn begin_submission(&mut self) -> Result<ConvertRequest, SubmitRejected> {
        if self.state.is_submitting() {
            return Err(SubmitRejected::Busy);
        }
        if self.draft.is_blank() {
            self.alert = Some(EMPTY_INPUT_PROMPT.to_string());
            return Err(SubmitRejected::EmptyInput);
        }

        let request = self.draft.snapshot();
        tracing::info!(
            target_audience = request.target.as_str(),
            chars = request.text.chars().count(),
            over_limit = self.over_limit(),
            "submitting conversion"
        );
        self.state = InteractionState::Submitting;
        Ok(request)
    }

    /// Leave `Submitting` with the outcome of the request.
    pub fn settle(&mut self, outcome: SubmissionOutcome) {
        if !self.state.is_submitting() {
            tracing::warn!("ignoring conversion outcome received outside of a submission");
            return;
        }

        self.state = match outcome {
            Ok(response) => {
                tracing::info!(chars = response.converted.chars().count(), "conversion succeeded");
                InteractionState::Displayed(ConversionResult::success(response.converted))
            }
            Err(err) => {
                tracing::error!(error = %err, "conversion failed");
                self.alert = Some(err.user_message().to_string());
                InteractionState::Displayed(ConversionResult::error(ERROR_FALLBACK))
            }
        };
    }

    /// Copy the displayed result. Does nothing unless a successful result is shown.
    pub fn copy_result(&mut self, clipboard: &mut dyn ClipboardWriter, now: Instant) -> bool {
        let Some(text) = self.state.success_text() else {
            return false;
        };

        match clipboard.write_text(text) {
            Ok(()) => {
                tracing::debug!("copied result to clipboard");
                self.toast.trigger(now);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to copy result");
                self.alert = Some(COPY_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn set_service_health(&mut self, health: ServiceHealth) {
        self.service_health = health;
    }

    pub fn tick(&mut self, now: Instant) {
        self.animation_frame = (self.animation_frame + 1) % 360;
        self.toast.tick(now);
    }
}

/// Run one conversion request on its own task
pub fn spawn_submission(service: Arc<dyn ConversionService>, request: ConvertRequest) -> Submission {
    tokio::spawn(async move { service.convert(&request).await })
}

/// A task that panicked or was aborted still settles the form, as a transport fault
pub fn join_outcome(joined: Result<SubmissionOutcome, JoinError>) -> SubmissionOutcome {
    joined.unwrap_or_else(|e| Err(ServiceError::Transport(format!("Conversion task failed: {}", e))))
}
