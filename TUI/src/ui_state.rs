//! Everything the renderer shows, derived from controller state.
//!
//! Nothing here mutates. Widgets never track their own enabled/visible flags,
//! so leaving `Submitting` re-enables the submit control on every path.

use std::time::Instant;

use crate::app::{App, SUBMITTING_PLACEHOLDER};
use crate::config::SOFT_LIMIT;
use crate::model::{InteractionState, ResultKind};

pub const IDLE_HINT: &str = "Your converted text will appear here.";

/// How the output panel lays out its text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPresentation {
    /// Centered and muted (idle hint, in-progress placeholder)
    Placeholder,
    /// Left-aligned result text
    Normal,
    /// Centered, error-colored
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterView {
    pub label: String,
    pub warning: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceFlags {
    pub submit_enabled: bool,
    pub loader_visible: bool,
    pub copy_enabled: bool,
    pub feedback_visible: bool,
    pub output: OutputPresentation,
}

#[derive(Debug, Clone)]
pub struct FormView<'a> {
    pub counter: CounterView,
    pub flags: SurfaceFlags,
    pub output_text: &'a str,
    pub toast_visible: bool,
    pub alert: Option<&'a str>,
}

pub fn counter_view(length: usize) -> CounterView {
    CounterView {
        label: format!("{}/{}", length, SOFT_LIMIT),
        warning: length > SOFT_LIMIT,
    }
}

pub fn surface_flags(state: &InteractionState) -> SurfaceFlags {
    match state {
        InteractionState::Idle => SurfaceFlags {
            submit_enabled: true,
            loader_visible: false,
            copy_enabled: false,
            feedback_visible: false,
            output: OutputPresentation::Placeholder,
        },
        InteractionState::Submitting => SurfaceFlags {
            submit_enabled: false,
            loader_visible: true,
            copy_enabled: false,
            feedback_visible: false,
            output: OutputPresentation::Placeholder,
        },
        InteractionState::Displayed(result) => {
            let success = result.kind == ResultKind::Success;
            SurfaceFlags {
                submit_enabled: true,
                loader_visible: false,
                copy_enabled: success,
                feedback_visible: success,
                output: if success {
                    OutputPresentation::Normal
                } else {
                    OutputPresentation::Error
                },
            }
        }
    }
}

pub fn output_text(state: &InteractionState) -> &str {
    match state {
        InteractionState::Idle => IDLE_HINT,
        InteractionState::Submitting => SUBMITTING_PLACEHOLDER,
        InteractionState::Displayed(result) => result.text.as_str(),
    }
}

pub fn form_view(app: &App, now: Instant) -> FormView<'_> {
    FormView {
        counter: counter_view(app.char_count()),
        flags: surface_flags(&app.state),
        output_text: output_text(&app.state),
        toast_visible: app.toast.is_visible(now),
        alert: app.alert.as_deref(),
    }
}
