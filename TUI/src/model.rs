use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::service::ConvertRequest;

/// Who the converted text is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    Boss,
    Colleague,
    Client,
}

impl Audience {
    pub const ALL: [Audience; 3] = [Audience::Boss, Audience::Colleague, Audience::Client];

    /// Identifier sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Boss => "boss",
            Audience::Colleague => "colleague",
            Audience::Client => "client",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Audience::Boss => "Boss",
            Audience::Colleague => "Colleague",
            Audience::Client => "Client",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Audience::Boss => Audience::Colleague,
            Audience::Colleague => Audience::Client,
            Audience::Client => Audience::Boss,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Audience::Boss => Audience::Client,
            Audience::Colleague => Audience::Boss,
            Audience::Client => Audience::Colleague,
        }
    }
}

impl std::str::FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boss" => Ok(Audience::Boss),
            "colleague" => Ok(Audience::Colleague),
            "client" => Ok(Audience::Client),
            other => Err(format!(
                "Unknown audience: {}. Expected one of boss, colleague, client",
                other
            )),
        }
    }
}

/// The text being edited plus the selected audience.
#[derive(Debug, Clone, Default)]
pub struct RequestDraft {
    pub text: String,
    pub target: Audience,
}

impl RequestDraft {
    pub fn new(target: Audience) -> Self {
        Self {
            text: String::new(),
            target,
        }
    }

    /// Length as shown by the counter (Unicode scalar values)
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Read-only copy of the draft taken at submission time
    pub fn snapshot(&self) -> ConvertRequest {
        ConvertRequest {
            text: self.text.trim().to_string(),
            target: self.target,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub text: String,
    pub kind: ResultKind,
    pub received_at: DateTime<Local>,
}

impl ConversionResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ResultKind::Success,
            received_at: Local::now(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ResultKind::Error,
            received_at: Local::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == ResultKind::Success
    }
}

#[derive(Debug, Clone, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Submitting,
    Displayed(ConversionResult),
}

impl InteractionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, InteractionState::Submitting)
    }

    /// The result currently on screen, if it is a successful one
    pub fn success_text(&self) -> Option<&str> {
        match self {
            InteractionState::Displayed(result) if result.is_success() => Some(result.text.as_str()),
            _ => None,
        }
    }
}
