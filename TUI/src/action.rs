use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// User actions the form reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Type a character into the draft
    Insert(char),
    /// Bracketed paste
    Paste(String),
    Newline,
    Backspace,
    /// Select the next audience
    NextTarget,
    PrevTarget,
    /// Convert the draft, or dismiss an open alert
    Submit,
    /// Copy the displayed result
    Copy,
    /// Dismiss alert, else clear input, else quit
    Escape,
    Quit,
}

impl Action {
    pub fn from_event(event: Event) -> Option<Action> {
        match event {
            Event::Key(key) => Action::from_key(key),
            Event::Paste(text) => Some(Action::Paste(text)),
            _ => None,
        }
    }

    pub fn from_key(key: KeyEvent) -> Option<Action> {
        // Windows reports releases too
        if key.kind == KeyEventKind::Release {
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('c') if ctrl => Some(Action::Quit),
            KeyCode::Char('y') if ctrl => Some(Action::Copy),
            KeyCode::Char(_) if ctrl => None,
            KeyCode::Char(c) => Some(Action::Insert(c)),
            KeyCode::Enter if alt || key.modifiers.contains(KeyModifiers::SHIFT) => {
                Some(Action::Newline)
            }
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Tab => Some(Action::NextTarget),
            KeyCode::BackTab => Some(Action::PrevTarget),
            KeyCode::Esc => Some(Action::Escape),
            _ => None,
        }
    }
}
