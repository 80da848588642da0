use arboard::Clipboard;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    Write(String),
}

pub trait ClipboardWriter {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard, opened on first use.
///
/// The handle is kept for the lifetime of the app: on X11 and Wayland the
/// copied text is only served while the owning handle is alive.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&mut Clipboard, ClipboardError> {
        if self.inner.is_none() {
            let clipboard =
                Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            self.inner = Some(clipboard);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| ClipboardError::Unavailable("not initialized".to_string()))
    }
}

impl ClipboardWriter for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let result = self.handle()?.set_text(text.to_string());
        if let Err(e) = result {
            // Drop the handle so the next attempt reopens it
            self.inner = None;
            return Err(ClipboardError::Write(e.to_string()));
        }
        Ok(())
    }
}
