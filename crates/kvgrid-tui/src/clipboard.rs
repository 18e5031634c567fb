//! System clipboard access
//!
//! Lazily opens the platform clipboard on first copy. On headless systems
//! (no display server or pasteboard daemon) opening fails; the handle stays
//! empty and every copy reports the error.

use kvgrid_core::prelude::*;

/// Lazily-initialized system clipboard handle.
#[derive(Default)]
pub struct Clipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `text` to the system clipboard, opening it on first use.
    pub fn copy(&mut self, text: &str) -> Result<()> {
        let clipboard = match self.inner.as_mut() {
            Some(clipboard) => clipboard,
            None => {
                let clipboard = arboard::Clipboard::new()
                    .map_err(|e| Error::terminal(format!("failed to access clipboard: {e}")))?;
                self.inner.insert(clipboard)
            }
        };
        clipboard
            .set_text(text)
            .map_err(|e| Error::terminal(format!("failed to copy: {e}")))
    }
}
