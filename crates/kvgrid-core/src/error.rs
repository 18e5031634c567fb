//! Application error types with rich context

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Terminal/TUI Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Terminal error: {message}")]
    Terminal { message: String },

    #[error("Failed to initialize terminal: {0}")]
    TerminalInit(String),

    // ─────────────────────────────────────────────────────────────
    // Value/Reconciliation Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Malformed value: {reason}")]
    MalformedValue { reason: String },

    #[error("Cannot repeat non-numeric first cell: {text:?}")]
    UnparseableRepeat { text: String },

    // ─────────────────────────────────────────────────────────────
    // Store Connection Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Store connection error: {message}")]
    Store { message: String },

    #[error("Store protocol error: {message}")]
    Protocol { message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ─────────────────────────────────────────────────────────────
    // Channel/Communication Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Channel send error: {message}")]
    ChannelSend { message: String },

    #[error("Channel closed unexpectedly")]
    ChannelClosed,
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn terminal(message: impl Into<String>) -> Self {
        Self::Terminal {
            message: message.into(),
        }
    }

    pub fn malformed_value(reason: impl Into<String>) -> Self {
        Self::MalformedValue {
            reason: reason.into(),
        }
    }

    pub fn unparseable_repeat(text: impl Into<String>) -> Self {
        Self::UnparseableRepeat { text: text.into() }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn channel_send(message: impl Into<String>) -> Self {
        Self::ChannelSend {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error.
    ///
    /// Recoverable errors are local and non-fatal: a malformed pair skips
    /// that pair, a failed repeat aborts that command, a dropped store
    /// connection stops updates but leaves the UI running.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::MalformedValue { .. }
                | Error::UnparseableRepeat { .. }
                | Error::Store { .. }
                | Error::Protocol { .. }
                | Error::ChannelSend { .. }
        )
    }

    /// Check if this error should trigger application exit
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::TerminalInit(_) | Error::Config { .. })
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::malformed_value("not a string or matrix");
        assert_eq!(err.to_string(), "Malformed value: not a string or matrix");

        let err = Error::unparseable_repeat("abc");
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_recoverable() {
        assert!(Error::malformed_value("bad").is_recoverable());
        assert!(Error::unparseable_repeat("abc").is_recoverable());
        assert!(Error::store("connection lost").is_recoverable());
        assert!(!Error::TerminalInit("no tty".into()).is_recoverable());
    }

    #[test]
    fn test_error_is_fatal() {
        assert!(Error::TerminalInit("no tty".into()).is_fatal());
        assert!(Error::config("bad toml").is_fatal());
        assert!(!Error::store("test").is_fatal());
    }
}
