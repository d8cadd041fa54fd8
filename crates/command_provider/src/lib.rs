//! Minimal contract for asynchronous "command" suggestions.
//!
//! A command suggestion does not insert a mention. It inserts a transient
//! placeholder, awaits a generator, and replaces the placeholder with the
//! generated text (or a fixed failure string). This crate defines only the
//! generator contract and the strings the editor shows around it; transports
//! and stubs live in separate crates.

use thiserror::Error;

pub use futures_util::future::BoxFuture;

/// Placeholder shown while a generator is running.
pub const DEFAULT_PLACEHOLDER: &str = "🤔 Thinking of a joke...";
/// Prefix prepended to a successful result.
pub const DEFAULT_SUCCESS_PREFIX: &str = "😄 ";
/// Text that replaces the placeholder when generation fails.
pub const DEFAULT_FAILURE_TEXT: &str = "❌ Failed to generate joke";

/// Error reported by a generator. Never retried by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("command generation failed: {0}")]
    Failed(String),

    #[error("command generator has nothing to offer")]
    Unavailable,
}

impl CommandError {
    /// Creates a generic failure with a message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Strings the editor writes into the document around one command run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPresentation {
    pub placeholder: String,
    pub success_prefix: String,
    pub failure_text: String,
}

impl CommandPresentation {
    #[must_use]
    pub fn new(
        placeholder: impl Into<String>,
        success_prefix: impl Into<String>,
        failure_text: impl Into<String>,
    ) -> Self {
        Self {
            placeholder: placeholder.into(),
            success_prefix: success_prefix.into(),
            failure_text: failure_text.into(),
        }
    }

    /// Text that replaces the placeholder for a finished run.
    #[must_use]
    pub fn replacement_for(&self, result: &Result<String, CommandError>) -> String {
        match result {
            Ok(text) => format!("{}{}", self.success_prefix, text),
            Err(_) => self.failure_text.clone(),
        }
    }
}

impl Default for CommandPresentation {
    fn default() -> Self {
        Self::new(
            DEFAULT_PLACEHOLDER,
            DEFAULT_SUCCESS_PREFIX,
            DEFAULT_FAILURE_TEXT,
        )
    }
}

/// Asynchronous text generator backing a command suggestion.
///
/// Implementations must be interchangeable: a local stub and a remote call
/// satisfy the same contract. The returned future owns everything it needs so
/// the editor can keep accepting edits while it is pending. There is no
/// cancellation; a started run always resolves to one outcome.
pub trait CommandGenerator: Send + Sync {
    fn generate(&self) -> BoxFuture<'static, Result<String, CommandError>>;

    fn presentation(&self) -> CommandPresentation {
        CommandPresentation::default()
    }
}
