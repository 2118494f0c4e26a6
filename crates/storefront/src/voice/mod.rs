//! Voice ordering.
//!
//! The browser transcribes speech and posts the text. On the server a
//! transcript goes through three stages:
//!
//! 1. [`normalize`] lowercases it and strips punctuation and politeness fillers
//! 2. [`classify`] tries an ordered list of regular expressions and returns
//!    the first [`VoiceCommand`] that matches
//! 3. [`Executor`] applies the command to the cart, or hands the transcript
//!    to the [`Assistant`] when no rule matched
//!
//! The assistant is the only path that adds items: picking a product out of
//! free speech ("dua jus mangga yang besar") is left to the backend model.

mod assistant;
mod executor;
mod matcher;

pub use assistant::Assistant;
pub use executor::Executor;
pub use matcher::{classify, normalize};

use serde::Serialize;
use thiserror::Error;

use crate::backend::{ApiError, ProductSort};

/// Longest transcript accepted, in characters.
pub const MAX_TRANSCRIPT_CHARS: usize = 500;

/// Menu ordering requested by voice.
pub type SortOrder = ProductSort;

/// Errors from voice handling.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Transcript is empty")]
    EmptyTranscript,

    #[error("Transcript is longer than {max} characters")]
    TranscriptTooLong { max: usize },

    #[error("Assistant unavailable: {0}")]
    Assistant(#[from] ApiError),
}

/// A page reachable by voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Menu,
    Cart,
    Orders,
    Profile,
}

impl Page {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Menu => "/menu",
            Self::Cart => "/cart",
            Self::Orders => "/account/orders",
            Self::Profile => "/account",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "the home page",
            Self::Menu => "the menu",
            Self::Cart => "your cart",
            Self::Orders => "your orders",
            Self::Profile => "your profile",
        }
    }
}

/// A command recognised from a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCommand {
    Navigate(Page),
    ClearCart,
    Checkout,
    Sort(SortOrder),
    Filter { category: String },
    RemoveFromCart { item: String, quantity: Option<u32> },
    Search { query: String },
}

impl VoiceCommand {
    #[must_use]
    pub const fn intent(&self) -> VoiceIntent {
        match self {
            Self::Navigate(_) => VoiceIntent::Navigate,
            Self::ClearCart => VoiceIntent::ClearCart,
            Self::Checkout => VoiceIntent::Checkout,
            Self::Sort(_) => VoiceIntent::Sort,
            Self::Filter { .. } => VoiceIntent::Filter,
            Self::RemoveFromCart { .. } => VoiceIntent::RemoveFromCart,
            Self::Search { .. } => VoiceIntent::Search,
        }
    }
}

/// What a transcript ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceIntent {
    Navigate,
    ClearCart,
    Checkout,
    Sort,
    Filter,
    RemoveFromCart,
    Search,
    /// The assistant added at least one item.
    AddToCart,
    /// The assistant answered without adding anything.
    Assistant,
    /// Nothing could be resolved.
    Unknown,
}

impl VoiceIntent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Navigate => "navigate",
            Self::ClearCart => "clear_cart",
            Self::Checkout => "checkout",
            Self::Sort => "sort",
            Self::Filter => "filter",
            Self::RemoveFromCart => "remove_from_cart",
            Self::Search => "search",
            Self::AddToCart => "add_to_cart",
            Self::Assistant => "assistant",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for VoiceIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result returned to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceOutcome {
    pub intent: VoiceIntent,
    /// Text to show (and speak) to the visitor.
    pub message: String,
    /// Where the browser should go next, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    /// Whether the cart was modified, so the badge can refresh.
    pub cart_changed: bool,
}

impl VoiceOutcome {
    pub(crate) fn new(intent: VoiceIntent, message: impl Into<String>) -> Self {
        Self {
            intent,
            message: message.into(),
            redirect: None,
            cart_changed: false,
        }
    }

    pub(crate) fn with_redirect(mut self, path: impl Into<String>) -> Self {
        self.redirect = Some(path.into());
        self
    }

    pub(crate) const fn with_cart_changed(mut self, changed: bool) -> Self {
        self.cart_changed = changed;
        self
    }

    /// The fixed reply when nothing matched and the assistant could not help.
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(
            VoiceIntent::Unknown,
            "Sorry, I didn't catch that. Try \"open the menu\" or \"search mango juice\".",
        )
    }
}

/// Validate a raw transcript before classification.
///
/// # Errors
///
/// Returns `VoiceError::EmptyTranscript` for blank input and
/// `VoiceError::TranscriptTooLong` past [`MAX_TRANSCRIPT_CHARS`].
pub fn validate_transcript(transcript: &str) -> Result<&str, VoiceError> {
    let trimmed = transcript.trim();
    if trimmed.is_empty() {
        return Err(VoiceError::EmptyTranscript);
    }
    if trimmed.chars().count() > MAX_TRANSCRIPT_CHARS {
        return Err(VoiceError::TranscriptTooLong {
            max: MAX_TRANSCRIPT_CHARS,
        });
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_transcript() {
        assert!(matches!(
            validate_transcript("   "),
            Err(VoiceError::EmptyTranscript)
        ));
        assert!(matches!(
            validate_transcript(&"a".repeat(MAX_TRANSCRIPT_CHARS + 1)),
            Err(VoiceError::TranscriptTooLong { .. })
        ));
        assert_eq!(validate_transcript("  buka menu ").ok(), Some("buka menu"));
    }

    #[test]
    fn test_outcome_serializes_without_empty_redirect() {
        let json = serde_json::to_value(VoiceOutcome::unknown()).ok();
        let json = json.as_ref().and_then(|v| v.as_object());
        assert!(json.is_some_and(|o| !o.contains_key("redirect")));
        assert!(json.is_some_and(|o| o["intent"] == "unknown"));
    }

    #[test]
    fn test_page_paths() {
        assert_eq!(Page::Home.path(), "/");
        assert_eq!(Page::Orders.path(), "/account/orders");
        assert_eq!(
            VoiceCommand::Navigate(Page::Cart).intent().as_str(),
            "navigate"
        );
    }
}
