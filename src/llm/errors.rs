//! Enhancement errors
//!
//! `Display` of each variant is the exact text shown to the user.

/// Message used when an upstream failure carries no text
pub const GENERIC_FAILURE: &str = "An unexpected error occurred while enhancing the prompt.";

/// Classified enhancement failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnhanceError {
    /// Draft was empty or whitespace-only (caller-side precondition)
    #[error("Please enter a draft prompt first.")]
    EmptyDraft,

    /// No credential present (caller-side precondition)
    #[error("No API key set. Unlock the workspace first.")]
    MissingCredential,

    /// Upstream rejected the credential
    #[error("Invalid API Key. Please reset and try again.")]
    InvalidCredential,

    /// Upstream throttled the request
    #[error("Rate limit exceeded. Please wait a moment.")]
    RateLimited,

    /// Upstream answered without any text
    #[error("The AI returned an empty response.")]
    EmptyResponse,

    /// Anything else, carrying the upstream message
    #[error("{}", unknown_message(.0))]
    Unknown(String),
}

fn unknown_message(raw: &str) -> &str {
    if raw.trim().is_empty() {
        GENERIC_FAILURE
    } else {
        raw
    }
}
