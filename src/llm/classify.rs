//! Upstream error classification
//!
//! Maps a raw transport/API failure to one of the user-facing outcomes.
//! The upstream API has no stable error-code contract, so the default
//! classifier looks at the HTTP status first and then falls back to
//! substring matching on the message. New upstream wording can slip through
//! to `Unknown`.

use crate::llm::errors::EnhanceError;
use crate::llm::transport_types::AdapterError;

/// Pluggable classifier signature
pub type Classifier = fn(&AdapterError) -> EnhanceError;

const AUTH_MARKERS: &[&str] = &["401", "API_KEY_INVALID", "UNAUTHENTICATED"];
const RATE_LIMIT_MARKERS: &[&str] = &["429", "RESOURCE_EXHAUSTED"];

/// Default classifier
pub fn classify(err: &AdapterError) -> EnhanceError {
    match err.status() {
        Some(401) => return EnhanceError::InvalidCredential,
        Some(429) => return EnhanceError::RateLimited,
        _ => {}
    }

    // Only server-originated text is matched against the markers; parse and
    // config errors carry our own wording (byte offsets, column numbers).
    match err {
        AdapterError::Json(_) | AdapterError::Configuration(_) => {
            return EnhanceError::Unknown(err.to_string());
        }
        AdapterError::Network(_) | AdapterError::Http { .. } => {}
    }

    let raw = err.to_string();
    match classify_message(&raw) {
        EnhanceError::Unknown(_) => EnhanceError::Unknown(readable_message(err)),
        known => known,
    }
}

/// Classify purely on message text
pub fn classify_message(raw: &str) -> EnhanceError {
    if AUTH_MARKERS.iter().any(|m| raw.contains(m)) {
        EnhanceError::InvalidCredential
    } else if RATE_LIMIT_MARKERS.iter().any(|m| raw.contains(m)) {
        EnhanceError::RateLimited
    } else {
        EnhanceError::Unknown(raw.to_string())
    }
}

/// Prefer the `error.message` field of a JSON error body over the raw dump
fn readable_message(err: &AdapterError) -> String {
    if let AdapterError::Http { status, message } = err {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(message) {
            if let Some(inner) = json["error"]["message"].as_str() {
                return format!("HTTP error {}: {}", status, inner);
            }
        }
    }
    err.to_string()
}
