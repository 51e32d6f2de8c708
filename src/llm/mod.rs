//! Enhancement Client
//!
//! Stateless rewrite call: (key, draft) → enhanced text or a classified error.
//! The Session Controller talks to it only through the `Enhancer` trait.

pub mod classify;
pub mod errors;
pub mod gemini;
pub mod prompts;
pub mod transport;
pub mod transport_fake;
pub mod transport_reqwest;
pub mod transport_types;

// Re-export common types
pub use classify::{classify, classify_message, Classifier};
pub use errors::EnhanceError;
pub use gemini::{GeminiAdapter, Sampling};
pub use transport::{AdapterError, FakeTransport, HttpTransport, Transport};

use crate::session::credential::ApiKey;
use async_trait::async_trait;

/// Prompt enhancement backend
///
/// Preconditions (non-blank draft, present key) are checked by the caller.
#[async_trait]
pub trait Enhancer: Send + Sync {
    /// Rewrite `draft`, returning the model text verbatim
    async fn enhance(&self, key: &ApiKey, draft: &str) -> Result<String, EnhanceError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}
