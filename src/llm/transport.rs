//! HTTP Transport for the enhancement adapter
//!
//! Concrete transport enum so adapters stay non-generic.

pub use crate::llm::transport_fake::{FakeTransport, RecordedRequest};
pub use crate::llm::transport_reqwest::ReqwestTransport;
pub use crate::llm::transport_types::{AdapterError, HttpTransport};

use async_trait::async_trait;

/// Concrete transport enum
#[derive(Debug)]
pub enum Transport {
    Real(ReqwestTransport),
    Fake(FakeTransport),
}

#[async_trait]
impl HttpTransport for Transport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, AdapterError> {
        match self {
            Transport::Real(t) => t.post_json(url, headers, body).await,
            Transport::Fake(t) => t.post_json(url, headers, body).await,
        }
    }
}

impl Transport {
    /// Fake transport, if this is one (test inspection)
    pub fn as_fake(&self) -> Option<&FakeTransport> {
        match self {
            Transport::Fake(t) => Some(t),
            Transport::Real(_) => None,
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Transport::Real(ReqwestTransport::new())
    }
}
