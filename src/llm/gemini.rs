//! Gemini adapter
//!
//! Builds a single `generateContent` request carrying the fixed system
//! instruction, the draft as the user turn and fixed sampling parameters,
//! then returns the generated text verbatim.

use crate::config::LlmSettings;
use crate::llm::classify::{classify, Classifier};
use crate::llm::errors::EnhanceError;
use crate::llm::prompts;
use crate::llm::transport::{HttpTransport, ReqwestTransport, Transport};
use crate::llm::transport_types::AdapterError;
use crate::llm::Enhancer;
use crate::session::credential::ApiKey;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Default nucleus-sampling threshold
pub const DEFAULT_TOP_P: f32 = 0.95;

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: Option<bool>,
}

/// Gemini `generateContent` adapter
#[derive(Debug)]
pub struct GeminiAdapter {
    base_url: String,
    model: String,
    sampling: Sampling,
    transport: Transport,
    classifier: Classifier,
}

impl GeminiAdapter {
    /// Create adapter with the real transport
    pub fn new(base_url: String, model: String, sampling: Sampling) -> Self {
        Self::with_transport(
            base_url,
            model,
            sampling,
            Transport::Real(ReqwestTransport::new()),
        )
    }

    /// Create adapter with custom transport (for testing)
    pub fn with_transport(
        base_url: String,
        model: String,
        sampling: Sampling,
        transport: Transport,
    ) -> Self {
        Self {
            base_url,
            model,
            sampling,
            transport,
            classifier: classify,
        }
    }

    /// Create adapter from configuration
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, AdapterError> {
        let transport = match settings.request_timeout_secs {
            Some(secs) => ReqwestTransport::with_timeout(secs)?,
            None => ReqwestTransport::new(),
        };
        Ok(Self::with_transport(
            settings.base_url.clone(),
            settings.model.clone(),
            Sampling {
                temperature: settings.temperature,
                top_p: settings.top_p,
            },
            Transport::Real(transport),
        ))
    }

    /// Replace the error classifier
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Get model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get sampling parameters
    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    /// Get transport
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Full `generateContent` URL for the configured model
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Build request body
    pub fn build_request(&self, draft: &str) -> Result<String, AdapterError> {
        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![RequestPart {
                    text: prompts::system_instruction().to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![RequestPart {
                    text: prompts::user_message(draft),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.sampling.temperature,
                top_p: self.sampling.top_p,
            },
        };
        Ok(serde_json::to_string(&request)?)
    }
}

/// Concatenate the non-thought text parts of the first candidate
pub fn extract_text(response: &str) -> Result<String, AdapterError> {
    let parsed: GenerateContentResponse = serde_json::from_str(response)?;
    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|p| p.thought != Some(true))
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    Ok(text)
}

#[async_trait]
impl Enhancer for GeminiAdapter {
    async fn enhance(&self, key: &ApiKey, draft: &str) -> Result<String, EnhanceError> {
        let url = self.endpoint();
        let body = self
            .build_request(draft)
            .map_err(|e| (self.classifier)(&e))?;
        debug!(model = %self.model, draft_len = draft.len(), "sending enhancement request");

        let headers = [
            (API_KEY_HEADER, key.expose()),
            ("Content-Type", "application/json"),
        ];

        let response = self
            .transport
            .post_json(&url, &headers, &body)
            .await
            .map_err(|e| {
                let classified = (self.classifier)(&e);
                warn!(error = %e, classified = ?classified, "enhancement request failed");
                classified
            })?;

        let text = extract_text(&response).map_err(|e| {
            warn!(error = %e, "unreadable enhancement response");
            (self.classifier)(&e)
        })?;

        if text.is_empty() {
            warn!("enhancement response carried no text");
            return Err(EnhanceError::EmptyResponse);
        }

        info!(chars = text.chars().count(), "enhancement received");
        Ok(text)
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}
