//! The external card generation service.
//!
//! The service is opaque: it takes a study material payload and a question
//! count and answers with question/answer pairs, or fails. The orchestrator
//! only sees the [`GenerationService`] trait; [`HttpGenerationService`] is the
//! JSON-over-HTTP client used by the binary.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::card::Card;
use crate::config::Config;
use crate::error::{Error, Result};

/// A request for cards from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// The document as a base64 data URI.
    pub study_material: String,
    /// How many cards to generate.
    pub number_of_questions: u32,
}

/// The cards generated for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    /// Generated cards, in the order the service produced them.
    pub question_cards: Vec<Card>,
}

/// Something that turns study material into cards.
#[async_trait]
pub trait GenerationService: Send + Sync + std::fmt::Debug {
    /// Generate cards for one document.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be reached, rejects the
    /// request, or answers with something that is not a card list.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse>;
}

/// Generation service reached over HTTP.
///
/// The request JSON is POSTed to the endpoint and the response body is
/// parsed as a [`GenerationResponse`].
#[derive(Debug, Clone)]
pub struct HttpGenerationService {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    api_key: Option<String>,
}

impl HttpGenerationService {
    /// Create a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL or the HTTP
    /// client cannot be built.
    pub fn new(endpoint: &str, timeout: Duration, api_key: Option<String>) -> Result<Self> {
        let endpoint = reqwest::Url::parse(endpoint).map_err(|e| Error::ConfigValidation {
            message: format!("invalid generation endpoint {endpoint}: {e}"),
        })?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("studybuddy/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    /// Create a client from the `[generation]` configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no endpoint is configured or the client cannot be
    /// built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint =
            config
                .generation
                .endpoint
                .as_deref()
                .ok_or_else(|| Error::ConfigValidation {
                    message: "generation.endpoint is not set".to_string(),
                })?;
        Self::new(
            endpoint,
            config.generation_timeout(),
            config.generation.api_key.clone(),
        )
    }

    /// Get the endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        debug!(
            "Requesting {} cards from {}",
            request.number_of_questions, self.endpoint
        );

        let mut builder = self.client.post(self.endpoint.clone()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::generation(format!("service returned {status}")));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| Error::generation(format!("unexpected response: {e}")))
    }
}
