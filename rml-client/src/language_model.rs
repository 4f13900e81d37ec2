use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rml::basic_models::{DEFAULT_MAX_RESPONSE_LENGTH, DEFAULT_RANDOMNESS};
use rml::GenerationRequest;
use serde::{Deserialize, Serialize};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;

use crate::config::PalmConfig;
use crate::errors::{LmError, LmResult};

/// Anything that turns a prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> LmResult<String>;
}

/// Backoff between attempts: roughly 100ms, 200ms, 400ms, ... capped at 10s.
fn default_retry(max_retries: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(50)
        .max_delay(Duration::from_secs(10))
        .map(jitter)
        .take(max_retries)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateTextRequest<'a> {
    prompt: TextPrompt<'a>,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct TextPrompt<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateTextResponse {
    #[serde(default)]
    candidates: Vec<TextCompletion>,
    #[serde(default)]
    filters: Vec<ContentFilter>,
}

#[derive(Debug, Deserialize)]
struct TextCompletion {
    #[serde(default)]
    output: String,
}

#[derive(Debug, Deserialize)]
struct ContentFilter {
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for the hosted text-generation model.
///
/// Holds its own credentials and HTTP connection pool. Nothing is shared
/// between instances.
pub struct PalmLanguageModel {
    config: PalmConfig,
    http: Client,
}

impl PalmLanguageModel {
    pub fn new(config: PalmConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::new(PalmConfig::new(api_key))
    }

    pub fn config(&self) -> &PalmConfig {
        &self.config
    }

    /// Sends the prompt and returns the first completion, unmodified.
    ///
    /// `randomness` and `max_response_length` are forwarded as given; the
    /// service decides what to do with values it does not accept. Failures
    /// are returned as-is unless retries were enabled in the config.
    #[tracing::instrument(skip(self, prompt), fields(model = %self.config.model))]
    pub async fn generate_text(
        &self,
        prompt: &str,
        randomness: f32,
        max_response_length: u32,
    ) -> LmResult<String> {
        tracing::info!("Calling language model ..");
        tracing::debug!("Prompt: {}", prompt);
        let body = GenerateTextRequest {
            prompt: TextPrompt { text: prompt },
            temperature: randomness,
            max_output_tokens: max_response_length,
        };
        if self.config.max_retries == 0 {
            return self.call_once(&body).await;
        }
        RetryIf::spawn(
            default_retry(self.config.max_retries),
            || self.call_once(&body),
            |err: &LmError| {
                let transient = err.is_transient();
                if transient {
                    tracing::warn!("Transient failure from language model: {}", err);
                }
                transient
            },
        )
        .await
    }

    /// [`Self::generate_text`] with randomness 0.7 and at most 1000 tokens.
    pub async fn generate_with_defaults(&self, prompt: &str) -> LmResult<String> {
        self.generate_text(prompt, DEFAULT_RANDOMNESS, DEFAULT_MAX_RESPONSE_LENGTH)
            .await
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateText",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn call_once(&self, body: &GenerateTextRequest<'_>) -> LmResult<String> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            // Prefer the service's own explanation when the body has one
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(LmError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let completion: GenerateTextResponse = response.json().await?;
        let filters = completion
            .filters
            .into_iter()
            .filter_map(|filter| filter.reason)
            .collect();
        completion
            .candidates
            .into_iter()
            .next()
            .map(|candidate| candidate.output)
            .ok_or(LmError::NoCandidates { filters })
    }
}

impl std::fmt::Debug for PalmLanguageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PalmLanguageModel")
            .field("config", &self.config)
            .finish()
    }
}

#[async_trait]
impl TextGenerator for PalmLanguageModel {
    async fn generate(&self, request: &GenerationRequest) -> LmResult<String> {
        self.generate_text(
            &request.prompt,
            request.randomness,
            request.max_response_length,
        )
        .await
    }
}
