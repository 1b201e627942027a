//! Anthropic Messages API client for collateral generation.
//!
//! One synchronous request/response per task. The client retries transient
//! failures with exponential backoff:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately with the API message
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)
//!
//! The API key comes from the `ANTHROPIC_API_KEY` environment variable and is
//! never written to configuration or output files.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AiConfig;
use crate::prompts;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Emails are short; cap them tighter than the other tasks.
const EMAIL_MAX_TOKENS: u32 = 2048;

/// Tone of a generated pitch script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchTone {
    Professional,
    Friendly,
    Consultative,
}

impl PitchTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            PitchTone::Professional => "professional",
            PitchTone::Friendly => "friendly",
            PitchTone::Consultative => "consultative",
        }
    }
}

impl std::str::FromStr for PitchTone {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "professional" => Ok(PitchTone::Professional),
            "friendly" => Ok(PitchTone::Friendly),
            "consultative" => Ok(PitchTone::Consultative),
            other => bail!(
                "Unknown tone: '{}'. Must be professional, friendly, or consultative.",
                other
            ),
        }
    }
}

/// Shape of a generated presentation outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationKind {
    Standard,
    Detailed,
    Executive,
}

impl PresentationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresentationKind::Standard => "standard",
            PresentationKind::Detailed => "detailed",
            PresentationKind::Executive => "executive",
        }
    }
}

impl std::str::FromStr for PresentationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard" => Ok(PresentationKind::Standard),
            "detailed" => Ok(PresentationKind::Detailed),
            "executive" => Ok(PresentationKind::Executive),
            other => bail!(
                "Unknown presentation kind: '{}'. Must be standard, detailed, or executive.",
                other
            ),
        }
    }
}

/// Purpose of a generated sales email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailPurpose {
    Introduction,
    FollowUp,
    Proposal,
    ThankYou,
}

impl EmailPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailPurpose::Introduction => "introduction",
            EmailPurpose::FollowUp => "follow-up",
            EmailPurpose::Proposal => "proposal",
            EmailPurpose::ThankYou => "thank-you",
        }
    }
}

impl std::str::FromStr for EmailPurpose {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "introduction" => Ok(EmailPurpose::Introduction),
            "follow-up" | "follow_up" => Ok(EmailPurpose::FollowUp),
            "proposal" => Ok(EmailPurpose::Proposal),
            "thank-you" | "thank_you" => Ok(EmailPurpose::ThankYou),
            other => bail!(
                "Unknown email purpose: '{}'. Must be introduction, follow-up, proposal, or thank-you.",
                other
            ),
        }
    }
}

#[derive(Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Claude-backed sales assistant. One instance per CLI invocation.
pub struct Assistant {
    client: reqwest::Client,
    config: AiConfig,
}

impl Assistant {
    /// Build the client. Fails early if the API key is missing so commands
    /// do not extract documents only to discover they cannot generate.
    pub fn new(config: &AiConfig) -> Result<Self> {
        if std::env::var("ANTHROPIC_API_KEY").is_err() {
            bail!(
                "ANTHROPIC_API_KEY environment variable not set. \
Export your Anthropic API key before running generation commands."
            );
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Product comparison (or standalone assessment when no competitor data).
    pub async fn compare_products(
        &self,
        product: &str,
        competitor: Option<&str>,
    ) -> Result<String> {
        let prompt = prompts::build_analysis_prompt(product, competitor);
        self.send(&prompt, self.config.max_tokens).await
    }

    /// Pitch script in the requested tone.
    pub async fn sales_pitch(
        &self,
        product: &str,
        customer: Option<&str>,
        tone: PitchTone,
    ) -> Result<String> {
        let prompt = prompts::build_pitch_prompt(product, customer, tone);
        self.send(&prompt, self.config.max_tokens).await
    }

    /// Customer-tailored presentation outline.
    pub async fn presentation_outline(
        &self,
        product: &str,
        customer: &str,
        kind: PresentationKind,
    ) -> Result<String> {
        let prompt = prompts::build_presentation_prompt(product, customer, kind);
        self.send(&prompt, self.config.max_tokens).await
    }

    /// Needs analysis and product recommendations.
    pub async fn recommend_products(&self, customer: &str, catalog: &str) -> Result<String> {
        let prompt = prompts::build_recommendation_prompt(customer, catalog);
        self.send(&prompt, self.config.max_tokens).await
    }

    /// Sales email for a purpose.
    pub async fn sales_email(
        &self,
        purpose: EmailPurpose,
        product: &str,
        recipient: Option<&str>,
    ) -> Result<String> {
        let prompt = prompts::build_email_prompt(purpose, product, recipient);
        self.send(&prompt, self.config.max_tokens.min(EMAIL_MAX_TOKENS))
            .await
    }

    /// Free-form request with optional context block.
    pub async fn custom(&self, request: &str, context: Option<&str>) -> Result<String> {
        let prompt = prompts::build_custom_prompt(request, context);
        self.send(&prompt, self.config.max_tokens).await
    }

    async fn send(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow::anyhow!("ANTHROPIC_API_KEY not set"))?;

        let body = ApiRequest {
            model: self.config.model.clone(),
            max_tokens,
            system: prompts::SYSTEM_PROMPT.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let mut last_err = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(API_URL)
                .header("x-api-key", &api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let api_response: ApiResponse = response.json().await?;
                        return Ok(response_text(api_response));
                    }

                    // Rate limited or server error — retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(anyhow::anyhow!(
                            "Anthropic API error {}: {}",
                            status,
                            body_text
                        ));
                        continue;
                    }

                    // Client error (not 429) — don't retry
                    let body_text = response.text().await.unwrap_or_default();
                    if let Ok(api_error) = serde_json::from_str::<ApiError>(&body_text) {
                        bail!("Anthropic API error: {}", api_error.error.message);
                    }
                    bail!("Anthropic API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Generation failed after retries")))
    }
}

/// Concatenate the text blocks of a response.
fn response_text(response: ApiResponse) -> String {
    response
        .content
        .into_iter()
        .filter_map(|block| {
            if block.content_type == "text" {
                block.text
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn tone_parses_known_values_only() {
        assert_eq!(
            PitchTone::from_str("professional").unwrap(),
            PitchTone::Professional
        );
        assert!(PitchTone::from_str("sassy").is_err());
    }

    #[test]
    fn email_purpose_accepts_both_separators() {
        assert_eq!(
            EmailPurpose::from_str("follow-up").unwrap(),
            EmailPurpose::FollowUp
        );
        assert_eq!(
            EmailPurpose::from_str("follow_up").unwrap(),
            EmailPurpose::FollowUp
        );
        assert!(EmailPurpose::from_str("spam").is_err());
    }

    #[test]
    fn response_text_joins_text_blocks_and_skips_others() {
        let response: ApiResponse = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "text", "text": "Hello "},
                {"type": "tool_use", "text": null},
                {"type": "text", "text": "world.  "}
            ]
        }))
        .unwrap();
        assert_eq!(response_text(response), "Hello world.");
    }

    #[test]
    fn api_error_body_deserializes() {
        let err: ApiError = serde_json::from_str(
            r#"{"type":"error","error":{"type":"invalid_request_error","message":"bad model"}}"#,
        )
        .unwrap();
        assert_eq!(err.error.message, "bad model");
    }
}
