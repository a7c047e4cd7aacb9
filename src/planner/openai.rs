//! OpenAI-compatible chat-completions plan generator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::plan::RawPlan;

use super::prompt::SYSTEM_PROMPT;
use super::PlanGenerator;

/// Plan generator backed by a hosted chat model.
pub struct OpenAiPlanner {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// OpenAI error response format.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl OpenAiPlanner {
    /// Create a planner from configuration, falling back to `OPENAI_API_KEY`.
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or(PlannerError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlannerError::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request_completion(&self, question: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: question,
                },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PlannerError::Api("Request timed out".to_string())
                } else if e.is_connect() {
                    PlannerError::Api(format!("Connection failed: {}", e))
                } else {
                    PlannerError::Api(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();

        if status.is_success() {
            let result: ChatResponse = response
                .json()
                .await
                .map_err(|e| PlannerError::Api(format!("Failed to parse response: {}", e)))?;

            result
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| PlannerError::EmptyResponse.into())
        } else if status.as_u16() == 429 {
            Err(PlannerError::RateLimited.into())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                Err(PlannerError::Api(format!(
                    "API error ({}): {}",
                    status, error_response.error.message
                ))
                .into())
            } else {
                Err(PlannerError::Api(format!("API error ({}): {}", status, error_text)).into())
            }
        }
    }
}

#[async_trait]
impl PlanGenerator for OpenAiPlanner {
    async fn generate(&self, question: &str) -> Result<RawPlan> {
        let content = self.request_completion(question).await?;
        debug!(model = %self.model, content = %content, "Planner response");

        let plan = parse_plan(&content)?;
        info!(keys = plan.len(), "Plan generated");
        Ok(plan)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Parse model output into a plan object, unwrapping markdown fences first.
pub fn parse_plan(content: &str) -> std::result::Result<RawPlan, PlannerError> {
    let json = extract_json(content);
    match serde_json::from_str::<serde_json::Value>(json) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(PlannerError::InvalidPlan(format!(
            "expected a JSON object, got {}",
            other
        ))),
        Err(e) => Err(PlannerError::InvalidPlan(e.to_string())),
    }
}

/// Strip a surrounding ```json fence or leading/trailing prose around the object.
fn extract_json(content: &str) -> &str {
    let trimmed = content.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        let body = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest,
        };
        if let Some(end) = body.find("```") {
            return body[..end].trim();
        }
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}
