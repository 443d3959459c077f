use crate::error::{Result, SchemalignError};
use crate::llm::ChatClient;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request body for an OpenAI-compatible chat completion
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response structure from the chat completions API
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions client (Groq by default)
///
/// Makes exactly one request per call. Retrying is the caller's decision, see
/// [`crate::llm::call_with_backoff`].
pub struct ChatCompletionsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ChatCompletionsClient {
    /// Create a new client
    ///
    /// # Arguments
    ///
    /// * `api_key` - Bearer token for the endpoint
    /// * `base_url` - API root, e.g. `https://api.groq.com/openai/v1`
    /// * `timeout` - Per-request timeout
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SchemalignError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatClient for ChatCompletionsClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        let start = std::time::Instant::now();
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| SchemalignError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SchemalignError::Network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(error_for_status(status, body));
        }

        let content = parse_completion(&body)?;
        log::debug!("Chat completion ({}) took {:?}", model, start.elapsed());
        Ok(content)
    }
}

/// Map a non-success status to the error kind the retry predicate understands.
fn error_for_status(status: StatusCode, body: String) -> SchemalignError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        SchemalignError::RateLimited(body)
    } else {
        SchemalignError::Api {
            status: status.as_u16(),
            body,
        }
    }
}

/// Pull `choices[0].message.content` out of a response body.
fn parse_completion(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| SchemalignError::Parse(format!("Failed to parse chat response: {}", e)))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| SchemalignError::Parse("No content in chat response".to_string()))
}
