//! OpenAI-compatible chat completion generator.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use blog_core::ports::{ContentGenerator, GenerationError};

const SUMMARY_SYSTEM: &str = "You summarize content.";
const TAGS_SYSTEM: &str = "You extract tags from content.";

/// Generator client configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl OpenAiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Summary and tag generation over the chat completions endpoint.
#[derive(Clone)]
pub struct OpenAiGenerator {
    http_client: Client,
    config: OpenAiConfig,
}

impl OpenAiGenerator {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            http_client: Client::new(),
            config,
        }
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GenerationError> {
        let start = std::time::Instant::now();
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "OpenAI request failed");
                GenerationError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, error = %body, "OpenAI API error");
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        tracing::debug!(
            model = %self.config.model,
            duration_ms = start.elapsed().as_millis(),
            "OpenAI chat completion"
        );
        Ok(content)
    }
}

/// The reply must be a JSON array of strings and nothing else.
fn parse_tags(reply: &str) -> Result<Vec<String>, GenerationError> {
    let tags: Vec<String> = serde_json::from_str(reply.trim())
        .map_err(|e| GenerationError::MalformedTags(format!("{e}: {reply}")))?;
    if tags.is_empty() {
        return Err(GenerationError::MalformedTags("empty tag list".to_string()));
    }
    Ok(tags)
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    async fn generate_summary(&self, content: &str) -> Result<String, GenerationError> {
        if content.is_empty() {
            return Err(GenerationError::EmptyContent);
        }
        let prompt = format!("Please provide a concise summary of the following post:\n\n{content}");
        self.complete(SUMMARY_SYSTEM, &prompt).await
    }

    async fn generate_tags(&self, content: &str) -> Result<Vec<String>, GenerationError> {
        if content.is_empty() {
            return Err(GenerationError::EmptyContent);
        }
        let prompt = format!(
            "Given the following post content, extract a list of 3 to 6 relevant tags (single words):\n\n\
             {content}\n\n\
             Provide the tags as a JSON array of strings, for example: [\"go\", \"database\", \"web\"]"
        );
        let reply = self.complete(TAGS_SYSTEM, &prompt).await?;
        parse_tags(&reply)
    }
}
