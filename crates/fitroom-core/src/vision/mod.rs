//! Vision-language tagging and recommendation client.
//!
//! Talks to the provider's OpenAI-compatible chat-completions endpoint:
//! one user message carrying an image reference (public URL or inline
//! data URL) plus a strict-JSON instruction, one POST, one parse.

pub mod parse;

use crate::config::Config;
use crate::error::{FitroomError, Result};
use crate::retry::retry_transient;
use crate::types::{ImageReference, TagResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const CHAT_ENDPOINT: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions";

const TAG_PROMPT: &str = "Generate outfit/clothing tags for this image. Respond with strict \
JSON only, no surrounding text. JSON fields: \
category (top/bottoms/outerwear/dress/shoes/accessory), \
gender (MALE/FEMALE/UNISEX), style, season, scene, weather, \
colors (array of strings), keywords (array of strings), confidence (0-1).";

const RECOMMEND_PROMPT: &str = "You are an outfit assistant. Given the input's weather, gender \
and closet_items (each with category/color/season/style/scene), suggest today's outfit. \
Respond with strict JSON only: {title, summary, items (array of {category, reason}), \
tips (array)}.";

const TAG_TEMPERATURE: f32 = 0.2;
const RECOMMEND_TEMPERATURE: f32 = 0.5;

/// Client for the chat-completion tagging/recommendation endpoint.
pub struct VisionTaggingClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    read_timeout: Duration,
}

impl VisionTaggingClient {
    pub fn new(config: &Config) -> Self {
        Self::with_endpoint(config, CHAT_ENDPOINT)
    }

    /// Create with a custom endpoint (compatible-mode deployments).
    pub fn with_endpoint(config: &Config, endpoint: &str) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .expect("failed to construct HTTP client");
        Self {
            client,
            api_key: config.api_key.trim().to_string(),
            model: config.model.clone(),
            endpoint: endpoint.to_string(),
            read_timeout: config.read_timeout,
        }
    }

    /// Tag one image and return the model's structured answer, unknown
    /// keys included.
    pub async fn tag(&self, reference: &ImageReference) -> Result<TagResult> {
        let body = ChatRequest {
            model: self.model.clone(),
            temperature: TAG_TEMPERATURE,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: reference.as_model_url(),
                        },
                    },
                    ChatContent::Text {
                        text: TAG_PROMPT.to_string(),
                    },
                ],
            }],
        };

        let content = self.complete(&body).await?;
        parse::parse_model_json(&content)
    }

    /// Text-only outfit recommendation over the caller's closet/weather
    /// summary. Same transport policy as tagging.
    pub async fn recommend(&self, input: &Value) -> Result<Value> {
        let text = format!("{RECOMMEND_PROMPT}\nInput: {}", serde_json::to_string(input)
            .map_err(|e| FitroomError::config(format!("recommendation input not serializable: {e}")))?);
        let body = ChatRequest {
            model: self.model.clone(),
            temperature: RECOMMEND_TEMPERATURE,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![ChatContent::Text { text }],
            }],
        };

        let content = self.complete(&body).await?;
        parse::parse_model_json(&content)
    }

    /// One chat-completion round trip: POST (with a single fixed-delay
    /// retry on transport failure), then extract the first choice's
    /// message content.
    async fn complete(&self, body: &ChatRequest) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(FitroomError::config("DASHSCOPE_API_KEY is not set"));
        }

        let response = retry_transient(|| self.post_chat(body)).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| FitroomError::MalformedResponse {
                message: "chat response carried no message content".to_string(),
                raw: String::new(),
            })
    }

    async fn post_chat(&self, body: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .timeout(self.read_timeout)
            .send()
            .await
            .map_err(|e| FitroomError::transport(format!("chat completion failed: {e}")))?;

        let status = response.status();
        if status.as_u16() >= 300 {
            let text = response.text().await.unwrap_or_default();
            return Err(FitroomError::remote(Some(status.as_u16()), text));
        }

        response
            .json()
            .await
            .map_err(|e| FitroomError::MalformedResponse {
                message: format!("chat response is not the expected JSON shape: {e}"),
                raw: String::new(),
            })
    }
}

// --- Wire types (OpenAI-compatible chat completions) ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_json(reference: &ImageReference) -> Value {
        let body = ChatRequest {
            model: "qwen-vl-plus".to_string(),
            temperature: TAG_TEMPERATURE,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: reference.as_model_url(),
                        },
                    },
                    ChatContent::Text {
                        text: TAG_PROMPT.to_string(),
                    },
                ],
            }],
        };
        serde_json::to_value(&body).unwrap()
    }

    #[test]
    fn test_request_shape_matches_wire_contract() {
        let json = request_json(&ImageReference::PublicUrl(
            "https://files.example.com/a.jpg".into(),
        ));
        assert_eq!(json["model"], "qwen-vl-plus");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"][0]["type"], "image_url");
        assert_eq!(
            json["messages"][0]["content"][0]["image_url"]["url"],
            "https://files.example.com/a.jpg"
        );
        assert_eq!(json["messages"][0]["content"][1]["type"], "text");
        assert!((json["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_inline_reference_becomes_data_url() {
        let json = request_json(&ImageReference::InlineData {
            data: vec![0xFF, 0xD8],
            mime_type: "image/jpeg".into(),
        });
        let url = json["messages"][0]["content"][0]["image_url"]["url"]
            .as_str()
            .unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_prompt_enumerates_schema_and_vocabularies() {
        for field in [
            "category", "gender", "style", "season", "scene", "weather", "colors", "keywords",
            "confidence",
        ] {
            assert!(TAG_PROMPT.contains(field), "prompt is missing `{field}`");
        }
        assert!(TAG_PROMPT.contains("MALE/FEMALE/UNISEX"));
        assert!(TAG_PROMPT.contains("strict JSON"));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_a_config_error() {
        let client = VisionTaggingClient::new(&Config::default());
        let err = client
            .tag(&ImageReference::PublicUrl("https://x.example/a.jpg".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, FitroomError::Config { .. }));
    }
}
