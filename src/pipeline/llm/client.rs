use serde::{Deserialize, Serialize};

use super::types::LlmClient;
use super::LlmError;
use crate::config::ProviderConfig;

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Must be built and dropped outside an async runtime context.
pub struct ChatCompletionClient {
    name: String,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl ChatCompletionClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::HttpClient(e.to_string()))?;

        Ok(Self {
            name: config.name.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout_secs: config.timeout.as_secs(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl LlmClient for ChatCompletionClient {
    fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::MissingCredential(self.name.clone()))?;

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
                } else {
                    LlmError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::ProviderError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }

    fn provider(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_chat_path_once() {
        let mut config = ProviderConfig::deepseek(Some("sk".into()));
        config.base_url = "http://localhost:9999/v1/".into();
        let client = ChatCompletionClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9999/v1/chat/completions");
        assert_eq!(client.provider(), "deepseek");
    }

    #[test]
    fn missing_key_fails_without_network() {
        let client = ChatCompletionClient::new(&ProviderConfig::ark(None)).unwrap();
        assert!(matches!(
            client.complete("sys", "user"),
            Err(LlmError::MissingCredential(name)) if name == "ark"
        ));
    }

    #[test]
    fn unreachable_endpoint_is_http_error() {
        let mut config = ProviderConfig::deepseek(Some("sk".into()));
        config.base_url = "http://127.0.0.1:9".into();
        config.timeout = std::time::Duration::from_secs(2);
        let client = ChatCompletionClient::new(&config).unwrap();
        assert!(matches!(
            client.complete("sys", "user"),
            Err(LlmError::HttpClient(_))
        ));
    }

    #[test]
    fn request_body_shape() {
        let body = ChatRequest {
            model: "deepseek-chat",
            messages: [
                ChatMessage { role: "system", content: "s" },
                ChatMessage { role: "user", content: "u" },
            ],
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "u");
        assert_eq!(json["stream"], false);
    }
}
