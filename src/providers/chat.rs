//! Chat-completions wire format shared by the metered providers

use log::{debug, error, trace};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::request::{Generated, GenerationRequest};

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>
}

impl ChatRequest
{   /// System + user prompt for a generation request
    pub fn for_generation(
      model: &str
    , temperature: f32
    , request: &GenerationRequest
    ) -> Self
    {   ChatRequest
        {   model: model.to_string()
          , messages: vec![
              ChatMessage
              {   role: "system".to_string()
                , content: request.system_message()
              }
            , ChatMessage
              {   role: "user".to_string()
                , content: request.user_message()
              }
            ]
          , max_tokens: Some(request.token_budget())
          , temperature: Some(temperature)
          , stream: Some(false)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse
{   pub choices: Vec<Choice>
  , #[serde(default)]
    pub usage: Option<Usage>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChatMessage
  , pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage
{   #[serde(default)]
    pub total_tokens: usize
}

impl ChatResponse
{   /// First choice's text plus token usage
    pub fn into_generated(
      self
    , provider: &str
    ) -> Result<Generated, Error>
    {   let tokens_used = self.usage
          .map(|u| u.total_tokens)
          .unwrap_or(0);
        let content = self.choices.into_iter()
          .next()
          .map(|c| c.message.content)
          .ok_or_else(|| {
            error!("No choices in {} response", provider);
            Error::NoChoicesInResponse
          })?;
        if content.trim().is_empty()
        {   return Err(Error::EmptyResponse(provider.to_string()));
        }
        Ok(Generated { content, tokens_used })
    }
}

/// POST a chat request to `{api_base}/chat/completions`
pub async fn send_chat(
  http_client: &reqwest::Client
, provider: &str
, api_base: &str
, api_key: &str
, request: &ChatRequest
) -> Result<Generated, Error>
{   debug!("Sending chat request to {} ({})", provider, request.model);
    trace!("{} request: {:?}", provider, request);

    let response = http_client
      .post(format!("{}/chat/completions", api_base.trim_end_matches('/')))
      .header("Authorization", format!("Bearer {}", api_key))
      .header("Content-Type", "application/json")
      .json(request)
      .send()
      .await
      .map_err(|e| {
        error!("HTTP error: {}", e);
        Error::HttpError(e.to_string())
      })?;

    let status = response.status();
    trace!("{} response status: {}", provider, status);

    if !status.is_success()
    {   let error_text = response.text().await
          .unwrap_or_else(|_|
            "Unknown error".to_string()
          );
        error!("{} API error: {}", provider, error_text);
        return Err(Error::ApiError(
          format!("{} error ({}): {}", provider, status, error_text)
        ));
    }

    let chat_response: ChatResponse
      = response.json().await.map_err(|e| {
        error!("Parse error: {}", e);
        Error::ParseError(e.to_string())
      })?;

    chat_response.into_generated(provider)
}
