use async_trait::async_trait;
use log::{debug, error, trace};
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::error::Error;
use crate::providers::GenerationProvider;
use crate::request::{Generated, GenerationRequest};

const LOCAL_API_BASE: &str
  = "http://localhost:11434";

#[derive(Debug, Clone, Serialize)]
struct LocalGenerateRequest
{   model: String
  , prompt: String
  , system: String
  , stream: bool
  , options: LocalOptions
}

#[derive(Debug, Clone, Serialize)]
struct LocalOptions
{   temperature: f32
  , num_predict: usize
}

#[derive(Debug, Clone, Deserialize)]
struct LocalGenerateResponse
{   response: String
  , #[serde(default)]
    eval_count: Option<usize>
  , #[serde(default)]
    prompt_eval_count: Option<usize>
}

/// Free provider backed by a local Ollama-style server
pub struct LocalProvider
{   api_base: String
  , model: String
  , temperature: f32
  , http_client: reqwest::Client
}

impl LocalProvider
{   pub fn from_config(config: &ProviderConfig) -> Self
    {   debug!("Creating LocalProvider");
        LocalProvider
        {   api_base: config.api_base.clone()
              .unwrap_or_else(|| LOCAL_API_BASE.to_string())
          , model: if config.model.is_empty()
              { "llama3".to_string() } else { config.model.clone() }
          , temperature: config.temperature
          , http_client: reqwest::Client::new()
        }
    }
}

#[async_trait]
impl GenerationProvider for LocalProvider
{   fn id(&self) -> &str
    {   "local"
    }

    async fn try_generate(
      &self
    , request: &GenerationRequest
    ) -> Result<Generated, Error>
    {   let body = LocalGenerateRequest
        {   model: self.model.clone()
          , prompt: request.user_message()
          , system: request.system_message()
          , stream: false
          , options: LocalOptions
            {   temperature: self.temperature
              , num_predict: request.token_budget()
            }
        };
        trace!("Local request: {:?}", body);

        let response = self.http_client
          .post(format!(
            "{}/api/generate", self.api_base.trim_end_matches('/')
          ))
          .json(&body)
          .send()
          .await
          .map_err(|e| {
            error!("Local provider HTTP error: {}", e);
            Error::HttpError(e.to_string())
          })?;

        let status = response.status();
        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::ApiError(
              format!("local error ({}): {}", status, error_text)
            ));
        }

        let parsed: LocalGenerateResponse
          = response.json().await.map_err(|e| {
            error!("Local provider parse error: {}", e);
            Error::ParseError(e.to_string())
          })?;

        if parsed.response.trim().is_empty()
        {   return Err(Error::EmptyResponse("local".to_string()));
        }
        let tokens_used = parsed.eval_count.unwrap_or(0)
          + parsed.prompt_eval_count.unwrap_or(0);
        Ok(Generated
        {   content: parsed.response
          , tokens_used
        })
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn response_shape()
    {   let raw = r#"{"model":"llama3","response":"Hello","done":true,"eval_count":5,"prompt_eval_count":7}"#;
        let parsed: LocalGenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.response, "Hello");
        assert_eq!(parsed.eval_count, Some(5));
        assert_eq!(parsed.prompt_eval_count, Some(7));
    }

    #[test]
    fn defaults_point_at_localhost()
    {   let provider = LocalProvider::from_config(&ProviderConfig::default());
        assert_eq!(provider.api_base, LOCAL_API_BASE);
        assert_eq!(provider.model, "llama3");
        assert!(provider.is_available());
    }
}
