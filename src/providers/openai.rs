use async_trait::async_trait;
use log::debug;

use crate::config::ProviderConfig;
use crate::error::Error;
use crate::providers::chat::{send_chat, ChatRequest};
use crate::providers::GenerationProvider;
use crate::request::{Generated, GenerationRequest};

const OPENAI_API_BASE: &str
  = "https://api.openai.com/v1";

/// Primary metered provider (OpenAI chat completions)
pub struct OpenAiProvider
{   api_key: Option<String>
  , api_base: String
  , model: String
  , temperature: f32
  , http_client: reqwest::Client
}

impl OpenAiProvider
{   pub fn from_config(config: &ProviderConfig) -> Self
    {   debug!("Creating OpenAiProvider");
        OpenAiProvider
        {   api_key: config.api_key.clone()
              .filter(|k| !k.trim().is_empty())
          , api_base: config.api_base.clone()
              .unwrap_or_else(|| OPENAI_API_BASE.to_string())
          , model: if config.model.is_empty()
              { "gpt-4".to_string() } else { config.model.clone() }
          , temperature: config.temperature
          , http_client: reqwest::Client::new()
        }
    }
}

#[async_trait]
impl GenerationProvider for OpenAiProvider
{   fn id(&self) -> &str
    {   "openai"
    }

    fn is_available(&self) -> bool
    {   self.api_key.is_some()
    }

    async fn try_generate(
      &self
    , request: &GenerationRequest
    ) -> Result<Generated, Error>
    {   let api_key = self.api_key.as_deref()
          .ok_or_else(|| Error::ProviderUnavailable(
            "openai (no api key)".to_string()
          ))?;
        let chat = ChatRequest::for_generation(
          &self.model, self.temperature, request
        );
        send_chat(
          &self.http_client, "openai", &self.api_base, api_key, &chat
        ).await
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn blank_key_counts_as_missing()
    {   let config = ProviderConfig
        {   api_key: Some("   ".to_string())
          , ..ProviderConfig::default()
        };
        let provider = OpenAiProvider::from_config(&config);
        assert!(!provider.is_available());
        assert_eq!(provider.model, "gpt-4");
    }

    #[test]
    fn unreachable_base_is_an_http_error()
    {   let config = ProviderConfig
        {   api_key: Some("sk-test".to_string())
          , api_base: Some("http://127.0.0.1:9".to_string())
          , ..ProviderConfig::default()
        };
        let provider = OpenAiProvider::from_config(&config);
        let rt = tokio::runtime::Runtime::new().unwrap();
        let err = rt
          .block_on(provider.try_generate(&GenerationRequest::new("x")))
          .unwrap_err();
        assert!(matches!(err, Error::HttpError(_)));
    }
}
