use async_trait::async_trait;
use log::{debug, error};

use crate::config::ProviderConfig;
use crate::error::Error;
use crate::providers::chat::{send_chat, ChatRequest};
use crate::providers::GenerationProvider;
use crate::request::{Generated, GenerationRequest};

const MISTRAL_API_BASE: &str
  = "https://api.mistral.ai/v1";

const DEFAULT_MODEL: &str = "mistral-small-latest";

/// Secondary metered provider (Mistral chat completions)
pub struct MistralProvider
{   api_key: Option<String>
  , api_base: String
  , model: String
  , temperature: f32
  , http_client: reqwest::Client
}

impl MistralProvider
{   pub fn new(api_key: Option<String>) -> Self
    {   debug!("Creating MistralProvider");
        MistralProvider
        {   api_key
          , api_base: MISTRAL_API_BASE.to_string()
          , model: DEFAULT_MODEL.to_string()
          , temperature: 0.7
          , http_client: reqwest::Client::new()
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self
    {   let mut provider = Self::new(config.api_key.clone());
        if let Some(base) = &config.api_base
        {   provider.api_base = base.clone();
        }
        if !config.model.is_empty()
        {   provider.model = config.model.clone();
        }
        provider.temperature = config.temperature;
        provider
    }

    fn get_api_key(&self) -> Result<&str, Error>
    {   match self.api_key.as_deref()
        {   Some(key) if !key.trim().is_empty() => Ok(key)
          , _ => {
              error!("No API key for Mistral");
              Err(Error::ProviderUnavailable(
                format!("mistral:{}", self.model)
              ))
            }
        }
    }
}

#[async_trait]
impl GenerationProvider for MistralProvider
{   fn id(&self) -> &str
    {   "mistral"
    }

    fn is_available(&self) -> bool
    {   self.get_api_key().is_ok()
    }

    async fn try_generate(
      &self
    , request: &GenerationRequest
    ) -> Result<Generated, Error>
    {   debug!("Mistral generating with {}", self.model);
        let api_key = self.get_api_key()?;
        let chat = ChatRequest::for_generation(
          &self.model, self.temperature, request
        );
        send_chat(
          &self.http_client, "mistral", &self.api_base, api_key, &chat
        ).await
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[tokio::test]
    async fn missing_key_is_unavailable()
    {   let provider = MistralProvider::new(None);
        assert!(!provider.is_available());
        let err = provider
          .try_generate(&GenerationRequest::new("x"))
          .await
          .unwrap_err();
        assert!(matches!(err, Error::ProviderUnavailable(_)));
    }

    #[test]
    fn config_overrides_defaults()
    {   let config = ProviderConfig
        {   api_key: Some("k".to_string())
          , api_base: Some("http://localhost:9999/v1".to_string())
          , model: "open-mixtral".to_string()
          , ..ProviderConfig::default()
        };
        let provider = MistralProvider::from_config(&config);
        assert!(provider.is_available());
        assert_eq!(provider.api_base, "http://localhost:9999/v1");
        assert_eq!(provider.model, "open-mixtral");
    }
}
