//! Generation provider implementations

use async_trait::async_trait;

use crate::error::Error;
use crate::request::{Generated, GenerationRequest};

pub mod chat;
pub mod fallback;
pub mod local;
pub mod mistral;
pub mod openai;

// Re-export for convenience
pub use fallback::TemplateFallback;
pub use local::LocalProvider;
pub use mistral::MistralProvider;
pub use openai::OpenAiProvider;

/// A text-generation backend.
///
/// The orchestrator only sees this capability; transport details stay
/// inside each adapter. An attempt either yields text or an [`Error`],
/// and the orchestrator never retries the same provider within one call.
#[async_trait]
pub trait GenerationProvider: Send + Sync
{   /// Stable id used in provider order lists and results
    fn id(&self) -> &str;

    /// False when the adapter is missing credentials or was disabled
    fn is_available(&self) -> bool
    {   true
    }

    async fn try_generate(
      &self
    , request: &GenerationRequest
    ) -> Result<Generated, Error>;
}

/// Build the adapters enabled in `config`, in local, openai, mistral order
pub fn from_config(
  config: &crate::config::ProvidersConfig
) -> Vec<std::sync::Arc<dyn GenerationProvider>>
{   let mut providers: Vec<std::sync::Arc<dyn GenerationProvider>>
      = Vec::new();
    if config.local.enabled
    {   providers.push(std::sync::Arc::new(
          LocalProvider::from_config(&config.local)
        ));
    }
    if config.openai.enabled
    {   providers.push(std::sync::Arc::new(
          OpenAiProvider::from_config(&config.openai)
        ));
    }
    if config.mistral.enabled
    {   providers.push(std::sync::Arc::new(
          MistralProvider::from_config(&config.mistral)
        ));
    }
    providers
}
