//! Ordered provider fallback for content generation

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::{ForgeConfig, OrchestratorConfig};
use crate::error::Error;
use crate::failover::FailoverSequence;
use crate::providers::{self, GenerationProvider, TemplateFallback};
use crate::providers::fallback::FALLBACK_PROVIDER_ID;
use crate::request::{Generated, GenerationRequest, ProviderResult};
use crate::ContentType;

/// Tries providers in priority order and always produces a result.
///
/// A failing, slow or unavailable provider is logged and skipped. When
/// nothing succeeds the deterministic template fallback answers with
/// `status = success`, so `generate` has no error path.
pub struct GenerationOrchestrator
{   providers: Vec<Arc<dyn GenerationProvider>>
  , provider_order: Vec<String>
  , attempt_timeout: Duration
  , fallback: TemplateFallback
}

impl GenerationOrchestrator
{   pub fn new(
      providers: Vec<Arc<dyn GenerationProvider>>
    , config: &OrchestratorConfig
    ) -> Self
    {   debug!(
          "Creating GenerationOrchestrator with {} providers",
          providers.len()
        );
        let mut orchestrator = GenerationOrchestrator
        {   providers: Vec::new()
          , provider_order: config.provider_order.clone()
          , attempt_timeout: Duration::from_secs(config.timeout_secs.max(1))
          , fallback: TemplateFallback::new()
        };
        for provider in providers
        {   orchestrator.register(provider);
        }
        orchestrator
    }

    /// Build the adapters enabled in the configuration
    pub fn from_config(config: &ForgeConfig) -> Self
    {   Self::new(
          providers::from_config(&config.providers)
        , &config.orchestrator
        )
    }

    /// Add a provider; an existing provider with the same id is replaced
    pub fn register(&mut self, provider: Arc<dyn GenerationProvider>)
    {   let id = provider.id().to_string();
        if let Some(slot) = self.providers.iter_mut().find(|p| p.id() == id)
        {   debug!("Replacing provider '{}'", id);
            *slot = provider;
        } else
        {   debug!("Registering provider '{}'", id);
            self.providers.push(provider);
        }
    }

    /// Override the default priority list
    pub fn set_provider_order(&mut self, order: Vec<String>)
    {   self.provider_order = order;
    }

    pub fn set_attempt_timeout(&mut self, timeout: Duration)
    {   self.attempt_timeout = timeout;
    }

    pub fn provider_ids(&self) -> Vec<String>
    {   self.providers.iter().map(|p| p.id().to_string()).collect()
    }

    fn provider(&self, id: &str) -> Option<&Arc<dyn GenerationProvider>>
    {   self.providers.iter().find(|p| p.id() == id)
    }

    /// Generate content, falling back to the template when all providers fail
    pub async fn generate(&self, request: &GenerationRequest) -> ProviderResult
    {   self.generate_traced(request).await.0
    }

    /// Like [`generate`](Self::generate), also returning every failed attempt
    pub async fn generate_traced(
      &self
    , request: &GenerationRequest
    ) -> (ProviderResult, Vec<ProviderResult>)
    {   let mut trail = Vec::new();
        let mut sequence = FailoverSequence::plan(
          &self.provider_order
        , &self.provider_ids()
        , request.preferred_provider.as_deref()
        );

        let mut next = sequence.current().map(|s| s.to_string());
        while let Some(id) = next
        {   if let Some(provider) = self.provider(&id)
            {   match self.attempt(provider.as_ref(), request).await
                {   Ok(generated) => {
                      info!("Provider '{}' produced content", id);
                      return (ProviderResult::success(id, generated), trail);
                    }
                  , Err(Error::ProviderUnavailable(reason)) => {
                      debug!("Skipping unavailable provider: {}", reason);
                    }
                  , Err(e) => {
                      warn!("Provider '{}' failed: {}", id, e);
                      trail.push(ProviderResult::failure(id.as_str(), &e));
                    }
                }
            }
            next = sequence.next().map(|s| s.to_string());
        }

        info!("No provider succeeded, using template fallback");
        let generated = self.fallback.render(request);
        (ProviderResult::success(FALLBACK_PROVIDER_ID, generated), trail)
    }

    /// One bounded attempt; a timeout counts as a provider error
    async fn attempt(
      &self
    , provider: &dyn GenerationProvider
    , request: &GenerationRequest
    ) -> Result<Generated, Error>
    {   if !provider.is_available()
        {   return Err(Error::ProviderUnavailable(provider.id().to_string()));
        }
        debug!("Attempting provider '{}'", provider.id());
        match tokio::time::timeout(
          self.attempt_timeout,
          provider.try_generate(request)
        ).await
        {   Ok(Ok(generated)) if generated.content.trim().is_empty() => {
              Err(Error::EmptyResponse(provider.id().to_string()))
            }
          , Ok(result) => result
          , Err(_) => Err(Error::Timeout(provider.id().to_string()))
        }
    }

    /// Generate `count` alternatives for the same prompt
    pub async fn generate_variants(
      &self
    , request: &GenerationRequest
    , count: usize
    ) -> Vec<ProviderResult>
    {   let mut variants = Vec::with_capacity(count);
        for index in 1..=count
        {   let variant = request.clone()
              .content_type(ContentType::Variant)
              .style(format!("{} (variant {})", request.style, index));
            variants.push(self.generate(&variant).await);
        }
        variants
    }
}
