//! Brief, request and per-attempt result types

use serde::{Deserialize, Serialize};

use crate::{ContentType, Length, ProviderStatus};

/// Structured content brief supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentBrief
{   /// Topic or working title
    pub title: String
  , /// Free-form description of what the piece should cover
    pub description: String
  , /// Intended readers (general, technical, beginners, experts)
    pub audience: String
  , /// Tone / style name (professional, casual, humorous, academic)
    pub tone: String
  , pub length: Length
  , pub keywords: Vec<String>
  , pub content_type: ContentType
}

impl ContentBrief
{   /// Prompt text sent to generation providers
    pub fn prompt(&self) -> String
    {   let mut prompt = self.title.trim().to_string();
        if !self.description.trim().is_empty()
        {   if !prompt.is_empty()
            {   prompt.push_str(". ");
            }
            prompt.push_str(self.description.trim());
        }
        if !self.audience.trim().is_empty()
        {   prompt.push_str(&format!(
              " Target audience: {}.", self.audience.trim()
            ));
        }
        if !self.keywords.is_empty()
        {   prompt.push_str(&format!(
              " Keywords: {}.", self.keywords.join(", ")
            ));
        }
        prompt
    }

    /// Build the generation request for this brief
    pub fn to_request(&self) -> GenerationRequest
    {   GenerationRequest::new(self.prompt())
          .content_type(self.content_type)
          .style(if self.tone.trim().is_empty()
            { "professional" } else { self.tone.trim() })
          .length(self.length)
          .brief(self.clone())
    }
}

/// Unified generation request, immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest
{   /// The prompt text
    pub prompt: String
  , pub content_type: ContentType
  , /// Style hint forwarded to providers
    pub style: String
  , pub length: Length
  , /// Provider id to try before the default order
    pub preferred_provider: Option<String>
  , /// Max tokens to generate (defaults per length)
    pub max_tokens: Option<usize>
  , /// Structured brief used by the template fallback
    pub brief: Option<ContentBrief>
}

impl GenerationRequest
{   pub fn new(prompt: impl Into<String>) -> Self
    {   GenerationRequest
        {   prompt: prompt.into()
          , content_type: ContentType::default()
          , style: "professional".to_string()
          , length: Length::default()
          , preferred_provider: None
          , max_tokens: None
          , brief: None
        }
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self
    {   self.content_type = content_type;
        self
    }

    pub fn style(mut self, style: impl Into<String>) -> Self
    {   self.style = style.into();
        self
    }

    pub fn length(mut self, length: Length) -> Self
    {   self.length = length;
        self
    }

    pub fn preferred_provider(mut self, id: impl Into<String>) -> Self
    {   self.preferred_provider = Some(id.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self
    {   self.max_tokens = Some(max_tokens);
        self
    }

    pub fn brief(mut self, brief: ContentBrief) -> Self
    {   self.brief = Some(brief);
        self
    }

    /// Token budget, falling back to the length default
    pub fn token_budget(&self) -> usize
    {   self.max_tokens
          .unwrap_or_else(|| self.length.default_max_tokens())
    }

    /// System message for chat-style providers
    pub fn system_message(&self) -> String
    {   format!(
          "You are a professional {} writer. Write in a {} style.",
          self.content_type.label(),
          self.style
        )
    }

    /// User message for chat-style providers
    pub fn user_message(&self) -> String
    {   format!(
          "Write a {} {} about: {}",
          self.length,
          self.content_type.label(),
          self.prompt
        )
    }
}

/// Text produced by a provider before it is wrapped in a result
#[derive(Debug, Clone, PartialEq)]
pub struct Generated
{   pub content: String
  , pub tokens_used: usize
}

/// Result of one provider attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult
{   /// Generated text, or the error text for failed attempts
    pub content: String
  , pub provider_id: String
  , pub tokens_used: usize
  , pub status: ProviderStatus
}

impl ProviderResult
{   pub fn success(
      provider_id: impl Into<String>
    , generated: Generated
    ) -> Self
    {   ProviderResult
        {   content: generated.content
          , provider_id: provider_id.into()
          , tokens_used: generated.tokens_used
          , status: ProviderStatus::Success
        }
    }

    pub fn failure(
      provider_id: impl Into<String>
    , error: &crate::error::Error
    ) -> Self
    {   ProviderResult
        {   content: error.to_string()
          , provider_id: provider_id.into()
          , tokens_used: 0
          , status: ProviderStatus::Error
        }
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn brief_prompt_includes_all_fields()
    {   let brief = ContentBrief
        {   title: "Rust for data teams".to_string()
          , description: "Why memory safety matters".to_string()
          , audience: "technical".to_string()
          , keywords: vec!["rust".to_string(), "safety".to_string()]
          , ..ContentBrief::default()
        };
        let prompt = brief.prompt();
        assert!(prompt.starts_with("Rust for data teams. Why memory"));
        assert!(prompt.contains("Target audience: technical."));
        assert!(prompt.contains("Keywords: rust, safety."));
    }

    #[test]
    fn token_budget_follows_length()
    {   let req = GenerationRequest::new("x").length(Length::Long);
        assert_eq!(req.token_budget(), 2000);
        let req = req.max_tokens(42);
        assert_eq!(req.token_budget(), 42);
    }

    #[test]
    fn chat_messages_use_labels()
    {   let req = GenerationRequest::new("cats")
          .content_type(ContentType::BlogPost)
          .style("casual")
          .length(Length::Short);
        assert_eq!(
          req.system_message(),
          "You are a professional blog post writer. Write in a casual style."
        );
        assert_eq!(req.user_message(), "Write a short blog post about: cats");
    }
}
