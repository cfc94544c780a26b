pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod failover;
pub mod metrics;
pub mod orchestrator;
pub mod refiner;
pub mod seo;
pub mod originality;
pub mod pipeline;
pub mod client;
use serde::{Deserialize, Serialize};

pub use client::ForgeBackend;
pub use config::ForgeConfig;
pub use orchestrator::GenerationOrchestrator;
pub use originality::{OriginalityChecker, PlagiarismReport};
pub use pipeline::{ContentArtifact, Pipeline};
pub use refiner::{Refinement, StyleRefiner};
pub use request::{ContentBrief, GenerationRequest, ProviderResult};
pub use seo::{SeoOptimization, SeoScoreBreakdown, SeoScorer};

/*

allwrite (All Writers) takes a content brief and walks it through
four stages: generation, style refinement, SEO scoring and
originality checking. Generation tries an ordered list of
providers and always ends with a deterministic template, so the
pipeline never fails for lack of a backend.

allwrite/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports and shared enums
│   ├── error.rs        # Custom error type
│   ├── config.rs       # Static configuration with built-in defaults
│   ├── request.rs      # Brief, request and provider result types
│   ├── failover.rs     # Provider attempt order
│   ├── providers/      # GenerationProvider trait + adapters
│   ├── orchestrator.rs # Ordered provider fallback
│   ├── metrics.rs      # Tokenization, density, readability
│   ├── refiner.rs      # Style / length / audience rewriting
│   ├── seo.rs          # Weighted SEO score and mutations
│   ├── originality.rs  # Plagiarism heuristics + fact buckets
│   ├── pipeline.rs     # brief -> artifact
│   ├── client.rs       # Channel-driven backend actor
│   └── main.rs         # CLI runner
└── tests/

*/

/// ALLWRITE BACKEND INTERFACE:

// ===== Generate =====

pub type GenerateReplySender
  = tokio::sync::mpsc::UnboundedSender<request::ProviderResult>;

pub struct GenerateArgs
{   pub request: request::GenerationRequest
  , pub reply: GenerateReplySender
}

// ===== Refine =====

pub type RefineReplySender
  = tokio::sync::mpsc::UnboundedSender<refiner::Refinement>;

pub struct RefineArgs
{   pub text: String
  , pub style: String
  , pub length: String
  , pub audience: String
  , pub reply: RefineReplySender
}

// ===== Optimize =====

pub type OptimizeReplySender
  = tokio::sync::mpsc::UnboundedSender<seo::SeoOptimization>;

pub struct OptimizeArgs
{   pub text: String
  , pub keywords: Vec<String>
  , pub target_url: Option<String>
  , pub reply: OptimizeReplySender
}

// ===== Check =====

pub type CheckReplySender
  = tokio::sync::mpsc::UnboundedSender<originality::PlagiarismReport>;

pub struct CheckArgs
{   pub text: String
  , pub check_facts: bool
  , pub reply: CheckReplySender
}

// ===== RunBrief =====

pub type RunBriefReplySender
  = tokio::sync::mpsc::UnboundedSender<pipeline::ContentArtifact>;

pub struct RunBriefArgs
{   pub brief: request::ContentBrief
  , pub target_url: Option<String>
  , pub check_facts: bool
  , pub reply: RunBriefReplySender
}

// ===== KillProcess =====

pub type KillProcessReply = Result<(), crate::error::Error>;
pub type KillProcessReplySender
  = tokio::sync::mpsc::UnboundedSender<KillProcessReply>;

pub struct KillProcessArgs
{   pub reply: KillProcessReplySender
}

// ===== ForgeHand (sender side) =====

pub struct ForgeHand
{   pub generate_tx
      : tokio::sync::mpsc::UnboundedSender<GenerateArgs>
  , pub refine_tx
      : tokio::sync::mpsc::UnboundedSender<RefineArgs>
  , pub optimize_tx
      : tokio::sync::mpsc::UnboundedSender<OptimizeArgs>
  , pub check_tx
      : tokio::sync::mpsc::UnboundedSender<CheckArgs>
  , pub run_brief_tx
      : tokio::sync::mpsc::UnboundedSender<RunBriefArgs>
  , pub kill_process_tx
      : tokio::sync::mpsc::UnboundedSender<KillProcessArgs>
}

// ===== ForgeFoot (receiver side) =====

pub struct ForgeFoot
{   pub generate_rx
      : tokio::sync::mpsc::UnboundedReceiver<GenerateArgs>
  , pub refine_rx
      : tokio::sync::mpsc::UnboundedReceiver<RefineArgs>
  , pub optimize_rx
      : tokio::sync::mpsc::UnboundedReceiver<OptimizeArgs>
  , pub check_rx
      : tokio::sync::mpsc::UnboundedReceiver<CheckArgs>
  , pub run_brief_rx
      : tokio::sync::mpsc::UnboundedReceiver<RunBriefArgs>
  , pub kill_process_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillProcessArgs>
}

/// ALLWRITE STRUCTURES:

/// Kind of text artifact a brief asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType
{   Article
  , BlogPost
  , MarketingCopy
  , SocialMedia
  , /// One of several alternatives produced for the same prompt
    Variant
}

impl ContentType
{   pub fn as_str(&self) -> &'static str
    {   match self
        {   ContentType::Article => "article"
          , ContentType::BlogPost => "blog_post"
          , ContentType::MarketingCopy => "marketing_copy"
          , ContentType::SocialMedia => "social_media"
          , ContentType::Variant => "variant"
        }
    }

    /// Human-readable label used inside prompts and templates
    pub fn label(&self) -> &'static str
    {   match self
        {   ContentType::Article => "article"
          , ContentType::BlogPost => "blog post"
          , ContentType::MarketingCopy => "marketing copy"
          , ContentType::SocialMedia => "social media post"
          , ContentType::Variant => "content variant"
        }
    }
}

impl Default for ContentType
{   fn default() -> Self
    {   ContentType::Article
    }
}

impl std::fmt::Display for ContentType
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   write!(f, "{}", self.as_str())
    }
}

/// Requested length of the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Length
{   Short
  , Medium
  , Long
}

impl Length
{   pub fn as_str(&self) -> &'static str
    {   match self
        {   Length::Short => "short"
          , Length::Medium => "medium"
          , Length::Long => "long"
        }
    }

    /// Default generation budget for this length
    pub fn default_max_tokens(&self) -> usize
    {   match self
        {   Length::Short => 500
          , Length::Medium => 1000
          , Length::Long => 2000
        }
    }
}

impl Default for Length
{   fn default() -> Self
    {   Length::Medium
    }
}

impl std::fmt::Display for Length
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   write!(f, "{}", self.as_str())
    }
}

/// Outcome of a single provider attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus
{   Success
  , Error
}
