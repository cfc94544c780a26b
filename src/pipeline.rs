//! brief -> generate -> refine -> optimize -> check -> artifact

use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::ForgeConfig;
use crate::metrics::{self, KeywordDensityReport, Sentiment};
use crate::orchestrator::GenerationOrchestrator;
use crate::originality::{OriginalityChecker, PlagiarismReport};
use crate::refiner::{Refinement, StyleRefiner};
use crate::request::{ContentBrief, GenerationRequest, ProviderResult};
use crate::seo::{SeoOptimization, SeoScoreBreakdown, SeoScorer};

/// Audience used when a brief leaves it blank
const DEFAULT_AUDIENCE: &str = "general";

const SUMMARY_CHARS: usize = 150;

/// Final output of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentArtifact
{   pub content: String
  , pub provider_id: String
  , pub tokens_used: usize
  , /// Refinement change log, in the order the rules fired
    pub changes: Vec<String>
  , pub readability: f64
  , pub keyword_density: KeywordDensityReport
  , pub seo_score: SeoScoreBreakdown
  , pub seo_suggestions: Vec<String>
  , pub plagiarism: PlagiarismReport
  , pub word_count: usize
  , pub reading_time: usize
  , /// First and last sentence of the refined draft
    pub summary: String
  , pub sentiment: Sentiment
  , /// SEO suggestions followed by originality recommendations
    pub recommendations: Vec<String>
}

/// The four stages wired to one shared configuration.
///
/// Each stage stays callable on its own; [`Pipeline::run`] chains them.
pub struct Pipeline
{   config: Arc<ForgeConfig>
  , orchestrator: GenerationOrchestrator
  , refiner: StyleRefiner
  , seo: SeoScorer
  , checker: OriginalityChecker
}

impl Pipeline
{   /// Pipeline with the providers enabled in `config`
    pub fn new(config: ForgeConfig) -> Self
    {   let orchestrator = GenerationOrchestrator::from_config(&config);
        Self::with_orchestrator(config, orchestrator)
    }

    /// Pipeline around a caller-built orchestrator
    pub fn with_orchestrator(
      config: ForgeConfig
    , orchestrator: GenerationOrchestrator
    ) -> Self
    {   let config = Arc::new(config);
        Pipeline
        {   refiner: StyleRefiner::new(config.clone())
          , seo: SeoScorer::new(config.seo.clone())
          , checker: OriginalityChecker::new(config.originality.clone())
          , orchestrator
          , config
        }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> ProviderResult
    {   self.orchestrator.generate(request).await
    }

    pub fn refine(
      &self
    , text: &str
    , style: &str
    , length: &str
    , audience: &str
    ) -> Refinement
    {   self.refiner.refine(text, style, length, audience)
    }

    pub fn optimize(
      &self
    , text: &str
    , keywords: &[String]
    , target_url: Option<&str>
    ) -> SeoOptimization
    {   self.seo.optimize(text, keywords, target_url)
    }

    pub fn density(&self, text: &str, keywords: &[String]) -> KeywordDensityReport
    {   self.seo.density(text, keywords)
    }

    pub fn score(&self, text: &str, keywords: &[String]) -> SeoScoreBreakdown
    {   self.seo.score(text, keywords)
    }

    pub fn suggestions(&self, text: &str, keywords: &[String]) -> Vec<String>
    {   self.seo.suggestions(text, keywords)
    }

    pub fn check(&self, text: &str, check_facts: bool) -> PlagiarismReport
    {   self.checker.check(text, check_facts)
    }

    /// Run every stage for a brief; always yields an artifact
    pub async fn run(
      &self
    , brief: &ContentBrief
    , target_url: Option<&str>
    , check_facts: bool
    ) -> ContentArtifact
    {   info!("Running pipeline for '{}'", brief.title);
        let generated = self.generate(&brief.to_request()).await;
        debug!(
          "Draft from '{}' ({} tokens)",
          generated.provider_id, generated.tokens_used
        );

        let style = non_blank(&brief.tone).unwrap_or(self.config.default_style.as_str());
        let audience = non_blank(&brief.audience).unwrap_or(DEFAULT_AUDIENCE);
        let refined = self.refine(
          &generated.content
        , style
        , brief.length.as_str()
        , audience
        );
        let readability = self.refiner.readability(&refined.text);
        let summary = metrics::summarize(&refined.text, SUMMARY_CHARS);
        let sentiment = metrics::sentiment(&refined.text);

        let optimized = self.optimize(&refined.text, &brief.keywords, target_url);
        let seo_suggestions = self.suggestions(&optimized.text, &brief.keywords);
        let plagiarism = self.check(&optimized.text, check_facts);

        let word_count = metrics::word_count(&optimized.text);
        let recommendations = seo_suggestions.iter()
          .chain(plagiarism.recommendations.iter())
          .cloned()
          .collect();

        ContentArtifact
        {   provider_id: generated.provider_id
          , tokens_used: generated.tokens_used
          , changes: refined.changes
          , readability
          , keyword_density: optimized.keyword_density
          , seo_score: optimized.breakdown
          , seo_suggestions
          , plagiarism
          , word_count
          , reading_time: metrics::reading_time_minutes(word_count)
          , summary
          , sentiment
          , recommendations
          , content: optimized.text
        }
    }
}

fn non_blank(value: &str) -> Option<&str>
{   let value = value.trim();
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::config::OrchestratorConfig;
    use crate::providers::fallback::FALLBACK_PROVIDER_ID;
    use crate::ContentType;

    fn offline() -> Pipeline
    {   Pipeline::with_orchestrator(
          ForgeConfig::default()
        , GenerationOrchestrator::new(vec![], &OrchestratorConfig::default())
        )
    }

    #[tokio::test]
    async fn run_without_providers_produces_an_artifact()
    {   let brief = ContentBrief
        {   title: "Urban Beekeeping".to_string()
          , description: "Keeping hives on city rooftops".to_string()
          , audience: "beginners".to_string()
          , tone: "casual".to_string()
          , keywords: vec!["beekeeping".to_string()]
          , content_type: ContentType::BlogPost
          , ..ContentBrief::default()
        };
        let artifact = offline()
          .run(&brief, Some("https://example.com/bees"), true)
          .await;

        assert_eq!(artifact.provider_id, FALLBACK_PROVIDER_ID);
        assert_eq!(artifact.tokens_used, 0);
        assert!(artifact.content.contains("<meta name=\"description\""));
        assert!(artifact.content.contains("## Related Content"));
        assert!(artifact.keyword_density.contains_key("beekeeping"));
        assert_eq!(artifact.word_count, metrics::word_count(&artifact.content));
        assert!(artifact.reading_time >= 1);
        assert!(!artifact.summary.is_empty());
        assert!(artifact.summary.chars().count() <= SUMMARY_CHARS);
        assert!(artifact.recommendations.len()
          >= artifact.plagiarism.recommendations.len());
    }

    #[tokio::test]
    async fn blank_tone_uses_default_style()
    {   let brief = ContentBrief
        {   title: "Tea".to_string()
          , ..ContentBrief::default()
        };
        let artifact = offline().run(&brief, None, false).await;
        assert!(artifact.plagiarism.fact_candidates.is_empty());
        assert!(!artifact.content.contains("## Related Content"));
    }

    #[test]
    fn stages_are_callable_alone()
    {   let pipeline = offline();
        let keywords = vec!["ai".to_string()];
        assert!((pipeline.score("", &keywords).total - 4.5).abs() < 1e-9);
        assert!(!pipeline.suggestions("", &keywords).is_empty());
        assert_eq!(pipeline.check("", false).score, 0.0);
        let refined = pipeline.refine("We use AI to help people.", "professional", "short", "general");
        assert!(refined.text.contains("utilize"));
    }
}
