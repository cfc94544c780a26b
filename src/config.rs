//! Configuration for providers, rule tables and scoring constants
//!
//! Everything here is loaded once at startup and treated as read-only.
//! A missing or malformed file never stops the process: [`ForgeConfig::load`]
//! logs the problem and hands back the built-in defaults.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ===== Providers =====

/// Settings for one generation backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig
{   /// Whether the adapter should be built at all
    pub enabled: bool
  , /// API key for metered providers
    pub api_key: Option<String>
  , /// API base URL (if custom)
    pub api_base: Option<String>
  , /// Model name
    pub model: String
  , /// Sampling temperature
    pub temperature: f32
}

impl Default for ProviderConfig
{   fn default() -> Self
    {   ProviderConfig
        {   enabled: true
          , api_key: None
          , api_base: None
          , model: String::new()
          , temperature: 0.7
        }
    }
}

/// The three built-in adapters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig
{   pub local: ProviderConfig
  , pub openai: ProviderConfig
  , pub mistral: ProviderConfig
}

impl Default for ProvidersConfig
{   fn default() -> Self
    {   ProvidersConfig
        {   local: ProviderConfig
            {   enabled: false
              , model: "llama3".to_string()
              , ..ProviderConfig::default()
            }
          , openai: ProviderConfig
            {   model: "gpt-4".to_string()
              , ..ProviderConfig::default()
            }
          , mistral: ProviderConfig
            {   model: "mistral-small-latest".to_string()
              , ..ProviderConfig::default()
            }
        }
    }
}

/// Provider ordering and per-attempt timeout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig
{   /// Provider ids, tried first to last
    pub provider_order: Vec<String>
  , /// Timeout applied to every single provider attempt
    pub timeout_secs: u64
}

impl Default for OrchestratorConfig
{   fn default() -> Self
    {   OrchestratorConfig
        {   provider_order: vec![
              "local".to_string()
            , "openai".to_string()
            , "mistral".to_string()
            ]
          , timeout_secs: 30
        }
    }
}

// ===== Style / length profiles =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentenceStructure
{   /// Split long sentences at commas
    Simple
  , /// Merge short neighbouring sentences
    Complex
  , /// Leave structure alone
    Varied
}

/// Rewrite rules for a named style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile
{   /// (from, to) pairs applied in order
    pub word_replacements: Vec<(String, String)>
  , pub sentence_structure: SentenceStructure
  , /// First entry opens the second sentence, last entry closes the text
    pub tone_markers: Vec<String>
}

/// Sentence targets for a named length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthProfile
{   pub target_sentence_count: usize
  , /// Expansion kicks in below `floor * target`
    pub expansion_ratio_floor: f64
}

// ===== SEO =====

/// Inclusive numeric band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band
{   pub min: f64
  , pub max: f64
}

impl Band
{   pub const fn new(min: f64, max: f64) -> Self
    {   Band { min, max }
    }

    pub fn contains(&self, value: f64) -> bool
    {   self.min <= value && value <= self.max
    }
}

/// Weights of the six SEO components; they sum to 100 by default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoWeights
{   pub title: f64
  , pub density: f64
  , pub structure: f64
  , pub length: f64
  , pub meta: f64
  , pub links: f64
}

impl SeoWeights
{   pub fn total(&self) -> f64
    {   self.title + self.density + self.structure
          + self.length + self.meta + self.links
    }
}

impl Default for SeoWeights
{   fn default() -> Self
    {   SeoWeights
        {   title: 20.0
          , density: 25.0
          , structure: 20.0
          , length: 15.0
          , meta: 10.0
          , links: 10.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoConfig
{   pub weights: SeoWeights
  , /// Title length in characters
    pub title_length: Band
  , /// Meta description length in characters
    pub meta_length: Band
  , /// Keyword density band in percent
    pub keyword_density: Band
  , /// Body length in words
    pub content_length: Band
  , /// Density percent `optimize` aims for when adding keywords
    pub target_density: f64
}

impl Default for SeoConfig
{   fn default() -> Self
    {   SeoConfig
        {   weights: SeoWeights::default()
          , title_length: Band::new(30.0, 60.0)
          , meta_length: Band::new(120.0, 160.0)
          , keyword_density: Band::new(0.5, 2.5)
          , content_length: Band::new(300.0, 2000.0)
          , target_density: 1.5
        }
    }
}

// ===== Originality =====

/// Maps a ratio to a score: the first `(above, score)` pair whose
/// threshold the ratio exceeds wins, otherwise 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoints(pub Vec<(f64, f64)>);

impl Breakpoints
{   pub fn score(&self, ratio: f64) -> f64
    {   self.0.iter()
          .find(|(above, _)| ratio > *above)
          .map(|(_, score)| *score)
          .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginalityConfig
{   pub common_phrases: Vec<String>
  , pub boilerplate_patterns: Vec<String>
  , pub generic_structures: Vec<String>
  , pub research_keywords: Vec<String>
  , pub common_phrase_breakpoints: Breakpoints
  , pub exact_match_breakpoints: Breakpoints
  , pub similar_content_breakpoints: Breakpoints
  , pub duplication_breakpoints: Breakpoints
  , /// Plagiarism score above which a full rewrite is advised
    pub rewrite_threshold: f64
  , pub review_threshold: f64
  , pub paraphrase_threshold: f64
  , /// Below this (and without facts) the text is called publish-ready
    pub publish_threshold: f64
  , pub max_facts: usize
}

fn strings(items: &[&str]) -> Vec<String>
{   items.iter().map(|s| s.to_string()).collect()
}

impl Default for OriginalityConfig
{   fn default() -> Self
    {   OriginalityConfig
        {   common_phrases: strings(&[
              "in conclusion", "it is important to note", "furthermore"
            , "moreover", "however", "therefore", "as a result"
            , "in addition", "on the other hand", "for example"
            ])
          , boilerplate_patterns: strings(&[
              "this is a comprehensive guide"
            , "in this article, we will"
            , "the importance of"
            , "it is essential to"
            , "as mentioned earlier"
            ])
          , generic_structures: strings(&[
              "the key benefits include"
            , "there are several advantages"
            , "it is important to consider"
            , "this approach provides"
            , "the main advantages are"
            ])
          , research_keywords: strings(&[
              "study", "research", "found", "discovered", "proved"
            ])
          , common_phrase_breakpoints: Breakpoints(vec![
              (0.05, 0.3), (0.03, 0.2), (0.01, 0.1)
            ])
          , exact_match_breakpoints: Breakpoints(vec![
              (0.1, 0.8), (0.05, 0.5), (0.02, 0.2)
            ])
          , similar_content_breakpoints: Breakpoints(vec![
              (0.3, 0.7), (0.15, 0.4), (0.05, 0.2)
            ])
          , duplication_breakpoints: Breakpoints(vec![
              (0.1, 0.6), (0.05, 0.3), (0.02, 0.1)
            ])
          , rewrite_threshold: 0.8
          , review_threshold: 0.6
          , paraphrase_threshold: 0.3
          , publish_threshold: 0.2
          , max_facts: 10
        }
    }
}

// ===== Top level =====

/// Full allwrite configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig
{   pub providers: ProvidersConfig
  , pub orchestrator: OrchestratorConfig
  , pub styles: HashMap<String, StyleProfile>
  , /// Style used when the requested one is unknown
    pub default_style: String
  , pub lengths: HashMap<String, LengthProfile>
  , pub default_length: String
  , /// Audience name -> (from, to) vocabulary pairs
    pub audiences: HashMap<String, Vec<(String, String)>>
  , pub seo: SeoConfig
  , pub originality: OriginalityConfig
}

impl Default for ForgeConfig
{   fn default() -> Self
    {   ForgeConfig
        {   providers: ProvidersConfig::default()
          , orchestrator: OrchestratorConfig::default()
          , styles: builtin_styles()
          , default_style: "casual".to_string()
          , lengths: builtin_lengths()
          , default_length: "medium".to_string()
          , audiences: builtin_audiences()
          , seo: SeoConfig::default()
          , originality: OriginalityConfig::default()
        }
    }
}

impl ForgeConfig
{   /// Load from a JSON file, falling back to built-in defaults
    pub fn load(path: impl AsRef<Path>) -> Self
    {   let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        match std::fs::read_to_string(path)
          .map_err(|e| Error::ConfigLoad(
            format!("{}: {}", path.display(), e)
          ))
          .and_then(|raw| Self::from_json_str(&raw))
        {   Ok(config) => config
          , Err(e) => {
              warn!("{}; using built-in defaults", e);
              ForgeConfig::default()
            }
        }
    }

    /// Strict parse: malformed input is an error
    pub fn from_json_str(raw: &str) -> Result<Self, Error>
    {   let mut config: ForgeConfig = serde_json::from_str(raw)?;
        config.fill_builtin_tables();
        config.validate()?;
        Ok(config)
    }

    /// Re-add any built-in profile a partial file left out
    fn fill_builtin_tables(&mut self)
    {   for (name, profile) in builtin_styles()
        {   self.styles.entry(name).or_insert(profile);
        }
        for (name, profile) in builtin_lengths()
        {   self.lengths.entry(name).or_insert(profile);
        }
        for (name, pairs) in builtin_audiences()
        {   self.audiences.entry(name).or_insert(pairs);
        }
    }

    pub fn validate(&self) -> Result<(), Error>
    {   if self.seo.weights.total() <= 0.0
        {   return Err(Error::InvalidConfiguration(
              "SEO weights must sum to a positive value".to_string()
            ));
        }
        let bands = [
          ("title_length", self.seo.title_length)
        , ("meta_length", self.seo.meta_length)
        , ("keyword_density", self.seo.keyword_density)
        , ("content_length", self.seo.content_length)
        ];
        for (name, band) in bands
        {   if band.min > band.max
            {   return Err(Error::InvalidConfiguration(
                  format!("band {} has min > max", name)
                ));
            }
        }
        if let Some((name, _)) = self.lengths.iter()
          .find(|(_, p)| p.target_sentence_count == 0)
        {   return Err(Error::InvalidConfiguration(
              format!("length '{}' has a zero sentence target", name)
            ));
        }
        if !self.styles.contains_key(&self.default_style)
        {   return Err(Error::InvalidConfiguration(
              format!("default style '{}' is not defined", self.default_style)
            ));
        }
        if !self.lengths.contains_key(&self.default_length)
        {   return Err(Error::InvalidConfiguration(
              format!("default length '{}' is not defined", self.default_length)
            ));
        }
        Ok(())
    }

    /// Resolve a style name, falling back to the default style
    pub fn style(&self, name: &str) -> (&str, &StyleProfile)
    {   let key = name.trim().to_lowercase();
        if let Some((k, profile)) = self.styles.get_key_value(&key)
        {   return (k.as_str(), profile);
        }
        debug!("Unknown style '{}', using '{}'", name, self.default_style);
        match self.styles.get_key_value(&self.default_style)
        {   Some((k, profile)) => (k.as_str(), profile)
          , None => ("casual", &FALLBACK_STYLE)
        }
    }

    /// Resolve a length name, falling back to the default length
    pub fn length(&self, name: &str) -> (&str, &LengthProfile)
    {   let key = name.trim().to_lowercase();
        if let Some((k, profile)) = self.lengths.get_key_value(&key)
        {   return (k.as_str(), profile);
        }
        debug!("Unknown length '{}', using '{}'", name, self.default_length);
        match self.lengths.get_key_value(&self.default_length)
        {   Some((k, profile)) => (k.as_str(), profile)
          , None => ("medium", &FALLBACK_LENGTH)
        }
    }

    /// Vocabulary pairs for an audience; unknown audiences get none
    pub fn audience(&self, name: &str) -> &[(String, String)]
    {   self.audiences.get(&name.trim().to_lowercase())
          .map(|pairs| pairs.as_slice())
          .unwrap_or(&[])
    }
}

static FALLBACK_STYLE: Lazy<StyleProfile> = Lazy::new(casual_style);

static FALLBACK_LENGTH: LengthProfile = LengthProfile
{   target_sentence_count: 6
  , expansion_ratio_floor: 0.7
};

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)>
{   items.iter()
      .map(|(from, to)| (from.to_string(), to.to_string()))
      .collect()
}

fn builtin_styles() -> HashMap<String, StyleProfile>
{   let mut styles = HashMap::new();
    styles.insert("professional".to_string(), StyleProfile
    {   word_replacements: pairs(&[
          ("use", "utilize"), ("make", "implement")
        , ("help", "facilitate"), ("improve", "optimize")
        , ("start", "initiate"), ("end", "conclude")
        ])
      , sentence_structure: SentenceStructure::Complex
      , tone_markers: strings(&[
          "It is important to note that"
        , "Furthermore,"
        , "In conclusion, these points merit careful consideration."
        ])
    });
    styles.insert("casual".to_string(), casual_style());
    styles.insert("humorous".to_string(), StyleProfile
    {   word_replacements: pairs(&[
          ("good", "amazing"), ("great", "incredible")
        , ("excellent", "mind-blowing"), ("bad", "hilarious")
        , ("problem", "adventure"), ("issue", "challenge")
        ])
      , sentence_structure: SentenceStructure::Varied
      , tone_markers: strings(&[
          "Here's the funny thing:"
        , "Plot twist:"
        , "Drumroll please, that is the whole story!"
        ])
    });
    styles.insert("academic".to_string(), StyleProfile
    {   word_replacements: pairs(&[
          ("also", "furthermore"), ("but", "however")
        , ("so", "consequently"), ("and", "moreover")
        , ("though", "nevertheless")
        , ("because", "due to the fact that")
        ])
      , sentence_structure: SentenceStructure::Complex
      , tone_markers: strings(&[
          "It is worth noting that"
        , "In light of these findings,"
        , "The implications of this are significant."
        ])
    });
    styles
}

fn casual_style() -> StyleProfile
{   StyleProfile
    {   word_replacements: pairs(&[
          ("utilize", "use"), ("implement", "make")
        , ("facilitate", "help"), ("optimize", "improve")
        , ("initiate", "start"), ("conclude", "end")
        ])
      , sentence_structure: SentenceStructure::Simple
      , tone_markers: strings(&[
          "You know what?"
        , "Here's the thing:"
        , "So there you have it!"
        ])
    }
}

fn builtin_lengths() -> HashMap<String, LengthProfile>
{   let mut lengths = HashMap::new();
    for (name, target) in [("short", 3), ("medium", 6), ("long", 10)]
    {   lengths.insert(name.to_string(), LengthProfile
        {   target_sentence_count: target
          , expansion_ratio_floor: 0.7
        });
    }
    lengths
}

fn builtin_audiences() -> HashMap<String, Vec<(String, String)>>
{   let mut audiences = HashMap::new();
    audiences.insert("general".to_string(), vec![]);
    audiences.insert("technical".to_string(), pairs(&[
      ("simple", "straightforward"), ("easy", "efficient")
    , ("basic", "fundamental")
    ]));
    audiences.insert("beginners".to_string(), pairs(&[
      ("complex", "detailed"), ("advanced", "comprehensive")
    , ("sophisticated", "thorough")
    ]));
    audiences.insert("experts".to_string(), pairs(&[
      ("simple", "elementary"), ("basic", "fundamental")
    , ("easy", "straightforward")
    ]));
    audiences
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn default_weights_sum_to_one_hundred()
    {   assert_eq!(SeoWeights::default().total(), 100.0);
        assert!(ForgeConfig::default().validate().is_ok());
    }

    #[test]
    fn breakpoints_pick_first_exceeded_threshold()
    {   let bp = Breakpoints(vec![(0.1, 0.6), (0.05, 0.3), (0.02, 0.1)]);
        assert_eq!(bp.score(0.5), 0.6);
        assert_eq!(bp.score(0.07), 0.3);
        assert_eq!(bp.score(0.03), 0.1);
        assert_eq!(bp.score(0.02), 0.0);
        assert_eq!(bp.score(0.0), 0.0);
    }

    #[test]
    fn unknown_style_falls_back_to_default()
    {   let config = ForgeConfig::default();
        let (name, profile) = config.style("pirate");
        assert_eq!(name, "casual");
        assert_eq!(profile.sentence_structure, SentenceStructure::Simple);
        let (name, _) = config.style(" Professional ");
        assert_eq!(name, "professional");
    }

    #[test]
    fn partial_json_keeps_builtin_tables()
    {   let raw = r#"{
          "orchestrator": { "provider_order": ["mistral", "openai"] },
          "styles": {
            "pirate": {
              "word_replacements": [["hello", "ahoy"]],
              "sentence_structure": "varied",
              "tone_markers": ["Arr,", "Yo ho!"]
            }
          }
        }"#;
        let config = ForgeConfig::from_json_str(raw).unwrap();
        assert_eq!(config.orchestrator.provider_order, vec!["mistral", "openai"]);
        assert_eq!(config.orchestrator.timeout_secs, 30);
        assert!(config.styles.contains_key("pirate"));
        assert!(config.styles.contains_key("professional"));
        assert_eq!(config.lengths["short"].target_sentence_count, 3);
    }

    #[test]
    fn invalid_values_are_rejected()
    {   let raw = r#"{ "seo": { "keyword_density": { "min": 3.0, "max": 1.0 } } }"#;
        assert!(matches!(
          ForgeConfig::from_json_str(raw),
          Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
          ForgeConfig::from_json_str("{ not json"),
          Err(Error::ConfigLoad(_))
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults()
    {   let config = ForgeConfig::load("/definitely/not/here.json");
        assert_eq!(config, ForgeConfig::default());
    }
}
