//! Heuristic plagiarism risk and bucketed fact verification
//!
//! Nothing here consults an outside corpus. The four plagiarism signals are
//! pattern counts over the text itself, and fact "verification" assigns each
//! extracted claim to a fixed outcome by hashing its text.

use std::collections::HashMap;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use md5::{Digest, Md5};

use crate::config::OriginalityConfig;
use crate::metrics;

static FACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
  [
    r"\b\d{4}\b"
  , r"\d+(?:\.\d+)?%"
  , r"\$\d[\d,]*(?:\.\d+)?"
  , r"(?i)according to [^.]*"
  , r"(?i)studies show [^.]*"
  , r"(?i)research indicates [^.]*"
  , r"(?i)the fact that [^.]*"
  , r"(?i)it is known that [^.]*"
  ]
  .iter()
  .map(|p| Regex::new(p).unwrap())
  .collect()
});

/// Verification outcome assigned to a fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactStatus
{   Verified
  , Disputed
  , Unverified
  , False
}

impl FactStatus
{   const BUCKETS: [FactStatus; 4] = [
      FactStatus::Verified
    , FactStatus::Disputed
    , FactStatus::Unverified
    , FactStatus::False
    ];

    /// Stable bucket: first byte of the MD5 digest, mod 4
    pub fn for_fact(fact: &str) -> Self
    {   let digest = Md5::digest(fact.as_bytes());
        Self::BUCKETS[digest[0] as usize % Self::BUCKETS.len()]
    }

    pub fn confidence(&self) -> f64
    {   match self
        {   FactStatus::Verified => 0.9
          , FactStatus::Disputed => 0.7
          , FactStatus::Unverified => 0.3
          , FactStatus::False => 0.8
        }
    }

    pub fn source(&self) -> &'static str
    {   match self
        {   FactStatus::Verified => "reliable_source"
          , FactStatus::Disputed => "multiple_sources"
          , FactStatus::Unverified => "no_sources"
          , FactStatus::False => "fact_check_org"
        }
    }

    pub fn suggestion(&self) -> &'static str
    {   match self
        {   FactStatus::Verified =>
              "This fact appears to be accurate based on reliable sources."
          , FactStatus::Disputed =>
              "This claim is disputed by multiple sources. Consider providing additional context."
          , FactStatus::Unverified =>
              "This claim could not be verified. Consider adding a source or removing the claim."
          , FactStatus::False =>
              "This claim appears to be incorrect. Please verify and correct the information."
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCandidate
{   pub text: String
  , pub status: FactStatus
  , pub confidence: f64
  , pub source: String
  , pub suggestion: String
}

impl FactCandidate
{   pub fn assess(text: impl Into<String>) -> Self
    {   let text = text.into();
        let status = FactStatus::for_fact(&text);
        FactCandidate
        {   text
          , status
          , confidence: status.confidence()
          , source: status.source().to_string()
          , suggestion: status.suggestion().to_string()
        }
    }
}

/// The four sub-scores averaged into the plagiarism score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginalitySignals
{   pub common_phrases: f64
  , pub exact_matches: f64
  , pub similar_content: f64
  , pub duplication: f64
}

impl OriginalitySignals
{   pub fn mean(&self) -> f64
    {   (self.common_phrases + self.exact_matches + self.similar_content + self.duplication)
          / 4.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlagiarismReport
{   /// Risk in `[0, 1]`
    pub score: f64
  , pub signals: OriginalitySignals
  , pub fact_candidates: Vec<FactCandidate>
  , pub recommendations: Vec<String>
}

fn ratio(part: usize, whole: usize) -> f64
{   if whole == 0
    {   0.0
    } else
    {   part as f64 / whole as f64
    }
}

#[derive(Debug, Clone, Default)]
pub struct OriginalityChecker
{   config: OriginalityConfig
}

impl OriginalityChecker
{   pub fn new(config: OriginalityConfig) -> Self
    {   OriginalityChecker { config }
    }

    /// Score the text and, if asked, extract and bucket its facts
    pub fn check(&self, text: &str, check_facts: bool) -> PlagiarismReport
    {   let signals = self.signals(text);
        let score = signals.mean().min(1.0);
        let fact_candidates = if check_facts
        {   self.extract_facts(text)
              .into_iter()
              .map(FactCandidate::assess)
              .collect()
        } else
        {   Vec::new()
        };
        debug!(
          "Originality check: score {:.3}, {} fact(s)",
          score,
          fact_candidates.len()
        );
        let recommendations = self.recommendations(score, &fact_candidates);
        PlagiarismReport
        {   score
          , signals
          , fact_candidates
          , recommendations
        }
    }

    pub fn signals(&self, text: &str) -> OriginalitySignals
    {   let sentences = metrics::sentences(text);
        OriginalitySignals
        {   common_phrases: self.common_phrase_score(text)
          , exact_matches: self.exact_match_score(&sentences)
          , similar_content: self.similar_content_score(text)
          , duplication: self.duplication_score(&sentences)
        }
    }

    fn common_phrase_score(&self, text: &str) -> f64
    {   let lower = text.to_lowercase();
        let hits: usize = self.config.common_phrases.iter()
          .map(|phrase| lower.matches(phrase.as_str()).count())
          .sum();
        self.config.common_phrase_breakpoints
          .score(ratio(hits, metrics::word_count(text)))
    }

    fn exact_match_score(&self, sentences: &[String]) -> f64
    {   let hits = sentences.iter()
          .filter(|s| s.chars().count() > 10)
          .filter(|s| contains_any(s, &self.config.boilerplate_patterns))
          .count();
        self.config.exact_match_breakpoints.score(ratio(hits, sentences.len()))
    }

    fn similar_content_score(&self, text: &str) -> f64
    {   let paragraphs = metrics::paragraphs(text);
        let hits = paragraphs.iter()
          .filter(|p| p.chars().count() > 20)
          .filter(|p| contains_any(p, &self.config.generic_structures))
          .count();
        self.config.similar_content_breakpoints.score(ratio(hits, paragraphs.len()))
    }

    /// Repeats of an earlier sentence, ignoring case, spacing and end punctuation
    fn duplication_score(&self, sentences: &[String]) -> f64
    {   let mut seen: HashMap<String, usize> = HashMap::new();
        for sentence in sentences
        {   let key = metrics::normalize_sentence(sentence);
            if !key.is_empty()
            {   *seen.entry(key).or_insert(0) += 1;
            }
        }
        let repeats: usize = seen.values().map(|count| count - 1).sum();
        self.config.duplication_breakpoints.score(ratio(repeats, sentences.len()))
    }

    /// Fact-like fragments: pattern hits first, then sentences with a digit
    /// or a research keyword. Distinct, in order, capped.
    pub fn extract_facts(&self, text: &str) -> Vec<String>
    {   let mut facts: Vec<String> = Vec::new();
        let mut push = |fact: &str| {
          let fact = fact.trim();
          if !fact.is_empty() && !facts.iter().any(|f| f == fact)
          {   facts.push(fact.to_string());
          }
        };

        for pattern in FACT_PATTERNS.iter()
        {   for m in pattern.find_iter(text)
            {   push(m.as_str());
            }
        }
        for sentence in metrics::sentences(text)
        {   let lower = sentence.to_lowercase();
            if sentence.chars().any(|c| c.is_ascii_digit())
              || self.config.research_keywords.iter().any(|k| lower.contains(k.as_str()))
            {   push(&sentence);
            }
        }

        facts.truncate(self.config.max_facts);
        facts
    }

    /// Threshold message for the score, one message per non-empty
    /// problem bucket, and a publish note for clean fact-free text
    pub fn recommendations(&self, score: f64, facts: &[FactCandidate]) -> Vec<String>
    {   let c = &self.config;
        let mut out = Vec::new();
        let verdict = if score > c.rewrite_threshold
        {   "High plagiarism risk detected. Consider rewriting the content completely."
        } else if score > c.review_threshold
        {   "Moderate plagiarism risk. Review and rewrite suspicious sections."
        } else if score > c.paraphrase_threshold
        {   "Some plagiarism detected. Consider paraphrasing certain sections."
        } else
        {   "Content appears to be original. Good job!"
        };
        out.push(verdict.to_string());

        let count = |status: FactStatus| facts.iter().filter(|f| f.status == status).count();
        let false_claims = count(FactStatus::False);
        if false_claims > 0
        {   out.push(format!(
              "Found {} potentially false claims. Please verify and correct.",
              false_claims
            ));
        }
        let disputed = count(FactStatus::Disputed);
        if disputed > 0
        {   out.push(format!(
              "Found {} disputed claims. Consider providing additional context.",
              disputed
            ));
        }
        let unverified = count(FactStatus::Unverified);
        if unverified > 0
        {   out.push(format!(
              "Found {} unverified claims. Consider adding sources or removing claims.",
              unverified
            ));
        }

        if score < c.publish_threshold && facts.is_empty()
        {   out.push(
              "Content appears to be original and factual. Ready for publication!".to_string()
            );
        }
        out
    }
}

fn contains_any(text: &str, patterns: &[String]) -> bool
{   let lower = text.to_lowercase();
    patterns.iter().any(|p| lower.contains(p.as_str()))
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn empty_text_is_original()
    {   let report = OriginalityChecker::default().check("", true);
        assert_eq!(report.score, 0.0);
        assert!(report.fact_candidates.is_empty());
        assert_eq!(report.recommendations, vec![
          "Content appears to be original. Good job!".to_string()
        , "Content appears to be original and factual. Ready for publication!".to_string()
        ]);
    }

    #[test]
    fn repeated_sentence_raises_duplication()
    {   let signals = OriginalityChecker::default().signals("A. B. A.");
        assert_eq!(signals.duplication, 0.6);
        assert_eq!(signals.common_phrases, 0.0);
    }

    #[test]
    fn duplicates_ignore_case_and_spacing()
    {   let checker = OriginalityChecker::default();
        let sentences = metrics::sentences("The cat sat. the  CAT sat! Dogs run.");
        assert_eq!(checker.duplication_score(&sentences), 0.6);
    }

    #[test]
    fn filler_phrases_are_counted()
    {   // 2 phrases over 12 words
        let text = "However the plan works. Therefore we continue with the next big step.";
        let signals = OriginalityChecker::default().signals(text);
        assert_eq!(signals.common_phrases, 0.3);
    }

    #[test]
    fn boilerplate_and_generic_structures()
    {   let text = "In this article, we will cover gardens.\n\n\
                    The key benefits include fresh food and exercise.";
        let signals = OriginalityChecker::default().signals(text);
        assert_eq!(signals.exact_matches, 0.8);
        assert_eq!(signals.similar_content, 0.7);
    }

    #[test]
    fn fact_buckets_follow_md5_first_byte()
    {   assert_eq!(FactCandidate::assess("2021").status, FactStatus::Disputed);
        assert_eq!(FactCandidate::assess("45%").status, FactStatus::Verified);
        let boiling = FactCandidate::assess("Water boils at 100 degrees.");
        assert_eq!(boiling.status, FactStatus::False);
        assert_eq!(boiling.confidence, 0.8);
        assert_eq!(boiling.source, "fact_check_org");
    }

    #[test]
    fn facts_skipped_when_not_requested()
    {   let report = OriginalityChecker::default()
          .check("In 2021, 45% of teams grew. Research found more.", false);
        assert!(report.fact_candidates.is_empty());
    }

    #[test]
    fn fact_extraction_order_and_dedupe()
    {   let facts = OriginalityChecker::default()
          .extract_facts("Sales rose 45% in 2021. Studies show growth. 45% again.");
        assert_eq!(facts[0], "2021");
        assert_eq!(facts[1], "45%");
        assert!(facts.contains(&"Studies show growth".to_string()));
        assert!(facts.contains(&"Sales rose 45% in 2021.".to_string()));
        assert_eq!(facts.iter().filter(|f| f.as_str() == "45%").count(), 1);
    }

    #[test]
    fn fact_limit_applies()
    {   let text = (1..=20)
          .map(|n| format!("Item {} sold.", n))
          .collect::<Vec<_>>()
          .join(" ");
        assert_eq!(OriginalityChecker::default().extract_facts(&text).len(), 10);
    }

    #[test]
    fn buckets_are_deterministic()
    {   let a = FactCandidate::assess("Water boils at 100 degrees.");
        let b = FactCandidate::assess("Water boils at 100 degrees.");
        assert_eq!(a, b);
        assert_eq!(a.confidence, a.status.confidence());
        assert_eq!(a.source, a.status.source());
    }

    #[test]
    fn recommendations_follow_thresholds()
    {   let checker = OriginalityChecker::default();
        assert!(checker.recommendations(0.9, &[])[0].starts_with("High plagiarism risk"));
        assert!(checker.recommendations(0.7, &[])[0].starts_with("Moderate"));
        assert!(checker.recommendations(0.4, &[])[0].starts_with("Some plagiarism"));
        assert_eq!(checker.recommendations(0.25, &[]).len(), 1);

        let fact = FactCandidate
        {   text: "x".to_string()
          , status: FactStatus::Disputed
          , confidence: 0.7
          , source: "multiple_sources".to_string()
          , suggestion: String::new()
        };
        let recs = checker.recommendations(0.0, &[fact.clone(), fact]);
        assert_eq!(recs, vec![
          "Content appears to be original. Good job!".to_string()
        , "Found 2 disputed claims. Consider providing additional context.".to_string()
        ]);
    }
}
