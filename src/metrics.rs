//! Text tokenization and measurement shared by every scoring stage
//!
//! All functions are pure and total: empty input yields zero counts,
//! zero density and an empty keyword list, never a division by zero.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::Band;

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"\n[ \t\r]*\n").unwrap()
});

static WORD: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"\b\w+\b").unwrap()
});

const STOP_WORDS: &[&str] = &[
  "the", "a", "an", "and", "or", "but", "in", "on", "at", "to"
, "for", "of", "with", "by", "this", "that", "these", "those"
, "from", "into", "about", "your", "their", "have", "will"
];

const POSITIVE_WORDS: &[&str] = &[
  "good", "great", "excellent", "amazing", "wonderful", "fantastic"
];

const NEGATIVE_WORDS: &[&str] = &[
  "bad", "terrible", "awful", "horrible", "disappointing"
];

/// Average adult reading speed used for reading-time estimates
pub const WORDS_PER_MINUTE: usize = 200;

/// Whitespace-separated words
fn words(text: &str) -> Vec<&str>
{   text.split_whitespace().collect()
}

pub fn word_count(text: &str) -> usize
{   text.split_whitespace().count()
}

/// Blocks separated by blank lines, trimmed, empties dropped
pub fn paragraphs(text: &str) -> Vec<&str>
{   PARAGRAPH_BREAK.split(text)
      .map(|p| p.trim())
      .filter(|p| !p.is_empty())
      .collect()
}

/// Sentences ending at `.`, `!` or `?` followed by whitespace, or at a
/// paragraph break. Each sentence keeps its terminator.
pub fn sentences(text: &str) -> Vec<String>
{   let mut out = Vec::new();
    for para in paragraphs(text)
    {   let mut start = 0;
        let mut iter = para.char_indices().peekable();
        while let Some((i, c)) = iter.next()
        {   if !matches!(c, '.' | '!' | '?')
            {   continue;
            }
            if let Some((_, next)) = iter.peek()
            {   if next.is_whitespace()
                {   let end = i + c.len_utf8();
                    let sentence = para[start..end].trim();
                    if !sentence.is_empty()
                    {   out.push(sentence.to_string());
                    }
                    start = end;
                }
            }
        }
        let rest = para[start..].trim();
        if !rest.is_empty()
        {   out.push(rest.to_string());
        }
    }
    out
}

pub(crate) fn sentence_count(text: &str) -> usize
{   sentences(text).len()
}

/// Lowercased, whitespace-collapsed sentence without trailing punctuation
pub fn normalize_sentence(sentence: &str) -> String
{   sentence
      .split_whitespace()
      .collect::<Vec<_>>()
      .join(" ")
      .to_lowercase()
      .trim_end_matches(|c: char| c.is_ascii_punctuation())
      .to_string()
}

/// Estimated reading time in whole minutes, at least one
pub fn reading_time_minutes(word_count: usize) -> usize
{   (word_count / WORDS_PER_MINUTE).max(1)
}

// ===== Keyword density =====

/// Occurrence statistics for one keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordDensity
{   pub count: usize
  , /// Percentage of total words, rounded to two decimals
    pub density_percent: f64
  , pub within_target: bool
}

/// Keyword -> density, recomputed on demand
pub type KeywordDensityReport = BTreeMap<String, KeywordDensity>;

/// Exact word matches plus substring matches of a keyword.
///
/// A word equal to the keyword counts twice (once exact, once as a
/// substring). Multi-word keywords count phrase occurrences instead.
pub fn keyword_matches(lower_words: &[String], keyword: &str) -> usize
{   let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty()
    {   return 0;
    }
    if keyword.contains(char::is_whitespace)
    {   let phrase: Vec<&str> = keyword.split_whitespace().collect();
        return lower_words
          .windows(phrase.len())
          .filter(|window| window.iter()
            .zip(&phrase)
            .all(|(w, p)| w.contains(p)))
          .count();
    }
    let exact = lower_words.iter().filter(|w| **w == keyword).count();
    let partial = lower_words.iter().filter(|w| w.contains(&keyword)).count();
    exact + partial
}

/// Density percentage of a keyword; zero for empty text
pub fn density_percent(text: &str, keyword: &str) -> (usize, f64)
{   let lower_words: Vec<String> = text
      .split_whitespace()
      .map(|w| w.to_lowercase())
      .collect();
    let count = keyword_matches(&lower_words, keyword);
    (count, percent_of(count, lower_words.len()))
}

fn percent_of(count: usize, total: usize) -> f64
{   if total == 0
    {   0.0
    } else
    {   count as f64 / total as f64 * 100.0
    }
}

fn round2(value: f64) -> f64
{   (value * 100.0).round() / 100.0
}

/// Density report for every keyword against the target band
pub fn keyword_density(
  text: &str
, keywords: &[String]
, band: &Band
) -> KeywordDensityReport
{   let lower_words: Vec<String> = text
      .split_whitespace()
      .map(|w| w.to_lowercase())
      .collect();
    keywords.iter()
      .map(|keyword| {
        let count = keyword_matches(&lower_words, keyword);
        let density = percent_of(count, lower_words.len());
        (keyword.clone(), KeywordDensity
        {   count
          , density_percent: round2(density)
          , within_target: band.contains(density)
        })
      })
      .collect()
}

// ===== Readability =====

/// Vowel-group syllable estimate, at least one per word
pub fn syllables(word: &str) -> usize
{   let word: String = word
      .chars()
      .filter(|c| c.is_alphabetic())
      .flat_map(|c| c.to_lowercase())
      .collect();
    if word.is_empty()
    {   return 0;
    }
    let mut count = 0;
    let mut previous_vowel = false;
    for c in word.chars()
    {   let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !previous_vowel
        {   count += 1;
        }
        previous_vowel = vowel;
    }
    if word.ends_with('e') && !word.ends_with("le") && count > 1
    {   count -= 1;
    }
    count.max(1)
}

/// Flesch reading-ease score, 0 for empty text
pub fn flesch_reading_ease(text: &str) -> f64
{   let words = words(text);
    let sentence_total = sentence_count(text).max(1);
    if words.is_empty()
    {   return 0.0;
    }
    let syllable_total: usize = words.iter().map(|w| syllables(w)).sum();
    let words_per_sentence = words.len() as f64 / sentence_total as f64;
    let syllables_per_word = syllable_total as f64 / words.len() as f64;
    round2(206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word)
}

// ===== Heuristic extraction =====

/// Up to ten distinct non-stop-words longer than three characters
pub fn extract_keywords(text: &str) -> Vec<String>
{   let mut out: Vec<String> = Vec::new();
    for m in WORD.find_iter(&text.to_lowercase())
    {   let word = m.as_str();
        if word.chars().count() <= 3 || STOP_WORDS.contains(&word)
        {   continue;
        }
        if !out.iter().any(|w| w == word)
        {   out.push(word.to_string());
        }
        if out.len() == 10
        {   break;
        }
    }
    out
}

/// First and last sentence, cut to `max_chars`
pub fn summarize(text: &str, max_chars: usize) -> String
{   let all = sentences(text);
    let summary = if all.len() <= 2
    {   all.join(" ")
    } else
    {   format!("{} {}", all[0], all[all.len() - 1])
    };
    summary.chars().take(max_chars).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel
{   Positive
  , Negative
  , Neutral
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment
{   pub sentiment: SentimentLabel
  , pub confidence: f64
}

/// Word-list sentiment guess
pub fn sentiment(text: &str) -> Sentiment
{   let lower = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
    if positive > negative
    {   Sentiment { sentiment: SentimentLabel::Positive, confidence: 0.7 }
    } else if negative > positive
    {   Sentiment { sentiment: SentimentLabel::Negative, confidence: 0.7 }
    } else
    {   Sentiment { sentiment: SentimentLabel::Neutral, confidence: 0.5 }
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn sentence_splitting_keeps_terminators()
    {   let s = sentences("A. B! Is it C? yes\n\n# Heading\nNext line.");
        assert_eq!(s, vec!["A.", "B!", "Is it C?", "yes", "# Heading\nNext line."]);
        assert_eq!(sentences("v1.2 is out."), vec!["v1.2 is out."]);
        assert!(sentences("   ").is_empty());
    }

    #[test]
    fn paragraphs_split_on_blank_lines()
    {   assert_eq!(paragraphs("one\n\ntwo\n  \nthree"), vec!["one", "two", "three"]);
    }

    #[test]
    fn density_of_empty_text_is_zero()
    {   let band = Band::new(0.5, 2.5);
        let report = keyword_density("", &["ai".to_string(), "rust".to_string()], &band);
        for entry in report.values()
        {   assert_eq!(entry.count, 0);
            assert_eq!(entry.density_percent, 0.0);
            assert!(!entry.within_target);
        }
    }

    #[test]
    fn density_counts_exact_and_substring_matches()
    {   // one exact hit plus substring hits in "rust" and "rusty"
        let (count, pct) = density_percent("Rust is rusty today", "rust");
        assert_eq!(count, 3);
        assert_eq!(pct, 75.0);
        let (count, _) = density_percent("machine learning and machine learning", "machine learning");
        assert_eq!(count, 2);
    }

    #[test]
    fn normalized_sentences_ignore_case_space_and_punctuation()
    {   assert_eq!(normalize_sentence("  The  Cat sat. "), "the cat sat");
        assert_eq!(normalize_sentence("the cat SAT"), "the cat sat");
    }

    #[test]
    fn reading_time_is_at_least_one_minute()
    {   assert_eq!(reading_time_minutes(0), 1);
        assert_eq!(reading_time_minutes(450), 2);
    }

    #[test]
    fn syllable_heuristic()
    {   assert_eq!(syllables("cat"), 1);
        assert_eq!(syllables("table"), 2);
        assert_eq!(syllables("make"), 1);
        assert_eq!(syllables("readability"), 5);
        assert_eq!(syllables("123"), 0);
    }

    #[test]
    fn readability_of_simple_text_is_high()
    {   assert_eq!(flesch_reading_ease(""), 0.0);
        let easy = flesch_reading_ease("The cat sat. The dog ran.");
        let hard = flesch_reading_ease(
          "Institutional interoperability necessitates comprehensive organizational standardization."
        );
        assert!(easy > hard);
    }

    #[test]
    fn keyword_extraction_skips_stop_words()
    {   let kws = extract_keywords("The garden and the garden soil need water for plants");
        assert_eq!(kws, vec!["garden", "soil", "need", "water", "plants"]);
    }

    #[test]
    fn summary_uses_first_and_last_sentence()
    {   assert_eq!(summarize("One. Two. Three.", 100), "One. Three.");
        assert_eq!(summarize("One. Two.", 100), "One. Two.");
        assert_eq!(summarize("One. Two. Three.", 3), "One");
    }

    #[test]
    fn sentiment_word_lists()
    {   assert_eq!(sentiment("A great and wonderful day").sentiment, SentimentLabel::Positive);
        assert_eq!(sentiment("Awful service").sentiment, SentimentLabel::Negative);
        assert_eq!(sentiment("It rained").confidence, 0.5);
    }
}
