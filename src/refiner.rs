//! Style, length and audience rewriting
//!
//! Refinement runs six steps in a fixed order, each feeding the next:
//! word substitution, sentence structure, tone markers, length, audience
//! vocabulary and a final polish. Each step that changes the text adds one
//! or more lines to the change log. If any step fails the caller gets the
//! original text back with a single diagnostic line.

use std::sync::Arc;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::config::{ForgeConfig, LengthProfile, SentenceStructure, StyleProfile};
use crate::error::Error;
use crate::metrics;

/// Sentences longer than this are split at commas for `simple` styles
const SIMPLE_SPLIT_WORDS: usize = 20;

/// Sentences shorter than this are merged for `complex` styles
const COMPLEX_MERGE_WORDS: usize = 10;

const EXPANSION_TEMPLATES: &[&str] = &[
  "This aspect is particularly important to consider."
, "It's worth exploring this topic further."
, "Additional research supports these findings."
, "This approach has proven effective in various contexts."
, "Further analysis reveals interesting insights."
, "This perspective offers valuable insights."
, "Consider the implications of this approach."
, "This method has demonstrated consistent results."
];

static HORIZONTAL_SPACE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"[ \t]+").unwrap()
});

static SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r" +([.,!?;:])").unwrap()
});

static BLANK_LINE_RUN: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"\n{3,}").unwrap()
});

static SENTENCE_START: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?m)(^|[.!?]\s+)(\p{Ll})").unwrap()
});

/// Refined text plus the ordered change log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refinement
{   pub text: String
  , pub changes: Vec<String>
}

// ===== Document model =====

/// Paragraphs of sentences; rendering joins sentences with a space and
/// paragraphs with a blank line.
#[derive(Debug, Clone)]
struct Document
{   paragraphs: Vec<Vec<String>>
}

impl Document
{   fn parse(text: &str) -> Self
    {   Document
        {   paragraphs: metrics::paragraphs(text)
              .into_iter()
              .map(metrics::sentences)
              .filter(|p| !p.is_empty())
              .collect()
        }
    }

    fn render(&self) -> String
    {   self.paragraphs.iter()
          .filter(|p| !p.is_empty())
          .map(|p| p.join(" "))
          .collect::<Vec<_>>()
          .join("\n\n")
    }

    fn sentence_count(&self) -> usize
    {   self.paragraphs.iter().map(|p| p.len()).sum()
    }

    fn sentence_mut(&mut self, index: usize) -> Option<&mut String>
    {   self.paragraphs.iter_mut().flatten().nth(index)
    }

    /// Keep only the first `keep` sentences
    fn truncate(&mut self, keep: usize)
    {   let mut remaining = keep;
        for paragraph in self.paragraphs.iter_mut()
        {   let take = remaining.min(paragraph.len());
            paragraph.truncate(take);
            remaining -= take;
        }
        self.paragraphs.retain(|p| !p.is_empty());
    }

    /// Append a sentence to the last paragraph
    fn push(&mut self, sentence: String)
    {   match self.paragraphs.last_mut()
        {   Some(paragraph) => paragraph.push(sentence)
          , None => self.paragraphs.push(vec![sentence])
        }
    }
}

// ===== Text helpers =====

fn terminator(sentence: &str) -> Option<char>
{   sentence.chars().last().filter(|c| matches!(*c, '.' | '!' | '?'))
}

fn strip_terminator(sentence: &str) -> &str
{   sentence.trim_end_matches(|c: char| matches!(c, '.' | '!' | '?'))
}

/// Lowercase the first letter unless the first word is an acronym or "I"
fn lower_first(sentence: &str) -> String
{   let first_word = sentence.split_whitespace().next().unwrap_or("");
    let letters: String = first_word.chars().filter(|c| c.is_alphabetic()).collect();
    let keep = letters == "I"
      || (letters.chars().count() > 1 && letters.chars().all(|c| c.is_uppercase()));
    if keep
    {   return sentence.to_string();
    }
    let mut chars = sentence.chars();
    match chars.next()
    {   Some(first) => first.to_lowercase().chain(chars).collect()
      , None => String::new()
    }
}

fn upper_first(word: &str) -> String
{   let mut chars = word.chars();
    match chars.next()
    {   Some(first) => first.to_uppercase().chain(chars).collect()
      , None => String::new()
    }
}

/// Case-insensitive whole-word replacement that keeps a leading capital.
/// Returns `None` when `from` does not occur.
fn replace_word(text: &str, from: &str, to: &str) -> Result<Option<String>, Error>
{   if from.trim().is_empty()
    {   return Ok(None);
    }
    let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(from.trim())))?;
    if !pattern.is_match(text)
    {   return Ok(None);
    }
    let replaced = pattern.replace_all(text, |caps: &Captures| {
      let matched = &caps[0];
      if matched.chars().next().map_or(false, |c| c.is_uppercase())
      {   upper_first(to)
      } else
      {   to.to_string()
      }
    });
    Ok(Some(replaced.into_owned()))
}

// ===== Refiner =====

/// Rule-table driven rewriter
pub struct StyleRefiner
{   config: Arc<ForgeConfig>
}

impl Default for StyleRefiner
{   fn default() -> Self
    {   StyleRefiner::new(Arc::new(ForgeConfig::default()))
    }
}

impl StyleRefiner
{   pub fn new(config: Arc<ForgeConfig>) -> Self
    {   StyleRefiner { config }
    }

    /// Rewrite `text` for a style, length and audience; never fails
    pub fn refine(
      &self
    , text: &str
    , style: &str
    , length: &str
    , audience: &str
    ) -> Refinement
    {   match self.try_refine(text, style, length, audience)
        {   Ok(refinement) => refinement
          , Err(e) => {
              warn!("Content refinement failed: {}", e);
              Refinement
              {   text: text.to_string()
                , changes: vec![e.to_string()]
              }
            }
        }
    }

    fn try_refine(
      &self
    , text: &str
    , style: &str
    , length: &str
    , audience: &str
    ) -> Result<Refinement, Error>
    {   let (style_name, profile) = self.config.style(style);
        let (length_name, length_profile) = self.config.length(length);
        debug!(
          "Refining {} chars as style={} length={} audience={}",
          text.len(), style_name, length_name, audience
        );
        let mut changes = Vec::new();

        let current = self.substitute_words(text, style_name, profile, &mut changes)?;
        let current = adjust_structure(&current, style_name, profile.sentence_structure, &mut changes);
        let current = apply_tone_markers(&current, style_name, profile, &mut changes);
        let current = adjust_length(&current, length_name, length_profile, &mut changes);
        let current = self.adjust_for_audience(&current, audience, &mut changes)?;
        let current = polish(&current, &mut changes);

        Ok(Refinement
        {   text: current
          , changes
        })
    }

    fn substitute_words(
      &self
    , text: &str
    , style_name: &str
    , profile: &StyleProfile
    , changes: &mut Vec<String>
    ) -> Result<String, Error>
    {   let mut current = text.to_string();
        for (from, to) in &profile.word_replacements
        {   if let Some(replaced) = replace_word(&current, from, to)?
            {   current = replaced;
                changes.push(format!(
                  "Replaced '{}' with '{}' for {} style", from, to, style_name
                ));
            }
        }
        Ok(current)
    }

    fn adjust_for_audience(
      &self
    , text: &str
    , audience: &str
    , changes: &mut Vec<String>
    ) -> Result<String, Error>
    {   let audience = audience.trim().to_lowercase();
        let mut current = text.to_string();
        for (from, to) in self.config.audience(&audience)
        {   if let Some(replaced) = replace_word(&current, from, to)?
            {   current = replaced;
                changes.push(format!(
                  "Adjusted vocabulary for {} audience: '{}' -> '{}'",
                  audience, from, to
                ));
            }
        }
        Ok(current)
    }

    /// Flesch reading-ease of refined text
    pub fn readability(&self, text: &str) -> f64
    {   metrics::flesch_reading_ease(text)
    }
}

fn adjust_structure(
  text: &str
, style_name: &str
, structure: SentenceStructure
, changes: &mut Vec<String>
) -> String
{   let mut doc = Document::parse(text);
    match structure
    {   SentenceStructure::Simple => {
          let mut split = 0;
          for paragraph in doc.paragraphs.iter_mut()
          {   let mut out = Vec::with_capacity(paragraph.len());
              for sentence in paragraph.drain(..)
              {   let parts: Vec<&str> = sentence.split(", ").collect();
                  if metrics::word_count(&sentence) > SIMPLE_SPLIT_WORDS && parts.len() > 1
                  {   split += 1;
                      let last = parts.len() - 1;
                      for (i, part) in parts.iter().enumerate()
                      {   let part = part.trim().trim_end_matches(',');
                          if i == last
                          {   out.push(part.to_string());
                          } else
                          {   out.push(format!("{}.", strip_terminator(part)));
                          }
                      }
                  } else
                  {   out.push(sentence);
                  }
              }
              *paragraph = out;
          }
          if split == 0
          {   return text.to_string();
          }
          changes.push(format!(
            "Simplified sentence structure: split {} long sentence(s) for {} style",
            split, style_name
          ));
        }
      , SentenceStructure::Complex => {
          let mut merged = 0;
          for paragraph in doc.paragraphs.iter_mut()
          {   let mut out = Vec::with_capacity(paragraph.len());
              let mut iter = paragraph.drain(..);
              while let Some(sentence) = iter.next()
              {   let short = metrics::word_count(&sentence) < COMPLEX_MERGE_WORDS;
                  match if short { iter.next() } else { None }
                  {   Some(next) => {
                        merged += 1;
                        out.push(format!(
                          "{}, and {}",
                          strip_terminator(&sentence),
                          lower_first(&next)
                        ));
                      }
                    , None => out.push(sentence)
                  }
              }
              drop(iter);
              *paragraph = out;
          }
          if merged == 0
          {   return text.to_string();
          }
          changes.push(format!(
            "Combined {} pair(s) of short sentences for {} style",
            merged, style_name
          ));
        }
      , SentenceStructure::Varied => return text.to_string()
    }
    doc.render()
}

fn apply_tone_markers(
  text: &str
, style_name: &str
, profile: &StyleProfile
, changes: &mut Vec<String>
) -> String
{   let mut doc = Document::parse(text);
    if doc.sentence_count() <= 2 || profile.tone_markers.is_empty()
    {   return text.to_string();
    }
    let opening = &profile.tone_markers[0];
    if let Some(second) = doc.sentence_mut(1)
    {   *second = format!("{} {}", opening, lower_first(second));
    }
    if profile.tone_markers.len() > 1
    {   let closing = &profile.tone_markers[profile.tone_markers.len() - 1];
        let closing = if terminator(closing).is_some()
        {   closing.clone()
        } else
        {   format!("{}.", closing.trim_end_matches(|c: char| c == ',' || c == ':'))
        };
        doc.push(closing);
    }
    changes.push(format!("Applied {} tone markers", style_name));
    doc.render()
}

fn adjust_length(
  text: &str
, length_name: &str
, profile: &LengthProfile
, changes: &mut Vec<String>
) -> String
{   let mut doc = Document::parse(text);
    let current = doc.sentence_count();
    let target = profile.target_sentence_count;

    if current > target
    {   doc.truncate(target);
        changes.push(format!("Shortened content to {} sentences", target));
        return doc.render();
    }

    let floor = profile.expansion_ratio_floor * target as f64;
    if current == 0 || current >= target || (current as f64) >= floor
    {   return text.to_string();
    }

    let mut added = 0;
    for filler in EXPANSION_TEMPLATES.iter().take(target - current)
    {   doc.push(filler.to_string());
        added += 1;
    }
    changes.push(format!(
      "Expanded content with {} sentence(s) to meet {} length requirements",
      added, length_name
    ));
    doc.render()
}

fn polish(text: &str, changes: &mut Vec<String>) -> String
{   let spaced = HORIZONTAL_SPACE.replace_all(text, " ");
    let trimmed = spaced.lines()
      .map(|line| line.trim())
      .collect::<Vec<_>>()
      .join("\n");
    let punctuated = SPACE_BEFORE_PUNCT.replace_all(&trimmed, "$1");
    let paragraphs = BLANK_LINE_RUN.replace_all(&punctuated, "\n\n");
    let capitalized = SENTENCE_START.replace_all(paragraphs.trim(), |caps: &Captures| {
      format!("{}{}", &caps[1], caps[2].to_uppercase())
    });
    let polished = capitalized.into_owned();
    if polished != text
    {   changes.push("Polished spacing, punctuation and capitalization".to_string());
    }
    polished
}

#[cfg(test)]
mod tests
{   use super::*;

    fn refiner() -> StyleRefiner
    {   StyleRefiner::default()
    }

    #[test]
    fn professional_substitutions_log_once_each()
    {   let out = refiner().refine("We use AI to help people.", "professional", "medium", "general");
        assert!(out.text.starts_with("We utilize AI to facilitate people."));
        let use_entries = out.changes.iter()
          .filter(|c| *c == "Replaced 'use' with 'utilize' for professional style")
          .count();
        let help_entries = out.changes.iter()
          .filter(|c| *c == "Replaced 'help' with 'facilitate' for professional style")
          .count();
        assert_eq!(use_entries, 1);
        assert_eq!(help_entries, 1);
    }

    #[test]
    fn replacement_is_whole_word_and_keeps_capitals()
    {   let out = replace_word("Use it. Users use it.", "use", "utilize").unwrap().unwrap();
        assert_eq!(out, "Utilize it. Users utilize it.");
        assert_eq!(replace_word("nothing here", "use", "utilize").unwrap(), None);
    }

    #[test]
    fn unknown_style_uses_default_profile()
    {   let out = refiner().refine("We utilize tools.", "pirate", "short", "general");
        assert!(out.changes.contains(&"Replaced 'utilize' with 'use' for casual style".to_string()));
    }

    #[test]
    fn simple_structure_splits_long_sentences()
    {   let long = "When the team started the migration last spring, they discovered many hidden \
                    dependencies, which slowed the rollout and forced several painful rewrites.";
        let mut changes = Vec::new();
        let out = adjust_structure(long, "casual", SentenceStructure::Simple, &mut changes);
        assert_eq!(metrics::sentence_count(&out), 3);
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn complex_structure_merges_short_pairs()
    {   let mut changes = Vec::new();
        let out = adjust_structure("It rains. The ground is wet.", "academic", SentenceStructure::Complex, &mut changes);
        assert_eq!(out, "It rains, and the ground is wet.");
        assert_eq!(changes.len(), 1);

        let mut changes = Vec::new();
        let out = adjust_structure("One sentence only.", "academic", SentenceStructure::Complex, &mut changes);
        assert_eq!(out, "One sentence only.");
        assert!(changes.is_empty());
    }

    #[test]
    fn tone_markers_need_three_sentences()
    {   let config = ForgeConfig::default();
        let (_, profile) = config.style("academic");
        let mut changes = Vec::new();
        let out = apply_tone_markers("A b. C d.", "academic", profile, &mut changes);
        assert_eq!(out, "A b. C d.");
        assert!(changes.is_empty());

        let out = apply_tone_markers("First one. Second one. Third one.", "academic", profile, &mut changes);
        assert_eq!(
          out,
          "First one. It is worth noting that second one. Third one. The implications of this are significant."
        );
        assert_eq!(changes, vec!["Applied academic tone markers".to_string()]);
    }

    #[test]
    fn length_truncates_and_expands()
    {   let short = LengthProfile { target_sentence_count: 2, expansion_ratio_floor: 0.7 };
        let mut changes = Vec::new();
        let out = adjust_length("A. B. C. D.", "short", &short, &mut changes);
        assert_eq!(out, "A. B.");
        assert_eq!(changes, vec!["Shortened content to 2 sentences".to_string()]);

        let long = LengthProfile { target_sentence_count: 4, expansion_ratio_floor: 0.7 };
        let mut changes = Vec::new();
        let out = adjust_length("Only one.", "long", &long, &mut changes);
        assert_eq!(metrics::sentence_count(&out), 4);
        assert!(out.starts_with("Only one. This aspect is particularly important"));

        let mut changes = Vec::new();
        let out = adjust_length("", "long", &long, &mut changes);
        assert_eq!(out, "");
        assert!(changes.is_empty());
    }

    #[test]
    fn length_at_target_is_left_alone_with_high_floor()
    {   let eager = LengthProfile { target_sentence_count: 2, expansion_ratio_floor: 1.5 };
        let mut changes = Vec::new();
        let out = adjust_length("One. Two.", "eager", &eager, &mut changes);
        assert_eq!(out, "One. Two.");
        assert!(changes.is_empty());
    }

    #[test]
    fn expansion_stops_when_pool_runs_out()
    {   let huge = LengthProfile { target_sentence_count: 40, expansion_ratio_floor: 0.7 };
        let mut changes = Vec::new();
        let out = adjust_length("Seed.", "huge", &huge, &mut changes);
        assert_eq!(metrics::sentence_count(&out), 1 + EXPANSION_TEMPLATES.len());
    }

    #[test]
    fn audience_vocabulary()
    {   let out = refiner().refine("A simple and easy fix.", "humorous", "short", "experts");
        assert!(out.text.contains("elementary"));
        assert!(out.text.contains("straightforward"));
        assert!(out.changes.iter().any(|c| c.starts_with("Adjusted vocabulary for experts audience")));
    }

    #[test]
    fn polish_fixes_spacing_and_capitals()
    {   let mut changes = Vec::new();
        let out = polish("hello   world .  next one !\n\n\n\n# Title\nbody text", &mut changes);
        assert_eq!(out, "Hello world. Next one!\n\n# Title\nBody text");
        assert_eq!(changes.len(), 1);

        let mut changes = Vec::new();
        assert_eq!(polish("Clean text.", &mut changes), "Clean text.");
        assert!(changes.is_empty());
    }

    #[test]
    fn paragraphs_survive_refinement()
    {   let text = "# Guide\n\nFirst point here. Second point here. Third point here.";
        let out = refiner().refine(text, "humorous", "medium", "general");
        assert!(out.text.starts_with("# Guide\n\n"));
    }

    #[test]
    fn empty_text_is_returned_empty()
    {   let out = refiner().refine("", "casual", "medium", "general");
        assert_eq!(out.text, "");
        assert!(out.changes.is_empty());
    }
}
