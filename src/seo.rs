//! Weighted SEO scoring and structural optimization
//!
//! Both HTML and Markdown forms count as the same element: `<h1>` or
//! `# `, `<h2>` or `## `, `<h3>` or `### `, `<a href>` or `[text](url)`.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::SeoConfig;
use crate::metrics::{self, KeywordDensityReport};

static H1_HTML: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap()
});

static H1_MARKDOWN: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?m)^#[ \t]+(.+)$").unwrap()
});

static H2: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?im)<h2[^>]*>|^##[ \t]+\S").unwrap()
});

static H3: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?im)<h3[^>]*>|^###[ \t]+\S").unwrap()
});

static META_DESCRIPTION: Lazy<Regex> = Lazy::new(|| {
  Regex::new(
    r#"(?i)<meta[^>]*name=["']description["'][^>]*content=["']([^"']*)["']"#
  ).unwrap()
});

static META_PRESENT: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r#"(?i)<meta[^>]*name=["']description["']"#).unwrap()
});

static LINK: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r#"(?i)<a[^>]*href=["'][^"']*["'][^>]*>|\[[^\]]+\]\([^)\s]+\)"#).unwrap()
});

static NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?m)^[ \t]*\d+\.[ \t]+").unwrap()
});

static CLOSING_SECTION: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)conclusion|summary|final").unwrap()
});

const RELATED_HEADING: &str = "## Related Content";

/// Six normalized components plus the weighted 0-100 total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoScoreBreakdown
{   pub title_score: f64
  , pub density_score: f64
  , pub structure_score: f64
  , pub length_score: f64
  , pub meta_score: f64
  , pub links_score: f64
  , pub total: f64
}

/// Output of [`SeoScorer::optimize`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoOptimization
{   pub text: String
  , pub keyword_density: KeywordDensityReport
  , pub breakdown: SeoScoreBreakdown
  , /// Mutations applied, in order
    pub changes: Vec<String>
}

fn title_case(phrase: &str) -> String
{   phrase.split_whitespace()
      .map(|word| {
        let mut chars = word.chars();
        match chars.next()
        {   Some(first) => first.to_uppercase()
              .chain(chars.flat_map(|c| c.to_lowercase()))
              .collect()
          , None => String::new()
        }
      })
      .collect::<Vec<String>>()
      .join(" ")
}

fn title_text(text: &str) -> Option<String>
{   H1_HTML.captures(text)
      .or_else(|| H1_MARKDOWN.captures(text))
      .map(|caps| caps[1].trim().to_string())
}

fn has_h2(text: &str) -> bool
{   H2.is_match(text)
}

fn link_count(text: &str) -> usize
{   LINK.find_iter(text).count()
}

/// Weighted SEO scorer; every method is a pure function of its inputs
#[derive(Debug, Clone, Default)]
pub struct SeoScorer
{   config: SeoConfig
}

impl SeoScorer
{   pub fn new(config: SeoConfig) -> Self
    {   SeoScorer { config }
    }

    pub fn density(&self, text: &str, keywords: &[String]) -> KeywordDensityReport
    {   metrics::keyword_density(text, keywords, &self.config.keyword_density)
    }

    /// Score without mutating anything
    pub fn score(&self, text: &str, keywords: &[String]) -> SeoScoreBreakdown
    {   let title_score = self.evaluate_title(text, keywords);
        let density_score = self.evaluate_density(text, keywords);
        let structure_score = evaluate_structure(text);
        let length_score = self.evaluate_length(text);
        let meta_score = self.evaluate_meta(text);
        let links_score = evaluate_links(text);

        let w = &self.config.weights;
        let weighted = title_score * w.title
          + density_score * w.density
          + structure_score * w.structure
          + length_score * w.length
          + meta_score * w.meta
          + links_score * w.links;
        let total = if w.total() > 0.0
        {   (weighted * 100.0 / w.total()).min(100.0)
        } else
        {   0.0
        };

        SeoScoreBreakdown
        {   title_score
          , density_score
          , structure_score
          , length_score
          , meta_score
          , links_score
          , total
        }
    }

    fn evaluate_title(&self, text: &str, keywords: &[String]) -> f64
    {   let title = match title_text(text)
        {   Some(title) => title
          , None => return 0.0
        };
        let mut score = if self.config.title_length
          .contains(title.chars().count() as f64)
        {   0.5
        } else
        {   0.2
        };
        let lower = title.to_lowercase();
        if keywords.iter()
          .map(|k| k.trim().to_lowercase())
          .any(|k| !k.is_empty() && lower.contains(&k))
        {   score += 0.5;
        }
        score
    }

    fn evaluate_density(&self, text: &str, keywords: &[String]) -> f64
    {   if keywords.is_empty()
        {   return 0.0;
        }
        let report = self.density(text, keywords);
        let within = report.values().filter(|d| d.within_target).count();
        within as f64 / report.len().max(1) as f64
    }

    fn evaluate_length(&self, text: &str) -> f64
    {   let words = metrics::word_count(text) as f64;
        let band = &self.config.content_length;
        if band.contains(words)
        {   1.0
        } else if words < band.min
        {   0.3
        } else
        {   0.7
        }
    }

    fn evaluate_meta(&self, text: &str) -> f64
    {   match META_DESCRIPTION.captures(text)
        {   Some(caps) => {
              let length = caps[1].chars().count() as f64;
              if self.config.meta_length.contains(length) { 1.0 } else { 0.5 }
            }
          , None if META_PRESENT.is_match(text) => 0.5
          , None => 0.0
        }
    }

    /// Improvement hints, in a fixed order
    pub fn suggestions(&self, text: &str, keywords: &[String]) -> Vec<String>
    {   let mut suggestions = Vec::new();
        let band = &self.config.keyword_density;

        for keyword in keywords
        {   let (_, density) = metrics::density_percent(text, keyword);
            if density < band.min
            {   suggestions.push(format!(
                  "Low keyword density for '{}' - consider adding more naturally",
                  keyword
                ));
            } else if density > band.max
            {   suggestions.push(format!(
                  "High keyword density for '{}' - reduce keyword stuffing",
                  keyword
                ));
            }
        }
        if title_text(text).is_none()
        {   suggestions.push(
              "Missing H1 title - add a compelling title with target keywords".to_string()
            );
        }
        if !has_h2(text)
        {   suggestions.push(
              "Missing H2 headings - add subheadings to improve structure".to_string()
            );
        }
        let words = metrics::word_count(text) as f64;
        if words < self.config.content_length.min
        {   suggestions.push(
              "Content is too short - expand to provide more value".to_string()
            );
        } else if words > self.config.content_length.max
        {   suggestions.push(
              "Content is very long - consider splitting it into several pieces".to_string()
            );
        }
        if !META_PRESENT.is_match(text)
        {   suggestions.push(
              "Missing meta description - add for better search results".to_string()
            );
        }
        if link_count(text) < 2
        {   suggestions.push(
              "Add more internal links to improve site structure".to_string()
            );
        }
        suggestions
    }

    /// Insert missing structure, then rescore.
    ///
    /// Every structural insertion checks for its element first, so running
    /// `optimize` on its own output adds no second title, heading, meta
    /// description, summary or related-links section.
    pub fn optimize(
      &self
    , text: &str
    , keywords: &[String]
    , target_url: Option<&str>
    ) -> SeoOptimization
    {   let primary = keywords.iter()
          .map(|k| k.trim())
          .find(|k| !k.is_empty());
        let mut changes = Vec::new();
        let mut current = text.trim().to_string();

        if let Some(primary) = primary
        {   if title_text(&current).is_none()
            {   current = format!("# {} - Complete Guide\n\n{}", title_case(primary), current)
                  .trim_end()
                  .to_string();
                changes.push("Added H1 title".to_string());
            }
            if !has_h2(&current)
            {   let heading = format!("## Why {} Matters", title_case(primary));
                let mut paragraphs: Vec<String> = metrics::paragraphs(&current)
                  .into_iter()
                  .map(|p| p.to_string())
                  .collect();
                let at = paragraphs.len().min(1);
                paragraphs.insert(at, heading);
                current = paragraphs.join("\n\n");
                changes.push("Added H2 subheading".to_string());
            }
        }

        for keyword in keywords
        {   if let Some(updated) = self.raise_keyword(&current, keyword)
            {   current = updated;
                changes.push(format!("Added a sentence featuring '{}'", keyword.trim()));
            }
        }

        if !META_PRESENT.is_match(&current)
        {   let subject = primary.unwrap_or("content")
              .replace(&['"', '\''][..], "");
            let meta = format!(
              "<meta name=\"description\" content=\"Learn about {} with our comprehensive guide. \
               Discover best practices, tips, and insights.\">",
              subject
            );
            current = if current.contains("<head>")
            {   current.replacen("<head>", &format!("<head>\n{}", meta), 1)
            } else
            {   format!("{}\n\n{}", meta, current).trim_end().to_string()
            };
            changes.push("Added meta description".to_string());
        }

        if current.contains("Key Points") || current.contains("Benefits")
        {   let listed = NUMBERED_ITEM.replace_all(&current, "* ").into_owned();
            if listed != current
            {   current = listed;
                changes.push("Converted numbered items to bullet points".to_string());
            }
        }
        if !CLOSING_SECTION.is_match(&current)
        {   current.push_str(
              "\n\n## Summary\n\nThis comprehensive guide provides valuable insights and practical advice."
            );
            changes.push("Added summary section".to_string());
        }

        if let Some(section) = target_url.and_then(related_links)
        {   if !current.contains(RELATED_HEADING)
            {   current.push_str("\n\n");
                current.push_str(&section);
                changes.push("Added related links section".to_string());
            }
        }

        debug!("SEO optimize applied {} change(s)", changes.len());
        SeoOptimization
        {   keyword_density: self.density(&current, keywords)
          , breakdown: self.score(&current, keywords)
          , text: current
          , changes
        }
    }

    /// Append one sentence mentioning `keyword` when it is under target
    /// and the sentence is not already there
    fn raise_keyword(&self, text: &str, keyword: &str) -> Option<String>
    {   let keyword = keyword.trim();
        if keyword.is_empty()
        {   return None;
        }
        let sentence = format!("This is particularly important when considering {}.", keyword);
        if text.contains(&sentence)
        {   return None;
        }
        let lower_keyword = keyword.to_lowercase();
        let current_count = text.to_lowercase().matches(&lower_keyword).count();
        let target_count = (self.config.target_density / 100.0
          * metrics::word_count(text) as f64) as usize;
        if current_count >= target_count
        {   return None;
        }

        let mut paragraphs: Vec<String> = metrics::paragraphs(text)
          .into_iter()
          .map(|p| p.to_string())
          .collect();
        let body = paragraphs.iter_mut().find(|p| {
          !p.starts_with('#') && !p.starts_with('<') && !p.starts_with('*')
            && !p.starts_with('-') && !p.to_lowercase().contains(&lower_keyword)
        });
        match body
        {   Some(paragraph) => {
              paragraph.push(' ');
              paragraph.push_str(&sentence);
            }
          , None => paragraphs.push(sentence)
        }
        Some(paragraphs.join("\n\n"))
    }
}

fn evaluate_structure(text: &str) -> f64
{   let mut score = 0.0;
    if title_text(text).is_some()
    {   score += 0.3;
    }
    if has_h2(text)
    {   score += 0.4;
    }
    if H3.is_match(text)
    {   score += 0.3;
    }
    f64::min(score, 1.0)
}

fn evaluate_links(text: &str) -> f64
{   match link_count(text)
    {   0 => 0.0
      , 1 => 0.5
      , _ => 1.0
    }
}

/// Related-links section rooted at the target URL's site
fn related_links(target_url: &str) -> Option<String>
{   let url = reqwest::Url::parse(target_url).ok()?;
    url.host_str()?;
    let link = |path: &str| url.join(path)
      .map(|u| u.to_string())
      .unwrap_or_else(|_| path.to_string());
    Some(format!(
      "{}\n\n- [More about this topic]({})\n- [Best practices]({})\n- [FAQ]({})",
      RELATED_HEADING,
      link("/related"),
      link("/best-practices"),
      link("/faq")
    ))
}

#[cfg(test)]
mod tests
{   use super::*;

    fn kw(items: &[&str]) -> Vec<String>
    {   items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_text_scores_only_length_penalty()
    {   let b = SeoScorer::default().score("", &kw(&["ai"]));
        assert_eq!(b.title_score, 0.0);
        assert_eq!(b.density_score, 0.0);
        assert_eq!(b.structure_score, 0.0);
        assert_eq!(b.length_score, 0.3);
        assert_eq!(b.meta_score, 0.0);
        assert_eq!(b.links_score, 0.0);
        assert!((b.total - 4.5).abs() < 1e-9);
    }

    #[test]
    fn title_scoring()
    {   let scorer = SeoScorer::default();
        // 36 chars, inside the 30-60 band, contains keyword
        let text = "# Practical Rust Error Handling Guide\n\nBody.";
        assert_eq!(scorer.evaluate_title(text, &kw(&["rust"])), 1.0);
        assert_eq!(scorer.evaluate_title(text, &kw(&["python"])), 0.5);
        assert!((scorer.evaluate_title("<h1>Short</h1>", &kw(&["short"])) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn structure_counts_html_and_markdown()
    {   assert!((evaluate_structure("<h1>A</h1><h2>B</h2>") - 0.7).abs() < 1e-9);
        assert!((evaluate_structure("# A\n\n## B\n\n### C") - 1.0).abs() < 1e-9);
        assert_eq!(evaluate_structure("## Only"), 0.4);
    }

    #[test]
    fn meta_and_links()
    {   let scorer = SeoScorer::default();
        let short_meta = r#"<meta name="description" content="Too short">"#;
        assert_eq!(scorer.evaluate_meta(short_meta), 0.5);
        let good = format!(r#"<meta name="description" content="{}">"#, "x".repeat(130));
        assert_eq!(scorer.evaluate_meta(&good), 1.0);
        assert_eq!(evaluate_links("[a](/a)"), 0.5);
        assert_eq!(evaluate_links(r#"<a href="/x">x</a> and [b](/b)"#), 1.0);
    }

    #[test]
    fn score_is_pure()
    {   let scorer = SeoScorer::default();
        let text = "# Title about ai things here and there\n\nSome ai text.";
        assert_eq!(scorer.score(text, &kw(&["ai"])), scorer.score(text, &kw(&["ai"])));
    }

    #[test]
    fn optimize_inserts_each_element_once()
    {   let scorer = SeoScorer::default();
        let keywords = kw(&["solar power"]);
        let once = scorer.optimize(
          "Panels are getting cheaper every year.",
          &keywords,
          Some("https://example.com/blog/solar")
        );
        assert!(once.text.contains("# Solar Power - Complete Guide"));
        assert!(once.text.contains("## Why Solar Power Matters"));
        assert!(once.text.contains("<meta name=\"description\""));
        assert!(once.text.contains("## Summary"));
        assert!(once.text.contains("(https://example.com/faq)"));
        assert_eq!(once.breakdown.links_score, 1.0);

        let twice = scorer.optimize(&once.text, &keywords, Some("https://example.com/blog/solar"));
        for marker in ["# Solar Power - Complete Guide", "## Why", "<meta name=", "## Summary", RELATED_HEADING]
        {   assert_eq!(
              twice.text.matches(marker).count(),
              once.text.matches(marker).count(),
              "{} duplicated", marker
            );
        }
    }

    #[test]
    fn long_body_gets_one_keyword_sentence_across_runs()
    {   let scorer = SeoScorer::default();
        let keywords = kw(&["solar"]);
        let body = "Panels on the roof cut the monthly power bill for most homes. ".repeat(90);
        let sentence = "This is particularly important when considering solar.";

        let once = scorer.optimize(&body, &keywords, None);
        assert_eq!(once.text.matches(sentence).count(), 1);

        let twice = scorer.optimize(&once.text, &keywords, None);
        assert_eq!(twice.text.matches(sentence).count(), 1);
        assert_eq!(
          metrics::sentence_count(&twice.text),
          metrics::sentence_count(&once.text)
        );
        assert!(twice.changes.is_empty());
    }

    #[test]
    fn optimize_without_keywords_skips_headings()
    {   let out = SeoScorer::default().optimize("Plain words.", &[], None);
        assert!(!out.text.contains("Complete Guide"));
        assert!(!out.text.contains("## Why"));
        assert!(out.text.contains("Learn about content"));
        assert!(!out.text.contains(RELATED_HEADING));
    }

    #[test]
    fn numbered_lists_become_bullets_under_key_points()
    {   let text = "Key Points\n\n1. First\n2. Second\n\nIn conclusion, done.";
        let out = SeoScorer::default().optimize(text, &[], None);
        assert!(out.text.contains("* First\n* Second"));
        assert!(out.changes.contains(&"Converted numbered items to bullet points".to_string()));
    }

    #[test]
    fn under_represented_keyword_gets_a_sentence()
    {   let body = "word ".repeat(200);
        let out = SeoScorer::default().optimize(&body, &kw(&["ai"]), None);
        assert!(out.text.contains("This is particularly important when considering ai."));
    }

    #[test]
    fn suggestions_for_bare_text()
    {   let s = SeoScorer::default().suggestions("Tiny text about rust.", &kw(&["python"]));
        assert_eq!(s, vec![
          "Low keyword density for 'python' - consider adding more naturally".to_string()
        , "Missing H1 title - add a compelling title with target keywords".to_string()
        , "Missing H2 headings - add subheadings to improve structure".to_string()
        , "Content is too short - expand to provide more value".to_string()
        , "Missing meta description - add for better search results".to_string()
        , "Add more internal links to improve site structure".to_string()
        ]);
    }

    #[test]
    fn invalid_target_url_adds_no_links()
    {   assert!(related_links("not a url").is_none());
        assert!(related_links("https://example.com").is_some());
    }
}
