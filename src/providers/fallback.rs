//! Deterministic template content used when every provider fails

use log::info;

use crate::metrics;
use crate::request::{Generated, GenerationRequest};
use crate::ContentType;

/// Provider id reported for template content
pub const FALLBACK_PROVIDER_ID: &str = "fallback";

/// Fields the templates draw from, resolved from the brief or prompt
struct TemplateFields
{   title: String
  , description: String
  , audience: String
  , keywords: String
  , hashtags: String
}

impl TemplateFields
{   fn resolve(request: &GenerationRequest) -> Self
    {   let brief = request.brief.as_ref();
        let pick = |value: Option<&String>, default: &str| {
          value
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
        };

        let prompt = request.prompt.trim();
        let title = pick(brief.map(|b| &b.title), prompt);
        let title = if title.is_empty() { "Untitled".to_string() } else { title };
        let description = pick(brief.map(|b| &b.description), prompt);
        let audience = pick(brief.map(|b| &b.audience), "general readers");

        let mut keywords: Vec<String> = brief
          .map(|b| b.keywords.iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect())
          .unwrap_or_default();
        if keywords.is_empty()
        {   keywords = metrics::extract_keywords(&format!("{} {}", title, description))
              .into_iter()
              .take(3)
              .collect();
        }
        if keywords.is_empty()
        {   keywords.push(title.to_lowercase());
        }

        let hashtags = keywords.iter()
          .map(|k| format!("#{}", k.split_whitespace().collect::<String>()))
          .collect::<Vec<_>>()
          .join(" ");

        TemplateFields
        {   title
          , description: as_sentence(&description)
          , audience
          , keywords: keywords.join(", ")
          , hashtags
        }
    }
}

/// Terminate a fragment with a period when it lacks punctuation
fn as_sentence(text: &str) -> String
{   let text = text.trim();
    match text.chars().last()
    {   Some('.') | Some('!') | Some('?') => text.to_string()
      , Some(_) => format!("{}.", text)
      , None => String::new()
    }
}

/// Fixed per-content-type templates; rendering never fails
#[derive(Debug, Clone, Default)]
pub struct TemplateFallback;

impl TemplateFallback
{   pub fn new() -> Self
    {   TemplateFallback
    }

    pub fn render(&self, request: &GenerationRequest) -> Generated
    {   info!(
          "Rendering fallback {} template",
          request.content_type
        );
        let f = TemplateFields::resolve(request);
        let content = match request.content_type
        {   ContentType::Article => format!(
              "# {title}\n\n\
               {title} matters to {audience}. {description} \
               This article covers the essentials of {keywords} and what they mean in practice.\n\n\
               Understanding the fundamentals comes first. Once the basics are clear, \
               {audience} can apply them with confidence and avoid common pitfalls.\n\n\
               In short, {title} rewards careful attention. Start small, measure the results, \
               and build on what works.",
              title = f.title, audience = f.audience,
              description = f.description, keywords = f.keywords
            )
          , ContentType::BlogPost => format!(
              "# {title}\n\n\
               If you are one of the {audience} curious about {keywords}, this post is for you. \
               {description}\n\n\
               Here is what we have learned so far. The most useful ideas are often the simplest ones, \
               and they work best when applied consistently.\n\n\
               Have thoughts on {title}? Share them and keep the conversation going.",
              title = f.title, audience = f.audience,
              description = f.description, keywords = f.keywords
            )
          , ContentType::MarketingCopy => format!(
              "{title}\n\n\
               Built for {audience}. {description} \
               Discover how {keywords} can make a real difference today.\n\n\
               Do not wait. Get started with {title} now.",
              title = f.title, audience = f.audience,
              description = f.description, keywords = f.keywords
            )
          , ContentType::SocialMedia => format!(
              "{title}: {description} Made for {audience}. {hashtags}",
              title = f.title, description = f.description,
              audience = f.audience, hashtags = f.hashtags
            )
          , ContentType::Variant => format!(
              "# {title}\n\n\
               Here is another take on {title} for {audience}. {description} \
               This version looks at {keywords} from a different angle.\n\n\
               The takeaway stays the same. Clear goals and steady effort produce the best results.",
              title = f.title, audience = f.audience,
              description = f.description, keywords = f.keywords
            )
        };
        Generated
        {   content
          , tokens_used: 0
        }
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::request::ContentBrief;

    #[test]
    fn brief_fields_fill_the_template()
    {   let brief = ContentBrief
        {   title: "Home Composting".to_string()
          , description: "Turn kitchen scraps into soil".to_string()
          , audience: "beginners".to_string()
          , keywords: vec!["compost".to_string(), "garden soil".to_string()]
          , content_type: ContentType::SocialMedia
          , ..ContentBrief::default()
        };
        let out = TemplateFallback::new().render(&brief.to_request());
        assert_eq!(
          out.content,
          "Home Composting: Turn kitchen scraps into soil. Made for beginners. #compost #gardensoil"
        );
        assert_eq!(out.tokens_used, 0);
    }

    #[test]
    fn prompt_only_request_still_renders()
    {   let req = GenerationRequest::new("electric bikes");
        let out = TemplateFallback::new().render(&req);
        assert!(out.content.starts_with("# electric bikes\n\n"));
        assert!(out.content.contains("general readers"));
        assert!(out.content.contains("electric, bikes"));
    }

    #[test]
    fn rendering_is_deterministic()
    {   let req = GenerationRequest::new("tide pools")
          .content_type(ContentType::BlogPost);
        let a = TemplateFallback::new().render(&req);
        let b = TemplateFallback::new().render(&req);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_prompt_gets_a_title()
    {   let out = TemplateFallback::new().render(&GenerationRequest::new(""));
        assert!(out.content.starts_with("# Untitled"));
    }
}
