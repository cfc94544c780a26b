use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;

use allwrite::{ContentBrief, ForgeBackend, ForgeConfig, Pipeline};

/// allwrite: brief in, scored and checked text out.
///
/// Every command prints pretty JSON on stdout. Logging goes to stderr
/// and is controlled with RUST_LOG.
#[derive(Parser)]
#[command(name = "allwrite", version, about = "Content generation and scoring pipeline")]
struct Cli
{   /// JSON configuration file; built-in defaults when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>
  , #[command(subcommand)]
    command: Commands
}

#[derive(Subcommand)]
enum Commands
{   /// Run the full pipeline for a JSON brief
    Generate
    {   #[arg(long)]
        brief: PathBuf
      , /// Site the related-links section should point at
        #[arg(long)]
        target_url: Option<String>
      , /// Skip fact extraction
        #[arg(long)]
        no_facts: bool
    }
  , /// SEO score, density report and suggestions for a text file
    Score
    {   #[arg(long)]
        file: PathBuf
      , #[arg(long = "keyword")]
        keywords: Vec<String>
    }
  , /// Plagiarism heuristics and fact buckets for a text file
    Check
    {   #[arg(long)]
        file: PathBuf
      , #[arg(long)]
        no_facts: bool
    }
  , /// Rewrite a text file for a style, length and audience
    Refine
    {   #[arg(long)]
        file: PathBuf
      , #[arg(long, default_value = "casual")]
        style: String
      , #[arg(long, default_value = "medium")]
        length: String
      , #[arg(long, default_value = "general")]
        audience: String
    }
}

#[derive(Serialize)]
struct ScoreOutput
{   score: allwrite::SeoScoreBreakdown
  , keyword_density: allwrite::metrics::KeywordDensityReport
  , suggestions: Vec<String>
}

/// Configuration file plus API keys from the environment
fn load_config(path: Option<&Path>) -> ForgeConfig
{   let mut config = match path
    {   Some(path) => ForgeConfig::load(path)
      , None => ForgeConfig::default()
    };
    for (var, provider) in [
      ("OPENAI_API_KEY", &mut config.providers.openai)
    , ("MISTRAL_API_KEY", &mut config.providers.mistral)
    ]
    {   if provider.api_key.is_none()
        {   if let Ok(key) = std::env::var(var)
            {   debug!("Using {} from the environment", var);
                provider.api_key = Some(key);
            }
        }
    }
    config
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>>
{   println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>>
{   env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    match cli.command
    {   Commands::Generate { brief, target_url, no_facts } => {
          let brief: ContentBrief =
            serde_json::from_str(&std::fs::read_to_string(&brief)?)?;
          let backend = ForgeBackend::new(Pipeline::new(config));
          let artifact = backend.run_brief(brief, target_url, !no_facts).await?;
          backend.shutdown().await?;
          info!("Artifact ready from '{}'", artifact.provider_id);
          print_json(&artifact)
        }
      , Commands::Score { file, keywords } => {
          let text = std::fs::read_to_string(&file)?;
          let pipeline = Pipeline::new(config);
          print_json(&ScoreOutput
          {   score: pipeline.score(&text, &keywords)
            , keyword_density: pipeline.density(&text, &keywords)
            , suggestions: pipeline.suggestions(&text, &keywords)
          })
        }
      , Commands::Check { file, no_facts } => {
          let text = std::fs::read_to_string(&file)?;
          print_json(&Pipeline::new(config).check(&text, !no_facts))
        }
      , Commands::Refine { file, style, length, audience } => {
          let text = std::fs::read_to_string(&file)?;
          print_json(&Pipeline::new(config).refine(&text, &style, &length, &audience))
        }
    }
}
